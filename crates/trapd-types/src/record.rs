use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::event::EventId;

/// Trap name used when the trap-identifier binding is absent or unresolved.
pub const UNKNOWN_TRAP: &str = "Unknown Trap";

/// Key under which the trap name appears in the serialized record.
pub const TRAP_NAME_KEY: &str = "trapName";

/// The resolved output of one trap.
///
/// Parameters keep binding order. Inserting a key that already exists
/// replaces its value but keeps its original position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrapRecord {
    trap_name: String,
    params: Map<String, Value>,
}

impl TrapRecord {
    /// An empty record named [`UNKNOWN_TRAP`].
    pub fn new() -> Self {
        Self {
            trap_name: UNKNOWN_TRAP.to_string(),
            params: Map::new(),
        }
    }

    pub fn trap_name(&self) -> &str {
        &self.trap_name
    }

    pub fn set_trap_name(&mut self, name: impl Into<String>) {
        self.trap_name = name.into();
    }

    /// Insert a parameter. Returns the previous value if the key collided.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.params
            .insert(key.into(), Value::String(value.into()))
            .and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Parameters in insertion order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The flat JSON object: parameters followed by `trapName`.
    ///
    /// A parameter literally named `trapName` is overwritten by the trap name.
    pub fn to_json(&self) -> Value {
        let mut obj = self.params.clone();
        obj.insert(TRAP_NAME_KEY.to_string(), Value::String(self.trap_name.clone()));
        Value::Object(obj)
    }
}

impl Default for TrapRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for TrapRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let shadowed = self.params.contains_key(TRAP_NAME_KEY);
        let len = self.params.len() + usize::from(!shadowed);
        let mut map = serializer.serialize_map(Some(len))?;
        for (k, v) in &self.params {
            if k == TRAP_NAME_KEY {
                map.serialize_entry(k, &self.trap_name)?;
            } else {
                map.serialize_entry(k, v)?;
            }
        }
        if !shadowed {
            map.serialize_entry(TRAP_NAME_KEY, &self.trap_name)?;
        }
        map.end()
    }
}

/// A completed record tagged with where and when it was processed.
#[derive(Clone, Debug, Serialize)]
pub struct ProcessedTrap {
    pub event_id: EventId,
    pub worker: String,
    pub processed_at: DateTime<Utc>,
    pub source: Option<SocketAddr>,
    pub record: TrapRecord,
}

impl ProcessedTrap {
    pub fn new(
        event_id: EventId,
        worker: impl Into<String>,
        source: Option<SocketAddr>,
        record: TrapRecord,
    ) -> Self {
        Self {
            event_id,
            worker: worker.into(),
            processed_at: Utc::now(),
            source,
            record,
        }
    }

    /// Processing time formatted as `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp(&self) -> String {
        self.processed_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
