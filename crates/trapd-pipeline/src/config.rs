use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Default number of workers.
pub const DEFAULT_WORKERS: usize = 3;

/// Default queue bound.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub workers: usize,
    /// `None` makes the queue unbounded; written as `"unbounded"` in config files.
    #[serde(with = "capacity")]
    pub queue_capacity: Option<usize>,
    /// On cancellation, finish events already queued before stopping.
    pub drain_on_shutdown: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: Some(DEFAULT_QUEUE_CAPACITY),
            drain_on_shutdown: true,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.workers == 0 {
            return Err(PipelineError::Config("workers must be at least 1".into()));
        }
        if self.queue_capacity == Some(0) {
            return Err(PipelineError::Config(
                "queue_capacity must be at least 1 (use \"unbounded\" for no limit)".into(),
            ));
        }
        Ok(())
    }
}

mod capacity {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    const UNBOUNDED: &str = "unbounded";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Bounded(usize),
        Keyword(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) => s.serialize_u64(*n as u64),
            None => s.serialize_str(UNBOUNDED),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Bounded(n) => Ok(Some(n)),
            Repr::Keyword(k) if k == UNBOUNDED => Ok(None),
            Repr::Keyword(k) => Err(D::Error::custom(format!(
                "expected a queue size or \"{UNBOUNDED}\", got {k:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = PipelineConfig::default();
        assert_eq!(c.workers, 3);
        assert_eq!(c.queue_capacity, Some(10_000));
        assert!(c.drain_on_shutdown);
        c.validate().unwrap();
    }

    #[test]
    fn zero_workers_rejected() {
        let c = PipelineConfig { workers: 0, ..Default::default() };
        assert!(matches!(c.validate(), Err(PipelineError::Config(_))));
        let c = PipelineConfig { queue_capacity: Some(0), ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn capacity_accepts_number_or_unbounded() {
        let c: PipelineConfig = serde_json::from_str(r#"{"queue_capacity": "unbounded"}"#).unwrap();
        assert_eq!(c.queue_capacity, None);
        assert_eq!(c.workers, 3);
        let c: PipelineConfig = serde_json::from_str(r#"{"queue_capacity": 64, "workers": 8}"#).unwrap();
        assert_eq!(c.queue_capacity, Some(64));
        assert_eq!(c.workers, 8);
        assert!(serde_json::from_str::<PipelineConfig>(r#"{"queue_capacity": "lots"}"#).is_err());

        let json = serde_json::to_value(PipelineConfig { queue_capacity: None, ..Default::default() }).unwrap();
        assert_eq!(json["queue_capacity"], "unbounded");
    }
}
