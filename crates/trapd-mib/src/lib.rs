//! MIB symbols, the OID symbol index, and OID resolution for trapd.
//!
//! A MIB file is loaded once at startup into a [`Mib`], indexed into a
//! read-only [`MibSymbolIndex`], and shared by every worker through an
//! [`OidResolver`].
//!
//! # Key Types
//!
//! - [`MibLoader`] -- Reads SMIv1/SMIv2 module text into symbols
//! - [`MibSymbol`] -- One named definition with its resolved OID
//! - [`MibSymbolIndex`] -- Exact-match OID -> name table
//! - [`OidResolver`] -- Applies the sysUpTime, exact and `.0` fallback rules

pub mod builtins;
pub mod error;
pub mod index;
pub mod loader;
pub mod resolver;
pub mod symbol;

pub use error::{MibError, MibResult};
pub use index::MibSymbolIndex;
pub use loader::MibLoader;
pub use resolver::{OidResolver, Resolution};
pub use symbol::{Mib, MibSymbol, SymbolKind};
