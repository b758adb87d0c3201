//! mblookup: catalog metadata lookup for media libraries.
//!
//! The query engine lives in [`mblookup_query`]; this crate adds the TOML
//! configuration file, lookup reports and the `mblookup` binary.

pub mod config;
pub mod error;
pub mod lookup;

pub use config::{LookupConfig, OutputConfig};
pub use error::{LookupError, Result};
pub use lookup::{LookupReport, lookup};
pub use mblookup_query as query;
