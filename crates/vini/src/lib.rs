//! Hierarchical settings over flat INI stores.
//!
//! `vini` lets callers address settings through nested groups and indexed
//! arrays (`net/servers[1]/host`) while persisting them in a plain
//! two-level INI file. The virtual hierarchy is projected onto sections and
//! `/`-joined flat keys, and recovered again by pattern-matching the stored
//! key names.
//!
//! Each thread sharing a [`Settings`] handle navigates with its own cursor,
//! so `begin_group` on one thread never affects lookups on another.
//!
//! # Example
//!
//! ```
//! use vini::Settings;
//!
//! let settings = Settings::in_memory();
//!
//! settings.begin_write_array("servers", None).unwrap();
//! for (i, host) in ["alpha", "beta"].iter().enumerate() {
//!     settings.set_array_index(i);
//!     settings.set_value("host", *host).unwrap();
//! }
//! settings.end_array().unwrap();
//!
//! assert!(settings.is_array("servers"));
//! assert_eq!(settings.value("servers/2/host").unwrap().as_str(), "beta");
//! ```
//!
//! # Layout on disk
//!
//! ```text
//! [servers]
//! 1\host=alpha
//! 2\host=beta
//! size=2
//! ```
//!
//! Comments live in a second file next to the value file, keyed by the same
//! section and flat key. Values (never comments) can be encrypted at rest.

#![warn(missing_docs)]

mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod inference;
pub mod lock;
mod mutation;
pub mod resolver;
pub mod scope;
mod settings;
pub mod value;

pub use config::{DEFAULT_SECTION, SettingsConfig};
pub use error::SettingsError;
pub use scope::{ArrayScope, GroupScope};
pub use settings::Settings;
pub use value::{Bytes, RangeValue, Value};

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;
