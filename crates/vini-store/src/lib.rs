//! Flat (section, key) stores for vini.
//!
//! A flat store is a two-level map: named sections, each holding an ordered
//! bag of key/value strings. Deeper hierarchy is encoded *inside* keys with
//! a separator character: callers use the logical form (`a/b/c`), the
//! physical INI text uses backslashes (`a\b\c`). Translation happens at the
//! store boundary, so everything above this crate only sees `/`.
//!
//! Two implementations are provided:
//!
//! - [`IniFileStore`]: an INI file on disk, re-read on every access
//! - [`MemoryStore`]: the same document model held in memory
//!
//! # Example
//!
//! ```
//! use vini_store::{FlatStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set_string("app", "window/width", "800").unwrap();
//! assert_eq!(
//!     store.get_string("app", "window/width").unwrap().as_deref(),
//!     Some("800")
//! );
//! ```

#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod file;
pub mod memory;

pub use document::{IniDocument, Section};
pub use error::StoreError;
pub use file::IniFileStore;
pub use memory::MemoryStore;

/// Separator used inside keys by callers.
pub const LOGICAL_SEPARATOR: char = '/';

/// Separator used inside keys in the INI text.
pub const PHYSICAL_SEPARATOR: char = '\\';

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A persisted section -> (key -> value) map.
///
/// Keys are passed and returned in logical (`/`) form. Section and key lookup
/// is ASCII case-insensitive.
pub trait FlatStore: Send + Sync {
    /// Identity of the backing storage, used to share locks between handles.
    fn location(&self) -> String;

    /// Whether the backing storage exists yet.
    fn exists(&self) -> bool;

    /// All entries of a section in stored order. Empty if the section is absent.
    fn section(&self, section: &str) -> Result<Vec<(String, String)>>;

    /// Returns `None` if the section, key, or backing storage is missing.
    fn get_string(&self, section: &str, key: &str) -> Result<Option<String>>;

    /// Creates the section and backing storage as needed.
    fn set_string(&self, section: &str, key: &str, value: &str) -> Result<()>;

    /// Returns true if the key was present and removed.
    fn delete_key(&self, section: &str, key: &str) -> Result<bool>;

    /// Returns true if the section was present and removed.
    fn delete_section(&self, section: &str) -> Result<bool>;

    /// Section names in stored order.
    fn section_names(&self) -> Result<Vec<String>>;

    /// Whether `key` exists in `section`.
    fn contains_key(&self, section: &str, key: &str) -> Result<bool> {
        Ok(self.get_string(section, key)?.is_some())
    }

    /// Whether a section with this name exists.
    fn contains_section(&self, section: &str) -> Result<bool> {
        Ok(self
            .section_names()?
            .iter()
            .any(|name| name.eq_ignore_ascii_case(section)))
    }
}

/// Reject a section or key that would not read back unchanged from INI text.
///
/// Sections may not hold brackets or line breaks. Keys may not start with a
/// comment marker or `[`, nor hold `=`, a backslash, or a line break. Neither
/// may be empty or carry surrounding whitespace.
pub fn check_name(section: &str, key: &str) -> Result<()> {
    let padded = |name: &str| name.trim() != name;
    let bad_section = section.is_empty()
        || padded(section)
        || section.contains(['[', ']', '\n', '\r']);
    let bad_key = key.is_empty()
        || padded(key)
        || key.starts_with([';', '#', '['])
        || key.contains(['=', PHYSICAL_SEPARATOR, '\n', '\r']);

    if bad_section || bad_key {
        return Err(StoreError::InvalidName(format!("[{section}] {key}")));
    }
    Ok(())
}

/// Translate a logical key into its on-disk form.
pub fn to_physical(key: &str) -> String {
    key.replace(LOGICAL_SEPARATOR, &PHYSICAL_SEPARATOR.to_string())
}

/// Translate an on-disk key into its logical form.
pub fn to_logical(key: &str) -> String {
    key.replace(PHYSICAL_SEPARATOR, &LOGICAL_SEPARATOR.to_string())
}
