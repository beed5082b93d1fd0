//! In-memory flat store

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::document::IniDocument;
use crate::{FlatStore, Result};

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

/// Flat store that keeps its document in memory
///
/// Each instance gets a distinct `memory:<n>` location, so two memory stores
/// never share a path lock.
#[derive(Debug)]
pub struct MemoryStore {
    id: usize,
    doc: RwLock<IniDocument>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::from_document(IniDocument::new())
    }

    /// Create a store seeded with a parsed document
    pub fn from_document(doc: IniDocument) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            doc: RwLock::new(doc),
        }
    }

    /// Copy of the current document
    pub fn snapshot(&self) -> IniDocument {
        self.doc.read().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatStore for MemoryStore {
    fn location(&self) -> String {
        format!("memory:{}", self.id)
    }

    fn exists(&self) -> bool {
        true
    }

    fn section(&self, section: &str) -> Result<Vec<(String, String)>> {
        Ok(self
            .doc
            .read()
            .section(section)
            .map(|s| s.entries().to_vec())
            .unwrap_or_default())
    }

    fn get_string(&self, section: &str, key: &str) -> Result<Option<String>> {
        Ok(self.doc.read().get(section, key).map(str::to_string))
    }

    fn set_string(&self, section: &str, key: &str, value: &str) -> Result<()> {
        crate::check_name(section, key)?;
        self.doc.write().set(section, key, value);
        Ok(())
    }

    fn delete_key(&self, section: &str, key: &str) -> Result<bool> {
        Ok(self.doc.write().remove_key(section, key))
    }

    fn delete_section(&self, section: &str) -> Result<bool> {
        Ok(self.doc.write().remove_section(section))
    }

    fn section_names(&self) -> Result<Vec<String>> {
        Ok(self.doc.read().section_names())
    }
}
