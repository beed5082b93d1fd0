//! Value and comment stores behind one path lock
//!
//! Every primitive access takes the shared per-path lock for its own
//! duration only. Values crossing the value store go through the optional
//! [`ValueCipher`]; comments are always stored as plain text.

use std::sync::Arc;

use tracing::debug;
use vini_crypto::ValueCipher;
use vini_store::{FlatStore, Result};

use crate::lock::PathLock;

/// The pair of flat stores a settings handle operates on
#[derive(Clone)]
pub struct Backend {
    values: Arc<dyn FlatStore>,
    comments: Arc<dyn FlatStore>,
    lock: PathLock,
    cipher: Option<ValueCipher>,
}

impl Backend {
    /// Bind both stores; the lock is keyed by the value store location.
    pub fn new(
        values: Arc<dyn FlatStore>,
        comments: Arc<dyn FlatStore>,
        cipher: Option<ValueCipher>,
    ) -> Self {
        let lock = PathLock::acquire(&values.location());
        Self {
            values,
            comments,
            lock,
            cipher,
        }
    }

    /// Location of the value store
    pub fn value_location(&self) -> String {
        self.values.location()
    }

    /// Location of the comment store
    pub fn comment_location(&self) -> String {
        self.comments.location()
    }

    /// Whether values are encrypted
    pub const fn encrypts(&self) -> bool {
        self.cipher.is_some()
    }

    /// Decoded entries of a value-store section
    pub fn values_in(&self, section: &str) -> Result<Vec<(String, String)>> {
        let entries = {
            let _guard = self.lock.guard();
            self.values.section(section)?
        };
        Ok(entries
            .into_iter()
            .map(|(key, raw)| {
                let value = self.decode(&raw);
                (key, value)
            })
            .collect())
    }

    /// Entries of a comment-store section
    pub fn comments_in(&self, section: &str) -> Result<Vec<(String, String)>> {
        let _guard = self.lock.guard();
        self.comments.section(section)
    }

    /// Decoded value, `None` if absent
    pub fn read_value(&self, section: &str, key: &str) -> Result<Option<String>> {
        let raw = {
            let _guard = self.lock.guard();
            self.values.get_string(section, key)?
        };
        Ok(raw.map(|raw| self.decode(&raw)))
    }

    /// Encode and store a value
    pub fn write_value(&self, section: &str, key: &str, value: &str) -> Result<()> {
        let stored = self.encode(value);
        let _guard = self.lock.guard();
        self.values.set_string(section, key, &stored)
    }

    /// Comment text, `None` if absent
    pub fn read_comment(&self, section: &str, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.guard();
        self.comments.get_string(section, key)
    }

    /// Store a comment
    pub fn write_comment(&self, section: &str, key: &str, comment: &str) -> Result<()> {
        let _guard = self.lock.guard();
        self.comments.set_string(section, key, comment)
    }

    /// Delete one key from both stores; true if either held it.
    pub fn delete_entry(&self, section: &str, key: &str) -> Result<bool> {
        let in_values = {
            let _guard = self.lock.guard();
            self.values.delete_key(section, key)?
        };
        let in_comments = {
            let _guard = self.lock.guard();
            self.comments.delete_key(section, key)?
        };
        Ok(in_values || in_comments)
    }

    /// Delete a section from both stores; true if either held it.
    pub fn delete_section(&self, section: &str) -> Result<bool> {
        let in_values = {
            let _guard = self.lock.guard();
            self.values.delete_section(section)?
        };
        let in_comments = {
            let _guard = self.lock.guard();
            self.comments.delete_section(section)?
        };
        Ok(in_values || in_comments)
    }

    /// Sections of the value store
    pub fn section_names(&self) -> Result<Vec<String>> {
        let _guard = self.lock.guard();
        self.values.section_names()
    }

    /// Whether the value store has a section with this name
    pub fn has_section(&self, section: &str) -> Result<bool> {
        let _guard = self.lock.guard();
        self.values.contains_section(section)
    }

    fn encode(&self, value: &str) -> String {
        match &self.cipher {
            Some(cipher) if !value.is_empty() => cipher.seal(value),
            _ => value.to_string(),
        }
    }

    fn decode(&self, raw: &str) -> String {
        match &self.cipher {
            Some(cipher) if !raw.is_empty() => cipher.open(raw).unwrap_or_else(|e| {
                debug!("Passing through undecryptable value: {e}");
                raw.to_string()
            }),
            _ => raw.to_string(),
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("values", &self.values.location())
            .field("comments", &self.comments.location())
            .field("encrypted", &self.cipher.is_some())
            .finish_non_exhaustive()
    }
}
