//! INI file backed flat store
//!
//! The file is read on every call and rewritten on every mutation, the same
//! access pattern as the classic private-profile API. Callers that share a
//! file across handles serialize access themselves (see the per-path lock
//! registry in the `vini` crate); this type holds no lock of its own.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::document::IniDocument;
use crate::{FlatStore, Result, StoreError};

/// Flat store persisted as a single INI file
#[derive(Debug, Clone)]
pub struct IniFileStore {
    path: PathBuf,
}

impl IniFileStore {
    /// Bind a store to `path`. The file does not need to exist yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current document. A missing file reads as empty.
    pub fn load(&self) -> Result<IniDocument> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(IniDocument::parse(&text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(IniDocument::new()),
            Err(e) => Err(StoreError::Read {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn save(&self, doc: &IniDocument) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            info!("Creating settings directory: {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: self.path.clone(),
                source: e,
            })?;
        }

        fs::write(&self.path, doc.render()).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl FlatStore for IniFileStore {
    fn location(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn section(&self, section: &str) -> Result<Vec<(String, String)>> {
        Ok(self
            .load()?
            .section(section)
            .map(|s| s.entries().to_vec())
            .unwrap_or_default())
    }

    fn get_string(&self, section: &str, key: &str) -> Result<Option<String>> {
        if !self.exists() {
            return Ok(None);
        }
        Ok(self.load()?.get(section, key).map(str::to_string))
    }

    fn set_string(&self, section: &str, key: &str, value: &str) -> Result<()> {
        crate::check_name(section, key)?;
        let mut doc = self.load()?;
        doc.set(section, key, value);
        self.save(&doc)
    }

    fn delete_key(&self, section: &str, key: &str) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        let mut doc = self.load()?;
        if !doc.remove_key(section, key) {
            return Ok(false);
        }
        debug!("Deleted [{section}] {key} from {}", self.path.display());
        self.save(&doc)?;
        Ok(true)
    }

    fn delete_section(&self, section: &str) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        let mut doc = self.load()?;
        if !doc.remove_section(section) {
            return Ok(false);
        }
        debug!("Deleted section [{section}] from {}", self.path.display());
        self.save(&doc)?;
        Ok(true)
    }

    fn section_names(&self) -> Result<Vec<String>> {
        Ok(self.load()?.section_names())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = IniFileStore::new(dir.path().join("absent.ini"));

        assert!(!store.exists());
        assert_eq!(store.get_string("a", "b").unwrap(), None);
        assert!(store.section("a").unwrap().is_empty());
        assert!(store.section_names().unwrap().is_empty());
        assert!(!store.delete_key("a", "b").unwrap());
        assert!(!store.delete_section("a").unwrap());
        assert!(!store.exists());
    }

    #[test]
    fn test_first_write_creates_file_and_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/data/config.ini");
        let store = IniFileStore::new(&path);

        store.set_string("app", "window/width", "800").unwrap();

        assert!(path.is_file());
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "[app]\nwindow\\width=800\n");
    }

    #[test]
    fn test_rejects_empty_names() {
        let dir = TempDir::new().unwrap();
        let store = IniFileStore::new(dir.path().join("c.ini"));
        assert!(matches!(
            store.set_string("", "k", "v"),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.set_string("s", "", "v"),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn test_reads_hand_written_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hand.ini");
        fs::write(&path, "[General]\r\nname = demo\r\n[app]\r\nlist\\1\\x=y\r\n").unwrap();
        let store = IniFileStore::new(&path);

        assert_eq!(
            store.get_string("general", "NAME").unwrap().as_deref(),
            Some("demo")
        );
        assert_eq!(
            store.section("app").unwrap(),
            vec![("list/1/x".to_string(), "y".to_string())]
        );
    }

    #[test]
    fn test_location_uses_forward_slashes() {
        let store = IniFileStore::new("C:\\settings\\config.ini");
        assert_eq!(store.location(), "C:/settings/config.ini");
    }
}
