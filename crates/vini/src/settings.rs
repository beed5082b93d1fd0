//! The settings handle

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::ReentrantMutex;
use tracing::{debug, info, warn};
use vini_crypto::ValueCipher;
use vini_store::{FlatStore, IniFileStore, MemoryStore};

use crate::backend::Backend;
use crate::config::{SettingsConfig, comment_path_for};
use crate::context::{ContextTable, NavContext};
use crate::error::SettingsError;
use crate::inference;
use crate::mutation;
use crate::resolver::{Resolution, SIZE_KEY, resolve, scope_of};
use crate::value::Value;
use crate::Result;

/// Where a virtual path landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    /// Explicit section and flat key
    Flat {
        /// Section name
        section: String,
        /// Flat key inside the section
        key: String,
    },
    /// Bare name with no section: either a whole section or a key of the
    /// default section
    Bare(String),
}

/// Hierarchical settings over a value store and a parallel comment store
///
/// One handle can be shared between threads; each thread navigates with its
/// own group and array cursor. All public calls on one handle are
/// serialized by a reentrant lock, and individual store accesses are
/// serialized across every handle bound to the same value store.
///
/// # Example
///
/// ```
/// use vini::Settings;
///
/// let settings = Settings::in_memory();
/// settings.set_value("app/version", "1.0").unwrap();
///
/// settings.begin_group("app").unwrap();
/// assert_eq!(settings.value("version").unwrap().as_str(), "1.0");
/// settings.end_group();
/// ```
pub struct Settings {
    api: ReentrantMutex<()>,
    contexts: ContextTable,
    backend: Backend,
    key_sort: AtomicBool,
    default_section: String,
    value_path: Option<PathBuf>,
    comment_path: Option<PathBuf>,
}

impl Settings {
    /// Open file-backed settings.
    ///
    /// The comment file lives next to the value file (see
    /// [`comment_path_for`]). Missing directories are created.
    pub fn open(config: &SettingsConfig) -> Result<Self> {
        let value_path = config.value_path()?;
        let comment_path = comment_path_for(&value_path);

        if let Some(parent) = value_path.parent()
            && !parent.exists()
        {
            info!("Creating settings directory: {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }

        info!(
            "Opening settings at {} (encrypted: {})",
            value_path.display(),
            config.encrypt
        );

        let values = Arc::new(IniFileStore::new(&value_path));
        let comments = Arc::new(IniFileStore::new(&comment_path));
        let mut settings = Self::with_stores(values, comments, config);
        settings.value_path = Some(value_path);
        settings.comment_path = Some(comment_path);
        Ok(settings)
    }

    /// Build a handle over caller-supplied stores.
    ///
    /// `config.path` is ignored; every other option applies.
    pub fn with_stores(
        values: Arc<dyn FlatStore>,
        comments: Arc<dyn FlatStore>,
        config: &SettingsConfig,
    ) -> Self {
        let cipher = config.encrypt.then(|| {
            config
                .passphrase
                .as_deref()
                .map_or_else(ValueCipher::default, |p| {
                    ValueCipher::from_passphrase(p.as_bytes())
                })
        });

        Self {
            api: ReentrantMutex::new(()),
            contexts: ContextTable::new(),
            backend: Backend::new(values, comments, cipher),
            key_sort: AtomicBool::new(config.key_sort),
            default_section: config.default_section.clone(),
            value_path: None,
            comment_path: None,
        }
    }

    /// Unencrypted settings held in memory
    pub fn in_memory() -> Self {
        Self::with_stores(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            &SettingsConfig::default(),
        )
    }

    /// Value file, for file-backed handles
    pub fn file_path(&self) -> Option<&Path> {
        self.value_path.as_deref()
    }

    /// Comment file, for file-backed handles
    pub fn comment_path(&self) -> Option<&Path> {
        self.comment_path.as_deref()
    }

    /// Section used for keys that carry no section of their own
    pub fn default_section(&self) -> &str {
        &self.default_section
    }

    /// Whether values are encrypted at rest
    pub const fn is_encrypted(&self) -> bool {
        self.backend.encrypts()
    }

    // Navigation

    /// Enter a group; nested calls append to the current group path.
    pub fn begin_group(&self, name: &str) -> Result<()> {
        validate_path_name(name)?;
        let _api = self.api.lock();
        self.contexts.update(|ctx| ctx.begin_group(name));
        Ok(())
    }

    /// Leave the innermost group.
    ///
    /// Leaving the outermost group tears down the calling thread's context,
    /// including an array scope still open on it.
    pub fn end_group(&self) {
        let _api = self.api.lock();
        if self.contexts.update(NavContext::end_group) {
            self.contexts.clear_current();
        }
    }

    /// Leave every group, keeping any array scope open.
    pub fn end_all_group(&self) {
        let _api = self.api.lock();
        self.contexts.update(NavContext::end_all_groups);
    }

    /// Group path of the calling thread, empty if none
    pub fn group(&self) -> String {
        self.contexts.current().group
    }

    /// Open an array for reading and return its declared size.
    pub fn begin_read_array(&self, prefix: &str) -> Result<usize> {
        validate_path_name(prefix)?;
        let _api = self.api.lock();
        self.contexts
            .update(|ctx| ctx.begin_array(prefix, false, true));
        Ok(self
            .value(SIZE_KEY)
            .and_then(|size| size.to_int())
            .unwrap_or(0))
    }

    /// Open an array for writing.
    ///
    /// With `Some(size)` the size field is written at once; with `None` it is
    /// written by [`end_array`](Self::end_array) from the highest index used.
    pub fn begin_write_array(&self, prefix: &str, size: Option<usize>) -> Result<()> {
        validate_path_name(prefix)?;
        let _api = self.api.lock();
        self.contexts
            .update(|ctx| ctx.begin_array(prefix, true, size.is_none()));
        match size {
            Some(size) => self.set_value(SIZE_KEY, size),
            None => Ok(()),
        }
    }

    /// Select the 0-based element of the open array.
    pub fn set_array_index(&self, index: usize) {
        let _api = self.api.lock();
        self.contexts.update(|ctx| {
            if ctx.in_array {
                ctx.set_array_index(index);
            } else {
                debug!("Ignoring array index {index} outside an array scope");
            }
        });
    }

    /// Close the open array, recording its size if it was auto-sized.
    pub fn end_array(&self) -> Result<()> {
        let _api = self.api.lock();
        let ctx = self.contexts.current();
        let written = match ctx.pending_size() {
            Some(size) if ctx.array_active() => self.set_value(SIZE_KEY, size),
            _ => Ok(()),
        };
        self.contexts.update(NavContext::end_array);
        written
    }

    /// Visit every `(index, key, value)` of an array, in index order.
    ///
    /// Stops early when `visit` returns false. Fails if the calling thread
    /// already has an array open.
    pub fn traverse_array<F>(&self, prefix: &str, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, &str, &Value) -> bool,
    {
        let _api = self.api.lock();
        if self.contexts.current().in_array {
            return Err(SettingsError::ArrayInProgress(prefix.to_string()));
        }

        let scope = crate::scope::ArrayScope::read(self, prefix)?;
        'elements: for index in 0..scope.len() {
            scope.set_index(index);
            for key in self.child_keys() {
                if let Some(value) = self.value(&key)
                    && !visit(index, &key, &value)
                {
                    break 'elements;
                }
            }
        }
        scope.finish()
    }

    /// Number of threads currently holding a navigation context
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Drop the calling thread's navigation context.
    ///
    /// Threads that exit inside a group or array should call this first.
    pub fn clear_context(&self) {
        let _api = self.api.lock();
        self.contexts.clear_current();
    }

    // Values and comments

    /// Store a value.
    pub fn set_value(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let _api = self.api.lock();
        let (section, flat) = self.slot(self.locate(key)?);
        self.backend
            .write_value(&section, &flat, value.into().as_str())?;
        Ok(())
    }

    /// Stored value, `None` if absent or the key is malformed.
    pub fn value(&self, key: &str) -> Option<Value> {
        let _api = self.api.lock();
        let (section, flat) = self.slot(self.locate_for_read(key)?);
        logged(key, self.backend.read_value(&section, &flat))
            .flatten()
            .map(Value::from)
    }

    /// Stored value, or `default` if there is none.
    pub fn value_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.value(key).unwrap_or_else(|| default.into())
    }

    /// Store a comment for a key.
    pub fn set_comment(&self, key: &str, comment: &str) -> Result<()> {
        let _api = self.api.lock();
        let (section, flat) = self.slot(self.locate(key)?);
        self.backend.write_comment(&section, &flat, comment)?;
        Ok(())
    }

    /// Comment stored for a key
    pub fn comment(&self, key: &str) -> Option<String> {
        let _api = self.api.lock();
        let (section, flat) = self.slot(self.locate_for_read(key)?);
        logged(key, self.backend.read_comment(&section, &flat)).flatten()
    }

    /// Initialise a key: the value is written only if the key is absent,
    /// and a non-empty comment only if none is stored yet.
    ///
    /// Returns true if the value was written.
    pub fn new_value(
        &self,
        key: &str,
        value: impl Into<Value>,
        comment: Option<&str>,
    ) -> Result<bool> {
        let _api = self.api.lock();
        let (section, flat) = self.slot(self.locate(key)?);

        let created = self.backend.read_value(&section, &flat)?.is_none();
        if created {
            self.backend
                .write_value(&section, &flat, value.into().as_str())?;
        }

        if let Some(comment) = comment.filter(|c| !c.is_empty())
            && self.backend.read_comment(&section, &flat)?.is_none()
        {
            self.backend.write_comment(&section, &flat, comment)?;
        }

        Ok(created)
    }

    // Structure

    /// Whether a key exists.
    ///
    /// A bare name matches either a section or a key of the default section.
    pub fn contains(&self, key: &str) -> bool {
        let _api = self.api.lock();
        match self.locate_for_read(key) {
            Some(Target::Flat { section, key: flat }) => {
                logged(key, self.backend.read_value(&section, &flat))
                    .flatten()
                    .is_some()
            }
            Some(Target::Bare(name)) => {
                logged(key, self.backend.has_section(&name)).unwrap_or(false)
                    || logged(key, self.backend.read_value(&self.default_section, &name))
                        .flatten()
                        .is_some()
            }
            None => false,
        }
    }

    /// Whether the path has children that do not form an array.
    pub fn is_group(&self, key: &str) -> bool {
        let _api = self.api.lock();
        match self.locate_for_read(key) {
            Some(Target::Flat { section, key: flat }) => {
                let entries = self.entries_logged(&section);
                inference::is_group(&entries, &flat)
            }
            Some(Target::Bare(name)) => {
                if !logged(key, self.backend.has_section(&name)).unwrap_or(false) {
                    return false;
                }
                let entries = self.entries_logged(&name);
                entries.is_empty() || inference::is_group(&entries, "")
            }
            None => false,
        }
    }

    /// Whether the path holds a contiguous 1-based array with a matching size.
    pub fn is_array(&self, key: &str) -> bool {
        let _api = self.api.lock();
        match self.locate_for_read(key) {
            Some(Target::Flat { section, key: flat }) => {
                inference::is_array(&self.entries_logged(&section), &flat)
            }
            Some(Target::Bare(name)) => inference::is_array(&self.entries_logged(&name), ""),
            None => false,
        }
    }

    /// Every key below the current scope, relative to it.
    ///
    /// Outside any group, default-section keys are listed bare and all other
    /// keys as `section/key`.
    pub fn all_keys(&self) -> Vec<String> {
        let _api = self.api.lock();
        let keys = match scope_of(&self.contexts.current()) {
            Some((section, prefix)) => {
                inference::all_keys(&self.entries_logged(&section), &prefix)
            }
            None => {
                let mut keys = Vec::new();
                for section in self.sections_logged() {
                    let entries = self.entries_logged(&section);
                    if section.eq_ignore_ascii_case(&self.default_section) {
                        keys.extend(entries.into_iter().map(|(k, _)| k));
                    } else {
                        keys.extend(entries.into_iter().map(|(k, _)| format!("{section}/{k}")));
                    }
                }
                keys
            }
        };
        self.sorted(keys)
    }

    /// Keys directly below the current scope.
    pub fn child_keys(&self) -> Vec<String> {
        let _api = self.api.lock();
        let keys = match scope_of(&self.contexts.current()) {
            Some((section, prefix)) => {
                inference::child_keys(&self.entries_logged(&section), &prefix)
            }
            None => inference::child_keys(&self.entries_logged(&self.default_section), ""),
        };
        self.sorted(keys)
    }

    /// Groups directly below the current scope; all sections when idle.
    pub fn child_groups(&self) -> Vec<String> {
        let _api = self.api.lock();
        let groups = match scope_of(&self.contexts.current()) {
            Some((section, prefix)) => {
                inference::child_groups(&self.entries_logged(&section), &prefix)
            }
            None => self.sections_logged(),
        };
        self.sorted(groups)
    }

    /// Sort listings returned by the key and group queries.
    pub fn enable_key_sort(&self, enabled: bool) {
        self.key_sort.store(enabled, Ordering::Relaxed);
    }

    // Mutation

    /// Remove a key, group, array, or whole section from both stores.
    ///
    /// Returns the number of stored entries deleted.
    pub fn remove(&self, key: &str) -> Result<usize> {
        let _api = self.api.lock();
        match self.locate(key)? {
            Target::Flat { section, key: flat } => {
                mutation::remove(&self.backend, &section, &flat)
            }
            Target::Bare(name) => {
                mutation::remove_bare(&self.backend, &name, &self.default_section)
            }
        }
    }

    /// Rename the last segment of a path, moving everything below it.
    ///
    /// Nothing moves if the destination already exists. Returns the number of
    /// entries moved.
    pub fn rename(&self, key: &str, new_name: &str) -> Result<usize> {
        if new_name.is_empty() || new_name.contains('/') {
            return Err(SettingsError::InvalidName(new_name.to_string()));
        }

        let _api = self.api.lock();
        match self.locate(key)? {
            Target::Flat { section, key: flat } => {
                mutation::rename(&self.backend, &section, &flat, new_name)
            }
            Target::Bare(name) => {
                mutation::rename_bare(&self.backend, &name, new_name, &self.default_section)
            }
        }
    }

    fn locate(&self, key: &str) -> Result<Target> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey(key.to_string()));
        }

        let resolution = resolve(&self.contexts.current(), key);
        if resolution.echoes(key) {
            self.contexts.clear_current();
        }

        match resolution {
            Resolution::Flat { section, key } => Ok(Target::Flat { section, key }),
            Resolution::Default => Ok(Target::Bare(key.to_string())),
            Resolution::Invalid => Err(SettingsError::InvalidKey(key.to_string())),
        }
    }

    fn locate_for_read(&self, key: &str) -> Option<Target> {
        self.locate(key)
            .inspect_err(|e| debug!("Ignoring read of {key:?}: {e}"))
            .ok()
    }

    fn slot(&self, target: Target) -> (String, String) {
        match target {
            Target::Flat { section, key } => (section, key),
            Target::Bare(key) => (self.default_section.clone(), key),
        }
    }

    fn entries_logged(&self, section: &str) -> Vec<(String, String)> {
        logged(section, self.backend.values_in(section)).unwrap_or_default()
    }

    fn sections_logged(&self) -> Vec<String> {
        logged("sections", self.backend.section_names()).unwrap_or_default()
    }

    fn sorted(&self, mut items: Vec<String>) -> Vec<String> {
        if self.key_sort.load(Ordering::Relaxed) {
            items.sort();
        }
        items
    }
}

impl Clone for Settings {
    /// Shares the stores and codec; navigation starts idle.
    fn clone(&self) -> Self {
        Self {
            api: ReentrantMutex::new(()),
            contexts: ContextTable::new(),
            backend: self.backend.clone(),
            key_sort: AtomicBool::new(self.key_sort.load(Ordering::Relaxed)),
            default_section: self.default_section.clone(),
            value_path: self.value_path.clone(),
            comment_path: self.comment_path.clone(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("backend", &self.backend)
            .field("default_section", &self.default_section)
            .field("contexts", &self.contexts.len())
            .finish_non_exhaustive()
    }
}

/// Unwrap a store read, logging and discarding failures.
fn logged<T>(what: &str, result: vini_store::Result<T>) -> Option<T> {
    result
        .inspect_err(|e| warn!("Settings read failed for {what:?}: {e}"))
        .ok()
}

fn validate_path_name(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('/') || name.ends_with('/') || name.contains("//") {
        return Err(SettingsError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_section_fallback() {
        let settings = Settings::in_memory();
        settings.set_value("name", "vini").unwrap();
        assert_eq!(settings.value("General/name").unwrap().as_str(), "vini");
        assert_eq!(settings.value("name").unwrap().as_str(), "vini");
    }

    #[test]
    fn test_invalid_keys() {
        let settings = Settings::in_memory();
        assert!(matches!(
            settings.set_value("app/", "x"),
            Err(SettingsError::InvalidKey(_))
        ));
        assert!(matches!(
            settings.set_value("", "x"),
            Err(SettingsError::InvalidKey(_))
        ));
        assert_eq!(settings.value("/x"), None);
        assert!(!settings.contains("app/"));
        assert!(matches!(
            settings.begin_group("a/"),
            Err(SettingsError::InvalidName(_))
        ));
    }

    #[test]
    fn test_value_or() {
        let settings = Settings::in_memory();
        assert_eq!(settings.value_or("missing", 5).to_int::<i32>(), Some(5));
        settings.set_value("present", 7).unwrap();
        assert_eq!(settings.value_or("present", 5).to_int::<i32>(), Some(7));
    }

    #[test]
    fn test_new_value_keeps_existing() {
        let settings = Settings::in_memory();
        assert!(settings.new_value("app/mode", "fast", Some("speed")).unwrap());
        assert!(!settings.new_value("app/mode", "slow", Some("other")).unwrap());
        assert_eq!(settings.value("app/mode").unwrap().as_str(), "fast");
        assert_eq!(settings.comment("app/mode").as_deref(), Some("speed"));
    }

    #[test]
    fn test_read_array_size() {
        let settings = Settings::in_memory();
        assert_eq!(settings.begin_read_array("missing").unwrap(), 0);
        settings.end_array().unwrap();

        settings.set_value("list/size", 3).unwrap();
        assert_eq!(settings.begin_read_array("list").unwrap(), 3);
        settings.end_array().unwrap();
        assert_eq!(settings.context_count(), 0);
    }

    #[test]
    fn test_fixed_size_write_array() {
        let settings = Settings::in_memory();
        settings.begin_write_array("list", Some(5)).unwrap();
        settings.set_array_index(0);
        settings.set_value("x", 1).unwrap();
        settings.end_array().unwrap();
        assert_eq!(settings.value("list/size").unwrap().as_str(), "5");
    }

    #[test]
    fn test_leaving_outermost_group_drops_array_scope() {
        let settings = Settings::in_memory();
        settings.begin_group("g").unwrap();
        settings.begin_write_array("arr", None).unwrap();
        settings.set_array_index(0);
        settings.end_group();

        assert_eq!(settings.context_count(), 0);
        assert_eq!(settings.group(), "");
        settings.set_value("k", 1).unwrap();
        assert!(settings.contains("General/k"));
        assert!(!settings.contains("g/arr/1/k"));
    }

    #[test]
    fn test_leaving_inner_group_keeps_context() {
        let settings = Settings::in_memory();
        settings.begin_group("a").unwrap();
        settings.begin_group("b").unwrap();
        settings.end_group();
        assert_eq!(settings.group(), "a");
        assert_eq!(settings.context_count(), 1);
        settings.end_group();
        assert_eq!(settings.context_count(), 0);
    }

    #[test]
    fn test_index_outside_array_is_ignored() {
        let settings = Settings::in_memory();
        settings.set_array_index(3);
        assert_eq!(settings.context_count(), 0);
    }

    #[test]
    fn test_key_sort() {
        let settings = Settings::in_memory();
        settings.set_value("s/b", 1).unwrap();
        settings.set_value("s/a", 2).unwrap();
        settings.begin_group("s").unwrap();
        assert_eq!(settings.child_keys(), vec!["b", "a"]);
        settings.enable_key_sort(true);
        assert_eq!(settings.child_keys(), vec!["a", "b"]);
        settings.end_group();
    }

    #[test]
    fn test_clone_starts_idle() {
        let settings = Settings::in_memory();
        settings.begin_group("app").unwrap();
        let copy = settings.clone();
        assert_eq!(copy.group(), "");
        assert_eq!(copy.context_count(), 0);
        settings.end_group();

        copy.set_value("shared/key", 1).unwrap();
        assert!(settings.contains("shared/key"));
    }
}
