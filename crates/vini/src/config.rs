//! Settings handle configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Section used for keys that carry no section of their own
pub const DEFAULT_SECTION: &str = "General";

/// Suffix appended to the value file stem to name the comment file
pub const COMMENT_SUFFIX: &str = "-comment";

/// Configuration for opening a file-backed [`Settings`](crate::Settings) handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Value file; `None` selects [`SettingsConfig::default_location`]
    pub path: Option<PathBuf>,
    /// Encrypt values written to the value file
    pub encrypt: bool,
    /// Sort key and group listings
    pub key_sort: bool,
    /// Section for keys without an explicit one
    pub default_section: String,
    /// Passphrase for the value cipher; the built-in key when `None`
    pub passphrase: Option<String>,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: None,
            encrypt: false,
            key_sort: false,
            default_section: DEFAULT_SECTION.to_string(),
            passphrase: None,
        }
    }
}

impl SettingsConfig {
    /// Configuration for a value file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::default().with_path(path)
    }

    /// Set the value file
    #[must_use]
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable value encryption
    #[must_use]
    pub const fn with_encryption(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    /// Enable or disable sorted listings
    #[must_use]
    pub const fn with_key_sort(mut self, key_sort: bool) -> Self {
        self.key_sort = key_sort;
        self
    }

    /// Set the section used for section-less keys
    #[must_use]
    pub fn with_default_section(mut self, section: impl Into<String>) -> Self {
        self.default_section = section.into();
        self
    }

    /// Use a custom passphrase for the value cipher
    #[must_use]
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Absolute, `/`-separated path of the value file.
    pub fn value_path(&self) -> std::io::Result<PathBuf> {
        let raw = self.path.clone().unwrap_or_else(Self::default_location);
        normalize(&raw)
    }

    /// Default value file: `$XDG_CONFIG_HOME/vini/data/config.ini`,
    /// falling back to `~/.config`, then the working directory.
    pub fn default_location() -> PathBuf {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map_or_else(
                || PathBuf::from("data").join("config.ini"),
                |dir| dir.join("vini").join("data").join("config.ini"),
            )
    }
}

/// Comment file paired with a value file: `<dir>/<stem>-comment`.
pub fn comment_path_for(value_path: &Path) -> PathBuf {
    let stem = value_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{stem}{COMMENT_SUFFIX}");
    match value_path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Make `path` absolute and use `/` as its only separator.
pub fn normalize(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    Ok(PathBuf::from(absolute.to_string_lossy().replace('\\', "/")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SettingsConfig::default();
        assert_eq!(config.path, None);
        assert!(!config.encrypt);
        assert!(!config.key_sort);
        assert_eq!(config.default_section, "General");
        assert_eq!(config.passphrase, None);
    }

    #[test]
    fn test_builder() {
        let config = SettingsConfig::new("/tmp/app.ini")
            .with_encryption(true)
            .with_key_sort(true)
            .with_default_section("Main")
            .with_passphrase("secret");

        assert_eq!(config.path, Some(PathBuf::from("/tmp/app.ini")));
        assert!(config.encrypt);
        assert!(config.key_sort);
        assert_eq!(config.default_section, "Main");
        assert_eq!(config.passphrase.as_deref(), Some("secret"));
    }

    #[test]
    fn test_comment_path() {
        assert_eq!(
            comment_path_for(Path::new("/etc/app/config.ini")),
            PathBuf::from("/etc/app/config-comment")
        );
        assert_eq!(
            comment_path_for(Path::new("/etc/app/settings")),
            PathBuf::from("/etc/app/settings-comment")
        );
    }

    #[test]
    fn test_relative_path_becomes_absolute() {
        let config = SettingsConfig::new("conf/app.ini");
        let path = config.value_path().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("conf/app.ini"));
    }

    #[test]
    fn test_default_location_file_name() {
        assert!(SettingsConfig::default_location().ends_with("data/config.ini"));
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let config: SettingsConfig = serde_json::from_str(r#"{"encrypt": true}"#).unwrap();
        assert!(config.encrypt);
        assert_eq!(config.default_section, "General");
    }
}
