//! Command-line arguments and command execution

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use vini::{GroupScope, Settings, SettingsConfig};

/// Read and edit hierarchical settings stored in INI files
#[derive(Debug, Parser)]
#[command(name = "vini", version, about)]
pub struct Cli {
    /// Settings file (defaults to the per-user config location)
    #[arg(long, short, env = "VINI_FILE", global = true)]
    pub file: Option<PathBuf>,

    /// Encrypt values at rest
    #[arg(long, env = "VINI_ENCRYPT", global = true)]
    pub encrypt: bool,

    /// Sort key and group listings
    #[arg(long, env = "VINI_SORT", global = true)]
    pub sort: bool,

    /// Group to operate in, e.g. `app/ui`
    #[arg(long, short, global = true)]
    pub group: Option<String>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Settings commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a value
    Get {
        /// Key path
        key: String,
        /// Printed when the key is absent
        #[arg(long)]
        default: Option<String>,
    },
    /// Store a value
    Set {
        /// Key path
        key: String,
        /// Value text
        value: String,
        /// Comment stored alongside the value
        #[arg(long)]
        comment: Option<String>,
    },
    /// Store a value only if the key is absent
    Init {
        /// Key path
        key: String,
        /// Value text
        value: String,
        /// Comment stored if none exists
        #[arg(long)]
        comment: Option<String>,
    },
    /// Print or set the comment of a key
    Comment {
        /// Key path
        key: String,
        /// New comment; prints the current one when omitted
        text: Option<String>,
    },
    /// Remove a key, group, array or section
    Remove {
        /// Key path
        key: String,
    },
    /// Rename the last segment of a key path
    Rename {
        /// Key path
        key: String,
        /// New last segment
        new_name: String,
    },
    /// List keys of the current group
    Keys {
        /// Include nested keys
        #[arg(long)]
        all: bool,
    },
    /// List child groups of the current group
    Groups,
    /// Print every element of an array
    Array {
        /// Array path
        prefix: String,
    },
    /// Report whether a path is a key, group or array
    Kind {
        /// Key path
        key: String,
    },
}

impl Cli {
    /// Settings configuration selected by the global flags
    pub fn config(&self) -> SettingsConfig {
        let config = SettingsConfig::default()
            .with_encryption(self.encrypt)
            .with_key_sort(self.sort);
        match &self.file {
            Some(path) => config.with_path(path),
            None => config,
        }
    }
}

/// Run a command and return the lines to print.
pub fn run(cli: &Cli, settings: &Settings) -> Result<Vec<String>> {
    let _group = cli
        .group
        .as_deref()
        .map(|group| GroupScope::end_all(settings, group))
        .transpose()
        .context("invalid group")?;

    let output = match &cli.command {
        Command::Get { key, default } => match (settings.value(key), default) {
            (Some(value), _) => vec![value.into_string()],
            (None, Some(default)) => vec![default.clone()],
            (None, None) => bail!("key not found: {key}"),
        },
        Command::Set {
            key,
            value,
            comment,
        } => {
            settings.set_value(key, value.as_str())?;
            if let Some(comment) = comment {
                settings.set_comment(key, comment)?;
            }
            Vec::new()
        }
        Command::Init {
            key,
            value,
            comment,
        } => {
            let created = settings.new_value(key, value.as_str(), comment.as_deref())?;
            if created {
                Vec::new()
            } else {
                vec![format!("{key} already set")]
            }
        }
        Command::Comment { key, text } => match text {
            Some(text) => {
                settings.set_comment(key, text)?;
                Vec::new()
            }
            None => settings.comment(key).into_iter().collect(),
        },
        Command::Remove { key } => {
            let removed = settings.remove(key)?;
            vec![format!("removed {removed} entries")]
        }
        Command::Rename { key, new_name } => {
            let moved = settings.rename(key, new_name)?;
            if moved == 0 {
                bail!("nothing renamed: {key} is missing or {new_name} already exists");
            }
            vec![format!("moved {moved} entries")]
        }
        Command::Keys { all } => {
            if *all {
                settings.all_keys()
            } else {
                settings.child_keys()
            }
        }
        Command::Groups => settings.child_groups(),
        Command::Array { prefix } => {
            let mut lines = Vec::new();
            settings.traverse_array(prefix, |index, key, value| {
                lines.push(format!("[{index}] {key}={value}"));
                true
            })?;
            lines
        }
        Command::Kind { key } => {
            let kind = if settings.is_array(key) {
                "array"
            } else if settings.is_group(key) {
                "group"
            } else if settings.contains(key) {
                "key"
            } else {
                "absent"
            };
            vec![kind.to_string()]
        }
    };

    Ok(output)
}
