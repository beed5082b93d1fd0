//! Virtual path to flat key projection
//!
//! A virtual path is interpreted relative to the caller's [`NavContext`] and
//! projected onto `(section, flat key)`: the first segment of the effective
//! path names the section, the rest (still `/`-joined) becomes the single
//! key stored inside it. Array elements are 1-based on disk.
//!
//! | Context                 | Key       | Section | Flat key              |
//! |-------------------------|-----------|---------|-----------------------|
//! | idle                    | `name`    | default | `name`                |
//! | idle                    | `app/ver` | `app`   | `ver`                 |
//! | group `app/ui`          | `width`   | `app`   | `ui/width`            |
//! | array `servers`, idx 0  | `host`    | `servers` | `1/host`            |
//! | group `net`, array `servers`, idx 1 | `host` | `net` | `servers/2/host` |
//! | group `net`, array `servers` | `size` | `net` | `servers/size`        |

use crate::context::NavContext;

/// Name of the element count field of an array
pub const SIZE_KEY: &str = "size";

/// Outcome of projecting a virtual path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Explicit section and flat key
    Flat {
        /// Section name (first path segment)
        section: String,
        /// Remaining path, stored as one key
        key: String,
    },
    /// No section could be derived; the caller substitutes its default
    /// section and uses the raw key unchanged
    Default,
    /// The path has an empty segment where a section or key is required
    Invalid,
}

impl Resolution {
    /// Whether `section/key` reproduces the caller's input verbatim.
    ///
    /// Accessors reset the calling thread's context when this holds.
    pub fn echoes(&self, input: &str) -> bool {
        match self {
            Self::Flat { section, key } => input == format!("{section}/{key}"),
            Self::Default | Self::Invalid => false,
        }
    }
}

/// Project `key` onto the flat store using the context `ctx`.
pub fn resolve(ctx: &NavContext, key: &str) -> Resolution {
    if ctx.array_active() {
        let base = join(&ctx.group, &ctx.array_prefix);
        let (section, tail) = split_first(&base);

        let flat = if key == SIZE_KEY {
            join(tail, SIZE_KEY)
        } else if let Some(index) = ctx.array_index {
            join(&join(tail, &(index + 1).to_string()), key)
        } else {
            join(tail, key)
        };

        return flat_or_invalid(section, flat);
    }

    if !ctx.group.is_empty() {
        let (section, tail) = split_first(&ctx.group);
        return flat_or_invalid(section, join(tail, key));
    }

    match key.split_once('/') {
        Some((section, rest)) => flat_or_invalid(section, rest.to_string()),
        None => Resolution::Default,
    }
}

/// Section and flat-key prefix a context currently points at.
///
/// Returns `None` for an idle context. The prefix is empty when the context
/// addresses a whole section.
pub fn scope_of(ctx: &NavContext) -> Option<(String, String)> {
    let base = if ctx.array_active() {
        let base = join(&ctx.group, &ctx.array_prefix);
        match ctx.array_index {
            Some(index) => join(&base, &(index + 1).to_string()),
            None => base,
        }
    } else if !ctx.group.is_empty() {
        ctx.group.clone()
    } else {
        return None;
    };

    let (section, tail) = split_first(&base);
    Some((section.to_string(), tail.to_string()))
}

/// Join two path fragments, skipping empty ones.
pub fn join(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head}/{tail}"),
    }
}

/// Split a path at its first `/`; the tail is empty if there is none.
pub fn split_first(path: &str) -> (&str, &str) {
    path.split_once('/').unwrap_or((path, ""))
}

fn flat_or_invalid(section: &str, key: String) -> Resolution {
    if section.is_empty() || key.is_empty() || key.ends_with('/') {
        Resolution::Invalid
    } else {
        Resolution::Flat {
            section: section.to_string(),
            key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(section: &str, key: &str) -> Resolution {
        Resolution::Flat {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    fn in_group(group: &str) -> NavContext {
        let mut ctx = NavContext::default();
        ctx.begin_group(group);
        ctx
    }

    fn in_array(group: &str, prefix: &str, index: Option<usize>) -> NavContext {
        let mut ctx = in_group(group);
        ctx.begin_array(prefix, true, true);
        if let Some(i) = index {
            ctx.set_array_index(i);
        }
        ctx
    }

    #[test]
    fn test_idle_plain_key_uses_default_section() {
        let ctx = NavContext::default();
        assert_eq!(resolve(&ctx, "name"), Resolution::Default);
    }

    #[test]
    fn test_idle_path_splits_on_first_separator() {
        let ctx = NavContext::default();
        assert_eq!(resolve(&ctx, "app/version"), flat("app", "version"));
        assert_eq!(resolve(&ctx, "app/ui/width"), flat("app", "ui/width"));
    }

    #[test]
    fn test_empty_remainder_is_invalid() {
        let ctx = NavContext::default();
        assert_eq!(resolve(&ctx, "app/"), Resolution::Invalid);
        assert_eq!(resolve(&ctx, "/version"), Resolution::Invalid);
        assert_eq!(resolve(&ctx, "app/ui/"), Resolution::Invalid);
    }

    #[test]
    fn test_group_prefixes_key() {
        assert_eq!(resolve(&in_group("app"), "version"), flat("app", "version"));
        assert_eq!(resolve(&in_group("app/ui"), "width"), flat("app", "ui/width"));
        assert_eq!(
            resolve(&in_group("app/ui"), "font/size"),
            flat("app", "ui/font/size")
        );
    }

    #[test]
    fn test_array_element_is_one_based() {
        assert_eq!(
            resolve(&in_array("", "servers", Some(0)), "host"),
            flat("servers", "1/host")
        );
        assert_eq!(
            resolve(&in_array("", "net/servers", Some(1)), "host"),
            flat("net", "servers/2/host")
        );
        assert_eq!(
            resolve(&in_array("net", "servers", Some(1)), "host"),
            flat("net", "servers/2/host")
        );
        assert_eq!(
            resolve(&in_array("net/lan", "servers", Some(9)), "host"),
            flat("net", "lan/servers/10/host")
        );
    }

    #[test]
    fn test_size_ignores_index() {
        assert_eq!(
            resolve(&in_array("", "servers", Some(4)), "size"),
            flat("servers", "size")
        );
        assert_eq!(
            resolve(&in_array("net", "servers", Some(4)), "size"),
            flat("net", "servers/size")
        );
        assert_eq!(
            resolve(&in_array("", "net/servers", None), "size"),
            flat("net", "servers/size")
        );
    }

    #[test]
    fn test_array_metadata_without_index() {
        assert_eq!(
            resolve(&in_array("", "servers", None), "note"),
            flat("servers", "note")
        );
        assert_eq!(
            resolve(&in_array("net", "servers", None), "note"),
            flat("net", "servers/note")
        );
    }

    #[test]
    fn test_in_array_without_prefix_falls_back_to_groups() {
        let mut ctx = in_group("app");
        ctx.begin_array("", false, true);
        assert_eq!(resolve(&ctx, "version"), flat("app", "version"));
    }

    #[test]
    fn test_echo_detection() {
        let ctx = NavContext::default();
        let resolution = resolve(&ctx, "app/version");
        assert!(resolution.echoes("app/version"));

        let resolution = resolve(&in_group("app"), "version");
        assert!(!resolution.echoes("version"));
        assert!(!Resolution::Default.echoes("name"));
        assert!(!Resolution::Invalid.echoes("app/"));
    }

    #[test]
    fn test_scope_of_context() {
        assert_eq!(scope_of(&NavContext::default()), None);
        assert_eq!(
            scope_of(&in_group("app")),
            Some(("app".to_string(), String::new()))
        );
        assert_eq!(
            scope_of(&in_group("app/ui")),
            Some(("app".to_string(), "ui".to_string()))
        );
        assert_eq!(
            scope_of(&in_array("", "servers", None)),
            Some(("servers".to_string(), String::new()))
        );
        assert_eq!(
            scope_of(&in_array("net", "servers", Some(0))),
            Some(("net".to_string(), "servers/1".to_string()))
        );
    }

    #[test]
    fn test_join_and_split() {
        assert_eq!(join("", "b"), "b");
        assert_eq!(join("a", ""), "a");
        assert_eq!(join("a", "b"), "a/b");
        assert_eq!(split_first("a/b/c"), ("a", "b/c"));
        assert_eq!(split_first("a"), ("a", ""));
    }
}
