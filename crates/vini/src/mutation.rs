//! Remove and rename across the value and comment stores
//!
//! Both operations run as a sequence of independently locked primitive
//! accesses. A failure part way through leaves whatever was already
//! changed in place.

use tracing::debug;

use crate::backend::Backend;
use crate::inference::{self, Shape};
use crate::resolver::{SIZE_KEY, join};
use crate::Result;

/// Remove `sub_key` and, for groups and arrays, everything below it.
pub fn remove(backend: &Backend, section: &str, sub_key: &str) -> Result<usize> {
    let entries = backend.values_in(section)?;
    let shape = inference::classify(&entries, sub_key);
    debug!("Removing [{section}] {sub_key} ({shape:?})");

    let mut removed = 0;
    match shape {
        Shape::Key => return Ok(usize::from(backend.delete_entry(section, sub_key)?)),
        Shape::Array { size } => {
            let fields = inference::element_fields(&entries, sub_key);
            for index in 1..=size {
                for field in &fields {
                    let key = format!("{sub_key}/{index}/{field}");
                    removed += usize::from(backend.delete_entry(section, &key)?);
                }
            }
            let size_key = join(sub_key, SIZE_KEY);
            removed += usize::from(backend.delete_entry(section, &size_key)?);
        }
        Shape::Group | Shape::Irregular | Shape::Absent => {}
    }

    removed += remove_descendants(backend, section, sub_key)?;
    Ok(removed)
}

/// Remove a bare name: the section of that name if one exists, otherwise
/// the key of that name in `default_section`.
pub fn remove_bare(backend: &Backend, name: &str, default_section: &str) -> Result<usize> {
    let entries = backend.values_in(name)?.len();
    if backend.delete_section(name)? {
        debug!("Removed section [{name}]");
        return Ok(entries.max(1));
    }
    remove(backend, default_section, name)
}

/// Rename the last segment of `sub_key` to `new_name`.
///
/// The key itself and every key below it move; values and comments are
/// copied, then the old entries are deleted. Nothing moves if the
/// destination already holds a key or children.
pub fn rename(backend: &Backend, section: &str, sub_key: &str, new_name: &str) -> Result<usize> {
    let parent = sub_key.rsplit_once('/').map_or("", |(parent, _)| parent);
    let destination = join(parent, new_name);

    let values = backend.values_in(section)?;
    let comments = backend.comments_in(section)?;

    if occupied(&values, &destination) || occupied(&comments, &destination) {
        debug!("Not renaming [{section}] {sub_key}: {destination} already exists");
        return Ok(0);
    }

    let mut moved = 0;
    for key in affected_keys(&values, &comments, sub_key) {
        let rest = inference::strip_prefix_ci(&key, sub_key).unwrap_or_default();
        let new_key = format!("{destination}{rest}");

        if let Some((_, value)) = values.iter().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            backend.write_value(section, &new_key, value)?;
        }
        if let Some((_, comment)) = comments.iter().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            backend.write_comment(section, &new_key, comment)?;
        }
        backend.delete_entry(section, &key)?;
        moved += 1;
    }

    debug!("Renamed [{section}] {sub_key} -> {destination} ({moved} entries)");
    Ok(moved)
}

/// Rename a bare name: a whole section if one exists, otherwise the key of
/// that name in `default_section`.
pub fn rename_bare(
    backend: &Backend,
    name: &str,
    new_name: &str,
    default_section: &str,
) -> Result<usize> {
    let values = backend.values_in(name)?;
    let comments = backend.comments_in(name)?;
    let exists = backend.has_section(name)? || !comments.is_empty();
    if !exists {
        return rename(backend, default_section, name, new_name);
    }

    if backend.has_section(new_name)? || !backend.comments_in(new_name)?.is_empty() {
        debug!("Not renaming section [{name}]: [{new_name}] already exists");
        return Ok(0);
    }

    for (key, value) in &values {
        backend.write_value(new_name, key, value)?;
    }
    for (key, comment) in &comments {
        backend.write_comment(new_name, key, comment)?;
    }
    backend.delete_section(name)?;

    let moved = values.len().max(comments.len());
    debug!("Renamed section [{name}] -> [{new_name}] ({moved} entries)");
    Ok(moved)
}

fn remove_descendants(backend: &Backend, section: &str, sub_key: &str) -> Result<usize> {
    let values = backend.values_in(section)?;
    let comments = backend.comments_in(section)?;

    let mut keys: Vec<&str> = inference::descendants(&values, sub_key).collect();
    for key in inference::descendants(&comments, sub_key) {
        if !keys.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            keys.push(key);
        }
    }

    let mut removed = 0;
    for key in keys {
        removed += usize::from(backend.delete_entry(section, key)?);
    }
    Ok(removed)
}

/// Keys equal to `sub_key` or below it, values first, without duplicates.
fn affected_keys(
    values: &[(String, String)],
    comments: &[(String, String)],
    sub_key: &str,
) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for (key, _) in values.iter().chain(comments) {
        if at_or_below(key, sub_key) && !keys.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            keys.push(key.clone());
        }
    }
    keys
}

fn occupied(entries: &[(String, String)], key: &str) -> bool {
    entries.iter().any(|(k, _)| at_or_below(k, key))
}

/// Store keys compare case-insensitively.
fn at_or_below(key: &str, sub_key: &str) -> bool {
    inference::strip_prefix_ci(key, sub_key)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
