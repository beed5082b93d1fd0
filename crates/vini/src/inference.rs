//! Structural inference over flat keys
//!
//! The flat store has no notion of groups or arrays; both are recognised by
//! pattern-matching the key names inside one section. For a flat key `k`:
//!
//! - `k` is a **group** if some key starts with `k/`, unless the section also
//!   holds both a `k/1/...` element and a `k/size` entry.
//! - `k` is an **array** if its distinct element indices (`k/<n>/...`) are
//!   exactly `1..=size`, where `size` is the integer stored at `k/size`.
//!
//! An empty `k` addresses the section itself, so a whole section can be
//! classified the same way. Key names compare ASCII case-insensitively, the
//! way the flat store looks them up.

use std::collections::BTreeSet;

use crate::resolver::SIZE_KEY;

/// Shape of a flat key within its section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Nothing stored at or below the key
    Absent,
    /// A single value with no children
    Key,
    /// Children that do not form an array
    Group,
    /// Contiguous 1-based elements with a matching size entry
    Array {
        /// Declared element count
        size: usize,
    },
    /// Element-like children with a size entry that fail the contiguity rule
    Irregular,
}

/// Classify `sub_key` within one section's entries.
pub fn classify(entries: &[(String, String)], sub_key: &str) -> Shape {
    if is_array(entries, sub_key) {
        Shape::Array {
            size: declared_size(entries, sub_key),
        }
    } else if is_group(entries, sub_key) {
        Shape::Group
    } else if has_children(entries, sub_key) {
        Shape::Irregular
    } else if entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(sub_key)) {
        Shape::Key
    } else {
        Shape::Absent
    }
}

/// Group rule: has children, and is not shaped like an array.
pub fn is_group(entries: &[(String, String)], sub_key: &str) -> bool {
    if !has_children(entries, sub_key) {
        return false;
    }

    let prefix = child_prefix(sub_key);
    let first_element = format!("{prefix}1/");
    let size_key = format!("{prefix}{SIZE_KEY}");

    let has_first = entries
        .iter()
        .any(|(k, _)| strip_prefix_ci(k, &first_element).is_some());
    let has_size = entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(&size_key));

    !(has_first && has_size)
}

/// Array rule: element indices are exactly `1..=size` with `size > 0`.
pub fn is_array(entries: &[(String, String)], sub_key: &str) -> bool {
    let indices = element_indices(entries, sub_key);
    let size = declared_size(entries, sub_key);

    if indices.is_empty() || size == 0 || indices.len() < size {
        return false;
    }

    indices.iter().copied().eq(1..=size)
}

/// Integer stored at `sub_key/size`, 0 if absent or not a number.
pub fn declared_size(entries: &[(String, String)], sub_key: &str) -> usize {
    let size_key = format!("{}{SIZE_KEY}", child_prefix(sub_key));
    entries
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(&size_key))
        .and_then(|(_, v)| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Distinct positive `n` for which some key matches `sub_key/n/...`.
pub fn element_indices(entries: &[(String, String)], sub_key: &str) -> BTreeSet<usize> {
    let prefix = child_prefix(sub_key);
    entries
        .iter()
        .filter_map(|(k, _)| strip_prefix_ci(k, &prefix))
        .filter_map(|rest| rest.split_once('/'))
        .filter_map(|(n, _)| n.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .collect()
}

/// Field names of the first element (`sub_key/1/<field>`), in stored order.
pub fn element_fields(entries: &[(String, String)], sub_key: &str) -> Vec<String> {
    let first_element = format!("{}1/", child_prefix(sub_key));
    let mut fields: Vec<String> = Vec::new();
    for field in entries
        .iter()
        .filter_map(|(k, _)| strip_prefix_ci(k, &first_element))
    {
        if !field.is_empty() && !fields.iter().any(|f| f.eq_ignore_ascii_case(field)) {
            fields.push(field.to_string());
        }
    }
    fields
}

/// Keys strictly below `sub_key`.
pub fn descendants<'a>(
    entries: &'a [(String, String)],
    sub_key: &str,
) -> impl Iterator<Item = &'a str> {
    let prefix = child_prefix(sub_key);
    entries
        .iter()
        .map(|(k, _)| k.as_str())
        .filter(move |k| strip_prefix_ci(k, &prefix).is_some_and(|rest| !rest.is_empty()))
}

/// Keys directly below `scope` (no further `/`).
pub fn child_keys(entries: &[(String, String)], scope: &str) -> Vec<String> {
    relative_keys(entries, scope)
        .filter(|rel| !rel.contains('/'))
        .map(str::to_string)
        .collect()
}

/// Distinct first segments of nested keys below `scope`, in stored order.
pub fn child_groups(entries: &[(String, String)], scope: &str) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for rel in relative_keys(entries, scope) {
        if let Some((group, _)) = rel.split_once('/')
            && !groups.iter().any(|g| g == group)
        {
            groups.push(group.to_string());
        }
    }
    groups
}

/// Every key below `scope`, relative to it.
pub fn all_keys(entries: &[(String, String)], scope: &str) -> Vec<String> {
    relative_keys(entries, scope).map(str::to_string).collect()
}

fn has_children(entries: &[(String, String)], sub_key: &str) -> bool {
    descendants(entries, sub_key).next().is_some()
}

fn relative_keys<'a>(
    entries: &'a [(String, String)],
    scope: &str,
) -> impl Iterator<Item = &'a str> {
    let prefix = child_prefix(scope);
    entries
        .iter()
        .filter_map(move |(k, _)| strip_prefix_ci(k, &prefix))
        .filter(|rel| !rel.is_empty())
}

/// `key` without a leading `prefix`, matched ASCII case-insensitively.
pub fn strip_prefix_ci<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .and_then(|_| key.get(prefix.len()..))
}

fn child_prefix(sub_key: &str) -> String {
    if sub_key.is_empty() {
        String::new()
    } else {
        format!("{sub_key}/")
    }
}
