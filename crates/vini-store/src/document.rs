//! INI document model
//!
//! Parses and renders the text form used by [`crate::IniFileStore`]:
//!
//! ```text
//! [section]
//! key=value
//! nested\key=value
//! ```
//!
//! Lines starting with `;` or `#` are comments and are not preserved.
//! Entries that appear before the first section header are ignored.

use tracing::debug;

use crate::{to_logical, to_physical};

/// One named section with its entries in stored order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    /// Create an empty section
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Section name as stored
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries as (logical key, value) pairs
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Look up a value by key (ASCII case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.entries[i].1.as_str())
    }

    /// Insert or overwrite a value. New keys are appended.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.position(key) {
            Some(i) => value.clone_into(&mut self.entries[i].1),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    /// Remove a key, returning whether it was present
    pub fn remove(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }
}

/// Ordered collection of sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<Section>,
}

impl IniDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text. Malformed lines are skipped.
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::new();
        let mut current: Option<usize> = None;

        for (line_num, line) in text.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = Some(doc.section_index_or_insert(name.trim()));
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                debug!("Skipping line {} without '=': {line}", line_num + 1);
                continue;
            };

            let Some(index) = current else {
                debug!("Skipping line {} outside any section", line_num + 1);
                continue;
            };

            let key = to_logical(key.trim());
            if key.is_empty() {
                continue;
            }
            doc.sections[index].set(&key, decode_value(value));
        }

        doc
    }

    /// Render the document as INI text
    pub fn render(&self) -> String {
        let mut output = String::new();

        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            output.push('[');
            output.push_str(&section.name);
            output.push_str("]\n");

            for (key, value) in &section.entries {
                output.push_str(&to_physical(key));
                output.push('=');
                output.push_str(&encode_value(value));
                output.push('\n');
            }
        }

        output
    }

    /// All sections in stored order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Section names in stored order
    pub fn section_names(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.name.clone()).collect()
    }

    /// Look up a section (ASCII case-insensitive)
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Look up a single value
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Insert or overwrite a value, creating the section if needed
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let index = self.section_index_or_insert(section);
        self.sections[index].set(key, value);
    }

    /// Remove one key. The (possibly empty) section header stays.
    pub fn remove_key(&mut self, section: &str, key: &str) -> bool {
        self.sections
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(section))
            .is_some_and(|s| s.remove(key))
    }

    /// Remove a section with all of its keys
    pub fn remove_section(&mut self, name: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| !s.name.eq_ignore_ascii_case(name));
        self.sections.len() != before
    }

    /// True when the document has no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(i) = self
            .sections
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
        {
            return i;
        }
        self.sections.push(Section::new(name));
        self.sections.len() - 1
    }
}

/// Quote values whose edges would otherwise be lost when parsing.
fn encode_value(value: &str) -> String {
    let quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    if quoted || value != value.trim() {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

fn decode_value(raw: &str) -> &str {
    let value = raw.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_sections_and_keys() {
        let text = "; leading comment\n\
                    [app]\n\
                    version=1.0\n\
                    window\\width = 800\n\
                    \n\
                    # another comment\n\
                    [servers]\n\
                    1\\host=a\n\
                    size=1\n";
        let doc = IniDocument::parse(text);

        assert_eq!(doc.section_names(), vec!["app", "servers"]);
        assert_eq!(doc.get("app", "version"), Some("1.0"));
        assert_eq!(doc.get("app", "window/width"), Some("800"));
        assert_eq!(doc.get("servers", "1/host"), Some("a"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let doc = IniDocument::parse("[App]\nVersion=2\n");
        assert_eq!(doc.get("app", "version"), Some("2"));
        assert_eq!(doc.section("APP").map(Section::name), Some("App"));
    }

    #[test]
    fn test_entries_before_header_are_ignored() {
        let doc = IniDocument::parse("orphan=1\n[a]\nk=v\n");
        assert_eq!(doc.section_names(), vec!["a"]);
        assert_eq!(doc.get("a", "orphan"), None);
    }

    #[test]
    fn test_duplicate_headers_merge() {
        let doc = IniDocument::parse("[a]\nx=1\n[b]\ny=2\n[A]\nz=3\n");
        assert_eq!(doc.section_names(), vec!["a", "b"]);
        assert_eq!(doc.get("a", "z"), Some("3"));
    }

    #[test]
    fn test_render_translates_separator() {
        let mut doc = IniDocument::new();
        doc.set("app", "window/width", "800");
        doc.set("app", "title", "demo");
        doc.set("other", "k", "v");

        assert_eq!(
            doc.render(),
            "[app]\nwindow\\width=800\ntitle=demo\n\n[other]\nk=v\n"
        );
        assert_eq!(IniDocument::parse(&doc.render()), doc);
    }

    #[test]
    fn test_value_edges_survive_render() {
        let mut doc = IniDocument::new();
        doc.set("s", "padded", "  two spaces ");
        doc.set("s", "quoted", "\"already quoted\"");
        doc.set("s", "inner", "say \"hi\" now");
        doc.set("s", "empty", "");

        let parsed = IniDocument::parse(&doc.render());
        assert_eq!(parsed.get("s", "padded"), Some("  two spaces "));
        assert_eq!(parsed.get("s", "quoted"), Some("\"already quoted\""));
        assert_eq!(parsed.get("s", "inner"), Some("say \"hi\" now"));
        assert_eq!(parsed.get("s", "empty"), Some(""));
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut doc = IniDocument::new();
        doc.set("a", "first", "1");
        doc.set("a", "second", "2");
        doc.set("a", "FIRST", "3");

        let entries = doc.section("a").map(Section::entries).unwrap_or_default();
        assert_eq!(
            entries,
            &[
                ("first".to_string(), "3".to_string()),
                ("second".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_remove_key_keeps_header() {
        let mut doc = IniDocument::parse("[a]\nk=v\n");
        assert!(doc.remove_key("a", "k"));
        assert!(!doc.remove_key("a", "k"));
        assert_eq!(doc.section_names(), vec!["a"]);

        assert!(doc.remove_section("A"));
        assert!(!doc.remove_section("a"));
        assert!(doc.is_empty());
    }
}
