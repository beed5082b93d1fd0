//! Stored values and their typed views
//!
//! Every setting is persisted as one line of text. [`Value`] wraps that text
//! and converts in both directions:
//!
//! | Rust type            | Stored form          |
//! |----------------------|----------------------|
//! | numbers, `bool`      | `42`, `1.5`, `true`  |
//! | `Vec<String>`        | `{"a", "b"}`         |
//! | `serde_json::Value`  | compact JSON         |
//! | [`Bytes`]            | `{0x01,0xab}`        |
//! | [`RangeValue<T>`]    | `low~high`           |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Text of one stored setting
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(String);

impl Value {
    /// Wrap stored text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Stored text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the stored text
    pub fn into_string(self) -> String {
        self.0
    }

    /// True for an empty string
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse as an integer (or any `FromStr` type), ignoring surrounding
    /// whitespace.
    pub fn to_int<T: FromStr>(&self) -> Option<T> {
        self.0.trim().parse().ok()
    }

    /// Parse as a float
    pub fn to_float(&self) -> Option<f64> {
        self.0.trim().parse().ok()
    }

    /// False for empty, `0` and `false` (any case); true otherwise.
    pub fn to_bool(&self) -> bool {
        let text = self.0.trim();
        !(text.is_empty() || text == "0" || text.eq_ignore_ascii_case("false"))
    }

    /// Parse the `{"a", "b"}` list form.
    ///
    /// Unbraced text is split on commas, so a plain `a,b` also reads as a
    /// two-element list.
    pub fn to_string_list(&self) -> Vec<String> {
        let text = self.0.trim();
        let Some(inner) = braced(text) else {
            return split_items(text).map(str::to_string).collect();
        };

        let mut items = Vec::new();
        let mut rest = inner.trim_start();
        while !rest.is_empty() {
            if let Some(quoted) = rest.strip_prefix('"') {
                let (item, after) = unquote(quoted);
                items.push(item);
                rest = after;
            } else {
                let end = rest.find(',').unwrap_or(rest.len());
                items.push(rest[..end].trim().to_string());
                rest = &rest[end..];
            }
            rest = rest.trim_start();
            rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
        }
        items
    }

    /// Parse as JSON
    pub fn to_json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.0).ok()
    }

    /// Parse the `{0x01,0xab}` byte form
    pub fn to_bytes(&self) -> Option<Bytes> {
        let inner = braced(self.0.trim())?;
        split_items(inner)
            .map(|item| {
                let digits = item
                    .strip_prefix("0x")
                    .or_else(|| item.strip_prefix("0X"))
                    .unwrap_or(item);
                u8::from_str_radix(digits, 16).ok()
            })
            .collect::<Option<Vec<u8>>>()
            .map(Bytes)
    }

    /// Parse the `low~high` range form
    pub fn to_range<T: FromStr>(&self) -> Option<RangeValue<T>> {
        let mut parts = self.0.split('~').filter(|part| !part.is_empty());
        let low = parts.next()?.trim().parse().ok()?;
        let high = parts.next()?.trim().parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(RangeValue { low, high })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Value {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl From<&String> for Value {
    fn from(text: &String) -> Self {
        Self(text.clone())
    }
}

impl From<Value> for String {
    fn from(value: Value) -> Self {
        value.0
    }
}

macro_rules! value_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self(v.to_string())
                }
            }
        )*
    };
}

value_from_display!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::from(items.as_slice())
    }
}

impl From<&[String]> for Value {
    fn from(items: &[String]) -> Self {
        list_text(items.iter().map(String::as_str))
    }
}

impl From<&[&str]> for Value {
    fn from(items: &[&str]) -> Self {
        list_text(items.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Value {
    fn from(items: [&str; N]) -> Self {
        list_text(items.into_iter())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self(json.to_string())
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Self(json.to_string())
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        let items: Vec<String> = bytes.0.iter().map(|b| format!("0x{b:02x}")).collect();
        Self(format!("{{{}}}", items.join(",")))
    }
}

impl<T: fmt::Display> From<RangeValue<T>> for Value {
    fn from(range: RangeValue<T>) -> Self {
        Self(format!("{}~{}", range.low, range.high))
    }
}

/// Raw bytes, stored as a braced list of hex literals
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Inclusive pair of bounds, stored as `low~high`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeValue<T> {
    /// Lower bound
    pub low: T,
    /// Upper bound
    pub high: T,
}

impl<T> RangeValue<T> {
    /// Create a range
    pub const fn new(low: T, high: T) -> Self {
        Self { low, high }
    }
}

impl<T> From<(T, T)> for RangeValue<T> {
    fn from((low, high): (T, T)) -> Self {
        Self { low, high }
    }
}

fn list_text<'a>(items: impl Iterator<Item = &'a str>) -> Value {
    let quoted: Vec<String> = items
        .map(|item| format!("\"{}\"", item.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    Value(format!("{{{}}}", quoted.join(", ")))
}

/// Read a quoted item up to its closing `"`, resolving `\"` and `\\`.
/// Returns the item and the text after the closing quote.
fn unquote(text: &str) -> (String, &str) {
    let mut item = String::new();
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return (item, &text[i + 1..]),
            '\\' => match chars.next() {
                Some((_, escaped)) => item.push(escaped),
                None => item.push('\\'),
            },
            _ => item.push(c),
        }
    }
    (item, "")
}

fn braced(text: &str) -> Option<&str> {
    text.strip_prefix('{')?.strip_suffix('}')
}

fn split_items(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|item| !item.is_empty())
}
