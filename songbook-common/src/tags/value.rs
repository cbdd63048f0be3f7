use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

/// A stored or resolved tag value
///
/// Text values may carry several values separated by `\n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Int(i64),
    Float(f64),
    Text(String),
    Path(PathBuf),
}

impl TagValue {
    /// The empty text value, the default of most lookups
    pub fn empty() -> Self {
        TagValue::Text(String::new())
    }

    pub fn is_number(&self) -> bool {
        matches!(self, TagValue::Int(_) | TagValue::Float(_))
    }

    /// True only for empty text
    pub fn is_empty_text(&self) -> bool {
        matches!(self, TagValue::Text(s) if s.is_empty())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Int(i) => Some(*i as f64),
            TagValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TagValue::Int(i) => Some(*i),
            TagValue::Float(f) => Some(f.trunc() as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text rendering (paths lossily, numbers in their shortest form)
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            TagValue::Text(s) => Cow::Borrowed(s),
            TagValue::Path(p) => p.to_string_lossy(),
            TagValue::Int(i) => Cow::Owned(i.to_string()),
            TagValue::Float(f) => Cow::Owned(f.to_string()),
        }
    }

    /// Split into individual values; numbers and paths are a single value
    pub fn values(&self) -> Vec<String> {
        match self {
            TagValue::Text(s) if s.is_empty() => Vec::new(),
            TagValue::Text(s) => s.split('\n').map(str::to_string).collect(),
            other => vec![other.to_text().into_owned()],
        }
    }
}

impl Default for TagValue {
    fn default() -> Self {
        TagValue::empty()
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Text(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::Text(s)
    }
}

impl From<i64> for TagValue {
    fn from(i: i64) -> Self {
        TagValue::Int(i)
    }
}

impl From<i32> for TagValue {
    fn from(i: i32) -> Self {
        TagValue::Int(i64::from(i))
    }
}

impl From<u32> for TagValue {
    fn from(i: u32) -> Self {
        TagValue::Int(i64::from(i))
    }
}

impl From<f64> for TagValue {
    fn from(f: f64) -> Self {
        TagValue::Float(f)
    }
}

impl From<PathBuf> for TagValue {
    fn from(p: PathBuf) -> Self {
        TagValue::Path(p)
    }
}

impl From<&Path> for TagValue {
    fn from(p: &Path) -> Self {
        TagValue::Path(p.to_path_buf())
    }
}
