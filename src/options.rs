//! Case-insensitive image option store.
//!
//! Options are opaque pass-through metadata attached to an image, such as
//! codec hints for quality or resolution. The engine stores and transports
//! them but never interprets them.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// Option names understood by common codec providers.
///
/// The engine treats these like any other key; they are published so
/// providers and callers agree on spelling.
pub mod names {
    pub const QUALITY: &str = "quality";
    pub const FILENAME: &str = "FileName";
    pub const RESOLUTION: &str = "Resolution";
    pub const RESOLUTION_X: &str = "ResolutionX";
    pub const RESOLUTION_Y: &str = "ResolutionY";
    pub const RESOLUTION_UNIT: &str = "ResolutionUnit";
    pub const MAX_WIDTH: &str = "MaxWidth";
    pub const MAX_HEIGHT: &str = "MaxHeight";
    pub const ORIGINAL_WIDTH: &str = "OriginalWidth";
    pub const ORIGINAL_HEIGHT: &str = "OriginalHeight";
}

/// A stored option value: free-form string or integer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    Str(String),
    Int(i32),
}

/// String-keyed option map with case-insensitive keys.
///
/// Lookup and replacement compare keys with ASCII case folding; the key
/// case used at first insertion is preserved. The store is a linear-scan
/// vec; option counts are tiny and iteration order is insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageOptions {
    entries: Vec<(String, OptionValue)>,
}

impl ImageOptions {
    /// Empty option store.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Set a string-valued option, replacing any existing value under the
    /// same (case-folded) key.
    pub fn set_str(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, OptionValue::Str(value.into()));
    }

    /// Set an integer-valued option.
    pub fn set_int(&mut self, name: &str, value: i32) {
        self.set(name, OptionValue::Int(value));
    }

    fn set(&mut self, name: &str, value: OptionValue) {
        match self.position(name) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Get an option as a string. Integer values are rendered in decimal.
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.position(name).map(|i| match &self.entries[i].1 {
            OptionValue::Str(s) => s.clone(),
            OptionValue::Int(v) => v.to_string(),
        })
    }

    /// Get an option as an integer. String values are parsed; unparsable
    /// strings yield `None`.
    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.position(name).and_then(|i| match &self.entries[i].1 {
            OptionValue::Str(s) => s.trim().parse().ok(),
            OptionValue::Int(v) => Some(*v),
        })
    }

    /// Whether an option with this key is present.
    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove an option. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Str(s) => f.write_str(s),
            OptionValue::Int(v) => write!(f, "{v}"),
        }
    }
}
