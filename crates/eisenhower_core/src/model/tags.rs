//! Tag set attached to each task.
//!
//! # Invariants
//! - Tags are trimmed on insertion; blank tags are dropped.
//! - Membership is case-insensitive: `Work` and `work` are the same tag, and
//!   the first spelling seen is the one kept for display and storage.
//! - Iteration order is sorted by the case-folded key, so the JSON storage
//!   form is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Set of short labels keyed by their case-folded form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one tag. Returns `false` for blank values or when the tag is
    /// already present under any casing; the existing spelling is kept.
    pub fn insert(&mut self, tag: &str) -> bool {
        let Some(display) = normalize_tag(tag) else {
            return false;
        };
        let key = tag_key(display);
        if self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, display.to_string());
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        normalize_tag(tag).is_some_and(|value| self.0.remove(&tag_key(value)).is_some())
    }

    pub fn contains(&self, tag: &str) -> bool {
        normalize_tag(tag).is_some_and(|value| self.0.contains_key(&tag_key(value)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display spellings, ordered by case-folded key.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    /// Whether both sets share at least one tag, ignoring case.
    pub fn intersects(&self, other: &TagSet) -> bool {
        self.0.keys().any(|key| other.0.contains_key(key))
    }

    /// Storage form: a JSON array of strings (`[]` when empty).
    pub fn to_json(&self) -> String {
        serde_json::Value::from(self.iter().map(str::to_string).collect::<Vec<_>>()).to_string()
    }

    /// Parses the storage form produced by [`TagSet::to_json`].
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<String>>(raw).map(Self::from)
    }

    /// Parses hand-edited text: a JSON array, or a comma-separated list.
    ///
    /// Anything else (for example a JSON object) yields an empty set.
    pub fn parse_lenient(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('[') || trimmed.starts_with('{') || trimmed.starts_with('"') {
            return Self::from_json(trimmed).unwrap_or_default();
        }
        trimmed.split(',').collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for tag in iter {
            tags.insert(tag.as_ref());
        }
        tags
    }
}

impl From<Vec<String>> for TagSet {
    fn from(value: Vec<String>) -> Self {
        value.iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(value: TagSet) -> Self {
        value.0.into_values().collect()
    }
}

/// Trims one tag value; returns `None` for blank input.
pub fn normalize_tag(tag: &str) -> Option<&str> {
    let trimmed = tag.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn tag_key(tag: &str) -> String {
    tag.to_lowercase()
}
