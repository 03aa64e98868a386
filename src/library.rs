//! Asset Library - Source of Truth for the Manifest
//!
//! One record per source file that has ever been hashed, keyed by the
//! source's base-relative path.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hashing record for one original source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Source path relative to the configured base directory. Identity key.
    pub original: String,
    /// Currently-valid artifact path; equals `original` when not hashed.
    pub path: String,
    /// Hash-key-prefixed digest, or empty if never hashed.
    #[serde(default)]
    pub hash: String,
    /// Whether `path` differs from `original` due to successful hashing.
    #[serde(default)]
    pub hashed: bool,
    /// File extension without the leading separator.
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl AssetRecord {
    /// A record for a source that has not (yet) been hashed.
    pub fn unhashed(original: impl Into<String>, kind: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            path: original.clone(),
            original,
            hash: String::new(),
            hashed: false,
            kind: kind.into(),
        }
    }
}

/// Field-merge patch for an existing record. `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub path: Option<String>,
    pub hash: Option<String>,
    pub hashed: Option<bool>,
    pub kind: Option<String>,
}

/// Mapping from original path to its current hashing record.
///
/// Serializes as the flat manifest object: one JSON key per source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetLibrary {
    assets: HashMap<String, AssetRecord>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live mapping. Callers are handed a reference, not a copy.
    pub fn all(&self) -> &HashMap<String, AssetRecord> {
        &self.assets
    }

    /// Look up a record by original path. Absent is not an error.
    pub fn get(&self, original: &str) -> Option<&AssetRecord> {
        self.assets.get(original)
    }

    /// Insert or replace the record keyed by its `original` path.
    pub fn insert(&mut self, record: AssetRecord) {
        self.assets.insert(record.original.clone(), record);
    }

    /// Merge supplied fields into an existing record. No-op when absent.
    pub fn update(&mut self, original: &str, patch: RecordPatch) {
        if let Some(record) = self.assets.get_mut(original) {
            if let Some(path) = patch.path {
                record.path = path;
            }
            if let Some(hash) = patch.hash {
                record.hash = hash;
            }
            if let Some(hashed) = patch.hashed {
                record.hashed = hashed;
            }
            if let Some(kind) = patch.kind {
                record.kind = kind;
            }
        }
    }

    /// Clear all records, returning the now-empty mapping.
    pub fn reset(&mut self) -> &HashMap<String, AssetRecord> {
        self.assets.clear();
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AssetRecord {
        AssetRecord {
            original: "img/logo.png".to_string(),
            path: "img/logo-aH4urS1a2b3c4d5e.png".to_string(),
            hash: "aH4urS1a2b3c4d5e".to_string(),
            hashed: true,
            kind: "png".to_string(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut lib = AssetLibrary::new();
        lib.insert(sample());
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.get("img/logo.png").unwrap().kind, "png");
    }

    #[test]
    fn test_get_absent_is_none() {
        let lib = AssetLibrary::new();
        assert!(lib.get("nope.css").is_none());
    }

    #[test]
    fn test_update_merges_fields() {
        let mut lib = AssetLibrary::new();
        lib.insert(sample());
        lib.update(
            "img/logo.png",
            RecordPatch {
                hash: Some("aH4urSffff".to_string()),
                ..Default::default()
            },
        );
        let rec = lib.get("img/logo.png").unwrap();
        assert_eq!(rec.hash, "aH4urSffff");
        // untouched fields survive
        assert!(rec.hashed);
        assert_eq!(rec.kind, "png");
    }

    #[test]
    fn test_update_absent_is_noop() {
        let mut lib = AssetLibrary::new();
        lib.update(
            "ghost.js",
            RecordPatch {
                hashed: Some(true),
                ..Default::default()
            },
        );
        assert!(lib.is_empty());
    }

    #[test]
    fn test_reset_returns_empty_mapping() {
        let mut lib = AssetLibrary::new();
        lib.insert(sample());
        let map = lib.reset();
        assert!(map.is_empty());
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut lib = AssetLibrary::new();
        lib.insert(sample());
        let json = serde_json::to_value(&lib).unwrap();
        let entry = &json["img/logo.png"];
        assert_eq!(entry["type"], "png");
        assert_eq!(entry["hashed"], true);
        assert_eq!(entry["original"], "img/logo.png");
    }
}
