//! Configuration Surface - Typed Options plus Extension Store
//!
//! Known options are typed fields; unknown keys pass through a generic
//! side-channel so callers can carry arbitrary metadata via `get`/`set`.

use crate::digest::HashAlgorithm;
use crate::template::DEFAULT_TEMPLATE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Literal marker prefixed to every digest. This is what distinguishes a
/// generated artifact filename from a hand-authored one.
pub const DEFAULT_HASH_KEY: &str = "aH4urS";

pub const DEFAULT_MANIFEST: &str = "assets.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Digest algorithm identifier.
    pub hasher: HashAlgorithm,
    /// Marker prefixed to every digest.
    pub hash_key: String,
    /// Max digest character length retained.
    pub length: usize,
    /// Delete the original source once the hashed artifact is written.
    pub replace: bool,
    /// Filename for the persisted library; `None` disables persistence.
    pub manifest: Option<String>,
    /// Root directory; recorded paths are relative to it.
    pub base: PathBuf,
    /// Directory the manifest file is written into.
    pub path: PathBuf,
    /// When false, record the hash/path but skip writing the artifact.
    pub save: bool,
    /// Pattern for the rendered hashed filename.
    pub template: String,
    /// Unrecognized keys, stored verbatim. No effect on hashing.
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hasher: HashAlgorithm::Sha1,
            hash_key: DEFAULT_HASH_KEY.to_string(),
            length: 10,
            replace: false,
            manifest: Some(DEFAULT_MANIFEST.to_string()),
            base: PathBuf::from("."),
            path: PathBuf::from("."),
            save: true,
            template: DEFAULT_TEMPLATE.to_string(),
            extra: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one option by name. Unknown keys yield `Value::Null`.
    pub fn get(&self, key: &str) -> Value {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.get(key).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Set one option by name. Known keys are coerced to their typed form;
    /// values of the wrong shape are ignored. Unknown keys are stored in
    /// the extension map.
    pub fn set(&mut self, key: &str, value: &Value) {
        match key {
            "hasher" => match value.as_str().map(str::parse) {
                Some(Ok(algo)) => self.hasher = algo,
                _ => warn!(%value, "ignoring invalid hasher option"),
            },
            "hashKey" => match value.as_str() {
                Some(s) => self.hash_key = s.to_string(),
                None => warn!(%value, "ignoring invalid hashKey option"),
            },
            "length" => match value.as_u64() {
                Some(n) => self.length = n as usize,
                None => warn!(%value, "ignoring invalid length option"),
            },
            "replace" => match value.as_bool() {
                Some(b) => self.replace = b,
                None => warn!(%value, "ignoring invalid replace option"),
            },
            "save" => match value.as_bool() {
                Some(b) => self.save = b,
                None => warn!(%value, "ignoring invalid save option"),
            },
            "manifest" => match value {
                Value::Bool(false) | Value::Null => self.manifest = None,
                Value::String(s) if s.is_empty() => self.manifest = None,
                Value::String(s) => self.manifest = Some(s.clone()),
                _ => warn!(%value, "ignoring invalid manifest option"),
            },
            "base" => match value.as_str() {
                Some(s) => self.base = PathBuf::from(s),
                None => warn!(%value, "ignoring invalid base option"),
            },
            "path" => match value.as_str() {
                Some(s) => self.path = PathBuf::from(s),
                None => warn!(%value, "ignoring invalid path option"),
            },
            "template" => match value.as_str() {
                Some(s) => self.template = s.to_string(),
                None => warn!(%value, "ignoring invalid template option"),
            },
            _ => {
                self.extra.insert(key.to_string(), value.clone());
            }
        }
    }

    /// Effective configuration for one call: this config with `overrides`
    /// applied. The session default is not mutated.
    pub fn merged_with(&self, overrides: &serde_json::Map<String, Value>) -> Config {
        let mut merged = self.clone();
        for (key, value) in overrides {
            merged.set(key, value);
        }
        merged
    }

    /// Whether manifest persistence is enabled (false/empty name disables).
    pub fn manifest_enabled(&self) -> bool {
        self.manifest.as_deref().is_some_and(|name| !name.is_empty())
    }

    /// Location of the manifest file, or `None` when persistence is disabled.
    pub fn manifest_file(&self) -> Option<PathBuf> {
        self.manifest
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| self.path.join(name))
    }

    /// Resolve an asset path against the base directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.hasher, HashAlgorithm::Sha1);
        assert_eq!(cfg.hash_key, "aH4urS");
        assert_eq!(cfg.length, 10);
        assert!(!cfg.replace);
        assert!(cfg.save);
        assert_eq!(cfg.template, "{name}-{hash}.{ext}");
        assert_eq!(cfg.manifest.as_deref(), Some("assets.json"));
    }

    #[test]
    fn test_get_known_key() {
        let cfg = Config::default();
        assert_eq!(cfg.get("hashKey"), json!("aH4urS"));
        assert_eq!(cfg.get("length"), json!(10));
    }

    #[test]
    fn test_get_unknown_key_is_null() {
        let cfg = Config::default();
        assert_eq!(cfg.get("notAnOption"), Value::Null);
    }

    #[test]
    fn test_set_unknown_key_round_trips() {
        let mut cfg = Config::default();
        cfg.set("buildTag", &json!("release-7"));
        assert_eq!(cfg.get("buildTag"), json!("release-7"));
    }

    #[test]
    fn test_set_invalid_typed_value_ignored() {
        let mut cfg = Config::default();
        cfg.set("length", &json!("ten"));
        assert_eq!(cfg.length, 10);
        cfg.set("hasher", &json!("crc32"));
        assert_eq!(cfg.hasher, HashAlgorithm::Sha1);
    }

    #[test]
    fn test_manifest_disabled_by_false_or_empty() {
        let mut cfg = Config::default();
        assert!(cfg.manifest_enabled());
        cfg.set("manifest", &json!(false));
        assert!(!cfg.manifest_enabled());
        assert!(cfg.manifest_file().is_none());

        let mut cfg = Config::default();
        cfg.set("manifest", &json!(""));
        assert!(!cfg.manifest_enabled());
    }

    #[test]
    fn test_merged_with_leaves_default_untouched() {
        let cfg = Config::default();
        let mut overrides = serde_json::Map::new();
        overrides.insert("length".to_string(), json!(4));
        overrides.insert("replace".to_string(), json!(true));

        let merged = cfg.merged_with(&overrides);
        assert_eq!(merged.length, 4);
        assert!(merged.replace);
        assert_eq!(cfg.length, 10);
        assert!(!cfg.replace);
    }

    #[test]
    fn test_manifest_file_joins_path_option() {
        let mut cfg = Config::default();
        cfg.set("path", &json!("dist"));
        assert_eq!(cfg.manifest_file().unwrap(), PathBuf::from("dist/assets.json"));
    }

    #[test]
    fn test_deserialize_collects_unknown_keys() {
        let cfg: Config =
            serde_json::from_value(json!({"hasher": "sha256", "fav": [1, 2]})).unwrap();
        assert_eq!(cfg.hasher, HashAlgorithm::Sha256);
        assert_eq!(cfg.get("fav"), json!([1, 2]));
    }
}
