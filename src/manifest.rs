//! Manifest Persistence
//!
//! The manifest is one flat JSON object on disk, one entry per hashed
//! source, keyed by original path. Loading is lenient; a missing or
//! unreadable manifest is simply an empty library.

use crate::library::AssetLibrary;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Load a library from `path`.
///
/// Missing, unreadable, or malformed files are not errors; they yield an
/// empty library.
pub fn load(path: &Path) -> AssetLibrary {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => {
            debug!(path = %path.display(), "no manifest to load");
            return AssetLibrary::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(library) => library,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring malformed manifest");
            AssetLibrary::new()
        }
    }
}

/// Serialize the full record set to `path` as pretty-printed JSON.
pub fn save(path: &Path, library: &AssetLibrary) -> io::Result<()> {
    let json = serde_json::to_string_pretty(library)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), records = library.len(), "manifest saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::AssetRecord;

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let lib = load(&dir.path().join("assets.json"));
        assert!(lib.is_empty());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("assets.json");
        fs::write(&file, b"{not json at all").unwrap();
        let lib = load(&file);
        assert!(lib.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("assets.json");

        let mut lib = AssetLibrary::new();
        lib.insert(AssetRecord {
            original: "app.css".to_string(),
            path: "app-aH4urS0f0f0f0f0f.css".to_string(),
            hash: "aH4urS0f0f0f0f0f".to_string(),
            hashed: true,
            kind: "css".to_string(),
        });
        save(&file, &lib).unwrap();

        let loaded = load(&file);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("app.css"), lib.get("app.css"));
    }
}
