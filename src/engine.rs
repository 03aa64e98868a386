//! Hashing Orchestrator - Single Entry Point
//!
//! Consumes the digest function, filename templater, stale-artifact
//! locator, and asset library to implement the per-file hash-and-publish
//! algorithm. Files are processed one at a time in input order; a
//! filesystem failure aborts the remaining batch.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::digest;
use crate::library::{AssetLibrary, AssetRecord};
use crate::locator;
use crate::manifest;
use crate::template::{self, TemplateValues};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static ARTIFACT_WRITE_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_artifact_write_count() -> u32 {
    ARTIFACT_WRITE_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_artifact_write_count() {
    ARTIFACT_WRITE_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// A file to be hashed: a path on disk, or an in-memory buffer carrying
/// an explicit path.
#[derive(Debug, Clone)]
pub enum FileInput {
    Path(PathBuf),
    Buffer { path: PathBuf, contents: Vec<u8> },
}

impl FileInput {
    pub fn path(&self) -> &Path {
        match self {
            FileInput::Path(path) => path,
            FileInput::Buffer { path, .. } => path,
        }
    }

    /// Content for hashing. Missing files read as empty, which downstream
    /// becomes the non-error "no hash" outcome.
    fn read_contents(&self, resolved: &Path) -> io::Result<Vec<u8>> {
        match self {
            FileInput::Buffer { contents, .. } => Ok(contents.clone()),
            FileInput::Path(_) => match fs::read(resolved) {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
                Err(e) => Err(e),
            },
        }
    }
}

impl From<&str> for FileInput {
    fn from(path: &str) -> Self {
        FileInput::Path(PathBuf::from(path))
    }
}

impl From<PathBuf> for FileInput {
    fn from(path: PathBuf) -> Self {
        FileInput::Path(path)
    }
}

/// Batch result shape: one bare record for exactly one processed file,
/// an ordered sequence otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum HashOutcome {
    Single(AssetRecord),
    Many(Vec<AssetRecord>),
}

impl HashOutcome {
    pub fn records(&self) -> &[AssetRecord] {
        match self {
            HashOutcome::Single(record) => std::slice::from_ref(record),
            HashOutcome::Many(records) => records,
        }
    }

    pub fn into_records(self) -> Vec<AssetRecord> {
        match self {
            HashOutcome::Single(record) => vec![record],
            HashOutcome::Many(records) => records,
        }
    }
}

/// The hashing engine: one session configuration plus the asset library
/// it keeps as the source of truth for the manifest.
pub struct AssetHasher {
    config: Config,
    library: AssetLibrary,
}

impl AssetHasher {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            library: AssetLibrary::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// The live asset library.
    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut AssetLibrary {
        &mut self.library
    }

    /// Clear the library.
    pub fn reset(&mut self) {
        self.library.reset();
    }

    /// Populate the library from the configured manifest file. A missing,
    /// unreadable, or empty manifest leaves the library unchanged.
    pub fn load_manifest(&mut self) {
        if let Some(file) = self.config.manifest_file() {
            let loaded = manifest::load(&file);
            if !loaded.is_empty() {
                self.library = loaded;
            }
        }
    }

    /// Persist the full library to the configured manifest file. A no-op
    /// when persistence is disabled.
    pub fn save_manifest(&self) -> Result<(), EngineError> {
        match self.config.manifest_file() {
            Some(file) => manifest::save(&file, &self.library)?,
            None => debug!("manifest persistence disabled, skipping save"),
        }
        Ok(())
    }

    /// Hash a batch of inputs: concrete paths, glob patterns, directories,
    /// or in-memory buffers, in any mixture. `overrides` adjusts the
    /// session configuration for this call only.
    pub fn hash<I>(
        &mut self,
        inputs: I,
        overrides: Option<&Map<String, Value>>,
    ) -> Result<HashOutcome, EngineError>
    where
        I: IntoIterator<Item = FileInput>,
    {
        let cfg = match overrides {
            Some(map) => self.config.merged_with(map),
            None => self.config.clone(),
        };

        let mut records = Vec::new();
        for input in inputs {
            match input {
                FileInput::Buffer { .. } => records.push(self.hash_file(&input, &cfg)?),
                FileInput::Path(ref path) => self.expand_path(path, &cfg, &mut records)?,
            }
        }

        if records.len() == 1 {
            Ok(HashOutcome::Single(records.remove(0)))
        } else {
            Ok(HashOutcome::Many(records))
        }
    }

    /// Expand one path input into concrete files: glob patterns via the
    /// glob crate, directories via an iterative walk, anything else as-is.
    fn expand_path(
        &mut self,
        raw: &Path,
        cfg: &Config,
        out: &mut Vec<AssetRecord>,
    ) -> Result<(), EngineError> {
        let raw_str = raw.to_string_lossy();
        if raw_str.contains(['*', '?', '[']) {
            let pattern = cfg.resolve(raw);
            // Collect matches before hashing anything; artifacts written
            // mid-batch must not feed back into the expansion.
            let matches = glob::glob(&pattern.to_string_lossy())?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| EngineError::Io(e.into_error()))?;
            for path in matches {
                if path.is_dir() {
                    self.walk_dir(&path, cfg, out)?;
                } else if path.is_file() {
                    out.push(self.hash_file(&FileInput::Path(path), cfg)?);
                }
            }
            return Ok(());
        }

        let resolved = cfg.resolve(raw);
        if resolved.is_dir() {
            self.walk_dir(&resolved, cfg, out)
        } else {
            out.push(self.hash_file(&FileInput::Path(raw.to_path_buf()), cfg)?);
            Ok(())
        }
    }

    /// Depth-first directory walk over an explicit worklist. Entries are
    /// sorted by name so batch order is stable across platforms.
    fn walk_dir(
        &mut self,
        dir: &Path,
        cfg: &Config,
        out: &mut Vec<AssetRecord>,
    ) -> Result<(), EngineError> {
        let mut stack = vec![dir.to_path_buf()];
        while let Some(item) = stack.pop() {
            if item.is_dir() {
                let mut entries = Vec::new();
                for entry in fs::read_dir(&item)? {
                    entries.push(entry?.path());
                }
                entries.sort();
                for entry in entries.into_iter().rev() {
                    stack.push(entry);
                }
            } else if item.is_file() {
                out.push(self.hash_file(&FileInput::Path(item), cfg)?);
            }
        }
        Ok(())
    }

    /// The per-file algorithm.
    fn hash_file(&mut self, input: &FileInput, cfg: &Config) -> Result<AssetRecord, EngineError> {
        let resolved = cfg.resolve(input.path());
        let rel = relative_to(&resolved, &cfg.base);
        let rel_str = path_key(&rel);

        let ext = resolved
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = resolved
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = resolved
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        // A path already carrying the hash key is a generated artifact;
        // re-hashing it would produce second-order artifacts on every
        // directory pass.
        if rel_str.contains(&cfg.hash_key) {
            debug!(path = %rel_str, "skipping hashed artifact");
            return Ok(AssetRecord::unhashed(rel_str, ext));
        }

        let prior = self.library.get(&rel_str).cloned();

        let contents = input.read_contents(&resolved)?;
        let hex = digest::digest_hex(&contents, cfg.hasher, cfg.length);
        if hex.is_empty() {
            // Missing or empty content is a "no hash" outcome, not an error.
            let mut record = AssetRecord::unhashed(rel_str, ext);
            if let Some(prior) = prior {
                record.hash = prior.hash;
                record.path = prior.path;
            }
            return Ok(record);
        }

        let new_hash = format!("{}{}", cfg.hash_key, hex);

        // Unchanged content: the artifact is already current and nothing
        // on disk moves.
        if let Some(prior) = prior {
            if prior.hash == new_hash {
                return Ok(prior);
            }
        }

        let file_name = template::render(
            &cfg.template,
            &TemplateValues {
                name: &name,
                hash: &new_hash,
                ext: &ext,
            },
        );
        let target = dir.join(&file_name);

        for stale in locator::find_stale(&dir, &name, &ext, &cfg.template, &cfg.hash_key)? {
            debug!(path = %stale.display(), "removing superseded artifact");
            fs::remove_file(&stale)?;
        }

        if cfg.save {
            #[cfg(feature = "test-hooks")]
            ARTIFACT_WRITE_COUNT.fetch_add(1, Ordering::SeqCst);

            fs::write(&target, &contents)?;
            debug!(path = %target.display(), "artifact written");
        }

        if cfg.replace {
            fs::remove_file(&resolved)?;
            debug!(path = %resolved.display(), "original removed");
        }

        let record = AssetRecord {
            original: rel_str,
            path: path_key(&relative_to(&target, &cfg.base)),
            hash: new_hash,
            hashed: true,
            kind: ext,
        };
        self.library.insert(record.clone());
        Ok(record)
    }
}

impl Default for AssetHasher {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn engine_in(dir: &Path) -> AssetHasher {
        let mut cfg = Config::default();
        cfg.base = dir.to_path_buf();
        cfg.path = dir.to_path_buf();
        cfg.manifest = None;
        AssetHasher::new(cfg)
    }

    #[test]
    fn test_buffer_input_is_hashed_and_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut hasher = engine_in(dir.path());

        let outcome = hasher
            .hash(
                [FileInput::Buffer {
                    path: PathBuf::from("style.css"),
                    contents: b"body{}".to_vec(),
                }],
                None,
            )
            .unwrap();

        let records = outcome.into_records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert!(record.hashed);
        assert!(record.hash.starts_with("aH4urS"));
        assert!(dir.path().join(&record.path).exists());
    }

    #[test]
    fn test_artifact_path_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = "logo-aH4urS12345.png";
        fs::write(dir.path().join(artifact), b"binary").unwrap();

        let mut hasher = engine_in(dir.path());
        let outcome = hasher.hash([FileInput::from(artifact)], None).unwrap();

        let records = outcome.into_records();
        assert_eq!(records.len(), 1);
        assert!(!records[0].hashed);
        assert_eq!(records[0].path, artifact);
        assert!(hasher.library().is_empty());
    }

    #[test]
    fn test_missing_file_is_no_hash_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let mut hasher = engine_in(dir.path());

        let outcome = hasher.hash([FileInput::from("ghost.js")], None).unwrap();
        let records = outcome.into_records();
        assert!(!records[0].hashed);
        assert!(records[0].hash.is_empty());
        assert_eq!(records[0].path, "ghost.js");
    }

    #[test]
    fn test_empty_batch_is_many_of_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut hasher = engine_in(dir.path());
        let outcome = hasher.hash(Vec::<FileInput>::new(), None).unwrap();
        assert!(matches!(outcome, HashOutcome::Many(ref v) if v.is_empty()));
    }

    #[test]
    fn test_overrides_do_not_touch_session_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"content").unwrap();

        let mut hasher = engine_in(dir.path());
        let mut overrides = Map::new();
        overrides.insert("length".to_string(), json!(4));

        let outcome = hasher
            .hash([FileInput::from("a.txt")], Some(&overrides))
            .unwrap();
        let record = &outcome.records()[0];
        assert_eq!(record.hash.len(), "aH4urS".len() + 4);
        assert_eq!(hasher.config().length, 10);
    }

    #[test]
    fn test_glob_input_selects_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.css"), b"a").unwrap();
        fs::write(dir.path().join("b.css"), b"b").unwrap();
        fs::write(dir.path().join("c.js"), b"c").unwrap();

        let mut hasher = engine_in(dir.path());
        let outcome = hasher.hash([FileInput::from("*.css")], None).unwrap();

        let records = outcome.into_records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.kind == "css"));
    }
}
