//! Stale-Artifact Locator
//!
//! Finds previously generated hashed files for a source so they can be
//! superseded. A filename counts as a prior artifact only when its hash
//! segment starts with the configured hash key followed by digest
//! characters; the original un-hashed filename never matches.

use crate::template;
use glob::Pattern;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Locate on-disk hashed artifacts for the source `name`.`ext` in `dir`.
///
/// Matching is the rendered template with the hash slot widened to
/// `hash_key` + wildcard, then narrowed so the wildcard portion is
/// non-empty hex. A missing directory yields an empty set.
pub fn find_stale(
    dir: &Path,
    name: &str,
    ext: &str,
    template: &str,
    hash_key: &str,
) -> io::Result<Vec<PathBuf>> {
    let Some((prefix, suffix)) = template::hash_segment_bounds(template, name, ext) else {
        return Ok(Vec::new());
    };

    let pattern = template::stale_pattern(template, name, ext, hash_key);
    let matcher = Pattern::new(&pattern)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();

        if matcher.matches(&file_name) && hash_segment_is_digest(&file_name, &prefix, &suffix, hash_key) {
            found.push(entry.path());
        }
    }

    found.sort();
    Ok(found)
}

/// True when `file_name` is `prefix` + `hash_key` + hex digits + `suffix`.
fn hash_segment_is_digest(file_name: &str, prefix: &str, suffix: &str, hash_key: &str) -> bool {
    let Some(rest) = file_name.strip_prefix(prefix) else {
        return false;
    };
    let Some(middle) = rest.strip_suffix(suffix) else {
        return false;
    };
    let Some(digest) = middle.strip_prefix(hash_key) else {
        return false;
    };
    !digest.is_empty() && digest.chars().all(|c| c.is_ascii_hexdigit())
}
