//! Filename Templates - Rendered Artifact Names
//!
//! Placeholders are substituted verbatim. The same template drives both the
//! real target filename and the wildcard pattern used to find superseded
//! artifacts.

use glob::Pattern;

pub const NAME_PLACEHOLDER: &str = "{name}";
pub const HASH_PLACEHOLDER: &str = "{hash}";
pub const EXT_PLACEHOLDER: &str = "{ext}";

/// Default hashed-filename shape: `name-hash.ext`.
pub const DEFAULT_TEMPLATE: &str = "{name}-{hash}.{ext}";

// Stand-in for the hash segment when splitting a template into its
// surrounding literal parts. NUL never appears in a filename.
const HASH_MARKER: char = '\u{0}';

/// Value bundle for a template render.
#[derive(Debug, Clone, Copy)]
pub struct TemplateValues<'a> {
    pub name: &'a str,
    pub hash: &'a str,
    pub ext: &'a str,
}

/// Substitute the three placeholders into `template`. No escaping.
pub fn render(template: &str, values: &TemplateValues) -> String {
    template
        .replace(NAME_PLACEHOLDER, values.name)
        .replace(HASH_PLACEHOLDER, values.hash)
        .replace(EXT_PLACEHOLDER, values.ext)
}

/// Build the glob pattern matching every hashed artifact for one source.
///
/// Literal parts are escaped; the hash slot becomes `hashKey` followed by a
/// wildcard, so the pattern only matches names whose hash segment starts
/// with the configured key.
pub fn stale_pattern(template: &str, name: &str, ext: &str, hash_key: &str) -> String {
    let wildcard = format!("{}*", Pattern::escape(hash_key));
    render(
        template,
        &TemplateValues {
            name: &Pattern::escape(name),
            hash: &wildcard,
            ext: &Pattern::escape(ext),
        },
    )
}

/// The literal text surrounding the hash segment in a rendered filename.
///
/// Returns `None` when the template carries no hash placeholder, in which
/// case no filename can be recognized as a hashed artifact.
pub fn hash_segment_bounds(template: &str, name: &str, ext: &str) -> Option<(String, String)> {
    let marker = HASH_MARKER.to_string();
    let rendered = render(
        template,
        &TemplateValues {
            name,
            hash: &marker,
            ext,
        },
    );
    rendered
        .split_once(HASH_MARKER)
        .map(|(prefix, suffix)| (prefix.to_string(), suffix.to_string()))
}
