//! AssetStamp Core - Cache-Busting Asset Engine
//!
//! # The Guarantees (Non-Negotiable)
//! 1. Hashes Derive From Content
//! 2. Unchanged Content Never Rewrites
//! 3. At Most One Current Artifact Per Source
//! 4. Superseded Artifacts Are Removed
//! 5. The Manifest Mirrors The Library

pub mod config;
pub mod digest;
pub mod engine;
pub mod library;
pub mod locator;
pub mod manifest;
pub mod template;

pub use config::{Config, DEFAULT_HASH_KEY, DEFAULT_MANIFEST};
pub use digest::{digest_hex, supported_hashers, HashAlgorithm};
pub use engine::{AssetHasher, EngineError, FileInput, HashOutcome};
pub use library::{AssetLibrary, AssetRecord, RecordPatch};
pub use template::{render, TemplateValues, DEFAULT_TEMPLATE};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
