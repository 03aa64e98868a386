//! Digest System - Content Hashes for Cache Busting
//!
//! Computes the full digest first, then truncates. Truncation never re-hashes.

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// Digest algorithms exposed by the crypto provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 6] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown hash algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

/// List the digest algorithm names the provider supports.
///
/// Used by configuration validation and the CLI; callers must not
/// hardcode this set.
pub fn supported_hashers() -> Vec<&'static str> {
    HashAlgorithm::ALL.iter().map(|a| a.name()).collect()
}

/// Hex digest of `content` under `algorithm`, truncated to `length` characters.
///
/// Empty content produces an empty string, not a digest of zero bytes.
pub fn digest_hex(content: &[u8], algorithm: HashAlgorithm, length: usize) -> String {
    if content.is_empty() {
        return String::new();
    }

    let mut digest = match algorithm {
        HashAlgorithm::Md5 => hex::encode(Md5::digest(content)),
        HashAlgorithm::Sha1 => hex::encode(Sha1::digest(content)),
        HashAlgorithm::Sha224 => hex::encode(Sha224::digest(content)),
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(content)),
        HashAlgorithm::Sha384 => hex::encode(Sha384::digest(content)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(content)),
    };

    digest.truncate(length);
    digest
}

// We need hex encoding
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
