//! Output fingerprints.
//!
//! A fingerprint pairs the SHA256 of an artifact with its Shannon entropy. Two
//! runs from the same seed and configuration must produce the same
//! fingerprint; comparing against a stored one catches accidental changes to
//! the simulation.

use std::fmt;

use sha2::{Digest, Sha256};

/// Fingerprint result containing both hash and entropy metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    /// SHA256 hash of the artifact bytes
    pub hash: String,
    /// Shannon entropy in bits per byte
    pub entropy: f64,
}

impl Fingerprint {
    /// Fingerprint `data`.
    #[must_use]
    pub fn of(data: &[u8]) -> Self {
        let hash = format!("{:x}", Sha256::digest(data));
        Self {
            hash,
            entropy: shannon_entropy(data),
        }
    }

    /// Parse a fingerprint from a string in the format: `<hash> entropy=<value>`
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let hash = parts.next()?.to_string();
        let entropy = parts.next()?.strip_prefix("entropy=")?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { hash, entropy })
    }

    /// Compare with another fingerprint. Hash must match exactly, entropy
    /// must be within tolerance (0.01 bits).
    #[must_use]
    pub fn matches(&self, other: &Fingerprint) -> bool {
        self.hash == other.hash && (self.entropy - other.entropy).abs() < 0.01
    }

    /// Compare with an expected string, parsing it first. A bare hash is
    /// compared on the hash alone.
    #[must_use]
    pub fn matches_str(&self, expected: &str) -> bool {
        let expected = expected.trim();
        match Self::parse(expected) {
            Some(expected) => self.matches(&expected),
            None => self.hash == expected,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} entropy={:.4}", self.hash, self.entropy)
    }
}

/// Compute Shannon entropy (bits per byte) of a byte sequence.
///
/// Returns a value in the range [0.0, 8.0] where 0.0 indicates all bytes are
/// identical and 8.0 indicates all 256 byte values appear with equal frequency.
#[must_use]
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut freq = [0_u64; 256];
    for &b in data {
        freq[b as usize] += 1;
    }
    let len = data.len() as f64;
    freq.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}
