//! Content hashing for deterministic compositing verification.
//!
//! Produces a SHA-256 hash of a canvas, enabling bit-exact output
//! verification across platforms and runs: the same design snapshot
//! rendered on the same engine version produces the same hash.

use sha2::{Digest, Sha256};

use crate::canvas::Canvas;

/// A content hash digest (SHA-256, 32 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    bytes: [u8; 32],
}

impl ContentHash {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Compute the content hash of a canvas.
pub fn hash_canvas(canvas: &Canvas) -> ContentHash {
    let mut hasher = Sha256::new();
    // Include dimensions in the hash so different-sized buffers with
    // identical pixel data produce different hashes.
    hasher.update(canvas.width.to_le_bytes());
    hasher.update(canvas.height.to_le_bytes());
    hasher.update(&canvas.data);
    let result = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    ContentHash::from_bytes(bytes)
}
