//! Name digest used to place objects in the shard tree

use serde::{Deserialize, Serialize};
use sha1::{Digest as _, Sha1};
use std::fmt;

/// Length of a digest in raw bytes (160-bit SHA-1)
pub const DIGEST_LEN: usize = 20;

/// Length of a digest rendered as lowercase hex
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// A 20-byte SHA-1 digest of an object *name*.
///
/// This is not a content hash: two objects with the same name always land on
/// the same path regardless of what they hold.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NameDigest([u8; DIGEST_LEN]);

impl NameDigest {
    /// Create a digest from raw bytes
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        NameDigest(bytes)
    }

    /// Digest an object name
    pub fn of_name(name: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(name.as_bytes());
        let out = hasher.finalize();
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&out);
        NameDigest(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != DIGEST_LEN {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; DIGEST_LEN];
        arr.copy_from_slice(&bytes);
        Ok(NameDigest(arr))
    }

    /// Split the hex form into the two directory levels and the leaf file name.
    ///
    /// `3857b672...` becomes `("38", "57", "b672...")`.
    pub fn shard(&self) -> ShardPath {
        let hex = self.to_hex();
        ShardPath {
            outer: hex[0..2].to_string(),
            inner: hex[2..4].to_string(),
            leaf: hex[4..].to_string(),
        }
    }

    /// Short prefix for display
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }
}

impl fmt::Display for NameDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for NameDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameDigest({})", self.short())
    }
}

impl AsRef<[u8]> for NameDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The three path segments derived from a digest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardPath {
    /// First directory level (`digest[0:2]`)
    pub outer: String,
    /// Second directory level (`digest[2:4]`)
    pub inner: String,
    /// File name inside the second level (`digest[4:]`)
    pub leaf: String,
}

/// Hex digest of an object name
pub fn digest(name: &str) -> String {
    NameDigest::of_name(name).to_hex()
}
