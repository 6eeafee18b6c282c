use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest of raw feed bytes, logged so audit trails can tie a verdict back
/// to the exact document that produced it.
pub fn feed_digest(bytes: &[u8]) -> String {
    format!("sha256:{}", sha256_hex(bytes))
}
