//! Checksum key encoding and digest helpers.

/// Compose the storage key for a checksum index entry.
///
/// The `"<algorithm>/<digest>"` encoding is part of the on-disk contract;
/// existing stores depend on the exact separator.
pub fn checksum_key(algorithm: &str, digest: &str) -> String {
    format!("{algorithm}/{digest}")
}

/// Lowercase hex BLAKE3 digest of raw bytes.
///
/// Convenience for callers building a `checksums` map from content they
/// already hold in memory.
pub fn blake3_hex(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}
