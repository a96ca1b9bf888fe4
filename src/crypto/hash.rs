//! SHA-256 helpers used for identities, token addresses and call digests.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Base58Check checksum: first 4 bytes of SHA256(SHA256(data))
pub fn checksum(data: &[u8]) -> [u8; 4] {
    let digest = sha256(&sha256(data));
    [digest[0], digest[1], digest[2], digest[3]]
}
