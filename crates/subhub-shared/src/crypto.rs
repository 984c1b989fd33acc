//! Password hashing for protected saved subscriptions.
//!
//! A single unsalted SHA-256 round. This only keeps casual users from
//! opening someone else's entry on a shared machine; it is not a security
//! boundary.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Lowercase hex SHA-256 of the UTF-8 password bytes.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    hex::encode(digest)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let computed = hash_password(password);
    let computed = computed.as_bytes();
    let expected = hash.as_bytes();
    computed.len() == expected.len() && computed.ct_eq(expected).unwrap_u8() == 1
}
