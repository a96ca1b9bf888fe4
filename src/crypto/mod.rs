//! Cryptographic utilities for the launchpad
//!
//! This module provides:
//! - SHA-256 hashing
//! - ECDSA key management (secp256k1) and Base58 identities
//! - Authentication of signed coordinator calls

pub mod auth;
pub mod hash;
pub mod keys;

pub use auth::{authenticate, AuthError, CallAction, CallAuthorization, AUTH_MAX_AGE_SECS};
pub use hash::{checksum, sha256, sha256_hex};
pub use keys::{
    address_from_public_key_hex, public_key_from_hex, public_key_to_address, sign_message,
    verify_signature, KeyError, KeyPair,
};
