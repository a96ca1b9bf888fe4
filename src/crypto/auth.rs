//! Signed coordinator calls
//!
//! Callers outside the process prove which signer they are by signing
//! `"<action>:<tx_id>:<issued_at>"` with their key. A successful
//! authentication yields the caller's address.

use crate::crypto::keys::{public_key_from_hex, public_key_to_address, verify_signature, KeyPair};
use crate::crypto::KeyError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How long a signed call stays valid, in seconds
pub const AUTH_MAX_AGE_SECS: i64 = 300;

/// Allowed clock skew for authorizations issued in the future
const AUTH_MAX_SKEW_SECS: i64 = 30;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Authorization expired or not yet valid (issued at {0})")]
    Expired(i64),
    #[error("Crypto error: {0}")]
    Crypto(#[from] KeyError),
}

/// Coordinator operation a signature authorizes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallAction {
    Sign,
    Unsign,
}

impl fmt::Display for CallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallAction::Sign => write!(f, "sign"),
            CallAction::Unsign => write!(f, "unsign"),
        }
    }
}

/// Proof that the holder of `public_key` requested an action on a transaction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallAuthorization {
    /// Compressed secp256k1 public key (hex)
    pub public_key: String,
    /// Compact ECDSA signature over the call message (hex)
    pub signature: String,
    /// Unix timestamp the authorization was created at
    pub issued_at: i64,
}

impl CallAuthorization {
    /// Sign a call as `key_pair`, timestamped now
    pub fn sign(key_pair: &KeyPair, action: CallAction, tx_id: u64) -> Result<Self, KeyError> {
        let issued_at = Utc::now().timestamp();
        let signature = key_pair.sign(call_message(action, tx_id, issued_at).as_bytes())?;

        Ok(Self {
            public_key: key_pair.public_key_hex(),
            signature: hex::encode(signature),
            issued_at,
        })
    }
}

fn call_message(action: CallAction, tx_id: u64, issued_at: i64) -> String {
    format!("{}:{}:{}", action, tx_id, issued_at)
}

/// Verify an authorization and return the caller's address
pub fn authenticate(
    auth: &CallAuthorization,
    action: CallAction,
    tx_id: u64,
) -> Result<String, AuthError> {
    authenticate_at(auth, action, tx_id, Utc::now().timestamp())
}

pub(crate) fn authenticate_at(
    auth: &CallAuthorization,
    action: CallAction,
    tx_id: u64,
    now: i64,
) -> Result<String, AuthError> {
    // issued_at comes from the caller, so the difference may not fit
    let age = now
        .checked_sub(auth.issued_at)
        .ok_or(AuthError::Expired(auth.issued_at))?;
    if age > AUTH_MAX_AGE_SECS || age < -AUTH_MAX_SKEW_SECS {
        return Err(AuthError::Expired(auth.issued_at));
    }

    let public_key =
        public_key_from_hex(&auth.public_key).map_err(|_| AuthError::InvalidPublicKey)?;
    let signature = hex::decode(&auth.signature).map_err(|_| AuthError::InvalidSignature)?;
    let message = call_message(action, tx_id, auth.issued_at);

    if !verify_signature(&public_key, message.as_bytes(), &signature)? {
        return Err(AuthError::InvalidSignature);
    }

    Ok(public_key_to_address(&public_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate_returns_signer_address() {
        let kp = KeyPair::generate();
        let auth = CallAuthorization::sign(&kp, CallAction::Sign, 7).unwrap();

        let caller = authenticate(&auth, CallAction::Sign, 7).unwrap();
        assert_eq!(caller, kp.address());
    }

    #[test]
    fn test_signature_bound_to_action_and_id() {
        let kp = KeyPair::generate();
        let auth = CallAuthorization::sign(&kp, CallAction::Sign, 7).unwrap();

        assert!(matches!(
            authenticate(&auth, CallAction::Unsign, 7),
            Err(AuthError::InvalidSignature)
        ));
        assert!(matches!(
            authenticate(&auth, CallAction::Sign, 8),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_stale_authorization_rejected() {
        let kp = KeyPair::generate();
        let auth = CallAuthorization::sign(&kp, CallAction::Sign, 1).unwrap();

        let later = auth.issued_at + AUTH_MAX_AGE_SECS + 1;
        assert!(matches!(
            authenticate_at(&auth, CallAction::Sign, 1, later),
            Err(AuthError::Expired(_))
        ));

        let earlier = auth.issued_at - AUTH_MAX_SKEW_SECS - 1;
        assert!(matches!(
            authenticate_at(&auth, CallAction::Sign, 1, earlier),
            Err(AuthError::Expired(_))
        ));
    }

    #[test]
    fn test_extreme_timestamps_rejected() {
        let kp = KeyPair::generate();
        let mut auth = CallAuthorization::sign(&kp, CallAction::Sign, 1).unwrap();

        for issued_at in [i64::MIN, i64::MAX] {
            auth.issued_at = issued_at;
            assert!(matches!(
                authenticate(&auth, CallAction::Sign, 1),
                Err(AuthError::Expired(t)) if t == issued_at
            ));
        }
    }

    #[test]
    fn test_foreign_public_key_rejected() {
        let kp = KeyPair::generate();
        let other = KeyPair::generate();
        let mut auth = CallAuthorization::sign(&kp, CallAction::Unsign, 3).unwrap();
        auth.public_key = other.public_key_hex();

        assert!(matches!(
            authenticate(&auth, CallAction::Unsign, 3),
            Err(AuthError::InvalidSignature)
        ));
    }
}
