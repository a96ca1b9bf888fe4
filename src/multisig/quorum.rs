//! Signer authorization and quorum counting
//!
//! [`QuorumTracker`] answers the per-transaction questions the coordinator
//! asks before touching a record: may this identity sign, has it signed,
//! and would its approval complete the quorum.

use crate::multisig::transaction::PendingTransaction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to multisig coordination
#[derive(Error, Debug)]
pub enum MultisigError {
    #[error("Signer not authorized: {0}")]
    NotAuthorizedSigner(String),
    #[error("Already signed by this signer: {0}")]
    AlreadySigned(String),
    #[error("Not signed by this signer: {0}")]
    NotSigned(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(u64),
    #[error("Transaction already executed: {0}")]
    TransactionAlreadyExecuted(u64),
    #[error("Caller may not queue transactions: {0}")]
    UnauthorizedCaller(String),
    #[error("Duplicate signer: {0}")]
    DuplicateSigner(String),
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
    #[error("Execution of transaction {id} failed: {reason}")]
    ExecutionFailed { id: u64, reason: String },
}

/// How many approvals a transaction needs before it executes
///
/// The default, [`QuorumPolicy::AllButOne`], reproduces the launchpad's
/// historical rule of one approval fewer than the signer list. A
/// 2-signer transaction therefore executes on its first approval. Use
/// [`QuorumPolicy::Unanimous`] or [`QuorumPolicy::Threshold`] to require more.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuorumPolicy {
    #[default]
    AllButOne,
    Unanimous,
    Threshold(usize),
}

impl QuorumPolicy {
    /// Approvals needed for a transaction with `signer_count` signers (at least 1)
    pub fn required_approvals(&self, signer_count: usize) -> usize {
        let required = match self {
            QuorumPolicy::AllButOne => signer_count.saturating_sub(1),
            QuorumPolicy::Unanimous => signer_count,
            QuorumPolicy::Threshold(k) => (*k).min(signer_count),
        };
        required.max(1)
    }

    /// Get description like "2-of-3"
    pub fn describe(&self, signer_count: usize) -> String {
        format!("{}-of-{}", self.required_approvals(signer_count), signer_count)
    }
}

impl fmt::Display for QuorumPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuorumPolicy::AllButOne => write!(f, "all-but-one"),
            QuorumPolicy::Unanimous => write!(f, "unanimous"),
            QuorumPolicy::Threshold(k) => write!(f, "{}", k),
        }
    }
}

impl FromStr for QuorumPolicy {
    type Err = MultisigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all-but-one" | "all_but_one" => Ok(QuorumPolicy::AllButOne),
            "unanimous" | "all" => Ok(QuorumPolicy::Unanimous),
            other => match other.parse::<usize>() {
                Ok(0) => Err(MultisigError::InvalidThreshold(
                    "threshold must be at least 1".to_string(),
                )),
                Ok(k) => Ok(QuorumPolicy::Threshold(k)),
                Err(_) => Err(MultisigError::InvalidThreshold(format!(
                    "expected all-but-one, unanimous or a number, got {:?}",
                    s
                ))),
            },
        }
    }
}

/// Read-only quorum view over one pending transaction
pub struct QuorumTracker<'a> {
    tx: &'a PendingTransaction,
    policy: QuorumPolicy,
}

impl<'a> QuorumTracker<'a> {
    pub fn new(tx: &'a PendingTransaction, policy: QuorumPolicy) -> Self {
        Self { tx, policy }
    }

    /// Whether `identity` appears anywhere in the signer list
    pub fn is_authorized_signer(&self, identity: &str) -> bool {
        self.tx.signers.iter().any(|s| s == identity)
    }

    /// Whether `identity` appears anywhere in the recorded signatures
    pub fn has_signed(&self, identity: &str) -> bool {
        self.tx.signatures.iter().any(|s| s == identity)
    }

    pub fn required_approvals(&self) -> usize {
        self.policy.required_approvals(self.tx.signer_count())
    }

    /// Whether one more approval reaches the requirement
    pub fn next_approval_completes(&self) -> bool {
        self.tx.signature_count() + 1 >= self.required_approvals()
    }

    /// Check that `identity` may add an approval
    pub fn check_can_sign(&self, identity: &str) -> Result<(), MultisigError> {
        if !self.is_authorized_signer(identity) {
            return Err(MultisigError::NotAuthorizedSigner(identity.to_string()));
        }
        if self.has_signed(identity) {
            return Err(MultisigError::AlreadySigned(identity.to_string()));
        }
        Ok(())
    }

    /// Check that `identity` may withdraw its approval
    pub fn check_can_unsign(&self, identity: &str) -> Result<(), MultisigError> {
        if !self.is_authorized_signer(identity) {
            return Err(MultisigError::NotAuthorizedSigner(identity.to_string()));
        }
        if !self.has_signed(identity) {
            return Err(MultisigError::NotSigned(identity.to_string()));
        }
        Ok(())
    }
}

/// First signer listed twice, if any
pub fn find_duplicate_signer(signers: &[String]) -> Option<&str> {
    let mut sorted: Vec<&String> = signers.iter().collect();
    sorted.sort();
    sorted
        .windows(2)
        .find(|pair| pair[0] == pair[1])
        .map(|pair| pair[0].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(signers: &[&str], signatures: &[&str]) -> PendingTransaction {
        PendingTransaction {
            id: 1,
            owner: "owner".to_string(),
            signers: signers.iter().map(|s| s.to_string()).collect(),
            signatures: signatures.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_required_approvals() {
        assert_eq!(QuorumPolicy::AllButOne.required_approvals(2), 1);
        assert_eq!(QuorumPolicy::AllButOne.required_approvals(3), 2);
        assert_eq!(QuorumPolicy::AllButOne.required_approvals(1), 1);
        assert_eq!(QuorumPolicy::Unanimous.required_approvals(3), 3);
        assert_eq!(QuorumPolicy::Threshold(2).required_approvals(5), 2);
        assert_eq!(QuorumPolicy::Threshold(9).required_approvals(3), 3);
        assert_eq!(QuorumPolicy::Unanimous.required_approvals(0), 1);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("all-but-one".parse::<QuorumPolicy>().unwrap(), QuorumPolicy::AllButOne);
        assert_eq!("Unanimous".parse::<QuorumPolicy>().unwrap(), QuorumPolicy::Unanimous);
        assert_eq!("3".parse::<QuorumPolicy>().unwrap(), QuorumPolicy::Threshold(3));
        assert!("0".parse::<QuorumPolicy>().is_err());
        assert!("most".parse::<QuorumPolicy>().is_err());
    }

    #[test]
    fn test_policy_display_round_trips_through_parse() {
        for policy in [
            QuorumPolicy::AllButOne,
            QuorumPolicy::Unanimous,
            QuorumPolicy::Threshold(4),
        ] {
            assert_eq!(policy.to_string().parse::<QuorumPolicy>().unwrap(), policy);
        }
        assert_eq!(QuorumPolicy::AllButOne.describe(3), "2-of-3");
    }

    #[test]
    fn test_authorization_queries() {
        let pending = tx(&["s1", "s2", "s3"], &["s2"]);
        let tracker = QuorumTracker::new(&pending, QuorumPolicy::AllButOne);

        assert!(tracker.is_authorized_signer("s1"));
        assert!(!tracker.is_authorized_signer("mallory"));
        assert!(tracker.has_signed("s2"));
        assert!(!tracker.has_signed("s1"));
    }

    #[test]
    fn test_sign_checks() {
        let pending = tx(&["s1", "s2", "s3"], &["s2"]);
        let tracker = QuorumTracker::new(&pending, QuorumPolicy::AllButOne);

        assert!(tracker.check_can_sign("s1").is_ok());
        assert!(matches!(
            tracker.check_can_sign("s2"),
            Err(MultisigError::AlreadySigned(_))
        ));
        assert!(matches!(
            tracker.check_can_sign("mallory"),
            Err(MultisigError::NotAuthorizedSigner(_))
        ));
        assert!(matches!(
            tracker.check_can_unsign("s1"),
            Err(MultisigError::NotSigned(_))
        ));
        assert!(matches!(
            tracker.check_can_unsign("mallory"),
            Err(MultisigError::NotAuthorizedSigner(_))
        ));
        assert!(tracker.check_can_unsign("s2").is_ok());
    }

    #[test]
    fn test_next_approval_completes() {
        // 2-of-3: one recorded, the next completes
        let pending = tx(&["s1", "s2", "s3"], &["s1"]);
        assert!(QuorumTracker::new(&pending, QuorumPolicy::AllButOne).next_approval_completes());
        assert!(!QuorumTracker::new(&pending, QuorumPolicy::Unanimous).next_approval_completes());

        // 2 signers under the default rule complete on the first approval
        let pending = tx(&["s1", "s2"], &[]);
        assert!(QuorumTracker::new(&pending, QuorumPolicy::AllButOne).next_approval_completes());
    }

    #[test]
    fn test_find_duplicate_signer() {
        let signers: Vec<String> = vec!["b".into(), "a".into(), "b".into()];
        assert_eq!(find_duplicate_signer(&signers), Some("b"));

        let signers: Vec<String> = vec!["a".into(), "b".into()];
        assert_eq!(find_duplicate_signer(&signers), None);
    }
}
