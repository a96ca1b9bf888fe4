//! Pending transaction records
//!
//! A record lives in the coordinator only while it awaits signatures. It is
//! removed the moment quorum is reached and the factory callback runs.

use serde::{Deserialize, Serialize};

/// An in-flight approval request
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Id assigned by the factory (0 only in the zeroed "absent" record)
    pub id: u64,
    /// Account that will own the launched token (informational)
    pub owner: String,
    /// Authorized signers, fixed at queue time
    pub signers: Vec<String>,
    /// Recorded approvals, in signing order
    pub signatures: Vec<String>,
}

impl PendingTransaction {
    /// A fresh record with no signatures
    pub fn new(id: u64, owner: String, signers: Vec<String>) -> Self {
        Self {
            id,
            owner,
            signers,
            signatures: Vec::new(),
        }
    }

    /// Whether this is the zero-valued record returned for absent ids
    pub fn is_empty(&self) -> bool {
        self.id == 0 && self.signers.is_empty()
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }
}

/// Lifecycle position of a transaction id as seen by the coordinator
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxStatus {
    /// Never queued
    Unknown,
    /// Awaiting signatures
    Pending,
    /// Quorum reached and the factory callback ran
    Executed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_no_signatures() {
        let tx = PendingTransaction::new(3, "owner".into(), vec!["s1".into(), "s2".into()]);

        assert_eq!(tx.signer_count(), 2);
        assert_eq!(tx.signature_count(), 0);
        assert!(!tx.is_empty());
    }

    #[test]
    fn test_default_record_is_empty() {
        let tx = PendingTransaction::default();
        assert!(tx.is_empty());
        assert_eq!(tx.owner, "");
    }
}
