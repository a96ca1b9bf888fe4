//! Multisig approval state machine
//!
//! Per transaction id: Unknown -> Pending -> Executed. Queueing is reserved
//! for the factory (or the admin). Signers approve or withdraw approval;
//! the approval that reaches quorum runs the factory callback and deletes
//! the record in the same call, so a transaction can execute at most once.

use crate::multisig::quorum::{find_duplicate_signer, MultisigError, QuorumPolicy, QuorumTracker};
use crate::multisig::store::PendingTransactionStore;
use crate::multisig::transaction::{PendingTransaction, TxStatus};
use serde::{Deserialize, Serialize};

/// Completion hook invoked once a transaction reaches quorum
pub trait ExecutionCallback {
    type Error: std::error::Error;

    /// Run the approved operation for `id`.
    ///
    /// On error the coordinator leaves the pending record untouched, so the
    /// implementation must not leave partial effects behind either.
    fn execute_create_memecoin(&mut self, id: u64) -> Result<(), Self::Error>;
}

/// Result of a successful `sign_tx`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SignOutcome {
    /// Approval stored, quorum not yet reached
    Recorded { signatures: usize, required: usize },
    /// Quorum reached; the callback ran and the record was deleted
    Executed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultisigCoordinator {
    /// Identity allowed to queue transactions
    factory_address: String,
    /// Optional override that may also queue
    admin: Option<String>,
    policy: QuorumPolicy,
    store: PendingTransactionStore,
}

impl MultisigCoordinator {
    pub fn new(factory_address: String, admin: Option<String>, policy: QuorumPolicy) -> Self {
        let coordinator = Self {
            factory_address,
            admin,
            policy,
            store: PendingTransactionStore::new(),
        };
        coordinator.flag_default_policy();
        coordinator
    }

    /// Warn if running under the all-but-one policy. Returns whether it warned.
    ///
    /// Called on construction and again whenever saved state is loaded.
    pub fn flag_default_policy(&self) -> bool {
        if self.policy != QuorumPolicy::AllButOne {
            return false;
        }
        log::warn!(
            "Multisig quorum policy is all-but-one: transactions execute one approval short of unanimity"
        );
        true
    }

    pub fn factory_address(&self) -> &str {
        &self.factory_address
    }

    pub fn admin(&self) -> Option<&str> {
        self.admin.as_deref()
    }

    pub fn policy(&self) -> QuorumPolicy {
        self.policy
    }

    /// Queue a transaction for approval, replacing any record at `id`.
    ///
    /// The coordinator does not know which ids the factory holds. An id
    /// queued here without a factory record can never execute: every
    /// completing approval fails with `ExecutionFailed`. `Launchpad::requeue_tx`
    /// checks the factory first and is the entry point for admin requeues.
    pub fn queue_tx(
        &mut self,
        caller: &str,
        id: u64,
        owner: &str,
        signers: Vec<String>,
    ) -> Result<(), MultisigError> {
        let is_admin = self.admin.as_deref() == Some(caller);
        if caller != self.factory_address && !is_admin {
            log::warn!("Rejected queue of tx {} from {}", id, caller);
            return Err(MultisigError::UnauthorizedCaller(caller.to_string()));
        }

        if let Some(duplicate) = find_duplicate_signer(&signers) {
            return Err(MultisigError::DuplicateSigner(duplicate.to_string()));
        }

        if self.store.status(id) == TxStatus::Pending {
            log::warn!("Overwriting pending tx {}", id);
        }

        let required = self.policy.required_approvals(signers.len());
        self.store.put(id, owner.to_string(), signers);

        log::info!(
            "Queued tx {} for {} (needs {} approval(s))",
            id,
            owner,
            required
        );
        Ok(())
    }

    /// Approve transaction `id` as `signer`.
    ///
    /// If this approval reaches quorum it is not recorded; instead `factory`
    /// executes the transaction and the record is deleted. A failing
    /// callback aborts the call with the record unchanged.
    pub fn sign_tx<F: ExecutionCallback>(
        &mut self,
        signer: &str,
        id: u64,
        factory: &mut F,
    ) -> Result<SignOutcome, MultisigError> {
        let tx = self.store.get(id)?;
        let tracker = QuorumTracker::new(tx, self.policy);
        tracker.check_can_sign(signer)?;

        let required = tracker.required_approvals();
        if tracker.next_approval_completes() {
            if let Err(e) = factory.execute_create_memecoin(id) {
                log::warn!("Execution of tx {} failed: {}", id, e);
                return Err(MultisigError::ExecutionFailed {
                    id,
                    reason: e.to_string(),
                });
            }

            self.store.clear(id);
            self.store.record_executed(id);
            log::info!("Tx {} reached quorum on approval by {} and executed", id, signer);
            return Ok(SignOutcome::Executed);
        }

        self.store.append_signature(id, signer)?;
        let signatures = self.store.get(id)?.signature_count();
        log::debug!(
            "Tx {} signed by {} ({}/{})",
            id,
            signer,
            signatures,
            required
        );

        Ok(SignOutcome::Recorded {
            signatures,
            required,
        })
    }

    /// Withdraw `signer`'s approval of `id`. Never triggers execution.
    pub fn unsign_tx(&mut self, signer: &str, id: u64) -> Result<(), MultisigError> {
        let tx = self.store.get(id)?;
        QuorumTracker::new(tx, self.policy).check_can_unsign(signer)?;

        self.store.remove_signature(id, signer)?;
        log::debug!("Tx {} unsigned by {}", id, signer);
        Ok(())
    }

    /// Snapshot of a pending record, or a zeroed record if there is none
    pub fn get_pending_tx_data(&self, id: u64) -> PendingTransaction {
        self.store.get(id).cloned().unwrap_or_default()
    }

    pub fn tx_status(&self, id: u64) -> TxStatus {
        self.store.status(id)
    }

    pub fn is_authorized_signer(&self, id: u64, identity: &str) -> bool {
        self.store
            .get(id)
            .map(|tx| QuorumTracker::new(tx, self.policy).is_authorized_signer(identity))
            .unwrap_or(false)
    }

    pub fn has_signed(&self, id: u64, identity: &str) -> bool {
        self.store
            .get(id)
            .map(|tx| QuorumTracker::new(tx, self.policy).has_signed(identity))
            .unwrap_or(false)
    }

    /// Approvals `id` needs in total under the current policy
    pub fn required_approvals(&self, id: u64) -> Result<usize, MultisigError> {
        let tx = self.store.get(id)?;
        Ok(QuorumTracker::new(tx, self.policy).required_approvals())
    }

    pub fn pending_ids(&self) -> Vec<u64> {
        self.store.ids()
    }

    pub fn list_pending(&self) -> Vec<&PendingTransaction> {
        self.store.iter().collect()
    }

    pub fn pending_count(&self) -> usize {
        self.store.len()
    }

    pub fn executed_count(&self) -> usize {
        self.store.executed_count()
    }
}
