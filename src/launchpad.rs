//! Launchpad: the factory and the multisig coordinator wired together
//!
//! The factory queues launches with the coordinator, and the coordinator
//! calls back into the factory when a launch reaches quorum. `Launchpad`
//! owns both so each call can lend one to the other.

use crate::crypto::{authenticate, AuthError, CallAction, CallAuthorization};
use crate::factory::{FactoryError, MemecoinFactory, MemecoinRequest, TxData};
use crate::multisig::{
    MultisigCoordinator, MultisigError, PendingTransaction, QuorumPolicy, SignOutcome, TxStatus,
};
use crate::token::TokenManager;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchpadError {
    #[error(transparent)]
    Multisig(#[from] MultisigError),
    #[error(transparent)]
    Factory(#[from] FactoryError),
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),
}

/// Launchpad configuration, stored alongside the state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaunchpadConfig {
    /// Identity the factory queues transactions as
    pub factory_address: String,
    /// Optional identity that may also queue transactions
    pub admin: Option<String>,
    pub quorum: QuorumPolicy,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            factory_address: "launchpad-factory".to_string(),
            admin: None,
            quorum: QuorumPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Launchpad {
    config: LaunchpadConfig,
    factory: MemecoinFactory,
    coordinator: MultisigCoordinator,
}

impl Launchpad {
    pub fn new(config: LaunchpadConfig) -> Self {
        let factory = MemecoinFactory::new(config.factory_address.clone());
        let coordinator = MultisigCoordinator::new(
            config.factory_address.clone(),
            config.admin.clone(),
            config.quorum,
        );

        Self {
            config,
            factory,
            coordinator,
        }
    }

    pub fn config(&self) -> &LaunchpadConfig {
        &self.config
    }

    /// Submit a launch for multisig approval
    pub fn request_memecoin(&mut self, request: MemecoinRequest) -> Result<TxData, LaunchpadError> {
        Ok(self.factory.create_memecoin(request, &mut self.coordinator)?)
    }

    /// Reset a pending launch's approvals by queueing it again.
    ///
    /// Only the factory identity or the admin may do this, and only for a
    /// launch the factory still holds as pending.
    pub fn requeue_tx(&mut self, caller: &str, id: u64) -> Result<(), LaunchpadError> {
        let data = self
            .factory
            .get_tx_data(id)
            .ok_or(FactoryError::UnknownTransaction(id))?;
        if !data.is_pending {
            return Err(FactoryError::AlreadyExecuted(id).into());
        }

        self.coordinator
            .queue_tx(caller, id, &data.owner, data.signers.clone())?;
        log::info!("Launch {} requeued by {}", id, caller);
        Ok(())
    }

    /// Approve launch `id` as an already-authenticated signer
    pub fn sign_tx(&mut self, signer: &str, id: u64) -> Result<SignOutcome, LaunchpadError> {
        Ok(self.coordinator.sign_tx(signer, id, &mut self.factory)?)
    }

    /// Withdraw an already-authenticated signer's approval of launch `id`
    pub fn unsign_tx(&mut self, signer: &str, id: u64) -> Result<(), LaunchpadError> {
        Ok(self.coordinator.unsign_tx(signer, id)?)
    }

    /// Authenticate a signed call, then approve. Returns the signer and the outcome.
    pub fn sign_authorized(
        &mut self,
        auth: &CallAuthorization,
        id: u64,
    ) -> Result<(String, SignOutcome), LaunchpadError> {
        let signer = authenticate(auth, CallAction::Sign, id)?;
        let outcome = self.sign_tx(&signer, id)?;
        Ok((signer, outcome))
    }

    /// Authenticate a signed call, then withdraw approval. Returns the signer.
    pub fn unsign_authorized(
        &mut self,
        auth: &CallAuthorization,
        id: u64,
    ) -> Result<String, LaunchpadError> {
        let signer = authenticate(auth, CallAction::Unsign, id)?;
        self.unsign_tx(&signer, id)?;
        Ok(signer)
    }

    pub fn get_pending_tx_data(&self, id: u64) -> PendingTransaction {
        self.coordinator.get_pending_tx_data(id)
    }

    pub fn tx_status(&self, id: u64) -> TxStatus {
        self.coordinator.tx_status(id)
    }

    pub fn get_tx_data(&self, id: u64) -> Option<&TxData> {
        self.factory.get_tx_data(id)
    }

    pub fn list_tx_data(&self) -> Vec<&TxData> {
        self.factory.list_tx_data()
    }

    pub fn coordinator(&self) -> &MultisigCoordinator {
        &self.coordinator
    }

    pub fn tokens(&self) -> &TokenManager {
        self.factory.tokens()
    }

    pub fn tokens_mut(&mut self) -> &mut TokenManager {
        self.factory.tokens_mut()
    }
}

impl Default for Launchpad {
    fn default() -> Self {
        Self::new(LaunchpadConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn request(owner: &str, signers: Vec<String>) -> MemecoinRequest {
        MemecoinRequest {
            owner: owner.to_string(),
            name: "Doge Moon".to_string(),
            symbol: "DMOON".to_string(),
            decimals: 18,
            total_supply: 1_000_000,
            signers,
        }
    }

    #[test]
    fn test_scenario_two_signers_default_policy() {
        let mut launchpad = Launchpad::default();
        let data = launchpad
            .request_memecoin(request("O", vec!["S1".into(), "S2".into()]))
            .unwrap();

        let pending = launchpad.get_pending_tx_data(data.id);
        assert_eq!(pending.signers, vec!["S1".to_string(), "S2".to_string()]);
        assert!(pending.signatures.is_empty());

        let outcome = launchpad.sign_tx("S1", data.id).unwrap();
        assert_eq!(outcome, SignOutcome::Executed);

        // Cleared record reads the same as a never-queued id
        assert_eq!(
            launchpad.get_pending_tx_data(data.id),
            launchpad.get_pending_tx_data(999)
        );
        assert_eq!(launchpad.tx_status(data.id), TxStatus::Executed);
        assert_eq!(launchpad.tx_status(999), TxStatus::Unknown);
        assert!(!launchpad.get_tx_data(data.id).unwrap().is_pending);
        assert_eq!(launchpad.tokens().count(), 1);
    }

    #[test]
    fn test_authorized_calls_use_key_identity() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();
        let carol = KeyPair::generate();
        let mut launchpad = Launchpad::new(LaunchpadConfig {
            quorum: QuorumPolicy::Unanimous,
            ..Default::default()
        });
        let data = launchpad
            .request_memecoin(request(
                "O",
                vec![alice.address(), bob.address(), carol.address()],
            ))
            .unwrap();

        let auth = CallAuthorization::sign(&alice, CallAction::Sign, data.id).unwrap();
        let (signer, outcome) = launchpad.sign_authorized(&auth, data.id).unwrap();
        assert_eq!(signer, alice.address());
        assert_eq!(
            outcome,
            SignOutcome::Recorded {
                signatures: 1,
                required: 3
            }
        );

        let auth = CallAuthorization::sign(&alice, CallAction::Unsign, data.id).unwrap();
        launchpad.unsign_authorized(&auth, data.id).unwrap();
        assert!(launchpad.get_pending_tx_data(data.id).signatures.is_empty());

        // A sign authorization cannot be replayed as an unsign
        let auth = CallAuthorization::sign(&bob, CallAction::Sign, data.id).unwrap();
        assert!(matches!(
            launchpad.unsign_authorized(&auth, data.id),
            Err(LaunchpadError::Auth(AuthError::InvalidSignature))
        ));
    }

    #[test]
    fn test_outsider_cannot_sign() {
        let outsider = KeyPair::generate();
        let mut launchpad = Launchpad::default();
        let data = launchpad
            .request_memecoin(request("O", vec!["S1".into(), "S2".into()]))
            .unwrap();

        let auth = CallAuthorization::sign(&outsider, CallAction::Sign, data.id).unwrap();
        assert!(matches!(
            launchpad.sign_authorized(&auth, data.id),
            Err(LaunchpadError::Multisig(MultisigError::NotAuthorizedSigner(_)))
        ));
        assert_eq!(launchpad.tx_status(data.id), TxStatus::Pending);
    }

    #[test]
    fn test_requeue_resets_approvals() {
        let mut launchpad = Launchpad::new(LaunchpadConfig {
            admin: Some("admin".to_string()),
            quorum: QuorumPolicy::Unanimous,
            ..Default::default()
        });
        let data = launchpad
            .request_memecoin(request("O", vec!["S1".into(), "S2".into()]))
            .unwrap();
        launchpad.sign_tx("S1", data.id).unwrap();

        assert!(matches!(
            launchpad.requeue_tx("mallory", data.id),
            Err(LaunchpadError::Multisig(MultisigError::UnauthorizedCaller(_)))
        ));
        launchpad.requeue_tx("admin", data.id).unwrap();
        assert!(launchpad.get_pending_tx_data(data.id).signatures.is_empty());
        assert_eq!(launchpad.tx_status(data.id), TxStatus::Pending);
    }

    #[test]
    fn test_requeue_needs_pending_factory_record() {
        let mut launchpad = Launchpad::new(LaunchpadConfig {
            admin: Some("admin".to_string()),
            ..Default::default()
        });

        // Unknown to the factory: nothing is queued
        assert!(matches!(
            launchpad.requeue_tx("admin", 7),
            Err(LaunchpadError::Factory(FactoryError::UnknownTransaction(7)))
        ));
        assert_eq!(launchpad.tx_status(7), TxStatus::Unknown);

        let data = launchpad
            .request_memecoin(request("O", vec!["S1".into(), "S2".into()]))
            .unwrap();
        launchpad.sign_tx("S1", data.id).unwrap();
        assert!(matches!(
            launchpad.requeue_tx("admin", data.id),
            Err(LaunchpadError::Factory(FactoryError::AlreadyExecuted(_)))
        ));
        assert_eq!(launchpad.tx_status(data.id), TxStatus::Executed);
    }

    #[test]
    fn test_state_survives_serialization() {
        let mut launchpad = Launchpad::new(LaunchpadConfig {
            quorum: QuorumPolicy::Threshold(2),
            ..Default::default()
        });
        let first = launchpad
            .request_memecoin(request("O", vec!["S1".into(), "S2".into(), "S3".into()]))
            .unwrap();
        launchpad.sign_tx("S1", first.id).unwrap();

        let json = serde_json::to_string(&launchpad).unwrap();
        let mut restored: Launchpad = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.config().quorum, QuorumPolicy::Threshold(2));
        assert_eq!(
            restored.get_pending_tx_data(first.id).signatures,
            vec!["S1".to_string()]
        );
        assert_eq!(
            restored.sign_tx("S2", first.id).unwrap(),
            SignOutcome::Executed
        );

        // Counter carries over, so ids are not reused
        let second = restored
            .request_memecoin(request("O", vec!["S1".into(), "S2".into()]))
            .unwrap();
        assert_eq!(second.id, first.id + 1);
    }
}
