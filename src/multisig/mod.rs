//! Multisig approval of launchpad operations
//!
//! The factory queues each creation request here with its list of signers.
//! Signers approve (or withdraw approval) and the approval that reaches
//! quorum runs the factory's execution callback and discards the record.
//!
//! # Example
//!
//! ```ignore
//! use meme_launchpad::multisig::{MultisigCoordinator, QuorumPolicy};
//!
//! let mut coordinator =
//!     MultisigCoordinator::new("factory".into(), None, QuorumPolicy::Unanimous);
//!
//! coordinator.queue_tx("factory", 1, "owner", vec![alice, bob])?;
//! coordinator.sign_tx(&alice, 1, &mut factory)?;
//! coordinator.sign_tx(&bob, 1, &mut factory)?; // executes
//! ```

pub mod coordinator;
pub mod quorum;
pub mod store;
pub mod transaction;

pub use coordinator::{ExecutionCallback, MultisigCoordinator, SignOutcome};
pub use quorum::{MultisigError, QuorumPolicy, QuorumTracker};
pub use store::PendingTransactionStore;
pub use transaction::{PendingTransaction, TxStatus};
