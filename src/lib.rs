//! Meme Launchpad: multisig-gated memecoin launches in Rust
//!
//! This crate provides:
//! - A memecoin factory that records launch requests and deploys tokens
//! - A multisig coordinator that collects approvals and executes on quorum
//! - Configurable quorum policies (all-but-one, unanimous, fixed threshold)
//! - Signed sign/unsign calls bound to secp256k1 signer identities
//! - Fungible tokens with transfers, allowances, mint, burn and pause
//! - JSON persistence with backup rotation
//! - A CLI and a REST API
//!
//! # Example
//!
//! ```rust
//! use meme_launchpad::factory::MemecoinRequest;
//! use meme_launchpad::launchpad::Launchpad;
//! use meme_launchpad::multisig::{SignOutcome, TxStatus};
//!
//! let mut launchpad = Launchpad::default();
//!
//! // Queue a launch with three signers
//! let request = MemecoinRequest {
//!     owner: "owner".to_string(),
//!     name: "Doge Moon".to_string(),
//!     symbol: "DMOON".to_string(),
//!     decimals: 18,
//!     total_supply: 1_000_000,
//!     signers: vec!["s1".into(), "s2".into(), "s3".into()],
//! };
//! let data = launchpad.request_memecoin(request).unwrap();
//!
//! // All but one signer must approve
//! launchpad.sign_tx("s1", data.id).unwrap();
//! let outcome = launchpad.sign_tx("s2", data.id).unwrap();
//! assert_eq!(outcome, SignOutcome::Executed);
//! assert_eq!(launchpad.tx_status(data.id), TxStatus::Executed);
//! ```

pub mod api;
pub mod cli;
pub mod crypto;
pub mod factory;
pub mod launchpad;
pub mod multisig;
pub mod storage;
pub mod token;
pub mod wallet;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use crypto::{CallAction, CallAuthorization, KeyPair};
pub use factory::{MemecoinFactory, MemecoinRequest, TxData};
pub use launchpad::{Launchpad, LaunchpadConfig, LaunchpadError};
pub use multisig::{
    ExecutionCallback, MultisigCoordinator, MultisigError, PendingTransaction, QuorumPolicy,
    SignOutcome, TxStatus,
};
pub use storage::{Storage, StorageConfig};
pub use token::{Token, TokenManager, TokenMetadata};
pub use wallet::Wallet;
