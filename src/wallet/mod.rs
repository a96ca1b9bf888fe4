//! Signer key store used by the CLI

pub mod wallet;

pub use wallet::{Wallet, WalletError, WalletInfo, WalletManager};
