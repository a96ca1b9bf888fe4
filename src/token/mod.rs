//! ERC-20 style memecoins deployed by the factory
//!
//! # Example
//!
//! ```ignore
//! use meme_launchpad::token::TokenManager;
//!
//! let mut manager = TokenManager::new();
//! let token = manager.create_token(
//!     "Doge Moon".to_string(),
//!     "DMOON".to_string(),
//!     18,
//!     1_000_000_000,
//!     "owner_address",
//!     1,
//! )?;
//!
//! let balance = manager.balance_of(&token.address, "owner_address")?;
//! ```

pub mod manager;
pub mod token;

pub use manager::TokenManager;
pub use token::{validate_launch_params, Token, TokenError, TokenMetadata, TransferEvent};
