//! Memecoin factory: creation records and the execution callback
//!
//! # Example
//!
//! ```ignore
//! use meme_launchpad::factory::{MemecoinFactory, MemecoinRequest};
//!
//! let data = factory.create_memecoin(request, &mut coordinator)?;
//! // ... signers approve through the coordinator ...
//! let token = factory.token_for_tx(data.id);
//! ```

pub mod factory;
pub mod record;

pub use factory::{FactoryError, MemecoinFactory, MIN_SIGNERS};
pub use record::{MemecoinRequest, TxData};
