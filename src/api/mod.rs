//! REST API module
//!
//! Provides HTTP REST API for submitting launches and collecting approvals.
//!
//! # Endpoints
//!
//! ## Factory
//! - `GET /api/factory/requests` - List launch requests
//! - `POST /api/factory/requests` - Submit a launch for approval
//! - `GET /api/factory/requests/{id}` - Get launch request
//!
//! ## Multisig
//! - `GET /api/multisig/pending` - List transactions awaiting approval
//! - `GET /api/multisig/pending/{id}` - Pending record (zeroed if absent)
//! - `GET /api/multisig/pending/{id}/status` - Unknown / Pending / Executed
//! - `POST /api/multisig/pending/{id}/sign` - Approve (signed call)
//! - `POST /api/multisig/pending/{id}/unsign` - Withdraw approval (signed call)
//!
//! ## Tokens
//! - `GET /api/tokens` - List launched tokens
//! - `GET /api/tokens/{address}` - Get token

pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::create_router;
