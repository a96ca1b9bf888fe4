//! REST API handlers for launchpad operations

use crate::crypto::CallAuthorization;
use crate::factory::{FactoryError, MemecoinRequest, TxData};
use crate::launchpad::{Launchpad, LaunchpadError};
use crate::multisig::{MultisigError, PendingTransaction, SignOutcome, TxStatus};
use crate::storage::Storage;
use crate::token::{Token, TokenError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub launchpad: Arc<RwLock<Launchpad>>,
    pub storage: Arc<Storage>,
}

impl ApiState {
    pub fn new(launchpad: Launchpad, storage: Storage) -> Self {
        Self {
            launchpad: Arc::new(RwLock::new(launchpad)),
            storage: Arc::new(storage),
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[derive(Serialize, Deserialize)]
pub struct PendingTxInfo {
    pub id: u64,
    pub owner: String,
    pub signers: Vec<String>,
    pub signatures: Vec<String>,
    pub signatures_required: usize,
    pub quorum: String,
}

#[derive(Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: u64,
    pub status: TxStatus,
    pub signatures: usize,
    pub signatures_required: Option<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct SignResponse {
    pub id: u64,
    pub signer: String,
    pub outcome: SignOutcome,
    pub token_address: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct UnsignResponse {
    pub id: u64,
    pub signer: String,
    pub signatures: usize,
}

#[derive(Serialize, Deserialize)]
pub struct BalanceResponse {
    pub token: String,
    pub holder: String,
    pub balance: u128,
}

#[derive(Serialize, Deserialize)]
pub struct HoldingInfo {
    pub token: TokenInfo,
    pub balance: u128,
}

#[derive(Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u128,
    pub owner: String,
    pub launch_tx: u64,
    pub holders: usize,
    pub paused: bool,
    pub created_at: String,
}

impl From<&Token> for TokenInfo {
    fn from(token: &Token) -> Self {
        Self {
            address: token.address.clone(),
            name: token.name().to_string(),
            symbol: token.symbol().to_string(),
            decimals: token.metadata.decimals,
            total_supply: token.total_supply(),
            owner: token.owner().to_string(),
            launch_tx: token.metadata.launch_tx,
            holders: token.holder_count(),
            paused: token.is_paused(),
            created_at: token.metadata.created_at.to_rfc3339(),
        }
    }
}

fn pending_info(launchpad: &Launchpad, tx: &PendingTransaction) -> PendingTxInfo {
    let policy = launchpad.coordinator().policy();
    PendingTxInfo {
        id: tx.id,
        owner: tx.owner.clone(),
        signers: tx.signers.clone(),
        signatures: tx.signatures.clone(),
        signatures_required: policy.required_approvals(tx.signer_count()),
        quorum: policy.describe(tx.signer_count()),
    }
}

// ============================================================================
// Error mapping
// ============================================================================

fn error_response(status: StatusCode, error: impl ToString) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: error.to_string(),
        }),
    )
}

fn multisig_status(e: &MultisigError) -> StatusCode {
    match e {
        MultisigError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
        MultisigError::NotAuthorizedSigner(_) | MultisigError::UnauthorizedCaller(_) => {
            StatusCode::FORBIDDEN
        }
        MultisigError::AlreadySigned(_)
        | MultisigError::NotSigned(_)
        | MultisigError::TransactionAlreadyExecuted(_) => StatusCode::CONFLICT,
        MultisigError::DuplicateSigner(_)
        | MultisigError::InvalidThreshold(_)
        | MultisigError::ExecutionFailed { .. } => StatusCode::BAD_REQUEST,
    }
}

fn launchpad_error(e: LaunchpadError) -> (StatusCode, Json<ApiError>) {
    let status = match &e {
        LaunchpadError::Multisig(m) | LaunchpadError::Factory(FactoryError::Multisig(m)) => {
            multisig_status(m)
        }
        LaunchpadError::Factory(FactoryError::UnknownTransaction(_)) => StatusCode::NOT_FOUND,
        LaunchpadError::Factory(FactoryError::AlreadyExecuted(_)) => StatusCode::CONFLICT,
        LaunchpadError::Factory(_) => StatusCode::BAD_REQUEST,
        LaunchpadError::Auth(_) => StatusCode::UNAUTHORIZED,
    };
    log::warn!("Request rejected ({}): {}", status, e);
    error_response(status, e)
}

/// Apply `op` to a copy of the launchpad, save the copy, then install it.
///
/// The caller holds the write guard throughout. If either the operation or
/// the save fails, the live state is left as it was, so memory never runs
/// ahead of disk.
fn commit<T>(
    state: &ApiState,
    live: &mut Launchpad,
    op: impl FnOnce(&mut Launchpad) -> Result<T, LaunchpadError>,
) -> Result<T, (StatusCode, Json<ApiError>)> {
    let mut next = live.clone();
    let result = op(&mut next).map_err(launchpad_error)?;

    state.storage.save(&next).map_err(|e| {
        log::error!("Failed to persist launchpad state: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Not applied, state could not be persisted: {}", e),
        )
    })?;

    *live = next;
    Ok(result)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health - Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /api/factory/requests - List all launch requests
pub async fn list_requests(State(state): State<ApiState>) -> Json<Vec<TxData>> {
    let launchpad = state.launchpad.read().await;
    Json(launchpad.list_tx_data().into_iter().cloned().collect())
}

/// POST /api/factory/requests - Submit a launch for approval
pub async fn create_request(
    State(state): State<ApiState>,
    Json(req): Json<MemecoinRequest>,
) -> ApiResult<TxData> {
    let mut launchpad = state.launchpad.write().await;
    let data = commit(&state, &mut launchpad, |next| next.request_memecoin(req))?;

    Ok(Json(data))
}

/// GET /api/factory/requests/{id} - Get a launch request
pub async fn get_request(State(state): State<ApiState>, Path(id): Path<u64>) -> ApiResult<TxData> {
    let launchpad = state.launchpad.read().await;

    launchpad
        .get_tx_data(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("Unknown transaction: {}", id)))
}

/// GET /api/multisig/pending - List transactions awaiting approval
pub async fn list_pending(State(state): State<ApiState>) -> Json<Vec<PendingTxInfo>> {
    let launchpad = state.launchpad.read().await;
    let pending = launchpad
        .coordinator()
        .list_pending()
        .into_iter()
        .map(|tx| pending_info(&launchpad, tx))
        .collect();

    Json(pending)
}

/// GET /api/multisig/pending/{id} - Pending record (zeroed if absent)
pub async fn get_pending(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> Json<PendingTransaction> {
    let launchpad = state.launchpad.read().await;
    Json(launchpad.get_pending_tx_data(id))
}

/// GET /api/multisig/pending/{id}/status - Unknown / Pending / Executed
pub async fn get_status(State(state): State<ApiState>, Path(id): Path<u64>) -> Json<StatusResponse> {
    let launchpad = state.launchpad.read().await;
    let coordinator = launchpad.coordinator();

    Json(StatusResponse {
        id,
        status: coordinator.tx_status(id),
        signatures: coordinator.get_pending_tx_data(id).signature_count(),
        signatures_required: coordinator.required_approvals(id).ok(),
    })
}

/// POST /api/multisig/pending/{id}/sign - Approve with a signed call
pub async fn sign_pending(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(auth): Json<CallAuthorization>,
) -> ApiResult<SignResponse> {
    let mut launchpad = state.launchpad.write().await;
    let (signer, outcome) = commit(&state, &mut launchpad, |next| {
        next.sign_authorized(&auth, id)
    })?;

    let token_address = match outcome {
        SignOutcome::Executed => launchpad
            .get_tx_data(id)
            .and_then(|data| data.token_address.clone()),
        SignOutcome::Recorded { .. } => None,
    };

    Ok(Json(SignResponse {
        id,
        signer,
        outcome,
        token_address,
    }))
}

/// POST /api/multisig/pending/{id}/unsign - Withdraw approval with a signed call
pub async fn unsign_pending(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(auth): Json<CallAuthorization>,
) -> ApiResult<UnsignResponse> {
    let mut launchpad = state.launchpad.write().await;
    let signer = commit(&state, &mut launchpad, |next| {
        next.unsign_authorized(&auth, id)
    })?;

    Ok(Json(UnsignResponse {
        id,
        signer,
        signatures: launchpad.get_pending_tx_data(id).signature_count(),
    }))
}

/// GET /api/tokens - List launched tokens
pub async fn list_tokens(State(state): State<ApiState>) -> Json<Vec<TokenInfo>> {
    let launchpad = state.launchpad.read().await;
    Json(launchpad.tokens().list().into_iter().map(TokenInfo::from).collect())
}

/// GET /api/tokens/{address} - Get a launched token
pub async fn get_token(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> ApiResult<TokenInfo> {
    let launchpad = state.launchpad.read().await;

    launchpad
        .tokens()
        .get(&address)
        .map(|token| Json(TokenInfo::from(token)))
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("Token not found: {}", address)))
}

/// GET /api/tokens/{address}/balance/{holder} - Balance of one holder
pub async fn get_balance(
    State(state): State<ApiState>,
    Path((address, holder)): Path<(String, String)>,
) -> ApiResult<BalanceResponse> {
    let launchpad = state.launchpad.read().await;

    match launchpad.tokens().balance_of(&address, &holder) {
        Ok(balance) => Ok(Json(BalanceResponse {
            token: address,
            holder,
            balance,
        })),
        Err(e @ TokenError::TokenNotFound(_)) => Err(error_response(StatusCode::NOT_FOUND, e)),
        Err(e) => Err(error_response(StatusCode::BAD_REQUEST, e)),
    }
}

/// GET /api/holders/{holder}/tokens - Launched tokens a holder owns
pub async fn list_holdings(
    State(state): State<ApiState>,
    Path(holder): Path<String>,
) -> Json<Vec<HoldingInfo>> {
    let launchpad = state.launchpad.read().await;
    let holdings = launchpad
        .tokens()
        .tokens_for_holder(&holder)
        .into_iter()
        .map(|(token, balance)| HoldingInfo {
            token: TokenInfo::from(token),
            balance,
        })
        .collect();

    Json(holdings)
}
