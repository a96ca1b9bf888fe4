//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Factory
        .route(
            "/api/factory/requests",
            get(handlers::list_requests).post(handlers::create_request),
        )
        .route("/api/factory/requests/{id}", get(handlers::get_request))
        // Multisig
        .route("/api/multisig/pending", get(handlers::list_pending))
        .route("/api/multisig/pending/{id}", get(handlers::get_pending))
        .route(
            "/api/multisig/pending/{id}/status",
            get(handlers::get_status),
        )
        .route(
            "/api/multisig/pending/{id}/sign",
            post(handlers::sign_pending),
        )
        .route(
            "/api/multisig/pending/{id}/unsign",
            post(handlers::unsign_pending),
        )
        // Tokens
        .route("/api/tokens", get(handlers::list_tokens))
        .route("/api/tokens/{address}", get(handlers::get_token))
        .route(
            "/api/tokens/{address}/balance/{holder}",
            get(handlers::get_balance),
        )
        .route("/api/holders/{holder}/tokens", get(handlers::list_holdings))
        .with_state(state)
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::{
        ApiError, BalanceResponse, HoldingInfo, PendingTxInfo, SignResponse, StatusResponse,
        TokenInfo,
    };
    use crate::crypto::{CallAction, CallAuthorization, KeyPair};
    use crate::factory::TxData;
    use crate::launchpad::{Launchpad, LaunchpadConfig};
    use crate::multisig::{PendingTransaction, QuorumPolicy, SignOutcome, TxStatus};
    use crate::storage::Storage;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    struct Harness {
        router: Router,
        state: ApiState,
        _dir: tempfile::TempDir,
    }

    fn harness(policy: QuorumPolicy) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::in_dir(dir.path()).unwrap();
        let launchpad = Launchpad::new(LaunchpadConfig {
            quorum: policy,
            ..Default::default()
        });
        let state = ApiState::new(launchpad, storage);

        Harness {
            router: create_router(state.clone()),
            state,
            _dir: dir,
        }
    }

    async fn call<T: DeserializeOwned>(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, T) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create_launch(router: &Router, signers: &[&KeyPair]) -> TxData {
        let body = serde_json::json!({
            "owner": "owner",
            "name": "Doge Moon",
            "symbol": "DMOON",
            "total_supply": 1_000_000,
            "signers": signers.iter().map(|k| k.address()).collect::<Vec<_>>(),
        });
        let (status, data) = call(router, "POST", "/api/factory/requests", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        data
    }

    fn auth(key: &KeyPair, action: CallAction, id: u64) -> serde_json::Value {
        serde_json::to_value(CallAuthorization::sign(key, action, id).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(QuorumPolicy::AllButOne);
        let response = h
            .router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_launch_flow_over_http() {
        let h = harness(QuorumPolicy::Unanimous);
        let (s1, s2) = (KeyPair::generate(), KeyPair::generate());
        let data = create_launch(&h.router, &[&s1, &s2]).await;
        assert_eq!(data.id, 1);

        let (_, pending): (_, Vec<PendingTxInfo>) =
            call(&h.router, "GET", "/api/multisig/pending", None).await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].signatures_required, 2);
        assert_eq!(pending[0].quorum, "2-of-2");

        let uri = "/api/multisig/pending/1/sign";
        let (status, signed): (_, SignResponse) =
            call(&h.router, "POST", uri, Some(auth(&s1, CallAction::Sign, 1))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(signed.signer, s1.address());
        assert_eq!(
            signed.outcome,
            SignOutcome::Recorded {
                signatures: 1,
                required: 2
            }
        );

        let (_, signed): (_, SignResponse) =
            call(&h.router, "POST", uri, Some(auth(&s2, CallAction::Sign, 1))).await;
        assert_eq!(signed.outcome, SignOutcome::Executed);
        let token_address = signed.token_address.unwrap();

        let (_, token): (_, TokenInfo) = call(
            &h.router,
            "GET",
            &format!("/api/tokens/{}", token_address),
            None,
        )
        .await;
        assert_eq!(token.symbol, "DMOON");
        assert_eq!(token.total_supply, 1_000_000);
        assert_eq!(token.launch_tx, 1);

        let (_, status): (_, StatusResponse) =
            call(&h.router, "GET", "/api/multisig/pending/1/status", None).await;
        assert_eq!(status.status, TxStatus::Executed);
        assert_eq!(status.signatures_required, None);

        let (_, record): (_, PendingTransaction) =
            call(&h.router, "GET", "/api/multisig/pending/1", None).await;
        assert!(record.is_empty());

        // The state was persisted on every mutation
        let saved = h.state.storage.load().unwrap();
        assert_eq!(saved.tokens().count(), 1);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let h = harness(QuorumPolicy::Unanimous);
        let (s1, s2, outsider) = (KeyPair::generate(), KeyPair::generate(), KeyPair::generate());
        create_launch(&h.router, &[&s1, &s2]).await;
        let uri = "/api/multisig/pending/1/sign";

        let (status, _): (_, ApiError) =
            call(&h.router, "POST", uri, Some(auth(&outsider, CallAction::Sign, 1))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Signed for the wrong action
        let (status, _): (_, ApiError) =
            call(&h.router, "POST", uri, Some(auth(&s1, CallAction::Unsign, 1))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        call::<SignResponse>(&h.router, "POST", uri, Some(auth(&s1, CallAction::Sign, 1))).await;
        let (status, _): (_, ApiError) =
            call(&h.router, "POST", uri, Some(auth(&s1, CallAction::Sign, 1))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _): (_, ApiError) = call(
            &h.router,
            "POST",
            "/api/multisig/pending/1/unsign",
            Some(auth(&s2, CallAction::Unsign, 1)),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _): (_, ApiError) = call(
            &h.router,
            "POST",
            "/api/multisig/pending/9/sign",
            Some(auth(&s1, CallAction::Sign, 9)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _): (_, ApiError) =
            call(&h.router, "GET", "/api/factory/requests/9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_launch_rejected() {
        let h = harness(QuorumPolicy::AllButOne);
        let body = serde_json::json!({
            "owner": "owner",
            "name": "Lonely",
            "symbol": "LONE",
            "total_supply": 10,
            "signers": ["only-one"],
        });

        let (status, error): (_, ApiError) =
            call(&h.router, "POST", "/api/factory/requests", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error.error.contains("signers"));

        let (_, requests): (_, Vec<TxData>) =
            call(&h.router, "GET", "/api/factory/requests", None).await;
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn test_unsign_over_http() {
        let h = harness(QuorumPolicy::Unanimous);
        let (s1, s2, s3) = (KeyPair::generate(), KeyPair::generate(), KeyPair::generate());
        create_launch(&h.router, &[&s1, &s2, &s3]).await;

        call::<SignResponse>(
            &h.router,
            "POST",
            "/api/multisig/pending/1/sign",
            Some(auth(&s3, CallAction::Sign, 1)),
        )
        .await;
        let (status, body): (_, serde_json::Value) = call(
            &h.router,
            "POST",
            "/api/multisig/pending/1/unsign",
            Some(auth(&s3, CallAction::Unsign, 1)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["signatures"], 0);
        assert_eq!(body["signer"], s3.address());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_state_unchanged() {
        let h = harness(QuorumPolicy::AllButOne);
        let (s1, s2) = (KeyPair::generate(), KeyPair::generate());
        create_launch(&h.router, &[&s1, &s2]).await;

        std::fs::remove_dir_all(h.state.storage.data_dir()).unwrap();

        let (status, _): (_, ApiError) = call(
            &h.router,
            "POST",
            "/api/multisig/pending/1/sign",
            Some(auth(&s1, CallAction::Sign, 1)),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let launchpad = h.state.launchpad.read().await;
        assert_eq!(launchpad.tx_status(1), TxStatus::Pending);
        assert_eq!(launchpad.tokens().count(), 0);
        assert!(launchpad.get_tx_data(1).unwrap().is_pending);
    }

    #[tokio::test]
    async fn test_balances_over_http() {
        let h = harness(QuorumPolicy::AllButOne);
        let (s1, s2) = (KeyPair::generate(), KeyPair::generate());
        create_launch(&h.router, &[&s1, &s2]).await;

        let (_, signed): (_, SignResponse) = call(
            &h.router,
            "POST",
            "/api/multisig/pending/1/sign",
            Some(auth(&s1, CallAction::Sign, 1)),
        )
        .await;
        let token_address = signed.token_address.unwrap();

        let (status, balance): (_, BalanceResponse) = call(
            &h.router,
            "GET",
            &format!("/api/tokens/{}/balance/owner", token_address),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(balance.balance, 1_000_000);

        let (_, holdings): (_, Vec<HoldingInfo>) =
            call(&h.router, "GET", "/api/holders/owner/tokens", None).await;
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].token.address, token_address);

        let (status, _): (_, ApiError) =
            call(&h.router, "GET", "/api/tokens/0xmissing/balance/owner", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
