pub mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Chat pipeline
        .route("/api/v1/intent", post(handlers::classify_intent))
        .route("/api/v1/chat", post(handlers::chat))
        // Data endpoints (also the targets of planned fetches)
        .route("/api/v1/token/search", get(handlers::search_token))
        .route("/api/v1/wallet/{wallet}/portfolio", get(handlers::get_wallet_portfolio))
        .route("/api/v1/wallet/{wallet}/profile", get(handlers::get_wallet_profile))
        .route("/api/v1/dapp", get(handlers::get_dapp))
        .route("/api/v1/market/overview", get(handlers::get_market_overview))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(AppConfig::default()).unwrap();
        create_router().with_state(state)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["llm_configured"], false);
    }

    #[tokio::test]
    async fn test_intent_endpoint() {
        let (status, body) = send(post_json("/api/v1/intent", json!({ "query": "What's the price of SOL?" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["intent"]["type"], "token");
        assert_eq!(body["intent"]["tokens"], json!(["SOL"]));
        assert_eq!(body["plan"][0]["endpoint"], "/api/v1/token/search");
        assert_eq!(body["plan"][0]["params"]["query"], "SOL");
    }

    #[tokio::test]
    async fn test_intent_rejects_empty_query() {
        let (status, body) = send(post_json("/api/v1/intent", json!({ "query": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PARAM");
    }

    #[tokio::test]
    async fn test_invalid_wallet_is_400() {
        for path in ["/api/v1/wallet/not-a-wallet/portfolio", "/api/v1/wallet/not-a-wallet/profile"] {
            let (status, body) = send(Request::get(path).body(Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["code"], "INVALID_WALLET");
        }
    }

    #[tokio::test]
    async fn test_chat_without_llm_key_is_503() {
        let (status, body) = send(post_json("/api/v1/chat", json!({ "message": "price of SOL" }))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "CONFIG_ERROR");
    }

    #[tokio::test]
    async fn test_dapp_requires_name() {
        let (status, _) = send(Request::get("/api/v1/dapp").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
