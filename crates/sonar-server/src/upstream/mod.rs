//! Clients for the third-party APIs behind the gateway
//!
//! Every client shares one `reqwest::Client` (connection pool and timeout)
//! and decodes responses through [`send_json`], so failures surface as
//! [`AppError::UpstreamStatus`] with the upstream status and a body preview,
//! or as [`AppError::ExternalApi`] for transport and decode errors.

pub mod llm;
pub mod metadata;
pub mod portfolio;
pub mod prices;
pub mod protocols;

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};

pub use llm::{ChatMessage, LlmClient};
pub use metadata::{MetadataClient, TokenMetadata};
pub use portfolio::{PortfolioClient, WalletPosition};
pub use prices::PriceClient;
pub use protocols::ProtocolClient;

pub fn http_client(config: &UpstreamConfig) -> AppResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(concat!("sonar/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Send a request and decode a JSON body.
///
/// 404 becomes [`AppError::NotFound`] and any other non-2xx status becomes
/// [`AppError::UpstreamStatus`]. Transport and decode failures become
/// [`AppError::ExternalApi`].
pub(crate) async fn send_json<T: DeserializeOwned>(
    source: &'static str,
    request: RequestBuilder,
) -> AppResult<T> {
    let start = Instant::now();

    let response = request.send().await.map_err(|e| {
        tracing::error!(source, error = %e, "Upstream request failed");
        AppError::ExternalApi(format!("{} request failed: {}", source, e))
    })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        tracing::debug!(source, "Upstream returned 404");
        return Err(AppError::NotFound(format!("{} has no such resource", source)));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let preview: String = body.chars().take(200).collect();
        tracing::error!(source, status = %status, body = %preview, "Upstream API error");
        return Err(AppError::UpstreamStatus {
            provider: source,
            status: status.as_u16(),
            body: preview,
        });
    }

    let parsed = response.json::<T>().await.map_err(|e| {
        tracing::error!(source, error = %e, "Failed to parse upstream response");
        AppError::ExternalApi(format!("Failed to parse {} response: {}", source, e))
    })?;

    tracing::debug!(
        source,
        duration_ms = %start.elapsed().as_millis(),
        "Upstream response decoded"
    );

    Ok(parsed)
}
