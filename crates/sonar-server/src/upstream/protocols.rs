use std::collections::HashMap;
use std::time::Instant;

use reqwest::Client;
use serde::Deserialize;

use super::send_json;
use crate::config::ProtocolsConfig;
use crate::error::{AppError, AppResult};

// ============================================================================
// Protocol Client - DApp descriptions and TVL
// ============================================================================

const SOURCE: &str = "protocols";

/// Chain TVL keys that double count or are not deposits.
const EXCLUDED_TVL_KEYS: &[&str] = &["staking", "pool2", "borrowed", "vesting", "treasury", "offers"];

#[derive(Clone)]
pub struct ProtocolClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProtocolInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default, rename = "currentChainTvls")]
    pub current_chain_tvls: HashMap<String, f64>,
}

impl ProtocolInfo {
    /// Sum of per-chain TVL, skipping `chain-staking` style breakdown keys
    /// and the non-deposit buckets.
    pub fn total_tvl(&self) -> f64 {
        self.current_chain_tvls
            .iter()
            .filter(|(key, _)| !key.contains('-') && !EXCLUDED_TVL_KEYS.contains(&key.as_str()))
            .map(|(_, tvl)| *tvl)
            .sum()
    }
}

impl ProtocolClient {
    pub fn new(config: &ProtocolsConfig, client: Client) -> Self {
        tracing::debug!(base_url = %config.base_url, "Creating protocol client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn protocol(&self, slug: &str) -> AppResult<ProtocolInfo> {
        let start = Instant::now();
        let url = format!("{}/protocol/{}", self.base_url, slug);

        println!("[PROTOCOLS] Fetching protocol {}", slug);

        let info: ProtocolInfo = send_json(SOURCE, self.client.get(&url))
            .await
            .map_err(|e| unknown_slug(e, slug))?;

        tracing::info!(
            slug = %slug,
            tvl = %info.total_tvl(),
            duration_ms = %start.elapsed().as_millis(),
            "Fetched protocol info"
        );

        Ok(info)
    }
}

/// Unknown slugs come back as 400 "Protocol not found".
fn unknown_slug(error: AppError, slug: &str) -> AppError {
    match error {
        AppError::UpstreamStatus { status: 400, .. } => {
            AppError::NotFound(format!("Unknown DApp: {}", slug))
        }
        other => other,
    }
}
