use std::time::Instant;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::send_json;
use crate::config::MetadataConfig;
use crate::error::AppResult;

// ============================================================================
// Metadata Client - token search, tags and logos
// ============================================================================

const SOURCE: &str = "metadata";

/// Provider tags that map to a holding category. Anything else
/// (verification flags, launchpad markers) is ignored.
const CATEGORY_TAGS: &[(&str, &str)] = &[
    ("lst", "Liquid Staking"),
    ("meme", "Meme"),
    ("stablecoin", "Stablecoin"),
    ("stable", "Stablecoin"),
    ("defi", "DeFi"),
    ("gaming", "Gaming"),
    ("ai", "AI"),
    ("rwa", "RWA"),
    ("governance", "Governance"),
    ("wrapped", "Wrapped"),
];

#[derive(Clone)]
pub struct MetadataClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    /// Mint address
    #[serde(rename(deserialize = "id"))]
    pub address: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub decimals: u8,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename(deserialize = "isVerified"))]
    pub verified: Option<bool>,
    #[serde(default)]
    pub usd_price: Option<f64>,
    #[serde(default, rename(deserialize = "mcap"))]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub liquidity: Option<f64>,
}

impl TokenMetadata {
    pub fn categories(&self) -> Vec<String> {
        categories_from_tags(&self.tags)
    }
}

impl MetadataClient {
    pub fn new(config: &MetadataConfig, client: Client) -> Self {
        tracing::debug!(base_url = %config.base_url, "Creating metadata client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Search by symbol, name or mint address.
    pub async fn search(&self, query: &str) -> AppResult<Vec<TokenMetadata>> {
        let start = Instant::now();
        let url = format!("{}/search", self.base_url);

        let mut request = self.client.get(&url).query(&[("query", query)]);
        if !self.api_key.is_empty() {
            request = request.header("x-api-key", &self.api_key);
        }

        let tokens: Vec<TokenMetadata> = send_json(SOURCE, request).await?;

        tracing::info!(
            query = %query,
            count = %tokens.len(),
            duration_ms = %start.elapsed().as_millis(),
            "Token metadata search"
        );

        Ok(tokens)
    }

    /// Categories for a held symbol, taken from the best exact-symbol match.
    pub async fn categories_for(&self, symbol: &str) -> AppResult<Vec<String>> {
        let tokens = self.search(symbol).await?;
        Ok(exact_symbol_match(&tokens, symbol)
            .map(TokenMetadata::categories)
            .unwrap_or_default())
    }
}

/// Verified exact matches win, then the most liquid.
pub fn exact_symbol_match<'a>(tokens: &'a [TokenMetadata], symbol: &str) -> Option<&'a TokenMetadata> {
    tokens
        .iter()
        .filter(|t| t.symbol.eq_ignore_ascii_case(symbol))
        .max_by(|a, b| {
            let key = |t: &TokenMetadata| (t.verified.unwrap_or(false), t.liquidity.unwrap_or(0.0));
            let (va, la) = key(a);
            let (vb, lb) = key(b);
            va.cmp(&vb).then(la.total_cmp(&lb))
        })
}

pub fn categories_from_tags(tags: &[String]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.to_ascii_lowercase();
        if let Some((_, category)) = CATEGORY_TAGS.iter().find(|(t, _)| *t == tag) {
            if !categories.iter().any(|c| c == category) {
                categories.push(category.to_string());
            }
        }
    }
    categories
}
