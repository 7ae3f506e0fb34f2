use std::collections::HashMap;
use std::time::Instant;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use super::send_json;
use crate::config::PricesConfig;
use crate::error::AppResult;

// ============================================================================
// Price Client - spot prices, global market data and trending coins
// ============================================================================

const SOURCE: &str = "prices";

#[derive(Clone)]
pub struct PriceClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoinSummary {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<CoinSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimplePrice {
    pub usd: Option<f64>,
    pub usd_market_cap: Option<f64>,
    pub usd_24h_vol: Option<f64>,
    pub usd_24h_change: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalMarket,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalMarket {
    #[serde(default)]
    pub active_cryptocurrencies: u64,
    #[serde(default)]
    pub total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_percentage: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_change_percentage_24h_usd: f64,
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    coins: Vec<TrendingEntry>,
}

#[derive(Debug, Deserialize)]
struct TrendingEntry {
    item: CoinSummary,
}

impl PriceClient {
    pub fn new(config: &PricesConfig, client: Client) -> Self {
        tracing::debug!(base_url = %config.base_url, "Creating price client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(format!("{}{}", self.base_url, path));
        if self.api_key.is_empty() {
            request
        } else {
            request.header("x-cg-demo-api-key", &self.api_key)
        }
    }

    pub async fn search(&self, query: &str) -> AppResult<Vec<CoinSummary>> {
        let request = self.get("/search").query(&[("query", query)]);
        let response: SearchResponse = send_json(SOURCE, request).await?;
        Ok(response.coins)
    }

    /// USD price, market cap, volume and 24h change keyed by coin id.
    pub async fn simple_prices(&self, ids: &[String]) -> AppResult<HashMap<String, SimplePrice>> {
        let start = Instant::now();
        let request = self.get("/simple/price").query(&[
            ("ids", ids.join(",").as_str()),
            ("vs_currencies", "usd"),
            ("include_market_cap", "true"),
            ("include_24hr_vol", "true"),
            ("include_24hr_change", "true"),
        ]);

        let prices: HashMap<String, SimplePrice> = send_json(SOURCE, request).await?;
        tracing::debug!(
            ids = ?ids,
            found = %prices.len(),
            duration_ms = %start.elapsed().as_millis(),
            "Fetched spot prices"
        );
        Ok(prices)
    }

    pub async fn global(&self) -> AppResult<GlobalMarket> {
        let response: GlobalResponse = send_json(SOURCE, self.get("/global")).await?;
        Ok(response.data)
    }

    pub async fn trending(&self) -> AppResult<Vec<CoinSummary>> {
        let response: TrendingResponse = send_json(SOURCE, self.get("/search/trending")).await?;
        Ok(response.coins.into_iter().map(|c| c.item).collect())
    }
}

/// Exact symbol (case-insensitive) with the best market cap rank; an unranked
/// exact match beats nothing. Falls back to the provider's first result.
pub fn best_match<'a>(coins: &'a [CoinSummary], query: &str) -> Option<&'a CoinSummary> {
    coins
        .iter()
        .filter(|c| c.symbol.eq_ignore_ascii_case(query))
        .min_by_key(|c| c.market_cap_rank.unwrap_or(u32::MAX))
        .or_else(|| coins.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coin(id: &str, symbol: &str, rank: Option<u32>) -> CoinSummary {
        CoinSummary {
            id: id.to_string(),
            name: id.to_string(),
            symbol: symbol.to_string(),
            market_cap_rank: rank,
            thumb: None,
        }
    }

    #[test]
    fn test_best_match_prefers_ranked_exact_symbol() {
        let coins = vec![
            coin("solana-wormhole", "SOL", None),
            coin("solana", "SOL", Some(5)),
            coin("solar", "SXP", Some(400)),
        ];
        assert_eq!(best_match(&coins, "sol").unwrap().id, "solana");
        assert_eq!(best_match(&coins, "XYZ").unwrap().id, "solana-wormhole");
        assert!(best_match(&[], "SOL").is_none());
    }

    #[test]
    fn test_global_decoding() {
        let body = json!({
            "data": {
                "active_cryptocurrencies": 17000,
                "total_market_cap": { "usd": 2.4e12, "btc": 3.8e7 },
                "total_volume": { "usd": 9.1e10 },
                "market_cap_percentage": { "btc": 54.2, "eth": 13.1 },
                "market_cap_change_percentage_24h_usd": -1.25
            }
        });
        let global: GlobalResponse = serde_json::from_value(body).unwrap();
        assert_eq!(global.data.total_market_cap.get("usd"), Some(&2.4e12));
        assert_eq!(global.data.market_cap_percentage.get("eth"), Some(&13.1));
    }

    #[test]
    fn test_trending_decoding() {
        let body = json!({
            "coins": [{ "item": { "id": "bonk", "name": "Bonk", "symbol": "BONK", "market_cap_rank": 60, "thumb": "t.png" } }]
        });
        let trending: TrendingResponse = serde_json::from_value(body).unwrap();
        assert_eq!(trending.coins[0].item.symbol, "BONK");
        assert_eq!(trending.coins[0].item.market_cap_rank, Some(60));
    }
}
