use std::time::Instant;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use sonar_core::{ActivityItem, Transfer, TransferDirection};

use super::send_json;
use crate::config::PortfolioConfig;
use crate::error::{AppError, AppResult};

// ============================================================================
// Portfolio Client - wallet positions and transaction history (JSON:API)
// ============================================================================

const SOURCE: &str = "portfolio";

/// Provider max page size for transactions
const PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct PortfolioClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// A fungible position as returned by the provider, before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletPosition {
    pub symbol: String,
    pub name: String,
    pub value: f64,
    pub quantity: String,
    pub icon: Option<String>,
    pub chain: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    links: Option<Links>,
}

#[derive(Debug, Deserialize)]
struct Links {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PositionData {
    attributes: PositionAttributes,
    #[serde(default)]
    relationships: Option<PositionRelationships>,
}

#[derive(Debug, Deserialize)]
struct PositionAttributes {
    #[serde(default)]
    quantity: Option<Quantity>,
    value: Option<f64>,
    fungible_info: Option<FungibleInfo>,
}

#[derive(Debug, Deserialize)]
struct Quantity {
    numeric: String,
}

#[derive(Debug, Deserialize)]
struct FungibleInfo {
    name: Option<String>,
    symbol: Option<String>,
    icon: Option<Icon>,
}

#[derive(Debug, Deserialize)]
struct Icon {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PositionRelationships {
    chain: Option<Relationship>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    data: RelationshipData,
}

#[derive(Debug, Deserialize)]
struct RelationshipData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    attributes: TransactionAttributes,
}

#[derive(Debug, Deserialize)]
struct TransactionAttributes {
    hash: String,
    mined_at: DateTime<Utc>,
    operation_type: String,
    #[serde(default)]
    transfers: Vec<TransferData>,
}

#[derive(Debug, Deserialize)]
struct TransferData {
    fungible_info: Option<FungibleInfo>,
    direction: String,
    quantity: Option<Quantity>,
    value: Option<f64>,
}

impl PortfolioClient {
    pub fn new(config: &PortfolioConfig, client: Client) -> Self {
        tracing::debug!(base_url = %config.base_url, "Creating portfolio client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(AppError::Config(
                "Portfolio API key is not set (SONAR__PORTFOLIO__API_KEY)".to_string(),
            ))
        }
    }

    /// Non-trash fungible positions valued in USD, as listed by the provider.
    pub async fn positions(&self, address: &str) -> AppResult<Vec<WalletPosition>> {
        self.ensure_configured()?;
        let start = Instant::now();
        let url = format!("{}/wallets/{}/positions/", self.base_url, address);

        println!("[PORTFOLIO] Fetching positions for {}", address);

        let request = self
            .client
            .get(&url)
            .basic_auth(&self.api_key, Some(""))
            .query(&[
                ("filter[positions]", "only_simple"),
                ("filter[trash]", "only_non_trash"),
                ("currency", "usd"),
                ("sort", "value"),
            ]);

        let response: ListResponse<PositionData> = send_json(SOURCE, request).await?;
        let positions: Vec<WalletPosition> = response
            .data
            .into_iter()
            .filter_map(into_position)
            .collect();

        println!(
            "[PORTFOLIO] Received {} positions ({}ms)",
            positions.len(),
            start.elapsed().as_millis()
        );
        tracing::info!(
            wallet = %address,
            count = %positions.len(),
            duration_ms = %start.elapsed().as_millis(),
            "Fetched wallet positions"
        );

        Ok(positions)
    }

    /// Transaction history, newest first, following `links.next` until
    /// `max_transactions` items are collected or the provider runs out.
    pub async fn transactions(
        &self,
        address: &str,
        max_transactions: usize,
    ) -> AppResult<Vec<ActivityItem>> {
        self.ensure_configured()?;
        let start = Instant::now();
        let mut all = Vec::new();
        let page_size = PAGE_SIZE.min(max_transactions.max(1) as u32);

        let first_url = format!("{}/wallets/{}/transactions/", self.base_url, address);
        let mut request = self
            .client
            .get(&first_url)
            .basic_auth(&self.api_key, Some(""))
            .query(&[
                ("currency", "usd".to_string()),
                ("page[size]", page_size.to_string()),
                ("filter[trash]", "only_non_trash".to_string()),
            ]);

        println!(
            "[PORTFOLIO] Fetching transactions for {} (max={})",
            address, max_transactions
        );

        loop {
            let page: ListResponse<TransactionData> = send_json(SOURCE, request).await?;
            if page.data.is_empty() {
                break;
            }
            all.extend(page.data.into_iter().map(into_activity));

            if all.len() >= max_transactions {
                all.truncate(max_transactions);
                break;
            }

            match page.links.and_then(|l| l.next) {
                Some(next) => {
                    tracing::debug!(fetched = %all.len(), "Following next page");
                    request = self.client.get(&next).basic_auth(&self.api_key, Some(""));
                }
                None => break,
            }
        }

        println!(
            "[PORTFOLIO] Received {} transactions ({}ms)",
            all.len(),
            start.elapsed().as_millis()
        );
        tracing::info!(
            wallet = %address,
            count = %all.len(),
            duration_ms = %start.elapsed().as_millis(),
            "Fetched transaction history"
        );

        Ok(all)
    }
}

fn into_position(data: PositionData) -> Option<WalletPosition> {
    let attributes = data.attributes;
    let info = attributes.fungible_info?;
    let symbol = info.symbol.filter(|s| !s.is_empty())?;

    Some(WalletPosition {
        name: info.name.unwrap_or_else(|| symbol.clone()),
        symbol,
        value: attributes.value.unwrap_or(0.0),
        quantity: attributes
            .quantity
            .map(|q| q.numeric)
            .unwrap_or_else(|| "0".to_string()),
        icon: info.icon.and_then(|i| i.url),
        chain: data
            .relationships
            .and_then(|r| r.chain)
            .map(|c| c.data.id)
            .unwrap_or_else(|| "unknown".to_string()),
    })
}

fn into_activity(data: TransactionData) -> ActivityItem {
    let attributes = data.attributes;
    ActivityItem {
        hash: attributes.hash,
        timestamp: attributes.mined_at,
        operation: attributes.operation_type,
        transfers: attributes
            .transfers
            .into_iter()
            .map(|t| Transfer {
                symbol: t
                    .fungible_info
                    .and_then(|i| i.symbol)
                    .unwrap_or_else(|| "?".to_string()),
                direction: parse_direction(&t.direction),
                quantity: t.quantity.map(|q| q.numeric).unwrap_or_else(|| "0".to_string()),
                value: t.value,
            })
            .collect(),
    }
}

fn parse_direction(direction: &str) -> TransferDirection {
    match direction {
        "in" => TransferDirection::In,
        "out" => TransferDirection::Out,
        _ => TransferDirection::SelfTransfer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_position_decoding() {
        let body = json!({
            "data": [
                {
                    "type": "positions",
                    "id": "abc",
                    "attributes": {
                        "quantity": { "numeric": "12.5", "float": 12.5 },
                        "value": 1875.0,
                        "price": 150.0,
                        "fungible_info": {
                            "name": "Solana",
                            "symbol": "SOL",
                            "icon": { "url": "https://example.com/sol.png" }
                        }
                    },
                    "relationships": { "chain": { "data": { "type": "chains", "id": "solana" } } }
                },
                {
                    "type": "positions",
                    "id": "nosymbol",
                    "attributes": { "value": 1.0, "fungible_info": { "name": "Mystery" } }
                }
            ]
        });

        let response: ListResponse<PositionData> = serde_json::from_value(body).unwrap();
        let positions: Vec<WalletPosition> =
            response.data.into_iter().filter_map(into_position).collect();

        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol, "SOL");
        assert_eq!(positions[0].quantity, "12.5");
        assert_eq!(positions[0].chain, "solana");
        assert_eq!(positions[0].icon.as_deref(), Some("https://example.com/sol.png"));
    }

    #[test]
    fn test_transaction_decoding() {
        let body = json!({
            "links": { "next": "https://api.example.com/next" },
            "data": [{
                "attributes": {
                    "hash": "5abc",
                    "mined_at": "2026-10-01T12:00:00Z",
                    "operation_type": "trade",
                    "transfers": [
                        { "fungible_info": { "symbol": "SOL" }, "direction": "out",
                          "quantity": { "numeric": "1" }, "value": 150.0 },
                        { "fungible_info": { "symbol": "BONK" }, "direction": "in",
                          "quantity": { "numeric": "1000000" }, "value": null }
                    ]
                }
            }]
        });

        let page: ListResponse<TransactionData> = serde_json::from_value(body).unwrap();
        assert_eq!(
            page.links.as_ref().and_then(|l| l.next.as_deref()),
            Some("https://api.example.com/next")
        );

        let item = into_activity(page.data.into_iter().next().unwrap());
        assert_eq!(item.operation, "trade");
        assert_eq!(item.transfers.len(), 2);
        assert_eq!(item.transfers[0].direction, TransferDirection::Out);
        assert_eq!(item.transfers[1].value, None);
    }

    #[test]
    fn test_unconfigured_client_is_rejected() {
        let client = PortfolioClient::new(&PortfolioConfig::default(), Client::new());
        assert!(!client.is_configured());
        assert!(matches!(client.ensure_configured(), Err(AppError::Config(_))));
    }
}
