use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sonar_core::{DetectedIntent, FetchDescriptor, Holding, TradingBehavior, TradingFrequency, WalletProfile};
use uuid::Uuid;

use crate::upstream::TokenMetadata;

// ============================================================================
// GET /health
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub llm_configured: bool,
    pub llm_model: String,
    pub portfolio_configured: bool,
}

// ============================================================================
// POST /api/v1/intent
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IntentResponse {
    pub intent: DetectedIntent,
    pub plan: Vec<FetchDescriptor>,
}

// ============================================================================
// POST /api/v1/chat
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// One planned fetch and its outcome. `data` is `null` when the fetch failed.
#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    #[serde(flatten)]
    pub descriptor: FetchDescriptor,
    pub data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: Uuid,
    pub reply: String,
    pub intent: DetectedIntent,
    pub data: Vec<FetchResult>,
}

// ============================================================================
// GET /api/v1/token/search
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TokenSearchQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenMarket {
    pub coin_id: String,
    pub name: String,
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
    pub price_usd: Option<Decimal>,
    pub market_cap_usd: Option<Decimal>,
    pub volume_24h_usd: Option<Decimal>,
    pub change_24h_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenSearchResponse {
    pub query: String,
    pub tokens: Vec<TokenMetadata>,
    pub market: Option<TokenMarket>,
}

// ============================================================================
// GET /api/v1/wallet/{address}/portfolio
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioResponse {
    pub address: String,
    pub total_value_usd: Decimal,
    pub holding_count: usize,
    pub diversification_score: f64,
    pub holdings: Vec<Holding>,
}

// ============================================================================
// GET /api/v1/wallet/{address}/profile
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub portfolio_value_usd: Decimal,
    pub total_transactions: u64,
    pub trading_frequency: TradingFrequency,
    pub trades_per_week: f64,
    pub diversification_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletProfileResponse {
    pub address: String,
    pub profile: WalletProfile,
    pub behavior: TradingBehavior,
    pub stats: StatsSummary,
}

// ============================================================================
// GET /api/v1/dapp
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DappQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DappResponse {
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub chains: Vec<String>,
    pub tvl_usd: Decimal,
    pub url: Option<String>,
    pub logo: Option<String>,
}

// ============================================================================
// GET /api/v1/market/overview
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TrendingToken {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap_rank: Option<u32>,
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketOverviewResponse {
    pub total_market_cap_usd: Decimal,
    pub total_volume_usd: Decimal,
    pub market_cap_change_24h_pct: f64,
    pub btc_dominance_pct: f64,
    pub eth_dominance_pct: f64,
    pub active_cryptocurrencies: u64,
    pub trending: Vec<TrendingToken>,
}
