//! Data models shared by the classifier, the profiler and the server
//!
//! All of these are snapshots: built fresh for one request, never mutated
//! afterwards and never persisted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Intent Detection
// =============================================================================

/// Coarse category of a chat query.
///
/// Declaration order is significant: it is the iteration order of the
/// classifier, so on equal scores the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentType {
    Token,
    Wallet,
    Market,
    Comparison,
    Alert,
    Dapp,
    General,
}

impl IntentType {
    pub const ALL: [IntentType; 7] = [
        IntentType::Token,
        IntentType::Wallet,
        IntentType::Market,
        IntentType::Comparison,
        IntentType::Alert,
        IntentType::Dapp,
        IntentType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::Token => "token",
            IntentType::Wallet => "wallet",
            IntentType::Market => "market",
            IntentType::Comparison => "comparison",
            IntentType::Alert => "alert",
            IntentType::Dapp => "dapp",
            IntentType::General => "general",
        }
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Price,
    Volume,
    Whale,
    Risk,
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertType::Price => write!(f, "price"),
            AlertType::Volume => write!(f, "volume"),
            AlertType::Whale => write!(f, "whale"),
            AlertType::Risk => write!(f, "risk"),
        }
    }
}

/// A "X vs Y" pair, symbols uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub from: String,
    pub to: String,
}

/// Result of classifying one chat query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedIntent {
    #[serde(rename = "type")]
    pub intent_type: IntentType,

    /// Winning score clamped to [0, 1]
    pub confidence: f64,

    /// Token symbols, or mint addresses for token intents
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wallets: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dapps: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<AlertType>,

    pub raw_query: String,
}

// =============================================================================
// Portfolio Snapshot
// =============================================================================

/// One row of a wallet's ranked holdings list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub name: String,
    /// USD value of the position
    pub value: f64,
    /// Share of total portfolio value, 0-100
    pub percentage: f64,
    /// Token quantity as reported upstream (kept as text to avoid rounding)
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub chain: String,
    pub chain_name: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    In,
    Out,
    #[serde(rename = "self")]
    SelfTransfer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub symbol: String,
    pub direction: TransferDirection,
    pub quantity: String,
    /// USD value at execution time, when the provider knows it
    #[serde(default)]
    pub value: Option<f64>,
}

/// One transaction from a wallet's recent history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    /// Provider operation label (trade, send, receive, ...)
    pub operation: String,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

// =============================================================================
// Wallet Profiling
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradingFrequency {
    #[serde(rename = "Very Active")]
    VeryActive,
    Active,
    Moderate,
    Passive,
}

impl TradingFrequency {
    /// Bucket a trades-per-week rate into a frequency label.
    pub fn from_trades_per_week(trades_per_week: f64) -> Self {
        if trades_per_week >= 20.0 {
            TradingFrequency::VeryActive
        } else if trades_per_week >= 5.0 {
            TradingFrequency::Active
        } else if trades_per_week >= 1.0 {
            TradingFrequency::Moderate
        } else {
            TradingFrequency::Passive
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradingFrequency::VeryActive => "Very Active",
            TradingFrequency::Active => "Active",
            TradingFrequency::Moderate => "Moderate",
            TradingFrequency::Passive => "Passive",
        }
    }
}

impl fmt::Display for TradingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate statistics the profiler works from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStats {
    pub portfolio_value: f64,
    pub total_transactions: u64,
    pub trading_frequency: TradingFrequency,
    /// 0-100, see [`crate::behavior::diversification_score`]
    pub diversification_score: f64,
    #[serde(default)]
    pub top_holdings: Vec<Holding>,
    #[serde(default)]
    pub recent_activity: Vec<ActivityItem>,
}

impl WalletStats {
    /// Reject snapshots that would silently produce a plausible but wrong
    /// profile.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.portfolio_value.is_finite() || self.portfolio_value < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "portfolio value must be a non-negative number, got {}",
                self.portfolio_value
            )));
        }

        if !(0.0..=100.0).contains(&self.diversification_score) {
            return Err(CoreError::InvalidInput(format!(
                "diversification score must be within 0-100, got {}",
                self.diversification_score
            )));
        }

        if let Some(h) = self
            .top_holdings
            .iter()
            .find(|h| !h.value.is_finite() || h.value < 0.0 || !h.percentage.is_finite())
        {
            return Err(CoreError::InvalidInput(format!(
                "holding {} has an invalid value or percentage",
                h.symbol
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletCategory {
    Whale,
    #[serde(rename = "Smart Trader")]
    SmartTrader,
    Degen,
    #[serde(rename = "HODLer")]
    Hodler,
    Bot,
    Casual,
}

impl fmt::Display for WalletCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletCategory::Whale => write!(f, "Whale"),
            WalletCategory::SmartTrader => write!(f, "Smart Trader"),
            WalletCategory::Degen => write!(f, "Degen"),
            WalletCategory::Hodler => write!(f, "HODLer"),
            WalletCategory::Bot => write!(f, "Bot"),
            WalletCategory::Casual => write!(f, "Casual"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskProfile::Conservative => write!(f, "Conservative"),
            RiskProfile::Moderate => write!(f, "Moderate"),
            RiskProfile::Aggressive => write!(f, "Aggressive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletProfile {
    pub category: WalletCategory,
    /// Dominant holding categories, highest value first
    pub expertise: Vec<String>,
    pub risk_profile: RiskProfile,
    /// 0-100
    pub confidence: u8,
    pub reasoning: String,
}

// =============================================================================
// Trading Behavior
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPreference {
    pub category: String,
    pub percentage: f64,
    pub trade_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorRiskMetrics {
    /// Share of value held in the top 3 holdings, 0-100
    pub portfolio_concentration: f64,
    /// Number of distinct holding categories
    pub category_diversification: usize,
    pub avg_position_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingBehavior {
    pub avg_trade_size: f64,
    pub trading_frequency: TradingFrequency,
    pub trades_per_week: f64,
    pub preferred_categories: Vec<CategoryPreference>,
    pub risk_metrics: BehaviorRiskMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> WalletStats {
        WalletStats {
            portfolio_value: 1000.0,
            total_transactions: 10,
            trading_frequency: TradingFrequency::Moderate,
            diversification_score: 50.0,
            top_holdings: vec![],
            recent_activity: vec![],
        }
    }

    #[test]
    fn test_frequency_buckets() {
        assert_eq!(TradingFrequency::from_trades_per_week(25.0), TradingFrequency::VeryActive);
        assert_eq!(TradingFrequency::from_trades_per_week(20.0), TradingFrequency::VeryActive);
        assert_eq!(TradingFrequency::from_trades_per_week(5.0), TradingFrequency::Active);
        assert_eq!(TradingFrequency::from_trades_per_week(1.0), TradingFrequency::Moderate);
        assert_eq!(TradingFrequency::from_trades_per_week(0.5), TradingFrequency::Passive);
    }

    #[test]
    fn test_validate_rejects_bad_snapshots() {
        assert!(stats().validate().is_ok());

        let mut s = stats();
        s.portfolio_value = f64::NAN;
        assert!(s.validate().is_err());

        let mut s = stats();
        s.portfolio_value = -1.0;
        assert!(s.validate().is_err());

        let mut s = stats();
        s.diversification_score = 120.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_holdings() {
        let holding = |value: f64, percentage: f64| Holding {
            symbol: "BONK".to_string(),
            name: "Bonk".to_string(),
            value,
            percentage,
            quantity: "1".to_string(),
            icon: None,
            chain: "solana".to_string(),
            chain_name: "Solana".to_string(),
            categories: vec![],
        };

        let mut s = stats();
        s.top_holdings = vec![holding(250.0, 25.0)];
        assert!(s.validate().is_ok());

        for bad in [holding(f64::NAN, 10.0), holding(-5.0, 10.0), holding(100.0, f64::INFINITY)] {
            let mut s = stats();
            s.top_holdings = vec![holding(250.0, 25.0), bad];
            assert_eq!(
                s.validate(),
                Err(CoreError::InvalidInput(
                    "holding BONK has an invalid value or percentage".to_string()
                ))
            );
        }
    }

    #[test]
    fn test_serialized_labels() {
        let json = serde_json::to_value(WalletCategory::SmartTrader).unwrap();
        assert_eq!(json, "Smart Trader");
        let json = serde_json::to_value(TradingFrequency::VeryActive).unwrap();
        assert_eq!(json, "Very Active");
        let json = serde_json::to_value(IntentType::Dapp).unwrap();
        assert_eq!(json, "dapp");
    }
}
