//! Wallet profiler
//!
//! Assigns a wallet one behavioral category from an ordered rule table. The
//! first rule whose predicate holds wins; signals are never combined. Rule
//! order is part of the behavior and is covered by tests.

use crate::behavior::analyze_expertise;
use crate::format::format_currency;
use crate::models::{RiskProfile, TradingFrequency, WalletCategory, WalletProfile, WalletStats};

pub const WHALE_VALUE_USD: f64 = 1_000_000.0;

/// One row of the classification ladder.
pub struct ProfileRule {
    pub category: WalletCategory,
    pub confidence: u8,
    pub matches: fn(&WalletStats) -> bool,
    pub reasoning: fn(&WalletStats) -> String,
}

/// Evaluated top to bottom. A wallet matching none of them is `Casual`.
pub const PROFILE_RULES: &[ProfileRule] = &[
    ProfileRule {
        category: WalletCategory::Whale,
        confidence: 90,
        matches: is_whale,
        reasoning: whale_reasoning,
    },
    ProfileRule {
        category: WalletCategory::Bot,
        confidence: 75,
        matches: is_bot,
        reasoning: bot_reasoning,
    },
    ProfileRule {
        category: WalletCategory::Degen,
        confidence: 70,
        matches: is_degen,
        reasoning: degen_reasoning,
    },
    ProfileRule {
        category: WalletCategory::Hodler,
        confidence: 80,
        matches: is_hodler,
        reasoning: hodler_reasoning,
    },
    ProfileRule {
        category: WalletCategory::SmartTrader,
        confidence: 75,
        matches: is_smart_trader,
        reasoning: smart_trader_reasoning,
    },
];

fn is_whale(s: &WalletStats) -> bool {
    s.portfolio_value > WHALE_VALUE_USD
}

fn is_bot(s: &WalletStats) -> bool {
    s.trading_frequency == TradingFrequency::VeryActive
        && s.diversification_score < 30.0
        && s.total_transactions > 100
}

fn is_degen(s: &WalletStats) -> bool {
    s.diversification_score < 40.0 && s.trading_frequency != TradingFrequency::Passive
}

fn is_hodler(s: &WalletStats) -> bool {
    s.trading_frequency == TradingFrequency::Passive && s.total_transactions < 20
}

fn is_smart_trader(s: &WalletStats) -> bool {
    s.diversification_score > 60.0 && s.total_transactions > 30
}

fn whale_reasoning(s: &WalletStats) -> String {
    format!(
        "Portfolio value of {} is above the {} whale threshold",
        format_currency(s.portfolio_value),
        format_currency(WHALE_VALUE_USD)
    )
}

fn bot_reasoning(s: &WalletStats) -> String {
    format!(
        "{} transactions at a very active pace with a diversification score of {:.0} suggest automated trading",
        s.total_transactions, s.diversification_score
    )
}

fn degen_reasoning(s: &WalletStats) -> String {
    format!(
        "Concentrated portfolio (diversification score {:.0}) with {} trading",
        s.diversification_score,
        s.trading_frequency.label().to_lowercase()
    )
}

fn hodler_reasoning(s: &WalletStats) -> String {
    format!(
        "Passive wallet with only {} transactions holding {}",
        s.total_transactions,
        format_currency(s.portfolio_value)
    )
}

fn smart_trader_reasoning(s: &WalletStats) -> String {
    format!(
        "Well diversified (score {:.0}) across {} transactions",
        s.diversification_score, s.total_transactions
    )
}

/// Profile a wallet snapshot.
///
/// Pure and total: call [`WalletStats::validate`] first to reject malformed
/// snapshots.
pub fn profile_wallet(stats: &WalletStats) -> WalletProfile {
    // Casual carries no confidence and no reasoning; kept as observed pending
    // a product decision on what it should report.
    let (category, confidence, reasoning) = PROFILE_RULES
        .iter()
        .find(|rule| (rule.matches)(stats))
        .map(|rule| (rule.category, rule.confidence, (rule.reasoning)(stats)))
        .unwrap_or((WalletCategory::Casual, 0, String::new()));

    WalletProfile {
        category,
        expertise: analyze_expertise(&stats.top_holdings, stats.portfolio_value),
        risk_profile: assess_risk(stats.diversification_score, category),
        confidence,
        reasoning,
    }
}

/// Independent of the category ladder except for the Degen/HODLer overrides.
pub fn assess_risk(diversification_score: f64, category: WalletCategory) -> RiskProfile {
    if diversification_score < 40.0 || category == WalletCategory::Degen {
        RiskProfile::Aggressive
    } else if diversification_score > 70.0 || category == WalletCategory::Hodler {
        RiskProfile::Conservative
    } else {
        RiskProfile::Moderate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::DIVERSIFIED_LABEL;
    use crate::models::Holding;

    fn stats(
        portfolio_value: f64,
        total_transactions: u64,
        trading_frequency: TradingFrequency,
        diversification_score: f64,
    ) -> WalletStats {
        WalletStats {
            portfolio_value,
            total_transactions,
            trading_frequency,
            diversification_score,
            top_holdings: vec![],
            recent_activity: vec![],
        }
    }

    #[test]
    fn test_rule_order() {
        let order: Vec<WalletCategory> = PROFILE_RULES.iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            vec![
                WalletCategory::Whale,
                WalletCategory::Bot,
                WalletCategory::Degen,
                WalletCategory::Hodler,
                WalletCategory::SmartTrader,
            ]
        );
    }

    #[test]
    fn test_whale_wins_regardless_of_other_fields() {
        for (tx, freq, div) in [
            (500, TradingFrequency::VeryActive, 10.0),
            (2, TradingFrequency::Passive, 90.0),
            (50, TradingFrequency::Active, 35.0),
        ] {
            let profile = profile_wallet(&stats(1_000_001.0, tx, freq, div));
            assert_eq!(profile.category, WalletCategory::Whale);
            assert_eq!(profile.confidence, 90);
        }

        // Exactly $1M is not a whale
        let profile = profile_wallet(&stats(1_000_000.0, 5, TradingFrequency::Passive, 80.0));
        assert_ne!(profile.category, WalletCategory::Whale);
    }

    #[test]
    fn test_hodler_scenario() {
        let profile = profile_wallet(&stats(50_000.0, 5, TradingFrequency::Passive, 80.0));
        assert_eq!(profile.category, WalletCategory::Hodler);
        assert_eq!(profile.risk_profile, RiskProfile::Conservative);
        assert_eq!(profile.confidence, 80);
        assert_eq!(profile.expertise, vec![DIVERSIFIED_LABEL]);
        assert!(profile.reasoning.contains("$50.00K"));
    }

    #[test]
    fn test_expertise_measured_against_portfolio_value() {
        let holding = |symbol: &str, value: f64, category: Option<&str>| Holding {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            value,
            percentage: value / 10.0,
            quantity: "1".to_string(),
            icon: None,
            chain: "solana".to_string(),
            chain_name: "Solana".to_string(),
            categories: category.into_iter().map(str::to_string).collect(),
        };

        // Only part of the $1,000 wallet is listed in top_holdings.
        let mut snapshot = stats(1_000.0, 5, TradingFrequency::Passive, 80.0);
        snapshot.top_holdings = vec![
            holding("USDC", 350.0, None),
            holding("JUP", 250.0, Some("DeFi")),
            holding("BONK", 150.0, Some("Meme")),
        ];

        let profile = profile_wallet(&snapshot);
        assert_eq!(profile.expertise, vec!["DeFi"]);
    }

    #[test]
    fn test_bot_before_degen() {
        // Also satisfies the Degen rule, Bot is evaluated first.
        let profile = profile_wallet(&stats(10_000.0, 150, TradingFrequency::VeryActive, 20.0));
        assert_eq!(profile.category, WalletCategory::Bot);
        assert_eq!(profile.confidence, 75);
        assert_eq!(profile.risk_profile, RiskProfile::Aggressive);
    }

    #[test]
    fn test_degen() {
        let profile = profile_wallet(&stats(10_000.0, 40, TradingFrequency::Active, 35.0));
        assert_eq!(profile.category, WalletCategory::Degen);
        assert_eq!(profile.confidence, 70);
        assert_eq!(profile.risk_profile, RiskProfile::Aggressive);
    }

    #[test]
    fn test_smart_trader() {
        let profile = profile_wallet(&stats(80_000.0, 45, TradingFrequency::Active, 65.0));
        assert_eq!(profile.category, WalletCategory::SmartTrader);
        assert_eq!(profile.confidence, 75);
        assert_eq!(profile.risk_profile, RiskProfile::Moderate);
    }

    #[test]
    fn test_casual_fallback_has_no_confidence() {
        let profile = profile_wallet(&stats(5_000.0, 25, TradingFrequency::Moderate, 50.0));
        assert_eq!(profile.category, WalletCategory::Casual);
        assert_eq!(profile.confidence, 0);
        assert!(profile.reasoning.is_empty());
        assert_eq!(profile.risk_profile, RiskProfile::Moderate);
    }

    #[test]
    fn test_risk_profile_thresholds() {
        assert_eq!(assess_risk(39.9, WalletCategory::Casual), RiskProfile::Aggressive);
        assert_eq!(assess_risk(80.0, WalletCategory::Degen), RiskProfile::Aggressive);
        assert_eq!(assess_risk(70.1, WalletCategory::Whale), RiskProfile::Conservative);
        assert_eq!(assess_risk(50.0, WalletCategory::Hodler), RiskProfile::Conservative);
        assert_eq!(assess_risk(70.0, WalletCategory::Whale), RiskProfile::Moderate);
        assert_eq!(assess_risk(40.0, WalletCategory::Casual), RiskProfile::Moderate);
    }
}
