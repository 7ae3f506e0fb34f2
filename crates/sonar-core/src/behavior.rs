//! Expertise and trading behavior analysis
//!
//! Reductions over a wallet's holdings and recent activity. The results feed
//! the profiler and are returned alongside it.

use std::collections::{HashMap, HashSet};

use crate::models::{
    ActivityItem, BehaviorRiskMetrics, CategoryPreference, Holding, TradingBehavior,
    TradingFrequency,
};

/// Share of portfolio value (inclusive) that makes a category an expertise.
pub const EXPERTISE_VALUE_SHARE: f64 = 20.0;

/// Number of holdings in one category that makes it an expertise.
pub const EXPERTISE_MIN_HOLDINGS: usize = 3;

pub const DIVERSIFIED_LABEL: &str = "Diversified Portfolio";

/// Recent activity is treated as covering exactly this many days.
pub const ACTIVITY_WINDOW_DAYS: f64 = 7.0;

const TOP_N: usize = 3;

/// Value held in one holding category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWeight {
    pub category: String,
    pub value: f64,
    /// Share of total portfolio value, 0-100
    pub percentage: f64,
    pub holding_count: usize,
}

fn total_value(holdings: &[Holding]) -> f64 {
    holdings.iter().map(|h| h.value).sum()
}

/// Group holdings by category tag, highest value first (ties by name).
///
/// Percentages are taken against `portfolio_value`, which may exceed the sum
/// of `holdings` when only the largest holdings are passed in. A holding
/// tagged with several categories counts toward each of them.
pub fn category_weights(holdings: &[Holding], portfolio_value: f64) -> Vec<CategoryWeight> {
    let total = portfolio_value.max(total_value(holdings));
    let mut by_category: HashMap<&str, (f64, usize)> = HashMap::new();

    for holding in holdings {
        for category in &holding.categories {
            let entry = by_category.entry(category.as_str()).or_default();
            entry.0 += holding.value;
            entry.1 += 1;
        }
    }

    let mut weights: Vec<CategoryWeight> = by_category
        .into_iter()
        .map(|(category, (value, holding_count))| CategoryWeight {
            category: category.to_string(),
            value,
            percentage: if total > 0.0 { value * 100.0 / total } else { 0.0 },
            holding_count,
        })
        .collect();

    weights.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.category.cmp(&b.category))
    });
    weights
}

/// Dominant holding categories.
///
/// A category qualifies with at least [`EXPERTISE_VALUE_SHARE`] percent of
/// value or [`EXPERTISE_MIN_HOLDINGS`] holdings. Without a qualifier the top
/// three categories by value are used, and without any categorized holding
/// the wallet is reported as [`DIVERSIFIED_LABEL`].
///
/// Value shares are measured against the whole `portfolio_value`, not just
/// the holdings passed in.
pub fn analyze_expertise(holdings: &[Holding], portfolio_value: f64) -> Vec<String> {
    let weights = category_weights(holdings, portfolio_value);

    let qualified: Vec<String> = weights
        .iter()
        .filter(|w| w.percentage >= EXPERTISE_VALUE_SHARE || w.holding_count >= EXPERTISE_MIN_HOLDINGS)
        .map(|w| w.category.clone())
        .collect();

    if !qualified.is_empty() {
        return qualified;
    }

    if !weights.is_empty() {
        return weights.into_iter().take(TOP_N).map(|w| w.category).collect();
    }

    vec![DIVERSIFIED_LABEL.to_string()]
}

/// Percent of portfolio value held in the three largest holdings.
pub fn top_holdings_concentration(holdings: &[Holding]) -> f64 {
    let total = total_value(holdings);
    if total <= 0.0 {
        return 0.0;
    }

    let mut values: Vec<f64> = holdings.iter().map(|h| h.value).collect();
    values.sort_by(|a, b| b.total_cmp(a));
    let top: f64 = values.iter().take(TOP_N).sum();

    top * 100.0 / total
}

/// `100 - top-3 concentration`, never below zero.
pub fn diversification_score(holdings: &[Holding]) -> f64 {
    (100.0 - top_holdings_concentration(holdings)).max(0.0)
}

pub fn trades_per_week(activity: &[ActivityItem]) -> f64 {
    activity.len() as f64 * 7.0 / ACTIVITY_WINDOW_DAYS
}

/// Mean USD value over every priced transfer in the activity list.
pub fn average_trade_size(activity: &[ActivityItem]) -> f64 {
    let values: Vec<f64> = activity
        .iter()
        .flat_map(|item| item.transfers.iter())
        .filter_map(|t| t.value)
        .filter(|v| v.is_finite())
        .collect();

    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn analyze_trading_behavior(holdings: &[Holding], activity: &[ActivityItem]) -> TradingBehavior {
    let weekly = trades_per_week(activity);
    let weights = category_weights(holdings, total_value(holdings));

    let preferred_categories = weights
        .iter()
        .take(TOP_N)
        .map(|w| CategoryPreference {
            category: w.category.clone(),
            percentage: w.percentage,
            trade_count: count_category_trades(&w.category, holdings, activity),
        })
        .collect();

    let avg_position_size = if holdings.is_empty() {
        0.0
    } else {
        total_value(holdings) / holdings.len() as f64
    };

    TradingBehavior {
        avg_trade_size: average_trade_size(activity),
        trading_frequency: TradingFrequency::from_trades_per_week(weekly),
        trades_per_week: weekly,
        preferred_categories,
        risk_metrics: BehaviorRiskMetrics {
            portfolio_concentration: top_holdings_concentration(holdings),
            category_diversification: weights.len(),
            avg_position_size,
        },
    }
}

/// Activity items touching at least one symbol held under `category`.
fn count_category_trades(category: &str, holdings: &[Holding], activity: &[ActivityItem]) -> usize {
    let symbols: HashSet<String> = holdings
        .iter()
        .filter(|h| h.categories.iter().any(|c| c == category))
        .map(|h| h.symbol.to_uppercase())
        .collect();

    activity
        .iter()
        .filter(|item| {
            item.transfers
                .iter()
                .any(|t| symbols.contains(&t.symbol.to_uppercase()))
        })
        .count()
}
