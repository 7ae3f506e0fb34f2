//! Turns provider rows into the core snapshot types.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sonar_core::{behavior, ActivityItem, Holding, TradingFrequency, WalletStats};

use crate::types::chain_display_name;
use crate::upstream::WalletPosition;

/// Positions worth less than this are dust and never ranked.
pub const DUST_VALUE_USD: f64 = 0.01;

/// Transactions pulled per wallet (paginated).
pub const HISTORY_LIMIT: usize = 200;

/// Most transactions kept as recent activity.
pub const RECENT_ACTIVITY_LIMIT: usize = 50;

/// Recent activity only covers transactions newer than this.
pub const RECENT_ACTIVITY_DAYS: i64 = 7;

/// Holdings that get category lookups and feed expertise analysis.
pub const TOP_HOLDINGS: usize = 10;

/// Rank positions by value (descending) and compute each share of the total.
pub fn build_holdings(
    positions: Vec<WalletPosition>,
    categories: &HashMap<String, Vec<String>>,
) -> Vec<Holding> {
    let mut positions: Vec<WalletPosition> = positions
        .into_iter()
        .filter(|p| p.value.is_finite() && p.value >= DUST_VALUE_USD)
        .collect();
    positions.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.symbol.cmp(&b.symbol)));

    let total: f64 = positions.iter().map(|p| p.value).sum();

    positions
        .into_iter()
        .map(|p| {
            let percentage = if total > 0.0 { p.value * 100.0 / total } else { 0.0 };
            Holding {
                categories: categories.get(&p.symbol).cloned().unwrap_or_default(),
                chain_name: chain_display_name(&p.chain),
                symbol: p.symbol,
                name: p.name,
                value: p.value,
                percentage,
                quantity: p.quantity,
                icon: p.icon,
                chain: p.chain,
            }
        })
        .collect()
}

/// Symbols whose categories are worth looking up, largest first, deduplicated.
pub fn category_lookup_symbols(positions: &[WalletPosition]) -> Vec<String> {
    let mut ranked: Vec<&WalletPosition> = positions.iter().filter(|p| p.value >= DUST_VALUE_USD).collect();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));

    let mut symbols: Vec<String> = Vec::new();
    for position in ranked {
        if symbols.len() == TOP_HOLDINGS {
            break;
        }
        if !symbols.contains(&position.symbol) {
            symbols.push(position.symbol.clone());
        }
    }
    symbols
}

/// Assemble the profiler input. `history` is newest first.
///
/// Recent activity is the history from the last [`RECENT_ACTIVITY_DAYS`]
/// before `now`, so a wallet that has not traded this week is Passive.
pub fn build_stats(holdings: &[Holding], history: &[ActivityItem], now: DateTime<Utc>) -> WalletStats {
    let window_start = now - Duration::days(RECENT_ACTIVITY_DAYS);
    let recent_activity: Vec<ActivityItem> = history
        .iter()
        .filter(|item| item.timestamp >= window_start)
        .take(RECENT_ACTIVITY_LIMIT)
        .cloned()
        .collect();
    let trades_per_week = behavior::trades_per_week(&recent_activity);

    WalletStats {
        portfolio_value: holdings.iter().map(|h| h.value).sum(),
        total_transactions: history.len() as u64,
        trading_frequency: TradingFrequency::from_trades_per_week(trades_per_week),
        diversification_score: behavior::diversification_score(holdings),
        top_holdings: holdings.iter().take(TOP_HOLDINGS).cloned().collect(),
        recent_activity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn position(symbol: &str, value: f64) -> WalletPosition {
        WalletPosition {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            value,
            quantity: "1".to_string(),
            icon: None,
            chain: "solana".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 3, 0, 0, 0).unwrap()
    }

    fn activity(n: usize) -> Vec<ActivityItem> {
        activity_at(n, Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap())
    }

    fn activity_at(n: usize, timestamp: DateTime<Utc>) -> Vec<ActivityItem> {
        (0..n)
            .map(|i| ActivityItem {
                hash: format!("tx{}", i),
                timestamp,
                operation: "trade".to_string(),
                transfers: vec![],
            })
            .collect()
    }

    #[test]
    fn test_build_holdings_ranks_and_drops_dust() {
        let mut categories = HashMap::new();
        categories.insert("JitoSOL".to_string(), vec!["Liquid Staking".to_string()]);

        let holdings = build_holdings(
            vec![position("BONK", 250.0), position("JitoSOL", 750.0), position("DUST", 0.001)],
            &categories,
        );

        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].symbol, "JitoSOL");
        assert_eq!(holdings[0].percentage, 75.0);
        assert_eq!(holdings[0].categories, vec!["Liquid Staking".to_string()]);
        assert_eq!(holdings[0].chain_name, "Solana");
        assert_eq!(holdings[1].percentage, 25.0);
        assert!(holdings[1].categories.is_empty());
    }

    #[test]
    fn test_category_lookup_symbols() {
        let mut positions: Vec<WalletPosition> =
            (0..12).map(|i| position(&format!("T{}", i), (i + 1) as f64)).collect();
        positions.push(position("T11", 0.5));

        let symbols = category_lookup_symbols(&positions);
        assert_eq!(symbols.len(), TOP_HOLDINGS);
        assert_eq!(symbols[0], "T11");
        assert!(!symbols.contains(&"T0".to_string()));
    }

    #[test]
    fn test_build_stats() {
        let holdings = build_holdings(vec![position("SOL", 900.0), position("JUP", 100.0)], &HashMap::new());
        let history = activity(120);

        let stats = build_stats(&holdings, &history, now());

        assert_eq!(stats.portfolio_value, 1000.0);
        assert_eq!(stats.total_transactions, 120);
        assert_eq!(stats.recent_activity.len(), RECENT_ACTIVITY_LIMIT);
        assert_eq!(stats.trading_frequency, TradingFrequency::VeryActive);
        assert_eq!(stats.top_holdings.len(), 2);
        assert!(stats.validate().is_ok());
    }

    #[test]
    fn test_build_stats_for_empty_wallet() {
        let stats = build_stats(&[], &[], now());
        assert_eq!(stats.portfolio_value, 0.0);
        assert_eq!(stats.trading_frequency, TradingFrequency::Passive);
        assert!(stats.validate().is_ok());
    }

    #[test]
    fn test_quiet_wallet_is_passive_and_profiles_as_hodler() {
        let holdings = build_holdings(
            (0..10).map(|i| position(&format!("T{}", i), 100.0)).collect(),
            &HashMap::new(),
        );
        // A handful of transactions, all older than a week
        let history = activity_at(5, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());

        let stats = build_stats(&holdings, &history, now());
        assert!(stats.recent_activity.is_empty());
        assert_eq!(stats.total_transactions, 5);
        assert_eq!(stats.trading_frequency, TradingFrequency::Passive);

        let profile = sonar_core::profile_wallet(&stats);
        assert_eq!(profile.category, sonar_core::WalletCategory::Hodler);
    }

    #[test]
    fn test_recent_activity_window_drops_old_transactions() {
        let mut history = activity_at(3, Utc.with_ymd_and_hms(2026, 10, 2, 0, 0, 0).unwrap());
        history.extend(activity_at(40, Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap()));

        let stats = build_stats(&[], &history, now());
        assert_eq!(stats.recent_activity.len(), 3);
        assert_eq!(stats.total_transactions, 43);
        assert_eq!(stats.trading_frequency, TradingFrequency::Moderate);
    }
}
