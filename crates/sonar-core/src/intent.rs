//! Intent classifier
//!
//! Scores a query against every [`IntentType`] by keyword overlap, adds
//! boosts for the entities the extractors found, and picks the highest score.
//!
//! Each category's keyword score is `hits / keyword list length`, so short
//! lists saturate faster than long ones. That asymmetry is kept as is; callers
//! compare winners, not raw scores across categories.

use crate::extract::{extract_entities, Entities};
use crate::models::{AlertType, DetectedIntent, IntentType};

pub const TOKEN_KEYWORDS: &[&str] = &[
    "price", "token", "coin", "chart", "buy", "sell", "holders", "liquidity", "market cap", "mcap",
    "supply", "contract", "mint",
];

pub const WALLET_KEYWORDS: &[&str] = &[
    "wallet", "address", "portfolio", "holdings", "balance", "smart money", "whale", "trader",
    "pnl", "profile",
];

pub const MARKET_KEYWORDS: &[&str] = &[
    "market", "trending", "top", "gainers", "losers", "volume", "sentiment", "overview",
    "bullish", "bearish", "fear", "greed",
];

pub const COMPARISON_KEYWORDS: &[&str] = &["compare", "vs", "versus", "better", "difference", "which"];

pub const ALERT_KEYWORDS: &[&str] = &[
    "alert", "notify", "notification", "watch", "monitor", "remind", "warn", "track",
];

pub const DAPP_KEYWORDS: &[&str] = &[
    "dapp", "protocol", "dex", "defi", "swap", "stake", "staking", "yield", "lend", "farm", "tvl",
];

pub const TOKEN_BOOST: f64 = 0.3;
pub const WALLET_BOOST: f64 = 0.3;
pub const COMPARISON_BOOST: f64 = 0.3;
pub const DAPP_BOOST: f64 = 0.4;
pub const ALERT_WORD_BOOST: f64 = 0.2;

pub fn keywords(intent: IntentType) -> &'static [&'static str] {
    match intent {
        IntentType::Token => TOKEN_KEYWORDS,
        IntentType::Wallet => WALLET_KEYWORDS,
        IntentType::Market => MARKET_KEYWORDS,
        IntentType::Comparison => COMPARISON_KEYWORDS,
        IntentType::Alert => ALERT_KEYWORDS,
        IntentType::Dapp => DAPP_KEYWORDS,
        IntentType::General => &[],
    }
}

/// Classify a chat query.
pub fn detect_intent(query: &str) -> DetectedIntent {
    let lower = query.to_lowercase();
    let entities = extract_entities(query);

    let scores = score_categories(&lower, &entities);
    let (winner, max_score) = pick_winner(&scores);

    // An explicit "X vs Y" always reads as a comparison.
    let intent_type = if entities.comparison.is_some() {
        IntentType::Comparison
    } else {
        winner
    };

    build_intent(query, &lower, intent_type, max_score.min(1.0), entities)
}

/// Raw per-category scores in declaration order.
pub fn score_categories(lower: &str, entities: &Entities) -> Vec<(IntentType, f64)> {
    IntentType::ALL
        .iter()
        .map(|&intent| {
            let list = keywords(intent);
            let mut score = if list.is_empty() {
                0.0
            } else {
                let hits = list.iter().filter(|kw| lower.contains(**kw)).count();
                hits as f64 / list.len() as f64
            };

            score += match intent {
                IntentType::Token if !entities.tokens.is_empty() => TOKEN_BOOST,
                IntentType::Wallet if !entities.wallets.is_empty() => WALLET_BOOST,
                IntentType::Comparison if entities.comparison.is_some() => COMPARISON_BOOST,
                IntentType::Dapp if !entities.dapps.is_empty() => DAPP_BOOST,
                IntentType::Alert if lower.contains("alert") => ALERT_WORD_BOOST,
                _ => 0.0,
            };

            (intent, score)
        })
        .collect()
}

/// Highest score wins, earliest category on ties, `General` when nothing
/// scored above zero.
fn pick_winner(scores: &[(IntentType, f64)]) -> (IntentType, f64) {
    let mut best = (IntentType::General, 0.0);
    for &(intent, score) in scores {
        if score > best.1 {
            best = (intent, score);
        }
    }
    best
}

fn build_intent(
    query: &str,
    lower: &str,
    intent_type: IntentType,
    confidence: f64,
    entities: Entities,
) -> DetectedIntent {
    let Entities {
        mut tokens,
        wallets,
        dapps,
        comparison,
    } = entities;

    match intent_type {
        IntentType::Comparison => {
            if let Some(pair) = &comparison {
                let mut ordered = vec![pair.from.clone(), pair.to.clone()];
                ordered.extend(tokens.into_iter().filter(|t| *t != pair.from && *t != pair.to));
                tokens = ordered;
            }
        }
        // A bare address in a token question is a mint lookup.
        IntentType::Token => {
            for address in &wallets {
                if !tokens.contains(address) {
                    tokens.push(address.clone());
                }
            }
        }
        _ => {}
    }

    let alert_type = match intent_type {
        IntentType::Alert => Some(detect_alert_type(lower)),
        _ => None,
    };

    DetectedIntent {
        intent_type,
        confidence,
        tokens,
        wallets,
        dapps,
        comparison,
        alert_type,
        raw_query: query.to_string(),
    }
}

fn detect_alert_type(lower: &str) -> AlertType {
    if lower.contains("whale") {
        AlertType::Whale
    } else if lower.contains("volume") {
        AlertType::Volume
    } else if ["risk", "rug", "scam", "exploit"].iter().any(|w| lower.contains(w)) {
        AlertType::Risk
    } else {
        AlertType::Price
    }
}
