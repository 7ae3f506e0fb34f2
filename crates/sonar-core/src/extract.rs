//! Entity extraction from free-text chat queries
//!
//! Pulls token symbols, wallet addresses, DApp names and "X vs Y" pairs out
//! of a query. Nothing here fails: no match means an empty list.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Comparison;

/// Maximal base58 runs of at least 32 characters. Runs longer than
/// [`ADDRESS_MAX_LEN`] are dropped afterwards. Underscores and other
/// non-base58 characters delimit a run. Checksums are not verified.
pub const ADDRESS_PATTERN: &str = r"[1-9A-HJ-NP-Za-km-z]{32,}";

pub const ADDRESS_MAX_LEN: usize = 44;

/// Uppercase symbol after a trigger word: "price of SOL", "buy BONK".
pub const SYMBOL_AFTER_TRIGGER_PATTERN: &str =
    r"(?i:\b(?:price|chart|buy|sell|token|coin|swap|holders|about)\s+(?:of\s+|for\s+)?)\$?([A-Z]{2,10})\b";

/// Uppercase symbol before a trigger word: "SOL price", "JUP token".
pub const SYMBOL_BEFORE_TRIGGER_PATTERN: &str =
    r"\b([A-Z]{2,10})\s+(?i:price|chart|token|coin|holders|market cap)\b";

/// Cashtags in any case: "$wif".
pub const CASHTAG_PATTERN: &str = r"\$([A-Za-z]{2,10})\b";

/// Lowercase mention before "token", "coin" or "price": "bonk token".
pub const LOWERCASE_MENTION_PATTERN: &str = r"\b([a-z]{2,10})\s+(?:token|coin|price)\b";

pub const COMPARE_PATTERN: &str =
    r"(?i)\bcompare\s+\$?([a-z]{2,10})\s+(?:and|with|to|vs\.?|versus)\s+\$?([a-z]{2,10})\b";

pub const VERSUS_PATTERN: &str = r"(?i)\$?\b([a-z]{2,10})\s+(?:vs\.?|versus)\s+\$?([a-z]{2,10})\b";

/// Whole queries up to this length made only of letters are read as a symbol.
pub const IMPLIED_SYMBOL_MAX_LEN: usize = 15;

/// Capitalized English words and crypto jargon that look like tickers.
pub const STOPWORDS: &[&str] = &[
    "THE", "AND", "API", "FOR", "YOU", "ARE", "WAS", "NOT", "BUT", "HAS", "HAVE", "WHAT", "WHATS",
    "HOW", "WHY", "WHO", "WHEN", "WHERE", "WHICH", "SHOW", "TELL", "GIVE", "GET", "ME", "MY", "IS",
    "IT", "ITS", "OF", "TO", "IN", "ON", "AT", "BY", "BE", "DO", "DOES", "CAN", "THIS", "THAT",
    "THESE", "THOSE", "WITH", "FROM", "ABOUT", "CHECK", "FIND", "BEST", "TOP", "NEW", "ANY", "ALL",
    "SOME", "CURRENT", "TODAY", "NOW", "LATEST", "GOOD", "BAD", "HIGH", "LOW", "USD", "PRICE",
    "TOKEN", "TOKENS", "COIN", "COINS", "CHART", "BUY", "SELL", "NFT", "DEX", "DEFI", "APY", "TVL",
    "ATH", "ALERT", "HELP", "HELLO", "HI", "HEY", "THANKS", "PLEASE", "MARKET", "WALLET", "OR",
    "AN", "AS", "IF", "SO", "UP", "WE", "US",
];

/// Known DApps: (lowercase pattern, display name, protocol slug).
pub const DAPPS: &[(&str, &str, &str)] = &[
    ("jupiter", "Jupiter", "jupiter"),
    ("raydium", "Raydium", "raydium"),
    ("orca", "Orca", "orca"),
    ("meteora", "Meteora", "meteora"),
    ("kamino", "Kamino", "kamino"),
    ("marinade", "Marinade", "marinade-finance"),
    ("jito", "Jito", "jito"),
    ("drift", "Drift", "drift"),
    ("marginfi", "marginfi", "marginfi"),
    ("solend", "Solend", "solend"),
    ("pump.fun", "Pump.fun", "pump"),
    ("pumpfun", "Pump.fun", "pump"),
    ("magic eden", "Magic Eden", "magic-eden"),
    ("tensor", "Tensor", "tensor"),
    ("uniswap", "Uniswap", "uniswap"),
    ("aave", "Aave", "aave"),
    ("curve", "Curve", "curve-dex"),
    ("lido", "Lido", "lido"),
    ("compound", "Compound", "compound-finance"),
    ("pancakeswap", "PancakeSwap", "pancakeswap"),
];

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| compile(ADDRESS_PATTERN));
static SYMBOL_AFTER_RE: Lazy<Regex> = Lazy::new(|| compile(SYMBOL_AFTER_TRIGGER_PATTERN));
static SYMBOL_BEFORE_RE: Lazy<Regex> = Lazy::new(|| compile(SYMBOL_BEFORE_TRIGGER_PATTERN));
static CASHTAG_RE: Lazy<Regex> = Lazy::new(|| compile(CASHTAG_PATTERN));
static LOWERCASE_RE: Lazy<Regex> = Lazy::new(|| compile(LOWERCASE_MENTION_PATTERN));
static COMPARE_RE: Lazy<Regex> = Lazy::new(|| compile(COMPARE_PATTERN));
static VERSUS_RE: Lazy<Regex> = Lazy::new(|| compile(VERSUS_PATTERN));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("entity pattern must compile")
}

/// Everything the extractors found in one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entities {
    pub tokens: Vec<String>,
    pub wallets: Vec<String>,
    pub dapps: Vec<String>,
    pub comparison: Option<Comparison>,
}

pub fn extract_entities(text: &str) -> Entities {
    Entities {
        tokens: extract_tokens(text),
        wallets: extract_wallets(text),
        dapps: extract_dapps(text),
        comparison: extract_comparison(text),
    }
}

pub fn extract_wallets(text: &str) -> Vec<String> {
    let found = ADDRESS_RE
        .find_iter(text)
        .filter(|m| m.as_str().len() <= ADDRESS_MAX_LEN)
        .map(|m| (m.start(), m.as_str().to_string()))
        .collect();
    in_order_unique(found)
}

pub fn extract_tokens(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for re in [&*SYMBOL_AFTER_RE, &*SYMBOL_BEFORE_RE, &*CASHTAG_RE, &*LOWERCASE_RE] {
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                let symbol = m.as_str().to_uppercase();
                if !is_stopword(&symbol) {
                    found.push((m.start(), symbol));
                }
            }
        }
    }

    let tokens = in_order_unique(found);
    if !tokens.is_empty() {
        return tokens;
    }

    implied_symbol(text).into_iter().collect()
}

/// A bare short query such as "bonk" or "$JUP" names a token on its own.
fn implied_symbol(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let candidate = trimmed.strip_prefix('$').unwrap_or(trimmed);

    if trimmed.chars().count() > IMPLIED_SYMBOL_MAX_LEN
        || candidate.chars().count() < 2
        || !candidate.chars().all(|c| c.is_ascii_alphabetic())
    {
        return None;
    }

    let symbol = candidate.to_uppercase();
    if is_stopword(&symbol) {
        None
    } else {
        Some(symbol)
    }
}

pub fn extract_dapps(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let found = DAPPS
        .iter()
        .filter_map(|(pattern, name, _)| lower.find(pattern).map(|pos| (pos, name.to_string())))
        .collect();
    in_order_unique(found)
}

/// Protocol slug for a DApp display name returned by [`extract_dapps`].
pub fn dapp_slug(name: &str) -> Option<&'static str> {
    DAPPS
        .iter()
        .find(|(_, display, _)| display.eq_ignore_ascii_case(name))
        .map(|(_, _, slug)| *slug)
}

/// "compare X and Y" takes precedence over "X vs Y".
pub fn extract_comparison(text: &str) -> Option<Comparison> {
    COMPARE_RE
        .captures(text)
        .or_else(|| VERSUS_RE.captures(text))
        .and_then(|caps| {
            let from = caps.get(1)?.as_str().to_uppercase();
            let to = caps.get(2)?.as_str().to_uppercase();
            Some(Comparison { from, to })
        })
}

pub fn is_stopword(symbol: &str) -> bool {
    STOPWORDS.contains(&symbol)
}

fn in_order_unique(mut found: Vec<(usize, String)>) -> Vec<String> {
    found.sort_by_key(|(pos, _)| *pos);
    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter_map(|(_, value)| seen.insert(value.clone()).then_some(value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    #[test]
    fn test_extract_wallet_address() {
        let query = format!("analyze wallet {} please", ADDR);
        assert_eq!(extract_wallets(&query), vec![ADDR.to_string()]);
    }

    #[test]
    fn test_extract_wallet_dedup_and_order() {
        let other = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
        let query = format!("{} vs {} and again {}", other, ADDR, other);
        assert_eq!(extract_wallets(&query), vec![other.to_string(), ADDR.to_string()]);
    }

    #[test]
    fn test_extract_wallet_rejects_non_base58() {
        // 0, O, I and l are outside the base58 alphabet
        assert!(extract_wallets("0x52908400098527886E0F7030069857D2E4169EE7").is_empty());
        assert!(extract_wallets("short abc123").is_empty());
    }

    #[test]
    fn test_extract_wallet_next_to_underscore_and_punctuation() {
        assert_eq!(extract_wallets(&format!("wallet_{}", ADDR)), vec![ADDR.to_string()]);
        assert_eq!(extract_wallets(&format!("{}_main", ADDR)), vec![ADDR.to_string()]);
        assert_eq!(extract_wallets(&format!("({}).", ADDR)), vec![ADDR.to_string()]);
    }

    #[test]
    fn test_extract_wallet_rejects_overlong_runs() {
        let overlong = format!("{}{}", ADDR, "abc");
        assert!(extract_wallets(&overlong).is_empty());
        // Adjacent addresses split by one character are both found
        let other = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
        assert_eq!(
            extract_wallets(&format!("{},{}", ADDR, other)),
            vec![ADDR.to_string(), other.to_string()]
        );
    }

    #[test]
    fn test_extract_tokens_trigger_words() {
        assert_eq!(extract_tokens("What's the price of SOL?"), vec!["SOL"]);
        assert_eq!(extract_tokens("JUP price today"), vec!["JUP"]);
        assert_eq!(extract_tokens("should I buy BONK or sell WIF"), vec!["BONK", "WIF"]);
    }

    #[test]
    fn test_extract_tokens_cashtag_and_lowercase() {
        assert_eq!(extract_tokens("thoughts on $wif"), vec!["WIF"]);
        assert_eq!(extract_tokens("is the bonk token pumping"), vec!["BONK"]);
    }

    #[test]
    fn test_extract_tokens_filters_stopwords() {
        assert!(extract_tokens("show THE price of THE market").is_empty());
        assert!(extract_tokens("what is the price").is_empty());
    }

    #[test]
    fn test_implied_symbol_fallback() {
        assert_eq!(extract_tokens("bonk"), vec!["BONK"]);
        assert_eq!(extract_tokens("  $jup "), vec!["JUP"]);
        assert!(extract_tokens("hello").is_empty());
        assert!(extract_tokens("sol 2").is_empty());
        assert!(extract_tokens("averyveryverylongword").is_empty());
    }

    #[test]
    fn test_extract_dapps() {
        assert_eq!(
            extract_dapps("swap on Raydium or jupiter, maybe pump.fun"),
            vec!["Raydium", "Jupiter", "Pump.fun"]
        );
        assert_eq!(extract_dapps("pumpfun and pump.fun"), vec!["Pump.fun"]);
        assert_eq!(dapp_slug("Marinade"), Some("marinade-finance"));
        assert_eq!(dapp_slug("nope"), None);
    }

    #[test]
    fn test_extract_comparison() {
        assert_eq!(
            extract_comparison("SOL vs ETH"),
            Some(Comparison { from: "SOL".into(), to: "ETH".into() })
        );
        assert_eq!(
            extract_comparison("compare bonk and wif for me"),
            Some(Comparison { from: "BONK".into(), to: "WIF".into() })
        );
        assert_eq!(
            extract_comparison("btc versus $eth"),
            Some(Comparison { from: "BTC".into(), to: "ETH".into() })
        );
        assert_eq!(extract_comparison("what's the price of SOL"), None);
    }
}
