//! Data-fetch planner
//!
//! Turns a [`DetectedIntent`] into the list of API calls the caller should
//! make next. No I/O happens here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{DetectedIntent, IntentType};

/// Gateway endpoints a plan can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    #[serde(rename = "/api/v1/token/search")]
    TokenSearch,
    #[serde(rename = "/api/v1/wallet/{address}/portfolio")]
    WalletPortfolio,
    #[serde(rename = "/api/v1/dapp")]
    DappInfo,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::TokenSearch => "/api/v1/token/search",
            Endpoint::WalletPortfolio => "/api/v1/wallet/{address}/portfolio",
            Endpoint::DappInfo => "/api/v1/dapp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchDescriptor {
    pub endpoint: Endpoint,
    pub params: BTreeMap<String, String>,
}

impl FetchDescriptor {
    fn new(endpoint: Endpoint, key: &str, value: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert(key.to_string(), value.to_string());
        Self { endpoint, params }
    }

    pub fn token_search(query: &str) -> Self {
        Self::new(Endpoint::TokenSearch, "query", query)
    }

    pub fn wallet_portfolio(address: &str) -> Self {
        Self::new(Endpoint::WalletPortfolio, "address", address)
    }

    pub fn dapp_info(name: &str) -> Self {
        Self::new(Endpoint::DappInfo, "name", name)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// One descriptor per extracted entity. Comparisons fetch both sides; market,
/// alert and general intents need no enrichment.
pub fn plan_fetches(intent: &DetectedIntent) -> Vec<FetchDescriptor> {
    match intent.intent_type {
        IntentType::Token => intent
            .tokens
            .iter()
            .map(|t| FetchDescriptor::token_search(t))
            .collect(),
        IntentType::Wallet => intent
            .wallets
            .iter()
            .map(|w| FetchDescriptor::wallet_portfolio(w))
            .collect(),
        IntentType::Comparison => match &intent.comparison {
            Some(pair) => vec![
                FetchDescriptor::token_search(&pair.from),
                FetchDescriptor::token_search(&pair.to),
            ],
            None => Vec::new(),
        },
        IntentType::Dapp => intent
            .dapps
            .iter()
            .map(|d| FetchDescriptor::dapp_info(d))
            .collect(),
        IntentType::Market | IntentType::Alert | IntentType::General => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::detect_intent;

    #[test]
    fn test_token_plan() {
        let plan = plan_fetches(&detect_intent("What's the price of SOL?"));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].endpoint, Endpoint::TokenSearch);
        assert_eq!(plan[0].param("query"), Some("SOL"));
    }

    #[test]
    fn test_one_descriptor_per_wallet() {
        let query = "wallet 7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU and 9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
        let plan = plan_fetches(&detect_intent(query));
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|d| d.endpoint == Endpoint::WalletPortfolio));
        assert_eq!(
            plan[1].param("address"),
            Some("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM")
        );
    }

    #[test]
    fn test_comparison_plan_has_two_sides() {
        let plan = plan_fetches(&detect_intent("SOL vs ETH"));
        assert_eq!(
            plan,
            vec![FetchDescriptor::token_search("SOL"), FetchDescriptor::token_search("ETH")]
        );

        let plan = plan_fetches(&detect_intent("compare JUP and RAY, also BONK price"));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].param("query"), Some("JUP"));
        assert_eq!(plan[1].param("query"), Some("RAY"));
    }

    #[test]
    fn test_dapp_plan() {
        let plan = plan_fetches(&detect_intent("is kamino or drift safer for yield"));
        assert_eq!(
            plan,
            vec![FetchDescriptor::dapp_info("Kamino"), FetchDescriptor::dapp_info("Drift")]
        );
    }

    #[test]
    fn test_display_only_intents_plan_nothing() {
        for query in ["market overview today", "alert me on SOL", "hello there"] {
            let intent = detect_intent(query);
            assert!(
                matches!(
                    intent.intent_type,
                    IntentType::Market | IntentType::Alert | IntentType::General
                ),
                "{query} classified as {}",
                intent.intent_type
            );
            assert!(plan_fetches(&intent).is_empty());
        }
    }

    #[test]
    fn test_endpoint_serializes_as_path() {
        let json = serde_json::to_value(FetchDescriptor::token_search("SOL")).unwrap();
        assert_eq!(json["endpoint"], "/api/v1/token/search");
        assert_eq!(json["params"]["query"], "SOL");
    }
}
