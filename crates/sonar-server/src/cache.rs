use moka::future::Cache;
use std::time::Duration;

use crate::api::dto::{
    DappResponse, MarketOverviewResponse, PortfolioResponse, TokenSearchResponse,
    WalletProfileResponse,
};
use crate::config::CacheConfig;

/// Cache key types for the gateway endpoints
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum CacheKey {
    TokenSearch { query: String },
    Portfolio { address: String },
    Profile { address: String },
    Dapp { slug: String },
    MarketOverview,
}

/// Cached value wrapper
#[derive(Debug, Clone)]
pub enum CacheValue {
    TokenSearch(TokenSearchResponse),
    Portfolio(PortfolioResponse),
    Profile(WalletProfileResponse),
    Dapp(DappResponse),
    MarketOverview(MarketOverviewResponse),
}

/// Response cache in front of the rate-limited upstream APIs
#[derive(Clone)]
pub struct UpstreamCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl UpstreamCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_seconds))
            .build();

        Self { cache }
    }

    pub async fn get_token_search(&self, query: &str) -> Option<TokenSearchResponse> {
        let key = CacheKey::TokenSearch { query: query.to_lowercase() };
        match self.cache.get(&key).await {
            Some(CacheValue::TokenSearch(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_token_search(&self, query: &str, data: TokenSearchResponse) {
        let key = CacheKey::TokenSearch { query: query.to_lowercase() };
        self.cache.insert(key, CacheValue::TokenSearch(data)).await;
    }

    pub async fn get_portfolio(&self, address: &str) -> Option<PortfolioResponse> {
        let key = CacheKey::Portfolio { address: address.to_string() };
        match self.cache.get(&key).await {
            Some(CacheValue::Portfolio(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_portfolio(&self, address: &str, data: PortfolioResponse) {
        let key = CacheKey::Portfolio { address: address.to_string() };
        self.cache.insert(key, CacheValue::Portfolio(data)).await;
    }

    pub async fn get_profile(&self, address: &str) -> Option<WalletProfileResponse> {
        let key = CacheKey::Profile { address: address.to_string() };
        match self.cache.get(&key).await {
            Some(CacheValue::Profile(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_profile(&self, address: &str, data: WalletProfileResponse) {
        let key = CacheKey::Profile { address: address.to_string() };
        self.cache.insert(key, CacheValue::Profile(data)).await;
    }

    pub async fn get_dapp(&self, slug: &str) -> Option<DappResponse> {
        let key = CacheKey::Dapp { slug: slug.to_string() };
        match self.cache.get(&key).await {
            Some(CacheValue::Dapp(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_dapp(&self, slug: &str, data: DappResponse) {
        let key = CacheKey::Dapp { slug: slug.to_string() };
        self.cache.insert(key, CacheValue::Dapp(data)).await;
    }

    pub async fn get_market_overview(&self) -> Option<MarketOverviewResponse> {
        match self.cache.get(&CacheKey::MarketOverview).await {
            Some(CacheValue::MarketOverview(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_market_overview(&self, data: MarketOverviewResponse) {
        self.cache
            .insert(CacheKey::MarketOverview, CacheValue::MarketOverview(data))
            .await;
    }
}
