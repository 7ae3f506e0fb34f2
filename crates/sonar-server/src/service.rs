//! Gateway: the operations behind every API route and the chat pipeline.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use sonar_core::{
    analyze_trading_behavior, detect_intent, extract::dapp_slug, plan_fetches, profile_wallet,
    prompt::{system_prompt, DataSection},
    format::truncate_address,
    Endpoint, FetchDescriptor,
};
use uuid::Uuid;

use crate::aggregate::{self, HISTORY_LIMIT};
use crate::api::dto::*;
use crate::cache::UpstreamCache;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::types::{usd, validate_solana_address};
use crate::upstream::{
    self, prices, ChatMessage, LlmClient, MetadataClient, PortfolioClient, PriceClient,
    ProtocolClient, WalletPosition,
};

/// Prior chat turns forwarded to the model.
const MAX_HISTORY_TURNS: usize = 10;

/// Token candidates returned per search.
const MAX_TOKEN_RESULTS: usize = 5;

const MAX_TRENDING: usize = 10;

#[derive(Clone)]
pub struct Gateway {
    portfolio: PortfolioClient,
    metadata: MetadataClient,
    prices: PriceClient,
    protocols: ProtocolClient,
    llm: LlmClient,
    cache: UpstreamCache,
}

impl Gateway {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let client = upstream::http_client(&config.upstream)?;

        Ok(Self {
            portfolio: PortfolioClient::new(&config.portfolio, client.clone()),
            metadata: MetadataClient::new(&config.metadata, client.clone()),
            prices: PriceClient::new(&config.prices, client.clone()),
            protocols: ProtocolClient::new(&config.protocols, client.clone()),
            llm: LlmClient::new(&config.llm, client),
            cache: UpstreamCache::new(&config.cache),
        })
    }

    pub fn llm_configured(&self) -> bool {
        self.llm.is_configured()
    }

    pub fn portfolio_configured(&self) -> bool {
        self.portfolio.is_configured()
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    /// Metadata candidates plus market data for the best matching coin.
    /// Succeeds when at least one of the two providers answers.
    pub async fn token_search(&self, query: &str) -> AppResult<TokenSearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidParam("query must not be empty".to_string()));
        }

        if let Some(cached) = self.cache.get_token_search(query).await {
            tracing::debug!(query = %query, "Token search cache hit");
            return Ok(cached);
        }

        let (metadata, market) = tokio::join!(self.metadata.search(query), self.token_market(query));

        let (tokens, market) = match (metadata, market) {
            (Err(e), Err(market_err)) => {
                tracing::warn!(query = %query, error = %market_err, "Price lookup failed");
                return Err(e);
            }
            (Ok(tokens), Ok(market)) => (tokens, market),
            (Ok(tokens), Err(e)) => {
                tracing::warn!(query = %query, error = %e, "Price lookup failed, returning metadata only");
                (tokens, None)
            }
            (Err(e), Ok(market)) => {
                tracing::warn!(query = %query, error = %e, "Metadata search failed, returning prices only");
                (Vec::new(), market)
            }
        };

        let response = TokenSearchResponse {
            query: query.to_string(),
            tokens: tokens.into_iter().take(MAX_TOKEN_RESULTS).collect(),
            market,
        };
        self.cache.set_token_search(query, response.clone()).await;

        Ok(response)
    }

    async fn token_market(&self, query: &str) -> AppResult<Option<TokenMarket>> {
        let coins = self.prices.search(query).await?;
        let Some(coin) = prices::best_match(&coins, query) else {
            return Ok(None);
        };

        let quotes = self.prices.simple_prices(std::slice::from_ref(&coin.id)).await?;
        let quote = quotes.get(&coin.id).cloned().unwrap_or_default();

        Ok(Some(TokenMarket {
            coin_id: coin.id.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol.to_uppercase(),
            market_cap_rank: coin.market_cap_rank,
            price_usd: quote.usd.map(usd),
            market_cap_usd: quote.usd_market_cap.map(usd),
            volume_24h_usd: quote.usd_24h_vol.map(usd),
            change_24h_pct: quote.usd_24h_change,
        }))
    }

    // ------------------------------------------------------------------
    // Wallets
    // ------------------------------------------------------------------

    pub async fn wallet_portfolio(&self, address: &str) -> AppResult<PortfolioResponse> {
        ensure_valid_wallet(address)?;

        if let Some(cached) = self.cache.get_portfolio(address).await {
            tracing::debug!(wallet = %address, "Portfolio cache hit");
            return Ok(cached);
        }

        let positions = self.portfolio.positions(address).await?;
        let categories = self.holding_categories(&positions).await;
        let holdings = aggregate::build_holdings(positions, &categories);

        let total: f64 = holdings.iter().map(|h| h.value).sum();
        let response = PortfolioResponse {
            address: address.to_string(),
            total_value_usd: usd(total),
            holding_count: holdings.len(),
            diversification_score: sonar_core::diversification_score(&holdings),
            holdings,
        };
        self.cache.set_portfolio(address, response.clone()).await;

        Ok(response)
    }

    /// Category lookups for the largest holdings, in parallel. A failed
    /// lookup leaves that symbol uncategorized.
    async fn holding_categories(&self, positions: &[WalletPosition]) -> HashMap<String, Vec<String>> {
        let symbols = aggregate::category_lookup_symbols(positions);
        let lookups = symbols.iter().map(|symbol| self.metadata.categories_for(symbol));
        let results = join_all(lookups).await;

        symbols
            .into_iter()
            .zip(results)
            .filter_map(|(symbol, result)| match result {
                Ok(categories) if !categories.is_empty() => Some((symbol, categories)),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!(symbol = %symbol, error = %e, "Category lookup failed");
                    None
                }
            })
            .collect()
    }

    pub async fn wallet_profile(&self, address: &str) -> AppResult<WalletProfileResponse> {
        ensure_valid_wallet(address)?;

        if let Some(cached) = self.cache.get_profile(address).await {
            tracing::debug!(wallet = %address, "Profile cache hit");
            return Ok(cached);
        }

        let (portfolio, history) = tokio::join!(
            self.wallet_portfolio(address),
            self.portfolio.transactions(address, HISTORY_LIMIT)
        );
        let portfolio = portfolio?;
        let history = history?;

        let stats = aggregate::build_stats(&portfolio.holdings, &history, Utc::now());
        stats.validate()?;

        let profile = profile_wallet(&stats);
        let behavior = analyze_trading_behavior(&portfolio.holdings, &stats.recent_activity);

        tracing::info!(
            wallet = %address,
            category = %profile.category,
            confidence = %profile.confidence,
            frequency = %stats.trading_frequency,
            "Wallet profiled"
        );

        let response = WalletProfileResponse {
            address: address.to_string(),
            stats: StatsSummary {
                portfolio_value_usd: usd(stats.portfolio_value),
                total_transactions: stats.total_transactions,
                trading_frequency: stats.trading_frequency,
                trades_per_week: behavior.trades_per_week,
                diversification_score: stats.diversification_score,
            },
            profile,
            behavior,
        };
        self.cache.set_profile(address, response.clone()).await;

        Ok(response)
    }

    // ------------------------------------------------------------------
    // DApps and market
    // ------------------------------------------------------------------

    pub async fn dapp_info(&self, name: &str) -> AppResult<DappResponse> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidParam("name must not be empty".to_string()));
        }
        let slug = resolve_dapp_slug(name);

        if let Some(cached) = self.cache.get_dapp(&slug).await {
            return Ok(cached);
        }

        let info = self.protocols.protocol(&slug).await?;
        let response = DappResponse {
            tvl_usd: usd(info.total_tvl()),
            name: info.name,
            slug: slug.clone(),
            category: info.category,
            description: info.description,
            chains: info.chains,
            url: info.url,
            logo: info.logo,
        };
        self.cache.set_dapp(&slug, response.clone()).await;

        Ok(response)
    }

    pub async fn market_overview(&self) -> AppResult<MarketOverviewResponse> {
        if let Some(cached) = self.cache.get_market_overview().await {
            return Ok(cached);
        }

        let (global, trending) = tokio::join!(self.prices.global(), self.prices.trending());
        let global = global?;
        // trending is garnish; the overview stands without it
        let trending = trending.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Trending lookup failed");
            Vec::new()
        });

        let pick = |map: &HashMap<String, f64>, key: &str| map.get(key).copied().unwrap_or(0.0);
        let response = MarketOverviewResponse {
            total_market_cap_usd: usd(pick(&global.total_market_cap, "usd")),
            total_volume_usd: usd(pick(&global.total_volume, "usd")),
            market_cap_change_24h_pct: global.market_cap_change_percentage_24h_usd,
            btc_dominance_pct: pick(&global.market_cap_percentage, "btc"),
            eth_dominance_pct: pick(&global.market_cap_percentage, "eth"),
            active_cryptocurrencies: global.active_cryptocurrencies,
            trending: trending
                .into_iter()
                .take(MAX_TRENDING)
                .map(|c| TrendingToken {
                    id: c.id,
                    symbol: c.symbol.to_uppercase(),
                    name: c.name,
                    market_cap_rank: c.market_cap_rank,
                    thumb: c.thumb,
                })
                .collect(),
        };
        self.cache.set_market_overview(response.clone()).await;

        Ok(response)
    }

    // ------------------------------------------------------------------
    // Planned fetches and chat
    // ------------------------------------------------------------------

    /// Run one planned fetch and return its payload as JSON.
    pub async fn execute(&self, descriptor: &FetchDescriptor) -> AppResult<Value> {
        let param = |key: &str| {
            descriptor
                .param(key)
                .ok_or_else(|| AppError::InvalidParam(format!("missing '{}' for {}", key, descriptor.endpoint.path())))
        };

        let value = match descriptor.endpoint {
            Endpoint::TokenSearch => serde_json::to_value(self.token_search(param("query")?).await?),
            Endpoint::WalletPortfolio => serde_json::to_value(self.wallet_portfolio(param("address")?).await?),
            Endpoint::DappInfo => serde_json::to_value(self.dapp_info(param("name")?).await?),
        };

        value.map_err(|e| AppError::Internal(format!("Failed to encode fetch result: {}", e)))
    }

    /// All descriptors concurrently; a failed fetch yields `data: null`.
    pub async fn execute_plan(&self, plan: &[FetchDescriptor]) -> Vec<FetchResult> {
        let results = join_all(plan.iter().map(|d| self.execute(d))).await;

        plan.iter()
            .cloned()
            .zip(results)
            .map(|(descriptor, result)| {
                let data = match result {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::warn!(
                            endpoint = %descriptor.endpoint.path(),
                            error = %e,
                            "Planned fetch failed"
                        );
                        None
                    }
                };
                FetchResult { descriptor, data }
            })
            .collect()
    }

    pub async fn chat(&self, request: ChatRequest) -> AppResult<ChatResponse> {
        let start = Instant::now();
        let message = request.message.trim();
        if message.is_empty() {
            return Err(AppError::InvalidParam("message must not be empty".to_string()));
        }
        if !self.llm.is_configured() {
            return Err(AppError::Config(
                "LLM API key is not set (SONAR__LLM__API_KEY)".to_string(),
            ));
        }

        let intent = detect_intent(message);
        let plan = plan_fetches(&intent);
        tracing::info!(
            intent = %intent.intent_type,
            confidence = %intent.confidence,
            fetches = %plan.len(),
            "Chat message classified"
        );

        let data = self.execute_plan(&plan).await;
        let sections: Vec<DataSection> = data
            .iter()
            .map(|result| DataSection {
                title: section_title(&result.descriptor),
                body: result.data.as_ref().map(Value::to_string),
            })
            .collect();

        let messages = build_messages(system_prompt(&intent, &sections), &request.history, message);
        let reply = self.llm.complete(&messages).await?;

        tracing::info!(
            intent = %intent.intent_type,
            model = %self.llm.model(),
            duration_ms = %start.elapsed().as_millis(),
            "Chat reply generated"
        );

        Ok(ChatResponse {
            id: Uuid::new_v4(),
            reply,
            intent,
            data,
        })
    }
}

fn ensure_valid_wallet(address: &str) -> AppResult<()> {
    if validate_solana_address(address) {
        Ok(())
    } else {
        Err(AppError::InvalidWallet(address.to_string()))
    }
}

/// Known display names map to their provider slug; anything else is slugified.
fn resolve_dapp_slug(name: &str) -> String {
    match dapp_slug(name) {
        Some(slug) => slug.to_string(),
        None => name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-"),
    }
}

fn section_title(descriptor: &FetchDescriptor) -> String {
    match descriptor.endpoint {
        Endpoint::TokenSearch => format!("Token data: {}", descriptor.param("query").unwrap_or("?")),
        Endpoint::WalletPortfolio => format!(
            "Wallet portfolio: {}",
            truncate_address(descriptor.param("address").unwrap_or("?"))
        ),
        Endpoint::DappInfo => format!("DApp: {}", descriptor.param("name").unwrap_or("?")),
    }
}

/// System prompt, then the most recent user/assistant turns, then the new message.
fn build_messages(system: String, history: &[ChatTurn], message: &str) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system)];

    let turns: Vec<&ChatTurn> = history
        .iter()
        .filter(|t| matches!(t.role.as_str(), "user" | "assistant") && !t.content.trim().is_empty())
        .collect();
    let skip = turns.len().saturating_sub(MAX_HISTORY_TURNS);
    messages.extend(turns.into_iter().skip(skip).map(|t| match t.role.as_str() {
        "assistant" => ChatMessage::assistant(t.content.as_str()),
        _ => ChatMessage::user(t.content.as_str()),
    }));

    messages.push(ChatMessage::user(message));
    messages
}
