use axum::{
    extract::{Path, Query, State},
    Json,
};
use sonar_core::{detect_intent, plan_fetches};
use std::time::Instant;

use super::dto::*;
use crate::error::{AppError, AppResult};
use crate::types::validate_solana_address;
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    println!("[REQUEST] GET /health");
    tracing::debug!("Processing health check request");

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_configured: state.gateway.llm_configured(),
        llm_model: state.config.llm.model.clone(),
        portfolio_configured: state.gateway.portfolio_configured(),
    })
}

pub async fn classify_intent(Json(request): Json<IntentRequest>) -> AppResult<Json<IntentResponse>> {
    let start = Instant::now();
    println!("[REQUEST] POST /api/v1/intent");
    tracing::info!(query_len = %request.query.len(), "Processing intent request");

    let query = request.query.trim();
    if query.is_empty() {
        println!("[RESPONSE] POST /api/v1/intent -> 400 Bad Request (empty query)");
        return Err(AppError::InvalidParam("query must not be empty".to_string()));
    }

    let intent = detect_intent(query);
    let plan = plan_fetches(&intent);

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] POST /api/v1/intent -> 200 OK ({}ms) intent={} fetches={}",
        duration,
        intent.intent_type,
        plan.len()
    );
    tracing::info!(
        intent = %intent.intent_type,
        confidence = %intent.confidence,
        fetches = %plan.len(),
        duration_ms = %duration,
        "Intent classified"
    );

    Ok(Json(IntentResponse { intent, plan }))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let start = Instant::now();
    println!("[REQUEST] POST /api/v1/chat (history={})", request.history.len());
    tracing::info!(
        message_len = %request.message.len(),
        history = %request.history.len(),
        "Processing chat request"
    );

    let response = state.gateway.chat(request).await?;

    let duration = start.elapsed().as_millis();
    let fetched = response.data.iter().filter(|r| r.data.is_some()).count();
    println!(
        "[RESPONSE] POST /api/v1/chat -> 200 OK ({}ms) intent={} data={}/{}",
        duration,
        response.intent.intent_type,
        fetched,
        response.data.len()
    );
    tracing::info!(
        id = %response.id,
        intent = %response.intent.intent_type,
        fetched = %fetched,
        planned = %response.data.len(),
        duration_ms = %duration,
        "Chat request completed"
    );

    Ok(Json(response))
}

pub async fn search_token(
    State(state): State<AppState>,
    Query(query): Query<TokenSearchQuery>,
) -> AppResult<Json<TokenSearchResponse>> {
    let start = Instant::now();
    println!("[REQUEST] GET /api/v1/token/search?query={}", query.query);
    tracing::info!(query = %query.query, "Processing token search request");

    let response = state.gateway.token_search(&query.query).await?;

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] GET /api/v1/token/search -> 200 OK ({}ms) tokens={} market={}",
        duration,
        response.tokens.len(),
        response.market.is_some()
    );
    tracing::info!(
        query = %response.query,
        tokens = %response.tokens.len(),
        duration_ms = %duration,
        "Token search completed"
    );

    Ok(Json(response))
}

pub async fn get_wallet_portfolio(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> AppResult<Json<PortfolioResponse>> {
    let start = Instant::now();
    println!("[REQUEST] GET /api/v1/wallet/{}/portfolio", wallet);
    tracing::info!(wallet = %wallet, "Processing wallet portfolio request");

    if !validate_solana_address(&wallet) {
        println!("[RESPONSE] GET /api/v1/wallet/{}/portfolio -> 400 Bad Request (invalid wallet)", wallet);
        tracing::warn!(wallet = %wallet, "Invalid wallet address provided");
        return Err(AppError::InvalidWallet(wallet));
    }

    let portfolio = state.gateway.wallet_portfolio(&wallet).await?;

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] GET /api/v1/wallet/{}/portfolio -> 200 OK ({}ms) value=${} holdings={}",
        wallet, duration, portfolio.total_value_usd, portfolio.holding_count
    );
    tracing::info!(
        wallet = %wallet,
        duration_ms = %duration,
        total_value_usd = %portfolio.total_value_usd,
        holdings = %portfolio.holding_count,
        "Wallet portfolio retrieved"
    );

    Ok(Json(portfolio))
}

pub async fn get_wallet_profile(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> AppResult<Json<WalletProfileResponse>> {
    let start = Instant::now();
    println!("[REQUEST] GET /api/v1/wallet/{}/profile", wallet);
    tracing::info!(wallet = %wallet, "Processing wallet profile request");

    if !validate_solana_address(&wallet) {
        println!("[RESPONSE] GET /api/v1/wallet/{}/profile -> 400 Bad Request (invalid wallet)", wallet);
        tracing::warn!(wallet = %wallet, "Invalid wallet address provided");
        return Err(AppError::InvalidWallet(wallet));
    }

    let profile = state.gateway.wallet_profile(&wallet).await?;

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] GET /api/v1/wallet/{}/profile -> 200 OK ({}ms) category={} confidence={}",
        wallet, duration, profile.profile.category, profile.profile.confidence
    );
    tracing::info!(
        wallet = %wallet,
        duration_ms = %duration,
        category = %profile.profile.category,
        risk = %profile.profile.risk_profile,
        "Wallet profile computed"
    );

    Ok(Json(profile))
}

pub async fn get_dapp(
    State(state): State<AppState>,
    Query(query): Query<DappQuery>,
) -> AppResult<Json<DappResponse>> {
    let start = Instant::now();
    println!("[REQUEST] GET /api/v1/dapp?name={}", query.name);
    tracing::info!(name = %query.name, "Processing dapp request");

    let dapp = state.gateway.dapp_info(&query.name).await?;

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] GET /api/v1/dapp -> 200 OK ({}ms) slug={} tvl=${}",
        duration, dapp.slug, dapp.tvl_usd
    );
    tracing::info!(slug = %dapp.slug, tvl_usd = %dapp.tvl_usd, duration_ms = %duration, "DApp info retrieved");

    Ok(Json(dapp))
}

pub async fn get_market_overview(State(state): State<AppState>) -> AppResult<Json<MarketOverviewResponse>> {
    let start = Instant::now();
    println!("[REQUEST] GET /api/v1/market/overview");
    tracing::info!("Processing market overview request");

    let overview = state.gateway.market_overview().await?;

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] GET /api/v1/market/overview -> 200 OK ({}ms) trending={}",
        duration,
        overview.trending.len()
    );
    tracing::info!(
        total_market_cap_usd = %overview.total_market_cap_usd,
        duration_ms = %duration,
        "Market overview retrieved"
    );

    Ok(Json(overview))
}
