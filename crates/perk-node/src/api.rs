//! HTTP API server for the Perk node.
//!
//! Exposes the reward engine over REST. Field names in request and response
//! bodies are the external contract and stay camelCase.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use perk_core::{Coins, WalletAddress};
use perk_rewards::RewardError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::state::AppState;

// --- Request types ---

#[derive(Deserialize)]
pub struct WalletRequest {
    pub wallet: Option<String>,
}

#[derive(Deserialize)]
pub struct ScoreRequest {
    pub wallet: Option<String>,
    #[serde(rename = "gameType")]
    pub game_type: Option<String>,
    pub score: Option<f64>,
}

// --- Response types ---

#[derive(Serialize)]
pub struct TxResponse {
    pub success: bool,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
}

#[derive(Serialize)]
pub struct MineStartResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub success: bool,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
    #[serde(rename = "coinsEarned")]
    pub coins_earned: Coins,
    #[serde(rename = "todayTotal")]
    pub today_total: Coins,
}

#[derive(Serialize)]
pub struct PendingAccrualResponse {
    pub success: bool,
    #[serde(rename = "coinsEarned")]
    pub coins_earned: Coins,
    #[serde(rename = "todayPending")]
    pub today_pending: Coins,
}

#[derive(Serialize)]
pub struct PendingClaimResponse {
    pub success: bool,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
    #[serde(rename = "totalClaimed")]
    pub total_claimed: Coins,
    pub breakdown: BTreeMap<String, Coins>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    #[serde(rename = "todayEarnings")]
    pub today_earnings: BTreeMap<String, Coins>,
    #[serde(rename = "todayPending")]
    pub today_pending: BTreeMap<String, Coins>,
    #[serde(rename = "totalPending")]
    pub total_pending: Coins,
    #[serde(rename = "totalEarnedToday")]
    pub total_earned_today: Coins,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    #[serde(rename = "railId")]
    pub rail_id: String,
    #[serde(rename = "uptimeSecs")]
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type Rejection = (StatusCode, Json<ErrorResponse>);

// --- Error mapping ---

fn bad_request(message: impl Into<String>) -> Rejection {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn reject(err: RewardError) -> Rejection {
    let status = match &err {
        RewardError::Validation(_) | RewardError::Ineligible { .. } => StatusCode::BAD_REQUEST,
        RewardError::UnknownWallet(_) => StatusCode::NOT_FOUND,
        RewardError::Transfer(_) => StatusCode::BAD_GATEWAY,
        RewardError::Store(_) | RewardError::Divergence { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn parse_wallet(raw: Option<&str>) -> Result<WalletAddress, Rejection> {
    let raw = raw.ok_or_else(|| bad_request("wallet address is required"))?;
    WalletAddress::new(raw).map_err(|e| bad_request(e.to_string()))
}

fn parse_score_request(req: &ScoreRequest) -> Result<(WalletAddress, &str, f64), Rejection> {
    let wallet = parse_wallet(req.wallet.as_deref())?;
    let game_type = req
        .game_type
        .as_deref()
        .ok_or_else(|| bad_request("game type and score are required"))?;
    let score = req
        .score
        .ok_or_else(|| bad_request("game type and score are required"))?;
    Ok((wallet, game_type, score))
}

// --- Handlers ---

async fn handle_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        rail_id: state.rail_id.clone(),
        uptime_secs: state.uptime_secs(),
    })
}

async fn handle_bonus(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WalletRequest>,
) -> Result<Json<TxResponse>, Rejection> {
    let wallet = parse_wallet(req.wallet.as_deref())?;
    let receipt = state.engine.welcome_bonus(&wallet).await.map_err(reject)?;
    Ok(Json(TxResponse {
        success: true,
        tx_hash: receipt.tx_hash,
    }))
}

async fn handle_daily_checkin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WalletRequest>,
) -> Result<Json<TxResponse>, Rejection> {
    let wallet = parse_wallet(req.wallet.as_deref())?;
    let receipt = state.engine.daily_check_in(&wallet).await.map_err(reject)?;
    Ok(Json(TxResponse {
        success: true,
        tx_hash: receipt.tx_hash,
    }))
}

async fn handle_mine(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WalletRequest>,
) -> Result<Json<MineStartResponse>, Rejection> {
    let wallet = parse_wallet(req.wallet.as_deref())?;
    state.engine.start_mining(&wallet).await.map_err(reject)?;
    let hours = state.engine.schedule().mining_cooldown_hours;
    Ok(Json(MineStartResponse {
        success: true,
        message: format!("Mining started. Come back in {} hrs.", hours),
    }))
}

async fn handle_claim(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WalletRequest>,
) -> Result<Json<TxResponse>, Rejection> {
    let wallet = parse_wallet(req.wallet.as_deref())?;
    let receipt = state.engine.claim_mining(&wallet).await.map_err(reject)?;
    Ok(Json(TxResponse {
        success: true,
        tx_hash: receipt.tx_hash,
    }))
}

async fn handle_submit_score(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, Rejection> {
    let (wallet, game_type, score) = parse_score_request(&req)?;
    let receipt = state
        .engine
        .submit_score(&wallet, game_type, score)
        .await
        .map_err(reject)?;
    Ok(Json(ScoreResponse {
        success: true,
        tx_hash: receipt.tx_hash,
        coins_earned: receipt.coins_earned,
        today_total: receipt.today_total,
    }))
}

async fn handle_add_pending(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<PendingAccrualResponse>, Rejection> {
    let (wallet, game_type, score) = parse_score_request(&req)?;
    let receipt = state
        .engine
        .accrue_pending(&wallet, game_type, score)
        .await
        .map_err(reject)?;
    Ok(Json(PendingAccrualResponse {
        success: true,
        coins_earned: receipt.coins_earned,
        today_pending: receipt.today_pending,
    }))
}

async fn handle_claim_game_rewards(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WalletRequest>,
) -> Result<Json<PendingClaimResponse>, Rejection> {
    let wallet = parse_wallet(req.wallet.as_deref())?;
    let receipt = state.engine.claim_pending(&wallet).await.map_err(reject)?;
    Ok(Json(PendingClaimResponse {
        success: true,
        tx_hash: receipt.tx_hash,
        total_claimed: receipt.total_claimed,
        breakdown: receipt.breakdown,
    }))
}

async fn handle_game_stats(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
) -> Result<Json<StatsResponse>, Rejection> {
    let wallet = parse_wallet(Some(&wallet))?;
    let stats = state.engine.game_stats(&wallet).await.map_err(reject)?;
    Ok(Json(StatsResponse {
        today_earnings: stats.today_earnings,
        today_pending: stats.today_pending,
        total_pending: stats.total_pending,
        total_earned_today: stats.total_earned_today,
    }))
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/bonus", post(handle_bonus))
        .route("/api/v1/daily-checkin", post(handle_daily_checkin))
        .route("/api/v1/mine", post(handle_mine))
        .route("/api/v1/claim", post(handle_claim))
        .route("/api/v1/submit-score", post(handle_submit_score))
        .route("/api/v1/add-pending-reward", post(handle_add_pending))
        .route("/api/v1/claim-game-rewards", post(handle_claim_game_rewards))
        .route("/api/v1/game-stats/{wallet}", get(handle_game_stats))
        .with_state(state)
}

pub async fn start_api_server(listen_addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
