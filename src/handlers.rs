/// HTTP 핸들러 (얇은 글루 계층)
/// 요청을 엔진 호출로 변환하고 오류 종류를 상태 코드로 매핑한다.
/// 인증/신원은 외부 협력자 몫이며, 요청에 실린 역할을 그대로 신뢰한다.
// region:    --- Imports
use crate::bidding::commands::{handle_submit_bid, SubmitBidCommand};
use crate::error::EngineError;
use crate::ledger::Ledger;
use crate::lifecycle::{handle_create_item, handle_toggle_active, CreateItemCommand, ToggleItemCommand};
use crate::query;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- Router

/// 라우터 구성
pub fn routes(ledger: Arc<dyn Ledger>) -> Router {
    Router::new()
        .route("/bids", post(handle_bid))
        .route("/items", get(handle_get_items).post(handle_create))
        .route("/items/active", get(handle_get_active_items))
        .route("/items/:id", get(handle_get_item))
        .route("/items/:id/highest-bid", get(handle_get_highest_bid))
        .route("/items/:id/bids", get(handle_get_bid_history))
        .route("/items/:id/toggle", post(handle_toggle))
        .with_state(ledger)
}

// endregion: --- Router

// region:    --- Command Handlers

/// 입찰 요청 처리
async fn handle_bid(
    State(ledger): State<Arc<dyn Ledger>>,
    Json(cmd): Json<SubmitBidCommand>,
) -> Result<impl IntoResponse, EngineError> {
    let bid = handle_submit_bid(cmd, ledger.as_ref()).await?;
    Ok(Json(serde_json::json!({
        "message": "입찰이 성공적으로 처리되었습니다.",
        "bid": bid,
    })))
}

/// 상품 등록 요청 처리 (관리자 전용)
async fn handle_create(
    State(ledger): State<Arc<dyn Ledger>>,
    Json(cmd): Json<CreateItemCommand>,
) -> Result<impl IntoResponse, EngineError> {
    let item = handle_create_item(cmd, ledger.as_ref()).await?;
    Ok(Json(item))
}

/// 상품 상태 반전 요청 처리 (관리자 전용)
async fn handle_toggle(
    State(ledger): State<Arc<dyn Ledger>>,
    Path(item_id): Path<i64>,
    Json(cmd): Json<ToggleItemCommand>,
) -> Result<impl IntoResponse, EngineError> {
    let item = handle_toggle_active(item_id, cmd, ledger.as_ref()).await?;
    Ok(Json(serde_json::json!({
        "message": if item.is_active {
            "상품이 활성화되었습니다."
        } else {
            "상품이 비활성화되었습니다."
        },
        "is_active": item.is_active,
    })))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 최고 입찰가 조회
async fn handle_get_highest_bid(
    State(ledger): State<Arc<dyn Ledger>>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, EngineError> {
    info!("{:<12} --> 최고 입찰가 조회 id: {}", "HandlerQuery", item_id);
    let highest = query::handlers::get_highest_bid(ledger.as_ref(), item_id).await?;
    Ok(Json(highest))
}

/// 입찰 이력 조회
async fn handle_get_bid_history(
    State(ledger): State<Arc<dyn Ledger>>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, EngineError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "HandlerQuery", item_id);
    let history = query::handlers::get_bid_history(ledger.as_ref(), item_id).await?;
    Ok(Json(history))
}

/// 모든 상품 조회
async fn handle_get_items(
    State(ledger): State<Arc<dyn Ledger>>,
) -> Result<impl IntoResponse, EngineError> {
    info!("{:<12} --> 모든 상품 조회", "HandlerQuery");
    let items = query::handlers::get_all_items(ledger.as_ref()).await?;
    Ok(Json(items))
}

/// 활성 상품 조회
async fn handle_get_active_items(
    State(ledger): State<Arc<dyn Ledger>>,
) -> Result<impl IntoResponse, EngineError> {
    info!("{:<12} --> 활성 상품 조회", "HandlerQuery");
    let items = query::handlers::get_active_items(ledger.as_ref()).await?;
    Ok(Json(items))
}

/// 상품 조회 (파생 필드 포함)
async fn handle_get_item(
    State(ledger): State<Arc<dyn Ledger>>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, EngineError> {
    info!("{:<12} --> 상품 조회 id: {}", "HandlerQuery", item_id);
    let summary = query::handlers::get_item_summary(ledger.as_ref(), item_id).await?;
    Ok(Json(summary))
}

// endregion: --- Query Handlers
