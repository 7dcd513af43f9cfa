// region:    --- Imports
use crate::bidding::model::{Bid, HighestBid, Item};
use crate::error::EngineError;
use crate::ledger::{BidSnapshot, Ledger, LedgerError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Views

/// 파생 필드를 포함한 상품 요약 뷰
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    pub max_amount: Option<Decimal>,
    pub is_active: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub current_highest_bid: Decimal,
    pub current_highest_bidder: Option<i64>,
    pub bid_count: i64,
}

impl From<BidSnapshot> for ItemSummary {
    fn from(s: BidSnapshot) -> Self {
        ItemSummary {
            id: s.item.id,
            title: s.item.title,
            description: s.item.description,
            starting_price: s.item.starting_price,
            max_amount: s.item.max_amount,
            is_active: s.item.is_active,
            created_by: s.item.created_by,
            created_at: s.item.created_at,
            current_highest_bid: s.highest_amount,
            current_highest_bidder: s.highest_bidder,
            bid_count: s.bid_count,
        }
    }
}

// endregion: --- Views

// region:    --- Query Handlers

fn store_err(e: LedgerError) -> EngineError {
    EngineError::StoreUnavailable {
        reason: e.to_string(),
    }
}

/// 최고 입찰가 조회. 입찰이 없으면 시작가와 빈 입찰자를 반환한다.
pub async fn get_highest_bid(
    ledger: &dyn Ledger,
    item_id: i64,
) -> Result<HighestBid, EngineError> {
    info!("{:<12} --> 최고 입찰가 조회 id: {}", "Query", item_id);
    let snapshot = ledger
        .snapshot(item_id)
        .await
        .map_err(store_err)?
        .ok_or(EngineError::NotFound)?;

    Ok(HighestBid {
        amount: snapshot.highest_amount,
        bidder_id: snapshot.highest_bidder,
        placed_at: snapshot.highest_placed_at,
    })
}

/// 입찰 수 조회
pub async fn get_bid_count(ledger: &dyn Ledger, item_id: i64) -> Result<i64, EngineError> {
    info!("{:<12} --> 입찰 수 조회 id: {}", "Query", item_id);
    let snapshot = ledger
        .snapshot(item_id)
        .await
        .map_err(store_err)?
        .ok_or(EngineError::NotFound)?;
    Ok(snapshot.bid_count)
}

/// 입찰 이력 조회 (커밋 역순)
pub async fn get_bid_history(ledger: &dyn Ledger, item_id: i64) -> Result<Vec<Bid>, EngineError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", item_id);
    ledger
        .item(item_id)
        .await
        .map_err(store_err)?
        .ok_or(EngineError::NotFound)?;
    ledger.bids(item_id).await.map_err(store_err)
}

/// 상품 요약 조회
pub async fn get_item_summary(
    ledger: &dyn Ledger,
    item_id: i64,
) -> Result<ItemSummary, EngineError> {
    info!("{:<12} --> 상품 조회 id: {}", "Query", item_id);
    let snapshot = ledger
        .snapshot(item_id)
        .await
        .map_err(store_err)?
        .ok_or(EngineError::NotFound)?;
    Ok(snapshot.into())
}

/// 모든 상품 요약 조회
pub async fn get_all_items(ledger: &dyn Ledger) -> Result<Vec<ItemSummary>, EngineError> {
    info!("{:<12} --> 모든 상품 조회", "Query");
    summarize(ledger, ledger.all_items().await.map_err(store_err)?).await
}

/// 활성 상품 요약 조회
pub async fn get_active_items(ledger: &dyn Ledger) -> Result<Vec<ItemSummary>, EngineError> {
    info!("{:<12} --> 활성 상품 조회", "Query");
    summarize(ledger, ledger.active_items().await.map_err(store_err)?).await
}

async fn summarize(
    ledger: &dyn Ledger,
    items: Vec<Item>,
) -> Result<Vec<ItemSummary>, EngineError> {
    let mut summaries = Vec::with_capacity(items.len());
    for item in items {
        // 목록 조회 중 상품이 사라지는 경우는 없다 (상품은 물리 삭제되지 않음)
        if let Some(snapshot) = ledger.snapshot(item.id).await.map_err(store_err)? {
            summaries.push(snapshot.into());
        }
    }
    Ok(summaries)
}

// endregion: --- Query Handlers
