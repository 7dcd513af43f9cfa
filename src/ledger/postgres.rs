/// Postgres 원장 구현체
/// 커밋 순번 유니크 제약(bids_commit_order)을 이용한 조건부 삽입으로
/// 상품별 직렬화를 보장한다. 삽입이 거부되면 호출자가 새 스냅샷으로 재시도한다.
// region:    --- Imports
use super::queries;
use super::{AppendError, BidSnapshot, Ledger, LedgerError, NewBid, NewItem};
use crate::bidding::model::{Bid, Item};
use crate::database::DatabaseManager;
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- Postgres Ledger

pub struct PostgresLedger {
    db: Arc<DatabaseManager>,
}

impl PostgresLedger {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Ledger for PostgresLedger {
    async fn insert_item(&self, item: NewItem) -> Result<Item, LedgerError> {
        info!("{:<12} --> 상품 등록: {}", "Ledger", item.title);
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Item>(queries::INSERT_ITEM)
                        .bind(&item.title)
                        .bind(&item.description)
                        .bind(item.starting_price)
                        .bind(item.max_amount)
                        .bind(item.created_by)
                        .fetch_one(&mut **tx)
                        .await
                        .map_err(LedgerError::from)
                })
            })
            .await
    }

    async fn item(&self, item_id: i64) -> Result<Option<Item>, LedgerError> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Item>(queries::GET_ITEM)
                        .bind(item_id)
                        .fetch_optional(&mut **tx)
                        .await
                        .map_err(LedgerError::from)
                })
            })
            .await
    }

    async fn all_items(&self) -> Result<Vec<Item>, LedgerError> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Item>(queries::GET_ALL_ITEMS)
                        .fetch_all(&mut **tx)
                        .await
                        .map_err(LedgerError::from)
                })
            })
            .await
    }

    async fn active_items(&self) -> Result<Vec<Item>, LedgerError> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Item>(queries::GET_ACTIVE_ITEMS)
                        .fetch_all(&mut **tx)
                        .await
                        .map_err(LedgerError::from)
                })
            })
            .await
    }

    async fn toggle_active(&self, item_id: i64) -> Result<Option<Item>, LedgerError> {
        info!("{:<12} --> 상품 상태 반전 id: {}", "Ledger", item_id);
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Item>(queries::TOGGLE_ITEM)
                        .bind(item_id)
                        .fetch_optional(&mut **tx)
                        .await
                        .map_err(LedgerError::from)
                })
            })
            .await
    }

    async fn snapshot(&self, item_id: i64) -> Result<Option<BidSnapshot>, LedgerError> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let row = sqlx::query(queries::GET_SNAPSHOT)
                        .bind(item_id)
                        .fetch_optional(&mut **tx)
                        .await
                        .map_err(LedgerError::from)?;

                    let Some(row) = row else {
                        return Ok(None);
                    };

                    Ok(Some(BidSnapshot {
                        item: Item {
                            id: row.get("id"),
                            title: row.get("title"),
                            description: row.get("description"),
                            starting_price: row.get("starting_price"),
                            max_amount: row.get("max_amount"),
                            is_active: row.get("is_active"),
                            created_by: row.get("created_by"),
                            created_at: row.get("created_at"),
                        },
                        highest_amount: row.get("highest_amount"),
                        highest_bidder: row.get("highest_bidder"),
                        highest_placed_at: row.get("highest_placed_at"),
                        bid_count: row.get("bid_count"),
                    }))
                })
            })
            .await
    }

    async fn append(&self, bid: NewBid) -> Result<Bid, AppendError> {
        let result = sqlx::query_as::<_, Bid>(queries::APPEND_BID)
            .bind(bid.item_id)
            .bind(bid.bidder_id)
            .bind(bid.amount)
            .bind(bid.seq)
            .fetch_one(self.db.pool())
            .await;

        match result {
            Ok(bid) => Ok(bid),
            Err(e) => {
                // 제약 이름으로 충돌 종류를 구분한다
                match e.as_database_error().and_then(|d| d.constraint()) {
                    Some("bids_commit_order") => Err(AppendError::SeqConflict),
                    Some("bids_dedup") => Err(AppendError::Duplicate),
                    _ => Err(AppendError::Store(LedgerError::from(e))),
                }
            }
        }
    }

    async fn bids(&self, item_id: i64) -> Result<Vec<Bid>, LedgerError> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Bid>(queries::GET_ITEM_BIDS)
                        .bind(item_id)
                        .fetch_all(&mut **tx)
                        .await
                        .map_err(LedgerError::from)
                })
            })
            .await
    }
}

// endregion: --- Postgres Ledger
