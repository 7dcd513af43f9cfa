/// 인메모리 원장 구현체
/// 상품별 비동기 뮤텍스가 직렬화 단위다. 잠금은 검사와 추가 동안만 유지되며,
/// 상품이 다르면 경합 없이 독립적으로 진행된다. 통합 테스트가 이 구현을 사용한다.
// region:    --- Imports
use super::{AppendError, BidSnapshot, Ledger, LedgerError, NewBid, NewItem};
use crate::bidding::model::{Bid, Item};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

// endregion: --- Imports

// region:    --- Memory Ledger

#[derive(Default)]
pub struct MemoryLedger {
    items: RwLock<HashMap<i64, Item>>,
    /// 상품별 입찰 목록. 각 샤드는 자체 뮤텍스로 직렬화된다.
    shards: RwLock<HashMap<i64, Arc<Mutex<Vec<Bid>>>>>,
    next_item_id: AtomicI64,
    next_bid_id: AtomicI64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    async fn shard(&self, item_id: i64) -> Option<Arc<Mutex<Vec<Bid>>>> {
        self.shards.read().await.get(&item_id).cloned()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn insert_item(&self, item: NewItem) -> Result<Item, LedgerError> {
        let id = self.next_item_id.fetch_add(1, Ordering::SeqCst) + 1;
        let item = Item {
            id,
            title: item.title,
            description: item.description,
            starting_price: item.starting_price,
            max_amount: item.max_amount,
            is_active: true,
            created_by: item.created_by,
            created_at: Utc::now(),
        };
        self.items.write().await.insert(id, item.clone());
        self.shards
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(Vec::new())));
        Ok(item)
    }

    async fn item(&self, item_id: i64) -> Result<Option<Item>, LedgerError> {
        Ok(self.items.read().await.get(&item_id).cloned())
    }

    async fn all_items(&self) -> Result<Vec<Item>, LedgerError> {
        let mut items: Vec<Item> = self.items.read().await.values().cloned().collect();
        items.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(items)
    }

    async fn active_items(&self) -> Result<Vec<Item>, LedgerError> {
        let mut items: Vec<Item> = self
            .items
            .read()
            .await
            .values()
            .filter(|i| i.is_active)
            .cloned()
            .collect();
        items.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(items)
    }

    async fn toggle_active(&self, item_id: i64) -> Result<Option<Item>, LedgerError> {
        let mut items = self.items.write().await;
        match items.get_mut(&item_id) {
            Some(item) => {
                item.is_active = !item.is_active;
                Ok(Some(item.clone()))
            }
            None => Ok(None),
        }
    }

    async fn snapshot(&self, item_id: i64) -> Result<Option<BidSnapshot>, LedgerError> {
        let Some(item) = self.items.read().await.get(&item_id).cloned() else {
            return Ok(None);
        };
        let Some(shard) = self.shard(item_id).await else {
            return Ok(None);
        };

        let bids = shard.lock().await;
        // 최고 입찰: 금액 최대, 동률이면 먼저 기록된 입찰
        let highest = bids
            .iter()
            .fold(None::<&Bid>, |acc, b| match acc {
                Some(top) if top.amount >= b.amount => Some(top),
                _ => Some(b),
            })
            .cloned();

        Ok(Some(BidSnapshot {
            highest_amount: highest
                .as_ref()
                .map(|b| b.amount)
                .unwrap_or(item.starting_price),
            highest_bidder: highest.as_ref().map(|b| b.bidder_id),
            highest_placed_at: highest.as_ref().map(|b| b.placed_at),
            bid_count: bids.len() as i64,
            item,
        }))
    }

    async fn append(&self, bid: NewBid) -> Result<Bid, AppendError> {
        let shard = self
            .shard(bid.item_id)
            .await
            .ok_or_else(|| LedgerError("존재하지 않는 상품입니다.".to_string()))?;

        // 직렬화 구간: 순번 검사, 중복 검사, 추가
        let mut bids = shard.lock().await;

        if bid.seq != bids.len() as i64 + 1 {
            return Err(AppendError::SeqConflict);
        }

        if bids
            .iter()
            .any(|b| b.bidder_id == bid.bidder_id && b.amount == bid.amount)
        {
            return Err(AppendError::Duplicate);
        }

        // 기록 시각은 상품 내에서 단조 증가해야 한다
        let mut placed_at = Utc::now();
        if let Some(last) = bids.last() {
            if placed_at <= last.placed_at {
                placed_at = last.placed_at + Duration::microseconds(1);
            }
        }

        let committed = Bid {
            id: self.next_bid_id.fetch_add(1, Ordering::SeqCst) + 1,
            item_id: bid.item_id,
            bidder_id: bid.bidder_id,
            amount: bid.amount,
            seq: bid.seq,
            placed_at,
        };
        bids.push(committed.clone());
        Ok(committed)
    }

    async fn bids(&self, item_id: i64) -> Result<Vec<Bid>, LedgerError> {
        let shard = self
            .shard(item_id)
            .await
            .ok_or_else(|| LedgerError("존재하지 않는 상품입니다.".to_string()))?;
        let bids = shard.lock().await;
        let mut history: Vec<Bid> = bids.clone();
        history.reverse();
        Ok(history)
    }
}

// endregion: --- Memory Ledger
