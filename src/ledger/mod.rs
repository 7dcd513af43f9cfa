/// 입찰 원장 저장소
/// 상품과 입찰 기록을 보관하는 유일한 공유 가변 자원.
/// 입찰 기록은 append-only이며, 조건부 삽입(상품별 커밋 순번 충돌 검사)이
/// 유일한 변경 규율이다.
// region:    --- Imports
use crate::bidding::model::{Bid, Item};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

pub mod memory;
pub mod postgres;
pub mod queries;

pub use memory::MemoryLedger;
pub use postgres::PostgresLedger;

// endregion: --- Imports

// region:    --- Ledger Types

/// 저장소 장애 (연결 끊김, 잠금 대기 시간 초과 등)
#[derive(Debug, Error)]
#[error("{0}")]
pub struct LedgerError(pub String);

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError(e.to_string())
    }
}

/// 조건부 추가 실패 사유
#[derive(Debug, Error)]
pub enum AppendError {
    /// 스냅샷 이후 다른 입찰이 먼저 커밋됨. 호출자는 새 스냅샷으로 재시도한다.
    #[error("커밋 순번 충돌")]
    SeqConflict,

    /// (상품, 입찰자, 금액) 중복
    #[error("동일한 입찰이 이미 존재합니다.")]
    Duplicate,

    #[error(transparent)]
    Store(#[from] LedgerError),
}

/// 새 입찰 (커밋 전). placed_at은 추가 시점에 서버가 부여한다.
#[derive(Debug, Clone)]
pub struct NewBid {
    pub item_id: i64,
    pub bidder_id: i64,
    pub amount: Decimal,
    /// 기대 커밋 순번 = 스냅샷의 bid_count + 1
    pub seq: i64,
}

/// 새 상품 (커밋 전)
#[derive(Debug, Clone)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    pub max_amount: Option<Decimal>,
    pub created_by: i64,
}

/// 입찰 판정용 스냅샷. 상품 상태와 최고 입찰, 입찰 수를 하나의
/// 일관된 시점에서 읽은 결과여야 한다.
#[derive(Debug, Clone)]
pub struct BidSnapshot {
    pub item: Item,
    /// 입찰이 없으면 시작가
    pub highest_amount: Decimal,
    pub highest_bidder: Option<i64>,
    pub highest_placed_at: Option<DateTime<Utc>>,
    pub bid_count: i64,
}

// endregion: --- Ledger Types

// region:    --- Ledger Trait

/// 원장 저장소 트레이트
#[async_trait]
pub trait Ledger: Send + Sync {
    /// 상품 등록
    async fn insert_item(&self, item: NewItem) -> Result<Item, LedgerError>;

    /// 상품 조회
    async fn item(&self, item_id: i64) -> Result<Option<Item>, LedgerError>;

    /// 모든 상품 조회 (최신 등록 순)
    async fn all_items(&self) -> Result<Vec<Item>, LedgerError>;

    /// 활성 상품 조회
    async fn active_items(&self) -> Result<Vec<Item>, LedgerError>;

    /// 상품 활성 상태 반전. 입찰 이력은 건드리지 않는다.
    async fn toggle_active(&self, item_id: i64) -> Result<Option<Item>, LedgerError>;

    /// 입찰 판정용 스냅샷 조회. 상품이 없으면 None
    async fn snapshot(&self, item_id: i64) -> Result<Option<BidSnapshot>, LedgerError>;

    /// 조건부 추가. bid.seq가 이미 존재하면 SeqConflict,
    /// (상품, 입찰자, 금액)이 중복이면 Duplicate
    async fn append(&self, bid: NewBid) -> Result<Bid, AppendError>;

    /// 상품 입찰 이력 조회 (커밋 역순)
    async fn bids(&self, item_id: i64) -> Result<Vec<Bid>, LedgerError>;
}

// endregion: --- Ledger Trait
