use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// 호출자 역할 (인증은 외부 협력자가 수행하고, 엔진은 전달받은 역할을 신뢰한다)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Player,
}

// 상품 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    /// 상한가. 없으면 무제한
    pub max_amount: Option<Decimal>,
    pub is_active: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

// 입찰 모델 (원장에 기록된 후에는 불변)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub item_id: i64,
    pub bidder_id: i64,
    pub amount: Decimal,
    /// 상품별 커밋 순번 (1부터 시작, 빈틈 없음)
    pub seq: i64,
    pub placed_at: DateTime<Utc>,
}

/// 현재 최고 입찰 뷰. 저장하지 않고 원장에서 매번 유도한다.
/// 입찰이 없으면 amount는 시작가, bidder_id는 None
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighestBid {
    pub amount: Decimal,
    pub bidder_id: Option<i64>,
    pub placed_at: Option<DateTime<Utc>>,
}

/// 금액이 양수이고 소수점 이하 2자리 이내인지 검사
pub fn is_valid_money(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount.normalize().scale() <= 2
}
