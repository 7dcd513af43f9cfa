/// 입찰 검증기
/// 스냅샷에 대한 순수 함수. 규칙은 순서대로 검사하고 첫 번째 실패를 반환한다.
/// 스냅샷은 읽는 순간 낡을 수 있으므로, 검증만으로는 정합성이 보장되지 않는다.
/// 원장의 조건부 추가와 함께 사용해야 한다 (commands 참조).
// region:    --- Imports
use crate::error::BidRejection;
use crate::ledger::BidSnapshot;
use rust_decimal::Decimal;

use super::model::is_valid_money;

// endregion: --- Imports

// region:    --- Validator

/// 입찰 가능 여부 판정
/// 1. 상품이 활성 상태인가
/// 2. 금액이 현재 최고가보다 큰가
/// 3. 상한가가 있으면 그 이하인가
/// 4. 금액이 소수점 이하 2자리 이내의 양수인가
pub fn validate(snapshot: &BidSnapshot, amount: Decimal) -> Result<(), BidRejection> {
    if !snapshot.item.is_active {
        return Err(BidRejection::ItemInactive);
    }

    if amount <= snapshot.highest_amount {
        return Err(BidRejection::BidTooLow {
            current: snapshot.highest_amount,
        });
    }

    if let Some(max) = snapshot.item.max_amount {
        if amount > max {
            return Err(BidRejection::BidExceedsCeiling { max });
        }
    }

    if !is_valid_money(amount) {
        return Err(BidRejection::InvalidAmount);
    }

    Ok(())
}

// endregion: --- Validator
