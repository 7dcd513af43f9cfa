/// 입찰 승인 커맨드 처리
/// 동시성이 걸린 핵심 경로. 두 사용자가 같은 상품에 동시에 입찰하면
/// 각자의 스냅샷은 상대의 커밋 즉시 낡는다. 커밋 순번에 대한 조건부 추가와
/// 재시도 루프로 상품별 직렬화를 보장한다: 커밋된 입찰 금액은 커밋 순서대로
/// 엄격히 증가한다.
// region:    --- Imports
use crate::bidding::model::{Bid, Role};
use crate::bidding::validator;
use crate::error::EngineError;
use crate::ledger::{AppendError, Ledger, NewBid};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands

/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubmitBidCommand {
    pub item_id: i64,
    pub bidder_id: i64,
    pub role: Role,
    pub amount: Decimal,
}

// 최대 재시도 횟수
const MAX_RETRIES: i32 = 100;

/// 입찰 제출
/// 스냅샷 조회 → 검증 → 조건부 추가. 순번 충돌이면 새 스냅샷으로 재검증 후
/// 재시도한다. 검증 거절은 재시도하지 않고 그대로 반환한다.
/// 직렬화 구간(원장의 추가) 안에서는 외부 호출을 하지 않는다.
pub async fn handle_submit_bid(
    cmd: SubmitBidCommand,
    ledger: &dyn Ledger,
) -> Result<Bid, EngineError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    // 역할 정책: 플레이어만 입찰할 수 있다
    if cmd.role != Role::Player {
        return Err(EngineError::PermissionDenied);
    }

    let mut retries = 0;

    while retries < MAX_RETRIES {
        // 일관된 스냅샷 조회 (상품 상태 + 최고 입찰 + 입찰 수)
        let snapshot = ledger
            .snapshot(cmd.item_id)
            .await
            .map_err(|e| EngineError::StoreUnavailable {
                reason: e.to_string(),
            })?
            .ok_or(EngineError::NotFound)?;

        // 새 스냅샷 기준으로 검증. 거절은 원장을 건드리지 않고 그대로 반환
        validator::validate(&snapshot, cmd.amount)?;

        // 조건부 추가: 스냅샷이 본 커밋 순번의 바로 다음 자리를 주장한다
        let append = ledger
            .append(NewBid {
                item_id: cmd.item_id,
                bidder_id: cmd.bidder_id,
                amount: cmd.amount,
                seq: snapshot.bid_count + 1,
            })
            .await;

        match append {
            Ok(bid) => {
                info!(
                    "{:<12} --> 입찰 커밋: 상품 {} 순번 {} 금액 {}",
                    "Command", bid.item_id, bid.seq, bid.amount
                );
                return Ok(bid);
            }
            Err(AppendError::SeqConflict) => {
                // 다른 입찰이 먼저 커밋됨: 새 스냅샷으로 재시도
                warn!("{:<12} --> 커밋 순번 충돌: 재시도", "Command");
                retries += 1;
                continue;
            }
            Err(AppendError::Duplicate) => return Err(EngineError::DuplicateBid),
            Err(AppendError::Store(e)) => {
                return Err(EngineError::StoreUnavailable {
                    reason: e.to_string(),
                })
            }
        }
    }

    Err(EngineError::StoreUnavailable {
        reason: "최대 재시도 횟수 초과".to_string(),
    })
}

// endregion: --- Commands
