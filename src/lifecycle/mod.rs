/// 상품 수명주기 관리
/// 등록과 활성 상태 반전. 종료/재개는 관리자의 수동 토글이며,
/// 재활성화해도 입찰 이력과 최고가 기준선은 그대로 유지된다.
// region:    --- Imports
use crate::bidding::model::{is_valid_money, Item, Role};
use crate::error::EngineError;
use crate::ledger::{Ledger, LedgerError, NewItem};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Commands

/// 상품 등록 명령 (관리자 전용)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateItemCommand {
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    pub max_amount: Option<Decimal>,
    pub actor_id: i64,
    pub role: Role,
}

/// 상태 반전 명령 (관리자 전용)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToggleItemCommand {
    pub actor_id: i64,
    pub role: Role,
}

fn store_err(e: LedgerError) -> EngineError {
    EngineError::StoreUnavailable {
        reason: e.to_string(),
    }
}

/// 상품 등록
/// 시작가는 소수점 이하 2자리 이내의 양수, 상한가는 시작가보다 커야 한다.
pub async fn handle_create_item(
    cmd: CreateItemCommand,
    ledger: &dyn Ledger,
) -> Result<Item, EngineError> {
    info!("{:<12} --> 상품 등록 요청: {}", "Lifecycle", cmd.title);

    if cmd.role != Role::Admin {
        return Err(EngineError::PermissionDenied);
    }

    if !is_valid_money(cmd.starting_price) {
        return Err(EngineError::InvalidItem {
            reason: "시작가는 소수점 이하 2자리 이내의 양수여야 합니다.".to_string(),
        });
    }

    if let Some(max) = cmd.max_amount {
        if !is_valid_money(max) || max <= cmd.starting_price {
            return Err(EngineError::InvalidItem {
                reason: "상한가는 시작가보다 큰 금액이어야 합니다.".to_string(),
            });
        }
    }

    ledger
        .insert_item(NewItem {
            title: cmd.title,
            description: cmd.description,
            starting_price: cmd.starting_price,
            max_amount: cmd.max_amount,
            created_by: cmd.actor_id,
        })
        .await
        .map_err(store_err)
}

/// 상품 활성 상태 반전
/// 상품 존재 외의 검증은 없다. 비활성 동안 엔진은 모든 입찰을 거절한다.
pub async fn handle_toggle_active(
    item_id: i64,
    cmd: ToggleItemCommand,
    ledger: &dyn Ledger,
) -> Result<Item, EngineError> {
    info!("{:<12} --> 상품 상태 반전 요청 id: {}", "Lifecycle", item_id);

    if cmd.role != Role::Admin {
        return Err(EngineError::PermissionDenied);
    }

    let item = ledger
        .toggle_active(item_id)
        .await
        .map_err(store_err)?
        .ok_or(EngineError::NotFound)?;

    info!(
        "{:<12} --> 상품 {} 상태: {}",
        "Lifecycle",
        item.id,
        if item.is_active { "활성" } else { "비활성" }
    );
    Ok(item)
}

// endregion: --- Commands
