/// 입찰 엔진 오류 타입
/// 모든 오류는 사용자에게 그대로 노출 가능한 메시지와 기계용 코드를 함께 가진다.
// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Bid Rejection

/// 검증기 거절 사유. 규칙 순서대로 검사되며 첫 번째 실패가 반환된다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BidRejection {
    #[error("비활성화된 상품에는 입찰할 수 없습니다.")]
    ItemInactive,

    #[error("입찰 금액은 현재 최고가 {current}보다 높아야 합니다.")]
    BidTooLow { current: Decimal },

    #[error("입찰 금액이 상한가 {max}를 초과할 수 없습니다.")]
    BidExceedsCeiling { max: Decimal },

    #[error("입찰 금액은 소수점 이하 2자리 이내의 양수여야 합니다.")]
    InvalidAmount,
}

impl BidRejection {
    pub fn code(&self) -> &'static str {
        match self {
            BidRejection::ItemInactive => "ITEM_INACTIVE",
            BidRejection::BidTooLow { .. } => "LOW_BID",
            BidRejection::BidExceedsCeiling { .. } => "OVER_CEILING",
            BidRejection::InvalidAmount => "INVALID_AMOUNT",
        }
    }
}

// endregion: --- Bid Rejection

// region:    --- Engine Error

/// 엔진 호출 결과 오류. 검증기 거절은 변형 없이 그대로 통과시킨다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rejected(#[from] BidRejection),

    #[error("해당 작업을 수행할 권한이 없습니다.")]
    PermissionDenied,

    #[error("상품을 찾을 수 없습니다.")]
    NotFound,

    /// (상품, 사용자, 금액) 중복 제출 차단. 이중 클릭 방어용이며 비즈니스 규칙이 아니다.
    #[error("동일한 금액의 입찰이 이미 존재합니다.")]
    DuplicateBid,

    #[error("상품 정보가 올바르지 않습니다: {reason}")]
    InvalidItem { reason: String },

    /// 일시적 저장소 장애. 동일 입력으로 재시도해도 안전하다.
    #[error("저장소를 사용할 수 없습니다: {reason}")]
    StoreUnavailable { reason: String },
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Rejected(r) => r.code(),
            EngineError::PermissionDenied => "PERMISSION_DENIED",
            EngineError::NotFound => "NOT_FOUND",
            EngineError::DuplicateBid => "DUPLICATE_BID",
            EngineError::InvalidItem { .. } => "INVALID_ITEM",
            EngineError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            // 비활성 상품/권한 오류는 403, 그 외 검증 실패는 400
            EngineError::Rejected(BidRejection::ItemInactive) => StatusCode::FORBIDDEN,
            EngineError::Rejected(_) => StatusCode::BAD_REQUEST,
            EngineError::PermissionDenied => StatusCode::FORBIDDEN,
            EngineError::NotFound => StatusCode::NOT_FOUND,
            EngineError::DuplicateBid => StatusCode::BAD_REQUEST,
            EngineError::InvalidItem { .. } => StatusCode::BAD_REQUEST,
            EngineError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// 오류를 HTTP 응답으로 변환 (검증 실패 400, 비활성/권한 403, 미존재 404, 저장소 장애 503)
impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });

        // 사용자 안내를 위한 컨텍스트 필드
        match &self {
            EngineError::Rejected(BidRejection::BidTooLow { current }) => {
                body["current_highest"] = serde_json::json!(current);
            }
            EngineError::Rejected(BidRejection::BidExceedsCeiling { max }) => {
                body["max_amount"] = serde_json::json!(max);
            }
            _ => {}
        }

        (self.status(), Json(body)).into_response()
    }
}

// endregion: --- Engine Error
