use axum::body::Body;
use axum::http::{Request, StatusCode};
use bidding_service::bidding::commands::{handle_submit_bid, SubmitBidCommand};
use bidding_service::bidding::model::{Bid, Item, Role};
use bidding_service::error::{BidRejection, EngineError};
use bidding_service::handlers;
use bidding_service::ledger::{AppendError, Ledger, MemoryLedger, NewBid};
use bidding_service::lifecycle::{
    handle_create_item, handle_toggle_active, CreateItemCommand, ToggleItemCommand,
};
use bidding_service::query;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use tracing::info;

/// 트레이싱 초기화
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

fn dec(s: &str) -> Decimal {
    s.parse().expect("금액 파싱 실패")
}

/// 테스트용 상품 생성
async fn create_test_item(
    ledger: &dyn Ledger,
    starting_price: &str,
    max_amount: Option<&str>,
) -> Item {
    handle_create_item(
        CreateItemCommand {
            title: "테스트 아이템".to_string(),
            description: "입찰 기능 테스트를 위한 아이템입니다.".to_string(),
            starting_price: dec(starting_price),
            max_amount: max_amount.map(dec),
            actor_id: 1,
            role: Role::Admin,
        },
        ledger,
    )
    .await
    .expect("상품 생성 실패")
}

/// 테스트용 입찰 제출
async fn submit(
    ledger: &dyn Ledger,
    item_id: i64,
    bidder_id: i64,
    amount: &str,
) -> Result<Bid, EngineError> {
    handle_submit_bid(
        SubmitBidCommand {
            item_id,
            bidder_id,
            role: Role::Player,
            amount: dec(amount),
        },
        ledger,
    )
    .await
}

/// 입찰이 없으면 최고가는 시작가, 입찰자는 없음
#[tokio::test]
async fn test_highest_bid_without_bids() {
    let ledger = MemoryLedger::new();
    let item = create_test_item(&ledger, "500.00", None).await;

    let highest = query::handlers::get_highest_bid(&ledger, item.id)
        .await
        .unwrap();
    assert_eq!(highest.amount, dec("500.00"));
    assert_eq!(highest.bidder_id, None);
    assert_eq!(
        query::handlers::get_bid_count(&ledger, item.id)
            .await
            .unwrap(),
        0
    );
}

/// 입찰 성공 시 최고가와 입찰자가 갱신된다
#[tokio::test]
async fn test_submit_bid_success() {
    let ledger = MemoryLedger::new();
    let item = create_test_item(&ledger, "500.00", None).await;

    let bid = submit(&ledger, item.id, 7, "600.00").await.unwrap();
    assert_eq!(bid.seq, 1);
    assert_eq!(bid.amount, dec("600.00"));

    let highest = query::handlers::get_highest_bid(&ledger, item.id)
        .await
        .unwrap();
    assert_eq!(highest.amount, dec("600.00"));
    assert_eq!(highest.bidder_id, Some(7));
}

/// 현재 최고가 이하의 입찰은 항상 LOW_BID로 거절된다
#[tokio::test]
async fn test_bid_too_low() {
    let ledger = MemoryLedger::new();
    let item = create_test_item(&ledger, "500.00", None).await;

    submit(&ledger, item.id, 1, "600.00").await.unwrap();

    // 동일 금액
    let err = submit(&ledger, item.id, 2, "600.00").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Rejected(BidRejection::BidTooLow {
            current: dec("600.00")
        })
    );

    // 더 낮은 금액
    let err = submit(&ledger, item.id, 2, "550.00").await.unwrap_err();
    assert_eq!(err.code(), "LOW_BID");

    // 시작가 이하도 마찬가지
    let item2 = create_test_item(&ledger, "500.00", None).await;
    let err = submit(&ledger, item2.id, 2, "500.00").await.unwrap_err();
    assert_eq!(err.code(), "LOW_BID");
}

/// 상한가 시나리오: 시작가 200, 상한가 300
/// 250 승인 → 300 승인 → 301 거절
#[tokio::test]
async fn test_ceiling_scenario() {
    let ledger = MemoryLedger::new();
    let item = create_test_item(&ledger, "200.00", Some("300.00")).await;

    submit(&ledger, item.id, 1, "250.00").await.unwrap();
    let highest = query::handlers::get_highest_bid(&ledger, item.id)
        .await
        .unwrap();
    assert_eq!(highest.amount, dec("250.00"));

    // 상한가와 같은 금액은 허용
    submit(&ledger, item.id, 2, "300.00").await.unwrap();
    let highest = query::handlers::get_highest_bid(&ledger, item.id)
        .await
        .unwrap();
    assert_eq!(highest.amount, dec("300.00"));

    // 상한가 초과는 거절
    let err = submit(&ledger, item.id, 3, "301.00").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Rejected(BidRejection::BidExceedsCeiling { max: dec("300.00") })
    );
}

/// 상한가는 현재 최고가보다 높아도 초과 시 거절된다
#[tokio::test]
async fn test_ceiling_applies_before_any_bid() {
    let ledger = MemoryLedger::new();
    let item = create_test_item(&ledger, "200.00", Some("300.00")).await;

    let err = submit(&ledger, item.id, 1, "500.00").await.unwrap_err();
    assert_eq!(err.code(), "OVER_CEILING");
}

/// 비활성 상품은 금액과 무관하게 거절되고, 이력은 보존된다
#[tokio::test]
async fn test_inactive_item() {
    let ledger = MemoryLedger::new();
    let item = create_test_item(&ledger, "500.00", None).await;

    submit(&ledger, item.id, 1, "650.00").await.unwrap();

    // 비활성화
    let toggled = handle_toggle_active(
        item.id,
        ToggleItemCommand {
            actor_id: 1,
            role: Role::Admin,
        },
        &ledger,
    )
    .await
    .unwrap();
    assert!(!toggled.is_active);

    // 더 높은 금액도 거절
    let err = submit(&ledger, item.id, 2, "700.00").await.unwrap_err();
    assert_eq!(err, EngineError::Rejected(BidRejection::ItemInactive));

    // 최고가는 그대로 650
    let highest = query::handlers::get_highest_bid(&ledger, item.id)
        .await
        .unwrap();
    assert_eq!(highest.amount, dec("650.00"));

    // 재활성화해도 기준선은 유지된다
    handle_toggle_active(
        item.id,
        ToggleItemCommand {
            actor_id: 1,
            role: Role::Admin,
        },
        &ledger,
    )
    .await
    .unwrap();

    let err = submit(&ledger, item.id, 2, "640.00").await.unwrap_err();
    assert_eq!(err.code(), "LOW_BID");
    submit(&ledger, item.id, 2, "700.00").await.unwrap();
}

/// 동일한 (상품, 사용자, 금액) 재제출은 거절되고 입찰 수에 반영되지 않는다
#[tokio::test]
async fn test_duplicate_resubmission() {
    let ledger = MemoryLedger::new();
    let item = create_test_item(&ledger, "500.00", None).await;

    submit(&ledger, item.id, 1, "600.00").await.unwrap();
    assert!(submit(&ledger, item.id, 1, "600.00").await.is_err());
    assert_eq!(
        query::handlers::get_bid_count(&ledger, item.id)
            .await
            .unwrap(),
        1
    );
}

/// 원장 수준의 중복 제약: 검증을 우회해도 동일 입찰은 기록되지 않는다
#[tokio::test]
async fn test_ledger_dedup_constraint() {
    let ledger = MemoryLedger::new();
    let item = create_test_item(&ledger, "500.00", None).await;

    ledger
        .append(NewBid {
            item_id: item.id,
            bidder_id: 1,
            amount: dec("600.00"),
            seq: 1,
        })
        .await
        .unwrap();

    let err = ledger
        .append(NewBid {
            item_id: item.id,
            bidder_id: 1,
            amount: dec("600.00"),
            seq: 2,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppendError::Duplicate));
    assert_eq!(ledger.bids(item.id).await.unwrap().len(), 1);
}

/// 소수점 이하 3자리 금액은 거절된다
#[tokio::test]
async fn test_invalid_amount_precision() {
    let ledger = MemoryLedger::new();
    let item = create_test_item(&ledger, "500.00", None).await;

    let err = submit(&ledger, item.id, 1, "600.001").await.unwrap_err();
    assert_eq!(err, EngineError::Rejected(BidRejection::InvalidAmount));
}

/// 역할 정책: 관리자는 입찰할 수 없고, 플레이어는 상품을 만들거나 토글할 수 없다
#[tokio::test]
async fn test_role_policy() {
    let ledger = MemoryLedger::new();
    let item = create_test_item(&ledger, "500.00", None).await;

    let err = handle_submit_bid(
        SubmitBidCommand {
            item_id: item.id,
            bidder_id: 1,
            role: Role::Admin,
            amount: dec("600.00"),
        },
        &ledger,
    )
    .await
    .unwrap_err();
    assert_eq!(err, EngineError::PermissionDenied);

    let err = handle_create_item(
        CreateItemCommand {
            title: "무단 상품".to_string(),
            description: "플레이어가 만든 상품".to_string(),
            starting_price: dec("100.00"),
            max_amount: None,
            actor_id: 2,
            role: Role::Player,
        },
        &ledger,
    )
    .await
    .unwrap_err();
    assert_eq!(err, EngineError::PermissionDenied);

    let err = handle_toggle_active(
        item.id,
        ToggleItemCommand {
            actor_id: 2,
            role: Role::Player,
        },
        &ledger,
    )
    .await
    .unwrap_err();
    assert_eq!(err, EngineError::PermissionDenied);
}

/// 존재하지 않는 상품에 대한 요청은 NOT_FOUND
#[tokio::test]
async fn test_not_found() {
    let ledger = MemoryLedger::new();

    let err = submit(&ledger, 999, 1, "600.00").await.unwrap_err();
    assert_eq!(err, EngineError::NotFound);

    let err = query::handlers::get_highest_bid(&ledger, 999)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound);

    let err = handle_toggle_active(
        999,
        ToggleItemCommand {
            actor_id: 1,
            role: Role::Admin,
        },
        &ledger,
    )
    .await
    .unwrap_err();
    assert_eq!(err, EngineError::NotFound);
}

/// 상품 등록 검증: 시작가는 양수, 상한가는 시작가보다 커야 한다
#[tokio::test]
async fn test_create_item_validation() {
    let ledger = MemoryLedger::new();

    let err = handle_create_item(
        CreateItemCommand {
            title: "잘못된 상품".to_string(),
            description: "시작가 0".to_string(),
            starting_price: dec("0"),
            max_amount: None,
            actor_id: 1,
            role: Role::Admin,
        },
        &ledger,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "INVALID_ITEM");

    let err = handle_create_item(
        CreateItemCommand {
            title: "잘못된 상품".to_string(),
            description: "상한가가 시작가 이하".to_string(),
            starting_price: dec("100.00"),
            max_amount: Some(dec("100.00")),
            actor_id: 1,
            role: Role::Admin,
        },
        &ledger,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "INVALID_ITEM");
}

/// 동시성 시나리오: 시작가 500에 600과 650이 동시에 제출되면
/// 어떤 순서로 수용되더라도 최종 최고가는 650이어야 한다
#[tokio::test]
async fn test_concurrent_two_bids() {
    init_tracing();
    let ledger: Arc<MemoryLedger> = Arc::new(MemoryLedger::new());
    let item = create_test_item(ledger.as_ref(), "500.00", None).await;

    let l1 = Arc::clone(&ledger);
    let l2 = Arc::clone(&ledger);
    let item_id = item.id;

    let h1 = tokio::spawn(async move { submit(l1.as_ref(), item_id, 1, "600.00").await });
    let h2 = tokio::spawn(async move { submit(l2.as_ref(), item_id, 2, "650.00").await });

    let r1 = h1.await.unwrap();
    let r2 = h2.await.unwrap();

    // 650은 반드시 수용된다. 600은 650보다 먼저 커밋됐을 때만 수용된다
    assert!(r2.is_ok());
    if let Err(e) = &r1 {
        assert_eq!(e.code(), "LOW_BID");
    }

    let highest = query::handlers::get_highest_bid(ledger.as_ref(), item_id)
        .await
        .unwrap();
    assert_eq!(highest.amount, dec("650.00"));
    assert_eq!(highest.bidder_id, Some(2));

    // 커밋 순서대로 금액이 엄격히 증가하는지 확인
    assert_strictly_increasing(ledger.as_ref(), item_id).await;
}

/// 동시성 입찰 테스트: 50개의 동시 입찰
#[tokio::test]
async fn test_concurrent_bidding() {
    init_tracing();
    let ledger: Arc<MemoryLedger> = Arc::new(MemoryLedger::new());
    let item = create_test_item(ledger.as_ref(), "100.00", None).await;

    // 50개의 동시 입찰 생성 (서로 다른 입찰자, 서로 다른 금액)
    let mut handles = vec![];
    for i in 1..=50i64 {
        let ledger = Arc::clone(&ledger);
        let item_id = item.id;
        let amount = format!("{}.00", 100 + i * 10);

        handles.push(tokio::spawn(async move {
            submit(ledger.as_ref(), item_id, i, &amount).await
        }));
    }

    // 모든 입찰 처리 대기 및 결과 확인
    let mut successful_bids = 0;
    let mut failed_bids = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successful_bids += 1,
            Err(EngineError::Rejected(_)) => failed_bids += 1,
            Err(e) => panic!("예상하지 못한 오류: {:?}", e),
        }
    }
    assert_eq!(successful_bids + failed_bids, 50);
    assert!(successful_bids >= 1);

    info!(
        "성공한 입찰 수: {}, 실패한 입찰 수: {}",
        successful_bids, failed_bids
    );

    // 최대 금액 입찰은 어떤 교차 실행에서도 살아남는다
    let highest = query::handlers::get_highest_bid(ledger.as_ref(), item.id)
        .await
        .unwrap();
    assert_eq!(highest.amount, dec("600.00"));

    // 입찰 수는 성공 수와 일치한다
    let count = query::handlers::get_bid_count(ledger.as_ref(), item.id)
        .await
        .unwrap();
    assert_eq!(count, successful_bids);

    // 커밋 순서대로 금액이 엄격히 증가하는지 확인
    assert_strictly_increasing(ledger.as_ref(), item.id).await;
}

/// 커밋 순서(순번) 기준으로 금액이 엄격히 증가하는지 검사
async fn assert_strictly_increasing(ledger: &dyn Ledger, item_id: i64) {
    let mut history = ledger.bids(item_id).await.unwrap();
    history.sort_by_key(|b| b.seq);

    for (i, pair) in history.windows(2).enumerate() {
        assert!(
            pair[1].amount > pair[0].amount,
            "순번 {}의 금액 {}이 이전 금액 {}보다 크지 않습니다",
            i + 2,
            pair[1].amount,
            pair[0].amount
        );
        assert_eq!(pair[1].seq, pair[0].seq + 1);
        assert!(pair[1].placed_at > pair[0].placed_at);
    }
}

// region:    --- HTTP Layer Tests

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(v) => builder.body(Body::from(v.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// HTTP 계층: 등록 → 입찰 → 최고가 조회 흐름과 상태 코드 매핑
#[tokio::test]
async fn test_http_bid_flow() {
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
    let app = handlers::routes(Arc::clone(&ledger));

    // 관리자 상품 등록
    let (status, body) = send(
        app.clone(),
        "POST",
        "/items",
        Some(json!({
            "title": "HTTP 테스트 아이템",
            "description": "HTTP 흐름 테스트",
            "starting_price": "500.00",
            "max_amount": null,
            "actor_id": 1,
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let item_id = body["id"].as_i64().unwrap();

    // 입찰
    let (status, _) = send(
        app.clone(),
        "POST",
        "/bids",
        Some(json!({
            "item_id": item_id,
            "bidder_id": 7,
            "role": "player",
            "amount": "600.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // 최고가 조회
    let (status, body) = send(
        app.clone(),
        "GET",
        &format!("/items/{}/highest-bid", item_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], "600.00");
    assert_eq!(body["bidder_id"], 7);

    // 낮은 입찰은 400 + LOW_BID
    let (status, body) = send(
        app.clone(),
        "POST",
        "/bids",
        Some(json!({
            "item_id": item_id,
            "bidder_id": 8,
            "role": "player",
            "amount": "550.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "LOW_BID");
    assert_eq!(body["current_highest"], "600.00");

    // 관리자 입찰은 403
    let (status, body) = send(
        app.clone(),
        "POST",
        "/bids",
        Some(json!({
            "item_id": item_id,
            "bidder_id": 1,
            "role": "admin",
            "amount": "700.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PERMISSION_DENIED");

    // 존재하지 않는 상품은 404
    let (status, body) = send(app.clone(), "GET", "/items/999/highest-bid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

/// HTTP 계층: 토글과 활성 목록, 비활성 입찰의 상태 코드
#[tokio::test]
async fn test_http_toggle_and_active_items() {
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
    let app = handlers::routes(Arc::clone(&ledger));

    let (_, body) = send(
        app.clone(),
        "POST",
        "/items",
        Some(json!({
            "title": "토글 테스트 아이템",
            "description": "토글 테스트",
            "starting_price": "500.00",
            "max_amount": null,
            "actor_id": 1,
            "role": "admin"
        })),
    )
    .await;
    let item_id = body["id"].as_i64().unwrap();

    // 비활성화
    let (status, body) = send(
        app.clone(),
        "POST",
        &format!("/items/{}/toggle", item_id),
        Some(json!({"actor_id": 1, "role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    // 활성 목록에서 제외된다
    let (status, body) = send(app.clone(), "GET", "/items/active", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    // 비활성 상품 입찰은 403 + ITEM_INACTIVE
    let (status, body) = send(
        app.clone(),
        "POST",
        "/bids",
        Some(json!({
            "item_id": item_id,
            "bidder_id": 2,
            "role": "player",
            "amount": "600.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "ITEM_INACTIVE");

    // 전체 목록에는 남아 있고 파생 필드를 포함한다
    let (status, body) = send(app.clone(), "GET", "/items", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["current_highest_bid"], "500.00");
    assert_eq!(items[0]["bid_count"], 0);
}

// endregion: --- HTTP Layer Tests
