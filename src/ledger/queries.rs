/// 상품 등록
pub const INSERT_ITEM: &str = r#"
    INSERT INTO items (title, description, starting_price, max_amount, is_active, created_by, created_at)
    VALUES ($1, $2, $3, $4, TRUE, $5, now())
    RETURNING id, title, description, starting_price, max_amount, is_active, created_by, created_at
"#;

/// 상품 조회
pub const GET_ITEM: &str = "SELECT id, title, description, starting_price, max_amount, is_active, created_by, created_at FROM items WHERE id = $1";

/// 모든 상품 조회
pub const GET_ALL_ITEMS: &str = "SELECT id, title, description, starting_price, max_amount, is_active, created_by, created_at FROM items ORDER BY created_at DESC";

/// 활성 상품 조회
pub const GET_ACTIVE_ITEMS: &str = "SELECT id, title, description, starting_price, max_amount, is_active, created_by, created_at FROM items WHERE is_active = TRUE ORDER BY created_at DESC";

/// 상품 활성 상태 반전
pub const TOGGLE_ITEM: &str = r#"
    UPDATE items SET is_active = NOT is_active
    WHERE id = $1
    RETURNING id, title, description, starting_price, max_amount, is_active, created_by, created_at
"#;

/// 입찰 판정용 스냅샷 조회
/// 최고 입찰과 입찰 수를 한 문장에서 읽어 하나의 일관된 시점을 보장한다.
pub const GET_SNAPSHOT: &str = r#"
    SELECT i.id, i.title, i.description, i.starting_price, i.max_amount,
           i.is_active, i.created_by, i.created_at,
           COALESCE(hb.amount, i.starting_price) AS highest_amount,
           hb.bidder_id AS highest_bidder,
           hb.placed_at AS highest_placed_at,
           (SELECT COUNT(*) FROM bids b WHERE b.item_id = i.id) AS bid_count
    FROM items i
    LEFT JOIN LATERAL (
        SELECT amount, bidder_id, placed_at
        FROM bids
        WHERE item_id = i.id
        ORDER BY amount DESC, placed_at ASC
        LIMIT 1
    ) hb ON TRUE
    WHERE i.id = $1
"#;

/// 조건부 입찰 추가. 커밋 순번/중복 제약 위반은 제약 이름으로 구분한다.
pub const APPEND_BID: &str = r#"
    INSERT INTO bids (item_id, bidder_id, amount, seq, placed_at)
    VALUES ($1, $2, $3, $4, now())
    RETURNING id, item_id, bidder_id, amount, seq, placed_at
"#;

/// 상품 입찰 이력 조회 (커밋 역순)
pub const GET_ITEM_BIDS: &str = r#"
    SELECT id, item_id, bidder_id, amount, seq, placed_at
    FROM bids
    WHERE item_id = $1
    ORDER BY seq DESC
"#;
