//! 订单生命周期集成测试
//!
//! 通过完整的 HTTP 栈 (build_app + oneshot) 验证下单、状态迁移、
//! 审计留痕、自动完成和退货申请的端到端行为。数据库是临时目录里的
//! 真实 SQLite 文件，连并发写路径一起测。

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use fulfillment_server::api::build_app;
use fulfillment_server::db::DbService;
use fulfillment_server::notify::{Notifier, NotifyError};
use fulfillment_server::orders;
use fulfillment_server::{Config, ServerState};
use shared::NotifyEvent;
use shared::order::OrderStatus;
use shared::util::now_millis;

const DAY_MS: i64 = 86_400_000;

/// 记录所有通知事件的测试替身
#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<NotifyEvent>>,
}

impl RecordingNotifier {
    fn recorded(&self) -> Vec<NotifyEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &NotifyEvent) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// 基于临时目录的完整服务器状态
async fn test_state() -> (ServerState, Arc<RecordingNotifier>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cowrie-test.db");
    let db = DbService::new(&db_path.to_string_lossy()).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let state = ServerState::new(
        Config::with_overrides(dir.path().to_string_lossy(), 0),
        db.pool,
        notifier.clone(),
        reqwest::Client::new(),
    );
    (state, notifier, dir)
}

async fn send_json(app: &Router, method: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// 下单，返回订单 id 和响应体
async fn create_order(app: &Router, number: &str, items: Value) -> (i64, Value) {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/orders",
        json!({ "order_number": number, "total": 44.98, "items": items }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create {number} failed: {body}");
    let order_id = body["data"]["order"]["id"].as_i64().unwrap();
    (order_id, body)
}

/// 逐步推进订单状态
async fn advance(app: &Router, order_id: i64, statuses: &[&str]) {
    for next in statuses {
        let (status, body) = send_json(
            app,
            "POST",
            &format!("/api/orders/{order_id}/status"),
            json!({ "status": next, "actor": "ops" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "transition to {next} failed: {body}");
    }
}

/// Pick the eligibility view for one line item out of a preview response.
fn view_for(views: &[Value], item_id: i64) -> &Value {
    views
        .iter()
        .find(|v| v["item"]["id"].as_i64() == Some(item_id))
        .unwrap()
}

#[tokio::test]
async fn test_checkout_to_completion_over_http() {
    let (state, notifier, _dir) = test_state().await;
    let app = build_app(state);

    let (order_id, body) = create_order(
        &app,
        "SO-9001",
        json!([
            { "product_id": 11, "name": "Ceramic mug", "quantity": 2, "price": 7.5 },
            { "product_id": 12, "name": "Knitting pattern (PDF)", "quantity": 1,
              "price": 29.98, "is_digital": true, "max_downloads": 3 }
        ]),
    )
    .await;
    assert_eq!(body["code"], "E0000");
    assert_eq!(body["data"]["order"]["status"], "PENDING");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    for (next, actor) in [
        ("PROCESSING", "warehouse"),
        ("SHIPPED", "warehouse"),
        ("DELIVERED", "carrier"),
        ("COMPLETED", "support"),
    ] {
        let (status, body) = send_json(
            &app,
            "POST",
            &format!("/api/orders/{order_id}/status"),
            json!({ "status": next, "actor": actor }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "transition to {next} failed: {body}");
        assert_eq!(body["data"]["status"], next);
    }

    // 生命周期时间戳已盖章
    let (_, body) = get_json(&app, &format!("/api/orders/{order_id}")).await;
    assert_eq!(body["data"]["order"]["status"], "COMPLETED");
    assert!(body["data"]["order"]["delivered_at"].is_i64());
    assert!(body["data"]["order"]["closed_at"].is_i64());

    // 审计留痕：每步一条，按时间排序
    let (_, body) = get_json(&app, &format!("/api/orders/{order_id}/notes")).await;
    let notes = body["data"].as_array().unwrap();
    assert_eq!(notes.len(), 4);
    assert_eq!(notes[0]["note"], "Status changed from PENDING to PROCESSING");
    assert_eq!(notes[0]["actor"], "warehouse");
    assert_eq!(notes[3]["note"], "Status changed from DELIVERED to COMPLETED");

    // 完成通知恰好一次
    let events = notifier.recorded();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], NotifyEvent::OrderCompleted { .. }));

    // 列表包含新订单
    let (_, body) = get_json(&app, "/api/orders?page=1&per_page=10").await;
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["order_number"], "SO-9001");
}

#[tokio::test]
async fn test_http_error_codes() {
    let (state, _, _dir) = test_state().await;
    let app = build_app(state);

    // 未知订单 → 404 E0003
    let (status, body) = get_json(&app, "/api/orders/424242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");

    // 空 items → 400 E0002
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/orders",
        json!({ "order_number": "SO-9002", "total": 0.0, "items": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    // 跳步迁移 → 409 E0101
    let (order_id, _) = create_order(
        &app,
        "SO-9003",
        json!([{ "product_id": 1, "name": "Coaster", "quantity": 1, "price": 5.0 }]),
    )
    .await;
    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/status"),
        json!({ "status": "COMPLETED", "actor": "support" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0101");
    assert_eq!(body["message"], "Cannot change status from PENDING to COMPLETED");

    // 重复订单号 → 400
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/orders",
        json!({
            "order_number": "SO-9003",
            "total": 5.0,
            "items": [{ "product_id": 1, "name": "Coaster", "quantity": 1, "price": 5.0 }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 响应统一带 x-request-id
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_concurrent_transition_single_winner() {
    let (state, _, _dir) = test_state().await;
    let app = build_app(state.clone());

    let (order_id, _) = create_order(
        &app,
        "SO-9010",
        json!([{ "product_id": 1, "name": "Coaster", "quantity": 1, "price": 5.0 }]),
    )
    .await;

    // 八个并发 worker 同时做同一个迁移，只有一个能赢
    let mut handles = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            orders::transition(
                &state,
                order_id,
                OrderStatus::Processing,
                "warehouse",
                None,
                now_millis(),
            )
            .await
        }));
    }

    let mut winners = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(order) => {
                assert_eq!(order.status, OrderStatus::Processing);
                winners += 1;
            }
            Err(orders::TransitionError::InvalidTransition { .. }) => conflicts += 1,
            Err(e) => panic!("Unexpected transition error: {e}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(conflicts, 7);

    // 审计留痕只有赢家那一条
    let (_, body) = get_json(&app, &format!("/api/orders/{order_id}/notes")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_auto_complete_endpoint_sweeps_once() {
    let (state, notifier, _dir) = test_state().await;
    let app = build_app(state.clone());

    // 三张已送达订单：31、30、29 天前
    let now = now_millis();
    for (number, age_days) in [("SO-OLD", 31_i64), ("SO-EDGE", 30), ("SO-FRESH", 29)] {
        let (order_id, _) = create_order(
            &app,
            number,
            json!([{ "product_id": 1, "name": "Coaster", "quantity": 1, "price": 5.0 }]),
        )
        .await;
        advance(&app, order_id, &["PROCESSING", "SHIPPED", "DELIVERED"]).await;
        sqlx::query("UPDATE customer_order SET delivered_at = ? WHERE id = ?")
            .bind(now - age_days * DAY_MS)
            .bind(order_id)
            .execute(&state.pool)
            .await
            .unwrap();
    }

    // 31 天和 30 天的被完成，29 天的保留
    let (status, body) = get_json(&app, "/api/orders/auto-complete").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated_count"], 2);

    // 幂等：再跑一遍没有新的可完成订单
    let (_, body) = get_json(&app, "/api/orders/auto-complete").await;
    assert_eq!(body["data"]["updated_count"], 0);

    let completed = notifier
        .recorded()
        .iter()
        .filter(|e| matches!(e, NotifyEvent::OrderCompleted { .. }))
        .count();
    assert_eq!(completed, 2);

    let (_, body) = get_json(&app, "/api/orders?from=2000-01-01").await;
    assert_eq!(body["data"]["pagination"]["total"], 3);
}

#[tokio::test]
async fn test_return_flow_over_http() {
    let (state, notifier, _dir) = test_state().await;
    let app = build_app(state.clone());

    let (order_id, body) = create_order(
        &app,
        "SO-9004",
        json!([
            { "product_id": 11, "name": "Ceramic mug", "quantity": 2, "price": 7.5 },
            { "product_id": 12, "name": "Wallpaper pack", "quantity": 1,
              "price": 29.98, "is_digital": true },
            { "product_id": 13, "name": "Cork coaster", "quantity": 4, "price": 2.25 }
        ]),
    )
    .await;
    let items = body["data"]["items"].as_array().unwrap().clone();
    let item_id = |name: &str| {
        items
            .iter()
            .find(|i| i["name"] == name)
            .unwrap()["id"]
            .as_i64()
            .unwrap()
    };
    let mug_id = item_id("Ceramic mug");
    let digital_id = item_id("Wallpaper pack");
    let coaster_id = item_id("Cork coaster");

    // 送达并回拨到 10 天前，窗口内
    advance(&app, order_id, &["PROCESSING", "SHIPPED", "DELIVERED"]).await;
    sqlx::query("UPDATE customer_order SET delivered_at = ? WHERE id = ?")
        .bind(now_millis() - 10 * DAY_MS)
        .bind(order_id)
        .execute(&state.pool)
        .await
        .unwrap();

    // 资格预览：两个物理行可退，数字行不可退
    let (_, body) = get_json(&app, &format!("/api/orders/{order_id}/returnable-items")).await;
    let views = body["data"].as_array().unwrap();
    assert_eq!(view_for(views, mug_id)["eligible"], true);
    assert_eq!(view_for(views, coaster_id)["eligible"], true);
    assert_eq!(view_for(views, digital_id)["eligible"], false);
    assert_eq!(view_for(views, digital_id)["reason"], "DIGITAL_ITEM");

    // 批量申请：物理行创建，数字行按行拒绝
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/returns",
        json!({
            "order_item_ids": [mug_id, digital_id],
            "reason": "DAMAGED_OR_DEFECTIVE",
            "details": "Handle arrived cracked"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created_count"], 1);
    let outcomes = body["data"]["outcomes"].as_array().unwrap();
    assert_eq!(outcomes[0]["order_item_id"].as_i64(), Some(mug_id));
    assert_eq!(outcomes[0]["result"], "CREATED");
    assert_eq!(outcomes[1]["result"], "REJECTED");
    assert_eq!(outcomes[1]["reason"], "DIGITAL_ITEM");

    // 重复申请同一行 → ALREADY_REQUESTED
    let (_, body) = send_json(
        &app,
        "POST",
        "/api/returns",
        json!({ "order_item_ids": [mug_id], "reason": "DAMAGED_OR_DEFECTIVE" }),
    )
    .await;
    assert_eq!(body["data"]["created_count"], 0);
    assert_eq!(body["data"]["outcomes"][0]["reason"], "ALREADY_REQUESTED");

    // 订单的退货列表只有一条
    let (_, body) = get_json(&app, &format!("/api/orders/{order_id}/returns")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // 再回拨到 15 天前：已退的杯子仍报 ALREADY_REQUESTED，
    // 没退过的杯垫这时才报 WINDOW_EXPIRED
    sqlx::query("UPDATE customer_order SET delivered_at = ? WHERE id = ?")
        .bind(now_millis() - 15 * DAY_MS)
        .bind(order_id)
        .execute(&state.pool)
        .await
        .unwrap();

    let (_, body) = get_json(&app, &format!("/api/orders/{order_id}/returnable-items")).await;
    let views = body["data"].as_array().unwrap();
    assert_eq!(view_for(views, mug_id)["eligible"], false);
    assert_eq!(view_for(views, mug_id)["reason"], "ALREADY_REQUESTED");
    assert_eq!(view_for(views, coaster_id)["reason"], "WINDOW_EXPIRED");
    assert_eq!(view_for(views, digital_id)["reason"], "DIGITAL_ITEM");

    let (_, body) = send_json(
        &app,
        "POST",
        "/api/returns",
        json!({ "order_item_ids": [mug_id, coaster_id], "reason": "CHANGED_MIND" }),
    )
    .await;
    assert_eq!(body["data"]["created_count"], 0);
    let outcomes = body["data"]["outcomes"].as_array().unwrap();
    assert_eq!(outcomes[0]["reason"], "ALREADY_REQUESTED");
    assert_eq!(outcomes[1]["reason"], "WINDOW_EXPIRED");

    // return.confirmed 通知恰好一次
    let confirmed = notifier
        .recorded()
        .iter()
        .filter(|e| matches!(e, NotifyEvent::ReturnConfirmed { .. }))
        .count();
    assert_eq!(confirmed, 1);
}

#[tokio::test]
async fn test_return_window_closes_after_fifteen_days() {
    let (state, _, _dir) = test_state().await;
    let app = build_app(state.clone());

    let (order_id, body) = create_order(
        &app,
        "SO-9005",
        json!([{ "product_id": 11, "name": "Ceramic mug", "quantity": 1, "price": 7.5 }]),
    )
    .await;
    let item_id = body["data"]["items"][0]["id"].as_i64().unwrap();

    advance(&app, order_id, &["PROCESSING", "SHIPPED", "DELIVERED"]).await;
    sqlx::query("UPDATE customer_order SET delivered_at = ? WHERE id = ?")
        .bind(now_millis() - 15 * DAY_MS)
        .bind(order_id)
        .execute(&state.pool)
        .await
        .unwrap();

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/returns",
        json!({ "order_item_ids": [item_id], "reason": "CHANGED_MIND" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created_count"], 0);
    assert_eq!(body["data"]["outcomes"][0]["reason"], "WINDOW_EXPIRED");
}
