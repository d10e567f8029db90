//! Auto-completion sweep
//!
//! 送达满保护期的订单自动完成。无状态、幂等，多实例同时跑也安全：
//! 每一单都走 [`transition`] 的条件更新，输掉并发的订单直接跳过。

use serde::Serialize;
use tracing::{info, warn};

use crate::core::ServerState;
use crate::db::repository::order as order_repo;
use crate::orders::transition::{self, TransitionError};
use crate::utils::time::days_to_millis;
use shared::OrderStatus;

/// Actor name recorded on sweep-written audit notes.
pub const SWEEP_ACTOR: &str = "system";

const SWEEP_NOTE: &str = "Auto-completed after delivery window";

/// Sweep result.
#[derive(Debug, Serialize)]
pub struct SweepSummary {
    pub updated_count: usize,
    pub order_ids: Vec<i64>,
}

/// Complete every DELIVERED order whose delivery stamp is at least
/// `auto_complete_after_days` old.
///
/// Zero matches is a success. A lost conditional update (concurrent sweep
/// or manual transition) skips that order; database errors abort the whole
/// run.
pub async fn auto_complete_sweep(
    state: &ServerState,
    now: i64,
) -> Result<SweepSummary, TransitionError> {
    let cutoff = now - days_to_millis(state.config.auto_complete_after_days);
    let candidates = order_repo::find_auto_completable(&state.pool, cutoff).await?;

    let mut order_ids = Vec::new();
    for order_id in candidates {
        match transition::transition(
            state,
            order_id,
            OrderStatus::Completed,
            SWEEP_ACTOR,
            Some(SWEEP_NOTE),
            now,
        )
        .await
        {
            Ok(_) => order_ids.push(order_id),
            Err(TransitionError::InvalidTransition { from, to }) => {
                info!(
                    target: "sweep",
                    order_id,
                    %from,
                    %to,
                    "Skipped: lost to a concurrent status change"
                );
            }
            Err(TransitionError::NotFound(_)) => {
                warn!(target: "sweep", order_id, "Skipped: order disappeared mid-sweep");
            }
            Err(e @ TransitionError::Database(_)) => return Err(e),
        }
    }

    if !order_ids.is_empty() {
        info!(target: "sweep", count = order_ids.len(), "Auto-completed delivered orders");
    }

    Ok(SweepSummary {
        updated_count: order_ids.len(),
        order_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::Config;
    use crate::db::test_pool;
    use crate::notify::RecordingNotifier;
    use crate::utils::time::DAY_MS;
    use shared::NotifyEvent;
    use shared::models::{Order, OrderCreate, OrderItemCreate};
    use sqlx::SqlitePool;

    const NOW: i64 = 100 * DAY_MS;

    async fn recording_state() -> (ServerState, Arc<RecordingNotifier>) {
        let pool = test_pool().await;
        let notifier = Arc::new(RecordingNotifier::default());
        let state = ServerState::new(
            Config::with_overrides("/tmp/cowrie-test", 0),
            pool,
            notifier.clone(),
            reqwest::Client::new(),
        );
        (state, notifier)
    }

    /// Seed an order and force it into DELIVERED with the given stamp.
    async fn seed_delivered(pool: &SqlitePool, number: &str, delivered_at: i64) -> Order {
        let order = order_repo::create(
            pool,
            &OrderCreate {
                order_number: number.to_string(),
                total: 9.5,
                items: vec![OrderItemCreate {
                    product_id: 1,
                    name: "Tea towel".to_string(),
                    quantity: 1,
                    price: 9.5,
                    is_digital: false,
                    digital_file_id: None,
                    max_downloads: 0,
                }],
            },
            1_000,
        )
        .await
        .unwrap();

        sqlx::query("UPDATE customer_order SET status = 'DELIVERED', delivered_at = ? WHERE id = ?")
            .bind(delivered_at)
            .bind(order.id)
            .execute(pool)
            .await
            .unwrap();

        order
    }

    #[tokio::test]
    async fn test_sweep_completes_only_orders_past_the_window() {
        let (state, _) = recording_state().await;

        let old = seed_delivered(&state.pool, "SO-OLD", NOW - 31 * DAY_MS).await;
        let recent = seed_delivered(&state.pool, "SO-RECENT", NOW - 29 * DAY_MS).await;

        let summary = auto_complete_sweep(&state, NOW).await.unwrap();
        assert_eq!(summary.updated_count, 1);
        assert_eq!(summary.order_ids, vec![old.id]);

        let swept = order_repo::find_by_id(&state.pool, old.id).await.unwrap().unwrap();
        assert_eq!(swept.status, OrderStatus::Completed);
        assert_eq!(swept.closed_at, Some(NOW));

        let untouched = order_repo::find_by_id(&state.pool, recent.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_sweep_boundary_is_inclusive() {
        let (state, _) = recording_state().await;
        seed_delivered(&state.pool, "SO-EDGE", NOW - 30 * DAY_MS).await;

        let summary = auto_complete_sweep(&state, NOW).await.unwrap();
        assert_eq!(summary.updated_count, 1);
    }

    #[tokio::test]
    async fn test_sweep_twice_is_idempotent() {
        let (state, _) = recording_state().await;
        seed_delivered(&state.pool, "SO-ONCE", NOW - 40 * DAY_MS).await;

        let first = auto_complete_sweep(&state, NOW).await.unwrap();
        assert_eq!(first.updated_count, 1);

        let second = auto_complete_sweep(&state, NOW).await.unwrap();
        assert_eq!(second.updated_count, 0);
        assert!(second.order_ids.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_writes_audit_note_and_notifies() {
        let (state, notifier) = recording_state().await;
        let order = seed_delivered(&state.pool, "SO-NOTE", NOW - 35 * DAY_MS).await;

        auto_complete_sweep(&state, NOW).await.unwrap();

        let notes = order_repo::notes_for_order(&state.pool, order.id).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].actor, SWEEP_ACTOR);
        assert_eq!(
            notes[0].note,
            "Status changed from DELIVERED to COMPLETED: Auto-completed after delivery window"
        );

        let events = notifier.recorded();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], NotifyEvent::OrderCompleted { .. }));
    }

    #[tokio::test]
    async fn test_sweep_with_no_candidates_is_success() {
        let (state, notifier) = recording_state().await;
        let summary = auto_complete_sweep(&state, NOW).await.unwrap();
        assert_eq!(summary.updated_count, 0);
        assert!(notifier.recorded().is_empty());
    }
}
