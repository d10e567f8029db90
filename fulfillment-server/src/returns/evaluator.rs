//! Return eligibility evaluator
//!
//! 纯函数：给定订单快照、行项目、是否已有未作废申请和当前时间，
//! 判断该行能否退货。不碰数据库，时间由调用方注入，方便测试。

use crate::utils::time::elapsed_days;
use shared::models::{Order, OrderItem};
use shared::order::{OrderStatus, ReturnIneligibility};

/// Decide whether `item` may be returned right now.
///
/// Checks run in order; the first failure wins:
/// 1. The order must currently be DELIVERED.
/// 2. Digital items are never returnable.
/// 3. At most one open request per item. An already-returned item keeps
///    reporting ALREADY_REQUESTED even after the window closes.
/// 4. Within the return window: `elapsed_days` from `delivered_at`
///    (falling back to `created_at` for rows delivered before the stamp
///    existed) must not exceed `window_days`. Day `window_days` itself is
///    still eligible; one millisecond later is not.
pub fn evaluate(
    order: &Order,
    item: &OrderItem,
    has_open_request: bool,
    window_days: i64,
    now: i64,
) -> Result<(), ReturnIneligibility> {
    if order.status != OrderStatus::Delivered {
        return Err(ReturnIneligibility::NotDelivered);
    }

    if item.is_digital {
        return Err(ReturnIneligibility::DigitalItem);
    }

    if has_open_request {
        return Err(ReturnIneligibility::AlreadyRequested);
    }

    let reference = order.delivered_at.unwrap_or(order.created_at);
    if elapsed_days(reference, now) > window_days {
        return Err(ReturnIneligibility::WindowExpired);
    }

    Ok(())
}

/// Bool projection of [`evaluate`].
pub fn is_returnable(
    order: &Order,
    item: &OrderItem,
    has_open_request: bool,
    window_days: i64,
    now: i64,
) -> bool {
    evaluate(order, item, has_open_request, window_days, now).is_ok()
}
