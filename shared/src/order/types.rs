//! Shared types for the return flow

use serde::{Deserialize, Serialize};

// ============================================================================
// Return Reason
// ============================================================================

/// 退货原因（预设选项）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReturnReason {
    /// 与预期不符
    DoesNotMeetExpectations,
    /// 损坏或有缺陷
    DamagedOrDefective,
    /// 发错商品
    WrongItemShipped,
    /// 买家改变主意
    ChangedMind,
    /// 买家下错单
    OrderedWrongProduct,
    /// 其他
    Other,
}

// ============================================================================
// Return Eligibility
// ============================================================================

/// 不可退货原因
///
/// Returned per item so the storefront can explain each rejection
/// instead of failing the whole request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnIneligibility {
    /// 订单尚未送达
    NotDelivered,
    /// 超出退货窗口
    WindowExpired,
    /// 数字商品不支持退货
    DigitalItem,
    /// 已存在未作废的退货申请
    AlreadyRequested,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_reason_wire_format() {
        let json = serde_json::to_string(&ReturnReason::DamagedOrDefective).unwrap();
        assert_eq!(json, "\"DAMAGED_OR_DEFECTIVE\"");

        let parsed: ReturnReason = serde_json::from_str("\"CHANGED_MIND\"").unwrap();
        assert_eq!(parsed, ReturnReason::ChangedMind);
    }

    #[test]
    fn test_ineligibility_wire_format() {
        let json = serde_json::to_string(&ReturnIneligibility::WindowExpired).unwrap();
        assert_eq!(json, "\"WINDOW_EXPIRED\"");
    }
}
