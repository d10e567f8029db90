//! 时间工具函数
//!
//! 所有日期→时间戳转换统一在 API handler 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::NaiveDate;

use super::{AppError, AppResult};

/// One day in Unix millis
pub const DAY_MS: i64 = 86_400_000;

/// Whole days as millis
pub fn days_to_millis(days: i64) -> i64 {
    days * DAY_MS
}

/// Whole days elapsed between `reference` and `now`, rounded up.
///
/// 不足一天按一天算；reference 在未来（时钟偏差）按 0 天算。
/// `elapsed_days(ref, ref + 14 days)` is exactly 14, one millisecond
/// later it is 15.
pub fn elapsed_days(reference: i64, now: i64) -> i64 {
    let delta = now - reference;
    // i64::div_ceil is unstable (int_roundings); delta > 0 here, so the
    // unsigned div_ceil is exact.
    if delta <= 0 {
        0
    } else {
        (delta as u64).div_ceil(DAY_MS as u64) as i64
    }
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date format: {}", date)))
}

/// 日期开始 (00:00:00 UTC) → Unix millis
pub fn day_start_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// 日期结束 → 次日 00:00:00 UTC 的 Unix millis
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day)
}
