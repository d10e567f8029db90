//! Small shared helpers: timestamps and identifier generation.

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 生成基于时间戳的唯一 ID（53-bit 安全，适配 JS Number）
///
/// 布局: [41 bits 毫秒时间戳 (自 2024-01-01)] [12 bits 随机数]
///
/// 41 bits 的毫秒时间戳可以用到 2093 年，12 bits 随机数让同一毫秒内
/// 的碰撞概率保持在可接受范围（单进程写入速率远低于 4096/ms）。
pub fn snowflake_id() -> i64 {
    use rand::Rng;

    // 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;

    let now = chrono::Utc::now().timestamp_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF;
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000);
    (ts << 12) | rand_bits
}

/// 生成不可猜测的下载令牌（64 个十六进制字符，256-bit 熵）
///
/// Token strings are opaque: no embedded timestamp, no ordering. Lookup
/// is always by exact match against a unique column.
pub fn secure_token() -> String {
    use rand::RngCore;

    let mut buf = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_id_fits_in_53_bits() {
        let id = snowflake_id();
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }

    #[test]
    fn test_secure_token_is_64_hex_chars() {
        let token = secure_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_secure_tokens_do_not_repeat() {
        let a = secure_token();
        let b = secure_token();
        assert_ne!(a, b);
    }
}
