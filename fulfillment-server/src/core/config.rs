use std::path::PathBuf;

/// 服务器配置 - 履约后端的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/cowrie | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | RETURN_WINDOW_DAYS | 14 | 退货窗口（天，含当天） |
/// | AUTO_COMPLETE_AFTER_DAYS | 30 | 送达后自动完成的天数 |
/// | DOWNLOAD_TOKEN_TTL_HOURS | 72 | 下载令牌有效期（小时） |
/// | DOWNLOAD_FETCH_TIMEOUT_MS | 10000 | 拉取文件源超时(毫秒) |
/// | NOTIFY_WEBHOOK_URL | (未设置) | 商户通知 webhook 地址 |
/// | NOTIFY_TIMEOUT_MS | 5000 | 通知请求超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/cowrie HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 履约策略配置 ===
    /// 退货窗口天数（按天向上取整，含当天）
    pub return_window_days: i64,
    /// 送达后多少天自动完成
    pub auto_complete_after_days: i64,
    /// 下载令牌有效期（小时）
    pub download_token_ttl_hours: i64,
    /// 拉取文件源的超时时间 (毫秒)
    pub download_fetch_timeout_ms: u64,
    /// 商户通知 webhook 地址，未设置时通知静默丢弃
    pub notify_webhook_url: Option<String>,
    /// 通知请求超时时间 (毫秒)
    pub notify_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/cowrie".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            return_window_days: std::env::var("RETURN_WINDOW_DAYS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(14),
            auto_complete_after_days: std::env::var("AUTO_COMPLETE_AFTER_DAYS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
            download_token_ttl_hours: std::env::var("DOWNLOAD_TOKEN_TTL_HOURS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(72),
            download_fetch_timeout_ms: std::env::var("DOWNLOAD_FETCH_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL").ok(),
            notify_timeout_ms: std::env::var("NOTIFY_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 数据库目录 (work_dir/database)
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录 (work_dir/logs)
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
