use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::notify::{Notifier, notifier_from_config};
use shared::NotifyEvent;

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是履约后端的核心数据结构，使用 Arc/池句柄实现浅拷贝，
/// 克隆成本极低，可以安全地放进 axum 的 State。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | 嵌入式数据库连接池 |
/// | notifier | Arc<dyn Notifier> | 商户通知通道 |
/// | http_client | reqwest::Client | 文件源拉取客户端 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 通知服务 (webhook 或静默)
    pub notifier: Arc<dyn Notifier>,
    /// HTTP 客户端，用于从对象存储拉取数字商品文件
    pub http_client: reqwest::Client,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替；测试场景用它注入
    /// 自定义的池和通知器。
    pub fn new(
        config: Config,
        pool: SqlitePool,
        notifier: Arc<dyn Notifier>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            config,
            pool,
            notifier,
            http_client,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/cowrie.db，自动跑迁移)
    /// 3. HTTP 客户端与通知服务
    ///
    /// # Panics
    ///
    /// 目录创建或数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db_path = config.database_dir().join("cowrie.db");
        let db_path_str = db_path.to_string_lossy();

        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");

        // 2. HTTP client for file origin fetches
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.download_fetch_timeout_ms))
            .build()
            .expect("Failed to build HTTP client");

        // 3. Notification channel
        let notifier = notifier_from_config(config, http_client.clone());

        Self::new(config.clone(), db_service.pool, notifier, http_client)
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 发送通知事件
    ///
    /// 必须在数据库事务提交之后调用。投递失败只记录日志，
    /// 不影响主流程。
    pub async fn notify(&self, event: NotifyEvent) {
        if let Err(e) = self.notifier.notify(&event).await {
            tracing::warn!(
                target: "notify",
                event = event.name(),
                error = %e,
                "Notification delivery failed"
            );
        }
    }
}
