//! Cowrie Fulfillment Server - 在线商店履约后端
//!
//! # 架构概述
//!
//! 本模块是履约服务的主入口，提供以下核心功能：
//!
//! - **订单生命周期** (`orders`): 状态机迁移、审计留痕、自动完成
//! - **退货** (`returns`): 按行资格判定与批量申请
//! - **数字商品下载** (`downloads`): 单次令牌签发与兑换
//! - **商户通知** (`notify`): webhook 事件投递
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! fulfillment-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 状态机、审计留痕、自动完成
//! ├── returns/       # 退货资格与申请
//! ├── downloads/     # 下载令牌签发与兑换
//! ├── notify/        # 商户通知通道
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod downloads;
pub mod notify;
pub mod orders;
pub mod returns;
pub mod utils;

// Re-export 公共类型 (crate:: 前缀避免与内建 core 冲突)
pub use crate::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified response/error types from shared
pub use shared::{ApiResponse, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   ______
  / ____/  ____   _      __   _____   (_)   ___
 / /      / __ \ | | /| / /  / ___/  / /   / _ \
/ /___   / /_/ / | |/ |/ /  / /     / /   /  __/
\____/   \____/  |__/|__/  /_/     /_/    \___/
    "#
    );
}
