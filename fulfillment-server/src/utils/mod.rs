//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型，映射到 shared 错误码表
//! - [`ok`] / [`ok_with_message`] - 成功响应帮助函数
//! - 日志初始化

pub mod error;
pub mod logger;
pub mod result;
pub mod time;

pub use error::{AppError, ok, ok_with_message};
pub use result::AppResult;
