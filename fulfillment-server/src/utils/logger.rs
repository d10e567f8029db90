//! Logging Infrastructure
//!
//! tracing 初始化。级别优先级：`RUST_LOG` 环境变量 > 显式参数 > info。
//! 生产环境写入按天滚动的日志文件，开发环境直接打到 stdout。

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger (stdout, info level)
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output.
///
/// `RUST_LOG` overrides `log_level` when set. When `log_dir` points at an
/// existing directory, log lines go to a daily-rolling file there instead
/// of stdout.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "fulfillment-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}
