// 核心模块
pub mod app;
pub mod config;
pub mod poller;
pub mod screener;

#[cfg(feature = "gui")]
pub mod gui;

// 重新导出主要类型
pub use app::ScreenerApp;
pub use config::{ConfigManager, GlobalConfig};
pub use poller::{HttpScreenerSource, PollUpdate, Poller, ScreenerSource};
pub use screener::{render, ScreenerQuery, ScreenerRow, ScreenerState, TableView};

/// 库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 初始化日志系统
///
/// 日志写入文件, 避免干扰界面或标准输出的表格; 文件无法打开时退回到标准错误。
/// `RUST_LOG` 优先于配置中的级别。
pub fn init_logging(log_file: &str, level: &str) {
    use std::fs::OpenOptions;

    let filter = level.parse::<log::LevelFilter>().unwrap_or(log::LevelFilter::Info);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(filter);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => {
            eprintln!("无法打开日志文件 {}: {}, 输出到标准错误", log_file, e);
            builder.target(env_logger::Target::Stderr);
        }
    }

    // 重复初始化时忽略
    let _ = builder.try_init();
}
