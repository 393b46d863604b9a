/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{ResultSet, Stage};

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 出题向导启动 - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!("💾 配置文件: {}", config.config_store_path);
    info!("{}", "=".repeat(60));
}

/// 记录阶段生成完成
pub fn log_stage_generated(stage: Stage, text: &str) {
    info!(
        "✓ {} 生成完成，共 {} 字符: {}",
        stage.label(),
        text.chars().count(),
        truncate_text(&text.replace('\n', " "), 60)
    );
}

/// 汇总当前结果集
pub fn log_result_summary(results: &ResultSet) {
    info!("{}", "─".repeat(60));
    for stage in Stage::ALL {
        let mark = if results.contains(stage) { "✅" } else { "⬜" };
        info!("{} {}", mark, stage.label());
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
