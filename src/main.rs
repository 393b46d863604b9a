use std::path::Path;

use anyhow::{Context, Result};
use exam_wizard::{
    models::load_params_from_toml,
    utils::logging,
    Config, ConfigStore, InputParameters, LlmBackend, PipelineController, WizardShell,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    config.validate()?;

    let params = match &config.params_file {
        Some(path) => load_params_from_toml(Path::new(path)).await?,
        None => InputParameters::default(),
    };

    let store = ConfigStore::open(&config.config_store_path)
        .with_context(|| format!("无法打开配置存储: {}", config.config_store_path))?;

    info!(
        "💾 配置存储: {} ({} 个已保存)",
        store.path().display(),
        store.list().len()
    );

    let backend = LlmBackend::new(&config);
    info!("🤖 使用模型: {}", backend.model_name());

    let controller = PipelineController::new(backend, params);
    let mut shell = WizardShell::new(controller, store);
    shell.run().await?;

    info!("👋 再见");
    Ok(())
}
