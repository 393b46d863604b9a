use crate::models::params::InputParameters;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载出题参数
///
/// 字段名与 JSON 一致（camelCase），例如：
///
/// ```toml
/// schoolLevel = "Cấp 2"
/// subject = "Toán"
/// duration = 45
///
/// [multipleChoice]
/// percentage = 30
/// score = 3.0
/// questionCount = 6
/// ```
pub async fn load_params_from_toml(toml_file_path: &Path) -> Result<InputParameters> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    parse_params(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))
}

/// 解析 TOML 文本
pub fn parse_params(content: &str) -> Result<InputParameters> {
    let params: InputParameters = toml::from_str(content)?;
    tracing::debug!(
        "已解析参数: {} / {} / {}",
        params.school_level,
        params.grade,
        params.subject
    );
    Ok(params)
}
