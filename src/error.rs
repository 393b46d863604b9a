use thiserror::Error;

use crate::models::{Stage, Step};

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 生成流水线错误
    #[error("流水线错误: {0}")]
    Pipeline(#[from] PipelineError),
    /// 参数校验失败
    #[error("参数错误: {0}")]
    Validation(#[from] ValidationError),
    /// 配置存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// 生成后端错误
///
/// 只携带后端给出的可读信息，原样展示给用户
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<async_openai::error::OpenAIError> for BackendError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        BackendError::new(err.to_string())
    }
}

/// 流水线状态机错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// 已有生成任务在进行中
    #[error("已有生成任务在进行中 (阶段: {stage})")]
    Busy { stage: Stage },

    /// 当前状态不允许该操作
    #[error("当前状态 {from} 不允许执行 {action}")]
    InvalidTransition { action: &'static str, from: Step },

    /// 前置阶段没有输出
    #[error("缺少前置阶段 {stage} 的输出")]
    MissingPrerequisite { stage: Stage },

    /// 后端生成失败
    #[error(transparent)]
    Generation(#[from] BackendError),
}

/// 单条参数校验问题
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    #[error("字段 {field} 不能为空")]
    EmptyField { field: &'static str },
    #[error("考试时长必须大于0")]
    ZeroDuration,
    #[error("题型占比合计为 {total}%，应为 100%")]
    QuestionTypePercentage { total: u64 },
    #[error("题型分值合计为 {total}，应为 10")]
    TotalScore { total: f64 },
    #[error("认知层级占比合计为 {total}%，应为 100%")]
    CognitiveLevels { total: u64 },
}

/// 参数校验失败，包含全部问题
#[derive(Debug, Clone, PartialEq, Error)]
#[error("参数校验失败: {}", format_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// 配置存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("配置 '{name}' 不存在")]
    NotFound { name: String },
    #[error("配置名称不能为空")]
    EmptyName,
    #[error("读写配置文件失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件 JSON 处理失败 ({path}): {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少 API 密钥
    #[error("未设置 LLM API 密钥 (LLM_API_KEY 或 API_KEY)")]
    MissingApiKey,
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
