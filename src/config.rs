use crate::error::ConfigError;
use tracing::warn;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 保存命名配置的 JSON 文件
    pub config_store_path: String,
    /// 启动时加载的参数文件（TOML，可选）
    pub params_file: Option<String>,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    /// 输出上限（含思考模型的推理 token）；未设置时不发送，由服务端决定
    pub llm_max_tokens: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose_logging: false,
            config_store_path: "exam_configurations.json".to_string(),
            params_file: None,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-3-flash-preview".to_string(),
            llm_temperature: 0.1,
            llm_max_tokens: None,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置或无法解析的项使用默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            verbose_logging: env_or("VERBOSE_LOGGING", default.verbose_logging),
            config_store_path: std::env::var("CONFIG_STORE_PATH").unwrap_or(default.config_store_path),
            params_file: std::env::var("PARAMS_FILE").ok().filter(|v| !v.trim().is_empty()),
            llm_api_key: std::env::var("LLM_API_KEY").or_else(|_| std::env::var("API_KEY")).unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: env_or("LLM_TEMPERATURE", default.llm_temperature),
            llm_max_tokens: env_opt("LLM_MAX_TOKENS"),
        }
    }

    /// 严格读取数值型环境变量，值存在但无法解析时报错
    pub fn parse_env<T: std::str::FromStr>(var_name: &str) -> Result<Option<T>, ConfigError> {
        match std::env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::EnvVarParseFailed {
                    var_name: var_name.to_string(),
                    value,
                    expected_type: std::any::type_name::<T>().to_string(),
                }),
            Err(_) => Ok(None),
        }
    }

    /// 生成前必须具备的配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(var_name: &str, default: T) -> T {
    env_opt(var_name).unwrap_or(default)
}

/// 读取可选的环境变量，无法解析时记录警告并视为未设置
fn env_opt<T: std::str::FromStr>(var_name: &str) -> Option<T> {
    Config::parse_env(var_name).unwrap_or_else(|e| {
        warn!("{}，使用默认值", e);
        None
    })
}
