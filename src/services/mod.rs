pub mod config_store;
pub mod llm_service;
pub mod prompt;

pub use config_store::ConfigStore;
pub use llm_service::LlmBackend;
