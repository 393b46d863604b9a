//! # Exam Wizard
//!
//! 一个按阶段生成完整试卷包的终端向导
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 数据模型（Models）
//! - `models/` - 出题参数、阶段顺序、各阶段结果
//! - `InputParameters` - 出题参数及其校验
//! - `Stage` / `Step` - 五个阶段和向导步骤
//! - `ResultSet` - 各阶段已生成的文本
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `LlmBackend` - 按阶段调用 LLM 生成文本
//! - `ConfigStore` - 按名称保存出题参数
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义五阶段流水线的状态机
//! - `GenerationBackend` - 生成能力的抽象
//! - `PipelineController` - 状态转换（start → advance / regress / regenerate）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/command` - 命令解析
//! - `orchestrator/wizard` - 终端交互循环
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, BackendError, PipelineError};
pub use models::{InputParameters, ResultSet, Stage, Step};
pub use orchestrator::{Command, WizardShell};
pub use services::{ConfigStore, LlmBackend};
pub use workflow::{GenerationBackend, PipelineController, PipelineState, RunState};
