//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责把用户输入翻译成流程操作，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `command` - 命令解析
//! - 把一行输入解析为 `Command`
//! - 不触碰任何状态
//!
//! ### `wizard` - 终端出题向导
//! - 持有 `PipelineController` 和 `ConfigStore`
//! - 分发命令，渲染阶段文本和状态
//! - 错误只显示，不终止循环
//!
//! ## 层次关系
//!
//! ```text
//! wizard (处理用户命令)
//!     ↓
//! workflow::PipelineController (五阶段状态机)
//!     ↓
//! services (能力层：llm / prompt / config_store)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一状态源**：所有流程状态都在控制器里，向导只读快照
//! 2. **向下依赖**：编排层 → workflow → services → models
//! 3. **无业务逻辑**：只做调度和显示，不做阶段判断

pub mod command;
pub mod wizard;

// 重新导出主要类型
pub use command::{Command, ParseError};
pub use wizard::{Flow, WizardShell};
