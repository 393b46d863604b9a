//! 终端出题向导 - 编排层
//!
//! ## 职责
//!
//! 把用户输入的命令翻译成控制器的状态转换，并把状态渲染成文本。
//! 本模块不持有任何流程状态，所有状态都来自 `PipelineController`。

use std::fmt::Write as _;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{load_params_from_toml, InputParameters, Stage, Step};
use crate::orchestrator::command::{Command, HELP};
use crate::services::ConfigStore;
use crate::utils::logging::log_result_summary;
use crate::workflow::{GenerationBackend, PipelineController};

/// 命令执行后的去向
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// 继续，附带要显示的文本
    Continue(String),
    Quit,
}

/// 终端出题向导
pub struct WizardShell<B> {
    controller: PipelineController<B>,
    store: ConfigStore,
}

impl<B: GenerationBackend> WizardShell<B> {
    pub fn new(controller: PipelineController<B>, store: ConfigStore) -> Self {
        Self { controller, store }
    }

    pub fn controller(&self) -> &PipelineController<B> {
        &self.controller
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// 交互主循环，读取标准输入直到 quit 或 EOF
    pub async fn run(&mut self) -> AppResult<()> {
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        stdout.write_all(format!("{}\n", HELP).as_bytes()).await?;

        loop {
            stdout
                .write_all(format!("\n[{}] > ", self.controller.current_step()).as_bytes())
                .await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                info!("输入结束，退出向导");
                break;
            };

            if line.trim().is_empty() {
                continue;
            }

            match Command::parse(&line) {
                Ok(command) => match self.handle(command).await {
                    Ok(Flow::Continue(text)) => {
                        if !text.is_empty() {
                            stdout.write_all(format!("{}\n", text).as_bytes()).await?;
                        }
                    }
                    Ok(Flow::Quit) => break,
                    Err(e) => {
                        error!("❌ {}", e);
                        stdout.write_all(format!("❌ {}\n", e).as_bytes()).await?;
                    }
                },
                Err(e) => {
                    stdout.write_all(format!("{}\n", e).as_bytes()).await?;
                }
            }
        }

        Ok(())
    }

    /// 执行一条命令
    ///
    /// 返回的错误都不是致命的，调用方显示后可继续输入
    pub async fn handle(&mut self, command: Command) -> AppResult<Flow> {
        let text = match command {
            Command::Help => HELP.to_string(),
            Command::Status => self.render_status(),
            Command::Params => render_params(&self.controller.params()),
            Command::Check => match self.controller.params().validate() {
                Ok(()) => "✅ 参数校验通过".to_string(),
                Err(e) => format!("⚠️ {}", e),
            },
            Command::Open(path) => {
                let params = load_params_from_toml(&path)
                    .await
                    .map_err(|e| AppError::Other(format!("{:#}", e)))?;
                self.controller.set_params(params);
                format!("✓ 已从 {} 读取参数", path.display())
            }
            Command::Start => {
                let params = self.controller.params();
                params.validate()?;
                let text = self.controller.start(params).await?;
                render_stage(Stage::FIRST, &text)
            }
            Command::Next => {
                let stage = self.controller.advance().await?;
                self.render_current(stage)
            }
            Command::Back => {
                let stage = self.controller.regress()?;
                self.render_current(stage)
            }
            Command::Regen => {
                let text = self.controller.regenerate().await?;
                let stage = self.controller.current_step().stage().unwrap_or(Stage::FIRST);
                render_stage(stage, &text)
            }
            Command::Show(stage) => {
                let stage = stage
                    .or_else(|| self.controller.current_step().stage())
                    .ok_or_else(|| AppError::Other("当前在参数表单，请指定阶段".to_string()))?;
                match self.controller.output(stage) {
                    Some(text) => render_stage(stage, &text),
                    None => format!("{} 尚未生成", stage.label()),
                }
            }
            Command::Edit { stage, file } => {
                let text = read_text(&file).await?;
                self.controller.edit_output(stage, text);
                format!("✏️ 已用 {} 覆盖 {}", file.display(), stage.label())
            }
            Command::Restart => {
                self.controller.start_over()?;
                "↩️ 已回到参数表单，参数保持不变".to_string()
            }
            Command::Save { name, force } => {
                if self.store.contains(&name) && !force {
                    warn!("配置 '{}' 已存在，未覆盖", name.trim());
                    format!("⚠️ 配置 '{}' 已存在，使用 save! {} 覆盖", name.trim(), name.trim())
                } else {
                    self.store.save(&name, &self.controller.params())?;
                    format!("💾 已保存配置 '{}'", name.trim())
                }
            }
            Command::Load(name) => {
                let params = self.store.load(&name)?;
                self.controller.set_params(params);
                format!("✓ 已读取配置 '{}'", name.trim())
            }
            Command::Delete(name) => {
                self.store.delete(&name)?;
                format!("🗑️ 已删除配置 '{}'", name.trim())
            }
            Command::List => {
                let names = self.store.list();
                if names.is_empty() {
                    "还没有保存的配置".to_string()
                } else {
                    names
                        .iter()
                        .map(|name| format!("  - {}", name))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Command::Quit => return Ok(Flow::Quit),
        };

        Ok(Flow::Continue(text))
    }

    fn render_current(&self, stage: Stage) -> String {
        match self.controller.snapshot().current_output() {
            Some(text) => render_stage(stage, text),
            None => format!("{} 尚未生成", stage.label()),
        }
    }

    fn render_status(&self) -> String {
        let run = self.controller.snapshot();
        log_result_summary(&run.results);

        let mut out = String::new();
        let _ = writeln!(out, "当前步骤: {}", run.current_step);
        for stage in Stage::ALL {
            let mark = if run.results.contains(stage) { "✅" } else { "⬜" };
            let cursor = if run.current_step == Step::Stage(stage) { " ◀" } else { "" };
            let _ = writeln!(out, "  {} {}{}", mark, stage.label(), cursor);
        }
        if let Some(stage) = run.loading_stage.filter(|_| run.is_loading) {
            let _ = writeln!(out, "⏳ {}", stage.loading_label());
        }
        if run.is_complete() {
            let _ = writeln!(out, "🎉 全部阶段已完成");
        }
        if let Some(err) = &run.last_error {
            let _ = writeln!(out, "❌ 最近错误: {}", err);
        }
        out.trim_end().to_string()
    }
}

fn render_stage(stage: Stage, text: &str) -> String {
    format!("{}\n{}\n{}", stage.label(), "─".repeat(60), text)
}

fn render_params(params: &InputParameters) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} / {} / {} / {} / {} phút",
        params.school_level, params.grade, params.subject, params.textbook, params.duration
    );
    for (name, q) in params.question_types() {
        let _ = writeln!(
            out,
            "  {}: {}% / {} điểm / {} câu",
            name, q.percentage, q.score, q.question_count
        );
    }
    let levels = &params.cognitive_levels;
    let _ = writeln!(
        out,
        "  NB {}% / TH {}% / VD {}% / VDC {}%",
        levels.nb, levels.th, levels.vd, levels.vdc
    );
    let _ = writeln!(out, "Nội dung:\n{}", params.knowledge_content);
    if !params.additional_requirements.trim().is_empty() {
        let _ = writeln!(out, "Yêu cầu bổ sung:\n{}", params.additional_requirements);
    }
    out.trim_end().to_string()
}

async fn read_text(path: &Path) -> AppResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Other(format!("无法读取文件 {}: {}", path.display(), e)))
}
