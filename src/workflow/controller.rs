//! 生成流水线控制器 - 流程层
//!
//! 核心职责：维护五个阶段的状态机
//!
//! 状态转换：
//! 1. start → 清空结果，进入 matrix 并生成
//! 2. advance → 下一阶段已有输出则直接跳转，否则生成后再跳转
//! 3. regress → 回到上一阶段，不修改结果
//! 4. regenerate → 删除当前及之后阶段，重新生成当前阶段
//! 5. edit_output → 直接覆盖某阶段文本，不调用后端
//! 6. start_over → 回到表单，保留参数
//!
//! 同一时刻最多只有一个后端调用：忙碌标记在 watch 通道内原子地检查并设置，
//! 由 `LoadingGuard` 在所有退出路径上清除。

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::PipelineError;
use crate::models::{InputParameters, ResultSet, Stage, Step};
use crate::utils::logging::log_stage_generated;
use crate::workflow::backend::GenerationBackend;
use crate::workflow::context::assemble_context;
use crate::workflow::run_state::{PipelineState, RunState};

/// 一次待执行的生成任务
struct Job {
    stage: Stage,
    params: InputParameters,
    context: ResultSet,
}

/// advance 的转换结果
enum Plan {
    /// 已完成跳转，无需生成
    Moved(Stage),
    /// 需要调用后端
    Generate(Job),
}

/// 状态转换的产物；需要生成时返回目标阶段，用于设置忙碌标记
trait Prepared {
    fn generating(&self) -> Option<Stage>;
}

impl Prepared for Job {
    fn generating(&self) -> Option<Stage> {
        Some(self.stage)
    }
}

impl Prepared for Plan {
    fn generating(&self) -> Option<Stage> {
        match self {
            Plan::Moved(_) => None,
            Plan::Generate(job) => Some(job.stage),
        }
    }
}

impl Prepared for Stage {
    fn generating(&self) -> Option<Stage> {
        None
    }
}

impl Prepared for () {
    fn generating(&self) -> Option<Stage> {
        None
    }
}

/// 生成流水线控制器
///
/// - 持有出题参数和运行状态（唯一状态源）
/// - 通过 `GenerationBackend` 生成各阶段内容
/// - 不关心界面如何展示
pub struct PipelineController<B> {
    backend: B,
    state: watch::Sender<PipelineState>,
}

impl<B: GenerationBackend> PipelineController<B> {
    /// 创建控制器，初始处于表单状态
    pub fn new(backend: B, params: InputParameters) -> Self {
        let (state, _) = watch::channel(PipelineState::new(params));
        Self { backend, state }
    }

    // ========== 状态读取 ==========

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// 当前运行状态的快照
    pub fn snapshot(&self) -> RunState {
        self.state.borrow().run.clone()
    }

    pub fn params(&self) -> InputParameters {
        self.state.borrow().params.clone()
    }

    pub fn current_step(&self) -> Step {
        self.state.borrow().run.current_step
    }

    pub fn results(&self) -> ResultSet {
        self.state.borrow().run.results.clone()
    }

    /// 某阶段的文本
    pub fn output(&self, stage: Stage) -> Option<String> {
        self.state.borrow().run.results.get(stage).map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().run.is_loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().run.last_error.clone()
    }

    // ========== 状态转换 ==========

    /// 用新参数开始一次运行
    ///
    /// 丢弃之前的全部结果，进入 matrix 并立即生成。
    /// 失败时停留在 matrix，记录错误，可用相同或修改后的参数重试。
    pub async fn start(&self, params: InputParameters) -> Result<String, PipelineError> {
        info!(
            "🚀 开始新的生成流程: {} / {} / {}",
            params.school_level, params.grade, params.subject
        );

        let job = self.begin("start", move |state| {
            state.params = params;
            state.run.results.clear();
            state.run.current_step = Step::Stage(Stage::FIRST);
            Ok(Job {
                stage: Stage::FIRST,
                params: state.params.clone(),
                context: ResultSet::new(),
            })
        })?;

        self.execute(job, |_| {}).await
    }

    /// 前进到下一阶段
    ///
    /// 下一阶段已有输出时直接跳转，不会隐式重新生成。
    /// 生成失败时停留在当前阶段。
    pub async fn advance(&self) -> Result<Stage, PipelineError> {
        let plan = self.begin("advance", |state| {
            let from = state.run.current_step;
            let current = from.stage().ok_or(PipelineError::InvalidTransition {
                action: "advance",
                from,
            })?;
            let next = current.next().ok_or(PipelineError::InvalidTransition {
                action: "advance",
                from,
            })?;

            if state.run.results.contains(next) {
                state.run.current_step = Step::Stage(next);
                return Ok(Plan::Moved(next));
            }

            if let Some(missing) = state.run.results.first_missing_before(next) {
                return Err(PipelineError::MissingPrerequisite { stage: missing });
            }

            Ok(Plan::Generate(Job {
                stage: next,
                params: state.params.clone(),
                context: assemble_context(&state.run.results, next),
            }))
        })?;

        match plan {
            Plan::Moved(next) => {
                info!("➡️ 跳转到 {}（已有输出，不重新生成）", next);
                Ok(next)
            }
            Plan::Generate(job) => {
                let next = job.stage;
                self.execute(job, move |run| run.current_step = Step::Stage(next))
                    .await?;
                info!("➡️ 跳转到 {}", next);
                Ok(next)
            }
        }
    }

    /// 回到上一阶段，不修改结果，不调用后端
    pub fn regress(&self) -> Result<Stage, PipelineError> {
        let prev = self.begin("regress", |state| {
            let from = state.run.current_step;
            let prev = from
                .stage()
                .and_then(Stage::prev)
                .ok_or(PipelineError::InvalidTransition {
                    action: "regress",
                    from,
                })?;
            state.run.current_step = Step::Stage(prev);
            Ok(prev)
        })?;

        info!("⬅️ 返回到 {}", prev);
        Ok(prev)
    }

    /// 重新生成当前阶段
    ///
    /// 先删除当前及之后所有阶段的输出，后续阶段要等再次 advance 时才会重新生成。
    pub async fn regenerate(&self) -> Result<String, PipelineError> {
        let job = self.begin("regenerate", |state| {
            let from = state.run.current_step;
            let current = from.stage().ok_or(PipelineError::InvalidTransition {
                action: "regenerate",
                from,
            })?;

            if let Some(missing) = state.run.results.first_missing_before(current) {
                return Err(PipelineError::MissingPrerequisite { stage: missing });
            }

            let context = assemble_context(&state.run.results, current);
            state.run.results.clear_from(current);
            debug!("已清除 {} 及之后阶段的输出", current);

            Ok(Job {
                stage: current,
                params: state.params.clone(),
                context,
            })
        })?;

        info!("🔄 重新生成 {}", job.stage);
        self.execute(job, |_| {}).await
    }

    /// 手动覆盖某阶段的文本
    ///
    /// 任何时候都可调用，不影响其他阶段，不清除错误，不做校验
    pub fn edit_output(&self, stage: Stage, text: impl Into<String>) {
        let text = text.into();
        info!("✏️ 手动修改 {}，共 {} 字符", stage, text.chars().count());
        self.state.send_modify(|state| {
            state.run.results.set(stage, text);
        });
    }

    /// 回到表单，清空结果和错误，保留参数
    pub fn start_over(&self) -> Result<(), PipelineError> {
        self.begin("start_over", |state| {
            state.run.current_step = Step::Form;
            state.run.results.clear();
            state.run.last_error = None;
            Ok(())
        })?;
        info!("↩️ 已回到参数表单");
        Ok(())
    }

    /// 替换出题参数，不会使已有结果失效
    pub fn set_params(&self, params: InputParameters) {
        if !self.state.borrow().run.results.is_empty() {
            warn!("⚠️ 已有生成结果，修改参数不会自动重新生成");
        }
        self.state.send_modify(|state| state.params = params);
    }

    // ========== 内部实现 ==========

    /// 原子地检查忙碌标记并执行状态转换
    ///
    /// `prepare` 返回错误时不得修改状态。
    fn begin<T, F>(&self, action: &'static str, prepare: F) -> Result<T, PipelineError>
    where
        T: Prepared,
        F: FnOnce(&mut PipelineState) -> Result<T, PipelineError>,
    {
        // 闭包总会被同步调用一次，这里的初始值只是占位
        let mut outcome = Err(PipelineError::InvalidTransition {
            action,
            from: Step::Form,
        });

        self.state.send_if_modified(|state| {
            if state.run.is_loading {
                outcome = Err(PipelineError::Busy {
                    stage: state.run.loading_stage.unwrap_or(Stage::FIRST),
                });
                return false;
            }

            let result = prepare(state);
            if let Some(stage) = result.as_ref().ok().and_then(Prepared::generating) {
                state.run.is_loading = true;
                state.run.loading_stage = Some(stage);
                state.run.last_error = None;
            }
            let modified = result.is_ok();
            outcome = result;
            modified
        });

        if let Err(e) = &outcome {
            warn!("⚠️ 无法执行 {}: {}", action, e);
        }
        outcome
    }

    /// 调用后端并提交结果
    ///
    /// 成功时写入完整输出并执行 `on_success`；失败时只记录错误，不写入任何输出。
    async fn execute<F>(&self, job: Job, on_success: F) -> Result<String, PipelineError>
    where
        F: FnOnce(&mut RunState),
    {
        let guard = LoadingGuard::new(&self.state);
        info!("⏳ {}", job.stage.loading_label());
        debug!(
            "生成 {}，上下文阶段: {:?}",
            job.stage,
            job.context.stages()
        );

        match self
            .backend
            .generate(job.stage, &job.params, &job.context)
            .await
        {
            Ok(text) => {
                log_stage_generated(job.stage, &text);
                guard.finish(|run| {
                    run.results.set(job.stage, text.as_str());
                    on_success(run);
                });
                Ok(text)
            }
            Err(err) => {
                error!("❌ {} 生成失败: {}", job.stage, err);
                guard.finish(|run| {
                    run.last_error = Some(err.message.clone());
                });
                Err(err.into())
            }
        }
    }
}

/// 忙碌标记守卫
///
/// 正常结束时由 `finish` 清除；future 被丢弃时由 `Drop` 清除
struct LoadingGuard<'a> {
    state: &'a watch::Sender<PipelineState>,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a watch::Sender<PipelineState>) -> Self {
        Self { state, armed: true }
    }

    /// 提交修改并清除忙碌标记（一次通知）
    fn finish<F: FnOnce(&mut RunState)>(mut self, commit: F) {
        self.armed = false;
        self.state.send_modify(|state| {
            commit(&mut state.run);
            state.run.is_loading = false;
            state.run.loading_stage = None;
        });
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_modify(|state| {
                state.run.is_loading = false;
                state.run.loading_stage = None;
            });
        }
    }
}
