//! 运行状态
//!
//! 控制器对外发布的唯一状态源，界面只读取快照，不持有副本

use serde::{Deserialize, Serialize};

use crate::models::{InputParameters, ResultSet, Stage, Step};

/// 一次生成运行的状态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub current_step: Step,
    pub results: ResultSet,
    /// 全局唯一的忙碌标记，不区分阶段
    pub is_loading: bool,
    pub loading_stage: Option<Stage>,
    /// 最近一次后端失败的原始信息
    pub last_error: Option<String>,
}

impl RunState {
    pub fn current_stage(&self) -> Option<Stage> {
        self.current_step.stage()
    }

    /// 最后一个阶段已有输出
    pub fn is_complete(&self) -> bool {
        self.results.contains(Stage::LAST)
    }

    /// 当前阶段的文本
    pub fn current_output(&self) -> Option<&str> {
        self.current_stage().and_then(|stage| self.results.get(stage))
    }
}

/// 控制器持有的完整状态：出题参数 + 运行状态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub params: InputParameters,
    pub run: RunState,
}

impl PipelineState {
    pub fn new(params: InputParameters) -> Self {
        Self {
            params,
            run: RunState::default(),
        }
    }
}
