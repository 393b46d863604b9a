//! 生成结果集
//!
//! 每个阶段一个可选字段：`None` 表示尚未生成，`Some("")` 表示生成了空内容

use serde::{Deserialize, Serialize};

use super::stage::Stage;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_supplement: Option<String>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, stage: Stage) -> &Option<String> {
        match stage {
            Stage::Matrix => &self.matrix,
            Stage::Specification => &self.specification,
            Stage::Exam => &self.exam,
            Stage::AnswerKey => &self.answer_key,
            Stage::AnswerSupplement => &self.answer_supplement,
        }
    }

    fn slot_mut(&mut self, stage: Stage) -> &mut Option<String> {
        match stage {
            Stage::Matrix => &mut self.matrix,
            Stage::Specification => &mut self.specification,
            Stage::Exam => &mut self.exam,
            Stage::AnswerKey => &mut self.answer_key,
            Stage::AnswerSupplement => &mut self.answer_supplement,
        }
    }

    /// 获取某阶段的文本
    pub fn get(&self, stage: Stage) -> Option<&str> {
        self.slot(stage).as_deref()
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.slot(stage).is_some()
    }

    /// 写入某阶段的文本，返回旧值
    pub fn set(&mut self, stage: Stage, text: impl Into<String>) -> Option<String> {
        self.slot_mut(stage).replace(text.into())
    }

    pub fn remove(&mut self, stage: Stage) -> Option<String> {
        self.slot_mut(stage).take()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// 删除 `stage` 及其之后所有阶段的输出
    pub fn clear_from(&mut self, stage: Stage) {
        for &s in stage.downstream() {
            self.remove(s);
        }
    }

    /// 只保留严格位于 `stage` 之前的阶段
    pub fn before(&self, stage: Stage) -> ResultSet {
        let mut context = ResultSet::new();
        for &s in stage.predecessors() {
            if let Some(text) = self.get(s) {
                context.set(s, text);
            }
        }
        context
    }

    /// 第一个缺失输出的前置阶段
    pub fn first_missing_before(&self, stage: Stage) -> Option<Stage> {
        stage
            .predecessors()
            .iter()
            .copied()
            .find(|&s| !self.contains(s))
    }

    /// 已有输出的阶段（按流水线顺序）
    pub fn stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|&s| self.contains(s))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        Stage::ALL.iter().all(|&s| !self.contains(s))
    }

    pub fn len(&self) -> usize {
        self.stages().len()
    }
}
