//! 生成后端接口
//!
//! 流水线只依赖这个 trait，具体实现（LLM、测试桩）由调用方注入

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::BackendError;
use crate::models::{InputParameters, ResultSet, Stage};

/// 生成后端
///
/// 给定阶段、出题参数和前置阶段的输出，返回该阶段的文本
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// 生成某个阶段的内容
    ///
    /// `context` 只包含严格位于 `stage` 之前的阶段
    async fn generate(
        &self,
        stage: Stage,
        params: &InputParameters,
        context: &ResultSet,
    ) -> Result<String, BackendError>;
}

#[async_trait]
impl<T: GenerationBackend + ?Sized> GenerationBackend for Arc<T> {
    async fn generate(
        &self,
        stage: Stage,
        params: &InputParameters,
        context: &ResultSet,
    ) -> Result<String, BackendError> {
        (**self).generate(stage, params, context).await
    }
}

#[async_trait]
impl<T: GenerationBackend + ?Sized> GenerationBackend for Box<T> {
    async fn generate(
        &self,
        stage: Stage,
        params: &InputParameters,
        context: &ResultSet,
    ) -> Result<String, BackendError> {
        (**self).generate(stage, params, context).await
    }
}
