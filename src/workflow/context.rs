//! 生成上下文组装

use crate::models::{ResultSet, Stage};

/// 组装 `stage` 的生成上下文
///
/// 只包含严格位于 `stage` 之前的阶段，不含自身旧输出，也不含后续阶段。
/// `matrix` 的上下文永远为空。
pub fn assemble_context(results: &ResultSet, stage: Stage) -> ResultSet {
    results.before(stage)
}
