use serde::{Deserialize, Serialize};

/// 生成阶段
///
/// 五个阶段的顺序固定，后一阶段的生成依赖前面所有阶段的输出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// 考试矩阵
    Matrix,
    /// 考试细目表
    Specification,
    /// 试卷正文
    Exam,
    /// 答案与评分
    AnswerKey,
    /// 详细解析
    AnswerSupplement,
}

impl Stage {
    /// 全部阶段，按流水线顺序排列
    pub const ALL: [Stage; 5] = [
        Stage::Matrix,
        Stage::Specification,
        Stage::Exam,
        Stage::AnswerKey,
        Stage::AnswerSupplement,
    ];

    /// 第一个阶段
    pub const FIRST: Stage = Stage::Matrix;

    /// 最后一个阶段
    pub const LAST: Stage = Stage::AnswerSupplement;

    /// 在流水线中的位置（从0开始）
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 下一个阶段，最后一个阶段返回 None
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// 上一个阶段，第一个阶段返回 None
    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// 严格位于当前阶段之前的所有阶段
    pub fn predecessors(self) -> &'static [Stage] {
        &Self::ALL[..self.index()]
    }

    /// 当前阶段及其之后的所有阶段
    pub fn downstream(self) -> &'static [Stage] {
        &Self::ALL[self.index()..]
    }

    /// 阶段标识（与存储格式一致）
    pub fn tag(self) -> &'static str {
        match self {
            Stage::Matrix => "matrix",
            Stage::Specification => "specification",
            Stage::Exam => "exam",
            Stage::AnswerKey => "answerKey",
            Stage::AnswerSupplement => "answerSupplement",
        }
    }

    /// 界面显示名称
    pub fn label(self) -> &'static str {
        match self {
            Stage::Matrix => "Bước 1: Ma trận đề",
            Stage::Specification => "Bước 2: Bản đặc tả",
            Stage::Exam => "Bước 3: Đề kiểm tra",
            Stage::AnswerKey => "Bước 4: Đáp án & Điểm",
            Stage::AnswerSupplement => "Bước 5: Lời giải chi tiết",
        }
    }

    /// 生成过程中显示的提示
    pub fn loading_label(self) -> &'static str {
        match self {
            Stage::Matrix => "Đang tạo Ma trận đề...",
            Stage::Specification => "Đang tạo Bản đặc tả...",
            Stage::Exam => "Đang tạo Đề kiểm tra...",
            Stage::AnswerKey => "Đang tạo Đáp án & Điểm...",
            Stage::AnswerSupplement => "Đang tạo Lời giải chi tiết...",
        }
    }

    /// 从标识解析阶段（忽略大小写）
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.tag().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// 向导当前所处的步骤：参数表单或某个生成阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "step", content = "stage")]
pub enum Step {
    #[default]
    Form,
    Stage(Stage),
}

impl Step {
    pub fn stage(self) -> Option<Stage> {
        match self {
            Step::Form => None,
            Step::Stage(stage) => Some(stage),
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Form => write!(f, "form"),
            Step::Stage(stage) => write!(f, "{}", stage),
        }
    }
}
