//! 出题参数
//!
//! 一次生成运行的全部输入，字段名与保存的 JSON 保持 camelCase 兼容

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationIssue};

/// 这些科目不按题型分配分数，跳过题型合计校验
pub const SPECIAL_SUBJECTS: [&str; 2] = ["Ngoại ngữ 1 (Tiếng Anh)", "Ngữ văn"];

/// 试卷总分
pub const TOTAL_SCORE: f64 = 10.0;

/// 单个题型的分配
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTypeDistribution {
    /// 占比（%）
    pub percentage: u32,
    /// 分值
    pub score: f64,
    /// 题目数量
    pub question_count: u32,
}

impl QuestionTypeDistribution {
    pub fn new(percentage: u32, score: f64, question_count: u32) -> Self {
        Self {
            percentage,
            score,
            question_count,
        }
    }
}

/// 四个认知层级的占比（%）
///
/// NB 识记 / TH 理解 / VD 应用 / VDC 高阶应用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CognitiveLevels {
    pub nb: u32,
    pub th: u32,
    pub vd: u32,
    pub vdc: u32,
}

impl CognitiveLevels {
    /// 合计按 u64 计算，单项接近 u32::MAX 时不会回绕
    pub fn total(&self) -> u64 {
        [self.nb, self.th, self.vd, self.vdc]
            .iter()
            .map(|&v| u64::from(v))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputParameters {
    pub school_level: String,
    pub subject: String,
    pub grade: String,
    pub textbook: String,
    pub knowledge_content: String,
    /// 考试时长（分钟）
    pub duration: u32,
    pub multiple_choice: QuestionTypeDistribution,
    pub true_false: QuestionTypeDistribution,
    pub short_answer: QuestionTypeDistribution,
    pub essay: QuestionTypeDistribution,
    pub cognitive_levels: CognitiveLevels,
    #[serde(default)]
    pub additional_requirements: String,
}

impl Default for InputParameters {
    fn default() -> Self {
        Self {
            school_level: "Cấp 2".to_string(),
            subject: "Khoa học tự nhiên".to_string(),
            grade: "Lớp 7".to_string(),
            textbook: "Kết nối tri thức".to_string(),
            knowledge_content: [
                "Bài 6: Giới thiệu về liên kết hóa học",
                "Bài 7: Hóa trị và công thức hóa học",
                "Bài 15: Năng lượng ánh sáng. Tia sáng, vùng tối",
                "Bài 16: Sự phản xạ ánh sáng",
                "Bài 22: Quang hợp ở thực vật",
                "Bài 23: Một số yếu tố ảnh hưởng đến quang hợp",
            ]
            .join("\n"),
            duration: 60,
            multiple_choice: QuestionTypeDistribution::new(30, 3.0, 6),
            true_false: QuestionTypeDistribution::new(20, 2.0, 2),
            short_answer: QuestionTypeDistribution::new(20, 2.0, 4),
            essay: QuestionTypeDistribution::new(30, 3.0, 1),
            cognitive_levels: CognitiveLevels {
                nb: 40,
                th: 30,
                vd: 20,
                vdc: 10,
            },
            additional_requirements: String::new(),
        }
    }
}

impl InputParameters {
    /// 四种题型（按固定顺序）
    pub fn question_types(&self) -> [(&'static str, &QuestionTypeDistribution); 4] {
        [
            ("Trắc nghiệm", &self.multiple_choice),
            ("Đúng/Sai", &self.true_false),
            ("Trả lời ngắn", &self.short_answer),
            ("Tự luận", &self.essay),
        ]
    }

    /// 是否为不按题型分配的特殊科目
    pub fn is_special_subject(&self) -> bool {
        SPECIAL_SUBJECTS.contains(&self.subject.as_str())
    }

    /// 题型占比合计
    pub fn total_percentage(&self) -> u64 {
        if self.is_special_subject() {
            return 100;
        }
        self.question_types()
            .iter()
            .map(|(_, q)| u64::from(q.percentage))
            .sum()
    }

    /// 题型分值合计（保留两位小数）
    pub fn total_score(&self) -> f64 {
        if self.is_special_subject() {
            return TOTAL_SCORE;
        }
        let total: f64 = self.question_types().iter().map(|(_, q)| q.score).sum();
        (total * 100.0).round() / 100.0
    }

    /// 列出所有不满足的约束
    pub fn issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.subject.trim().is_empty() {
            issues.push(ValidationIssue::EmptyField { field: "subject" });
        }
        if self.grade.trim().is_empty() {
            issues.push(ValidationIssue::EmptyField { field: "grade" });
        }
        if self.duration == 0 {
            issues.push(ValidationIssue::ZeroDuration);
        }

        let percentage = self.total_percentage();
        if percentage != 100 {
            issues.push(ValidationIssue::QuestionTypePercentage { total: percentage });
        }

        let score = self.total_score();
        if (score - TOTAL_SCORE).abs() > 1e-9 {
            issues.push(ValidationIssue::TotalScore { total: score });
        }

        let cognitive = self.cognitive_levels.total();
        if cognitive != 100 {
            issues.push(ValidationIssue::CognitiveLevels { total: cognitive });
        }

        issues
    }

    /// 校验参数，开始生成前调用
    pub fn validate(&self) -> Result<(), ValidationError> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}
