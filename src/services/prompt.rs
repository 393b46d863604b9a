//! 提示词构建
//!
//! 每个阶段一个模板，只引用严格位于其之前的阶段

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{InputParameters, ResultSet, Stage};

const COMMON_RULES: &str = r"BẠN LÀ CHUYÊN GIA KHẢO THÍ. PHẢI TUÂN THỦ NGHIÊM NGẶT CÁC QUY TẮC SAU:
1. CHỈ TRẢ VỀ NỘI DUNG YÊU CẦU. KHÔNG chào hỏi, KHÔNG giải thích, KHÔNG ghi chú cuối bài.
2. CÔNG THỨC & KÝ HIỆU:
   - Công thức Hóa học và lũy thừa đơn giản (H₂O, CO₂, x², cm³) dùng ký tự Unicode chỉ số trực tiếp, KHÔNG dùng khối $.
   - Chỉ dùng $ cho phân số, căn thức, hệ phương trình hoặc biểu thức phức tạp.
   - Góc 1 chữ cái: $\hat{A}$. Góc 3 chữ cái: $\widehat{ABC}$.
3. TIÊU ĐỀ: Sử dụng CHỮ IN HOA ĐẬM cho các phần lớn.";

/// 系统消息
pub fn build_system_message(params: &InputParameters) -> String {
    let levels = &params.cognitive_levels;
    format!(
        r"Bạn là một AI chuyên nghiệp về giáo dục Việt Nam.
Nhiệm vụ của bạn là tạo ra các văn bản khảo thí chuẩn xác theo Công văn 7991.
PHẢI dùng Unicode cho chỉ số Hóa học và lũy thừa đơn giản (₂, ², ³ ...).
PHẢI dùng \hat{{A}} cho góc 1 chữ và \widehat{{ABC}} cho góc 3 chữ trong khối $.
Trả về nội dung thuần túy, không lời dẫn thừa.
Đảm bảo tỉ lệ phân bổ mức độ kiến thức trong Ma trận khớp chính xác: NB: {}%, TH: {}%, VD: {}%, VDC: {}%",
        levels.nb, levels.th, levels.vd, levels.vdc
    )
}

fn exam_info(params: &InputParameters) -> String {
    format!(
        "THÔNG TIN ĐỀ THI:
- Cấp học: {}
- Lớp: {}
- Môn học: {}
- Bộ sách: {}
- Thời gian: {} phút
- Nội dung: {}",
        params.school_level,
        params.grade,
        params.subject,
        params.textbook,
        params.duration,
        params.knowledge_content
    )
}

fn question_distribution(params: &InputParameters) -> String {
    let mut lines = vec!["CẤU TRÚC ĐIỂM & MỨC ĐỘ:".to_string()];
    for (name, q) in params.question_types() {
        lines.push(format!("- {}: {} câu, {} điểm", name, q.question_count, q.score));
    }
    let levels = &params.cognitive_levels;
    lines.push(format!(
        "- TỈ LỆ NHẬN THỨC: NB: {}%, TH: {}%, VD: {}%, VDC: {}%",
        levels.nb, levels.th, levels.vd, levels.vdc
    ));
    lines.push("- Tổng điểm: 10".to_string());
    lines.join("\n")
}

/// 构建某阶段的用户提示词
///
/// `context` 中缺失的阶段按空文本处理
pub fn build_stage_prompt(stage: Stage, params: &InputParameters, context: &ResultSet) -> String {
    let matrix = context.get(Stage::Matrix).unwrap_or_default();
    let specification = context.get(Stage::Specification).unwrap_or_default();
    let exam = context.get(Stage::Exam).unwrap_or_default();
    let levels = &params.cognitive_levels;

    let task = match stage {
        Stage::Matrix => format!(
            "NHIỆM VỤ: Lập MA TRẬN ĐỀ KIỂM TRA.
{}

{}

YÊU CẦU:
- Chỉ trả về duy nhất 1 bảng Markdown có đúng 7 cột: | STT | Nội dung / Đơn vị kiến thức | Mức độ nhận thức | Hình thức | Số câu | Số điểm | Tỉ lệ % |
- Đảm bảo tổng tỉ lệ các mức độ khớp với yêu cầu: NB: {}%, TH: {}%, VD: {}%, VDC: {}%",
            exam_info(params),
            question_distribution(params),
            levels.nb,
            levels.th,
            levels.vd,
            levels.vdc
        ),
        Stage::Specification => format!(
            "NHIỆM VỤ: Lập BẢN ĐẶC TẢ ĐỀ KIỂM TRA dựa trên Ma trận sau:
{}

YÊU CẦU: Chỉ trả về duy nhất 1 bảng Markdown có đúng 6 cột:
| Câu số | Nội dung / Đơn vị kiến thức | Yêu cầu cần đạt | Mức độ | Thời gian (phút) | Điểm |",
            matrix
        ),
        Stage::Exam => format!(
            "NHIỆM VỤ: Thiết kế ĐỀ KIỂM TRA chuẩn theo Công văn 7991.
{}

Dựa trên Ma trận: {}
Dựa trên Đặc tả: {}

YÊU CẦU:
- Nội dung phải chính xác, khoa học, thẩm mỹ.
- Cấu trúc gồm: Tiêu đề đề thi (Trường, Lớp, Mã đề, Thời gian), sau đó là các PHẦN câu hỏi.
- KHÔNG TRẢ VỀ BẢNG MA TRẬN HAY ĐẶC TẢ. CHỈ TRẢ VỀ NỘI DUNG ĐỀ THI.",
            exam_info(params),
            matrix,
            specification
        ),
        Stage::AnswerKey => format!(
            "NHIỆM VỤ: Lập ĐÁP ÁN & ĐIỂM dựa trên đề thi sau:
{}

YÊU CẦU: Chỉ trả về duy nhất 1 bảng Markdown có đúng 3 cột:
| Câu số | Lời giải/Đáp án | Điểm |",
            exam
        ),
        Stage::AnswerSupplement => format!(
            "NHIỆM VỤ: Viết LỜI GIẢI CHI TIẾT (HỌC THUẬT) cho từng câu hỏi trong đề thi sau:
{}

YÊU CẦU:
- Trình bày theo thứ tự từng câu hỏi.
- Phong cách học thuật, giải thích logic, sư phạm.
- TUYỆT ĐỐI KHÔNG ghi điểm số.
- KHÔNG chia bảng (trừ khi cần minh họa nội dung đặc thù).
- CHỈ TRẢ VỀ NỘI DUNG LỜI GIẢI.",
            exam
        ),
    };

    let mut prompt = format!("{}\n\n{}", COMMON_RULES, task);
    let extra = params.additional_requirements.trim();
    if !extra.is_empty() {
        prompt.push_str("\n\nYÊU CẦU BỔ SUNG:\n");
        prompt.push_str(extra);
    }
    prompt
}

fn fence_regex() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"^```(?:markdown|text|html)?\s*|```\s*$").ok())
        .as_ref()
}

/// 去掉模型可能包裹的代码块标记
pub fn strip_code_fence(text: &str) -> String {
    match fence_regex() {
        Some(fence) => fence.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}
