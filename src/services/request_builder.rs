//! 批改请求构建 - 业务能力层
//!
//! 纯函数：把题目 / 作文内容和考试配置组装成有序的附件列表和一段任务说明，
//! 不涉及任何网络调用。

use crate::models::content::Content;
use crate::models::grading::EssayConfig;

/// 附件对应的逻辑角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentRole {
    Question,
    Essay,
}

/// 随请求发送的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub role: AttachmentRole,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// 组装完成的批改请求
///
/// 附件顺序固定为题目图片在前、作文图片在后，任务说明放在最后。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingRequest {
    pub attachments: Vec<Attachment>,
    pub instruction: String,
    pub max_score: u32,
}

impl GradingRequest {
    /// 指定角色的附件在列表中的下标
    pub fn attachment_index(&self, role: AttachmentRole) -> Option<usize> {
        self.attachments.iter().position(|a| a.role == role)
    }

    /// 指定角色的附件在说明文字中的引用标记，例如 `[IMAGE_2]`
    pub fn placeholder_for(&self, role: AttachmentRole) -> Option<String> {
        self.attachment_index(role).map(image_placeholder)
    }
}

/// 第 index 个附件（从 0 开始）的引用标记
pub fn image_placeholder(index: usize) -> String {
    format!("[IMAGE_{}]", index + 1)
}

/// 构建批改请求
pub fn build_grading_request(
    essay: &Content,
    question: &Content,
    config: &EssayConfig,
) -> GradingRequest {
    let max_score = config.max_score();
    let mut attachments = Vec::with_capacity(2);

    let question_part = match question {
        Content::Text(text) => format!("题目要求 (Question/Prompt):\n\"{}\"", text),
        Content::Image { data, mime_type } => {
            let placeholder = push_attachment(
                &mut attachments,
                AttachmentRole::Question,
                data,
                mime_type,
            );
            format!(
                "题目要求见附图 {}。请识别图片中的文字说明及图表数据作为题目要求。",
                placeholder
            )
        }
    };

    let essay_part = match essay {
        Content::Text(text) => format!("学生的作文内容:\n\"{}\"", text),
        Content::Image { data, mime_type } => {
            let placeholder =
                push_attachment(&mut attachments, AttachmentRole::Essay, data, mime_type);
            format!(
                "学生的作文见附图 {}。请先进行OCR识别，然后对识别出的文本进行评分。",
                placeholder
            )
        }
    };

    let instruction = format!(
        r#"你正在批改考研英语作文: {exam} - {essay}.
该部分满分为 {max} 分。

{question_part}

{essay_part}

请严格按照系统指令中提供的考研英语评分细则进行分析。
1. 确定档次 (第一档 到 第五档)。
2. 给出具体的得分 (满分 {max})。
3. 提供内容、语法、连贯性、格式四个维度的评分 (归一化为0-100分，用于图表展示)。
4. 提供**中文**的整体评语 (generalComment)。
5. 提供详细的分项点评 (criterion, comment)，**必须使用中文**。
6. 提供修改后的英语文章 (correctedText)，修正语法和词汇错误。
7. 提供3-5条具体的**中文**改进建议 (improvementSuggestions)。"#,
        exam = config.exam_type,
        essay = config.essay_type,
        max = max_score,
        question_part = question_part,
        essay_part = essay_part,
    );

    GradingRequest {
        attachments,
        instruction,
        max_score,
    }
}

/// 追加附件并返回它的引用标记
fn push_attachment(
    attachments: &mut Vec<Attachment>,
    role: AttachmentRole,
    data: &[u8],
    mime_type: &str,
) -> String {
    attachments.push(Attachment {
        role,
        mime_type: mime_type.to_string(),
        data: data.to_vec(),
    });
    image_placeholder(attachments.len() - 1)
}
