//! 评分细则与返回结构约定
//!
//! 系统指令、响应 schema 和采样温度都是固定的，每次批改原样发送。

use serde_json::{json, Value};

/// 固定的低采样温度，让同一篇作文的评分尽量稳定
pub const GRADING_TEMPERATURE: f32 = 0.4;

/// 评分细则（作为系统指令发送）
pub const RUBRIC_TEXT: &str = r#"
你是一位严格的考研英语作文阅卷专家。请根据提供的图片或文本，对学生的作文进行评分。

**评分标准 (依据2025年考试大纲):**

**A节 (小作文):**
- 满分: 10分 (英语一 & 英语二)

**B节 (大作文):**
- 英语一满分: 20分
- 英语二满分: 15分

**分档评分细则:**

*   **第五档 (很好):**
    *   分数: A节 (9-10分), B节 (17-20分 [英一] / 13-15分 [英二]).
    *   标准: 包含并有效阐述所有内容要点；使用了丰富的语法结构和词汇；语法结构和词汇准确，错误极少；有效地使用了多种衔接手段，内容连贯、流畅，层次清晰；文体格式和语体恰当贴切。对目标读者完全产生了预期的效果。

*   **第四档 (较好):**
    *   分数: A节 (7-8分), B节 (13-16分 [英一] / 10-12分 [英二]).
    *   标准: 包含所有内容要点，少数要点未能有效阐述；使用了较丰富的语法结构和词汇；语言基本准确，只有在试图使用较复杂结构或较高级词汇时才有个别错误；比较有效地使用了些衔接手段，内容较连贯，层次较清晰；文体格式和语体较恰当。对目标读者产生了预期的效果。

*   **第三档 (基本完成):**
    *   分数: A节 (5-6分), B节 (9-12分 [英一] / 7-9分 [英二]).
    *   标准: 虽漏掉一些内容，但包含多数内容要点；语法结构和词汇基本满足任务的需求；存在一些语法结构或词汇错误，但基本不影响理解；使用了简单的衔接手段，内容基本连贯，层次基本清晰；文体格式和语体基本合理。对目标读者基本产生了预期的效果。

*   **第二档 (未能按要求完成):**
    *   分数: A节 (3-4分), B节 (5-8分 [英一] / 4-6分 [英二]).
    *   标准: 漏掉或未能有效阐述一些内容要点，写了一些无关内容；语法结构单调，词汇有限；存在较多语法结构或词汇错误，影响理解；未采用必要的衔接手段，内容缺乏连贯性；文体格式和语体不恰当。未能清楚地传达信息给读者。

*   **第一档 (未完成):**
    *   分数: A节 (1-2分), B节 (1-4分 [英一] / 1-3分 [英二]).
    *   标准: 明显遗漏主要内容，写了许多不相关的内容；语法结构很单调，词汇很有限；语言错误很多，内容很难理解；未使用任何衔接手段，内容不连贯，缺少组织、分段；无文体格式和语体概念。未能传达信息给读者。

*   **零档 (0分):**
    *   标准: 所传达的信息或所用语言太少，无法评价；内容与要求无关或无法辨认。
"#;

/// 模型必须返回的字段
pub const REQUIRED_FIELDS: [&str; 7] = [
    "totalScore",
    "band",
    "breakdown",
    "generalComment",
    "detailedFeedback",
    "correctedText",
    "improvementSuggestions",
];

/// 响应 schema（Gemini responseSchema 格式）
///
/// maxScore 不在其中，由本地按考试类型计算后合并。
pub fn grading_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "ocrText": {
                "type": "STRING",
                "description": "识别出的作文文本 (如果是图片输入) 及 题目关键信息。"
            },
            "totalScore": { "type": "NUMBER", "description": "最终得分。" },
            "band": { "type": "STRING", "description": "档次 (例如 '第五档', '第四档')。" },
            "breakdown": {
                "type": "OBJECT",
                "properties": {
                    "content": { "type": "NUMBER", "description": "内容得分 (0-100归一化)" },
                    "grammar": { "type": "NUMBER", "description": "语法得分 (0-100归一化)" },
                    "coherence": { "type": "NUMBER", "description": "连贯性得分 (0-100归一化)" },
                    "format": { "type": "NUMBER", "description": "格式/语域得分 (0-100归一化)" }
                },
                "required": ["content", "grammar", "coherence", "format"]
            },
            "generalComment": { "type": "STRING", "description": "整体中文评语。" },
            "detailedFeedback": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "criterion": { "type": "STRING", "description": "评分标准 (如: 内容要点)" },
                        "score": { "type": "NUMBER", "description": "该项得分 (1-10)" },
                        "comment": { "type": "STRING", "description": "具体的中文点评" }
                    },
                    "required": ["criterion", "score", "comment"]
                }
            },
            "correctedText": { "type": "STRING", "description": "修改后的英语作文全文。" },
            "improvementSuggestions": {
                "type": "ARRAY",
                "items": { "type": "STRING", "description": "具体的中文改进建议" }
            }
        },
        "required": REQUIRED_FIELDS
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_all_result_fields() {
        let schema = grading_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, REQUIRED_FIELDS);
        assert!(schema["properties"].get("maxScore").is_none());
        assert!(schema["properties"].get("ocrText").is_some());
    }

    #[test]
    fn test_rubric_mentions_all_maximums() {
        assert!(RUBRIC_TEXT.contains("满分: 10分"));
        assert!(RUBRIC_TEXT.contains("英语一满分: 20分"));
        assert!(RUBRIC_TEXT.contains("英语二满分: 15分"));
    }
}
