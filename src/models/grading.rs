//! 批改配置与批改结果

use serde::{Deserialize, Serialize};

use super::band::Band;
use super::exam::{max_score, EssayType, ExamType};

/// 单次批改的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayConfig {
    pub exam_type: ExamType,
    pub essay_type: EssayType,
    pub question: String,
}

impl EssayConfig {
    pub fn new(exam_type: ExamType, essay_type: EssayType, question: impl Into<String>) -> Self {
        Self {
            exam_type,
            essay_type,
            question: question.into(),
        }
    }

    /// 该部分满分
    pub fn max_score(&self) -> u32 {
        max_score(self.exam_type, self.essay_type)
    }
}

/// 四个维度的归一化得分（0-100，用于图表展示）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreBreakdown {
    pub content: f64,
    pub grammar: f64,
    pub coherence: f64,
    pub format: f64,
}

impl ScoreBreakdown {
    /// (维度名称, 得分)，按展示顺序
    pub fn dimensions(&self) -> [(&'static str, f64); 4] {
        [
            ("内容 (Content)", self.content),
            ("语法 (Grammar)", self.grammar),
            ("连贯 (Coherence)", self.coherence),
            ("格式 (Format)", self.format),
        ]
    }
}

/// 分项点评
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedFeedback {
    /// 评分标准（如：内容要点）
    pub criterion: String,
    /// 该项得分，通常在 0-10 之间
    pub score: f64,
    pub comment: String,
}

/// 完整的批改结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    pub total_score: f64,
    pub max_score: u32,
    /// 模型给出的档次描述，例如 "第四档"
    pub band: String,
    pub breakdown: ScoreBreakdown,
    pub general_comment: String,
    pub detailed_feedback: Vec<DetailedFeedback>,
    pub corrected_text: String,
    pub improvement_suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
}

impl GradingResult {
    /// 得分占满分的比例
    pub fn score_ratio(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        self.total_score / f64::from(self.max_score)
    }

    /// 总分是否落在 [0, maxScore] 之内（只用于提示，不做校验）
    pub fn is_score_in_range(&self) -> bool {
        self.total_score >= 0.0 && self.total_score <= f64::from(self.max_score)
    }

    /// 按总分推算的参考档次
    pub fn reference_band(&self, exam_type: ExamType, essay_type: EssayType) -> Band {
        Band::for_score(self.total_score, exam_type, essay_type)
    }
}
