//! 评分档次
//!
//! 档次名称和分数区间来自考研英语作文评分细则。

use std::fmt;

use super::exam::{EssayType, ExamType};

/// 评分档次（零档到第五档）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    Zero,
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl Band {
    /// 从高到低排列
    pub const DESCENDING: [Band; 6] = [
        Band::Fifth,
        Band::Fourth,
        Band::Third,
        Band::Second,
        Band::First,
        Band::Zero,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Band::Zero => "零档",
            Band::First => "第一档",
            Band::Second => "第二档",
            Band::Third => "第三档",
            Band::Fourth => "第四档",
            Band::Fifth => "第五档",
        }
    }

    /// 档次的一句话描述
    pub fn summary(self) -> &'static str {
        match self {
            Band::Zero => "无法评价",
            Band::First => "未完成",
            Band::Second => "未能按要求完成",
            Band::Third => "基本完成",
            Band::Fourth => "较好",
            Band::Fifth => "很好",
        }
    }

    /// 该档次在指定部分的分数区间（闭区间）
    pub fn score_range(self, exam_type: ExamType, essay_type: EssayType) -> (u32, u32) {
        match essay_type {
            EssayType::PartA => match self {
                Band::Fifth => (9, 10),
                Band::Fourth => (7, 8),
                Band::Third => (5, 6),
                Band::Second => (3, 4),
                Band::First => (1, 2),
                Band::Zero => (0, 0),
            },
            EssayType::PartB => match (exam_type, self) {
                (ExamType::EnglishI, Band::Fifth) => (17, 20),
                (ExamType::EnglishI, Band::Fourth) => (13, 16),
                (ExamType::EnglishI, Band::Third) => (9, 12),
                (ExamType::EnglishI, Band::Second) => (5, 8),
                (ExamType::EnglishI, Band::First) => (1, 4),
                (ExamType::EnglishII, Band::Fifth) => (13, 15),
                (ExamType::EnglishII, Band::Fourth) => (10, 12),
                (ExamType::EnglishII, Band::Third) => (7, 9),
                (ExamType::EnglishII, Band::Second) => (4, 6),
                (ExamType::EnglishII, Band::First) => (1, 3),
                (_, Band::Zero) => (0, 0),
            },
        }
    }

    /// 根据分数推算参考档次
    ///
    /// 取下限不超过该分数的最高档；小数分（如 12.5）归入下限所在的档。
    pub fn for_score(score: f64, exam_type: ExamType, essay_type: EssayType) -> Band {
        Band::DESCENDING
            .into_iter()
            .find(|band| {
                let (low, _) = band.score_range(exam_type, essay_type);
                *band != Band::Zero && score >= f64::from(low)
            })
            .unwrap_or(Band::Zero)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.summary())
    }
}
