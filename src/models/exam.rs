//! 考试类型与作文类型
//!
//! 两个枚举都是封闭集合，满分只由二者决定。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// 考试类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamType {
    /// 英语一
    #[serde(rename = "english_i")]
    EnglishI,
    /// 英语二
    #[serde(rename = "english_ii")]
    EnglishII,
}

/// 真题库以英语二为主，英语一缺数据时借用英语二的题目
pub const FALLBACK_EXAM_TYPE: ExamType = ExamType::EnglishII;

impl ExamType {
    pub const ALL: [ExamType; 2] = [ExamType::EnglishI, ExamType::EnglishII];

    /// 显示名称
    pub fn label(self) -> &'static str {
        match self {
            ExamType::EnglishI => "English I (英语一)",
            ExamType::EnglishII => "English II (英语二)",
        }
    }

    /// 中文简称
    pub fn short_name(self) -> &'static str {
        match self {
            ExamType::EnglishI => "英语一",
            ExamType::EnglishII => "英语二",
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ExamType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "1" | "i" | "english1" | "english_i" | "englishi" | "英语一" | "英一" => {
                Ok(ExamType::EnglishI)
            }
            "2" | "ii" | "english2" | "english_ii" | "englishii" | "英语二" | "英二" => {
                Ok(ExamType::EnglishII)
            }
            _ => Err(CatalogError::UnknownExamType(s.to_string())),
        }
    }
}

/// 作文类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EssayType {
    /// A 节，小作文
    PartA,
    /// B 节，大作文
    PartB,
}

impl EssayType {
    pub const ALL: [EssayType; 2] = [EssayType::PartA, EssayType::PartB];

    /// 显示名称
    pub fn label(self) -> &'static str {
        match self {
            EssayType::PartA => "Part A (小作文)",
            EssayType::PartB => "Part B (大作文)",
        }
    }
}

impl fmt::Display for EssayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for EssayType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "a" | "part_a" | "parta" | "小作文" | "a节" => Ok(EssayType::PartA),
            "b" | "part_b" | "partb" | "大作文" | "b节" => Ok(EssayType::PartB),
            _ => Err(CatalogError::UnknownEssayType(s.to_string())),
        }
    }
}

/// 计算该部分满分
///
/// A 节两种考试都是 10 分；B 节英语一 20 分，英语二 15 分。
pub fn max_score(exam_type: ExamType, essay_type: EssayType) -> u32 {
    match (essay_type, exam_type) {
        (EssayType::PartA, _) => 10,
        (EssayType::PartB, ExamType::EnglishI) => 20,
        (EssayType::PartB, ExamType::EnglishII) => 15,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_score_lookup() {
        assert_eq!(max_score(ExamType::EnglishI, EssayType::PartA), 10);
        assert_eq!(max_score(ExamType::EnglishII, EssayType::PartA), 10);
        assert_eq!(max_score(ExamType::EnglishI, EssayType::PartB), 20);
        assert_eq!(max_score(ExamType::EnglishII, EssayType::PartB), 15);
    }

    #[test]
    fn test_parse_exam_type_aliases() {
        assert_eq!("english-i".parse::<ExamType>().unwrap(), ExamType::EnglishI);
        assert_eq!("English I".parse::<ExamType>().unwrap(), ExamType::EnglishI);
        assert_eq!("英语二".parse::<ExamType>().unwrap(), ExamType::EnglishII);
        assert_eq!("2".parse::<ExamType>().unwrap(), ExamType::EnglishII);
        assert!("english iii".parse::<ExamType>().is_err());
    }

    #[test]
    fn test_parse_essay_type_aliases() {
        assert_eq!("a".parse::<EssayType>().unwrap(), EssayType::PartA);
        assert_eq!("Part B".parse::<EssayType>().unwrap(), EssayType::PartB);
        assert_eq!("小作文".parse::<EssayType>().unwrap(), EssayType::PartA);
        assert!("c".parse::<EssayType>().is_err());
    }

    #[test]
    fn test_serde_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&ExamType::EnglishII).unwrap(),
            "\"english_ii\""
        );
        assert_eq!(
            serde_json::to_string(&EssayType::PartA).unwrap(),
            "\"part_a\""
        );
    }
}
