use serde::{Deserialize, Serialize};

use super::exam::{EssayType, ExamType};

/// 一道历年真题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastPaper {
    pub year: u16,
    pub exam_type: ExamType,
    pub essay_type: EssayType,
    pub content: String,
}

impl PastPaper {
    /// 是否属于指定作文类型，且考试类型相同或为兜底类型
    pub fn matches_filter(&self, exam_type: ExamType, essay_type: EssayType) -> bool {
        self.essay_type == essay_type
            && (self.exam_type == exam_type || self.exam_type == super::exam::FALLBACK_EXAM_TYPE)
    }
}

/// 真题库
///
/// 顺序即文件中的顺序，查找时先出现的优先。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PastPaperCatalog {
    /// 数据版本号
    pub version: String,
    #[serde(default)]
    pub papers: Vec<PastPaper>,
}

impl PastPaperCatalog {
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PastPaper> {
        self.papers.iter()
    }
}
