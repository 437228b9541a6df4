//! 真题选择服务 - 业务能力层
//!
//! 只负责"从真题库里找题"，纯函数，不持有任何界面状态。

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::error::CatalogError;
use crate::models::exam::{EssayType, ExamType, FALLBACK_EXAM_TYPE};
use crate::models::paper::{PastPaper, PastPaperCatalog};

/// 按年份查找的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperLookup<'a> {
    /// 找到了对应真题
    Found(&'a PastPaper),
    /// 没有数据，附带提示文本（不是错误）
    Missing(String),
}

impl PaperLookup<'_> {
    /// 用于填入题目输入框的文本
    pub fn text(&self) -> &str {
        match self {
            PaperLookup::Found(paper) => &paper.content,
            PaperLookup::Missing(placeholder) => placeholder,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PaperLookup::Found(_))
    }
}

/// 真题选择服务
pub struct PaperSelector {
    catalog: PastPaperCatalog,
}

impl PaperSelector {
    pub fn new(catalog: PastPaperCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PastPaperCatalog {
        &self.catalog
    }

    /// 按 (年份, 考试类型, 作文类型) 查找真题
    ///
    /// 年份与作文类型必须相同，考试类型相同或为兜底类型（英语二）即可。
    /// 多条命中时取真题库中第一条。
    pub fn select(&self, year: u16, exam_type: ExamType, essay_type: EssayType) -> PaperLookup<'_> {
        let found = self
            .catalog
            .iter()
            .find(|p| p.year == year && p.matches_filter(exam_type, essay_type));

        match found {
            Some(paper) => {
                if paper.exam_type != exam_type {
                    debug!(
                        "{}年 {} 无专属真题，使用 {} 的题目",
                        year, exam_type, paper.exam_type
                    );
                }
                PaperLookup::Found(paper)
            }
            None => PaperLookup::Missing(missing_placeholder(year, exam_type, essay_type)),
        }
    }

    /// 当前筛选条件下的所有候选真题
    pub fn candidates(&self, exam_type: ExamType, essay_type: EssayType) -> Vec<&PastPaper> {
        self.catalog
            .iter()
            .filter(|p| p.matches_filter(exam_type, essay_type))
            .collect()
    }

    /// 从候选真题中随机抽一道
    pub fn random<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        exam_type: ExamType,
        essay_type: EssayType,
    ) -> Result<&PastPaper, CatalogError> {
        let candidates = self.candidates(exam_type, essay_type);
        debug!("随机真题候选数量: {}", candidates.len());

        candidates
            .choose(rng)
            .copied()
            .ok_or(CatalogError::NoCandidates {
                exam_type,
                essay_type,
            })
    }

    /// 真题库中出现过的年份，从新到旧
    pub fn available_years(&self) -> Vec<u16> {
        let mut years: Vec<u16> = self.catalog.iter().map(|p| p.year).collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        years
    }
}

/// 没有真题数据时的提示文本
pub fn missing_placeholder(year: u16, exam_type: ExamType, essay_type: EssayType) -> String {
    format!("暂无 {}年 {} {} 的真题数据。", year, exam_type, essay_type)
}
