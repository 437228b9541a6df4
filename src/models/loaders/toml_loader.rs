use std::collections::HashSet;
use std::path::Path;

use tokio::fs;

use crate::error::{AppResult, CatalogError, FileError};
use crate::models::paper::PastPaperCatalog;

/// 随程序一起发布的真题数据
const BUILTIN_CATALOG: &str = include_str!("../../../data/past_papers.toml");

/// 加载内置真题库
pub fn load_builtin_catalog() -> AppResult<PastPaperCatalog> {
    parse_catalog(BUILTIN_CATALOG, "<内置真题库>")
}

/// 从 TOML 文件加载真题库，替换内置数据
pub async fn load_catalog_file(path: &Path) -> AppResult<PastPaperCatalog> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| FileError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;

    let catalog = parse_catalog(&content, &path.display().to_string())?;
    tracing::info!(
        "已加载真题库 {} (版本 {}, 共 {} 道题)",
        path.display(),
        catalog.version,
        catalog.len()
    );
    Ok(catalog)
}

/// 解析并校验真题库文本
///
/// 内容为空的题目视为数据错误；同一 (年份, 考试类型, 作文类型) 重复出现时只告警，
/// 查找时以先出现的为准。
pub fn parse_catalog(text: &str, source_name: &str) -> AppResult<PastPaperCatalog> {
    let catalog: PastPaperCatalog =
        toml::from_str(text).map_err(|e| FileError::TomlParseFailed {
            path: source_name.to_string(),
            source: e,
        })?;

    let mut seen = HashSet::new();
    for (index, paper) in catalog.papers.iter().enumerate() {
        if paper.content.trim().is_empty() {
            return Err(CatalogError::InvalidData {
                reason: format!(
                    "第 {} 条 ({}年 {} {}) 内容为空",
                    index + 1,
                    paper.year,
                    paper.exam_type,
                    paper.essay_type
                ),
            }
            .into());
        }

        if !seen.insert((paper.year, paper.exam_type, paper.essay_type)) {
            tracing::warn!(
                "{}: {}年 {} {} 重复出现，仅第一条生效",
                source_name,
                paper.year,
                paper.exam_type,
                paper.essay_type
            );
        }
    }

    tracing::debug!("{}: 解析出 {} 道真题", source_name, catalog.len());
    Ok(catalog)
}
