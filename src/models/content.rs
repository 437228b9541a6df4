//! 题目 / 作文内容：文本或图片

use std::path::Path;

use tokio::fs;
use tracing::{debug, warn};

use crate::error::{AppResult, FileError};

/// 上传图片的建议大小上限（仅提示，不拦截）
pub const ADVISORY_IMAGE_LIMIT_BYTES: usize = 5 * 1024 * 1024;

/// 文本或图片内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Image { data: Vec<u8>, mime_type: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(text.into())
    }

    pub fn image(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Content::Image {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Content::Image { .. })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Image { .. } => None,
        }
    }

    /// 从文件读取图片，MIME 类型按扩展名推断
    pub async fn image_from_path(path: &Path) -> AppResult<Self> {
        let mime_type = guess_image_mime(path)?;

        let data = fs::read(path).await.map_err(|e| FileError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;

        if data.len() > ADVISORY_IMAGE_LIMIT_BYTES {
            warn!(
                "图片 {} 大小为 {:.1}MB，超过建议的 5MB",
                path.display(),
                data.len() as f64 / 1024.0 / 1024.0
            );
        }
        debug!("已读取图片 {} ({} 字节, {})", path.display(), data.len(), mime_type);

        Ok(Content::Image { data, mime_type })
    }

    /// 从文件读取文本
    pub async fn text_from_path(path: &Path) -> AppResult<Self> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| FileError::ReadFailed {
                path: path.display().to_string(),
                source: e,
            })?;
        Ok(Content::Text(text))
    }
}

/// 推断图片的 MIME 类型，非图片文件返回错误
pub fn guess_image_mime(path: &Path) -> AppResult<String> {
    let guessed = mime_guess::from_path(path).first();
    match guessed {
        Some(mime) if mime.type_() == mime_guess::mime::IMAGE => Ok(mime.essence_str().to_string()),
        other => Err(FileError::NotAnImage {
            path: path.display().to_string(),
            mime: other.map(|m| m.essence_str().to_string()),
        }
        .into()),
    }
}
