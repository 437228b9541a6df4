use thiserror::Error;

use crate::models::exam::{EssayType, ExamType};

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 批改相关错误
    #[error(transparent)]
    Grading(#[from] GradingError),
    /// 真题库错误
    #[error("真题库错误: {0}")]
    Catalog(#[from] CatalogError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 批改流程错误
///
/// 所有变体都只对应一条面向用户的提示，不做自动重试。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GradingError {
    /// 提交前的本地校验失败，不会发起网络请求
    #[error("{0}")]
    Validation(String),
    /// 未配置 API 密钥
    #[error("API Key缺失。请在环境变量 GEMINI_API_KEY（或 API_KEY）中设置 Google Gemini API 密钥后重试。")]
    MissingCredential,
    /// 服务端拒绝了 API 密钥
    #[error("API密钥无效。您提供的密钥无法通过Google的验证。请确认环境变量 GEMINI_API_KEY 是一个有效的 Google Gemini API 密钥（通常不是以 'sk-' 开头），可前往 Google AI Studio 获取。")]
    InvalidCredential,
    /// 请求成功但返回内容为空或不符合约定结构
    #[error("模型返回内容无法解析: {reason}")]
    MalformedResponse { reason: String },
    /// 其他网络或服务端错误
    #[error("请求评分服务失败{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Transport {
        status: Option<u16>,
        message: String,
    },
}

/// 真题库错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// 当前筛选条件下没有任何真题
    #[error("暂无该类型的真题，请手动输入题目。({exam_type} {essay_type})")]
    NoCandidates {
        exam_type: ExamType,
        essay_type: EssayType,
    },
    /// 真题数据不合法
    #[error("真题数据不合法: {reason}")]
    InvalidData { reason: String },
    #[error("无法识别的考试类型: {0}")]
    UnknownExamType(String),
    #[error("无法识别的作文类型: {0}")]
    UnknownEssayType(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 不是图片文件
    #[error("不是可识别的图片文件 ({path}), 类型: {}", .mime.as_deref().unwrap_or("未知"))]
    NotAnImage { path: String, mime: Option<String> },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl GradingError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        GradingError::MalformedResponse {
            reason: reason.into(),
        }
    }

    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        GradingError::Transport {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GradingError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            format!("请求超时: {}", err)
        } else {
            err.to_string()
        };
        GradingError::Transport { status, message }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
