use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError, FileError};

/// 程序配置
///
/// 读取顺序：默认值 → 可选的 TOML 配置文件 → 环境变量。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    /// Gemini API 密钥；缺失时批改会在发请求前失败
    #[serde(skip)]
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 其他 ---
    /// 自定义真题库文件，不设置则使用内置数据
    pub catalog_file: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            request_timeout_secs: 120,
            catalog_file: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 默认值叠加环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides(|name| std::env::var(name).ok())
    }

    /// 读取配置文件（如果给出）并叠加环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件读取，缺省字段取默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| FileError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(config)
    }

    /// 用环境变量覆盖配置
    ///
    /// `lookup` 便于测试时注入变量表。
    pub fn with_env_overrides<F>(mut self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")) {
            self.llm_api_key = Some(key.trim().to_string());
        }
        if let Some(url) = non_empty("LLM_API_BASE_URL") {
            self.llm_api_base_url = url;
        }
        if let Some(model) = non_empty("LLM_MODEL_NAME") {
            self.llm_model_name = model;
        }
        if let Some(value) = non_empty("LLM_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("LLM_TIMEOUT_SECS", &value, "u64")?;
        }
        if let Some(value) = non_empty("VERBOSE_LOGGING") {
            self.verbose_logging = parse_env("VERBOSE_LOGGING", &value, "bool")?;
        }
        if let Some(path) = non_empty("CATALOG_FILE") {
            self.catalog_file = Some(PathBuf::from(path));
        }

        Ok(self)
    }

    /// 是否已配置 API 密钥
    pub fn has_credential(&self) -> bool {
        self.llm_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

fn parse_env<T: FromStr>(var_name: &str, value: &str, expected_type: &str) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: expected_type.to_string(),
        }
        .into()
    })
}
