/// Gemini API 客户端
///
/// 封装对 `models/{model}:generateContent` 的单次 HTTP 调用和错误翻译
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::generative_model::{GenerateContentRequest, GenerativeModel};
use crate::config::Config;
use crate::error::GradingError;

/// Gemini 客户端
pub struct GeminiClient {
    http: Client,
    api_base_url: String,
    model_name: String,
}

impl GeminiClient {
    /// 创建新的 Gemini 客户端
    pub fn new(config: &Config) -> Result<Self, GradingError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_base_url: config.llm_api_base_url.trim_end_matches('/').to_string(),
            model_name: config.llm_model_name.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url, self.model_name
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, GradingError> {
        debug!("调用 Gemini API，模型: {}", self.model_name);
        let timer = Instant::now();

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Gemini API 请求失败: {}", e);
                GradingError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(
            "Gemini API 返回 HTTP {} ({} 字节, 耗时 {} ms)",
            status.as_u16(),
            body.len(),
            timer.elapsed().as_millis()
        );

        if !status.is_success() {
            let err = translate_error(status.as_u16(), &body);
            warn!("Gemini API 调用失败: {}", err);
            return Err(err);
        }

        extract_text(&body)
    }
}

// ========== 响应报文 ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<Value>,
}

/// 拼接第一个候选结果中的全部文本片段
fn extract_text(body: &str) -> Result<String, GradingError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GradingError::malformed(format!("响应报文不是合法 JSON: {}", e)))?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Ok(String::new());
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            warn!("Gemini 结束原因: {}", reason);
        }
    }

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    Ok(text)
}

/// 把服务端错误翻译成批改错误
///
/// 密钥无效单独识别，其余一律视为传输错误。
fn translate_error(status: u16, body: &str) -> GradingError {
    let detail = serde_json::from_str::<ApiErrorBody>(body).ok().map(|b| b.error);

    let message = match &detail {
        Some(d) if !d.message.is_empty() => d.message.clone(),
        Some(d) => d.status.clone().unwrap_or_else(|| body.to_string()),
        None => body.to_string(),
    };

    let reason_is_invalid_key = detail.as_ref().is_some_and(|d| {
        d.details
            .iter()
            .any(|v| v.get("reason").and_then(Value::as_str) == Some("API_KEY_INVALID"))
    });

    if reason_is_invalid_key || is_invalid_key_message(&message) {
        return GradingError::InvalidCredential;
    }

    GradingError::transport(Some(status), message)
}

fn is_invalid_key_message(message: &str) -> bool {
    message.contains("API key not valid") || message.contains("API_KEY_INVALID")
}
