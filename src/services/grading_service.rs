//! 作文批改服务 - 业务能力层
//!
//! 只负责"一次批改"能力：检查密钥 → 组装请求 → 调用模型 → 严格解析结果。
//!
//! ## 约定
//! - 单次调用，失败不重试
//! - 返回结果要么完整，要么是错误，不会出现半成品
//! - 满分由本地按考试类型计算后合并，不信任模型

use std::sync::OnceLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::clients::{
    GeminiClient, GenerateContentRequest, GenerationConfig, GenerativeModel, InlineData, Part,
    Turn,
};
use crate::config::Config;
use crate::error::GradingError;
use crate::models::content::Content;
use crate::models::grading::{DetailedFeedback, EssayConfig, GradingResult, ScoreBreakdown};
use crate::services::request_builder::{build_grading_request, GradingRequest};
use crate::services::rubric::{grading_schema, GRADING_TEMPERATURE, RUBRIC_TEXT};
use crate::utils::logging::truncate_text;

/// 作文批改服务
pub struct GradingService<M = GeminiClient> {
    model: M,
    api_key: Option<String>,
}

impl GradingService<GeminiClient> {
    /// 使用 Gemini 客户端创建批改服务
    pub fn new(config: &Config) -> Result<Self, GradingError> {
        Ok(Self::with_model(GeminiClient::new(config)?, config))
    }
}

impl<M: GenerativeModel> GradingService<M> {
    /// 使用自定义模型实现创建批改服务
    pub fn with_model(model: M, config: &Config) -> Self {
        Self {
            model,
            api_key: config.llm_api_key.clone().filter(|k| !k.trim().is_empty()),
        }
    }

    /// 批改一篇作文
    ///
    /// # 参数
    /// - `essay`: 作文内容（文本或图片）
    /// - `question`: 题目内容（文本或图片）
    /// - `config`: 考试类型、作文类型与题目
    ///
    /// # 返回
    /// 合并了满分的完整批改结果
    pub async fn grade(
        &self,
        essay: &Content,
        question: &Content,
        config: &EssayConfig,
    ) -> Result<GradingResult, GradingError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GradingError::MissingCredential)?;

        let request = build_grading_request(essay, question, config);
        info!(
            "📝 开始批改: {} - {} (满分 {}), 附件 {} 个",
            config.exam_type,
            config.essay_type,
            request.max_score,
            request.attachments.len()
        );
        if let Some(text) = essay.as_text() {
            debug!("作文预览: {}", truncate_text(text, 60));
        }

        let wire_request = self.to_wire_request(&request);
        let raw = self.model.generate(api_key, &wire_request).await?;

        let result = parse_grading_response(&raw, request.max_score)?;
        info!(
            "✓ 批改完成 (模型: {}): {} / {} {}",
            self.model.model_name(),
            result.total_score,
            result.max_score,
            result.band
        );
        if !result.is_score_in_range() {
            warn!(
                "模型给出的总分 {} 超出范围 [0, {}]",
                result.total_score, result.max_score
            );
        }

        Ok(result)
    }

    /// 转换为 Gemini 请求报文：图片在前，任务说明在最后
    fn to_wire_request(&self, request: &GradingRequest) -> GenerateContentRequest {
        let mut parts: Vec<Part> = request
            .attachments
            .iter()
            .map(|a| {
                Part::InlineData(InlineData {
                    mime_type: a.mime_type.clone(),
                    data: STANDARD.encode(&a.data),
                })
            })
            .collect();
        parts.push(Part::Text(request.instruction.clone()));

        GenerateContentRequest {
            system_instruction: Turn::system(RUBRIC_TEXT),
            contents: vec![Turn::user(parts)],
            generation_config: GenerationConfig {
                temperature: GRADING_TEMPERATURE,
                response_mime_type: "application/json".to_string(),
                response_schema: grading_schema(),
            },
        }
    }
}

/// 模型返回的结构（不含 maxScore）
///
/// 未知字段、缺失的必填字段、类型不符都会被拒绝。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GradingPayload {
    total_score: f64,
    band: String,
    breakdown: ScoreBreakdown,
    general_comment: String,
    detailed_feedback: Vec<DetailedFeedback>,
    corrected_text: String,
    improvement_suggestions: Vec<String>,
    #[serde(default)]
    ocr_text: Option<String>,
}

impl GradingPayload {
    fn into_result(self, max_score: u32) -> GradingResult {
        GradingResult {
            total_score: self.total_score,
            max_score,
            band: self.band,
            breakdown: self.breakdown,
            general_comment: self.general_comment,
            detailed_feedback: self.detailed_feedback,
            corrected_text: self.corrected_text,
            improvement_suggestions: self.improvement_suggestions,
            ocr_text: self.ocr_text.filter(|t| !t.trim().is_empty()),
        }
    }
}

/// 去掉可能包裹在外面的 Markdown 代码块
fn strip_code_fence(text: &str) -> &str {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    let fence = FENCE.get_or_init(|| Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").ok());

    fence
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
}

/// 解析模型返回的文本并合并满分
pub fn parse_grading_response(raw: &str, max_score: u32) -> Result<GradingResult, GradingError> {
    let body = strip_code_fence(raw).trim();
    if body.is_empty() {
        return Err(GradingError::malformed("模型没有返回任何内容"));
    }

    let payload: GradingPayload = serde_json::from_str(body).map_err(|e| {
        warn!("无法解析批改结果: {} (响应: {})", e, truncate_text(body, 200));
        GradingError::malformed(e.to_string())
    })?;

    Ok(payload.into_result(max_score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exam::{EssayType, ExamType};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 记录调用次数并返回固定内容的模型
    struct FakeModel {
        reply: Result<String, GradingError>,
        calls: AtomicUsize,
        last_request: Mutex<Option<GenerateContentRequest>>,
    }

    impl FakeModel {
        fn replying(reply: Result<String, GradingError>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl GenerativeModel for FakeModel {
        fn model_name(&self) -> &str {
            "fake"
        }

        async fn generate(
            &self,
            _api_key: &str,
            request: &GenerateContentRequest,
        ) -> Result<String, GradingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.reply.clone()
        }
    }

    fn config_with_key(key: Option<&str>) -> Config {
        Config {
            llm_api_key: key.map(str::to_string),
            ..Config::default()
        }
    }

    fn valid_reply() -> String {
        json!({
            "ocrText": "",
            "totalScore": 11,
            "band": "第四档",
            "breakdown": {"content": 80, "grammar": 70, "coherence": 75, "format": 90},
            "generalComment": "内容完整，语言较准确。",
            "detailedFeedback": [
                {"criterion": "内容要点", "score": 8, "comment": "要点齐全。"}
            ],
            "correctedText": "As is shown in the chart, ...",
            "improvementSuggestions": ["多使用复杂句。", "注意时态。", "结尾再升华。"]
        })
        .to_string()
    }

    fn essay_config() -> EssayConfig {
        EssayConfig::new(ExamType::EnglishII, EssayType::PartB, "Describe the chart.")
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_network() {
        let service =
            GradingService::with_model(FakeModel::replying(Ok(valid_reply())), &config_with_key(None));

        let err = service
            .grade(&Content::text("essay"), &Content::text("q"), &essay_config())
            .await
            .unwrap_err();

        assert_eq!(err, GradingError::MissingCredential);
        assert_eq!(service.model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_credential_counts_as_missing() {
        let service = GradingService::with_model(
            FakeModel::replying(Ok(valid_reply())),
            &config_with_key(Some("  ")),
        );
        let err = service
            .grade(&Content::text("essay"), &Content::text("q"), &essay_config())
            .await
            .unwrap_err();
        assert_eq!(err, GradingError::MissingCredential);
        assert_eq!(service.model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_grade_merges_max_score() {
        let service = GradingService::with_model(
            FakeModel::replying(Ok(valid_reply())),
            &config_with_key(Some("key")),
        );

        let result = service
            .grade(&Content::text("essay"), &Content::text("q"), &essay_config())
            .await
            .unwrap();

        assert_eq!(result.max_score, 15);
        assert_eq!(result.total_score, 11.0);
        assert_eq!(result.band, "第四档");
        assert_eq!(result.detailed_feedback.len(), 1);
        assert_eq!(result.improvement_suggestions.len(), 3);
        // 空 OCR 文本视为没有
        assert_eq!(result.ocr_text, None);
        assert_eq!(service.model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_wire_request_carries_rubric_schema_and_images() {
        let service = GradingService::with_model(
            FakeModel::replying(Ok(valid_reply())),
            &config_with_key(Some("key")),
        );

        service
            .grade(
                &Content::image(vec![0, 1, 2], "image/jpeg"),
                &Content::image(vec![9], "image/png"),
                &essay_config(),
            )
            .await
            .unwrap();

        let sent = service.model.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.system_instruction.parts, vec![Part::Text(RUBRIC_TEXT.to_string())]);
        assert!((sent.generation_config.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(sent.generation_config.response_mime_type, "application/json");
        assert_eq!(sent.generation_config.response_schema, grading_schema());

        let parts = &sent.contents[0].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[0],
            Part::InlineData(InlineData {
                mime_type: "image/png".to_string(),
                data: "CQ==".to_string(),
            })
        );
        assert_eq!(
            parts[1],
            Part::InlineData(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: "AAEC".to_string(),
            })
        );
        assert!(matches!(&parts[2], Part::Text(t) if t.contains("[IMAGE_2]")));
    }

    #[tokio::test]
    async fn test_temperature_ignores_environment_override() {
        let config = Config::default()
            .with_env_overrides(|name: &str| match name {
                "GEMINI_API_KEY" => Some("key".to_string()),
                "LLM_TEMPERATURE" => Some("1.5".to_string()),
                _ => None,
            })
            .unwrap();
        let service = GradingService::with_model(FakeModel::replying(Ok(valid_reply())), &config);

        service
            .grade(&Content::text("essay"), &Content::text("q"), &essay_config())
            .await
            .unwrap();

        let sent = service.model.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.generation_config.temperature, GRADING_TEMPERATURE);
        assert!((sent.generation_config.temperature - 0.4).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_empty_reply_is_malformed() {
        let service = GradingService::with_model(
            FakeModel::replying(Ok(String::new())),
            &config_with_key(Some("key")),
        );
        let err = service
            .grade(&Content::text("essay"), &Content::text("q"), &essay_config())
            .await
            .unwrap_err();
        assert!(matches!(err, GradingError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_model_errors_propagate_unchanged() {
        let service = GradingService::with_model(
            FakeModel::replying(Err(GradingError::InvalidCredential)),
            &config_with_key(Some("key")),
        );
        let err = service
            .grade(&Content::text("essay"), &Content::text("q"), &essay_config())
            .await
            .unwrap_err();
        assert_eq!(err, GradingError::InvalidCredential);
    }

    #[test]
    fn test_parse_rejects_unparsable_text() {
        let err = parse_grading_response("I think this essay deserves 12 points.", 15).unwrap_err();
        assert!(matches!(err, GradingError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_required_field() {
        let mut value: serde_json::Value = serde_json::from_str(&valid_reply()).unwrap();
        value.as_object_mut().unwrap().remove("correctedText");
        let err = parse_grading_response(&value.to_string(), 15).unwrap_err();
        assert!(matches!(err, GradingError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_rejects_wrong_types_and_unknown_fields() {
        let mut value: serde_json::Value = serde_json::from_str(&valid_reply()).unwrap();
        value["totalScore"] = json!("eleven");
        assert!(parse_grading_response(&value.to_string(), 15).is_err());

        let mut value: serde_json::Value = serde_json::from_str(&valid_reply()).unwrap();
        value["verdict"] = json!("pass");
        assert!(parse_grading_response(&value.to_string(), 15).is_err());

        let mut value: serde_json::Value = serde_json::from_str(&valid_reply()).unwrap();
        value["breakdown"] = json!({"content": 80, "grammar": 70});
        assert!(parse_grading_response(&value.to_string(), 15).is_err());
    }

    #[test]
    fn test_parse_accepts_code_fenced_json() {
        let fenced = format!("```json\n{}\n```", valid_reply());
        let result = parse_grading_response(&fenced, 10).unwrap();
        assert_eq!(result.max_score, 10);
    }

    #[test]
    fn test_parse_ignores_model_supplied_max_score() {
        let mut value: serde_json::Value = serde_json::from_str(&valid_reply()).unwrap();
        value["maxScore"] = json!(100);
        // maxScore 不在约定字段里，按未知字段拒绝
        assert!(parse_grading_response(&value.to_string(), 15).is_err());
    }
}
