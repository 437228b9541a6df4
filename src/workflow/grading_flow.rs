//! 批改流程驱动 - 流程层
//!
//! 执行 `Session` 返回的副作用，并把结果派发回会话：
//! 1. ReadImage → 异步读取图片 → ImageLoaded
//! 2. Grade → 调用批改服务 → GradingFinished
//!
//! 无论批改成功与否，都会派发 GradingFinished，忙碌标记一定会被清除。

use rand::Rng;
use tracing::{error, info};

use crate::clients::{GeminiClient, GenerativeModel};
use crate::models::content::Content;
use crate::services::grading_service::GradingService;
use crate::workflow::session::{Action, Effect, Session};

/// 批改流程
pub struct GradingFlow<M = GeminiClient> {
    grading_service: GradingService<M>,
}

impl<M: GenerativeModel> GradingFlow<M> {
    pub fn new(grading_service: GradingService<M>) -> Self {
        Self { grading_service }
    }

    /// 派发一个动作，并执行由它引起的全部副作用
    pub async fn dispatch<R: Rng>(&self, session: &mut Session<R>, action: Action) {
        let mut next = session.dispatch(action);
        while let Some(effect) = next {
            let follow_up = self.run_effect(effect).await;
            next = session.dispatch(follow_up);
        }
    }

    /// 执行单个副作用，返回需要派发回会话的动作
    pub async fn run_effect(&self, effect: Effect) -> Action {
        match effect {
            Effect::ReadImage { token, path } => {
                let result = Content::image_from_path(&path).await;
                Action::ImageLoaded { token, result }
            }
            Effect::Grade(submission) => {
                info!(
                    "📤 提交批改: {} - {}",
                    submission.config.exam_type, submission.config.essay_type
                );
                let outcome = self
                    .grading_service
                    .grade(&submission.essay, &submission.question, &submission.config)
                    .await;
                if let Err(e) = &outcome {
                    error!("❌ 批改失败: {}", e);
                }
                Action::GradingFinished(outcome)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::GenerateContentRequest;
    use crate::config::Config;
    use crate::error::GradingError;
    use crate::models::loaders::load_builtin_catalog;
    use crate::services::paper_selector::PaperSelector;
    use crate::workflow::session::{ImageSlot, InputMode};
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use std::path::PathBuf;

    struct ScriptedModel(Result<String, GradingError>);

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            _api_key: &str,
            _request: &GenerateContentRequest,
        ) -> Result<String, GradingError> {
            self.0.clone()
        }
    }

    fn flow(reply: Result<String, GradingError>) -> GradingFlow<ScriptedModel> {
        let config = Config {
            llm_api_key: Some("key".to_string()),
            ..Config::default()
        };
        GradingFlow::new(GradingService::with_model(ScriptedModel(reply), &config))
    }

    fn session() -> Session<StdRng> {
        Session::with_rng(
            PaperSelector::new(load_builtin_catalog().unwrap()),
            StdRng::seed_from_u64(3),
        )
    }

    fn reply() -> String {
        json!({
            "totalScore": 8.5,
            "band": "第三档",
            "breakdown": {"content": 70, "grammar": 60, "coherence": 65, "format": 80},
            "generalComment": "基本完成任务。",
            "detailedFeedback": [],
            "correctedText": "Dear Sir,",
            "improvementSuggestions": ["注意格式。"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_successful_grading_stores_result() {
        let flow = flow(Ok(reply()));
        let mut session = session();
        flow.dispatch(&mut session, Action::SelectEssayType(crate::models::EssayType::PartA))
            .await;
        flow.dispatch(&mut session, Action::SelectYear(Some(2024))).await;
        flow.dispatch(&mut session, Action::EditEssayText("Dear Sir,".to_string()))
            .await;
        flow.dispatch(&mut session, Action::Submit).await;

        let state = session.state();
        assert!(!state.busy);
        assert!(state.error.is_none());
        let result = state.result.as_ref().unwrap();
        assert_eq!(result.max_score, 10);
        assert_eq!(result.total_score, 8.5);
    }

    #[tokio::test]
    async fn test_failed_grading_still_clears_busy() {
        let flow = flow(Err(GradingError::transport(Some(500), "boom")));
        let mut session = session();
        flow.dispatch(&mut session, Action::EditQuestion("topic".to_string()))
            .await;
        flow.dispatch(&mut session, Action::EditEssayText("essay".to_string()))
            .await;
        flow.dispatch(&mut session, Action::Submit).await;

        let state = session.state();
        assert!(!state.busy);
        assert!(state.result.is_none());
        assert!(state.error.as_deref().unwrap().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_image_selection_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("essay.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let flow = flow(Ok(reply()));
        let mut session = session();
        flow.dispatch(&mut session, Action::SetInputMode(InputMode::Image))
            .await;
        flow.dispatch(
            &mut session,
            Action::ImageSelected {
                slot: ImageSlot::Essay,
                path,
            },
        )
        .await;

        assert_eq!(
            session.state().essay_image,
            Some(Content::image(vec![0xFF, 0xD8, 0xFF], "image/jpeg"))
        );
        assert!(session.state().pending_essay_read.is_none());
    }

    #[tokio::test]
    async fn test_missing_image_file_sets_error() {
        let flow = flow(Ok(reply()));
        let mut session = session();
        flow.dispatch(
            &mut session,
            Action::ImageSelected {
                slot: ImageSlot::Essay,
                path: PathBuf::from("/nonexistent/essay.png"),
            },
        )
        .await;

        assert!(session.state().essay_image.is_none());
        assert!(session.state().error.is_some());
    }
}
