//! 批改会话状态 - 流程层
//!
//! 所有界面状态集中在一个 `SessionState` 里，只能通过 `Session::dispatch` 修改。
//! 需要和外界打交道的动作（读图片、调用批改服务）以 `Effect` 形式返回，
//! 由 `GradingFlow` 执行后再把结果作为 `Action` 派发回来。

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{AppResult, GradingError};
use crate::models::content::Content;
use crate::models::exam::{EssayType, ExamType};
use crate::models::grading::{EssayConfig, GradingResult};
use crate::services::paper_selector::PaperSelector;

/// 随机选题没有候选时的提示
pub const NO_CANDIDATES_MESSAGE: &str = "暂无该类型的真题，请手动输入题目。";

const MISSING_QUESTION_MESSAGE: &str = "请输入或随机选择题目要求 (Question/Prompt)。";
const MISSING_ESSAY_TEXT_MESSAGE: &str = "请输入您的作文内容。";
const MISSING_ESSAY_IMAGE_MESSAGE: &str = "请上传作文图片。";

/// 作文输入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Text,
    Image,
}

/// 图片槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Question,
    Essay,
}

/// 一次图片读取的凭据
///
/// 同一槽位只认最后一次选择的凭据，更早的读取结果会被丢弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadToken {
    pub slot: ImageSlot,
    pub seq: u64,
}

/// 提交给批改服务的内容
#[derive(Debug, Clone, PartialEq)]
pub struct GradingSubmission {
    pub essay: Content,
    pub question: Content,
    pub config: EssayConfig,
}

/// 会话动作
#[derive(Debug)]
pub enum Action {
    SelectExamType(ExamType),
    SelectEssayType(EssayType),
    /// `None` 表示自定义题目
    SelectYear(Option<u16>),
    /// 手动编辑题目，同时清除已选年份
    EditQuestion(String),
    RandomQuestion,
    SetInputMode(InputMode),
    EditEssayText(String),
    ImageSelected { slot: ImageSlot, path: PathBuf },
    ImageLoaded {
        token: ReadToken,
        result: AppResult<Content>,
    },
    ClearQuestionImage,
    Submit,
    GradingFinished(Result<GradingResult, GradingError>),
    Reset,
}

/// 需要外部执行的副作用
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ReadImage { token: ReadToken, path: PathBuf },
    Grade(GradingSubmission),
}

/// 会话状态
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub exam_type: ExamType,
    pub essay_type: EssayType,
    pub selected_year: Option<u16>,
    pub question: String,
    pub question_image: Option<Content>,
    pub input_mode: InputMode,
    pub essay_text: String,
    pub essay_image: Option<Content>,
    pub pending_question_read: Option<ReadToken>,
    pub pending_essay_read: Option<ReadToken>,
    pub busy: bool,
    pub error: Option<String>,
    pub result: Option<GradingResult>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            exam_type: ExamType::EnglishII,
            essay_type: EssayType::PartB,
            selected_year: None,
            question: String::new(),
            question_image: None,
            input_mode: InputMode::Text,
            essay_text: String::new(),
            essay_image: None,
            pending_question_read: None,
            pending_essay_read: None,
            busy: false,
            error: None,
            result: None,
        }
    }
}

impl SessionState {
    fn pending_read_mut(&mut self, slot: ImageSlot) -> &mut Option<ReadToken> {
        match slot {
            ImageSlot::Question => &mut self.pending_question_read,
            ImageSlot::Essay => &mut self.pending_essay_read,
        }
    }

    fn image_mut(&mut self, slot: ImageSlot) -> &mut Option<Content> {
        match slot {
            ImageSlot::Question => &mut self.question_image,
            ImageSlot::Essay => &mut self.essay_image,
        }
    }
}

/// 批改会话
pub struct Session<R = StdRng> {
    state: SessionState,
    selector: PaperSelector,
    rng: R,
    next_seq: u64,
}

impl Session<StdRng> {
    pub fn new(selector: PaperSelector) -> Self {
        Self::with_rng(selector, StdRng::from_os_rng())
    }
}

impl<R: Rng> Session<R> {
    /// 使用指定随机数生成器创建会话（测试时可固定种子）
    pub fn with_rng(selector: PaperSelector, rng: R) -> Self {
        Self {
            state: SessionState::default(),
            selector,
            rng,
            next_seq: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selector(&self) -> &PaperSelector {
        &self.selector
    }

    /// 处理一个动作，必要时返回需要执行的副作用
    pub fn dispatch(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::SelectExamType(exam_type) => {
                self.state.exam_type = exam_type;
                self.refresh_question();
                None
            }
            Action::SelectEssayType(essay_type) => {
                self.state.essay_type = essay_type;
                self.refresh_question();
                None
            }
            Action::SelectYear(year) => {
                self.state.selected_year = year;
                self.refresh_question();
                None
            }
            Action::EditQuestion(text) => {
                self.state.question = text;
                self.state.selected_year = None;
                None
            }
            Action::RandomQuestion => {
                self.random_question();
                None
            }
            Action::SetInputMode(mode) => {
                self.state.input_mode = mode;
                None
            }
            Action::EditEssayText(text) => {
                self.state.essay_text = text;
                None
            }
            Action::ImageSelected { slot, path } => {
                self.next_seq += 1;
                let token = ReadToken {
                    slot,
                    seq: self.next_seq,
                };
                *self.state.pending_read_mut(slot) = Some(token);
                debug!("开始读取图片 {:?} #{}: {}", slot, token.seq, path.display());
                Some(Effect::ReadImage { token, path })
            }
            Action::ImageLoaded { token, result } => {
                self.apply_image(token, result);
                None
            }
            Action::ClearQuestionImage => {
                self.state.question_image = None;
                self.state.pending_question_read = None;
                None
            }
            Action::Submit => self.submit(),
            Action::GradingFinished(outcome) => {
                self.state.busy = false;
                match outcome {
                    Ok(result) => {
                        self.state.result = Some(result);
                        self.state.error = None;
                    }
                    Err(e) => {
                        self.state.result = None;
                        self.state.error = Some(e.to_string());
                    }
                }
                None
            }
            Action::Reset => {
                self.state.result = None;
                self.state.essay_text.clear();
                self.state.essay_image = None;
                self.state.pending_essay_read = None;
                self.state.error = None;
                None
            }
        }
    }

    /// 已选年份时按当前设置重新填入题目
    fn refresh_question(&mut self) {
        let Some(year) = self.state.selected_year else {
            return;
        };
        let lookup = self
            .selector
            .select(year, self.state.exam_type, self.state.essay_type);
        self.state.question = lookup.text().to_string();
    }

    fn random_question(&mut self) {
        let picked = self
            .selector
            .random(&mut self.rng, self.state.exam_type, self.state.essay_type)
            .map(|paper| paper.year);

        match picked {
            Ok(year) => {
                info!("🎲 随机选中 {} 年真题", year);
                self.state.selected_year = Some(year);
                self.state.error = None;
                self.refresh_question();
            }
            Err(e) => {
                debug!("随机选题失败: {}", e);
                self.state.error = Some(NO_CANDIDATES_MESSAGE.to_string());
            }
        }
    }

    fn apply_image(&mut self, token: ReadToken, result: AppResult<Content>) {
        let pending = self.state.pending_read_mut(token.slot);
        if *pending != Some(token) {
            debug!("丢弃过期的图片读取结果 {:?} #{}", token.slot, token.seq);
            return;
        }
        *pending = None;

        match result {
            Ok(content) => {
                *self.state.image_mut(token.slot) = Some(content);
            }
            Err(e) => {
                *self.state.image_mut(token.slot) = None;
                self.state.error = Some(e.to_string());
            }
        }
    }

    fn submit(&mut self) -> Option<Effect> {
        if self.state.busy {
            debug!("批改进行中，忽略重复提交");
            return None;
        }

        match self.build_submission() {
            Ok(submission) => {
                self.state.busy = true;
                self.state.error = None;
                Some(Effect::Grade(submission))
            }
            Err(e) => {
                self.state.error = Some(e.to_string());
                None
            }
        }
    }

    fn build_submission(&self) -> Result<GradingSubmission, GradingError> {
        let state = &self.state;

        let question = match &state.question_image {
            Some(image) => image.clone(),
            None if state.question.trim().is_empty() => {
                return Err(GradingError::Validation(MISSING_QUESTION_MESSAGE.to_string()))
            }
            None => Content::text(state.question.clone()),
        };

        let essay = match state.input_mode {
            InputMode::Text if state.essay_text.trim().is_empty() => {
                return Err(GradingError::Validation(MISSING_ESSAY_TEXT_MESSAGE.to_string()))
            }
            InputMode::Text => Content::text(state.essay_text.clone()),
            InputMode::Image => state.essay_image.clone().ok_or_else(|| {
                GradingError::Validation(MISSING_ESSAY_IMAGE_MESSAGE.to_string())
            })?,
        };

        Ok(GradingSubmission {
            essay,
            question,
            config: EssayConfig::new(state.exam_type, state.essay_type, state.question.clone()),
        })
    }
}
