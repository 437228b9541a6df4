//! 业务能力层（Services）
//!
//! 每个服务只描述"我能做什么"，不持有界面状态：
//! - `paper_selector` - 真题查找与随机抽题
//! - `request_builder` - 组装批改请求
//! - `rubric` - 评分细则与返回结构
//! - `grading_service` - 一次完整的批改调用

pub mod grading_service;
pub mod paper_selector;
pub mod request_builder;
pub mod rubric;

pub use grading_service::{parse_grading_response, GradingService};
pub use paper_selector::{missing_placeholder, PaperLookup, PaperSelector};
pub use request_builder::{build_grading_request, Attachment, AttachmentRole, GradingRequest};
