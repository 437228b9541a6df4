//! 流程层（Workflow）
//!
//! - `session` - 会话状态与动作派发（纯状态机，无 IO）
//! - `grading_flow` - 执行会话产生的副作用（读图片、调用批改服务）

pub mod grading_flow;
pub mod session;

pub use grading_flow::GradingFlow;
pub use session::{
    Action, Effect, GradingSubmission, ImageSlot, InputMode, ReadToken, Session, SessionState,
};
