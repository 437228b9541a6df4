//! # Essay Grader
//!
//! 考研英语作文智能批改：选择真题、提交作文（文字或照片），由 Gemini 按评分细则打分并给出点评。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 考试类型、评分档次、真题库、批改结果
//! - `models::loaders` - 读取内置或自定义的 TOML 真题库
//!
//! ### ② 客户端（Clients）
//! - `clients/` - `GenerativeModel` 接口与 Gemini REST 实现，只负责一次 HTTP 调用
//!
//! ### ③ 业务能力层（Services）
//! - `PaperSelector` - 按年份查题、随机抽题
//! - `request_builder` - 组装附件和任务说明（纯函数）
//! - `GradingService` - 检查密钥 → 调用模型 → 严格解析结果
//!
//! ### ④ 流程层（Workflow）
//! - `Session` - 会话状态，只能通过动作修改
//! - `GradingFlow` - 执行会话产生的副作用，保证忙碌标记一定被清除
//!
//! ### ⑤ 展示层（Presentation / CLI）
//! - `presentation::report` - 终端报告
//! - `cli` - 命令行入口
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod presentation;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GeminiClient, GenerativeModel};
pub use config::Config;
pub use error::{AppError, AppResult, GradingError};
pub use models::{Content, EssayConfig, EssayType, ExamType, GradingResult, PastPaper};
pub use services::{GradingService, PaperLookup, PaperSelector};
pub use workflow::{Action, Effect, GradingFlow, Session};
