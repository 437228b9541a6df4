//! 展示层：终端报告渲染

pub mod report;

pub use report::{render_error, render_result, ScoreLevel};
