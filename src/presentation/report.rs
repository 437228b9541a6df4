//! 批改报告渲染
//!
//! 把 `GradingResult` 渲染成终端文本。只拼字符串，由调用方决定输出到哪里。

use std::fmt::Write as _;

use colored::*;

use crate::models::band::Band;
use crate::models::exam::{EssayType, ExamType};
use crate::models::grading::GradingResult;

const RULE_WIDTH: usize = 60;
const BAR_WIDTH: usize = 20;
const STUDY_TIP: &str = "学习建议: 对比你的原文和修正版，找出常犯的语法错误。";

/// 得分水平
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreLevel {
    Good,
    Fair,
    Poor,
}

impl ScoreLevel {
    /// 得分率 ≥ 0.8 为好，≥ 0.6 为中，其余为差
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.8 {
            ScoreLevel::Good
        } else if ratio >= 0.6 {
            ScoreLevel::Fair
        } else {
            ScoreLevel::Poor
        }
    }

    fn paint(self, text: &str) -> ColoredString {
        match self {
            ScoreLevel::Good => text.green().bold(),
            ScoreLevel::Fair => text.yellow().bold(),
            ScoreLevel::Poor => text.red().bold(),
        }
    }
}

/// 渲染完整的批改报告
pub fn render_result(result: &GradingResult, exam_type: ExamType, essay_type: EssayType) -> String {
    let mut out = String::new();
    let level = ScoreLevel::from_ratio(result.score_ratio());

    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH).bright_black());
    let _ = writeln!(
        out,
        "{}  {}",
        format!("[{}]", result.band).cyan().bold(),
        format!("{} - {}", exam_type, essay_type).bright_black()
    );
    let _ = writeln!(
        out,
        "总分 (Total Score): {} / {}",
        level.paint(&format_score(result.total_score)),
        result.max_score
    );
    let reference = result.reference_band(exam_type, essay_type);
    let (low, high) = reference.score_range(exam_type, essay_type);
    let _ = writeln!(out, "参考档次: {} ({}-{} 分)", reference, low, high);
    if !result.is_score_in_range() {
        let _ = writeln!(
            out,
            "{}",
            format!("提示: 总分超出 0-{} 的范围", result.max_score).red()
        );
    } else if reference == Band::Zero {
        let _ = writeln!(out, "{}", "提示: 得分低于第一档下限".yellow());
    }
    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH).bright_black());

    section(&mut out, "维度得分 (Breakdown)");
    for (label, score) in result.breakdown.dimensions() {
        let _ = writeln!(out, "  {:<18} {} {:>5}", label, bar(score), format_score(score));
    }

    section(&mut out, "总评 (General Comments)");
    let _ = writeln!(out, "  {}", result.general_comment);
    for suggestion in &result.improvement_suggestions {
        let _ = writeln!(out, "  💡 {}", suggestion);
    }

    if !result.detailed_feedback.is_empty() {
        section(&mut out, "详细点评 (Detailed Breakdown)");
        for item in &result.detailed_feedback {
            let _ = writeln!(
                out,
                "  {}  评分: {}/10",
                item.criterion.bold(),
                format_score(item.score)
            );
            let _ = writeln!(out, "    {}", item.comment);
        }
    }

    if let Some(ocr) = result.ocr_text.as_deref().filter(|t| !t.trim().is_empty()) {
        section(&mut out, "原文识别 (Original Text OCR)");
        push_block(&mut out, ocr);
    }

    section(&mut out, "润色修正 (Corrected Version)");
    push_block(&mut out, &result.corrected_text);

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", STUDY_TIP.yellow());
    let _ = writeln!(
        out,
        "{}",
        format!("批改时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")).bright_black()
    );
    out
}

/// 渲染错误提示
pub fn render_error(message: &str) -> String {
    format!("{} {}", "✗".red().bold(), message.red())
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title.blue().bold());
    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH).bright_black());
}

fn push_block(out: &mut String, text: &str) {
    for line in text.lines() {
        let _ = writeln!(out, "  {}", line);
    }
}

/// 0-100 分的条形图
fn bar(score: f64) -> String {
    let clamped = score.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "{}{}",
        "█".repeat(filled).green(),
        "░".repeat(BAR_WIDTH - filled).bright_black()
    )
}

/// 整数分不带小数点，其余保留一位
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{:.1}", score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grading::{DetailedFeedback, ScoreBreakdown};

    fn plain() {
        colored::control::set_override(false);
    }

    fn result(total_score: f64, ocr_text: Option<&str>) -> GradingResult {
        GradingResult {
            total_score,
            max_score: 15,
            band: "第四档".to_string(),
            breakdown: ScoreBreakdown {
                content: 85.0,
                grammar: 70.0,
                coherence: 75.5,
                format: 100.0,
            },
            general_comment: "内容充实，语言基本准确。".to_string(),
            detailed_feedback: vec![DetailedFeedback {
                criterion: "语法准确性".to_string(),
                score: 7.0,
                comment: "个别时态错误。".to_string(),
            }],
            corrected_text: "As is shown in the chart,\nwatching TV ranks first.".to_string(),
            improvement_suggestions: vec!["多用从句。".to_string(), "注意冠词。".to_string()],
            ocr_text: ocr_text.map(str::to_string),
        }
    }

    #[test]
    fn test_score_level_thresholds() {
        assert_eq!(ScoreLevel::from_ratio(0.8), ScoreLevel::Good);
        assert_eq!(ScoreLevel::from_ratio(0.79), ScoreLevel::Fair);
        assert_eq!(ScoreLevel::from_ratio(0.6), ScoreLevel::Fair);
        assert_eq!(ScoreLevel::from_ratio(0.59), ScoreLevel::Poor);
    }

    #[test]
    fn test_render_contains_all_sections() {
        plain();
        let text = render_result(&result(12.0, None), ExamType::EnglishII, EssayType::PartB);

        assert!(text.contains("[第四档]"));
        assert!(text.contains("总分 (Total Score): 12 / 15"));
        assert!(text.contains("参考档次: 第四档"));
        assert!(text.contains("内容 (Content)"));
        assert!(text.contains("内容充实，语言基本准确。"));
        assert!(text.contains("💡 注意冠词。"));
        assert!(text.contains("语法准确性  评分: 7/10"));
        assert!(text.contains("  watching TV ranks first."));
        assert!(text.contains(STUDY_TIP));
        assert!(!text.contains("原文识别"));
    }

    #[test]
    fn test_render_shows_ocr_text_when_present() {
        plain();
        let text = render_result(
            &result(9.5, Some("As is shwon in the chart")),
            ExamType::EnglishII,
            EssayType::PartB,
        );
        assert!(text.contains("原文识别 (Original Text OCR)"));
        assert!(text.contains("As is shwon in the chart"));
        assert!(text.contains("9.5 / 15"));
    }

    #[test]
    fn test_bar_is_clamped() {
        plain();
        assert_eq!(bar(100.0), "█".repeat(BAR_WIDTH));
        assert_eq!(bar(150.0), "█".repeat(BAR_WIDTH));
        assert_eq!(bar(-3.0), "░".repeat(BAR_WIDTH));
        assert_eq!(bar(50.0), format!("{}{}", "█".repeat(10), "░".repeat(10)));
    }

    #[test]
    fn test_out_of_range_score_is_flagged_not_rejected() {
        plain();
        let text = render_result(&result(18.0, None), ExamType::EnglishII, EssayType::PartB);
        assert!(text.contains("18 / 15"));
        assert!(text.contains("提示: 总分超出 0-15 的范围"));
    }

    #[test]
    fn test_render_error() {
        plain();
        assert_eq!(render_error("请上传作文图片。"), "✗ 请上传作文图片。");
    }
}
