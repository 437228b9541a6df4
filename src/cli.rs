//! 命令行入口
//!
//! 只负责解析参数、组装会话并输出结果，业务逻辑都在 services / workflow 中。

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::config::Config;
use crate::models::exam::{EssayType, ExamType};
use crate::models::loaders::{load_builtin_catalog, load_catalog_file};
use crate::models::paper::PastPaperCatalog;
use crate::presentation::report::render_result;
use crate::services::grading_service::GradingService;
use crate::services::paper_selector::PaperSelector;
use crate::utils::logging;
use crate::workflow::grading_flow::GradingFlow;
use crate::workflow::session::{Action, ImageSlot, InputMode, Session};

#[derive(Parser, Debug)]
#[command(
    name = "essay-grader",
    version,
    about = "考研英语作文智能批改 (AI-Powered English Composition Correction)"
)]
pub struct Cli {
    /// TOML 配置文件
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 自定义真题库文件（TOML）
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 列出真题库中的年份
    Years,
    /// 按年份查看真题
    Paper(PaperArgs),
    /// 随机抽取一道真题
    Random(RandomArgs),
    /// 批改作文
    Grade(GradeArgs),
}

/// 考试类型与作文类型
#[derive(Args, Debug, Clone)]
pub struct SectionArgs {
    /// 考试类型: english_i / english_ii（也可用 1 / 2、英语一 / 英语二）
    #[arg(long, default_value = "english_ii")]
    pub exam: ExamType,

    /// 作文类型: part_a（小作文）/ part_b（大作文）
    #[arg(long, default_value = "part_b")]
    pub essay: EssayType,
}

#[derive(Args, Debug)]
pub struct PaperArgs {
    #[arg(long)]
    pub year: u16,

    #[command(flatten)]
    pub section: SectionArgs,
}

#[derive(Args, Debug)]
pub struct RandomArgs {
    #[command(flatten)]
    pub section: SectionArgs,

    /// 随机种子（便于复现）
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct GradeArgs {
    #[command(flatten)]
    pub section: SectionArgs,

    /// 使用某一年的真题作为题目
    #[arg(long, conflicts_with_all = ["question", "question_file"])]
    pub year: Option<u16>,

    /// 题目文字
    #[arg(long, conflicts_with = "question_file")]
    pub question: Option<String>,

    /// 从文本文件读取题目
    #[arg(long)]
    pub question_file: Option<PathBuf>,

    /// 题目图片（优先于题目文字）
    #[arg(long)]
    pub question_image: Option<PathBuf>,

    /// 作文文字
    #[arg(long, conflicts_with_all = ["essay_file", "essay_image"])]
    pub essay_text: Option<String>,

    /// 从文本文件读取作文
    #[arg(long, conflicts_with = "essay_image")]
    pub essay_file: Option<PathBuf>,

    /// 手写作文照片
    #[arg(long)]
    pub essay_image: Option<PathBuf>,

    /// 以 JSON 输出批改结果
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref()).context("加载配置失败")?;
        if self.catalog.is_some() {
            config.catalog_file = self.catalog.clone();
        }
        logging::init(self.verbose || config.verbose_logging);
        logging::log_startup(&config);

        let selector = PaperSelector::new(load_catalog(&config).await?);

        match self.command {
            Commands::Years => run_years(&selector),
            Commands::Paper(args) => run_paper(&selector, args),
            Commands::Random(args) => run_random(&selector, args),
            Commands::Grade(args) => run_grade(&config, selector, args).await,
        }
    }
}

async fn load_catalog(config: &Config) -> Result<PastPaperCatalog> {
    let catalog = match &config.catalog_file {
        Some(path) => load_catalog_file(path)
            .await
            .with_context(|| format!("加载真题库 {} 失败", path.display()))?,
        None => load_builtin_catalog().context("加载内置真题库失败")?,
    };
    debug!("真题库版本 {}，共 {} 条", catalog.version, catalog.len());
    Ok(catalog)
}

fn run_years(selector: &PaperSelector) -> Result<()> {
    for year in selector.available_years() {
        println!("{}", year);
    }
    Ok(())
}

fn run_paper(selector: &PaperSelector, args: PaperArgs) -> Result<()> {
    let lookup = selector.select(args.year, args.section.exam, args.section.essay);
    println!("{}", lookup.text());
    Ok(())
}

fn run_random(selector: &PaperSelector, args: RandomArgs) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let paper = selector.random(&mut rng, args.section.exam, args.section.essay)?;
    println!("{}", format!("[{}]", paper.year).cyan().bold());
    println!("{}", paper.content);
    Ok(())
}

async fn run_grade(config: &Config, selector: PaperSelector, args: GradeArgs) -> Result<()> {
    let flow = GradingFlow::new(GradingService::new(config)?);
    let mut session = Session::new(selector);
    let exam_type = args.section.exam;
    let essay_type = args.section.essay;

    flow.dispatch(&mut session, Action::SelectExamType(exam_type)).await;
    flow.dispatch(&mut session, Action::SelectEssayType(essay_type)).await;

    if let Some(year) = args.year {
        ensure_paper_exists(session.selector(), year, exam_type, essay_type)?;
        flow.dispatch(&mut session, Action::SelectYear(Some(year))).await;
    } else if let Some(question) = args.question {
        flow.dispatch(&mut session, Action::EditQuestion(question)).await;
    } else if let Some(path) = &args.question_file {
        let question = read_text(path).await?;
        flow.dispatch(&mut session, Action::EditQuestion(question)).await;
    }
    if let Some(path) = args.question_image {
        flow.dispatch(
            &mut session,
            Action::ImageSelected {
                slot: ImageSlot::Question,
                path,
            },
        )
        .await;
    }

    if let Some(path) = args.essay_image {
        flow.dispatch(&mut session, Action::SetInputMode(InputMode::Image)).await;
        flow.dispatch(
            &mut session,
            Action::ImageSelected {
                slot: ImageSlot::Essay,
                path,
            },
        )
        .await;
    } else {
        let text = match (args.essay_text, &args.essay_file) {
            (Some(text), _) => text,
            (None, Some(path)) => read_text(path).await?,
            (None, None) => String::new(),
        };
        flow.dispatch(&mut session, Action::SetInputMode(InputMode::Text)).await;
        flow.dispatch(&mut session, Action::EditEssayText(text)).await;
    }

    // 图片读取失败时直接报告，不再提交
    if let Some(message) = &session.state().error {
        bail!("{}", message);
    }

    flow.dispatch(&mut session, Action::Submit).await;

    let state = session.state();
    if let Some(message) = &state.error {
        bail!("{}", message);
    }
    let result = state
        .result
        .as_ref()
        .ok_or_else(|| anyhow!("批改没有返回结果"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", render_result(result, exam_type, essay_type));
    }
    Ok(())
}

/// 没有对应真题时直接报错，不把提示文本当作题目提交
fn ensure_paper_exists(
    selector: &PaperSelector,
    year: u16,
    exam_type: ExamType,
    essay_type: EssayType,
) -> Result<()> {
    let lookup = selector.select(year, exam_type, essay_type);
    if !lookup.is_found() {
        bail!("{}", lookup.text());
    }
    Ok(())
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("读取文件 {} 失败", path.display()))
}
