pub mod band;
pub mod content;
pub mod exam;
pub mod grading;
pub mod loaders;
pub mod paper;

pub use band::Band;
pub use content::Content;
pub use exam::{max_score, EssayType, ExamType, FALLBACK_EXAM_TYPE};
pub use grading::{DetailedFeedback, EssayConfig, GradingResult, ScoreBreakdown};
pub use loaders::{load_builtin_catalog, load_catalog_file};
pub use paper::{PastPaper, PastPaperCatalog};
