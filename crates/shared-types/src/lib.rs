pub mod config;
pub mod text;
pub mod types;

pub use config::{ConfigError, ReportConfig, ScoreGroup, NO_COLUMNS, YES_COLUMNS};
pub use types::{
    AnalysisSummary, CheckResult, GroupScore, OverallSummary, RuleViolation, SectionResults,
    SectionSummary, ThesisAnalysis,
};
