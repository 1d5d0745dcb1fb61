pub mod eslint;

pub use eslint::EslintAnalyzer;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to run analyzer: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Failed to parse analyzer output: {0}")]
    OutputParse(#[from] serde_json::Error),
}

/// Lint severity as reported by ESLint (1 = warning, 2 = error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn from_eslint(level: u8) -> Severity {
        match level {
            2 => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

/// One static-analysis diagnostic, tied to a file and line.
#[derive(Debug, Clone)]
pub struct LintFinding {
    pub file_path: String,
    /// Rule that fired, e.g. "no-unused-vars". Absent for fatal
    /// parse errors where no rule applies.
    pub rule_id: Option<String>,
    pub severity: Severity,
    pub message: String,
    /// 1-based line number
    pub line: u64,
    /// 1-based column number
    #[allow(dead_code)] // reported by the analyzer, comments anchor on lines only
    pub column: u64,
}

/// Runs a static analyzer over a set of file paths and returns the
/// flattened findings. Per-path failures are absorbed by the
/// implementation (logged, skipped) so a broken file never blocks the
/// rest of the run.
#[async_trait]
pub trait StaticAnalyzer: Send + Sync {
    async fn lint(&self, paths: &[String]) -> Vec<LintFinding>;
}
