use serde::Serialize;

/// The unit the assembler produces and the publisher consumes. The
/// field names serialize straight into the GitHub review payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewComment {
    /// Repository-relative path; always the filename of one of the
    /// changed files considered in the current run.
    pub path: String,
    /// 1-based line in the new version of the file
    pub line: u64,
    pub body: String,
}

/// What a completed run did, for the final log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub changed_files: usize,
    pub reviewed_files: usize,
    pub lint_comments: usize,
    pub ai_comments: usize,
}

impl RunSummary {
    pub fn total_comments(&self) -> usize {
        self.lint_comments + self.ai_comments
    }
}
