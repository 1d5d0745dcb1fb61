use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{AnalysisError, LintFinding, Severity, StaticAnalyzer};

/// Runs ESLint one file at a time through the project-local install
/// (`npx --no-install eslint --format json`). Only files materialized
/// in the current working tree are analyzed; paths that are not on
/// disk are skipped without a finding or an error.
pub struct EslintAnalyzer;

impl EslintAnalyzer {
    pub fn new() -> Self {
        Self
    }

    async fn lint_file(&self, path: &str) -> Result<Vec<LintFinding>, AnalysisError> {
        let output = Command::new("npx")
            .args(["--no-install", "eslint", "--format", "json", path])
            .output()
            .await?;

        // ESLint exits 1 when it finds errors and 2 on operational
        // failure; either way the JSON report goes to stdout, so the
        // exit status alone is not a failure signal.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let reports: Vec<FileReport> = serde_json::from_str(stdout.trim())?;

        // ESLint reports an absolute filePath; findings keep the
        // repository-relative path the PR change set uses so comments
        // anchor to the right file.
        let findings = reports
            .into_iter()
            .flat_map(|report| report.messages)
            .map(|m| LintFinding {
                file_path: path.to_string(),
                rule_id: m.rule_id,
                severity: Severity::from_eslint(m.severity),
                message: m.message,
                line: m.line.unwrap_or(1),
                column: m.column.unwrap_or(1),
            })
            .collect();
        Ok(findings)
    }
}

impl Default for EslintAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StaticAnalyzer for EslintAnalyzer {
    async fn lint(&self, paths: &[String]) -> Vec<LintFinding> {
        let mut findings = Vec::new();
        for path in paths {
            if !Path::new(path).exists() {
                debug!(path = %path, "file not in working tree, skipping lint");
                continue;
            }
            match self.lint_file(path).await {
                Ok(mut file_findings) => {
                    debug!(path = %path, findings = file_findings.len(), "linted file");
                    findings.append(&mut file_findings);
                }
                Err(err) => {
                    warn!(path = %path, error = %err, "lint failed for file, continuing");
                }
            }
        }
        findings
    }
}

/// ESLint's JSON reporter output: one entry per analyzed file. Only
/// the messages matter; the rest of the report is ignored.
#[derive(Debug, Deserialize)]
struct FileReport {
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(rename = "ruleId")]
    rule_id: Option<String>,
    severity: u8,
    message: String,
    // Absent on some fatal parse errors
    line: Option<u64>,
    column: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_REPORT: &str = r#"[
      {
        "filePath": "src/app.ts",
        "messages": [
          {
            "ruleId": "no-unused-vars",
            "severity": 2,
            "message": "'x' is defined but never used.",
            "line": 4,
            "column": 7
          },
          {
            "ruleId": "semi",
            "severity": 1,
            "message": "Missing semicolon.",
            "line": 9,
            "column": 22
          }
        ],
        "errorCount": 1,
        "warningCount": 1
      }
    ]"#;

    #[test]
    fn test_parse_eslint_report() {
        let reports: Vec<FileReport> = serde_json::from_str(SAMPLE_REPORT).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].messages.len(), 2);
        assert_eq!(
            reports[0].messages[0].rule_id.as_deref(),
            Some("no-unused-vars")
        );
        assert_eq!(reports[0].messages[0].severity, 2);
    }

    #[test]
    fn test_parse_fatal_message_without_rule_or_line() {
        let json = r#"[{
            "filePath": "src/broken.ts",
            "messages": [{
                "ruleId": null,
                "severity": 2,
                "message": "Parsing error: Unexpected token"
            }]
        }]"#;
        let reports: Vec<FileReport> = serde_json::from_str(json).unwrap();
        let msg = &reports[0].messages[0];
        assert!(msg.rule_id.is_none());
        assert!(msg.line.is_none());
    }

    #[tokio::test]
    async fn test_missing_files_are_skipped_silently() {
        let analyzer = EslintAnalyzer::new();
        let findings = analyzer
            .lint(&["definitely/not/on/disk.ts".to_string()])
            .await;
        assert!(findings.is_empty());
    }
}
