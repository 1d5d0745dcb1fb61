pub mod types;

pub use types::{ReviewComment, RunSummary};

use tracing::{debug, info, instrument, warn};

use crate::analysis::{LintFinding, Severity, StaticAnalyzer};
use crate::pr::{diff, filter_reviewable, ChangeSetProvider, ChangedFile, PrContext, PrError};
use crate::publish::{publish, PullRequestHost};
use crate::suggest::SuggestionGenerator;

/// Run-level knobs resolved from config and the CLI.
#[derive(Debug, Clone)]
pub struct ReviewOptions {
    /// Extensions considered reviewable, e.g. ".ts"
    pub extensions: Vec<String>,
    /// Cap on individual comments when the batched review fails
    pub max_fallback_comments: usize,
    /// Assemble and log comments but post nothing
    pub dry_run: bool,
}

/// Merge lint findings and per-file AI suggestions into the ordered
/// comment list for the run.
///
/// Lint errors come first (warnings are dropped to keep the noise
/// down), then one AI comment per file that produced a suggestion.
/// Within each group the input encounter order is preserved; there is
/// no dedup and no sorting by line, so a lint error and an AI comment
/// can land on the same line. `suggestions[i]` belongs to `files[i]`.
pub fn assemble(
    files: &[ChangedFile],
    findings: &[LintFinding],
    suggestions: &[Option<String>],
) -> Vec<ReviewComment> {
    debug_assert_eq!(files.len(), suggestions.len());

    let mut comments = Vec::new();

    for finding in findings {
        if finding.severity != Severity::Error {
            continue;
        }
        comments.push(ReviewComment {
            path: finding.file_path.clone(),
            line: finding.line,
            body: lint_comment_body(finding),
        });
    }

    for (file, suggestion) in files.iter().zip(suggestions) {
        let Some(body) = suggestion else { continue };
        let line = file
            .patch
            .as_deref()
            .and_then(diff::first_new_line)
            .unwrap_or(1);
        comments.push(ReviewComment {
            path: file.filename.clone(),
            line,
            body: body.clone(),
        });
    }

    comments
}

fn lint_comment_body(finding: &LintFinding) -> String {
    match &finding.rule_id {
        Some(rule) => format!("🔴 **Lint error** (`{rule}`): {}", finding.message),
        None => format!("🔴 **Lint error**: {}", finding.message),
    }
}

/// The whole review pipeline, strictly sequential: fetch the change
/// set, filter it, lint the files on disk, ask the model about each
/// file one at a time, assemble, publish.
///
/// Only the change-set fetch can fail the run; analyzer, suggester and
/// publisher failures are absorbed per file or per delivery attempt.
#[instrument(skip_all, fields(owner = %ctx.owner, repo = %ctx.repo, pr = ctx.number))]
pub async fn run(
    provider: &dyn ChangeSetProvider,
    analyzer: &dyn StaticAnalyzer,
    suggester: &dyn SuggestionGenerator,
    host: &dyn PullRequestHost,
    ctx: &PrContext,
    options: &ReviewOptions,
) -> Result<RunSummary, PrError> {
    let changed = provider.changed_files(ctx).await?;
    let files = filter_reviewable(&changed, &options.extensions);
    info!(changed = changed.len(), reviewable = files.len(), "fetched change set");

    let mut summary = RunSummary {
        changed_files: changed.len(),
        reviewed_files: files.len(),
        ..Default::default()
    };

    if files.is_empty() {
        info!("no reviewable files, nothing to do");
        return Ok(summary);
    }

    let paths: Vec<String> = files.iter().map(|f| f.filename.clone()).collect();
    let findings = analyzer.lint(&paths).await;
    debug!(findings = findings.len(), "lint phase complete");

    // One completion call per file, awaited before the next begins
    let mut suggestions = Vec::with_capacity(files.len());
    for file in &files {
        let content = match tokio::fs::read_to_string(&file.filename).await {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %file.filename, error = %err, "cannot read file, skipping AI review");
                suggestions.push(None);
                continue;
            }
        };
        let suggestion = match suggester
            .suggest(&file.filename, &content, file.patch.as_deref())
            .await
        {
            Ok(suggestion) => suggestion,
            Err(err) => {
                warn!(path = %file.filename, error = %err, "suggestion failed, skipping file");
                None
            }
        };
        suggestions.push(suggestion);
    }

    summary.lint_comments = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    summary.ai_comments = suggestions.iter().flatten().count();

    let comments = assemble(&files, &findings, &suggestions);

    if options.dry_run {
        info!(comments = comments.len(), "dry run, not posting");
        for comment in &comments {
            info!(path = %comment.path, line = comment.line, body = %comment.body, "assembled comment");
        }
        return Ok(summary);
    }

    publish(host, ctx, &comments, options.max_fallback_comments).await;
    Ok(summary)
}
