use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::pr::{GithubClient, PrContext};
use crate::review::types::ReviewComment;

/// Posted as a plain PR comment when the run found nothing to flag.
const NO_ISSUES_BODY: &str =
    "✅ Automated review finished: no issues found. Nice work!";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),
}

/// The two delivery operations the publisher needs from the PR host:
/// one batched review and one unanchored thread comment. Mocked in
/// tests to exercise the fallback path without a network.
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Create one review of kind COMMENT carrying the inline comments.
    async fn create_review(
        &self,
        ctx: &PrContext,
        body: &str,
        comments: &[ReviewComment],
    ) -> Result<(), PublishError>;

    /// Create one issue-level comment on the PR thread.
    async fn create_issue_comment(&self, ctx: &PrContext, body: &str)
        -> Result<(), PublishError>;
}

/// Deliver the assembled comments to the PR.
///
/// Empty list: exactly one general comment, no review call. Non-empty:
/// one batched review; if that fails (a line outside the diff,
/// permissions, transport), fall back to individual thread comments
/// capped at `max_fallback` so a large PR cannot be spammed. Nothing in
/// here is fatal to the run; every failure is logged and skipped.
#[instrument(skip(host, comments), fields(pr = ctx.number, comments = comments.len()))]
pub async fn publish(
    host: &dyn PullRequestHost,
    ctx: &PrContext,
    comments: &[ReviewComment],
    max_fallback: usize,
) {
    if comments.is_empty() {
        info!("nothing to flag, posting general comment");
        if let Err(err) = host.create_issue_comment(ctx, NO_ISSUES_BODY).await {
            warn!(error = %err, "failed to post general comment");
        }
        return;
    }

    let body = format!(
        "Automated review: {} comment{}.",
        comments.len(),
        if comments.len() == 1 { "" } else { "s" }
    );
    match host.create_review(ctx, &body, comments).await {
        Ok(()) => info!("posted batched review"),
        Err(err) => {
            warn!(error = %err, "batched review failed, falling back to individual comments");
            for comment in comments.iter().take(max_fallback) {
                let body = format!("`{}:{}`: {}", comment.path, comment.line, comment.body);
                if let Err(err) = host.create_issue_comment(ctx, &body).await {
                    warn!(
                        path = %comment.path,
                        line = comment.line,
                        error = %err,
                        "fallback comment failed, skipping"
                    );
                }
            }
            if comments.len() > max_fallback {
                info!(
                    dropped = comments.len() - max_fallback,
                    "fallback cap reached, remaining comments dropped"
                );
            }
        }
    }
}

#[async_trait]
impl PullRequestHost for GithubClient {
    async fn create_review(
        &self,
        ctx: &PrContext,
        body: &str,
        comments: &[ReviewComment],
    ) -> Result<(), PublishError> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/pulls/{}/reviews",
            ctx.owner, ctx.repo, ctx.number
        );
        let payload = json!({
            "event": "COMMENT",
            "body": body,
            "comments": comments,
        });

        debug!(comments = comments.len(), "creating batched review");
        self.post(&url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn create_issue_comment(
        &self,
        ctx: &PrContext,
        body: &str,
    ) -> Result<(), PublishError> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/issues/{}/comments",
            ctx.owner, ctx.repo, ctx.number
        );

        debug!("creating issue comment");
        self.post(&url)
            .json(&json!({ "body": body }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
