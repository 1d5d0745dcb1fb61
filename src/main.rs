mod analysis;
mod config;
mod pr;
mod publish;
mod review;
mod suggest;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// PR Reviewer — posts ESLint findings and AI improvement suggestions
/// as inline comments on a GitHub Pull Request. Intended to run inside
/// a GitHub Actions job with the PR branch checked out.
#[derive(Parser, Debug)]
#[command(name = "pr-reviewer", version, about)]
struct Cli {
    /// GitHub Pull Request URL (e.g., https://github.com/org/repo/pull/42)
    ///
    /// When omitted, the PR is taken from the Actions environment:
    /// GITHUB_REPOSITORY plus PR_NUMBER.
    pr_url: Option<String>,

    /// Assemble review comments but post nothing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load()?;

    let ctx = match cli.pr_url.as_deref() {
        Some(url) => pr::parse_pr_url(url)?,
        None => pr::context_from_env()?,
    };

    // Both credentials must be present before any network call
    let github_token = config
        .github_token()
        .ok_or("GitHub token missing: set GITHUB_TOKEN or [github].token in .pr-reviewer.toml")?;
    let openai_key = config
        .openai_api_key()
        .ok_or("API key missing: set OPENAI_API_KEY or [openai].api_key in .pr-reviewer.toml")?;

    let github = pr::GithubClient::new(github_token);
    let analyzer = analysis::EslintAnalyzer::new();
    let suggester = suggest::OpenAiSuggester::new(openai_key, config.suggester_options());

    let options = review::ReviewOptions {
        extensions: config.review.extensions.clone(),
        max_fallback_comments: config.review.max_fallback_comments,
        dry_run: cli.dry_run,
    };

    info!(owner = %ctx.owner, repo = %ctx.repo, pr = ctx.number, dry_run = cli.dry_run, "starting review");
    let summary = review::run(&github, &analyzer, &suggester, &github, &ctx, &options).await?;
    info!(
        changed = summary.changed_files,
        reviewed = summary.reviewed_files,
        lint_comments = summary.lint_comments,
        ai_comments = summary.ai_comments,
        total = summary.total_comments(),
        "review complete"
    );

    Ok(())
}
