use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Marker prepended to every accepted AI suggestion so readers can tell
/// machine comments apart from lint output.
pub const SUGGESTION_MARKER: &str = "🤖 **AI review:**";

const SYSTEM_PROMPT: &str = "You are an experienced code reviewer. Review the \
file you are given and reply with at most one concrete, actionable \
improvement suggestion. Focus on readability, naming, potential bugs and \
best practices. If there is genuinely nothing worth changing, reply with \
'Looks good'.";

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Completion API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Completion API returned no choices")]
    EmptyResponse,
}

/// Produces at most one free-text review suggestion for a single file.
/// Implemented by [`OpenAiSuggester`] in production and by stubs in
/// pipeline tests.
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Returns `Ok(None)` when the model had nothing of substance to
    /// say. Errors are per-file and never fatal to the run.
    async fn suggest(
        &self,
        filename: &str,
        content: &str,
        patch: Option<&str>,
    ) -> Result<Option<String>, SuggestError>;
}

/// Tunables for the completion service, resolved from config.
#[derive(Debug, Clone)]
pub struct SuggesterOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// File content sent to the model is cut at this many characters.
    pub content_budget: usize,
    /// Replies at or below this trimmed length are discarded as noise.
    pub min_suggestion_length: usize,
}

impl Default for SuggesterOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 400,
            temperature: 0.2,
            content_budget: 3000,
            min_suggestion_length: 50,
        }
    }
}

/// Chat-completions client for the suggestion phase.
pub struct OpenAiSuggester {
    client: reqwest::Client,
    api_key: String,
    options: SuggesterOptions,
}

impl OpenAiSuggester {
    pub fn new(api_key: String, options: SuggesterOptions) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            options,
        }
    }
}

#[async_trait]
impl SuggestionGenerator for OpenAiSuggester {
    #[instrument(skip(self, content, patch), fields(file = %filename))]
    async fn suggest(
        &self,
        filename: &str,
        content: &str,
        patch: Option<&str>,
    ) -> Result<Option<String>, SuggestError> {
        let prompt = build_prompt(filename, content, patch, self.options.content_budget);

        let request = ChatRequest {
            model: &self.options.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };

        debug!("requesting completion");
        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .ok_or(SuggestError::EmptyResponse)?
            .message
            .content;

        match reply {
            Some(text) if keep_suggestion(&text, self.options.min_suggestion_length) => {
                debug!(chars = text.len(), "suggestion accepted");
                Ok(Some(format!("{SUGGESTION_MARKER} {}", text.trim())))
            }
            _ => {
                debug!("suggestion discarded as vacuous");
                Ok(None)
            }
        }
    }
}

/// Assemble the user prompt: reviewer focus, file extension, the diff
/// when present, and the (budget-limited) file content.
///
/// Known limitation: the content cut-off is a flat character budget, so
/// for very large files the changed region may fall outside what the
/// model sees and the suggestion can refer to stale code.
pub fn build_prompt(
    filename: &str,
    content: &str,
    patch: Option<&str>,
    content_budget: usize,
) -> String {
    let extension = filename.rsplit('.').next().unwrap_or("txt");
    let mut prompt = format!(
        "Review this {extension} file ({filename}) and suggest one improvement.\n"
    );
    if let Some(patch) = patch {
        prompt.push_str("\nDiff of the change:\n```diff\n");
        prompt.push_str(patch);
        prompt.push_str("\n```\n");
    }
    prompt.push_str("\nFile content:\n```\n");
    prompt.push_str(&truncate_content(content, content_budget));
    prompt.push_str("\n```\n");
    prompt
}

const TRUNCATION_MARKER: &str = "\n... [truncated]";

fn truncate_content(content: &str, budget: usize) -> String {
    if content.len() <= budget {
        return content.to_string();
    }
    // Cut on a char boundary at or below the budget
    let mut end = budget;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &content[..end], TRUNCATION_MARKER)
}

/// Post-filter for model replies: a reply is only worth posting when it
/// is non-empty, longer than the minimum threshold after trimming, and
/// not a bare "all fine" affirmation.
pub fn keep_suggestion(reply: &str, min_length: usize) -> bool {
    let trimmed = reply.trim();
    if trimmed.len() <= min_length {
        return false;
    }
    !trimmed.to_lowercase().contains("looks good")
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
