use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use train_core::model::SessionResult;
use train_core::progression;

use crate::error::ReportError;

/// Results included in a report prompt.
pub const REPORT_WINDOW: usize = 15;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Returned instead of calling the model when nothing has been played.
pub const NO_DATA_REPORT: &str =
    "No training data yet. Play a few exercises and come back for your progress report.";

#[derive(Clone, Debug)]
pub struct ReportConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl ReportConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("TRAINER_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("TRAINER_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("TRAINER_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        let timeout = env::var("TRAINER_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
        Some(Self {
            base_url,
            api_key,
            model,
            timeout,
        })
    }
}

/// Turns a prompt into report text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// # Errors
    ///
    /// Returns `ReportError` when no text could be produced.
    async fn summarize(&self, prompt: &str) -> Result<String, ReportError>;
}

/// OpenAI-compatible chat completions backend.
#[derive(Clone)]
pub struct ChatSummarizer {
    client: Client,
    config: Option<ReportConfig>,
}

impl ChatSummarizer {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ReportConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ReportConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.config.as_ref().map_or(DEFAULT_TIMEOUT, |c| c.timeout)
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, ReportError> {
        let config = self.config.as_ref().ok_or(ReportError::Disabled)?;

        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReportError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ReportError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

//
// ─── REPORT SERVICE ────────────────────────────────────────────────────────────
//

/// Progress reports over recent history. Never retries; a failure means
/// "report unavailable" and gameplay carries on.
#[derive(Clone)]
pub struct ReportService {
    summarizer: Arc<dyn Summarizer>,
    timeout: Duration,
}

impl ReportService {
    #[must_use]
    pub fn new(summarizer: Arc<dyn Summarizer>, timeout: Duration) -> Self {
        Self {
            summarizer,
            timeout,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        let chat = ChatSummarizer::from_env();
        let timeout = chat.timeout();
        Self::new(Arc::new(chat), timeout)
    }

    /// Summarise `history` (any order).
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Timeout` if the backend is slower than the
    /// configured timeout, or the backend's own error.
    pub async fn report(&self, history: &[SessionResult]) -> Result<String, ReportError> {
        if history.is_empty() {
            return Ok(NO_DATA_REPORT.to_string());
        }
        let prompt = build_report_prompt(history);

        let outcome = tokio::time::timeout(self.timeout, self.summarizer.summarize(&prompt))
            .await
            .unwrap_or(Err(ReportError::Timeout));
        match &outcome {
            Ok(text) => info!(chars = text.len(), "progress report generated"),
            Err(e) => warn!(error = %e, "progress report unavailable"),
        }
        outcome
    }
}

/// Prompt listing the most recent results, newest first.
#[must_use]
pub fn build_report_prompt(history: &[SessionResult]) -> String {
    let mut prompt = String::from(
        "You are a warm, encouraging cognitive training coach. \
         Write a short progress report (3 to 4 sentences) for the player \
         based on these recent exercise results, newest first. \
         Mention strengths, one thing to practise, and keep it positive.\n",
    );
    for result in progression::recent(history, REPORT_WINDOW) {
        prompt.push_str(&format!(
            "- {} level {}: score {}, {} stars, {}\n",
            result.exercise().title(),
            result.level(),
            result.score().value(),
            result.stars().value(),
            result.completed_at().format("%Y-%m-%d"),
        ));
    }
    prompt
}
