use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::SummaryError;
use crate::models::matching_text;
use crate::rules::FallbackRules;

const SYSTEM_PROMPT: &str = "Você é um assistente analista que escreve resumidamente sobre o setor \
de saúde. A seguir, um título de notícia e um trecho inicial. Em no máximo \
duas frases, explique por que essa notícia é relevante para o mercado de saúde \
suplementar e quais tendências ou riscos ela evidencia.";

const MAX_TOKENS: u32 = 60;
const TEMPERATURE: f32 = 0.4;

/// A "why it matters" note and where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Summary {
    Generated(String),
    Fallback { text: String, reason: FallbackReason },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FallbackReason {
    NoCredentials,
    ServiceFailed(String),
}

impl Summary {
    pub fn text(&self) -> &str {
        match self {
            Summary::Generated(text) | Summary::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Summary::Generated(text) | Summary::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Summary::Fallback { .. })
    }
}

/// External text generation: a system instruction plus one user turn in,
/// generated text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, system: &str, user: &str) -> Result<String, SummaryError>;
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

/// Chat-completions client for an OpenAI-compatible endpoint
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url,
        })
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system: &str, user: &str) -> Result<String, SummaryError> {
        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(SummaryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response = response.json::<ChatResponse>().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(SummaryError::EmptyResponse)
    }
}

/// Deterministic keyword-to-sentence summaries
#[derive(Debug, Clone, Default)]
pub struct RuleBasedSummarizer {
    rules: FallbackRules,
}

impl RuleBasedSummarizer {
    pub fn new(rules: FallbackRules) -> Self {
        Self { rules }
    }

    pub fn summarize(&self, title: &str, excerpt: &str) -> String {
        self.rules
            .sentence_for(&matching_text(title, excerpt))
            .to_string()
    }
}

/// Produces one summary per article: from the service when one is
/// configured, otherwise (or on any service failure) from the rules.
pub struct SummaryGenerator {
    service: Option<Arc<dyn TextGenerator>>,
    fallback: RuleBasedSummarizer,
    timeout: Duration,
    concurrency: usize,
    semaphore: Arc<Semaphore>,
}

impl SummaryGenerator {
    pub fn offline(fallback: RuleBasedSummarizer) -> Self {
        Self::build(None, fallback)
    }

    pub fn with_service(service: Arc<dyn TextGenerator>, fallback: RuleBasedSummarizer) -> Self {
        Self::build(Some(service), fallback)
    }

    fn build(service: Option<Arc<dyn TextGenerator>>, fallback: RuleBasedSummarizer) -> Self {
        // Keep concurrency low to stay under provider rate limits
        let concurrency = 2;
        Self {
            service,
            fallback,
            timeout: Duration::from_secs(30),
            concurrency,
            semaphore: Arc::new(Semaphore::new(concurrency)),
        }
    }

    pub fn from_config(config: &Config, fallback: RuleBasedSummarizer) -> Result<Self> {
        let generator = match &config.openai_api_key {
            Some(key) => {
                let client = OpenAiClient::new(
                    key.clone(),
                    config.openai_model.clone(),
                    config.openai_base_url.clone(),
                )?;
                Self::with_service(Arc::new(client), fallback)
            }
            None => Self::offline(fallback),
        };

        Ok(generator
            .with_timeout(config.summary_timeout)
            .with_concurrency(config.summary_concurrency))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        self.concurrency = concurrency;
        self.semaphore = Arc::new(Semaphore::new(concurrency));
        self
    }

    pub fn is_offline(&self) -> bool {
        self.service.is_none()
    }

    pub async fn summarize(&self, title: &str, excerpt: &str) -> Summary {
        let Some(service) = &self.service else {
            return Summary::Fallback {
                text: self.fallback.summarize(title, excerpt),
                reason: FallbackReason::NoCredentials,
            };
        };

        match self.call_service(service.as_ref(), title, excerpt).await {
            Ok(text) => Summary::Generated(text),
            Err(e) => {
                warn!(service = service.name(), error = %e, title, "summary service failed, using fallback");
                Summary::Fallback {
                    text: self.fallback.summarize(title, excerpt),
                    reason: FallbackReason::ServiceFailed(e.to_string()),
                }
            }
        }
    }

    async fn call_service(
        &self,
        service: &dyn TextGenerator,
        title: &str,
        excerpt: &str,
    ) -> Result<String, SummaryError> {
        // The semaphore is never closed, so the permit is always granted
        let _permit = self.semaphore.acquire().await.ok();

        let user = format!(
            "Título: {}\nTrecho: {}\nResposta em duas frases:",
            title, excerpt
        );

        let text = tokio::time::timeout(self.timeout, service.generate(SYSTEM_PROMPT, &user))
            .await
            .map_err(|_| SummaryError::Timeout(self.timeout))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(SummaryError::EmptyResponse);
        }
        debug!(title, "generated summary");
        Ok(text.to_string())
    }

    /// Summarize `(title, excerpt)` pairs concurrently; results keep input order.
    pub async fn summarize_batch(&self, items: &[(String, String)]) -> Vec<Summary> {
        stream::iter(items)
            .map(|(title, excerpt)| self.summarize(title, excerpt))
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
