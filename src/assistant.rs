use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

// Conversation adapter for an assistants-style generation service: threads,
// messages, polled runs, and a one-shot image endpoint.

const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
}

impl RunStatus {
    /// Still waiting on the provider; keep polling.
    pub fn is_pending(&self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl ThreadMessage {
    /// First text payload of the message, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find_map(|c| c.text.as_ref().map(|t| t.value.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<MessageText>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageText {
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: String,
    pub style: String,
    pub quality: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantInfo {
    pub id: String,
    pub name: Option<String>,
    pub model: String,
    pub instructions: Option<String>,
}

/// Capability surface of the remote service. The adapter depends on this
/// trait, not on any particular transport.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    async fn create_thread(&self) -> Result<String>;
    async fn add_message(&self, thread_id: &str, content: &str) -> Result<()>;
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;
    /// Newest message in the thread, if the thread has any.
    async fn latest_message(&self, thread_id: &str) -> Result<Option<ThreadMessage>>;
    async fn generate_image(&self, request: &ImageRequest) -> Result<GeneratedImage>;
    async fn create_assistant(&self, name: &str, instructions: &str, model: &str)
        -> Result<String>;
    async fn update_assistant(
        &self,
        assistant_id: &str,
        name: Option<&str>,
        instructions: Option<&str>,
    ) -> Result<()>;
    async fn get_assistant(&self, assistant_id: &str) -> Result<AssistantInfo>;
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("the story run failed: {0}")]
    RunFailed(String),
    #[error("the story run ended in an unexpected state: {0}")]
    UnexpectedStatus(RunStatus),
    #[error("the reply contained no text")]
    EmptyReply,
    #[error("timed out after {0:?} waiting for the story run to finish")]
    Timeout(Duration),
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// One remote conversation. The thread handle is created lazily on the first
/// send and reused for every following round trip, so "regenerate" responses
/// are context-influenced continuations. Only an explicit reset discards it.
pub struct Conversation {
    api: Arc<dyn AssistantApi>,
    assistant_id: String,
    thread_id: Option<String>,
    primer: Option<String>,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl Conversation {
    pub fn new(api: Arc<dyn AssistantApi>, assistant_id: String, config: &Config) -> Self {
        Self {
            api,
            assistant_id,
            thread_id: None,
            primer: None,
            poll_interval: Duration::from_millis(config.assistant.poll_interval_ms),
            poll_timeout: Duration::from_secs(config.assistant.poll_timeout_seconds),
        }
    }

    /// Primer text sent as a full round trip exactly once per fresh thread,
    /// before the first real message.
    pub fn with_primer(mut self, primer: String) -> Self {
        self.primer = Some(primer);
        self
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    async fn ensure_thread(&mut self) -> Result<String, GenerationError> {
        if let Some(id) = &self.thread_id {
            return Ok(id.clone());
        }
        let id = self
            .api
            .create_thread()
            .await
            .context("Failed to create conversation thread")?;
        log::info!("Created thread {}", id);
        self.thread_id = Some(id.clone());

        if let Some(primer) = self.primer.clone() {
            log::debug!("Priming thread {} with system context", id);
            self.round_trip(&id, &primer).await?;
        }
        Ok(id)
    }

    /// Sends a message and blocks until the reply text or a failure. The
    /// thread stays usable after any error; retrying is always the caller's
    /// explicit decision.
    pub async fn send(&mut self, content: &str) -> Result<String, GenerationError> {
        let thread_id = self.ensure_thread().await?;
        self.round_trip(&thread_id, content).await
    }

    async fn round_trip(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<String, GenerationError> {
        self.api
            .add_message(thread_id, content)
            .await
            .context("Failed to post message")?;

        let mut run = self
            .api
            .create_run(thread_id, &self.assistant_id)
            .await
            .context("Failed to start run")?;

        let started = std::time::Instant::now();
        while run.status.is_pending() {
            if started.elapsed() >= self.poll_timeout {
                return Err(GenerationError::Timeout(self.poll_timeout));
            }
            tokio::time::sleep(self.poll_interval).await;
            run = self
                .api
                .get_run(thread_id, &run.id)
                .await
                .context("Failed to poll run")?;
        }

        match run.status {
            RunStatus::Completed => {
                let message = self
                    .api
                    .latest_message(thread_id)
                    .await
                    .context("Failed to fetch reply")?;
                message
                    .as_ref()
                    .and_then(|m| m.first_text())
                    .map(|t| t.to_string())
                    .ok_or(GenerationError::EmptyReply)
            }
            RunStatus::Failed => {
                let reason = run
                    .last_error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "Unknown error".to_string());
                Err(GenerationError::RunFailed(reason))
            }
            other => Err(GenerationError::UnexpectedStatus(other)),
        }
    }

    /// Discards the current thread and creates a fresh one, so no context
    /// leaks across unrelated stories. Returns the new thread id.
    pub async fn reset(&mut self) -> Result<String, GenerationError> {
        self.thread_id = None;
        self.ensure_thread().await
    }
}

// --- HTTP implementation (Assistants v2 REST surface) ---

pub struct HttpAssistantApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpAssistantApi {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self::new(&config.assistant.base_url, &api_key))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(anyhow!("API error {}: {}", status, body))
    }
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Deserialize)]
struct ObjectWithId {
    id: String,
}

#[derive(Deserialize)]
struct MessageListResponse {
    #[serde(default)]
    data: Vec<ThreadMessage>,
}

#[derive(Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    style: &'a str,
    quality: &'a str,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Serialize)]
struct CreateAssistantRequest<'a> {
    name: &'a str,
    instructions: &'a str,
    model: &'a str,
    tools: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct UpdateAssistantRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
}

#[async_trait]
impl AssistantApi for HttpAssistantApi {
    async fn create_thread(&self) -> Result<String> {
        let resp = self
            .request(reqwest::Method::POST, "/threads")
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let thread: ObjectWithId = Self::check(resp).await?.json().await?;
        Ok(thread.id)
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<()> {
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/threads/{}/messages", thread_id),
            )
            .json(&MessageRequest {
                role: "user",
                content,
            })
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let resp = self
            .request(reqwest::Method::POST, &format!("/threads/{}/runs", thread_id))
            .json(&CreateRunRequest { assistant_id })
            .send()
            .await?;
        let run: Run = Self::check(resp).await?.json().await?;
        Ok(run)
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let resp = self
            .request(
                reqwest::Method::GET,
                &format!("/threads/{}/runs/{}", thread_id, run_id),
            )
            .send()
            .await?;
        let run: Run = Self::check(resp).await?.json().await?;
        Ok(run)
    }

    async fn latest_message(&self, thread_id: &str) -> Result<Option<ThreadMessage>> {
        let resp = self
            .request(
                reqwest::Method::GET,
                &format!("/threads/{}/messages?order=desc&limit=1", thread_id),
            )
            .send()
            .await?;
        let list: MessageListResponse = Self::check(resp).await?.json().await?;
        Ok(list.data.into_iter().next())
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<GeneratedImage> {
        let resp = self
            .request(reqwest::Method::POST, "/images/generations")
            .json(&ImageGenerationRequest {
                model: DEFAULT_IMAGE_MODEL,
                prompt: &request.prompt,
                n: 1,
                size: &request.size,
                style: &request.style,
                quality: &request.quality,
            })
            .send()
            .await?;
        let body: ImageGenerationResponse = Self::check(resp).await?.json().await?;
        body.data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No image data returned"))
    }

    async fn create_assistant(
        &self,
        name: &str,
        instructions: &str,
        model: &str,
    ) -> Result<String> {
        let resp = self
            .request(reqwest::Method::POST, "/assistants")
            .json(&CreateAssistantRequest {
                name,
                instructions,
                model,
                tools: vec![],
            })
            .send()
            .await?;
        let assistant: ObjectWithId = Self::check(resp).await?.json().await?;
        Ok(assistant.id)
    }

    async fn update_assistant(
        &self,
        assistant_id: &str,
        name: Option<&str>,
        instructions: Option<&str>,
    ) -> Result<()> {
        if name.is_none() && instructions.is_none() {
            return Ok(());
        }
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/assistants/{}", assistant_id),
            )
            .json(&UpdateAssistantRequest { name, instructions })
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn get_assistant(&self, assistant_id: &str) -> Result<AssistantInfo> {
        let resp = self
            .request(
                reqwest::Method::GET,
                &format!("/assistants/{}", assistant_id),
            )
            .send()
            .await?;
        let info: AssistantInfo = Self::check(resp).await?.json().await?;
        Ok(info)
    }
}
