use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::types::{CreatePipeRequest, CreatePipeResponse, Message, PipeRequest, PipeResponse};
use crate::config::{LangbaseConfig, PipeConfig, RequestConfig};
use crate::error::{LangbaseError, LangbaseResult};
use crate::prompts::{MESSAGE_POLISH_PROMPT, PAIN_REFINER_PROMPT};

const REFINEMENT_MODEL: &str = "openai:gpt-4o-mini";

/// Client for the Langbase pipes API with retry and backoff.
#[derive(Clone)]
pub struct LangbaseClient {
    client: Client,
    base_url: String,
    api_key: String,
    request_config: RequestConfig,
}

impl LangbaseClient {
    /// Client for `config`, with timeouts and retries from `request_config`.
    pub fn new(config: &LangbaseConfig, request_config: RequestConfig) -> LangbaseResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(LangbaseError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Run a pipe, retrying failed attempts with exponential backoff.
    pub async fn call_pipe(&self, request: PipeRequest) -> LangbaseResult<PipeResponse> {
        let url = format!("{}/v1/pipes/run", self.base_url);
        let pipe_name = request.name.clone();

        let mut last_error = None;
        let mut retries = 0;

        while retries <= self.request_config.max_retries {
            if retries > 0 {
                let delay = Duration::from_millis(
                    self.request_config.retry_delay_ms * (2_u64.pow(retries - 1)),
                );
                warn!(
                    pipe = %pipe_name,
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "Retrying Langbase request"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();

            match self.execute_request(&url, &request).await {
                Ok(response) => {
                    let latency = start.elapsed();
                    info!(
                        pipe = %pipe_name,
                        latency_ms = latency.as_millis(),
                        "Langbase pipe call succeeded"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    let latency = start.elapsed();
                    error!(
                        pipe = %pipe_name,
                        error = %e,
                        latency_ms = latency.as_millis(),
                        retry = retries,
                        "Langbase pipe call failed"
                    );
                    last_error = Some(e);
                    retries += 1;
                }
            }
        }

        Err(LangbaseError::Unavailable {
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
            retries,
        })
    }

    async fn execute_request(
        &self,
        url: &str,
        request: &PipeRequest,
    ) -> LangbaseResult<PipeResponse> {
        debug!(
            pipe = %request.name,
            messages = request.messages.len(),
            "Calling Langbase pipe"
        );

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LangbaseError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    LangbaseError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LangbaseError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let pipe_response: PipeResponse =
            response
                .json()
                .await
                .map_err(|e| LangbaseError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        Ok(pipe_response)
    }

    /// Run a pipe with a single user message and return the completion.
    ///
    /// A response with `success: false` or an empty completion is an
    /// `InvalidResponse`.
    pub async fn complete(&self, pipe: &str, user_content: String) -> LangbaseResult<String> {
        let response = self
            .call_pipe(PipeRequest::new(pipe, vec![Message::user(user_content)]))
            .await?;
        if let Some(tokens) = response.total_tokens() {
            debug!(pipe = %pipe, tokens, "Pipe usage");
        }
        if !response.success || response.completion.trim().is_empty() {
            return Err(LangbaseError::InvalidResponse {
                message: format!("pipe {} returned no completion", pipe),
            });
        }
        Ok(response.completion)
    }

    /// Base URL requests go to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create or upsert a pipe.
    pub async fn create_pipe(
        &self,
        request: CreatePipeRequest,
    ) -> LangbaseResult<CreatePipeResponse> {
        let url = format!("{}/v1/pipes", self.base_url);

        info!(pipe = %request.name, "Creating Langbase pipe");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(LangbaseError::Http)?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LangbaseError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let pipe_response: CreatePipeResponse =
            response
                .json()
                .await
                .map_err(|e| LangbaseError::InvalidResponse {
                    message: format!("Failed to parse create pipe response: {}", e),
                })?;

        info!(
            pipe = %pipe_response.name,
            url = %pipe_response.url,
            "Pipe created successfully"
        );

        Ok(pipe_response)
    }

    /// Make sure both refinement pipes exist with the current prompts.
    pub async fn ensure_refinement_pipes(&self, pipes: &PipeConfig) -> LangbaseResult<()> {
        let specs = [
            (
                pipes.pain_refiner.as_str(),
                "Re-rank and re-word research pain hypotheses",
                PAIN_REFINER_PROMPT,
                0.2,
            ),
            (
                pipes.message_polish.as_str(),
                "Polish outreach drafts without changing facts",
                MESSAGE_POLISH_PROMPT,
                0.4,
            ),
        ];

        for (name, description, prompt, temperature) in specs {
            let request = CreatePipeRequest::new(name)
                .with_description(description)
                .with_model(REFINEMENT_MODEL)
                .with_upsert(true)
                .with_json_output(true)
                .with_temperature(temperature)
                .with_max_tokens(1200)
                .with_messages(vec![Message::system(prompt)]);

            match self.create_pipe(request).await {
                Ok(_) => info!(pipe = %name, "Refinement pipe ready"),
                Err(LangbaseError::Api { status: 409, .. }) => {
                    info!(pipe = %name, "Pipe already exists");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
