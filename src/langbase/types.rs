use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One chat message in a pipe run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who is speaking.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
}

/// Chat role of a pipe message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// End-user turn.
    User,
    /// Model turn.
    Assistant,
}

impl Message {
    /// System-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// User-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Body of `POST /v1/pipes/run`.
#[derive(Debug, Clone, Serialize)]
pub struct PipeRequest {
    /// Pipe name.
    pub name: String,
    /// Conversation sent to the pipe.
    pub messages: Vec<Message>,
    /// Always false; the refiners need the whole completion at once.
    pub stream: bool,
    /// Template variables substituted into the pipe prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<HashMap<String, String>>,
}

impl PipeRequest {
    /// Run request with no variables.
    pub fn new(name: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            name: name.into(),
            messages,
            stream: false,
            variables: None,
        }
    }

    /// Add one template variable.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Response from a pipe run. Only the completion text is used.
#[derive(Debug, Clone, Deserialize)]
pub struct PipeResponse {
    /// Whether Langbase reported success.
    pub success: bool,
    /// Model output text.
    pub completion: String,
    /// Raw provider response, when returned.
    #[serde(default)]
    pub raw: Option<RawResponse>,
}

/// Provider details attached to a run response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResponse {
    /// Model that served the run.
    pub model: Option<String>,
    /// Token usage.
    pub usage: Option<Usage>,
}

/// Token counts for one run.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Prompt tokens.
    pub prompt_tokens: Option<u32>,
    /// Completion tokens.
    pub completion_tokens: Option<u32>,
    /// Prompt plus completion tokens.
    pub total_tokens: Option<u32>,
}

impl PipeResponse {
    /// Total tokens billed, when the API reported them.
    pub fn total_tokens(&self) -> Option<u32> {
        self.raw.as_ref()?.usage.as_ref()?.total_tokens
    }
}

// ============================================================================
// Pipe provisioning
// ============================================================================

/// Body of `POST /v1/pipes`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePipeRequest {
    /// Pipe name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Model id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Update in place if the pipe exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upsert: Option<bool>,
    /// Request JSON output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Completion token cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Prompt messages stored on the pipe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

impl CreatePipeRequest {
    /// Request with only a name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            model: None,
            upsert: None,
            json: None,
            temperature: None,
            max_tokens: None,
            messages: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Model id such as `openai:gpt-4o-mini`.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Update the pipe in place if it already exists.
    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = Some(upsert);
        self
    }

    /// Ask the pipe for JSON output.
    pub fn with_json_output(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }

    /// Sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Completion token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Prompt messages stored on the pipe.
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }
}

/// Langbase's reply to a pipe create or upsert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePipeResponse {
    /// Pipe name.
    pub name: String,
    /// Description as stored.
    #[serde(default)]
    pub description: Option<String>,
    /// Creation status.
    pub status: String,
    /// Pipe endpoint URL.
    pub url: String,
}

// ============================================================================
// Refinement pipe payloads
// ============================================================================

/// One pain proposed by the pain-refiner pipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainSuggestion {
    /// Pain statement.
    pub pain: String,
    /// Confidence in 0.0 to 1.0.
    pub confidence: f64,
    /// Source string the pipe claims backs the pain. `None` or empty means
    /// the pipe offered none.
    #[serde(default)]
    pub evidence: Option<String>,
}

/// Output of the message-polish pipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolishResponse {
    /// Polished message body.
    pub body: String,
}

/// Strip a Markdown code fence the model may wrap its JSON in.
pub fn strip_code_fence(completion: &str) -> &str {
    let trimmed = completion.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

impl PainSuggestion {
    /// Parse a completion holding a JSON array of suggestions, either bare
    /// or under a `pains` key.
    pub fn list_from_completion(completion: &str) -> Result<Vec<Self>, serde_json::Error> {
        #[derive(Deserialize)]
        struct Wrapped {
            pains: Vec<PainSuggestion>,
        }

        let body = strip_code_fence(completion);
        match serde_json::from_str::<Vec<Self>>(body) {
            Ok(list) => Ok(list),
            Err(e) => serde_json::from_str::<Wrapped>(body)
                .map(|w| w.pains)
                .map_err(|_| e),
        }
    }
}

impl PolishResponse {
    /// Parse `{"body": ...}`, falling back to the raw completion text.
    pub fn from_completion(completion: &str) -> Self {
        let body = strip_code_fence(completion);
        if let Ok(parsed) = serde_json::from_str::<PolishResponse>(body) {
            return parsed;
        }
        Self {
            body: completion.trim().to_string(),
        }
    }
}
