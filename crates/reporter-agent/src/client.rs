//! OpenAI-compatible chat completions client.
//!
//! Works against OpenRouter by default; any endpoint that speaks the
//! chat-completions wire format can be configured instead.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{ModelConfig, DEFAULT_API_URL};
use crate::error::{AgentError, Result};
use crate::tools::{ToolCall, ToolDefinition};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Chat completions client.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a client for the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AgentError::Configuration("LLM API key is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AgentError::Configuration(format!("failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Use another chat-completions endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// The endpoint requests go to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Send a chat completion request.
    pub async fn chat(
        &self,
        config: &ModelConfig,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ChatTool>>,
    ) -> Result<ChatResponse> {
        let request = ChatRequest {
            model: config.model.clone(),
            messages,
            tools,
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
        };

        trace!(model = %request.model, messages = request.messages.len(), "Sending chat request");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("X-Title", "Project Status Reporter")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ResponseParse(format!("failed to parse response: {}", e)))?;

        debug!(
            tokens = response.usage.as_ref().map_or(0, |u| u.total_tokens),
            "Chat response received"
        );

        Ok(response)
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ChatTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A message in the chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Tool calls made by the assistant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChatToolCall>>,

    /// Tool call ID for tool result messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn with_role(role: &str, content: Option<String>) -> Self {
        Self {
            role: role.to_string(),
            content,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", Some(content.into()))
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", Some(content.into()))
    }

    /// Create an assistant message with tool calls.
    pub fn assistant_with_tools(content: Option<String>, tool_calls: Vec<ChatToolCall>) -> Self {
        Self {
            tool_calls: Some(tool_calls),
            ..Self::with_role("assistant", content)
        }
    }

    /// Create a tool result message.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role("tool", Some(content.into()))
        }
    }
}

/// Tool call in a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatToolCall {
    pub id: String,

    /// Always "function".
    #[serde(rename = "type")]
    pub call_type: String,

    pub function: ChatToolFunction,
}

impl ChatToolCall {
    /// Convert to a [`ToolCall`], parsing the JSON arguments.
    pub fn to_tool_call(&self) -> Result<ToolCall> {
        let arguments = if self.function.arguments.trim().is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            serde_json::from_str(&self.function.arguments).map_err(|e| {
                AgentError::ResponseParse(format!("invalid tool arguments JSON: {}", e))
            })?
        };
        Ok(ToolCall {
            id: self.id.clone(),
            name: self.function.name.clone(),
            arguments,
        })
    }
}

/// Function details in a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatToolFunction {
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

/// Tool definition for the API.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTool {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: ToolDefinition,
}

impl ChatTool {
    pub fn from_definition(def: ToolDefinition) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: def,
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

impl ChatResponse {
    /// Get the first choice's message.
    pub fn message(&self) -> Option<&ResponseMessage> {
        self.choices.first().map(|c| &c.message)
    }

    /// Check if the response has tool calls.
    pub fn has_tool_calls(&self) -> bool {
        self.message()
            .and_then(|m| m.tool_calls.as_ref())
            .is_some_and(|calls| !calls.is_empty())
    }

    /// Text content of the first choice.
    pub fn content(&self) -> Option<&str> {
        self.message().and_then(|m| m.content.as_deref())
    }
}

/// A choice in the completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message in a completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ChatToolCall>>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
