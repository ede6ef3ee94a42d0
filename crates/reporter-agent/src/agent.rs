//! The analysis agent.

use async_trait::async_trait;
use tracing::{debug, info, trace};

use crate::client::{ChatClient, ChatMessage, ChatTool};
use crate::config::ModelConfig;
use crate::error::{AgentError, Result};
use crate::prompts::{analysis_prompt, post_process, SYSTEM_PROMPT};
use crate::tools::ToolRegistry;

/// Turns a raw report into an analysis.
///
/// The request handler depends on this trait rather than on
/// [`AnalysisAgent`], so tests can substitute canned or failing analyses.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produces the analysis text for `report`.
    async fn summarize(&self, report: &str) -> Result<String>;
}

/// LLM-backed analysis agent.
#[derive(Debug, Clone)]
pub struct AnalysisAgent {
    client: ChatClient,
    config: ModelConfig,
    tools: ToolRegistry,
}

impl AnalysisAgent {
    /// Creates an agent with no tools.
    pub fn new(client: ChatClient, config: ModelConfig) -> Self {
        Self {
            client,
            config,
            tools: ToolRegistry::new(),
        }
    }

    /// Replaces the tool registry.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    async fn run(&self, report: &str) -> Result<String> {
        let mut messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(analysis_prompt(report)),
        ];
        let chat_tools: Option<Vec<ChatTool>> = if self.tools.is_empty() {
            None
        } else {
            Some(
                self.tools
                    .definitions()
                    .into_iter()
                    .map(ChatTool::from_definition)
                    .collect(),
            )
        };

        for iteration in 1..=self.config.max_iterations {
            trace!(iteration, "Analysis loop iteration");
            let response = self
                .client
                .chat(&self.config, messages.clone(), chat_tools.clone())
                .await?;

            let calls = response
                .message()
                .and_then(|m| m.tool_calls.clone())
                .filter(|calls| !calls.is_empty());

            let Some(calls) = calls else {
                let content = response.content().unwrap_or_default();
                if content.trim().is_empty() {
                    return Err(AgentError::EmptyResponse);
                }
                return Ok(content.to_string());
            };

            debug!(count = calls.len(), "Model requested tool calls");
            messages.push(ChatMessage::assistant_with_tools(
                response.content().map(String::from),
                calls.clone(),
            ));
            for call in &calls {
                let call = call.to_tool_call()?;
                let output = self.tools.execute(&call).await?;
                messages.push(ChatMessage::tool(&call.id, output));
            }
        }

        Err(AgentError::MaxIterationsExceeded(self.config.max_iterations))
    }
}

#[async_trait]
impl Summarizer for AnalysisAgent {
    async fn summarize(&self, report: &str) -> Result<String> {
        if report.trim().is_empty() {
            return Err(AgentError::EmptyInput);
        }
        info!(model = %self.config.model, tools = self.tools.len(), "Invoking analysis model");
        let analysis = self.run(report).await?;
        info!(chars = analysis.len(), "Analysis completed");
        Ok(post_process(&analysis))
    }
}
