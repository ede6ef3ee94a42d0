//! LLM analysis agent for the project status reporter.
//!
//! Sends the raw report to an OpenAI-compatible chat-completions endpoint
//! with a fixed instruction prompt and returns the cleaned-up analysis.
//! Failures are returned as [`AgentError`]; callers decide how to surface
//! them.
//!
//! # Example
//!
//! ```no_run
//! use reporter_agent::{AnalysisAgent, ChatClient, ModelConfig, Summarizer};
//!
//! # async fn run() -> reporter_agent::Result<()> {
//! let client = ChatClient::new("sk-or-...")?;
//! let agent = AnalysisAgent::new(client, ModelConfig::default());
//! let analysis = agent.summarize("**Trello Board Status:**\nTotal Cards: 0").await?;
//! println!("{}", analysis);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod client;
pub mod config;
pub mod error;
pub mod prompts;
pub mod tools;

pub use agent::{AnalysisAgent, Summarizer};
pub use client::{ChatClient, ChatMessage, ChatResponse};
pub use config::ModelConfig;
pub use error::{AgentError, Result};
pub use tools::{FnTool, Tool, ToolCall, ToolDefinition, ToolRegistry};
