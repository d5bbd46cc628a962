use crate::agent::{Conversation, ToolInvoker, ToolRegistry};
use crate::traits::{ChatRequest, Provider};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_MAX_ROUNDS: usize = 10;

const DEFAULT_SYSTEM_PROMPT: &str = "You are an assistant that answers questions about YouTube content.\n\n\
You can extract video ids from URLs, fetch transcripts (plain or timestamped), \
search for videos, and look up metadata, thumbnails, channels and playlists. \
Call the tools you need, then answer from their results. If a tool reports an \
error, try another approach or explain the problem in your answer.";

#[derive(Debug, Error)]
pub enum AgentError {
    /// The model kept requesting tools past the configured round ceiling.
    #[error("tool-calling loop exceeded {rounds} rounds without a final answer")]
    LoopBoundExceeded { rounds: usize },

    #[error("model request failed: {0}")]
    Model(anyhow::Error),
}

/// The orchestration loop: alternates model turns with tool dispatch until
/// the model answers without requesting tools, or the round ceiling is hit.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    invoker: ToolInvoker,
    system_prompt: String,
    max_rounds: usize,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>, registry: Arc<ToolRegistry>) -> Self {
        let invoker = ToolInvoker::new(registry.clone());
        Self {
            provider,
            registry,
            invoker,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max;
        self
    }

    /// Run one session to completion. Holds no per-run state on `self`, so
    /// a shared loop serves concurrent sessions, each with its own history.
    pub async fn run(&self, query: &str) -> Result<String, AgentError> {
        let mut conversation = Conversation::seed(Some(&self.system_prompt), query);

        // The tool set is fixed for the session; collect it once.
        let specs = self.registry.specs();
        let tools = if specs.is_empty() {
            None
        } else {
            Some(specs.as_slice())
        };

        let mut rounds = 0usize;

        loop {
            let request = ChatRequest {
                messages: conversation.messages(),
                tools,
            };
            // The one suspension point that blocks on model I/O.
            let reply = self
                .provider
                .chat(request)
                .await
                .map_err(AgentError::Model)?;

            let text = reply.text_or_empty().to_string();
            conversation.push_assistant(&text, reply.tool_calls.clone());

            if reply.tool_calls.is_empty() {
                debug!(messages = conversation.len(), rounds, "session finished");
                return Ok(text);
            }

            rounds += 1;
            if rounds > self.max_rounds {
                warn!(
                    max_rounds = self.max_rounds,
                    "aborting: model keeps requesting tools"
                );
                return Err(AgentError::LoopBoundExceeded {
                    rounds: self.max_rounds,
                });
            }

            debug!(
                round = rounds,
                calls = reply.tool_calls.len(),
                "dispatching tool calls"
            );
            // Invocations are independent and fan out concurrently; results
            // are appended in request order, not completion order, and all
            // of them land before the next model turn.
            let results = join_all(
                reply
                    .tool_calls
                    .iter()
                    .map(|call| self.invoker.invoke(call)),
            )
            .await;
            for result in results {
                conversation.push_result(result.request_id, result.payload);
            }
        }
    }
}
