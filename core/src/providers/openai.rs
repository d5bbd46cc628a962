use crate::traits::{ChatMessage, ChatRequest, ChatResponse, Provider, ToolCall, ToolSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool<'a>>>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCallOut<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OpenAiToolCallOut<'a> {
    id: &'a str,
    r#type: &'a str,
    function: OpenAiFunctionOut<'a>,
}

#[derive(Debug, Serialize)]
struct OpenAiFunctionOut<'a> {
    name: &'a str,
    arguments: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenAiTool<'a> {
    r#type: &'a str,
    function: OpenAiFunctionDecl<'a>,
}

#[derive(Debug, Serialize)]
struct OpenAiFunctionDecl<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCallIn>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCallIn {
    id: String,
    function: OpenAiFunctionIn,
}

#[derive(Debug, Deserialize)]
struct OpenAiFunctionIn {
    name: String,
    arguments: String,
}

/// Chat-completions provider; `base_url` makes it cover any service that
/// speaks the same wire.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn convert_messages<'a>(&self, messages: &'a [ChatMessage]) -> Vec<OpenAiMessage<'a>> {
        messages
            .iter()
            .map(|m| OpenAiMessage {
                role: &m.role,
                content: &m.content,
                tool_calls: m.tool_calls.as_ref().map(|calls| {
                    calls
                        .iter()
                        .map(|c| OpenAiToolCallOut {
                            id: &c.id,
                            r#type: "function",
                            function: OpenAiFunctionOut {
                                name: &c.name,
                                arguments: &c.arguments,
                            },
                        })
                        .collect()
                }),
                tool_call_id: m.tool_call_id.as_deref(),
            })
            .collect()
    }

    fn convert_tools<'a>(&self, tools: &'a [ToolSpec]) -> Vec<OpenAiTool<'a>> {
        tools
            .iter()
            .map(|t| OpenAiTool {
                r#type: "function",
                function: OpenAiFunctionDecl {
                    name: &t.name,
                    description: &t.description,
                    parameters: &t.parameters,
                },
            })
            .collect()
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let body = OpenAiRequest {
            model: &self.model,
            messages: self.convert_messages(request.messages),
            tools: request.tools.map(|t| self.convert_tools(t)),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error {status}: {error_text}");
        }

        let parsed: OpenAiResponse = response.json().await?;
        let Some(choice) = parsed.choices.into_iter().next() else {
            return Ok(ChatResponse::default());
        };

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|c| ToolCall {
                id: c.id,
                name: c.function.name,
                arguments: c.function.arguments,
            })
            .collect();

        Ok(ChatResponse {
            text: choice.message.content,
            tool_calls,
        })
    }
}
