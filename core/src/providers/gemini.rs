use crate::traits::{ChatMessage, ChatRequest, ChatResponse, Provider, ToolCall, ToolSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiToolDecl>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiToolDecl {
    function_declarations: Vec<GeminiFunctionDecl>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDecl {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
            model: "gemini-3-pro-preview".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
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

    /// System messages become the systemInstruction; tool results become
    /// functionResponse parts named after the call they answer (the wire
    /// has no call ids, names carry the correlation).
    fn convert_messages(
        &self,
        messages: &[ChatMessage],
    ) -> (Option<GeminiContent>, Vec<GeminiContent>) {
        let mut call_names: HashMap<String, String> = HashMap::new();
        let mut system: Option<GeminiContent> = None;
        let mut contents = Vec::new();

        for message in messages {
            match message.role.as_str() {
                "system" => {
                    system = Some(GeminiContent {
                        role: None,
                        parts: vec![GeminiPart {
                            text: Some(message.content.clone()),
                            ..Default::default()
                        }],
                    });
                }
                "user" => {
                    contents.push(GeminiContent {
                        role: Some("user".to_string()),
                        parts: vec![GeminiPart {
                            text: Some(message.content.clone()),
                            ..Default::default()
                        }],
                    });
                }
                "assistant" => {
                    let mut parts = Vec::new();
                    if !message.content.is_empty() {
                        parts.push(GeminiPart {
                            text: Some(message.content.clone()),
                            ..Default::default()
                        });
                    }
                    if let Some(calls) = &message.tool_calls {
                        for call in calls {
                            call_names.insert(call.id.clone(), call.name.clone());
                            let args = serde_json::from_str(&call.arguments)
                                .unwrap_or_else(|_| json!({}));
                            parts.push(GeminiPart {
                                function_call: Some(GeminiFunctionCall {
                                    name: call.name.clone(),
                                    args,
                                }),
                                ..Default::default()
                            });
                        }
                    }
                    if parts.is_empty() {
                        parts.push(GeminiPart {
                            text: Some(String::new()),
                            ..Default::default()
                        });
                    }
                    contents.push(GeminiContent {
                        role: Some("model".to_string()),
                        parts,
                    });
                }
                "tool" => {
                    let name = message
                        .tool_call_id
                        .as_ref()
                        .and_then(|id| call_names.get(id))
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string());
                    // the wire wants an object; non-object payloads get
                    // wrapped
                    let response = match serde_json::from_str::<serde_json::Value>(&message.content)
                    {
                        Ok(value) if value.is_object() => value,
                        _ => json!({ "content": message.content }),
                    };
                    contents.push(GeminiContent {
                        role: Some("user".to_string()),
                        parts: vec![GeminiPart {
                            function_response: Some(GeminiFunctionResponse { name, response }),
                            ..Default::default()
                        }],
                    });
                }
                _ => {}
            }
        }

        (system, contents)
    }

    fn convert_tools(&self, tools: &[ToolSpec]) -> Vec<GeminiToolDecl> {
        vec![GeminiToolDecl {
            function_declarations: tools
                .iter()
                .map(|t| GeminiFunctionDecl {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                })
                .collect(),
        }]
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let (system_instruction, contents) = self.convert_messages(request.messages);
        let body = GeminiRequest {
            contents,
            tools: request.tools.map(|t| self.convert_tools(t)),
            system_instruction,
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {status}: {error_text}");
        }

        let parsed: GeminiResponse = response.json().await?;
        let Some(content) = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
        else {
            return Ok(ChatResponse::default());
        };

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();
        for part in content.parts {
            if let Some(text) = part.text
                && !text.is_empty()
            {
                text_parts.push(text);
            }
            if let Some(call) = part.function_call {
                // no ids on the wire; synthesize positional ones
                let id = format!("call_{}_{}", tool_calls.len(), call.name);
                tool_calls.push(ToolCall {
                    id,
                    name: call.name,
                    arguments: call.args.to_string(),
                });
            }
        }

        Ok(ChatResponse {
            text: if text_parts.is_empty() {
                None
            } else {
                Some(text_parts.join("\n"))
            },
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        GeminiProvider::new("test-key")
    }

    #[test]
    fn system_message_becomes_system_instruction() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let (system, contents) = provider().convert_messages(&messages);
        assert_eq!(system.unwrap().parts[0].text.as_deref(), Some("be brief"));
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role.as_deref(), Some("user"));
    }

    #[test]
    fn tool_result_is_named_after_its_call() {
        let messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant_with_tool_calls(
                "",
                vec![ToolCall {
                    id: "call_0_fetch_transcript".to_string(),
                    name: "fetch_transcript".to_string(),
                    arguments: r#"{"video_id": "abc"}"#.to_string(),
                }],
            ),
            ChatMessage::tool_result("call_0_fetch_transcript", "some words"),
        ];
        let (_, contents) = provider().convert_messages(&messages);

        let response = contents[2].parts[0].function_response.as_ref().unwrap();
        assert_eq!(response.name, "fetch_transcript");
        // scalar payloads are wrapped into an object for the wire
        assert_eq!(response.response["content"], "some words");
    }

    #[test]
    fn structured_payload_passes_through_as_object() {
        let messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant_with_tool_calls(
                "",
                vec![ToolCall {
                    id: "c1".to_string(),
                    name: "get_full_metadata".to_string(),
                    arguments: "{}".to_string(),
                }],
            ),
            ChatMessage::tool_result("c1", r#"{"title": "x"}"#),
        ];
        let (_, contents) = provider().convert_messages(&messages);
        let response = contents[2].parts[0].function_response.as_ref().unwrap();
        assert_eq!(response.response["title"], "x");
    }

    #[test]
    fn response_parsing_extracts_function_calls() {
        let raw = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "checking"},
                        {"functionCall": {"name": "search_youtube", "args": {"query": "rust"}}}
                    ]
                }
            }]
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let content = parsed.candidates[0].content.as_ref().unwrap();
        assert_eq!(content.parts.len(), 2);
        let call = content.parts[1].function_call.as_ref().unwrap();
        assert_eq!(call.name, "search_youtube");
        assert_eq!(call.args["query"], "rust");
    }
}
