use crate::traits::{ChatMessage, ToolCall};

/// Append-only message history threaded through the agent loop.
///
/// Invariant: every tool-result message answers a tool call announced by
/// an earlier assistant message, and the results for one batch sit
/// contiguously, in request order, before the next assistant message.
/// Nothing is ever mutated in place; the loop only appends.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Seed a session: optional system prompt followed by the user query.
    pub fn seed(system_prompt: Option<&str>, query: &str) -> Self {
        let mut messages = Vec::new();
        if let Some(prompt) = system_prompt
            && !prompt.is_empty()
        {
            messages.push(ChatMessage::system(prompt));
        }
        messages.push(ChatMessage::user(query));
        Self { messages }
    }

    /// Append a model reply, with its pending tool calls when present.
    pub fn push_assistant(&mut self, text: &str, tool_calls: Vec<ToolCall>) {
        if tool_calls.is_empty() {
            self.messages.push(ChatMessage::assistant(text));
        } else {
            self.messages
                .push(ChatMessage::assistant_with_tool_calls(text, tool_calls));
        }
    }

    /// Append one tool result, correlated to its request id.
    pub fn push_result(&mut self, request_id: impl Into<String>, payload: impl Into<String>) {
        self.messages
            .push(ChatMessage::tool_result(request_id, payload));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_orders_system_before_user() {
        let conversation = Conversation::seed(Some("be helpful"), "what is this video?");
        let roles: Vec<&str> = conversation
            .messages()
            .iter()
            .map(|m| m.role.as_str())
            .collect();
        assert_eq!(roles, ["system", "user"]);
    }

    #[test]
    fn seed_without_system_prompt() {
        let conversation = Conversation::seed(None, "hi");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.last().unwrap().role, "user");
    }

    #[test]
    fn results_follow_the_assistant_message_in_order() {
        let mut conversation = Conversation::seed(None, "q");
        let calls = vec![
            ToolCall {
                id: "a".into(),
                name: "one".into(),
                arguments: "{}".into(),
            },
            ToolCall {
                id: "b".into(),
                name: "two".into(),
                arguments: "{}".into(),
            },
        ];
        conversation.push_assistant("", calls);
        conversation.push_result("a", "first");
        conversation.push_result("b", "second");

        let messages = conversation.messages();
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("a"));
        assert_eq!(messages[3].tool_call_id.as_deref(), Some("b"));
    }
}
