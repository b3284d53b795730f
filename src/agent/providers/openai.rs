//! `OpenAI`-compatible provider implementation using the `async-openai` crate.
//!
//! Serves both `OpenAI` itself and Gemini through its `OpenAI`-compatible
//! endpoint; the two differ only in the default base URL.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
    ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent,
    ChatCompletionRequestToolMessage, ChatCompletionRequestToolMessageContent,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent, ChatCompletionTool,
    ChatCompletionToolType, CreateChatCompletionRequest, FunctionCall, FunctionObject,
};
use async_trait::async_trait;

use crate::agent::config::ResearchConfig;
use crate::agent::message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::agent::tool::ToolCall;
use crate::error::{AgentError, is_quota_message};

/// Gemini's `OpenAI`-compatible endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// `OpenAI`-compatible LLM provider.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    label: &'static str,
}

impl OpenAiProvider {
    /// Creates a provider talking to `OpenAI` (or `base_url`, when set).
    #[must_use]
    pub fn new(config: &ResearchConfig) -> Self {
        Self::build(config, config.base_url.as_deref(), "openai")
    }

    /// Creates a provider talking to Gemini's compatible endpoint unless
    /// `base_url` overrides it.
    #[must_use]
    pub fn gemini(config: &ResearchConfig) -> Self {
        let base_url = config.base_url.as_deref().unwrap_or(GEMINI_BASE_URL);
        Self::build(config, Some(base_url), "gemini")
    }

    fn build(config: &ResearchConfig, base_url: Option<&str>, label: &'static str) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(base_url) = base_url {
            openai_config = openai_config.with_api_base(base_url.trim_end_matches('/'));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self {
            client: Client::with_config(openai_config).with_http_client(http_client),
            label,
        }
    }

    /// Converts our message type to the `OpenAI` SDK type.
    fn convert_message(msg: &ChatMessage) -> ChatCompletionRequestMessage {
        match msg.role {
            Role::System => {
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                    name: None,
                })
            }
            Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                name: None,
            }),
            Role::Assistant => {
                let tool_calls = (!msg.tool_calls.is_empty()).then(|| {
                    msg.tool_calls
                        .iter()
                        .map(|tc| ChatCompletionMessageToolCall {
                            id: tc.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: tc.name.clone(),
                                arguments: tc.arguments.clone(),
                            },
                        })
                        .collect()
                });

                let content = (!msg.content.is_empty()).then(|| {
                    ChatCompletionRequestAssistantMessageContent::Text(msg.content.clone())
                });

                #[allow(deprecated)]
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content,
                    name: None,
                    tool_calls,
                    refusal: None,
                    audio: None,
                    function_call: None,
                })
            }
            Role::Tool => ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
                content: ChatCompletionRequestToolMessageContent::Text(msg.content.clone()),
                tool_call_id: msg.tool_call_id.clone().unwrap_or_default(),
            }),
        }
    }

    /// Builds an `OpenAI` chat completion request from our generic request.
    fn build_request(request: &ChatRequest) -> CreateChatCompletionRequest {
        let messages: Vec<_> = request.messages.iter().map(Self::convert_message).collect();

        let tools = (!request.tools.is_empty()).then(|| {
            request
                .tools
                .iter()
                .map(|td| ChatCompletionTool {
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionObject {
                        name: td.name.clone(),
                        description: Some(td.description.clone()),
                        parameters: Some(td.parameters.clone()),
                        strict: None,
                    },
                })
                .collect()
        });

        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            tools,
            ..Default::default()
        }
    }

    /// Maps an SDK error, separating provider overload from everything else.
    fn classify_error(err: &OpenAIError) -> AgentError {
        let status = match err {
            OpenAIError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        };
        let message = err.to_string();

        if status == Some(429) || is_quota_message(&message) || message.contains("rate_limit") {
            AgentError::RateLimited { message }
        } else {
            AgentError::ApiRequest { message, status }
        }
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("label", &self.label)
            .field("client", &"<async-openai::Client>")
            .finish()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let openai_request = Self::build_request(request);

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| Self::classify_error(&e))?;

        let choice = response.choices.first();

        let content = choice
            .and_then(|c| c.message.content.as_ref())
            .cloned()
            .unwrap_or_default();

        let tool_calls = choice
            .and_then(|c| c.message.tool_calls.as_ref())
            .map(|tcs| {
                tcs.iter()
                    .map(|tc| ToolCall {
                        id: tc.id.clone(),
                        name: tc.function.name.clone(),
                        arguments: tc.function.arguments.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let finish_reason = choice.and_then(|c| {
            c.finish_reason
                .as_ref()
                .map(|fr| format!("{fr:?}").to_lowercase())
        });

        let usage = response
            .usage
            .map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            });

        Ok(ChatResponse {
            content,
            usage,
            tool_calls,
            finish_reason,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::message;
    use crate::agent::tool::ToolDefinition;

    fn config() -> ResearchConfig {
        ResearchConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn test_provider_labels() {
        assert_eq!(OpenAiProvider::new(&config()).name(), "openai");
        assert_eq!(OpenAiProvider::gemini(&config()).name(), "gemini");
    }

    #[test]
    fn test_convert_tool_message() {
        let msg = message::tool_message("call_123", "No results found.");
        let converted = OpenAiProvider::convert_message(&msg);
        assert!(matches!(converted, ChatCompletionRequestMessage::Tool(_)));
    }

    #[test]
    fn test_convert_assistant_with_tool_calls_and_text() {
        let msg = message::assistant_tool_calls_message(
            "Searching now.".to_string(),
            vec![ToolCall {
                id: "call_1".to_string(),
                name: "WebSearchTool".to_string(),
                arguments: r#"{"input":"lead generation"}"#.to_string(),
            }],
        );
        let converted = OpenAiProvider::convert_message(&msg);
        if let ChatCompletionRequestMessage::Assistant(a) = converted {
            assert_eq!(a.tool_calls.as_ref().map_or(0, Vec::len), 1);
            assert!(a.content.is_some());
        } else {
            panic!("Expected Assistant message");
        }
    }

    #[test]
    fn test_build_request_with_tools() {
        let request = ChatRequest {
            model: "gemini-2.5-flash".to_string(),
            messages: vec![
                message::system_message("orchestrate"),
                message::user_message("research"),
            ],
            temperature: None,
            tools: vec![ToolDefinition {
                name: "current_date".to_string(),
                description: "Today's date".to_string(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }],
        };
        let built = OpenAiProvider::build_request(&request);
        assert_eq!(built.model, "gemini-2.5-flash");
        assert_eq!(built.messages.len(), 2);
        assert_eq!(built.tools.as_ref().map_or(0, Vec::len), 1);
    }

    #[test]
    fn test_build_request_without_tools() {
        let request = ChatRequest {
            model: "gemini-2.5-flash-lite".to_string(),
            messages: vec![message::user_message("reflect")],
            temperature: Some(0.2),
            tools: Vec::new(),
        };
        let built = OpenAiProvider::build_request(&request);
        assert!(built.tools.is_none());
        assert_eq!(built.temperature, Some(0.2));
    }

    #[test]
    fn test_classify_quota_error_as_rate_limited() {
        let err = OpenAIError::InvalidArgument("code 429: RESOURCE_EXHAUSTED".to_string());
        assert!(matches!(
            OpenAiProvider::classify_error(&err),
            AgentError::RateLimited { .. }
        ));
    }

    #[test]
    fn test_classify_other_error_as_api_request() {
        let err = OpenAIError::InvalidArgument("model not found".to_string());
        let mapped = OpenAiProvider::classify_error(&err);
        assert!(matches!(mapped, AgentError::ApiRequest { status: None, .. }));
        assert!(!mapped.is_transient());
    }
}
