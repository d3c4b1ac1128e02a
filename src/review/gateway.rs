//! OpenAI-compatible chat-completions gateway for review generation.
//!
//! Like the repository gateway, this seam is trait-based so the generator's
//! sequencing logic can be tested against a mock. The HTTP implementation
//! targets any OpenAI-compatible chat-completions endpoint and throttles
//! calls through its own [`SlidingWindowLimiter`], independent of the
//! repository limiter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::error::AppraiseError;
use crate::throttle::SlidingWindowLimiter;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Role tag of one conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Reviewer framing and task instructions.
    System,
    /// Material under review.
    User,
    /// Output of an earlier pass, fed back as context.
    Assistant,
}

/// One role-tagged message in a chat-completions conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Message role.
    pub role: ChatRole,
    /// Message body.
    pub content: String,
}

impl ChatMessage {
    /// Convenience constructor.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Gateway issuing one rate-limited text-generation call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCompletionGateway: Send + Sync {
    /// Sends the ordered message list and returns the generated text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppraiseError>;
}

/// Configuration for [`OpenAiChatGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiChatConfig {
    /// Base API URL (e.g., `https://api.openai.com/v1`).
    pub base_url: String,
    /// Model identifier sent in chat-completions requests.
    pub model: String,
    /// API key used for bearer authentication.
    pub api_key: Option<String>,
    /// Per-call HTTP timeout.
    pub timeout: Duration,
}

impl Default for OpenAiChatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OpenAiChatConfig {
    /// Constructs configuration with explicit API settings.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            timeout,
        }
    }
}

/// OpenAI-compatible gateway implementation.
#[derive(Debug)]
pub struct OpenAiChatGateway {
    config: OpenAiChatConfig,
    client: Client,
    limiter: Arc<SlidingWindowLimiter>,
}

impl OpenAiChatGateway {
    /// Creates a gateway from explicit configuration and a limiter.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::Configuration`] when the HTTP client cannot
    /// be constructed.
    pub fn new(
        config: OpenAiChatConfig,
        limiter: Arc<SlidingWindowLimiter>,
    ) -> Result<Self, AppraiseError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| AppraiseError::Configuration {
                message: format!("failed to configure generation HTTP client: {error}"),
            })?;

        Ok(Self {
            config,
            client,
            limiter,
        })
    }

    fn extract_api_key(&self) -> Result<&str, AppraiseError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| AppraiseError::Configuration {
                message: "generation API key is required (use --openai-api-key, \
                          APPRAISE_OPENAI_API_KEY, or OPENAI_API_KEY)"
                    .to_owned(),
            })
    }
}

#[async_trait]
impl ChatCompletionGateway for OpenAiChatGateway {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppraiseError> {
        let api_key = self.extract_api_key()?;
        let endpoint = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = ChatCompletionsRequest {
            model: self.config.model.as_str(),
            messages,
        };

        self.limiter.acquire().await;
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| AppraiseError::GenerationFailed {
                message: format!("generation request transport failed: {error}"),
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.map_or_else(
                |_| "(failed to read error response body)".to_owned(),
                |content| truncate_for_message(content.as_str(), 160),
            );
            return Err(AppraiseError::GenerationFailed {
                message: format!(
                    "generation request failed with status {}: {body}",
                    status.as_u16()
                ),
            });
        }

        let response_payload: ChatCompletionsResponse =
            response
                .json()
                .await
                .map_err(|error| AppraiseError::GenerationFailed {
                    message: format!("generation response JSON decoding failed: {error}"),
                })?;

        response_payload
            .choices
            .first()
            .and_then(|choice| parse_content_value(&choice.message.content))
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(|| AppraiseError::GenerationFailed {
                message: "generation response did not contain assistant text".to_owned(),
            })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, serde::Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

#[derive(Debug, serde::Deserialize)]
struct ChatContentPart {
    text: Option<String>,
    content: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoiceMessage {
    content: ChatContent,
}

fn parse_content_value(content: &ChatContent) -> Option<&str> {
    match content {
        ChatContent::Text(text) => Some(text.as_str()),
        ChatContent::Parts(parts) => parts
            .iter()
            .find_map(|part| part.text.as_deref().or(part.content.as_deref())),
    }
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output = String::new();
    let mut chars = message.chars();

    for _ in 0..max_chars {
        let Some(character) = chars.next() else {
            return output;
        };
        output.push(character);
    }

    if chars.next().is_some() {
        output.push_str("...");
    }

    output
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::sync::Arc;
    use std::time::Duration;

    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{
        ChatCompletionGateway, ChatMessage, ChatRole, OpenAiChatConfig, OpenAiChatGateway,
        truncate_for_message,
    };
    use crate::error::AppraiseError;
    use crate::throttle::SlidingWindowLimiter;

    fn test_limiter() -> Arc<SlidingWindowLimiter> {
        let budget = NonZeroU32::new(1_000).expect("budget must be non-zero");
        Arc::new(SlidingWindowLimiter::per_minute(budget))
    }

    fn gateway_for(server: &MockServer) -> OpenAiChatGateway {
        let config = OpenAiChatConfig::new(
            format!("{}/v1", server.uri()),
            "test-model",
            Some("sk-test".to_owned()),
            Duration::from_secs(5),
        );
        OpenAiChatGateway::new(config, test_limiter()).expect("gateway should build")
    }

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::new(ChatRole::System, "You review code."),
            ChatMessage::new(ChatRole::User, "fn main() {}"),
        ]
    }

    #[tokio::test]
    async fn complete_sends_roles_and_returns_assistant_text() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server);

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "messages": [
                    { "role": "system", "content": "You review code." },
                    { "role": "user", "content": "fn main() {}" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "  looks fine  " } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = gateway
            .complete(&conversation())
            .await
            .expect("completion should succeed");

        assert_eq!(text, "looks fine");
    }

    #[tokio::test]
    async fn complete_decodes_part_based_content() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server);

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    { "message": { "role": "assistant", "content": [ { "text": "part text" } ] } }
                ]
            })))
            .mount(&server)
            .await;

        let text = gateway
            .complete(&conversation())
            .await
            .expect("completion should succeed");

        assert_eq!(text, "part text");
    }

    #[tokio::test]
    async fn complete_maps_non_success_status_to_generation_failed() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server);

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string("slow down please"),
            )
            .mount(&server)
            .await;

        let error = gateway
            .complete(&conversation())
            .await
            .expect_err("completion should fail");

        match error {
            AppraiseError::GenerationFailed { message } => {
                assert!(message.contains("429"), "unexpected message: {message}");
                assert!(
                    message.contains("slow down please"),
                    "unexpected message: {message}"
                );
            }
            other => panic!("expected GenerationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_rejects_empty_assistant_text() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server);

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "   " } }
                ]
            })))
            .mount(&server)
            .await;

        let error = gateway
            .complete(&conversation())
            .await
            .expect_err("blank content should fail");

        assert!(matches!(error, AppraiseError::GenerationFailed { .. }));
    }

    #[tokio::test]
    async fn complete_without_api_key_is_a_configuration_error() {
        let config = OpenAiChatConfig {
            api_key: None,
            ..OpenAiChatConfig::default()
        };
        let gateway = OpenAiChatGateway::new(config, test_limiter()).expect("gateway should build");

        let error = gateway
            .complete(&conversation())
            .await
            .expect_err("missing key should fail");

        assert!(matches!(error, AppraiseError::Configuration { .. }));
    }

    #[test]
    fn truncate_for_message_appends_ellipsis_only_when_cut() {
        assert_eq!(truncate_for_message("short", 10), "short");
        assert_eq!(truncate_for_message("abcdefghij", 4), "abcd...");
    }
}
