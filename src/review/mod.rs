//! Review generation: candidate levels, the chat-completions gateway, and
//! the three-pass generator.

pub mod gateway;
pub mod generator;
pub mod level;

pub use gateway::{
    ChatCompletionGateway, ChatMessage, ChatRole, OpenAiChatConfig, OpenAiChatGateway,
};
pub use generator::{CodeReview, ReviewGenerator, ReviewRequest};
pub use level::CandidateLevel;
