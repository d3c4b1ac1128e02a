//! Appraise library crate providing automated code review of repositories.
//!
//! The library wraps Octocrab to parse repository URLs, list file trees, and
//! merge text content into a single snapshot, then drives an
//! OpenAI-compatible chat-completions endpoint through three context-chained
//! passes to produce weaknesses, a rating, and a conclusion. Both upstream
//! APIs are throttled with independent sliding-window rate limiters.

pub mod config;
pub mod error;
pub mod github;
pub mod report;
pub mod review;
pub mod throttle;

pub use config::AppraiseConfig;
pub use error::AppraiseError;
pub use github::{
    AccessToken, OctocrabRepositoryGateway, RepositoryDataGateway, RepositoryFetcher,
    RepositoryLocator, RepositorySnapshot,
};
pub use review::{
    CandidateLevel, ChatCompletionGateway, CodeReview, OpenAiChatConfig, OpenAiChatGateway,
    ReviewGenerator, ReviewRequest,
};
pub use throttle::SlidingWindowLimiter;
