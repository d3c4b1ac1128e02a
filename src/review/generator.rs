//! Three-pass review generation over a chat-completions gateway.

use crate::error::AppraiseError;

use super::gateway::{ChatCompletionGateway, ChatMessage, ChatRole};
use super::level::CandidateLevel;

/// Structured review produced by the three generation passes.
///
/// All three fields are populated together; a failing pass aborts the whole
/// generation and no partial review is ever returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeReview {
    /// Downsides and review comments on the repository.
    pub weaknesses: String,
    /// 0-100 score with brief justification.
    pub rating: String,
    /// Final conclusions and improvement suggestions.
    pub conclusion: String,
}

/// Inputs shared by every pass of one review.
#[derive(Debug, Clone, Copy)]
pub struct ReviewRequest<'a> {
    /// Merged repository text under review.
    pub merged_text: &'a str,
    /// Assignment the candidate was given.
    pub assignment: &'a str,
    /// Competency level the code is held against.
    pub level: CandidateLevel,
}

/// Generates reviews using a gateway.
pub struct ReviewGenerator<'gateway, Gateway>
where
    Gateway: ChatCompletionGateway,
{
    gateway: &'gateway Gateway,
}

impl<'gateway, Gateway> ReviewGenerator<'gateway, Gateway>
where
    Gateway: ChatCompletionGateway,
{
    /// Create a new generator using the provided gateway.
    #[must_use]
    pub const fn new(gateway: &'gateway Gateway) -> Self {
        Self { gateway }
    }

    /// Runs the three passes in strict order: weaknesses, then rating with
    /// the weaknesses as conversation context, then conclusion with both.
    ///
    /// The ordering is a data dependency, not a style choice — each pass
    /// feeds the literal text of its predecessors back as assistant
    /// messages, so the passes cannot run concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::GenerationFailed`] as soon as any pass
    /// fails; later passes are not issued.
    pub async fn generate(&self, request: ReviewRequest<'_>) -> Result<CodeReview, AppraiseError> {
        tracing::info!(level = %request.level, "starting review generation");

        let weaknesses = self
            .gateway
            .complete(&pass_messages(&request, WEAKNESS_TASK, &[]))
            .await?;
        tracing::debug!("weakness pass complete");

        let rating = self
            .gateway
            .complete(&pass_messages(
                &request,
                RATING_TASK,
                &[weaknesses.as_str()],
            ))
            .await?;
        tracing::debug!("rating pass complete");

        let conclusion = self
            .gateway
            .complete(&pass_messages(
                &request,
                CONCLUSION_TASK,
                &[weaknesses.as_str(), rating.as_str()],
            ))
            .await?;
        tracing::debug!("conclusion pass complete");

        Ok(CodeReview {
            weaknesses,
            rating,
            conclusion,
        })
    }
}

const WEAKNESS_TASK: &str =
    "Your current task is to find downsides and write review comments on the provided repository.";

const RATING_TASK: &str = "Your current task is to rate the provided repository on a scale \
                           from 0 to 100. Be brief in your reasoning.";

const CONCLUSION_TASK: &str =
    "Your current task is to draw conclusions on the provided repository and suggest ways to \
     improve it. Do not invite further conversation; this message is final.";

/// Builds one pass's conversation: reviewer framing, the repository text,
/// then earlier pass outputs as assistant context in their original order.
fn pass_messages(request: &ReviewRequest<'_>, task: &str, prior: &[&str]) -> Vec<ChatMessage> {
    let system = format!(
        "You are an expert in computer programming, performing a code review of the provided \
         code repository. The repository was written by a {level} programmer and should be held \
         to the corresponding standard. Their assignment was: {assignment} {task}",
        level = request.level,
        assignment = request.assignment,
    );

    let mut messages = Vec::with_capacity(2 + prior.len());
    messages.push(ChatMessage::new(ChatRole::System, system));
    messages.push(ChatMessage::new(ChatRole::User, request.merged_text));
    for earlier in prior {
        messages.push(ChatMessage::new(ChatRole::Assistant, *earlier));
    }
    messages
}
