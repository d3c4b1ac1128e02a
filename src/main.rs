//! Appraise CLI entrypoint for repository review.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use appraise::{
    AppraiseConfig, AppraiseError, CodeReview, OctocrabRepositoryGateway, OpenAiChatGateway,
    RepositoryFetcher, RepositoryLocator, RepositorySnapshot, ReviewGenerator, ReviewRequest,
    SlidingWindowLimiter,
};
use ortho_config::OrthoConfig;

#[tokio::main]
async fn main() -> ExitCode {
    init_telemetry();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

/// Installs the tracing subscriber, filtered by `RUST_LOG` when set.
fn init_telemetry() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<(), AppraiseError> {
    let config = load_config()?;

    let repo_url = config.require_repo_url()?;
    let assignment = config.require_assignment()?;
    let level = config.resolve_level()?;
    let token = config.resolve_github_token()?;

    let locator = RepositoryLocator::parse(repo_url)?;

    let github_budget = config.github_requests_per_minute(token.is_some())?;
    let github_limiter = Arc::new(SlidingWindowLimiter::per_minute(github_budget));
    let gateway = OctocrabRepositoryGateway::for_locator(&locator, token.as_ref(), github_limiter)?;

    let fetcher = RepositoryFetcher::new(&gateway);
    let snapshot = fetcher.fetch(&locator).await?;

    let chat_budget = config.openai_budget_per_minute()?;
    let chat_limiter = Arc::new(SlidingWindowLimiter::per_minute(chat_budget));
    let chat_gateway = OpenAiChatGateway::new(config.openai_chat_config(), chat_limiter)?;

    let generator = ReviewGenerator::new(&chat_gateway);
    let review = generator
        .generate(ReviewRequest {
            merged_text: &snapshot.merged_text,
            assignment,
            level,
        })
        .await?;

    write_report(&snapshot, &review)
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`AppraiseError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<AppraiseConfig, AppraiseError> {
    AppraiseConfig::load().map_err(|error| AppraiseError::Configuration {
        message: error.to_string(),
    })
}

fn write_report(snapshot: &RepositorySnapshot, review: &CodeReview) -> Result<(), AppraiseError> {
    let mut stdout = io::stdout().lock();
    let tree = appraise::report::render_directory_tree(&snapshot.file_paths);
    let message = format!(
        "Review of {owner}/{name}\n\nFiles:\n{tree}\nWeaknesses:\n{weaknesses}\n\nRating:\n\
         {rating}\n\nConclusion:\n{conclusion}",
        owner = snapshot.owner,
        name = snapshot.name,
        weaknesses = review.weaknesses,
        rating = review.rating,
        conclusion = review.conclusion,
    );

    writeln!(stdout, "{message}").map_err(|error| AppraiseError::Io {
        message: error.to_string(),
    })
}
