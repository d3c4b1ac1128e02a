//! Error types shared across the review service core.
//!
//! The orchestration layer only needs distinguishable, inspectable outcomes:
//! the caller maps these variants onto its own surface (HTTP status codes,
//! exit codes, and so on). Per-file fetch failures are deliberately absent
//! here; they are logged and absorbed inside the fetcher.

use thiserror::Error;

/// Errors surfaced while fetching a repository or generating a review.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppraiseError {
    /// The repository URL could not be resolved to an owner and name.
    #[error("repository URL is invalid: {message}")]
    InvalidReference {
        /// Description of what made the reference unusable.
        message: String,
    },

    /// The source-hosting API returned a non-success response or the
    /// transport failed at a fatal stage (metadata, tree, or the whole
    /// content fetch).
    #[error("upstream repository API unavailable: {message}")]
    UpstreamUnavailable {
        /// HTTP status code, when the upstream produced one.
        status: Option<u16>,
        /// Response body or transport error detail.
        message: String,
    },

    /// A text-generation pass failed; no partial review is produced.
    #[error("review generation failed: {message}")]
    GenerationFailed {
        /// Detail from the generation API or transport.
        message: String,
    },

    /// The supplied candidate level matched no known value.
    #[error("unknown candidate level: {value}")]
    InvalidCandidateLevel {
        /// The rejected input, preserved verbatim for diagnostics.
        value: String,
    },

    /// Configuration could not be loaded or was internally inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Writing the rendered report to the output stream failed.
    #[error("I/O error: {message}")]
    Io {
        /// Details about the I/O failure.
        message: String,
    },
}
