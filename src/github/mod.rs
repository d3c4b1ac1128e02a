//! Repository intake: URL parsing, rate-limited API access, and snapshot
//! assembly.
//!
//! This module wraps Octocrab to resolve a repository URL, list its file
//! tree, and pull every text file's content into one merged string. Errors
//! are mapped into the crate's taxonomy so that callers can surface precise
//! failures without seeing Octocrab internals.

pub mod classify;
pub mod fetcher;
pub mod gateway;
pub mod locator;
pub mod models;

pub use fetcher::RepositoryFetcher;
pub use gateway::{OctocrabRepositoryGateway, RepositoryDataGateway};
pub use locator::{AccessToken, RepositoryLocator, RepositoryName, RepositoryOwner};
pub use models::RepositorySnapshot;
