//! High-level repository fetch facade.
//!
//! Composes the gateway's three operations into one
//! [`RepositorySnapshot`]: metadata lookup, recursive tree listing, then a
//! concurrent fetch of every text-classified blob. Individual file failures
//! are logged and skipped; the merge re-imposes the tree-listing order, so
//! an unchanged upstream always yields a byte-identical merged text.

use std::collections::HashMap;

use futures::future::join_all;

use crate::error::AppraiseError;

use super::classify::is_text_path;
use super::gateway::RepositoryDataGateway;
use super::locator::RepositoryLocator;
use super::models::RepositorySnapshot;

/// Assembles repository snapshots using a gateway.
pub struct RepositoryFetcher<'gateway, Gateway>
where
    Gateway: RepositoryDataGateway,
{
    gateway: &'gateway Gateway,
}

impl<'gateway, Gateway> RepositoryFetcher<'gateway, Gateway>
where
    Gateway: RepositoryDataGateway,
{
    /// Create a new fetcher using the provided gateway.
    #[must_use]
    pub const fn new(gateway: &'gateway Gateway) -> Self {
        Self { gateway }
    }

    /// Fetches the repository identified by `locator` and merges its text
    /// files into a single reviewable string.
    ///
    /// File content requests run concurrently; their real parallelism is
    /// bounded by the gateway's rate limiter rather than a separate cap. A
    /// single file's failure is absorbed (logged, omitted from the merge)
    /// and never cancels its siblings.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::UpstreamUnavailable`] when the metadata or
    /// tree lookup fails. Per-file content failures do not fail the fetch.
    pub async fn fetch(
        &self,
        locator: &RepositoryLocator,
    ) -> Result<RepositorySnapshot, AppraiseError> {
        let repository = self.gateway.repository(locator).await?;
        tracing::info!(
            owner = %repository.owner.login,
            name = %repository.name,
            branch = %repository.default_branch,
            "resolved repository metadata"
        );

        let listing = self.gateway.tree(locator, &repository.default_branch).await?;
        if listing.truncated {
            tracing::warn!("tree listing was truncated by the API; review covers a partial tree");
        }

        let file_paths: Vec<String> = listing
            .tree
            .iter()
            .filter(|entry| entry.is_blob())
            .map(|entry| entry.path.clone())
            .collect();

        let text_paths: Vec<&str> = file_paths
            .iter()
            .map(String::as_str)
            .filter(|path| is_text_path(path))
            .collect();
        tracing::info!(
            blobs = file_paths.len(),
            text_files = text_paths.len(),
            "listed repository tree"
        );

        let fetched = self.fetch_text_files(locator, &text_paths).await;
        let merged_text = merge_file_texts(&text_paths, &fetched);

        Ok(RepositorySnapshot {
            owner: repository.owner.login,
            name: repository.name,
            file_paths,
            merged_text,
        })
    }

    /// Fetches all `paths` concurrently, keyed by path on success.
    ///
    /// Failures are logged and dropped here; the caller treats absence as
    /// "skipped". All tasks are awaited before returning, so no fetch is
    /// left dangling when one of them errors.
    async fn fetch_text_files<'path>(
        &self,
        locator: &RepositoryLocator,
        paths: &[&'path str],
    ) -> HashMap<&'path str, String> {
        let fetches = paths.iter().map(|path| async move {
            match self.gateway.file_text(locator, path).await {
                Ok(text) => Some((*path, text)),
                Err(error) => {
                    tracing::warn!(path, %error, "skipping file");
                    None
                }
            }
        });

        join_all(fetches).await.into_iter().flatten().collect()
    }
}

/// Concatenates fetched file texts in the order of `paths`, each preceded by
/// a delimiter line carrying its path and followed by a blank line.
fn merge_file_texts(paths: &[&str], fetched: &HashMap<&str, String>) -> String {
    let mut merged = String::new();
    for path in paths {
        let Some(content) = fetched.get(path) else {
            continue;
        };
        merged.push_str("\n--- ");
        merged.push_str(path);
        merged.push_str(" ---\n");
        merged.push_str(content);
        merged.push('\n');
    }
    merged
}

#[cfg(test)]
mod tests {
    use mockall::predicate::always;

    use super::RepositoryFetcher;
    use crate::error::AppraiseError;
    use crate::github::gateway::MockRepositoryDataGateway;
    use crate::github::locator::RepositoryLocator;
    use crate::github::models::{ApiAccount, ApiRepository, ApiTreeEntry, ApiTreeListing};

    fn locator() -> RepositoryLocator {
        RepositoryLocator::parse("https://github.com/octo/repo").expect("URL should parse")
    }

    fn metadata() -> ApiRepository {
        ApiRepository {
            name: "repo".to_owned(),
            default_branch: "main".to_owned(),
            owner: ApiAccount {
                login: "octo".to_owned(),
            },
        }
    }

    fn entry(path: &str, entry_type: &str) -> ApiTreeEntry {
        ApiTreeEntry {
            path: path.to_owned(),
            entry_type: entry_type.to_owned(),
        }
    }

    fn listing(entries: Vec<ApiTreeEntry>) -> ApiTreeListing {
        ApiTreeListing {
            tree: entries,
            truncated: false,
        }
    }

    fn expect_metadata_and_tree(gateway: &mut MockRepositoryDataGateway, entries: Vec<ApiTreeEntry>) {
        gateway
            .expect_repository()
            .times(1)
            .returning(|_| Ok(metadata()));
        gateway
            .expect_tree()
            .withf(|_, branch| branch == "main")
            .times(1)
            .return_once(move |_, _| Ok(listing(entries)));
    }

    #[tokio::test]
    async fn reports_all_blobs_but_fetches_only_text_files() {
        let mut gateway = MockRepositoryDataGateway::new();
        expect_metadata_and_tree(
            &mut gateway,
            vec![
                entry("README.md", "blob"),
                entry("logo.png", "blob"),
                entry("src", "tree"),
                entry("src/notes.txt", "blob"),
            ],
        );

        // Only the two text blobs may be fetched.
        gateway
            .expect_file_text()
            .withf(|_, path| path == "README.md")
            .times(1)
            .returning(|_, _| Ok("# Readme\n".to_owned()));
        gateway
            .expect_file_text()
            .withf(|_, path| path == "src/notes.txt")
            .times(1)
            .returning(|_, _| Ok("notes\n".to_owned()));

        let fetcher = RepositoryFetcher::new(&gateway);
        let snapshot = fetcher.fetch(&locator()).await.expect("fetch should succeed");

        assert_eq!(snapshot.owner, "octo");
        assert_eq!(snapshot.name, "repo");
        assert_eq!(
            snapshot.file_paths,
            vec!["README.md", "logo.png", "src/notes.txt"],
            "all blobs are reported, directories are not"
        );
        assert!(snapshot.merged_text.contains("--- README.md ---"));
        assert!(snapshot.merged_text.contains("--- src/notes.txt ---"));
        assert!(!snapshot.merged_text.contains("logo.png"));
    }

    #[tokio::test]
    async fn one_failing_file_is_skipped_without_failing_the_fetch() {
        let mut gateway = MockRepositoryDataGateway::new();
        expect_metadata_and_tree(
            &mut gateway,
            vec![
                entry("a.txt", "blob"),
                entry("b.txt", "blob"),
                entry("c.txt", "blob"),
            ],
        );

        gateway
            .expect_file_text()
            .withf(|_, path| path == "a.txt")
            .times(1)
            .returning(|_, _| Ok("alpha\n".to_owned()));
        gateway
            .expect_file_text()
            .withf(|_, path| path == "b.txt")
            .times(1)
            .returning(|_, _| {
                Err(AppraiseError::UpstreamUnavailable {
                    status: Some(404),
                    message: "content fetch failed".to_owned(),
                })
            });
        gateway
            .expect_file_text()
            .withf(|_, path| path == "c.txt")
            .times(1)
            .returning(|_, _| Ok("gamma\n".to_owned()));

        let fetcher = RepositoryFetcher::new(&gateway);
        let snapshot = fetcher.fetch(&locator()).await.expect("fetch should succeed");

        assert!(snapshot.merged_text.contains("--- a.txt ---"));
        assert!(snapshot.merged_text.contains("--- c.txt ---"));
        assert!(!snapshot.merged_text.contains("b.txt"));
        assert_eq!(
            snapshot.file_paths,
            vec!["a.txt", "b.txt", "c.txt"],
            "the skipped file still appears in the blob listing"
        );
    }

    #[tokio::test]
    async fn merge_preserves_tree_order_exactly() {
        let mut gateway = MockRepositoryDataGateway::new();
        expect_metadata_and_tree(
            &mut gateway,
            vec![
                entry("zebra.txt", "blob"),
                entry("apple.txt", "blob"),
                entry("mango.txt", "blob"),
            ],
        );

        gateway
            .expect_file_text()
            .with(always(), always())
            .returning(|_, path| Ok(format!("content of {path}\n")));

        let fetcher = RepositoryFetcher::new(&gateway);
        let snapshot = fetcher.fetch(&locator()).await.expect("fetch should succeed");

        assert_eq!(
            snapshot.merged_text,
            "\n--- zebra.txt ---\ncontent of zebra.txt\n\n\
             \n--- apple.txt ---\ncontent of apple.txt\n\n\
             \n--- mango.txt ---\ncontent of mango.txt\n\n"
        );
    }

    #[tokio::test]
    async fn metadata_failure_aborts_the_fetch() {
        let mut gateway = MockRepositoryDataGateway::new();
        gateway.expect_repository().times(1).returning(|_| {
            Err(AppraiseError::UpstreamUnavailable {
                status: Some(502),
                message: "bad gateway".to_owned(),
            })
        });
        gateway.expect_tree().times(0);
        gateway.expect_file_text().times(0);

        let fetcher = RepositoryFetcher::new(&gateway);
        let error = fetcher
            .fetch(&locator())
            .await
            .expect_err("fetch should fail");

        assert!(matches!(
            error,
            AppraiseError::UpstreamUnavailable {
                status: Some(502),
                ..
            }
        ));
    }
}
