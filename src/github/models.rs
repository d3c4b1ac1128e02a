//! Data models for repository metadata, tree listings, and file contents.

use serde::Deserialize;

/// Repository metadata returned by the metadata lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepository {
    /// Canonical repository name as known to the API.
    pub name: String,
    /// Branch the tree listing should be taken from.
    pub default_branch: String,
    /// Account owning the repository.
    pub owner: ApiAccount,
}

/// Account reference embedded in repository metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAccount {
    /// Login name of the account.
    pub login: String,
}

/// Recursive tree listing for a branch.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTreeListing {
    /// Entries in the order returned by the API.
    pub tree: Vec<ApiTreeEntry>,
    /// True when the listing was cut off by the API's entry limit.
    #[serde(default)]
    pub truncated: bool,
}

/// One entry of a tree listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTreeEntry {
    /// Path of the entry relative to the repository root.
    pub path: String,
    /// Entry kind: `"blob"` for files, `"tree"` for directories.
    #[serde(rename = "type")]
    pub entry_type: String,
}

impl ApiTreeEntry {
    /// True when the entry is a file rather than a directory.
    #[must_use]
    pub fn is_blob(&self) -> bool {
        self.entry_type == "blob"
    }
}

/// File content payload from the contents endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiFileContent {
    /// Encoded file body; base64 with embedded line breaks.
    pub content: String,
    /// Encoding label, normally `"base64"`.
    pub encoding: String,
}

/// Immutable result of one repository fetch.
///
/// `file_paths` lists every blob discovered in the tree, binary files
/// included, while `merged_text` only carries the text files that were
/// fetched and decoded successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySnapshot {
    /// Owner login as reported by the API (not as typed in the URL).
    pub owner: String,
    /// Canonical repository name.
    pub name: String,
    /// All blob paths in tree-listing order.
    pub file_paths: Vec<String>,
    /// Concatenated text-file contents with path delimiters.
    pub merged_text: String,
}
