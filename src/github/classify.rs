//! Text-versus-binary classification for repository paths.
//!
//! Classification happens before any content is downloaded, so it can only
//! look at the path. MIME inference from the file extension mirrors the
//! hosting API's own `text/*` notion closely enough for review purposes:
//! files whose extension maps to no MIME type, or to a non-text type, are
//! listed in the snapshot but never fetched.

use mime_guess::mime;

/// True when `path` is worth fetching as reviewable text.
#[must_use]
pub fn is_text_path(path: &str) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_some_and(|guess| guess.type_() == mime::TEXT)
}
