//! Example provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ExampleSentence;

/// Source of example sentences for a keyword.
///
/// The keyword passed to [`search`] is already sanitized; providers may
/// assume it contains only Japanese script and whitespace.
///
/// [`search`]: ExampleProvider::search
#[async_trait]
pub trait ExampleProvider: Send + Sync {
    /// Look up example sentences for a keyword, shortest sentences first.
    ///
    /// An empty result is not an error. Entries without audio are included.
    ///
    /// # Errors
    ///
    /// Returns error on network failure, non-success HTTP status, or a
    /// malformed response body.
    async fn search(&self, keyword: &str) -> Result<Vec<ExampleSentence>>;
}
