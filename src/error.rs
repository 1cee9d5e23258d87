use thiserror::Error;

/// Errors surfaced by the search client, the session and the response decoder.
///
/// The ranking pipeline itself never produces one of these: anything that
/// decodes into a [`crate::data_models::SearchResponse`] can be ranked.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No usable response: transport error, non-success status or a body that is not JSON.
    #[error("search failed: {0}")]
    SearchFailed(String),

    /// The body is JSON but does not match the response envelope.
    #[error("malformed search response: {0}")]
    MalformedResponse(String),

    #[error("query cannot be empty")]
    EmptyQuery,

    /// The in-flight request was superseded before it completed.
    #[error("search cancelled")]
    Cancelled,
}

impl SearchError {
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        SearchError::SearchFailed(reason.to_string())
    }

    pub fn malformed(reason: impl std::fmt::Display) -> Self {
        SearchError::MalformedResponse(reason.to_string())
    }
}
