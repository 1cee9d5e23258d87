use reqwest::Client;
use serde::de::IgnoredAny;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::data_models::SearchResponse;
use crate::error::SearchError;

/// Name of the paging parameter understood by the search service.
pub const PAGE_PARAM: &str = "p";

/// Thin client for the remote search service.
///
/// Holds no per-query state, so one instance can serve overlapping calls.
/// Every call issues exactly one GET; there is no retry and no caching.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    config: ClientConfig,
}

impl SearchClient {
    pub fn new(config: ClientConfig) -> Result<SearchClient, SearchError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SearchError::failed(format!("could not build http client: {e}")))?;
        Ok(SearchClient { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs `query` against the service. The caller is expected to have trimmed
    /// it and checked that it is not empty.
    pub async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        self.fetch(query, None).await
    }

    /// Like [`search`](Self::search) but asks for a specific 1-based result page.
    pub async fn search_page(&self, query: &str, page: u32) -> Result<SearchResponse, SearchError> {
        self.fetch(query, Some(page.max(1))).await
    }

    /// Runs the query until it completes or `token` is cancelled, whichever comes first.
    /// Cancelling drops the in-flight request.
    pub async fn search_cancellable(
        &self,
        query: &str,
        page: Option<u32>,
        token: &CancellationToken,
    ) -> Result<SearchResponse, SearchError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                log::debug!("search for {query:?} cancelled");
                Err(SearchError::Cancelled)
            }
            res = self.fetch(query, page.map(|p| p.max(1))) => res,
        }
    }

    async fn fetch(&self, query: &str, page: Option<u32>) -> Result<SearchResponse, SearchError> {
        let endpoint = self.config.endpoint();

        let mut params = vec![(self.config.query_param.as_str(), query.to_string())];
        if let Some(page) = page {
            params.push((PAGE_PARAM, page.to_string()));
        }

        log::info!("searching {endpoint} for {query:?}");

        let response = self
            .client
            .get(&endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                log::error!("error reaching search service {endpoint}, error: {:#}", e);
                SearchError::failed(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::error!("search service returned {status}: {text}");
            return Err(SearchError::failed(format!(
                "search service returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::failed(format!("could not read response body: {e}")))?;

        decode_response(&body)
    }
}

/// Decodes a search service body.
///
/// A body that is not JSON at all means there was no usable response
/// (`SearchFailed`). JSON that does not fit the envelope is a contract
/// violation by the backend (`MalformedResponse`).
pub fn decode_response(body: &str) -> Result<SearchResponse, SearchError> {
    serde_json::from_str::<IgnoredAny>(body)
        .map_err(|e| SearchError::failed(format!("response body is not json: {e}")))?;

    let response: SearchResponse = serde_json::from_str(body).map_err(|e| {
        log::error!("search response does not match the expected shape: {e}");
        SearchError::malformed(e)
    })?;
    response.validate()?;

    log::debug!(
        "decoded response: {} scored urls, {} metadata entries, {} total",
        response.urls.len(),
        response.metadata.len(),
        response.total_results
    );
    Ok(response)
}

#[test]
fn test_decode_response_classifies_failures() {
    let ok = decode_response(
        r#"{"urls": {"a.com": 1}, "metadata": {}, "elapsedMs": 12, "totalResults": 1}"#,
    )
    .unwrap();
    assert_eq!(ok.urls.len(), 1);
    assert_eq!(ok.elapsed_ms, 12.0);

    assert!(matches!(
        decode_response("<html>502 Bad Gateway</html>"),
        Err(SearchError::SearchFailed(_))
    ));
    assert!(matches!(
        decode_response(""),
        Err(SearchError::SearchFailed(_))
    ));
    // legacy shape: list of urls and lowercase elapsed time
    assert!(matches!(
        decode_response(
            r#"{"url": ["a.com"], "metadata": {}, "elapsedtime": 3, "totalResults": 1}"#
        ),
        Err(SearchError::MalformedResponse(_))
    ));
    assert!(matches!(
        decode_response(r#"{"urls": {}, "metadata": {}, "elapsedMs": -1, "totalResults": 0}"#),
        Err(SearchError::MalformedResponse(_))
    ));
    assert!(matches!(
        decode_response(r#"{"urls": {}, "metadata": {}, "elapsedMs": 1, "totalResults": -4}"#),
        Err(SearchError::MalformedResponse(_))
    ));
    assert!(matches!(
        decode_response("[]"),
        Err(SearchError::MalformedResponse(_))
    ));
}
