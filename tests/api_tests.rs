use std::sync::Arc;

use anyhow::Result;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ducksearch::api::create_router;
use ducksearch::config::ClientConfig;
use ducksearch::search_client::SearchClient;

mod test_helpers {
    use super::*;

    pub fn router_for(server_uri: &str) -> axum::Router {
        let client = SearchClient::new(ClientConfig::new(server_uri)).unwrap();
        create_router(Arc::new(client))
    }

    pub async fn get(router: axum::Router, uri: &str) -> Result<(StatusCode, Value)> {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty())?)
            .await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = serde_json::from_slice(&bytes)?;
        Ok((status, body))
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_search_returns_ranked_outcome() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("s", "rust"))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{
                "urls": {"https://b.com": 0.5, "https://a.com": 0.9},
                "metadata": {"https://a.com": {"title": "A", "description": "desc A"}},
                "elapsedMs": 1500,
                "totalResults": 60
            }"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(router_for(&server.uri()), "/api/search?q=rust&p=2").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["url"], "https://a.com");
    assert_eq!(body["results"][0]["title"], "A");
    assert_eq!(body["results"][1]["url"], "https://b.com");
    assert_eq!(body["results"][1]["title"], "Untitled");
    assert_eq!(body["results"][1]["rank"], 1);
    assert_eq!(body["total_results"], 60);
    assert_eq!(body["elapsed_seconds"], json!(1.5));
    Ok(())
}

#[tokio::test]
async fn test_empty_query_is_bad_request() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = get(router_for(&server.uri()), "/api/search?q=%20%20").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "query cannot be empty");

    let (status, _) = get(router_for(&server.uri()), "/api/search").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_backend_failure_is_bad_gateway() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, body) = get(router_for(&server.uri()), "/api/search?q=rust").await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().starts_with("search failed"));
    Ok(())
}

#[tokio::test]
async fn test_malformed_backend_response_is_bad_gateway() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"words": []})))
        .mount(&server)
        .await;

    let (status, body) = get(router_for(&server.uri()), "/api/search?q=rust").await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("malformed search response")
    );
    Ok(())
}
