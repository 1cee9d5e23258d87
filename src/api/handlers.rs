use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::data_models::SearchOutcome;
use crate::error::SearchError;
use crate::ranking::rank;
use crate::search_client::SearchClient;

use super::models::{ErrorBody, SearchParams};

pub async fn search_handler(
    State(search_client): State<Arc<SearchClient>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchOutcome>, (StatusCode, Json<ErrorBody>)> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(error_response(SearchError::EmptyQuery));
    }

    let response = match params.p {
        Some(page) => search_client.search_page(query, page).await,
        None => search_client.search(query).await,
    }
    .map_err(error_response)?;

    Ok(Json(rank(response)))
}

fn error_response(err: SearchError) -> (StatusCode, Json<ErrorBody>) {
    let status = match err {
        SearchError::EmptyQuery => StatusCode::BAD_REQUEST,
        SearchError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        SearchError::SearchFailed(_) | SearchError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}
