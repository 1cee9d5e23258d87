use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::data_models::SearchOutcome;
use crate::error::SearchError;
use crate::ranking::rank;
use crate::search_client::SearchClient;

#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    loading: bool,
    in_flight: Option<CancellationToken>,
}

/// Drives queries from a single search box.
///
/// Each submitted query gets a new generation number and cancels whatever
/// was still in flight. Only the newest generation may produce an outcome or
/// touch the loading flag, so a late response for a superseded query is
/// dropped instead of overwriting newer results.
#[derive(Debug)]
pub struct SearchSession {
    client: SearchClient,
    state: Mutex<SessionState>,
}

impl SearchSession {
    pub fn new(client: SearchClient) -> SearchSession {
        SearchSession {
            client,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn client(&self) -> &SearchClient {
        &self.client
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn current_generation(&self) -> u64 {
        self.lock().generation
    }

    /// Cancels the in-flight query, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.lock().in_flight.take() {
            token.cancel();
        }
    }

    pub async fn submit(&self, query: &str) -> Result<Option<SearchOutcome>, SearchError> {
        self.submit_page(query, None).await
    }

    /// Searches and ranks. `Ok(None)` means the query was superseded or
    /// cancelled before its response arrived.
    pub async fn submit_page(
        &self,
        query: &str,
        page: Option<u32>,
    ) -> Result<Option<SearchOutcome>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let token = CancellationToken::new();
        let generation = {
            let mut state = self.lock();
            if let Some(previous) = state.in_flight.replace(token.clone()) {
                previous.cancel();
            }
            state.generation += 1;
            state.loading = true;
            state.generation
        };
        let _loading = LoadingGuard {
            session: self,
            generation,
        };

        let result = self.client.search_cancellable(query, page, &token).await;

        if self.current_generation() != generation {
            log::debug!("discarding response for superseded query {query:?}");
            return Ok(None);
        }

        match result {
            Ok(response) => {
                let outcome = rank(response);
                log::info!(
                    "{} results for {query:?} ({} total, {:.2}s)",
                    outcome.results.len(),
                    outcome.total_results,
                    outcome.elapsed_seconds
                );
                Ok(Some(outcome))
            }
            Err(SearchError::Cancelled) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the loading flag on every exit path of a query, unless a newer
/// query owns it by then.
struct LoadingGuard<'a> {
    session: &'a SearchSession,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.session.lock();
        if state.generation == self.generation {
            state.loading = false;
            state.in_flight = None;
        }
    }
}
