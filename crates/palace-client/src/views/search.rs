use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;
use uuid::Uuid;

use super::{RequestGeneration, ViewError, gateway_failure, require_token};
use crate::direct_answer::{DirectAnswer, extract_direct_answer};
use crate::gateway::BackendGateway;
use crate::memory_list::MemoryListState;
use crate::session::SessionContext;
use crate::validation::normalize_query;

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub results: MemoryListState,
    pub direct_answer: Option<DirectAnswer>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub result_count: usize,
    pub direct_answer: Option<DirectAnswer>,
}

/// Semantic search panel. Overlapping searches resolve newest-wins.
pub struct SearchController {
    session: SessionContext,
    gateway: BackendGateway,
    search_limit: u32,
    state: Mutex<SearchState>,
    generation: RequestGeneration,
}

impl SearchController {
    pub fn new(session: SessionContext, gateway: BackendGateway, search_limit: u32) -> Self {
        Self {
            session,
            gateway,
            search_limit,
            state: Mutex::new(SearchState::default()),
            generation: RequestGeneration::default(),
        }
    }

    pub fn snapshot(&self) -> SearchState {
        self.lock().clone()
    }

    pub async fn search(&self, query: &str) -> Result<SearchOutcome, ViewError> {
        let query = normalize_query(query)?;
        let token = require_token(&self.session)?;
        let ticket = self.generation.begin();

        let fetched = self
            .gateway
            .search(&token, &query, self.search_limit)
            .await;
        if !self.generation.is_current(ticket) {
            debug!("discarding search results for a superseded query");
            if let Err(err) = fetched
                && err.is_unauthorized()
            {
                return Err(gateway_failure(&self.session, err));
            }
            return Err(ViewError::Superseded);
        }

        let mut state = self.lock();
        match fetched {
            Ok(results) => {
                state.query = query.clone();
                state.results.replace_with_search_results(results);
                let direct_answer = extract_direct_answer(&query, state.results.memories());
                state.direct_answer = direct_answer;
                state.last_error = None;
                debug!(
                    "search kept {} results (direct answer: {})",
                    state.results.len(),
                    state.direct_answer.is_some()
                );
                Ok(SearchOutcome {
                    result_count: state.results.len(),
                    direct_answer: state.direct_answer.clone(),
                })
            }
            Err(err) => {
                let view_err = gateway_failure(&self.session, err);
                if view_err.is_inline() {
                    state.last_error = Some(view_err.to_string());
                }
                Err(view_err)
            }
        }
    }

    pub fn toggle_expanded(&self, id: Uuid) -> bool {
        self.lock().results.toggle_expanded(id)
    }

    /// Resets the panel. Any search still in flight is discarded when it lands.
    pub fn clear(&self) {
        self.generation.begin();
        *self.lock() = SearchState::default();
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
