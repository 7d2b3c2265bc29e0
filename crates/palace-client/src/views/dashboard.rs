use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};
use uuid::Uuid;

use super::{InFlight, RequestGeneration, Route, ViewError, gateway_failure, require_token};
use crate::calendar::{DisplayedMonth, IntensityTier, bucket_month};
use crate::config::ClientConfig;
use crate::gateway::BackendGateway;
use crate::memory_list::{ALL_CATEGORIES, MemoryListState};
use crate::models::{CreatedMemory, Memory};
use crate::session::SessionContext;
use crate::timezone::{local_date, parse_time_zone_or_default};
use crate::validation::{MemoryDraft, PhotoLimits, validate_draft};

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub memories: MemoryListState,
    pub selected_category: String,
    pub displayed_month: DisplayedMonth,
    pub selected_day: Option<NaiveDate>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatMapCell {
    pub date: NaiveDate,
    pub count: usize,
    pub tier: IntensityTier,
}

/// `/dashboard`: recent memories, new-memory form, category chips, heat map.
pub struct DashboardController {
    session: SessionContext,
    gateway: BackendGateway,
    recent_limit: u32,
    photo_limits: PhotoLimits,
    time_zone: Tz,
    state: Mutex<DashboardState>,
    generation: RequestGeneration,
    submitting: AtomicBool,
}

impl DashboardController {
    pub fn new(session: SessionContext, gateway: BackendGateway, config: &ClientConfig) -> Self {
        let time_zone = parse_time_zone_or_default(&config.time_zone);
        let today = local_date(Utc::now(), time_zone);

        Self {
            session,
            gateway,
            recent_limit: config.recent_limit,
            photo_limits: PhotoLimits::from(config),
            time_zone,
            state: Mutex::new(DashboardState {
                memories: MemoryListState::new(),
                selected_category: ALL_CATEGORIES.to_string(),
                displayed_month: DisplayedMonth::containing(today),
                selected_day: None,
                last_error: None,
            }),
            generation: RequestGeneration::default(),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> DashboardState {
        self.lock().clone()
    }

    /// Replaces the list with the newest memories. On failure the list is
    /// left exactly as it was.
    pub async fn load_recent(&self) -> Result<usize, ViewError> {
        let token = require_token(&self.session)?;
        let ticket = self.generation.begin();

        let fetched = self.gateway.fetch_recent(&token, self.recent_limit).await;
        if !self.generation.is_current(ticket) {
            // A stale 401 still means the token is dead.
            if let Err(err) = fetched
                && err.is_unauthorized()
            {
                return Err(gateway_failure(&self.session, err));
            }
            return Err(ViewError::Superseded);
        }

        let mut state = self.lock();
        match fetched {
            Ok(memories) => {
                state.memories.replace(memories);
                state.last_error = None;
                debug!("dashboard loaded {} memories", state.memories.len());
                Ok(state.memories.len())
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

    /// Validates, saves, then reloads the recent list.
    pub async fn create_memory(&self, draft: MemoryDraft) -> Result<CreatedMemory, ViewError> {
        validate_draft(&draft, self.photo_limits)?;
        let _in_flight = InFlight::acquire(&self.submitting).ok_or(ViewError::Busy)?;
        let token = require_token(&self.session)?;

        let created = match self.gateway.create_memory(&token, &draft).await {
            Ok(created) => created,
            Err(err) => {
                let view_err = gateway_failure(&self.session, err);
                if view_err.is_inline() {
                    self.lock().last_error = Some(view_err.to_string());
                }
                return Err(view_err);
            }
        };
        info!(
            "memory {} saved with {} photos",
            created.id(),
            draft.photos.len()
        );

        match self.load_recent().await {
            Err(ViewError::Reauthenticate) => Err(ViewError::Reauthenticate),
            _ => Ok(created),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn select_category(&self, category: &str) {
        let category = category.trim();
        self.lock().selected_category = if category.is_empty() {
            ALL_CATEGORIES.to_string()
        } else {
            category.to_string()
        };
    }

    pub fn filtered_memories(&self) -> Vec<Memory> {
        let state = self.lock();
        state
            .memories
            .filter_by_category(&state.selected_category)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        self.lock().memories.categories().into_iter().collect()
    }

    pub fn toggle_expanded(&self, id: Uuid) -> bool {
        self.lock().memories.toggle_expanded(id)
    }

    pub fn heat_map(&self) -> Vec<HeatMapCell> {
        let state = self.lock();
        bucket_month(
            state.memories.memories(),
            state.displayed_month,
            self.time_zone,
        )
        .days
        .iter()
        .map(|bucket| HeatMapCell {
            date: bucket.date,
            count: bucket.count(),
            tier: bucket.tier(),
        })
        .collect()
    }

    /// Day click on the heat map. Purely local.
    pub fn select_day(&self, date: NaiveDate) -> Vec<Memory> {
        let mut state = self.lock();
        let selected: Vec<Memory> = bucket_month(
            state.memories.memories(),
            state.displayed_month,
            self.time_zone,
        )
        .memories_on(date)
        .into_iter()
        .cloned()
        .collect();

        state.selected_day = state.displayed_month.contains(date).then_some(date);
        selected
    }

    pub fn show_next_month(&self) -> DisplayedMonth {
        let mut state = self.lock();
        state.displayed_month = state.displayed_month.next();
        state.selected_day = None;
        state.displayed_month
    }

    pub fn show_previous_month(&self) -> DisplayedMonth {
        let mut state = self.lock();
        state.displayed_month = state.displayed_month.previous();
        state.selected_day = None;
        state.displayed_month
    }

    pub fn show_month(&self, month: DisplayedMonth) {
        let mut state = self.lock();
        state.displayed_month = month;
        state.selected_day = None;
    }

    pub fn sign_out(&self) -> Route {
        self.generation.begin();
        self.session.invalidate();
        let mut state = self.lock();
        state.memories.replace(Vec::new());
        state.selected_day = None;
        state.last_error = None;
        Route::SignIn
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
