//! Fetch/refresh lifecycle for a weather comparison.
//!
//! A [`ComparisonController`] owns the view state for one screen: the last
//! successful comparison, which phase the fetch is in, and the last error.
//! Every fetch takes a ticket from a generation counter; a response is only
//! applied if its ticket is still the newest, so a slow response for old
//! coordinates can never overwrite a newer one.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;

use crate::{model::WeatherComparison, service::WeatherService};

/// Shown when an error carries no message of its own.
pub const FETCH_FAILED_MESSAGE: &str = "날씨 정보를 가져올 수 없습니다";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Refreshing,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonParams {
    pub latitude: f64,
    pub longitude: f64,
    /// When false, no fetch is ever started.
    pub enabled: bool,
}

impl ComparisonParams {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, enabled: true }
    }

    pub fn disabled() -> Self {
        Self { latitude: 0.0, longitude: 0.0, enabled: false }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonState {
    pub phase: Phase,
    pub data: Option<WeatherComparison>,
    pub error: Option<String>,
}

impl ComparisonState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.phase == Phase::Refreshing
    }
}

impl Default for ComparisonState {
    fn default() -> Self {
        Self { phase: Phase::Idle, data: None, error: None }
    }
}

#[derive(Debug, Clone, Copy)]
enum FetchKind {
    Load,
    Refresh,
}

#[derive(Debug)]
pub struct ComparisonController {
    service: Arc<WeatherService>,
    params: Mutex<ComparisonParams>,
    state: Mutex<ComparisonState>,
    generation: AtomicU64,
}

impl ComparisonController {
    /// Starts idle; call [`mount`](Self::mount) to run the first fetch.
    pub fn new(service: Arc<WeatherService>, params: ComparisonParams) -> Self {
        Self {
            service,
            params: Mutex::new(params),
            state: Mutex::new(ComparisonState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> ComparisonState {
        self.state.lock().clone()
    }

    pub fn params(&self) -> ComparisonParams {
        *self.params.lock()
    }

    pub async fn mount(&self) {
        if let Some((params, ticket)) = self.begin_if_enabled() {
            self.fetch(FetchKind::Load, params, ticket).await;
        }
    }

    /// Refetch when the (latitude, longitude, enabled) triple changed and
    /// the new params are enabled. Returns whether a fetch ran.
    ///
    /// Any change, disabling included, supersedes a fetch still in flight.
    pub async fn set_params(&self, params: ComparisonParams) -> bool {
        let ticket = {
            let mut current = self.params.lock();
            if *current == params {
                return false;
            }
            *current = params;
            self.next_ticket()
        };

        if !params.enabled {
            self.settle_superseded();
            return false;
        }

        self.fetch(FetchKind::Load, params, ticket).await;
        true
    }

    /// Pull-to-refresh: same fetch, lighter indicator. No-op while disabled.
    pub async fn refresh(&self) {
        if let Some((params, ticket)) = self.begin_if_enabled() {
            self.fetch(FetchKind::Refresh, params, ticket).await;
        }
    }

    /// Params and ticket are read under one lock so a ticket always belongs
    /// to the params that were current when it was issued.
    fn begin_if_enabled(&self) -> Option<(ComparisonParams, u64)> {
        let params = self.params.lock();
        params.enabled.then(|| (*params, self.next_ticket()))
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Leave the in-progress phase after a disable dropped the pending fetch.
    fn settle_superseded(&self) {
        let mut state = self.state.lock();
        if state.is_loading() || state.is_refreshing() {
            state.phase = if state.data.is_some() { Phase::Success } else { Phase::Idle };
        }
    }

    async fn fetch(&self, kind: FetchKind, params: ComparisonParams, ticket: u64) {
        {
            let mut state = self.state.lock();
            if !self.is_current(ticket) {
                return;
            }
            state.phase = match kind {
                FetchKind::Refresh => Phase::Refreshing,
                FetchKind::Load if state.data.is_some() => Phase::Refreshing,
                FetchKind::Load => Phase::Loading,
            };
            state.error = None;
        }
        tracing::debug!(
            ticket,
            ?kind,
            latitude = params.latitude,
            longitude = params.longitude,
            "fetching weather comparison"
        );

        let result = self.service.get_comparison(params.latitude, params.longitude).await;

        let mut state = self.state.lock();
        if !self.is_current(ticket) {
            tracing::debug!(ticket, "discarding superseded weather response");
            return;
        }

        match result {
            Ok(data) => {
                state.phase = Phase::Success;
                state.data = Some(data);
                state.error = None;
            }
            Err(err) => {
                tracing::error!(error = %err, "error fetching weather data");
                let message = err.to_string();
                state.phase = Phase::Error;
                state.error = Some(if message.is_empty() {
                    FETCH_FAILED_MESSAGE.to_string()
                } else {
                    message
                });
            }
        }
    }
}
