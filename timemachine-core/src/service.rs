//! The single entry point for "today vs. last year at these coordinates".
//!
//! `WeatherService` is constructed explicitly and handed to whatever needs it.
//! Its configuration is an immutable [`ServiceConfig`] behind an `Arc`; updates
//! build a new value and swap it in, so a request in flight keeps the config
//! it started with.

use std::{fmt::Debug, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    date::{last_year_date, today},
    error::WeatherError,
    mock,
    model::{WeatherComparison, WeatherRecord},
};

/// Seam for a real weather source. Nothing in this crate implements it for a
/// third-party API; callers plug their own in with [`WeatherService::with_backend`].
#[async_trait]
pub trait WeatherBackend: Send + Sync + Debug {
    async fn current_weather(&self, latitude: f64, longitude: f64) -> anyhow::Result<WeatherRecord>;

    async fn historical_weather(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> anyhow::Result<WeatherRecord>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub use_mock_data: bool,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Simulated backend latency in mock mode.
    pub mock_latency_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            use_mock_data: true,
            api_key: None,
            base_url: None,
            mock_latency_ms: 1000,
        }
    }
}

impl ServiceConfig {
    pub fn mock_latency(&self) -> Duration {
        Duration::from_millis(self.mock_latency_ms)
    }

    /// Copy of `self` with every `Some` field of `update` applied.
    pub fn merged(&self, update: ConfigUpdate) -> Self {
        Self {
            use_mock_data: update.use_mock_data.unwrap_or(self.use_mock_data),
            api_key: update.api_key.or_else(|| self.api_key.clone()),
            base_url: update.base_url.or_else(|| self.base_url.clone()),
            mock_latency_ms: update.mock_latency_ms.unwrap_or(self.mock_latency_ms),
        }
    }
}

/// Partial update for [`ServiceConfig`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub use_mock_data: Option<bool>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub mock_latency_ms: Option<u64>,
}

#[derive(Debug)]
pub struct WeatherService {
    config: RwLock<Arc<ServiceConfig>>,
    backend: Option<Arc<dyn WeatherBackend>>,
    rng: Mutex<StdRng>,
}

impl Default for WeatherService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

impl WeatherService {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
            backend: None,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn WeatherBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Replace the random source used in mock mode, e.g. with a fixed seed.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Arc<ServiceConfig> {
        Arc::clone(&self.config.read())
    }

    pub fn update_config(&self, update: ConfigUpdate) -> Arc<ServiceConfig> {
        let mut slot = self.config.write();
        let next = Arc::new(slot.merged(update));
        *slot = Arc::clone(&next);

        tracing::debug!(use_mock_data = next.use_mock_data, "weather service config updated");
        next
    }

    /// Comparison anchored on today's local date.
    pub async fn get_comparison(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherComparison, WeatherError> {
        self.get_comparison_on(latitude, longitude, today()).await
    }

    pub async fn get_comparison_on(
        &self,
        latitude: f64,
        longitude: f64,
        anchor: NaiveDate,
    ) -> Result<WeatherComparison, WeatherError> {
        let config = self.config();

        if config.use_mock_data {
            let latency = config.mock_latency();
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }

            let comparison = {
                let mut rng = self.rng.lock();
                mock::generate_comparison(anchor, Utc::now(), &mut *rng)?
            };

            tracing::debug!(
                latitude,
                longitude,
                today = comparison.today.temperature,
                last_year = comparison.last_year.temperature,
                "mock comparison generated"
            );
            return Ok(comparison);
        }

        let backend = self.backend.as_ref().ok_or(WeatherError::Unimplemented)?;
        let previous = last_year_date(anchor)?;

        let today = backend
            .current_weather(latitude, longitude)
            .await
            .map_err(WeatherError::Backend)?;
        let last_year = backend
            .historical_weather(latitude, longitude, previous)
            .await
            .map_err(WeatherError::Backend)?;

        Ok(WeatherComparison { today, last_year, last_updated: Utc::now() })
    }
}
