//! End-to-end lifecycles: location → comparison, gating, and out-of-order responses.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use timemachine_core::{
    ComparisonController, ComparisonParams, ComparisonState, Coordinates, GeocodedAddress,
    LocationController, LocationPhase, LocationProvider, PermissionStatus, Phase, ServiceConfig,
    WeatherBackend, WeatherCondition, WeatherRecord, WeatherService,
};

/// Latitude doubles as the response delay in milliseconds, and the
/// temperature echoes it back so tests can tell responses apart.
#[derive(Debug, Default)]
struct EchoBackend {
    calls: AtomicUsize,
}

fn record(date: NaiveDate, temperature: i32) -> WeatherRecord {
    WeatherRecord {
        date,
        temperature,
        feels_like: temperature,
        condition: WeatherCondition::Sunny,
        humidity: 50,
        wind_speed: 10.0,
        aqi: 30,
    }
}

#[async_trait]
impl WeatherBackend for EchoBackend {
    async fn current_weather(&self, latitude: f64, _: f64) -> anyhow::Result<WeatherRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(latitude as u64)).await;
        Ok(record(timemachine_core::date::today(), latitude as i32))
    }

    async fn historical_weather(
        &self,
        _: f64,
        _: f64,
        date: NaiveDate,
    ) -> anyhow::Result<WeatherRecord> {
        Ok(record(date, 0))
    }
}

fn backed_service(backend: Arc<EchoBackend>) -> Arc<WeatherService> {
    let config =
        ServiceConfig { use_mock_data: false, mock_latency_ms: 0, ..ServiceConfig::default() };
    Arc::new(WeatherService::new(config).with_backend(backend))
}

#[tokio::test]
async fn superseded_response_is_discarded() {
    let backend = Arc::new(EchoBackend::default());
    let ctl = ComparisonController::new(
        backed_service(Arc::clone(&backend)),
        ComparisonParams::new(150.0, 0.0),
    );

    // The first fetch is slow; the parameter change behind it resolves first.
    let slow = ctl.mount();
    let fast = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        ctl.set_params(ComparisonParams::new(5.0, 0.0)).await
    };
    let ((), refetched) = tokio::join!(slow, fast);

    assert!(refetched);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);

    let state = ctl.state();
    assert_eq!(state.phase, Phase::Success);
    assert_eq!(state.data.map(|d| d.today.temperature), Some(5));
}

#[tokio::test]
async fn disabled_controller_never_calls_service() {
    let backend = Arc::new(EchoBackend::default());
    let ctl = ComparisonController::new(
        backed_service(Arc::clone(&backend)),
        ComparisonParams::disabled(),
    );

    ctl.mount().await;
    ctl.refresh().await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctl.state(), ComparisonState::default());
}

#[tokio::test]
async fn refresh_passes_through_refreshing() {
    let backend = Arc::new(EchoBackend::default());
    let ctl = Arc::new(ComparisonController::new(
        backed_service(Arc::clone(&backend)),
        ComparisonParams::new(40.0, 0.0),
    ));
    ctl.mount().await;

    let task = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let during = ctl.state();
    task.await.unwrap();

    assert!(during.is_refreshing());
    assert!(!during.is_loading());
    assert!(during.data.is_some());
    assert_eq!(ctl.state().phase, Phase::Success);
}

#[derive(Debug)]
struct DeniedProvider;

#[async_trait]
impl LocationProvider for DeniedProvider {
    async fn request_permission(&self) -> anyhow::Result<PermissionStatus> {
        Ok(PermissionStatus::Denied)
    }

    async fn current_position(&self) -> anyhow::Result<Coordinates> {
        anyhow::bail!("position must not be requested without permission")
    }

    async fn reverse_geocode(&self, _: Coordinates) -> anyhow::Result<Vec<GeocodedAddress>> {
        anyhow::bail!("geocoding must not be requested without permission")
    }
}

#[tokio::test]
async fn denied_location_feeds_default_coordinates_into_comparison() {
    let location = LocationController::new(Arc::new(DeniedProvider));
    assert!(location.mount().await);

    let state = location.state();
    assert_eq!(state.phase, LocationPhase::Denied);
    assert_eq!(state.error, None);

    let place = state.location.expect("settled location");
    assert_eq!(place.city, "서울시");
    assert_eq!(place.district, "강남구");
    assert_eq!(place.coords, Coordinates { latitude: 37.5665, longitude: 126.978 });

    let config = ServiceConfig { mock_latency_ms: 0, ..ServiceConfig::default() };
    let service = Arc::new(WeatherService::new(config));
    let comparison = ComparisonController::new(service, ComparisonParams::disabled());
    assert!(
        comparison
            .set_params(ComparisonParams::new(place.coords.latitude, place.coords.longitude))
            .await
    );

    let weather = comparison.state();
    assert_eq!(weather.phase, Phase::Success);
    assert!(weather.data.is_some());
}
