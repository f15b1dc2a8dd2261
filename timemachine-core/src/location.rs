//! Permission → position → reverse geocoding, with fallbacks at every step.
//!
//! The device side is abstracted behind [`LocationProvider`]. Whatever goes
//! wrong, [`LocationController`] settles on *some* location:
//!
//! - permission denied: the default location, no error recorded;
//! - geocoding failed or empty: real coordinates, default place names;
//! - anything else: the default location plus a user-facing error string.

use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    error::LocationError,
    model::{Coordinates, LocationInfo},
};

pub const DEFAULT_CITY: &str = "서울시";
pub const DEFAULT_DISTRICT: &str = "강남구";
pub const DEFAULT_COORDS: Coordinates = Coordinates { latitude: 37.5665, longitude: 126.978 };

pub const LOCATION_FAILED_MESSAGE: &str = "위치 정보를 가져올 수 없습니다";

pub fn default_location() -> LocationInfo {
    with_default_names(DEFAULT_COORDS)
}

fn with_default_names(coords: Coordinates) -> LocationInfo {
    LocationInfo {
        city: DEFAULT_CITY.to_string(),
        district: DEFAULT_DISTRICT.to_string(),
        coords,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// One reverse-geocoding result. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodedAddress {
    pub city: Option<String>,
    pub region: Option<String>,
    pub district: Option<String>,
    pub subregion: Option<String>,
}

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn request_permission(&self) -> anyhow::Result<PermissionStatus>;

    async fn current_position(&self) -> anyhow::Result<Coordinates>;

    /// Zero or more candidate addresses; only the first is used.
    async fn reverse_geocode(&self, coords: Coordinates) -> anyhow::Result<Vec<GeocodedAddress>>;
}

type FieldAccessor = fn(&GeocodedAddress) -> Option<&str>;

fn city(a: &GeocodedAddress) -> Option<&str> {
    a.city.as_deref()
}

fn region(a: &GeocodedAddress) -> Option<&str> {
    a.region.as_deref()
}

fn district(a: &GeocodedAddress) -> Option<&str> {
    a.district.as_deref()
}

fn subregion(a: &GeocodedAddress) -> Option<&str> {
    a.subregion.as_deref()
}

/// Tried in order; the first non-empty value wins, else [`DEFAULT_CITY`].
pub const CITY_FALLBACKS: &[FieldAccessor] = &[city, region];
/// Tried in order; the first non-empty value wins, else [`DEFAULT_DISTRICT`].
pub const DISTRICT_FALLBACKS: &[FieldAccessor] = &[district, subregion];

fn first_present(address: &GeocodedAddress, accessors: &[FieldAccessor], default: &str) -> String {
    accessors
        .iter()
        .find_map(|get| get(address).filter(|v| !v.trim().is_empty()))
        .unwrap_or(default)
        .to_string()
}

pub fn place_from_address(address: &GeocodedAddress, coords: Coordinates) -> LocationInfo {
    LocationInfo {
        city: first_present(address, CITY_FALLBACKS, DEFAULT_CITY),
        district: first_present(address, DISTRICT_FALLBACKS, DEFAULT_DISTRICT),
        coords,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationPhase {
    Idle,
    Requesting,
    ResolvingAddress,
    /// Real coordinates and geocoded names.
    Resolved,
    /// Real coordinates, default names.
    GeocodeFailed,
    /// Permission refused; default location.
    Denied,
    /// Unexpected failure; default location and an error message.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationState {
    pub phase: LocationPhase,
    pub location: Option<LocationInfo>,
    pub error: Option<String>,
}

impl LocationState {
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, LocationPhase::Requesting | LocationPhase::ResolvingAddress)
    }
}

impl Default for LocationState {
    fn default() -> Self {
        Self { phase: LocationPhase::Idle, location: None, error: None }
    }
}

#[derive(Debug)]
pub struct LocationController {
    provider: Arc<dyn LocationProvider>,
    state: Mutex<LocationState>,
    mounted: AtomicBool,
    generation: AtomicU64,
}

impl LocationController {
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(LocationState::default()),
            mounted: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> LocationState {
        self.state.lock().clone()
    }

    /// Runs the automatic request the first time only. Returns whether it ran.
    pub async fn mount(&self) -> bool {
        if self.mounted.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.request_location().await;
        true
    }

    /// Run the whole sequence again and return where it settled.
    pub async fn request_location(&self) -> LocationInfo {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock();
            state.phase = LocationPhase::Requesting;
            state.error = None;
        }

        let (location, phase, error) = match self.resolve(ticket).await {
            Ok((location, phase)) => (location, phase, None),
            Err(err) => {
                tracing::error!(error = %err, "error fetching location");
                let message = LOCATION_FAILED_MESSAGE.to_string();
                (default_location(), LocationPhase::Failed, Some(message))
            }
        };

        if self.is_current(ticket) {
            let mut state = self.state.lock();
            state.phase = phase;
            state.location = Some(location.clone());
            state.error = error;
        }

        tracing::info!(
            city = %location.city,
            district = %location.district,
            ?phase,
            "location settled"
        );
        location
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    async fn resolve(&self, ticket: u64) -> Result<(LocationInfo, LocationPhase), LocationError> {
        let status = self
            .provider
            .request_permission()
            .await
            .map_err(LocationError::Permission)?;

        if status != PermissionStatus::Granted {
            tracing::info!(?status, "location permission denied, using default location");
            return Ok((default_location(), LocationPhase::Denied));
        }

        let coords = self
            .provider
            .current_position()
            .await
            .map_err(LocationError::Position)?;

        if self.is_current(ticket) {
            self.state.lock().phase = LocationPhase::ResolvingAddress;
        }

        match self.provider.reverse_geocode(coords).await.map_err(LocationError::Geocode) {
            Ok(addresses) => match addresses.first() {
                Some(address) => Ok((place_from_address(address, coords), LocationPhase::Resolved)),
                None => {
                    tracing::warn!("reverse geocoding returned no address, using default names");
                    Ok((with_default_names(coords), LocationPhase::GeocodeFailed))
                }
            },
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "geocoding failed, using coordinates with default location name"
                );
                Ok((with_default_names(coords), LocationPhase::GeocodeFailed))
            }
        }
    }
}
