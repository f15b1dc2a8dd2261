//! Core library for the weather time machine.
//!
//! This crate defines:
//! - Temperature classification and comparison, date labels
//! - A synthetic weather generator and the service facade in front of it
//! - Fetch/refresh and location lifecycles as plain state machines
//! - A bearer-auth HTTP client and on-disk configuration
//!
//! It is used by `timemachine-cli`, but can also be driven by any other front end.

pub mod api;
pub mod comparison;
pub mod config;
pub mod date;
pub mod error;
pub mod location;
pub mod mock;
pub mod model;
pub mod service;
pub mod temperature;

pub use api::{ApiClient, ApiConfig};
pub use comparison::{ComparisonController, ComparisonParams, ComparisonState, Phase};
pub use config::Config;
pub use error::{ApiError, DateError, LocationError, WeatherError};
pub use location::{
    GeocodedAddress, LocationController, LocationPhase, LocationProvider, PermissionStatus,
};
pub use model::{
    Coordinates, Language, LocationInfo, TemperatureUnit, WeatherComparison, WeatherCondition,
    WeatherRecord,
};
pub use service::{ConfigUpdate, ServiceConfig, WeatherBackend, WeatherService};
pub use temperature::{ComparisonOutcome, TemperatureBand};
