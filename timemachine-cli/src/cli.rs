use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, CustomUserError, Select, Text, validator::Validation};
use rand::{SeedableRng, rngs::StdRng};
use timemachine_core::{
    ApiClient, ApiConfig, ComparisonController, ComparisonParams, Config, ConfigUpdate,
    Coordinates, Language, LocationController, WeatherService,
    api::store::FileStore,
    date::today,
    location::default_location,
    mock::Scenario,
};

use crate::{device::ArgsLocation, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "timemachine", version, about = "Today's weather next to the same day last year")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit the configuration file.
    Configure,

    /// Show today's weather next to the same day last year.
    Show {
        /// Latitude; without it the default location is used.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Place name to show for the given coordinates.
        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        district: Option<String>,

        /// Output language ("ko" or "en"); overrides the config file.
        #[arg(long)]
        lang: Option<String>,

        /// Seed for the mock generator, for reproducible output.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the raw comparison as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print one of the fixed demo comparisons: warmer, colder or similar.
    Scenario {
        name: String,

        #[arg(long)]
        lang: Option<String>,
    },

    /// Call the REST API configured under `[api]`.
    Api {
        #[command(subcommand)]
        action: ApiAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ApiAction {
    /// Store access and refresh tokens for later requests.
    Login {
        #[arg(long)]
        access_token: String,

        #[arg(long)]
        refresh_token: String,
    },

    /// Forget the stored tokens.
    Logout,

    /// GET a path relative to the base URL and print the JSON body.
    Get {
        path: String,

        /// Query parameter as `key=value`; repeatable.
        #[arg(long = "query", value_parser = parse_query_pair)]
        query: Vec<(String, String)>,
    },
}

fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

fn resolve_language(flag: Option<&str>, config: &Config) -> anyhow::Result<Language> {
    flag.map_or(Ok(config.language), Language::try_from)
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, city, district, lang, seed, json } => {
                let config = Config::load()?;
                let language = resolve_language(lang.as_deref(), &config)?;
                let coords = lat
                    .zip(lon)
                    .map(|(latitude, longitude)| Coordinates { latitude, longitude });

                show(&config, ArgsLocation { coords, city, district }, language, seed, json).await
            }
            Command::Scenario { name, lang } => {
                let config = Config::load()?;
                let language = resolve_language(lang.as_deref(), &config)?;
                let scenario = Scenario::try_from(name.as_str())?;

                let now = Utc::now();
                let cmp = scenario.comparison(today(), now)?;
                let text = render::comparison(
                    &default_location(),
                    &cmp,
                    language,
                    config.comparison_threshold,
                    now,
                )?;
                println!("{text}");
                Ok(())
            }
            Command::Api { action } => {
                let config = Config::load()?;
                let client = api_client(&config.api, FileStore::default_path()?)?;

                api(&client, action).await
            }
        }
    }
}

async fn show(
    config: &Config,
    device: ArgsLocation,
    language: Language,
    seed: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let mut service = WeatherService::new(config.service.clone());
    if let Some(seed) = seed {
        service = service.with_rng(StdRng::seed_from_u64(seed));
    }

    let location = LocationController::new(Arc::new(device));
    location.mount().await;
    let located = location.state();
    if let Some(err) = &located.error {
        eprintln!("{err}");
    }
    let place = located.location.unwrap_or_else(default_location);
    tracing::debug!(
        city = %place.city,
        district = %place.district,
        phase = ?located.phase,
        "location resolved"
    );

    // Gated on location, like the screen: disabled until a place is known.
    let weather = ComparisonController::new(Arc::new(service), ComparisonParams::disabled());
    weather
        .set_params(ComparisonParams::new(place.coords.latitude, place.coords.longitude))
        .await;

    let state = weather.state();
    if let Some(err) = state.error {
        return Err(anyhow!(err));
    }
    let cmp = state
        .data
        .ok_or_else(|| anyhow!("No weather data was produced"))?;

    if json {
        let pretty =
            serde_json::to_string_pretty(&cmp).context("Failed to serialize comparison")?;
        println!("{pretty}");
    } else {
        let text =
            render::comparison(&place, &cmp, language, config.comparison_threshold, Utc::now())?;
        println!("{text}");
    }

    Ok(())
}

fn api_client(config: &ApiConfig, token_path: PathBuf) -> anyhow::Result<ApiClient> {
    tracing::debug!(
        base_url = %config.base_url,
        tokens = %token_path.display(),
        "building api client"
    );
    Ok(ApiClient::new(config.clone(), Arc::new(FileStore::new(token_path)))?)
}

async fn api(client: &ApiClient, action: ApiAction) -> anyhow::Result<()> {
    match action {
        ApiAction::Login { access_token, refresh_token } => {
            client.set_tokens(&access_token, &refresh_token).await?;
            println!("Tokens saved");
        }
        ApiAction::Logout => {
            client.clear_tokens().await;
            println!("Tokens cleared");
        }
        ApiAction::Get { path, query } => {
            let body = api_get(client, &path, &query).await?;
            let pretty =
                serde_json::to_string_pretty(&body).context("Failed to serialize response")?;
            println!("{pretty}");
        }
    }

    Ok(())
}

async fn api_get(
    client: &ApiClient,
    path: &str,
    query: &[(String, String)],
) -> anyhow::Result<serde_json::Value> {
    let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    Ok(client.get_with_query(path, &pairs).await?)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let languages = Language::all().to_vec();
    let cursor = languages.iter().position(|l| *l == config.language).unwrap_or(0);
    config.language = Select::new("Language:", languages)
        .with_starting_cursor(cursor)
        .prompt()?;

    let use_mock_data = Confirm::new("Use mock weather data?")
        .with_default(config.service.use_mock_data)
        .with_help_message(
            "Real weather backends are not bundled; turning this off makes `show` fail.",
        )
        .prompt()?;

    let mock_latency_ms = CustomType::<u64>::new("Simulated latency in mock mode (ms):")
        .with_default(config.service.mock_latency_ms)
        .prompt()?;

    config.apply_service_update(ConfigUpdate {
        use_mock_data: Some(use_mock_data),
        mock_latency_ms: Some(mock_latency_ms),
        ..ConfigUpdate::default()
    });

    config.comparison_threshold = CustomType::<f64>::new("Similarity threshold (°C):")
        .with_default(config.comparison_threshold)
        .with_validator(|v: &f64| -> Result<Validation, CustomUserError> {
            Ok(if v.is_finite() && *v >= 0.0 {
                Validation::Valid
            } else {
                Validation::Invalid("Must be a non-negative number".into())
            })
        })
        .prompt()?;

    let base_url = Text::new("API base URL:")
        .with_default(&config.api.base_url)
        .prompt()?;
    config.api.base_url = base_url;

    let path = config.save()?;
    tracing::info!(path = %path.display(), "configuration saved");
    println!("Configuration saved to {}", path.display());

    Ok(())
}
