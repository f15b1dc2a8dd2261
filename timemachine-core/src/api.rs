//! JSON-over-HTTP client with bearer auth and a single refresh-and-retry on 401.

use std::{sync::Arc, time::Duration};

use reqwest::{
    Client, Method, Response, StatusCode,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::ApiError;

pub mod store;

use store::{KeyValueStore, REFRESH_TOKEN_KEY, TOKEN_KEY};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Everything needed to send (and re-send) one request.
#[derive(Debug)]
struct Call<'a> {
    method: Method,
    path: &'a str,
    query: &'a [(&'a str, &'a str)],
    body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    store: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self { http, config, store })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.execute(Call { method: Method::GET, path, query, body: None }).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.execute(Call { method: Method::POST, path, query: &[], body: Some(body) }).await
    }

    pub async fn set_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), ApiError> {
        self.store.set(TOKEN_KEY, access_token).await.map_err(ApiError::Storage)?;
        self.store
            .set(REFRESH_TOKEN_KEY, refresh_token)
            .await
            .map_err(ApiError::Storage)
    }

    /// Failures are logged, never returned.
    pub async fn clear_tokens(&self) {
        if let Err(err) = self.store.remove_many(&[TOKEN_KEY, REFRESH_TOKEN_KEY]).await {
            tracing::error!(error = %err, "failed to clear auth tokens");
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn execute<T: DeserializeOwned>(&self, call: Call<'_>) -> Result<T, ApiError> {
        let token = self.auth_token().await;
        let response = self.send(&call, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(response).await;
        }

        let original = Self::error_from(response).await;
        match self.refresh_auth_token().await {
            Some(token) => {
                tracing::debug!(path = call.path, "retrying request with refreshed token");
                let retried = self.send(&call, Some(&token)).await?;
                Self::decode(retried).await
            }
            None => Err(original),
        }
    }

    async fn send(&self, call: &Call<'_>, token: Option<&str>) -> Result<Response, ApiError> {
        let mut request = self.http.request(call.method.clone(), self.url(call.path));

        if !call.query.is_empty() {
            request = request.query(call.query);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(method = %call.method, path = call.path, "API request");

        request.send().await.map_err(|err| {
            tracing::error!(error = %err, "network error");
            ApiError::Network(err)
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }

        tracing::debug!(status = status.as_u16(), url = %response.url(), "API response");
        response.json::<T>().await.map_err(ApiError::Decode)
    }

    /// Prefer the body's `message` field, then the status reason.
    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

        tracing::error!(status = status.as_u16(), %message, %url, "API error");
        ApiError::Http { status: status.as_u16(), message }
    }

    async fn auth_token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY).await {
            Ok(token) => token,
            Err(err) => {
                tracing::error!(error = %err, "failed to get auth token");
                None
            }
        }
    }

    /// New access token, or `None` after clearing both stored tokens.
    async fn refresh_auth_token(&self) -> Option<String> {
        match self.try_refresh().await {
            Ok(token) => Some(token),
            Err(err) => {
                tracing::warn!(error = %err, "failed to refresh token");
                self.clear_tokens().await;
                None
            }
        }
    }

    async fn try_refresh(&self) -> Result<String, ApiError> {
        let refresh_token = self
            .store
            .get(REFRESH_TOKEN_KEY)
            .await
            .map_err(ApiError::Storage)?
            .ok_or(ApiError::MissingRefreshToken)?;

        let response = self
            .http
            .post(self.url("auth/refresh"))
            .json(&RefreshRequest { refresh_token: &refresh_token })
            .send()
            .await
            .map_err(ApiError::Network)?;

        let tokens: RefreshResponse = Self::decode(response).await?;
        self.set_tokens(&tokens.access_token, &tokens.refresh_token).await?;

        Ok(tokens.access_token)
    }
}
