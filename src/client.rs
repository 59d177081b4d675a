use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::Serialize;

use crate::auth::TokenRefreshCoordinator;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::store::CredentialStore;

/// Request descriptor for `authenticated_request`
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn put(body: serde_json::Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    /// Add a header, overriding the dispatch defaults for that name
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// HTTP client for the Blogline API
///
/// Owns the connection pool and the token refresh coordinator. Every request
/// goes through `authenticated_request`, which suspends behind any in-flight
/// token refresh before dispatching.
pub struct ApiClient {
    pub(crate) config: ClientConfig,
    pub(crate) client: Client,
    pub(crate) coordinator: TokenRefreshCoordinator,
    pub(crate) store: Arc<dyn CredentialStore>,
}

impl ApiClient {
    /// Create a new client over the given credential store
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> anyhow::Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let coordinator = TokenRefreshCoordinator::new(
            store.clone(),
            client.clone(),
            config.refresh_url(),
            config.refresh_threshold_secs,
        );

        Ok(Self {
            config,
            client,
            coordinator,
            store,
        })
    }

    /// Perform an authenticated request against the API
    ///
    /// `endpoint` is a path resolved against the configured base URL, or a
    /// full http(s) URL used as-is. The response is returned unmodified;
    /// non-2xx statuses are the caller's to interpret. `AuthExpired` means
    /// the stored credentials are gone and the user must log in again.
    pub async fn authenticated_request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        let token = self.coordinator.bearer_token().await?;
        let url = self.resolve_url(endpoint);

        tracing::debug!(method = %options.method, url = %url, "Dispatching authenticated request");

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Internal(anyhow::anyhow!("Invalid bearer token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        // Caller-supplied headers win over the defaults
        for (name, value) in &options.headers {
            headers.insert(name, value.clone());
        }

        let mut request = self
            .client
            .request(options.method.clone(), &url)
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        tracing::debug!(status = %response.status(), url = %url, "Received response");
        Ok(response)
    }

    /// GET a path with the default options
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        self.authenticated_request(endpoint, RequestOptions::get())
            .await
    }

    /// POST a JSON body to a path
    pub async fn post_json<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;
        self.authenticated_request(endpoint, RequestOptions::post(body))
            .await
    }

    /// PUT a JSON body to a path
    pub async fn put_json<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;
        self.authenticated_request(endpoint, RequestOptions::put(body))
            .await
    }

    /// DELETE a path
    pub async fn delete_request(&self, endpoint: &str) -> Result<Response> {
        self.authenticated_request(endpoint, RequestOptions::delete())
            .await
    }

    /// The coordinator backing this client
    pub fn coordinator(&self) -> &TokenRefreshCoordinator {
        &self.coordinator
    }

    pub(crate) fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }

        let base = self.config.base_url.trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        }
    }
}
