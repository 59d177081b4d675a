// Token refresh coordination
//
// Many concurrent requests can observe the same expiring access token. At
// most one refresh exchange may be outstanding at a time; every other
// request suspends as a waiter and resumes with that exchange's single
// outcome.

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::{oneshot, Mutex};

use crate::error::ApiError;
use crate::store::{CredentialStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

use super::jwt;
use super::types::{RefreshRequest, RefreshResponse};

/// Shared coordination state
///
/// Invariant: `refresh_in_flight` is true exactly while one exchange task is
/// outstanding, and `pending_waiters` is drained to empty on every
/// resolution, success or failure.
struct RefreshState {
    refresh_in_flight: bool,
    pending_waiters: Vec<oneshot::Sender<Option<String>>>,
}

/// Coordinates access-token refreshes across concurrent requests
///
/// Cloning is cheap; clones share the same state, store and connection pool.
#[derive(Clone)]
pub struct TokenRefreshCoordinator {
    store: Arc<dyn CredentialStore>,
    client: Client,
    refresh_url: String,
    refresh_threshold_secs: i64,
    state: Arc<Mutex<RefreshState>>,
}

impl TokenRefreshCoordinator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        client: Client,
        refresh_url: String,
        refresh_threshold_secs: i64,
    ) -> Self {
        Self {
            store,
            client,
            refresh_url,
            refresh_threshold_secs,
            state: Arc::new(Mutex::new(RefreshState {
                refresh_in_flight: false,
                pending_waiters: Vec::new(),
            })),
        }
    }

    /// Produce the bearer token for an outgoing request, refreshing first if
    /// the cached token is expiring
    ///
    /// Returns `Ok(None)` when no usable credentials are stored: the request
    /// goes out without an Authorization header and the server answers 401
    /// if auth was required (fail-open). A failed refresh clears both stored
    /// tokens and surfaces as `AuthExpired`.
    pub async fn bearer_token(&self) -> Result<Option<String>, ApiError> {
        let access_token = self.store.get(ACCESS_TOKEN_KEY).await?;

        let now = chrono::Utc::now().timestamp();
        let expiring = match &access_token {
            Some(token) => jwt::is_expiring(token, self.refresh_threshold_secs, now),
            None => true,
        };

        if !expiring {
            return Ok(access_token);
        }

        let Some(refresh_token) = self.store.get(REFRESH_TOKEN_KEY).await? else {
            // Nothing to exchange: fail open with whatever we have and let
            // the server reject the request if it needs auth
            tracing::debug!("No refresh token stored, skipping refresh");
            return Ok(access_token);
        };

        let (leads, outcome) = self.join_refresh().await;
        if leads {
            tracing::debug!("Access token expiring, starting refresh exchange");
            // Detached task: the exchange must run to completion and drain
            // the waiter queue even if this caller's future is dropped
            let coordinator = self.clone();
            tokio::spawn(async move {
                coordinator.run_refresh(refresh_token).await;
            });
        } else {
            tracing::debug!("Refresh already in flight, waiting for its outcome");
        }

        match outcome.await {
            Ok(Some(token)) => Ok(Some(token)),
            Ok(None) | Err(_) => Err(ApiError::AuthExpired),
        }
    }

    /// Join the current refresh cycle
    ///
    /// The first caller becomes the leader that performs the exchange;
    /// everyone, leader included, receives the outcome over its own channel.
    async fn join_refresh(&self) -> (bool, oneshot::Receiver<Option<String>>) {
        let mut state = self.state.lock().await;
        let leads = !state.refresh_in_flight;
        state.refresh_in_flight = true;

        let (tx, rx) = oneshot::channel();
        state.pending_waiters.push(tx);
        (leads, rx)
    }

    /// Perform the single refresh exchange and broadcast its outcome
    async fn run_refresh(&self, refresh_token: String) {
        let outcome = match self.exchange(refresh_token).await {
            Ok(token) => {
                tracing::info!("Access token refreshed");
                Some(token)
            }
            Err(e) => {
                tracing::error!("Token refresh failed: {}", e);
                if let Err(e) = self.clear_credentials().await {
                    tracing::error!("Failed to clear stored credentials: {:#}", e);
                }
                None
            }
        };

        let waiters = {
            let mut state = self.state.lock().await;
            state.refresh_in_flight = false;
            std::mem::take(&mut state.pending_waiters)
        };

        tracing::debug!(
            waiters = waiters.len(),
            "Notifying requests queued behind refresh"
        );
        for waiter in waiters {
            // A waiter that has given up is fine to skip
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Call the refresh endpoint and persist the new access token
    async fn exchange(&self, refresh_token: String) -> Result<String, ApiError> {
        tracing::debug!(url = %self.refresh_url, "Exchanging refresh token");

        let request = RefreshRequest { refresh_token };
        let response = self
            .client
            .post(&self.refresh_url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::RefreshFailed {
                status: status.as_u16(),
            });
        }

        let data: RefreshResponse = response.json().await?;
        if data.access_token.is_empty() {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "Refresh response does not contain accessToken"
            )));
        }

        self.store.set(ACCESS_TOKEN_KEY, &data.access_token).await?;
        Ok(data.access_token)
    }

    /// Delete both stored tokens; subsequent calls fail fast until re-login
    async fn clear_credentials(&self) -> anyhow::Result<()> {
        self.store.delete(ACCESS_TOKEN_KEY).await?;
        self.store.delete(REFRESH_TOKEN_KEY).await?;
        Ok(())
    }

    /// Whether a refresh exchange is currently outstanding
    pub async fn refresh_in_flight(&self) -> bool {
        self.state.lock().await.refresh_in_flight
    }

    /// Number of requests currently queued behind the in-flight refresh
    pub async fn pending_waiter_count(&self) -> usize {
        self.state.lock().await.pending_waiters.len()
    }
}
