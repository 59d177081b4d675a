// Session operations
// Login, signup, logout and login-status against the auth endpoints

use reqwest::Response;

use crate::auth::types::{
    AuthResponse, ErrorResponse, LoginRequest, LoginStatusResponse, SignupRequest, UserProfile,
};
use crate::client::{ApiClient, RequestOptions};
use crate::error::{ApiError, Result};
use crate::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

impl ApiClient {
    /// Log in and persist the issued token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<UserProfile>> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post(self.resolve_url("/api/auth/login"))
            .json(&request)
            .send()
            .await?;

        let auth = parse_auth_response(response).await?;
        self.persist_tokens(&auth).await?;

        tracing::info!("Logged in");
        Ok(auth.user)
    }

    /// Create an account and persist the issued token pair
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>> {
        let request = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post(self.resolve_url("/api/auth/signIn"))
            .json(&request)
            .send()
            .await?;

        let auth = parse_auth_response(response).await?;
        self.persist_tokens(&auth).await?;

        tracing::info!("Account created");
        Ok(auth.user)
    }

    /// Log out: revoke the session server-side (best effort), then always
    /// clear the locally stored tokens
    pub async fn logout(&self) -> Result<()> {
        let options = RequestOptions {
            method: reqwest::Method::POST,
            ..RequestOptions::default()
        };

        match self.authenticated_request("/api/auth/logout", options).await {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(status = %response.status(), "Server-side logout failed");
            }
            Err(e) => {
                tracing::warn!("Server-side logout failed: {}", e);
            }
            Ok(_) => {}
        }

        self.store.delete(ACCESS_TOKEN_KEY).await?;
        self.store.delete(REFRESH_TOKEN_KEY).await?;

        tracing::info!("Logged out");
        Ok(())
    }

    /// Whether the stored credentials still identify a logged-in user
    pub async fn login_status(&self) -> Result<bool> {
        let response = match self.get("/api/auth/login-status").await {
            Ok(response) => response,
            Err(ApiError::AuthExpired) => return Ok(false),
            Err(e) => return Err(e),
        };

        if !response.status().is_success() {
            return Ok(false);
        }

        let status: LoginStatusResponse = response.json().await?;
        Ok(status.logged_in)
    }

    async fn persist_tokens(&self, auth: &AuthResponse) -> Result<()> {
        self.store.set(ACCESS_TOKEN_KEY, &auth.access_token).await?;
        self.store.set(REFRESH_TOKEN_KEY, &auth.refresh_token).await?;
        Ok(())
    }
}

async fn parse_auth_response(response: Response) -> Result<AuthResponse> {
    let status = response.status();
    if !status.is_success() {
        let message = extract_error_message(response).await;
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let auth: AuthResponse = response.json().await?;
    Ok(auth)
}

/// Pull the server's `message` field out of an error body, if there is one
async fn extract_error_message(response: Response) -> String {
    match response.json::<ErrorResponse>().await {
        Ok(body) => body.message.unwrap_or_else(|| "Server error".to_string()),
        Err(_) => "Server error".to_string(),
    }
}
