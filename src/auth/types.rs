// Wire types for the auth endpoints

use serde::{Deserialize, Serialize};

/// Token refresh request body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token refresh response body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Login request body
#[derive(Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signup request body
#[derive(Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Successful login/signup response body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Option<UserProfile>,
}

/// User profile as returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

/// Login-status response body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginStatusResponse {
    pub logged_in: bool,
}

/// Error payload shape used by the API
#[derive(Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
}
