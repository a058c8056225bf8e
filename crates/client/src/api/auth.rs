//! Registration and login.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use taskmanager_core::{Email, Role, UserId, UserProfile};
use tracing::{info, instrument, warn};

use super::{ApiClient, ApiError};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Bearer token for subsequent requests.
    pub token: SecretString,
    /// The authenticated user's profile.
    pub profile: UserProfile,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Flat login body: `{token, type, id, username, email, role}`.
#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    id: UserId,
    username: String,
    email: String,
    role: String,
}

impl LoginResponse {
    fn into_outcome(self) -> Result<LoginOutcome, ApiError> {
        if self.token.trim().is_empty() {
            return Err(ApiError::InvalidProfile("empty token".to_string()));
        }
        let email = Email::parse(&self.email)
            .map_err(|e| ApiError::InvalidProfile(format!("email: {e}")))?;
        let role = Role::parse(&self.role).unwrap_or_else(|e| {
            warn!(error = %e, "Unrecognized role, treating as a standard user");
            Role::User
        });

        Ok(LoginOutcome {
            token: SecretString::from(self.token),
            profile: UserProfile {
                id: self.id,
                username: self.username,
                email,
                role,
            },
        })
    }
}

impl ApiClient {
    /// Create an account. Does not log in.
    ///
    /// Returns the server's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns error if the server rejects the registration (for example a
    /// taken username) or the request fails.
    #[instrument(skip(self, email, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<String, ApiError> {
        let body = RegisterRequest {
            username,
            email: email.as_str(),
            password: password.expose_secret(),
        };

        let response: MessageResponse = self.post("/auth/register", &body).await?;
        info!("Account registered");
        Ok(response
            .message
            .unwrap_or_else(|| "User registered successfully!".to_string()))
    }

    /// Exchange credentials for a token and profile.
    ///
    /// The session is not touched; record the outcome with
    /// [`SessionStore::login`](crate::session::SessionStore::login).
    ///
    /// # Errors
    ///
    /// Returns error if the credentials are rejected, the request fails, or
    /// the response carries an unusable role or email.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, ApiError> {
        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };

        let response: LoginResponse = self.post("/auth/login", &body).await?;
        let outcome = response.into_outcome().inspect_err(|e| {
            warn!(error = %e, "Login response rejected");
        })?;
        info!(role = %outcome.profile.role, "Logged in");
        Ok(outcome)
    }
}
