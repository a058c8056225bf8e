//! Registration and login forms.

use secrecy::{ExposeSecret, SecretString};
use taskmanager_core::{Email, UserProfile};
use tracing::warn;

use super::{Outcome, ViewHandle};
use crate::api::ApiClient;

/// Account creation form.
#[derive(Debug)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    submitting: bool,
    message: Option<String>,
    error: Option<String>,
    handle: ViewHandle,
}

impl RegisterForm {
    /// An empty form.
    #[must_use]
    pub fn new(handle: ViewHandle) -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: SecretString::from(""),
            submitting: false,
            message: None,
            error: None,
            handle,
        }
    }

    /// False while a registration request is outstanding.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        !self.submitting
    }

    /// Confirmation from the last successful registration.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Error from the last attempt.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Send the registration.
    ///
    /// On success the server's message is kept and every field is cleared.
    /// The user is not logged in.
    pub async fn submit(&mut self, api: &ApiClient) -> Outcome<String> {
        if self.submitting {
            return Outcome::Ignored;
        }
        self.message = None;
        self.error = None;

        let username = self.username.trim().to_string();
        if username.is_empty() {
            self.error = Some("Username is required".to_string());
            return Outcome::Rejected;
        }
        let email = match Email::parse(&self.email) {
            Ok(email) => email,
            Err(e) => {
                self.error = Some(e.to_string());
                return Outcome::Rejected;
            }
        };
        if self.password.expose_secret().is_empty() {
            self.error = Some("Password is required".to_string());
            return Outcome::Rejected;
        }

        self.submitting = true;
        let result = api.register(&username, &email, &self.password).await;
        self.submitting = false;

        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }

        match result {
            Ok(message) => {
                self.message = Some(message.clone());
                self.username.clear();
                self.email.clear();
                self.password = SecretString::from("");
                Outcome::Completed(message)
            }
            Err(e) => {
                self.error = Some(e.user_message("Registration failed"));
                Outcome::Failed(e)
            }
        }
    }
}

/// Credential form. A successful submit starts the session.
#[derive(Debug)]
pub struct LoginForm {
    pub username: String,
    pub password: SecretString,
    submitting: bool,
    error: Option<String>,
    handle: ViewHandle,
}

impl LoginForm {
    /// An empty form.
    #[must_use]
    pub fn new(handle: ViewHandle) -> Self {
        Self {
            username: String::new(),
            password: SecretString::from(""),
            submitting: false,
            error: None,
            handle,
        }
    }

    /// False while a login request is outstanding.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        !self.submitting
    }

    /// Error from the last attempt.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Authenticate and record the session.
    ///
    /// On success the password field is cleared and the session holds the
    /// new token and profile.
    pub async fn submit(&mut self, api: &ApiClient) -> Outcome<UserProfile> {
        if self.submitting {
            return Outcome::Ignored;
        }
        self.error = None;

        let username = self.username.trim().to_string();
        if username.is_empty() || self.password.expose_secret().is_empty() {
            self.error = Some("Username and password are required".to_string());
            return Outcome::Rejected;
        }

        self.submitting = true;
        let result = api.login(&username, &self.password).await;
        self.submitting = false;

        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.error = Some(e.user_message("Login failed"));
                return Outcome::Failed(e);
            }
        };

        let profile = outcome.profile.clone();
        if let Err(e) = api.session().login(outcome.token, outcome.profile).await {
            warn!(error = %e, "Could not persist session");
            self.error = Some("Login failed".to_string());
            return Outcome::Failed(e.into());
        }

        self.password = SecretString::from("");
        Outcome::Completed(profile)
    }
}
