//! Registration, login and logout against the stub backend.

use secrecy::{ExposeSecret, SecretString};
use taskmanager_client::views::{LoginForm, RegisterForm};
use taskmanager_client::{FileTokenStorage, MemoryTokenStorage, Outcome, Screen, ViewHandle};
use taskmanager_core::Role;
use taskmanager_integration_tests::StubBackend;

async fn log_in(
    api: &taskmanager_client::ApiClient,
    username: &str,
    password: &str,
) -> Outcome<taskmanager_core::UserProfile> {
    let mut form = LoginForm::new(ViewHandle::new());
    form.username = username.to_string();
    form.password = SecretString::from(password);
    form.submit(api).await
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_then_login() {
    let backend = StubBackend::start().await;
    let api = backend.client();

    let mut form = RegisterForm::new(ViewHandle::new());
    form.username = "alice".to_string();
    form.email = "a@x.com".to_string();
    form.password = SecretString::from("secret");

    let outcome = form.submit(&api).await;
    assert!(matches!(&outcome, Outcome::Completed(message) if message == "User registered successfully!"));
    assert_eq!(form.message(), Some("User registered successfully!"));
    assert!(form.username.is_empty());
    assert!(form.email.is_empty());
    assert!(form.password.expose_secret().is_empty());

    // Registering does not start a session
    assert!(!api.session().is_authenticated().await);

    let profile = log_in(&api, "alice", "secret")
        .await
        .completed()
        .expect("login should succeed");
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.email.as_str(), "a@x.com");
    assert_eq!(profile.role, Role::User);
}

#[tokio::test]
async fn test_register_duplicate_shows_server_message() {
    let backend = StubBackend::start().await;
    backend.add_user("alice", "secret", Role::User);
    let api = backend.client();

    let mut form = RegisterForm::new(ViewHandle::new());
    form.username = "alice".to_string();
    form.email = "other@x.com".to_string();
    form.password = SecretString::from("secret");

    let outcome = form.submit(&api).await;
    assert!(outcome.is_failed());
    assert_eq!(form.error(), Some("Error: Username is already taken!"));
    // Fields stay so the user can correct them
    assert_eq!(form.username, "alice");
}

#[tokio::test]
async fn test_register_invalid_email_sends_nothing() {
    let backend = StubBackend::start().await;
    let api = backend.client();

    let mut form = RegisterForm::new(ViewHandle::new());
    form.username = "alice".to_string();
    form.email = "not-an-email".to_string();
    form.password = SecretString::from("secret");

    assert!(matches!(form.submit(&api).await, Outcome::Rejected));
    assert!(form.error().is_some());
    assert_eq!(backend.request_count(), 0);
}

// ============================================================================
// Session and bearer token
// ============================================================================

#[tokio::test]
async fn test_bearer_header_follows_session() {
    let backend = StubBackend::start().await;
    let alice = backend.add_user("alice", "secret", Role::User);
    let api = backend.client();

    // Anonymous request carries no Authorization header
    let _ = api.list_tasks().await;

    assert!(log_in(&api, "alice", "secret").await.is_completed());
    api.list_tasks().await.expect("authenticated list should succeed");

    api.session().logout().await.expect("logout should succeed");
    let _ = api.list_tasks().await;

    let headers = backend.authorization_headers();
    let expected = format!("Bearer {}", StubBackend::token_for(alice));
    assert_eq!(
        headers,
        vec![None, None, Some(expected), None],
        "login itself is sent without a token"
    );
}

#[tokio::test]
async fn test_login_failure_keeps_session_empty() {
    let backend = StubBackend::start().await;
    backend.add_user("alice", "secret", Role::User);
    let api = backend.client();

    let mut form = LoginForm::new(ViewHandle::new());
    form.username = "alice".to_string();
    form.password = SecretString::from("wrong");

    assert!(form.submit(&api).await.is_failed());
    assert_eq!(form.error(), Some("Invalid username or password"));
    assert!(!api.session().is_authenticated().await);
    assert_eq!(
        Screen::resolve(&api.session().snapshot().await),
        Screen::Login
    );
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let backend = StubBackend::start().await;
    backend.add_user("alice", "secret", Role::User);
    let api = backend.client();

    assert!(log_in(&api, "alice", "secret").await.is_completed());
    api.session().logout().await.expect("first logout");
    api.session().logout().await.expect("second logout");

    let session = api.session().snapshot().await;
    assert!(session.token.is_none());
    assert!(session.user.is_none());
}

#[tokio::test]
async fn test_second_login_replaces_profile() {
    let backend = StubBackend::start().await;
    backend.add_user("alice", "secret", Role::User);
    backend.add_user("root", "hunter2", Role::Admin);
    let api = backend.client();

    assert!(log_in(&api, "alice", "secret").await.is_completed());
    assert!(log_in(&api, "root", "hunter2").await.is_completed());

    let session = api.session().snapshot().await;
    assert_eq!(session.role(), Some(Role::Admin));
    assert_eq!(Screen::resolve(&session), Screen::AdminDashboard);
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_token_survives_restart() {
    let backend = StubBackend::start().await;
    backend.add_user("alice", "secret", Role::User);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("session.json");

    let api = backend.client_with(FileTokenStorage::new(&path));
    assert!(log_in(&api, "alice", "secret").await.is_completed());
    drop(api);

    // A fresh process restores the token but not the profile
    let api = backend.client_with(FileTokenStorage::new(&path));
    let session = api.session().snapshot().await;
    assert!(session.is_authenticated());
    assert!(session.user.is_none());
    assert_eq!(Screen::resolve(&session), Screen::Dashboard);

    api.list_tasks()
        .await
        .expect("restored token should be accepted");
}

#[tokio::test]
async fn test_stale_token_is_unauthorized() {
    let backend = StubBackend::start().await;
    let api = backend.client_with(MemoryTokenStorage::with_token("token-404"));

    let error = api.list_tasks().await.expect_err("unknown token must fail");
    assert!(error.is_unauthorized());
    assert_eq!(error.status(), Some(401));
}
