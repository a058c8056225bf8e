//! Admin console: routing by role, user and task management.

use secrecy::SecretString;
use taskmanager_client::views::{AdminDashboard, AdminTaskTable, LoginForm, UserTable};
use taskmanager_client::{ApiClient, Notice, Outcome, Screen, ViewHandle};
use taskmanager_core::{Role, TaskId, TaskUpdate, UserId, UserUpdate};
use taskmanager_integration_tests::StubBackend;

async fn logged_in(backend: &StubBackend, username: &str, password: &str) -> ApiClient {
    let api = backend.client();
    let mut form = LoginForm::new(ViewHandle::new());
    form.username = username.to_string();
    form.password = SecretString::from(password);
    assert!(form.submit(&api).await.is_completed(), "login failed");
    api
}

/// root (admin, id 1), alice (id 2) with two tasks, bob (id 3) with one.
async fn seeded() -> (StubBackend, UserId, UserId, UserId) {
    let backend = StubBackend::start().await;
    let root = backend.add_user("root", "hunter2", Role::Admin);
    let alice = backend.add_user("alice", "secret", Role::User);
    let bob = backend.add_user("bob", "pw", Role::User);
    backend.insert_task(alice, 1, "Write report");
    backend.insert_task(alice, 2, "Review PR");
    backend.insert_task(bob, 3, "Fix printer");
    (backend, root, alice, bob)
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_admin_lands_on_admin_dashboard() {
    let (backend, ..) = seeded().await;
    let api = logged_in(&backend, "root", "hunter2").await;
    assert_eq!(
        Screen::resolve(&api.session().snapshot().await),
        Screen::AdminDashboard
    );
}

#[tokio::test]
async fn test_user_lands_on_dashboard() {
    let (backend, ..) = seeded().await;
    let api = logged_in(&backend, "alice", "secret").await;
    assert_eq!(
        Screen::resolve(&api.session().snapshot().await),
        Screen::Dashboard
    );
}

#[tokio::test]
async fn test_non_admin_is_refused_by_server() {
    let (backend, ..) = seeded().await;
    let api = logged_in(&backend, "alice", "secret").await;

    let error = api.list_users().await.expect_err("non-admin must be refused");
    assert_eq!(error.status(), Some(403));
    assert_eq!(
        error.user_message("Failed to fetch users"),
        "Access denied. Admin role required."
    );

    let mut users = UserTable::new(ViewHandle::new());
    assert!(users.refresh(&api).await.is_failed());
    assert_eq!(users.error(), Some("Failed to fetch users"));
}

// ============================================================================
// Overview
// ============================================================================

#[tokio::test]
async fn test_overview_stats() {
    let (backend, ..) = seeded().await;
    let api = logged_in(&backend, "root", "hunter2").await;

    let mut console = AdminDashboard::new(ViewHandle::new());
    assert!(console.load_stats(&api).await.is_completed());
    let stats = console.stats().expect("stats loaded");
    assert_eq!(stats.total_users, Some(3));
    assert_eq!(stats.total_tasks, Some(3));

    let [users, tasks, active, completed] = console.stat_cells();
    assert_eq!(users.value, "3");
    assert_eq!(tasks.value, "3");
    // The backend does not report these
    assert_eq!(active.value, "-");
    assert_eq!(completed.value, "-");
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_user_table_lists_accounts_with_counts() {
    let (backend, _, alice, _) = seeded().await;
    let api = logged_in(&backend, "root", "hunter2").await;

    let mut users = UserTable::new(ViewHandle::new());
    assert!(users.refresh(&api).await.is_completed());
    assert_eq!(users.users().len(), 3);
    let alice = users.users().get(alice).expect("alice listed");
    assert_eq!(alice.task_count, Some(2));
}

#[tokio::test]
async fn test_admin_account_cannot_be_deleted() {
    let (backend, root, ..) = seeded().await;
    let api = logged_in(&backend, "root", "hunter2").await;

    let mut users = UserTable::new(ViewHandle::new());
    assert!(users.refresh(&api).await.is_completed());
    let account = users.users().get(root).expect("root listed");
    assert!(!UserTable::can_delete(account));

    let before = backend.request_count();
    let outcome = users.delete(&api, root, &|_: &str| true).await;
    assert!(matches!(outcome, Outcome::Rejected));
    assert_eq!(backend.request_count(), before);
    assert_eq!(backend.user_ids(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_delete_user_confirms_with_username() {
    let (backend, _, _, bob) = seeded().await;
    let api = logged_in(&backend, "root", "hunter2").await;

    let mut users = UserTable::new(ViewHandle::new());
    assert!(users.refresh(&api).await.is_completed());

    let outcome = users
        .delete(&api, bob, &|prompt: &str| {
            assert_eq!(prompt, "Are you sure you want to delete user \"bob\"?");
            true
        })
        .await;
    assert!(outcome.is_completed());
    assert!(!users.users().contains(bob));
    assert_eq!(
        users.notice().map(Notice::message),
        Some("User deleted successfully")
    );
    assert_eq!(backend.user_ids(), vec![1, 2]);
    // The backend drops the account's tasks with it
    assert_eq!(backend.task_ids(), vec![1, 2]);
}

#[tokio::test]
async fn test_delete_user_failure_keeps_row() {
    let (backend, _, alice, _) = seeded().await;
    let api = logged_in(&backend, "root", "hunter2").await;

    let mut users = UserTable::new(ViewHandle::new());
    assert!(users.refresh(&api).await.is_completed());
    backend.fail_deletes(true);

    assert!(users.delete(&api, alice, &|_: &str| true).await.is_failed());
    assert!(users.users().contains(alice));
    assert_eq!(
        users.notice().map(Notice::message),
        Some("Failed to delete user")
    );
}

#[tokio::test]
async fn test_promote_user() {
    let (backend, _, alice, _) = seeded().await;
    let api = logged_in(&backend, "root", "hunter2").await;

    let mut users = UserTable::new(ViewHandle::new());
    assert!(users.refresh(&api).await.is_completed());

    let update = UserUpdate {
        role: Some(Role::Admin),
        ..UserUpdate::default()
    };
    let account = users
        .update(&api, alice, &update)
        .await
        .completed()
        .expect("update should succeed");
    assert_eq!(account.role, Role::Admin);
    assert!(!UserTable::can_delete(account_in(&users, alice)));
    assert_eq!(
        users.notice().map(Notice::message),
        Some("User updated successfully")
    );
}

fn account_in(users: &UserTable, id: UserId) -> &taskmanager_core::UserAccount {
    users.users().get(id).expect("account cached")
}

#[tokio::test]
async fn test_user_task_listing() {
    let (backend, _, alice, _) = seeded().await;
    let api = logged_in(&backend, "root", "hunter2").await;

    let listing = api.list_user_tasks(alice).await.expect("listing");
    assert_eq!(listing.user.username, "alice");
    assert_eq!(listing.task_count, 2);
    assert_eq!(listing.tasks.len(), 2);
}

// ============================================================================
// Tasks
// ============================================================================

#[tokio::test]
async fn test_task_table_shows_owners() {
    let (backend, ..) = seeded().await;
    let api = logged_in(&backend, "root", "hunter2").await;

    let mut tasks = AdminTaskTable::new(ViewHandle::new());
    assert!(tasks.refresh(&api).await.is_completed());
    assert_eq!(tasks.total(), 3);
    let printer = tasks.tasks().get(TaskId::new(3)).expect("task 3 listed");
    assert_eq!(printer.owner_name(), "bob");
}

#[tokio::test]
async fn test_admin_completes_any_task() {
    let (backend, ..) = seeded().await;
    let api = logged_in(&backend, "root", "hunter2").await;

    let mut tasks = AdminTaskTable::new(ViewHandle::new());
    assert!(tasks.refresh(&api).await.is_completed());

    let task = tasks
        .update(&api, TaskId::new(2), &TaskUpdate::completed(true))
        .await
        .completed()
        .expect("update should succeed");
    assert!(task.completed);
    assert_eq!(task.owner_name(), "alice");
}

#[tokio::test]
async fn test_admin_deletes_any_task() {
    let (backend, ..) = seeded().await;
    let api = logged_in(&backend, "root", "hunter2").await;

    let mut tasks = AdminTaskTable::new(ViewHandle::new());
    assert!(tasks.refresh(&api).await.is_completed());

    let outcome = tasks
        .delete(&api, TaskId::new(3), &|_: &str| true)
        .await;
    assert!(outcome.is_completed());
    assert_eq!(tasks.total(), 2);
    assert_eq!(backend.task_ids(), vec![1, 2]);
    assert_eq!(
        tasks.notice().map(Notice::message),
        Some("Task deleted successfully")
    );
}
