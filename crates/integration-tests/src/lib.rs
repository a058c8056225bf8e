//! End-to-end harness for the task manager client.
//!
//! [`StubBackend`] serves the task manager REST API from memory on an
//! ephemeral port, so the client and its view-models can be exercised over
//! real HTTP without a database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p taskmanager-integration-tests
//! ```
//!
//! # Behavior
//!
//! - Tokens are `token-{user id}`; any other bearer value is rejected with 401.
//! - `/admin/*` answers 403 `{"error":"Access denied. Admin role required."}`
//!   to non-admin callers.
//! - Every request's `Authorization` header is recorded before routing.
//! - Deletes can be made to fail with [`StubBackend::fail_deletes`].
//! - [`StubBackend::unmount_on_next_request`] unmounts a view while its request
//!   is in flight.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use taskmanager_client::{
    ApiClient, ClientConfig, MemoryTokenStorage, SessionStore, TokenStorage, ViewHandle,
};
use taskmanager_core::{Role, TaskId, UserId};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const CREATED_AT: &str = "2024-03-01T09:30:00";
const FORBIDDEN_MESSAGE: &str = "Access denied. Admin role required.";

#[derive(Debug, Clone)]
struct StubUser {
    id: i64,
    username: String,
    email: String,
    password: String,
    role: Role,
}

#[derive(Debug, Clone)]
struct StubTask {
    id: i64,
    owner: i64,
    title: String,
    description: Option<String>,
    completed: bool,
}

#[derive(Debug, Default)]
struct BackendState {
    users: Vec<StubUser>,
    tasks: Vec<StubTask>,
    authorization: Vec<Option<String>>,
    fail_deletes: bool,
    unmount_on_request: Option<ViewHandle>,
}

impl BackendState {
    fn insert_user(&mut self, username: &str, email: &str, password: &str, role: Role) -> i64 {
        let id = self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        self.users.push(StubUser {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        });
        id
    }

    fn next_task_id(&self) -> i64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    fn user(&self, id: i64) -> Option<&StubUser> {
        self.users.iter().find(|u| u.id == id)
    }

    fn task_count(&self, owner: i64) -> usize {
        self.tasks.iter().filter(|t| t.owner == owner).count()
    }

    fn task_json(&self, task: &StubTask, with_owner: bool) -> Value {
        let mut body = json!({
            "id": task.id,
            "title": task.title,
            "description": task.description,
            "completed": task.completed,
            "createdAt": CREATED_AT,
            "updatedAt": null,
        });
        if with_owner
            && let (Some(owner), Value::Object(fields)) = (self.user(task.owner), &mut body)
        {
            fields.insert(
                "user".to_string(),
                json!({ "id": owner.id, "username": owner.username, "email": owner.email }),
            );
        }
        body
    }

    fn user_json(&self, user: &StubUser) -> Value {
        json!({
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "role": user.role.as_str(),
            "createdAt": CREATED_AT,
            "taskCount": self.task_count(user.id),
        })
    }
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory task manager backend bound to `127.0.0.1` on a free port.
///
/// The server task is aborted on drop.
pub struct StubBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Bind and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Shared::default();
        let app = router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let addr = listener
            .local_addr()
            .expect("Stub backend has no local address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL the client should be configured with.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// A client with an empty in-memory session.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        self.client_with(MemoryTokenStorage::new())
    }

    /// A client whose session is restored from `storage`.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client_with(&self, storage: impl TokenStorage + 'static) -> ApiClient {
        let config = ClientConfig::new(&self.api_url(), "stub-session.json")
            .expect("Stub backend URL is valid");
        let session = Arc::new(SessionStore::init(storage));
        ApiClient::new(&config, session).expect("Failed to build API client")
    }

    /// Add an account with email `{username}@example.com`.
    pub fn add_user(&self, username: &str, password: &str, role: Role) -> UserId {
        let email = format!("{username}@example.com");
        UserId::new(lock(&self.state).insert_user(username, &email, password, role))
    }

    /// Add a task for `owner` with a chosen id.
    pub fn insert_task(&self, owner: UserId, id: i64, title: &str) -> TaskId {
        lock(&self.state).tasks.push(StubTask {
            id,
            owner: owner.as_i64(),
            title: title.to_string(),
            description: None,
            completed: false,
        });
        TaskId::new(id)
    }

    /// The bearer token the backend issues to `user`.
    #[must_use]
    pub fn token_for(user: UserId) -> String {
        format!("token-{user}")
    }

    /// Make every delete answer 500 until reset.
    pub fn fail_deletes(&self, fail: bool) {
        lock(&self.state).fail_deletes = fail;
    }

    /// Unmount `handle` when the next request arrives, before it is answered.
    pub fn unmount_on_next_request(&self, handle: ViewHandle) {
        lock(&self.state).unmount_on_request = Some(handle);
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        lock(&self.state).authorization.len()
    }

    /// `Authorization` header of every request received, in order.
    #[must_use]
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        lock(&self.state).authorization.clone()
    }

    /// Ids of the tasks the backend holds, ascending.
    #[must_use]
    pub fn task_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = lock(&self.state).tasks.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of the accounts the backend holds, ascending.
    #[must_use]
    pub fn user_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = lock(&self.state).users.iter().map(|u| u.id).collect();
        ids.sort_unstable();
        ids
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
        .route("/admin/users", get(admin_list_users))
        .route(
            "/admin/users/{id}",
            get(admin_get_user)
                .put(admin_update_user)
                .delete(admin_delete_user),
        )
        .route("/admin/users/{id}/tasks", get(admin_user_tasks))
        .route("/admin/tasks", get(admin_list_tasks))
        .route(
            "/admin/tasks/{id}",
            get(admin_get_task)
                .put(admin_update_task)
                .delete(admin_delete_task),
        )
        .route("/admin/stats", get(admin_stats));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    {
        let mut state = lock(&state);
        let authorization = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        state.authorization.push(authorization);
        if let Some(handle) = state.unmount_on_request.take() {
            handle.unmount();
        }
    }
    next.run(request).await
}

// ============================================================================
// Responses
// ============================================================================

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn not_found(what: &str) -> Response {
    message(StatusCode::NOT_FOUND, &format!("{what} not found"))
}

fn delete_failed() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

/// Resolve the bearer token to an account, requiring admin when asked.
fn authorize(state: &BackendState, headers: &HeaderMap, admin: bool) -> Result<StubUser, Response> {
    let user = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer token-"))
        .and_then(|id| id.parse::<i64>().ok())
        .and_then(|id| state.user(id))
        .cloned()
        .ok_or_else(|| message(StatusCode::UNAUTHORIZED, "Full authentication is required"))?;

    if admin && !user.role.is_admin() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": FORBIDDEN_MESSAGE })),
        )
            .into_response());
    }
    Ok(user)
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Deserialize)]
struct RegisterBody {
    username: String,
    email: String,
    password: String,
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut state = lock(&state);
    if state.users.iter().any(|u| u.username == body.username) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Error: Username is already taken!" })),
        )
            .into_response();
    }
    state.insert_user(&body.username, &body.email, &body.password, Role::User);
    Json(json!({ "success": true, "message": "User registered successfully!" })).into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let state = lock(&state);
    let Some(user) = state
        .users
        .iter()
        .find(|u| u.username == body.username && u.password == body.password)
    else {
        return message(StatusCode::UNAUTHORIZED, "Invalid username or password");
    };

    Json(json!({
        "token": format!("token-{}", user.id),
        "type": "Bearer",
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "role": user.role.as_str(),
    }))
    .into_response()
}

// ============================================================================
// Own tasks
// ============================================================================

#[derive(Deserialize)]
struct TaskBody {
    title: Option<String>,
    description: Option<String>,
    completed: Option<bool>,
}

impl TaskBody {
    fn apply(self, task: &mut StubTask) -> Result<(), Response> {
        if let Some(title) = self.title {
            if title.trim().is_empty() {
                return Err(message(StatusCode::BAD_REQUEST, "Title is required"));
            }
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = (!description.is_empty()).then_some(description);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        Ok(())
    }
}

async fn list_tasks(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let user = match authorize(&state, &headers, false) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let tasks: Vec<Value> = state
        .tasks
        .iter()
        .filter(|t| t.owner == user.id)
        .map(|t| state.task_json(t, false))
        .collect();
    Json(tasks).into_response()
}

async fn create_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<TaskBody>,
) -> Response {
    let mut state = lock(&state);
    let user = match authorize(&state, &headers, false) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if body.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        return message(StatusCode::BAD_REQUEST, "Title is required");
    }

    let mut task = StubTask {
        id: state.next_task_id(),
        owner: user.id,
        title: String::new(),
        description: None,
        completed: false,
    };
    if let Err(response) = body.apply(&mut task) {
        return response;
    }
    let body = state.task_json(&task, false);
    state.tasks.push(task);
    Json(body).into_response()
}

async fn update_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<TaskBody>,
) -> Response {
    let mut state = lock(&state);
    let user = match authorize(&state, &headers, false) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Some(task) = state
        .tasks
        .iter_mut()
        .find(|t| t.id == id && t.owner == user.id)
    else {
        return not_found("Task");
    };
    if let Err(response) = body.apply(task) {
        return response;
    }
    let task = task.clone();
    Json(state.task_json(&task, false)).into_response()
}

async fn delete_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    let user = match authorize(&state, &headers, false) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if state.fail_deletes {
        return delete_failed();
    }
    let before = state.tasks.len();
    state.tasks.retain(|t| !(t.id == id && t.owner == user.id));
    if state.tasks.len() == before {
        return not_found("Task");
    }
    message(StatusCode::OK, "Task deleted successfully")
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Deserialize)]
struct UserBody {
    username: Option<String>,
    email: Option<String>,
    role: Option<Role>,
}

async fn admin_list_users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(response) = authorize(&state, &headers, true) {
        return response;
    }
    let users: Vec<Value> = state.users.iter().map(|u| state.user_json(u)).collect();
    Json(users).into_response()
}

async fn admin_get_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = lock(&state);
    if let Err(response) = authorize(&state, &headers, true) {
        return response;
    }
    state.user(id).map_or_else(
        || not_found("User"),
        |user| Json(state.user_json(user)).into_response(),
    )
}

async fn admin_update_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<UserBody>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&state, &headers, true) {
        return response;
    }
    let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
        return not_found("User");
    };
    if let Some(username) = body.username {
        user.username = username;
    }
    if let Some(email) = body.email {
        user.email = email;
    }
    if let Some(role) = body.role {
        user.role = role;
    }
    let user = user.clone();
    Json(state.user_json(&user)).into_response()
}

async fn admin_delete_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&state, &headers, true) {
        return response;
    }
    if state.fail_deletes {
        return delete_failed();
    }
    if state.user(id).is_none() {
        return not_found("User");
    }
    state.users.retain(|u| u.id != id);
    state.tasks.retain(|t| t.owner != id);
    message(StatusCode::OK, "User deleted successfully")
}

async fn admin_user_tasks(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = lock(&state);
    if let Err(response) = authorize(&state, &headers, true) {
        return response;
    }
    let Some(user) = state.user(id) else {
        return not_found("User");
    };
    let tasks: Vec<Value> = state
        .tasks
        .iter()
        .filter(|t| t.owner == id)
        .map(|t| state.task_json(t, false))
        .collect();
    Json(json!({
        "user": {
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "role": user.role.as_str(),
        },
        "taskCount": tasks.len(),
        "tasks": tasks,
    }))
    .into_response()
}

async fn admin_list_tasks(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(response) = authorize(&state, &headers, true) {
        return response;
    }
    let tasks: Vec<Value> = state
        .tasks
        .iter()
        .map(|t| state.task_json(t, true))
        .collect();
    Json(tasks).into_response()
}

async fn admin_get_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = lock(&state);
    if let Err(response) = authorize(&state, &headers, true) {
        return response;
    }
    state.tasks.iter().find(|t| t.id == id).map_or_else(
        || not_found("Task"),
        |task| Json(state.task_json(task, true)).into_response(),
    )
}

async fn admin_update_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<TaskBody>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&state, &headers, true) {
        return response;
    }
    let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) else {
        return not_found("Task");
    };
    if let Err(response) = body.apply(task) {
        return response;
    }
    let task = task.clone();
    Json(state.task_json(&task, true)).into_response()
}

async fn admin_delete_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&state, &headers, true) {
        return response;
    }
    if state.fail_deletes {
        return delete_failed();
    }
    let before = state.tasks.len();
    state.tasks.retain(|t| t.id != id);
    if state.tasks.len() == before {
        return not_found("Task");
    }
    message(StatusCode::OK, "Task deleted successfully")
}

async fn admin_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(response) = authorize(&state, &headers, true) {
        return response;
    }
    Json(json!({
        "totalUsers": state.users.len(),
        "totalTasks": state.tasks.len(),
    }))
    .into_response()
}
