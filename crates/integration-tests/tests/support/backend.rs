use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use palace_client::BackendGateway;
use palace_client::models::ExternalIdentity;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

const TEST_SIGNING_SECRET: &[u8] = b"integration-test-signing-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Jwt,
    ExpiredJwt,
    WrongSubjectJwt,
    Opaque,
}

#[derive(Debug, Serialize)]
struct TestClaims {
    sub: String,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct ExchangeBody {
    email: String,
    name: String,
    google_id: String,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    query: String,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

struct CannedSearch {
    results: Vec<Value>,
    delay: Duration,
}

struct BackendState {
    user_id: Uuid,
    token_kind: TokenKind,
    valid_tokens: HashSet<String>,
    exchange_failure: Option<StatusCode>,
    exchange_delay: Duration,
    onboarding_completed: bool,
    onboarding_status_failure: Option<StatusCode>,
    submit_failure: Option<StatusCode>,
    submitted_pillars: Option<Value>,
    memories: Vec<Value>,
    recent_failure: Option<StatusCode>,
    recent_delays: Vec<Duration>,
    create_content_types: Vec<String>,
    searches: HashMap<String, CannedSearch>,
    search_failure: Option<StatusCode>,
    hits: HashMap<&'static str, usize>,
}

/// In-process stand-in for the Memory Palace backend.
pub struct MockBackend {
    base_url: String,
    state: Arc<Mutex<BackendState>>,
    _server: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(BackendState {
            user_id: Uuid::new_v4(),
            token_kind: TokenKind::Jwt,
            valid_tokens: HashSet::new(),
            exchange_failure: None,
            exchange_delay: Duration::ZERO,
            onboarding_completed: false,
            onboarding_status_failure: None,
            submit_failure: None,
            submitted_pillars: None,
            memories: Vec::new(),
            recent_failure: None,
            recent_delays: Vec::new(),
            create_content_types: Vec::new(),
            searches: HashMap::new(),
            search_failure: None,
            hits: HashMap::new(),
        }));

        let app = Router::new()
            .route("/auth/nextauth", post(exchange))
            .route("/auth/me", get(current_user))
            .route("/onboarding/status", get(onboarding_status))
            .route("/onboarding/pillars", post(submit_pillars))
            .route("/memories", post(create_memory))
            .route("/memories/recent", get(recent_memories))
            .route("/memories/search", post(search_memories))
            .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock backend listener should bind");
        let local_addr = listener
            .local_addr()
            .expect("listener should expose local address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock backend should run");
        });

        Self {
            base_url: format!("http://{local_addr}"),
            state,
            _server: server,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn gateway(&self) -> BackendGateway {
        BackendGateway::new(
            self.base_url.clone(),
            reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .expect("test http client should build"),
        )
    }

    pub fn user_id(&self) -> Uuid {
        self.lock().user_id
    }

    pub fn identity(&self) -> ExternalIdentity {
        ExternalIdentity {
            subject: "google-oauth2|1029384756".to_string(),
            email: "ada@example.test".to_string(),
            name: "Ada".to_string(),
            image_url: Some("https://avatars.example.test/ada.png".to_string()),
        }
    }

    pub fn issue_tokens(&self, kind: TokenKind) {
        self.lock().token_kind = kind;
    }

    /// Every token issued so far now answers 401, as after backend expiry.
    pub fn revoke_all_tokens(&self) {
        self.lock().valid_tokens.clear();
    }

    pub fn fail_exchange(&self, status: StatusCode) {
        self.lock().exchange_failure = Some(status);
    }

    /// Holds the next exchanges open before answering.
    pub fn delay_exchange(&self, delay: Duration) {
        self.lock().exchange_delay = delay;
    }

    pub fn set_onboarding_completed(&self, completed: bool) {
        self.lock().onboarding_completed = completed;
    }

    pub fn fail_onboarding_status(&self, status: StatusCode) {
        self.lock().onboarding_status_failure = Some(status);
    }

    pub fn fail_onboarding_submit(&self, status: StatusCode) {
        self.lock().submit_failure = Some(status);
    }

    pub fn submitted_pillars(&self) -> Option<Value> {
        self.lock().submitted_pillars.clone()
    }

    pub fn seed_memories(&self, memories: Vec<Value>) {
        self.lock().memories = memories;
    }

    pub fn fail_recent(&self, status: Option<StatusCode>) {
        self.lock().recent_failure = status;
    }

    /// Queues per-request delays for upcoming recent-memory fetches, in
    /// arrival order. Delays run before the bearer token is checked.
    pub fn delay_recent(&self, delays: Vec<Duration>) {
        self.lock().recent_delays = delays;
    }

    pub fn create_content_types(&self) -> Vec<String> {
        self.lock().create_content_types.clone()
    }

    pub fn set_search_results(&self, query: &str, results: Vec<Value>, delay: Duration) {
        self.lock()
            .searches
            .insert(query.to_string(), CannedSearch { results, delay });
    }

    pub fn fail_search(&self, status: Option<StatusCode>) {
        self.lock().search_failure = status;
    }

    pub fn hits(&self, route: &'static str) -> usize {
        self.lock().hits.get(route).copied().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("mock backend state lock")
    }
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().expect("mock backend state lock")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Could not validate credentials" })),
    )
        .into_response()
}

fn failure(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

/// Records the hit and checks the bearer token against the issued set.
fn authorize(state: &Shared, headers: &HeaderMap, route: &'static str) -> Result<(), Response> {
    let mut backend = lock(state);
    *backend.hits.entry(route).or_default() += 1;

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match token {
        Some(token) if backend.valid_tokens.contains(token) => Ok(()),
        _ => Err(unauthorized()),
    }
}

fn issue_token(kind: TokenKind, user_id: Uuid) -> String {
    let (sub, exp) = match kind {
        TokenKind::Opaque => return format!("opaque-{}", Uuid::new_v4().simple()),
        TokenKind::Jwt => (user_id.to_string(), Utc::now().timestamp() + 3_600),
        TokenKind::ExpiredJwt => (user_id.to_string(), Utc::now().timestamp() - 3_600),
        TokenKind::WrongSubjectJwt => (Uuid::new_v4().to_string(), Utc::now().timestamp() + 3_600),
    };

    encode(
        &Header::default(),
        &TestClaims { sub, exp },
        &EncodingKey::from_secret(TEST_SIGNING_SECRET),
    )
    .expect("test token should encode")
}

async fn exchange(State(state): State<Shared>, Json(body): Json<ExchangeBody>) -> Response {
    let delay = lock(&state).exchange_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let mut backend = lock(&state);
    *backend.hits.entry("/auth/nextauth").or_default() += 1;
    if let Some(status) = backend.exchange_failure {
        return failure(status, "Authentication failed");
    }

    let token = issue_token(backend.token_kind, backend.user_id);
    backend.valid_tokens.insert(token.clone());

    Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "user": {
            "id": backend.user_id,
            "email": body.email,
            "name": body.name,
            "google_id": body.google_id,
            "avatar_url": body.avatar_url,
            "created_at": "2026-01-01T00:00:00"
        }
    }))
    .into_response()
}

async fn current_user(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers, "/auth/me") {
        return rejection;
    }
    let backend = lock(&state);
    Json(json!({
        "id": backend.user_id,
        "email": "ada@example.test",
        "name": "Ada",
        "google_id": "google-oauth2|1029384756",
        "avatar_url": null,
        "created_at": "2026-01-01T00:00:00"
    }))
    .into_response()
}

async fn onboarding_status(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers, "/onboarding/status") {
        return rejection;
    }
    let backend = lock(&state);
    if let Some(status) = backend.onboarding_status_failure {
        return failure(status, "Error checking onboarding status");
    }
    Json(json!({
        "completed": backend.onboarding_completed,
        "pillar_count": if backend.onboarding_completed { 3 } else { 0 }
    }))
    .into_response()
}

async fn submit_pillars(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers, "/onboarding/pillars") {
        return rejection;
    }
    let mut backend = lock(&state);
    if let Some(status) = backend.submit_failure {
        return failure(status, "Error saving pillars");
    }

    let count = ["people", "interests", "life_events"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_array))
        .map(Vec::len)
        .sum::<usize>();
    backend.submitted_pillars = Some(body);
    backend.onboarding_completed = true;

    Json(json!({ "message": "Onboarding completed successfully", "count": count })).into_response()
}

async fn recent_memories(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<RecentQuery>,
) -> Response {
    let delay = {
        let mut backend = lock(&state);
        if backend.recent_delays.is_empty() {
            Duration::ZERO
        } else {
            backend.recent_delays.remove(0)
        }
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if let Err(rejection) = authorize(&state, &headers, "/memories/recent") {
        return rejection;
    }
    let backend = lock(&state);
    if let Some(status) = backend.recent_failure {
        return failure(status, "Error getting recent memories");
    }
    let limit = query.limit.unwrap_or(20);
    Json(backend.memories.iter().take(limit).cloned().collect::<Vec<_>>()).into_response()
}

async fn create_memory(State(state): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(rejection) = authorize(&state, &headers, "/memories") {
        return rejection;
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let content = if content_type.starts_with("application/json") {
        serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|value| value.get("content").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default()
    } else {
        "Memory with photos".to_string()
    };

    let id = Uuid::new_v4();
    let memory = json!({
        "id": id,
        "content": content,
        "entities": [],
        "categories": ["journal"],
        "emotions": { "joy": 0.5, "sadness": 0.0, "neutral": 0.5, "intensity": 0.3, "polarity": 0.4 },
        "importance": 0.5,
        "created_at": Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        "photos": []
    });

    let mut backend = lock(&state);
    backend.create_content_types.push(content_type);
    backend.memories.insert(0, memory);

    Json(json!({ "id": id, "message": "Memory created successfully" })).into_response()
}

async fn search_memories(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<SearchBody>,
) -> Response {
    // The canned delay runs first so a token revoked meanwhile is rejected.
    let delay = lock(&state)
        .searches
        .get(&body.query)
        .map(|canned| canned.delay)
        .unwrap_or_default();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if let Err(rejection) = authorize(&state, &headers, "/memories/search") {
        return rejection;
    }

    let results = {
        let backend = lock(&state);
        if let Some(status) = backend.search_failure {
            return failure(status, "Error searching memories");
        }
        backend
            .searches
            .get(&body.query)
            .map(|canned| canned.results.clone())
            .unwrap_or_default()
    };

    Json(results.into_iter().take(body.limit).collect::<Vec<_>>()).into_response()
}
