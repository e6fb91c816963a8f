//! In-process stand-in for the HR backend, served on an ephemeral port.

#![allow(dead_code)]

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use hr_candidate_client::{config::Config, AppState};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const RESUME_BYTES: &[u8] = b"%PDF-1.4 fake resume";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub request_id: Option<String>,
    pub admin: bool,
}

#[derive(Default)]
pub struct Backend {
    pub candidates: Mutex<Vec<JsonValue>>,
    pub history: Mutex<Vec<JsonValue>>,
    pub requests: AtomicUsize,
    pub recorded: Mutex<Vec<Recorded>>,
    /// Answer `GET /candidates/` with a bare list instead of a page.
    pub bare_list: AtomicBool,
}

impl Backend {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Recorded> {
        self.recorded.lock().unwrap().last().cloned()
    }

    pub fn seed(&self, full_name: &str, status: &str, resume: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        let email = format!("{}@example.com", full_name.to_lowercase().replace(' ', "."));
        self.candidates.lock().unwrap().push(json!({
            "id": id,
            "full_name": full_name,
            "email": email,
            "phone": "+15551234567",
            "date_of_birth": "1990-04-12",
            "years_of_experience": 5,
            "department": "Information Technology",
            "current_status": status,
            "resume": resume,
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z"
        }));
        id
    }
}

pub struct FakeBackend {
    pub base_url: String,
    pub backend: Arc<Backend>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let backend = Arc::new(Backend::default());
        let app = Router::new()
            .route("/api/v1/candidates/", get(list_candidates).post(create_candidate))
            .route("/api/v1/candidates/status/", get(candidate_status))
            .route(
                "/api/v1/candidates/:id/",
                get(get_candidate).patch(patch_candidate).delete(delete_candidate),
            )
            .route("/api/v1/candidates/:id/resume/", get(resume_link))
            .route("/api/v1/candidates/:id/status-history/", get(candidate_history))
            .route("/api/v1/status-history/", get(list_history).patch(update_by_email))
            .route("/media/resumes/:file", get(resume_file))
            .layer(middleware::from_fn_with_state(backend.clone(), record))
            .with_state(backend.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api/v1", addr),
            backend,
        }
    }

    pub fn app_state(&self) -> AppState {
        let mut config = Config::default();
        config.api.base_url = self.base_url.clone();
        config.api.timeout_ms = 5_000;
        AppState::new(config).unwrap()
    }
}

type Shared = State<Arc<Backend>>;

async fn record(State(backend): Shared, req: Request, next: Next) -> Response {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    backend.recorded.lock().unwrap().push(Recorded {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        content_type: req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        request_id: req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        admin: req.headers().get("x-admin").is_some(),
    });
    next.run(req).await
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
}

async fn list_candidates(
    State(backend): Shared,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let all = backend.candidates.lock().unwrap().clone();
    if backend.bare_list.load(Ordering::SeqCst) {
        return Json(JsonValue::Array(all)).into_response();
    }

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let size: usize = params
        .get("page_size")
        .and_then(|p| p.parse().ok())
        .unwrap_or(10);
    let start = (page - 1) * size;
    let results: Vec<JsonValue> = all.iter().skip(start).take(size).cloned().collect();
    let next = (start + size < all.len())
        .then(|| format!("http://backend/api/v1/candidates/?page={}", page + 1));
    let previous =
        (page > 1).then(|| format!("http://backend/api/v1/candidates/?page={}", page - 1));

    Json(json!({
        "count": all.len(),
        "next": next,
        "previous": previous,
        "results": results
    }))
    .into_response()
}

/// Text fields plus the uploaded resume's file name, if any.
async fn read_form(mut multipart: Multipart) -> (HashMap<String, String>, Option<String>) {
    let mut fields = HashMap::new();
    let mut resume_name = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "resume" {
            resume_name = field.file_name().map(str::to_string);
            let _ = field.bytes().await.unwrap();
        } else {
            fields.insert(name, field.text().await.unwrap());
        }
    }
    (fields, resume_name)
}

fn duplicate_email() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"email": ["candidate with this email already exists."]})),
    )
        .into_response()
}

async fn create_candidate(State(backend): Shared, multipart: Multipart) -> Response {
    let (fields, resume_name) = read_form(multipart).await;

    let email = fields.get("email").cloned().unwrap_or_default();
    let duplicate = backend
        .candidates
        .lock()
        .unwrap()
        .iter()
        .any(|c| c["email"] == json!(email));
    if duplicate {
        return duplicate_email();
    }

    let candidate = json!({
        "id": Uuid::new_v4(),
        "full_name": fields.get("full_name"),
        "email": email,
        "phone": fields.get("phone"),
        "date_of_birth": fields.get("date_of_birth"),
        "years_of_experience": fields
            .get("years_of_experience")
            .and_then(|y| y.parse::<u32>().ok()),
        "department": fields.get("department"),
        "current_status": "submitted",
        "resume": resume_name.map(|n| format!("/media/resumes/{}", n)),
        "created_at": "2024-03-02T09:30:00Z",
        "updated_at": "2024-03-02T09:30:00Z"
    });
    backend.candidates.lock().unwrap().push(candidate.clone());
    (StatusCode::CREATED, Json(candidate)).into_response()
}

async fn candidate_status(
    State(backend): Shared,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let email = params.get("email").cloned().unwrap_or_default();
    let found = backend
        .candidates
        .lock()
        .unwrap()
        .iter()
        .find(|c| c["email"] == json!(email))
        .cloned();
    match found {
        Some(candidate) => Json(json!({
            "id": candidate["id"],
            "email": candidate["email"],
            "full_name": candidate["full_name"],
            "department": candidate["department"],
            "current_status": candidate["current_status"],
            "current_status_display": "Submitted",
            "status_history": []
        }))
        .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["No candidate found"]})),
        )
            .into_response(),
    }
}

fn find(backend: &Backend, id: Uuid) -> Option<JsonValue> {
    backend
        .candidates
        .lock()
        .unwrap()
        .iter()
        .find(|c| c["id"] == json!(id))
        .cloned()
}

async fn get_candidate(State(backend): Shared, Path(id): Path<Uuid>) -> Response {
    match find(&backend, id) {
        Some(candidate) => Json(candidate).into_response(),
        None => not_found(),
    }
}

/// Multipart bodies edit fields; JSON bodies change the status.
async fn patch_candidate(State(backend): Shared, Path(id): Path<Uuid>, req: Request) -> Response {
    if req.headers().get("x-admin").is_none() {
        return (StatusCode::FORBIDDEN, Json(json!({"detail": "Admin only"}))).into_response();
    }
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(req, &()).await.unwrap();
        let (fields, resume_name) = read_form(multipart).await;
        edit_candidate(&backend, id, fields, resume_name)
    } else {
        let Json(body) = Json::<JsonValue>::from_request(req, &()).await.unwrap();
        change_status(&backend, id, body)
    }
}

fn edit_candidate(
    backend: &Backend,
    id: Uuid,
    fields: HashMap<String, String>,
    resume_name: Option<String>,
) -> Response {
    let mut candidates = backend.candidates.lock().unwrap();
    if let Some(email) = fields.get("email") {
        let taken = candidates
            .iter()
            .any(|c| c["email"] == json!(email) && c["id"] != json!(id));
        if taken {
            return duplicate_email();
        }
    }
    let Some(candidate) = candidates.iter_mut().find(|c| c["id"] == json!(id)) else {
        return not_found();
    };
    for (name, value) in fields {
        let value = if name == "years_of_experience" {
            value.parse::<u32>().map(|y| json!(y)).unwrap_or(JsonValue::Null)
        } else {
            JsonValue::String(value)
        };
        candidate[name.as_str()] = value;
    }
    if let Some(file) = resume_name {
        candidate["resume"] = json!(format!("/media/resumes/{}", file));
    }
    candidate["updated_at"] = json!("2024-03-04T08:00:00Z");
    Json(candidate.clone()).into_response()
}

fn change_status(backend: &Backend, id: Uuid, body: JsonValue) -> Response {
    let mut candidates = backend.candidates.lock().unwrap();
    let Some(candidate) = candidates.iter_mut().find(|c| c["id"] == json!(id)) else {
        return not_found();
    };
    if candidate["current_status"] == json!("accepted") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"new_status": ["Accepted candidates cannot change status"]})),
        )
            .into_response();
    }
    if let Some(status) = body.get("new_status") {
        candidate["current_status"] = status.clone();
        backend.history.lock().unwrap().push(json!({
            "id": Uuid::new_v4(),
            "candidate": id,
            "previous_status": "submitted",
            "new_status": status,
            "feedback": body["feedback"],
            "admin_name": body["admin_name"],
            "admin_email": body["admin_email"],
            "created_at": "2024-03-03T12:00:00Z"
        }));
    }
    Json(candidate.clone()).into_response()
}

async fn delete_candidate(State(backend): Shared, Path(id): Path<Uuid>) -> Response {
    let mut candidates = backend.candidates.lock().unwrap();
    let before = candidates.len();
    candidates.retain(|c| c["id"] != json!(id));
    if candidates.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn resume_link(State(backend): Shared, Path(id): Path<Uuid>) -> Response {
    match find(&backend, id) {
        Some(candidate) => Json(json!({
            "id": id,
            "download_url": candidate["resume"]
        }))
        .into_response(),
        None => not_found(),
    }
}

async fn resume_file(Path(_file): Path<String>) -> Response {
    RESUME_BYTES.into_response()
}

async fn candidate_history(State(backend): Shared, Path(id): Path<Uuid>) -> Response {
    let entries: Vec<JsonValue> = backend
        .history
        .lock()
        .unwrap()
        .iter()
        .filter(|h| h["candidate"] == json!(id))
        .cloned()
        .collect();
    Json(JsonValue::Array(entries)).into_response()
}

async fn list_history(State(backend): Shared) -> Response {
    let entries = backend.history.lock().unwrap().clone();
    Json(json!({
        "count": entries.len(),
        "next": null,
        "previous": null,
        "results": entries
    }))
    .into_response()
}

async fn update_by_email(State(backend): Shared, Json(body): Json<JsonValue>) -> Response {
    let email = body["email"].clone();
    let mut candidates = backend.candidates.lock().unwrap();
    let Some(candidate) = candidates.iter_mut().find(|c| c["email"] == email) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["No candidate found"]})),
        )
            .into_response();
    };
    candidate["current_status"] = body["new_status"].clone();
    Json(json!({"message": "Status updated", "email": email})).into_response()
}
