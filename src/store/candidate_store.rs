use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::dto::candidate_dto::{
    CandidateListResponse, CandidateUpdate, NewCandidate, Page, QueryParams, StatusUpdate,
};
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::services::candidate_service::CandidateService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl PaginationState {
    fn first(page_size: u32) -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            page: 1,
            page_size,
        }
    }
}

/// Everything the admin views render. Snapshots are plain clones; mutation
/// only happens through [`CandidateStore`] actions.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    pub candidates: Vec<Candidate>,
    pub current_candidate: Option<Candidate>,
    pub loading: bool,
    pub error: Option<String>,
    pub error_messages: Vec<String>,
    pub pagination: PaginationState,
    pub active_filters: QueryParams,
}

impl StoreState {
    pub fn new(page_size: u32) -> Self {
        Self {
            candidates: Vec::new(),
            current_candidate: None,
            loading: false,
            error: None,
            error_messages: Vec::new(),
            pagination: PaginationState::first(page_size),
            active_filters: QueryParams::new(),
        }
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn total_candidates(&self) -> u64 {
        self.pagination.count
    }

    pub fn has_next_page(&self) -> bool {
        self.pagination.next.is_some()
    }

    pub fn has_previous_page(&self) -> bool {
        self.pagination.previous.is_some()
    }

    fn apply_page(&mut self, page: Page<Candidate>, page_no: u32, page_size: u32) {
        self.candidates = page.results;
        self.pagination = PaginationState {
            count: page.count,
            next: page.next,
            previous: page.previous,
            page: page_no,
            page_size,
        };
    }

    /// A bare list is treated as one unpaginated page sized to itself.
    fn apply_unpaginated(&mut self, candidates: Vec<Candidate>) {
        let len = candidates.len();
        self.candidates = candidates;
        self.pagination = PaginationState {
            count: len as u64,
            next: None,
            previous: None,
            page: 1,
            page_size: len as u32,
        };
    }

    fn apply_list_response(&mut self, response: CandidateListResponse, page_no: u32, page_size: u32) {
        match response {
            CandidateListResponse::Paginated(page) => self.apply_page(page, page_no, page_size),
            CandidateListResponse::List(candidates) => self.apply_unpaginated(candidates),
            CandidateListResponse::Single(candidate) => self.apply_unpaginated(vec![candidate]),
        }
    }

    fn apply_created(&mut self, candidate: Candidate) {
        self.candidates.insert(0, candidate);
        self.pagination.count += 1;
    }

    fn apply_updated(&mut self, id: Uuid, candidate: &Candidate) {
        if let Some(entry) = self.candidates.iter_mut().find(|c| c.id == id) {
            *entry = candidate.clone();
        }
        if self.current_candidate.as_ref().is_some_and(|c| c.id == id) {
            self.current_candidate = Some(candidate.clone());
        }
    }

    fn apply_deleted(&mut self, id: Uuid) {
        if let Some(index) = self.candidates.iter().position(|c| c.id == id) {
            self.candidates.remove(index);
            self.pagination.count = self.pagination.count.saturating_sub(1);
        }
        if self.current_candidate.as_ref().is_some_and(|c| c.id == id) {
            self.current_candidate = None;
        }
    }
}

/// Resets `loading` when the action finishes, whichever way it finishes.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<StoreState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}

/// Client-side candidate cache for the admin dashboard.
///
/// Concurrent actions are not serialized: each one runs its own
/// loading/error lifecycle and the last to resolve wins on shared fields.
/// The list is patched locally after mutations and never re-fetched.
#[derive(Clone)]
pub struct CandidateStore {
    service: CandidateService,
    state: Arc<watch::Sender<StoreState>>,
    default_page_size: u32,
}

impl CandidateStore {
    pub fn new(service: CandidateService, default_page_size: u32) -> Self {
        let (state, _) = watch::channel(StoreState::new(default_page_size));
        Self {
            service,
            state: Arc::new(state),
            default_page_size,
        }
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    fn begin(&self) -> LoadingGuard<'_> {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
            s.error_messages.clear();
        });
        LoadingGuard { state: &self.state }
    }

    fn fail(&self, err: Error, fallback: &str) -> Error {
        let message = err.to_string();
        warn!(error = %message, "{}", fallback);
        self.state.send_modify(|s| {
            s.error = Some(if message.is_empty() {
                fallback.to_string()
            } else {
                message
            });
            if !err.field_errors().is_empty() {
                s.error_messages = err.field_errors().to_vec();
            }
        });
        err
    }

    /// Records field errors only; `error` is left as it was.
    fn fail_quietly(&self, err: Error) -> Error {
        warn!(error = %err, "Failed to update candidate status");
        self.state.send_modify(|s| {
            if !err.field_errors().is_empty() {
                s.error_messages = err.field_errors().to_vec();
            }
        });
        err
    }

    #[instrument(skip(self))]
    pub async fn fetch_candidates(&self, params: QueryParams) -> Result<()> {
        let _loading = self.begin();

        let page_no = param_u32(&params, "page").unwrap_or(1);
        let page_size = param_u32(&params, "page_size").unwrap_or(self.default_page_size);
        let query = strip_empty(params);

        match self.service.get_candidates(query).await {
            Ok(response) => {
                self.state
                    .send_modify(|s| s.apply_list_response(response, page_no, page_size));
                let state = self.state.borrow();
                debug!(
                    loaded = state.candidates.len(),
                    count = state.pagination.count,
                    "Candidates updated"
                );
                Ok(())
            }
            Err(err) => Err(self.fail(err, "Failed to fetch candidates")),
        }
    }

    #[instrument(skip(self))]
    pub async fn fetch_candidate(&self, id: Uuid) -> Result<Candidate> {
        let _loading = self.begin();
        match self.service.get_candidate(id).await {
            Ok(candidate) => {
                self.state
                    .send_modify(|s| s.current_candidate = Some(candidate.clone()));
                Ok(candidate)
            }
            Err(err) => Err(self.fail(err, "Failed to fetch candidate")),
        }
    }

    #[instrument(skip(self, data), fields(email = %data.email))]
    pub async fn create_candidate(&self, data: &NewCandidate) -> Result<Candidate> {
        let _loading = self.begin();
        match self.service.create_candidate(data).await {
            Ok(candidate) => {
                self.state.send_modify(|s| s.apply_created(candidate.clone()));
                info!(id = %candidate.id, "Candidate registered");
                Ok(candidate)
            }
            Err(err) => Err(self.fail(err, "Failed to create candidate")),
        }
    }

    #[instrument(skip(self, data))]
    pub async fn update_candidate(&self, id: Uuid, data: &CandidateUpdate) -> Result<Candidate> {
        let _loading = self.begin();
        match self.service.update_candidate(id, data).await {
            Ok(candidate) => {
                self.state.send_modify(|s| s.apply_updated(id, &candidate));
                Ok(candidate)
            }
            Err(err) => Err(self.fail(err, "Failed to update candidate")),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_candidate(&self, id: Uuid) -> Result<()> {
        let _loading = self.begin();
        match self.service.delete_candidate(id).await {
            Ok(_) => {
                self.state.send_modify(|s| s.apply_deleted(id));
                info!(%id, "Candidate deleted");
                Ok(())
            }
            Err(err) => Err(self.fail(err, "Failed to delete candidate")),
        }
    }

    #[instrument(skip(self, status), fields(new_status = %status.new_status))]
    pub async fn update_candidate_status(&self, id: Uuid, status: &StatusUpdate) -> Result<Candidate> {
        let _loading = self.begin();
        match self.service.update_candidate_status(id, status).await {
            Ok(candidate) => {
                self.state.send_modify(|s| s.apply_updated(id, &candidate));
                Ok(candidate)
            }
            Err(err) => Err(self.fail_quietly(err)),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_candidate_status(&self, email: &str) -> Result<CandidateStatus> {
        let _loading = self.begin();
        self.service
            .get_candidate_status(email)
            .await
            .map_err(|err| self.fail(err, "Failed to get candidate status"))
    }

    /// Asks the backend for a short-lived URL, then saves the file into
    /// `dest_dir` as `{name}` (or `resume`) plus the URL's extension.
    #[instrument(skip(self, dest_dir))]
    pub async fn download_resume(
        &self,
        id: Uuid,
        name: Option<&str>,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let _loading = self.begin();
        self.save_resume(id, name, dest_dir)
            .await
            .map_err(|err| self.fail(err, "Failed to download resume"))
    }

    async fn save_resume(&self, id: Uuid, name: Option<&str>, dest_dir: &Path) -> Result<PathBuf> {
        let download = self.service.download_resume(id).await?;
        let url = download
            .download_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::NotFound("Resume download URL not found".to_string()))?;

        let bytes = self.service.api().fetch_bytes(&url).await?;
        let resolved = self.service.api().resolve(&url)?;
        let file_name = format!(
            "{}{}",
            base_name(name),
            url_extension(resolved.path()).unwrap_or_else(|| ".pdf".to_string())
        );
        let path = dest_dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;
        info!(path = %path.display(), size = bytes.len(), "Resume saved");
        Ok(path)
    }

    pub fn set_active_filters(&self, filters: QueryParams) {
        self.state.send_modify(|s| s.active_filters = filters);
    }

    pub fn clear_active_filters(&self) {
        self.state.send_modify(|s| s.active_filters.clear());
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| {
            s.error = None;
            s.error_messages.clear();
        });
    }

    pub fn clear_current_candidate(&self) {
        self.state.send_modify(|s| s.current_candidate = None);
    }
}

/// Drops `null` and empty-string values.
fn strip_empty(params: QueryParams) -> QueryParams {
    params
        .into_iter()
        .filter(|(_, value)| match value {
            JsonValue::Null => false,
            JsonValue::String(s) => !s.is_empty(),
            _ => true,
        })
        .collect()
}

fn param_u32(params: &QueryParams, key: &str) -> Option<u32> {
    let value = match params.get(key)? {
        JsonValue::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    value.filter(|n| *n > 0)
}

/// Last path component of the requested name, so it cannot leave `dest_dir`.
fn base_name(name: Option<&str>) -> &str {
    name.map(str::trim)
        .and_then(|n| Path::new(n).file_name())
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("resume")
}

fn url_extension(path: &str) -> Option<String> {
    let last = path.rsplit('/').next()?;
    let (_, ext) = last.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(format!(".{}", ext.to_lowercase()))
    }
}
