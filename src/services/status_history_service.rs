use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::instrument;
use uuid::Uuid;

use crate::dto::candidate_dto::{Page, QueryParams, StatusUpdate, StatusUpdateByEmail};
use crate::error::Result;
use crate::models::status_history::StatusHistoryEntry;
use crate::services::api_client::{ApiClient, RequestOptions};

/// `/status-history/` answers with a page; per-candidate history is a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StatusHistoryResponse {
    Paginated(Page<StatusHistoryEntry>),
    List(Vec<StatusHistoryEntry>),
}

impl StatusHistoryResponse {
    pub fn entries(&self) -> &[StatusHistoryEntry] {
        match self {
            StatusHistoryResponse::Paginated(page) => &page.results,
            StatusHistoryResponse::List(entries) => entries,
        }
    }

    pub fn into_entries(self) -> Vec<StatusHistoryEntry> {
        match self {
            StatusHistoryResponse::Paginated(page) => page.results,
            StatusHistoryResponse::List(entries) => entries,
        }
    }
}

/// Status-history endpoints. All of them are admin-only on the backend.
#[derive(Clone)]
pub struct StatusHistoryService {
    api: ApiClient,
}

impl StatusHistoryService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn get_status_history(&self, params: QueryParams) -> Result<StatusHistoryResponse> {
        self.api
            .get("/status-history/", RequestOptions::new().admin().params(params))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_candidate_status_history(&self, candidate_id: Uuid) -> Result<StatusHistoryResponse> {
        self.api
            .get(
                &format!("/candidates/{}/status-history/", candidate_id),
                RequestOptions::new().admin(),
            )
            .await
    }

    #[instrument(skip(self, status))]
    pub async fn update_status_by_email(&self, email: &str, status: StatusUpdate) -> Result<JsonValue> {
        let body = StatusUpdateByEmail {
            email: email.to_string(),
            status,
        };
        self.api
            .patch("/status-history/", RequestOptions::new().admin().json(&body)?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_status_by_email(&self, email: &str) -> Result<StatusHistoryResponse> {
        let mut params = QueryParams::new();
        params.insert("email".into(), JsonValue::String(email.to_string()));
        self.get_status_history(params).await
    }
}
