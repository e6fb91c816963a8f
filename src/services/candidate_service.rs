use reqwest::multipart::{Form, Part};
use serde_json::Value as JsonValue;
use tracing::instrument;
use uuid::Uuid;

use crate::dto::candidate_dto::{
    CandidateListResponse, CandidateUpdate, NewCandidate, QueryParams, StatusUpdate,
};
use crate::error::Result;
use crate::models::candidate::{Candidate, CandidateStatus, ResumeDownload};
use crate::models::upload::UploadFile;
use crate::services::api_client::{ApiClient, RequestOptions};

/// One function per `/candidates/` operation. No retries, no caching.
#[derive(Clone)]
pub struct CandidateService {
    api: ApiClient,
}

impl CandidateService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn get_candidates(&self, params: QueryParams) -> Result<CandidateListResponse> {
        self.api
            .get("/candidates/", RequestOptions::new().admin().params(params))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_candidate(&self, id: Uuid) -> Result<Candidate> {
        self.api
            .get(&format!("/candidates/{}/", id), RequestOptions::new().admin())
            .await
    }

    #[instrument(skip(self, candidate), fields(email = %candidate.email))]
    pub async fn create_candidate(&self, candidate: &NewCandidate) -> Result<Candidate> {
        let form = build_form(candidate.text_fields(), candidate.resume.as_ref())?;
        self.api
            .post("/candidates/", RequestOptions::new().multipart(form))
            .await
    }

    #[instrument(skip(self, update))]
    pub async fn update_candidate(&self, id: Uuid, update: &CandidateUpdate) -> Result<Candidate> {
        let form = build_form(update.text_fields(), update.resume.as_ref())?;
        self.api
            .patch(
                &format!("/candidates/{}/", id),
                RequestOptions::new().admin().multipart(form),
            )
            .await
    }

    /// The backend usually answers `204 No Content`; any body is returned as is.
    #[instrument(skip(self))]
    pub async fn delete_candidate(&self, id: Uuid) -> Result<Option<JsonValue>> {
        self.api
            .delete(&format!("/candidates/{}/", id), RequestOptions::new().admin())
            .await
    }

    /// Public lookup; deliberately sent without the admin marker.
    #[instrument(skip(self))]
    pub async fn get_candidate_status(&self, email: &str) -> Result<CandidateStatus> {
        let mut params = QueryParams::new();
        params.insert("email".into(), JsonValue::String(email.to_string()));
        self.api
            .get("/candidates/status/", RequestOptions::new().params(params))
            .await
    }

    #[instrument(skip(self))]
    pub async fn download_resume(&self, id: Uuid) -> Result<ResumeDownload> {
        self.api
            .get(&format!("/candidates/{}/resume/", id), RequestOptions::new().admin())
            .await
    }

    #[instrument(skip(self, status), fields(new_status = %status.new_status))]
    pub async fn update_candidate_status(&self, id: Uuid, status: &StatusUpdate) -> Result<Candidate> {
        self.api
            .patch(
                &format!("/candidates/{}/", id),
                RequestOptions::new().admin().json(status)?,
            )
            .await
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

fn build_form(fields: Vec<(&'static str, String)>, resume: Option<&UploadFile>) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    if let Some(file) = resume {
        let mut part = Part::bytes(file.data.to_vec()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        form = form.part("resume", part);
    }
    Ok(form)
}
