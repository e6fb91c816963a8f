use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::models::candidate::{ApplicationStatus, Candidate, Department};
use crate::models::upload::UploadFile;

/// Open filter/pagination mapping forwarded as query parameters.
pub type QueryParams = Map<String, JsonValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// `GET /candidates/` answers with a page, but older deployments return the
/// bare list or even a single object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CandidateListResponse {
    Paginated(Page<Candidate>),
    List(Vec<Candidate>),
    Single(Candidate),
}

/// Registration payload. Sent as multipart because it carries the resume.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidate {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub years_of_experience: u32,
    pub department: Department,
    pub resume: Option<UploadFile>,
}

impl NewCandidate {
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("full_name", self.full_name.clone()),
            ("email", self.email.clone()),
            ("phone", self.phone.clone()),
            ("date_of_birth", self.date_of_birth.format("%Y-%m-%d").to_string()),
            ("years_of_experience", self.years_of_experience.to_string()),
            ("department", self.department.as_str().to_string()),
        ]
    }
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub years_of_experience: Option<u32>,
    pub department: Option<Department>,
    pub resume: Option<UploadFile>,
}

impl CandidateUpdate {
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(v) = &self.full_name {
            fields.push(("full_name", v.clone()));
        }
        if let Some(v) = &self.email {
            fields.push(("email", v.clone()));
        }
        if let Some(v) = &self.phone {
            fields.push(("phone", v.clone()));
        }
        if let Some(v) = self.date_of_birth {
            fields.push(("date_of_birth", v.format("%Y-%m-%d").to_string()));
        }
        if let Some(v) = self.years_of_experience {
            fields.push(("years_of_experience", v.to_string()));
        }
        if let Some(v) = self.department {
            fields.push(("department", v.as_str().to_string()));
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub new_status: ApplicationStatus,
    pub feedback: String,
    pub admin_name: String,
    pub admin_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdateByEmail {
    pub email: String,
    #[serde(flatten)]
    pub status: StatusUpdate,
}
