use chrono::NaiveDate;
use serde_json::{json, Value as JsonValue};
use std::borrow::Cow;
use validator::{Validate, ValidateArgs, ValidationError, ValidationErrors};

use super::rules;
use crate::config::UploadOptions;
use crate::dto::candidate_dto::{CandidateUpdate, NewCandidate, QueryParams, StatusUpdate};
use crate::error::{Error, Result};
use crate::models::upload::UploadFile;

/// Registration form. Every field is required.
///
/// `upload` carries the configured resume limits; build it from
/// `Config::upload` so the schema and the file picker agree.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
#[validate(context = UploadOptions)]
pub struct CandidateRegistration {
    #[validate(custom(function = "rules::full_name"))]
    pub full_name: String,
    #[validate(custom(function = "rules::email"))]
    pub email: String,
    #[validate(custom(function = "rules::phone"))]
    pub phone: String,
    #[validate(
        required(message = "Date of birth is required"),
        custom(function = "rules::date_of_birth")
    )]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(
        required(message = "Years of experience is required"),
        custom(function = "rules::years_of_experience")
    )]
    pub years_of_experience: Option<f64>,
    #[validate(custom(function = "rules::department"))]
    pub department: String,
    #[validate(
        required(message = "Resume file is required"),
        custom(function = "rules::resume", use_context)
    )]
    pub resume: Option<UploadFile>,
    pub upload: UploadOptions,
}

impl Validate for CandidateRegistration {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        self.validate_with_args(&self.upload)
    }
}

impl CandidateRegistration {
    /// Validates and converts into the registration payload.
    pub fn to_new_candidate(&self) -> Result<NewCandidate> {
        self.validate()?;
        let date_of_birth = self.date_of_birth.ok_or_else(|| {
            field_error("date_of_birth", "required", "Date of birth is required")
        })?;
        let years = self.years_of_experience.ok_or_else(|| {
            field_error("years_of_experience", "required", "Years of experience is required")
        })?;
        Ok(NewCandidate {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            date_of_birth,
            years_of_experience: years as u32,
            department: parse_choice("department", &self.department)?,
            resume: self.resume.clone(),
        })
    }
}

/// Partial update form. Unset fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
#[validate(context = UploadOptions)]
pub struct CandidateUpdateForm {
    #[validate(custom(function = "rules::full_name_shape"))]
    pub full_name: Option<String>,
    #[validate(custom(function = "rules::email_shape"))]
    pub email: Option<String>,
    #[validate(custom(function = "rules::phone_shape"))]
    pub phone: Option<String>,
    #[validate(custom(function = "rules::date_of_birth"))]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(custom(function = "rules::years_of_experience"))]
    pub years_of_experience: Option<f64>,
    #[validate(custom(function = "rules::department_shape"))]
    pub department: Option<String>,
    #[validate(custom(function = "rules::resume", use_context))]
    pub resume: Option<UploadFile>,
    pub upload: UploadOptions,
}

impl Validate for CandidateUpdateForm {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        self.validate_with_args(&self.upload)
    }
}

impl CandidateUpdateForm {
    pub fn to_update(&self) -> Result<CandidateUpdate> {
        self.validate()?;
        Ok(CandidateUpdate {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            date_of_birth: self.date_of_birth,
            years_of_experience: self.years_of_experience.map(|y| y as u32),
            department: self
                .department
                .as_deref()
                .map(|raw| parse_choice("department", raw))
                .transpose()?,
            resume: self.resume.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct StatusUpdateForm {
    #[validate(custom(function = "rules::new_status"))]
    pub new_status: String,
    #[validate(custom(function = "rules::admin_name"))]
    pub admin_name: String,
    #[validate(custom(function = "rules::admin_email"))]
    pub admin_email: String,
    #[validate(custom(function = "rules::feedback"))]
    pub feedback: String,
}

impl StatusUpdateForm {
    pub fn to_status_update(&self) -> Result<StatusUpdate> {
        self.validate()?;
        Ok(StatusUpdate {
            new_status: parse_choice("new_status", &self.new_status)?,
            feedback: self.feedback.clone(),
            admin_name: self.admin_name.trim().to_string(),
            admin_email: self.admin_email.trim().to_string(),
        })
    }
}

/// Public "check my application" lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct StatusCheck {
    #[validate(custom(function = "rules::email"))]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct StatusHistoryFilter {
    #[validate(custom(function = "rules::email_shape"))]
    pub candidate_email: Option<String>,
    #[validate(custom(function = "rules::status_shape"))]
    pub new_status: Option<String>,
    #[validate(custom(function = "rules::admin_name_filter"))]
    pub admin_name: Option<String>,
    #[validate(custom(function = "rules::not_in_future"))]
    pub date_from: Option<NaiveDate>,
    #[validate(custom(function = "rules::not_in_future"))]
    pub date_to: Option<NaiveDate>,
}

impl StatusHistoryFilter {
    pub fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        insert_text(&mut params, "candidate__email", &self.candidate_email);
        insert_text(&mut params, "new_status", &self.new_status);
        insert_text(&mut params, "admin_name", &self.admin_name);
        insert_date(&mut params, "date_from", self.date_from);
        insert_date(&mut params, "date_to", self.date_to);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct CandidateFilter {
    pub full_name: Option<String>,
    #[validate(custom(function = "rules::email_shape"))]
    pub email: Option<String>,
    #[validate(custom(function = "rules::status_shape"))]
    pub current_status: Option<String>,
    #[validate(range(min = 0.0, message = "Minimum experience must be at least 0"))]
    pub years_of_experience_min: Option<f64>,
    #[validate(range(max = 50.0, message = "Maximum experience must not exceed 50"))]
    pub years_of_experience_max: Option<f64>,
    #[validate(custom(function = "rules::not_in_future"))]
    pub date_from: Option<NaiveDate>,
    #[validate(custom(function = "rules::not_in_future"))]
    pub date_to: Option<NaiveDate>,
}

impl CandidateFilter {
    pub fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        insert_text(&mut params, "full_name", &self.full_name);
        insert_text(&mut params, "email", &self.email);
        insert_text(&mut params, "current_status", &self.current_status);
        if let Some(min) = self.years_of_experience_min {
            params.insert("years_of_experience_min".into(), number(min));
        }
        if let Some(max) = self.years_of_experience_max {
            params.insert("years_of_experience_max".into(), number(max));
        }
        insert_date(&mut params, "date_from", self.date_from);
        insert_date(&mut params, "date_to", self.date_to);
        params
    }
}

/// A single-field `Error::Validation`, shaped like the derive's output.
fn field_error(
    field: &'static str,
    code: &'static str,
    message: impl Into<Cow<'static, str>>,
) -> Error {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    Error::Validation(errors)
}

fn parse_choice<T>(field: &'static str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| field_error(field, "one_of", e.to_string()))
}

fn insert_text(params: &mut QueryParams, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        params.insert(key.to_string(), JsonValue::String(value.clone()));
    }
}

fn insert_date(params: &mut QueryParams, key: &str, value: Option<NaiveDate>) {
    if let Some(value) = value {
        params.insert(key.to_string(), json!(value.format("%Y-%m-%d").to_string()));
    }
}

fn number(value: f64) -> JsonValue {
    if value.fract() == 0.0 {
        json!(value as i64)
    } else {
        json!(value)
    }
}
