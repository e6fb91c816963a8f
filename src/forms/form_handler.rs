use std::collections::BTreeMap;
use std::future::Future;
use tracing::{debug, warn};
use validator::Validate;

use crate::error::Result;
use crate::utils::validation::field_messages;

const FALLBACK_SUBMIT_ERROR: &str = "An error occurred while submitting the form. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitResult {
    pub success: bool,
    pub error: Option<String>,
}

/// Holds one form's values and drives its submit lifecycle. Failures are
/// turned into a [`SubmitResult`]; nothing is re-raised.
#[derive(Debug, Clone)]
pub struct FormHandler<T> {
    initial: T,
    values: T,
    errors: BTreeMap<String, Vec<String>>,
    is_submitting: bool,
    submit_error: Option<String>,
    submit_success: bool,
}

impl<T> FormHandler<T>
where
    T: Validate + Clone,
{
    pub fn new(initial: T) -> Self {
        Self {
            values: initial.clone(),
            initial,
            errors: BTreeMap::new(),
            is_submitting: false,
            submit_error: None,
            submit_success: false,
        }
    }

    pub fn values(&self) -> &T {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut T {
        &mut self.values
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn submit_success(&self) -> bool {
        self.submit_success
    }

    /// Runs the schema and stores per-field messages.
    pub fn validate(&mut self) -> bool {
        match self.values.validate() {
            Ok(()) => {
                self.errors.clear();
                true
            }
            Err(errors) => {
                self.errors = field_messages(&errors);
                false
            }
        }
    }

    /// Validates, then hands a copy of the values to `on_submit`. An invalid
    /// form never reaches `on_submit`.
    pub async fn submit<F, Fut, R>(&mut self, on_submit: F) -> SubmitResult
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        if !self.validate() {
            debug!(fields = self.errors.len(), "Form rejected by validation");
            return SubmitResult::default();
        }

        self.reset_state();
        self.is_submitting = true;

        let outcome = on_submit(self.values.clone()).await;
        self.is_submitting = false;

        match outcome {
            Ok(_) => {
                self.submit_success = true;
                self.reset_form();
                SubmitResult {
                    success: true,
                    error: None,
                }
            }
            Err(err) => {
                let message = if !err.field_errors().is_empty() {
                    err.field_errors().join(". ")
                } else {
                    let text = err.to_string();
                    if text.is_empty() {
                        FALLBACK_SUBMIT_ERROR.to_string()
                    } else {
                        text
                    }
                };
                warn!(error = %message, "Form submission failed");
                self.submit_error = Some(message.clone());
                SubmitResult {
                    success: false,
                    error: Some(message),
                }
            }
        }
    }

    pub fn set_errors(&mut self, errors: BTreeMap<String, Vec<String>>) {
        self.errors = errors;
    }

    pub fn clear_errors(&mut self) {
        self.submit_error = None;
        self.errors.clear();
    }

    /// Back to the initial values; submit flags are kept.
    pub fn reset_form(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
    }

    pub fn reset_to_initial(&mut self) {
        self.reset_form();
        self.reset_state();
    }

    fn reset_state(&mut self) {
        self.is_submitting = false;
        self.submit_error = None;
        self.submit_success = false;
    }
}
