//! Field rules shared by every form schema.
//!
//! Each rule checks one value and stops at the first broken constraint, with
//! required-ness checked before shape.

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use validator::{ValidateEmail, ValidationError};

use crate::config::UploadOptions;
use crate::models::candidate::{ApplicationStatus, Department};
use crate::models::upload::UploadFile;
use crate::utils::file::format_file_size;

pub type RuleResult = Result<(), ValidationError>;

pub const MIN_AGE: i32 = 16;
pub const MAX_AGE: i32 = 100;
pub const MAX_EXPERIENCE_YEARS: f64 = 50.0;

static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> &'static Regex {
    NAME_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z\s]+$").expect("name pattern compiles"))
}

/// Optional leading `+`, a first digit 1-9, then up to 15 more ASCII digits.
fn phone_regex() -> &'static Regex {
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("phone pattern compiles"))
}

fn fail(code: &'static str, message: impl Into<Cow<'static, str>>) -> RuleResult {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    Err(err)
}

fn required(value: &str, message: &'static str) -> RuleResult {
    if value.trim().is_empty() {
        return fail("required", message);
    }
    Ok(())
}

/// Whole years between `birth` and `today`, counting a year only once the
/// birthday has come around.
pub fn compute_age(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn full_name(value: &str) -> RuleResult {
    required(value, "Full name is required")?;
    full_name_shape(value)
}

pub fn full_name_shape(value: &str) -> RuleResult {
    let len = value.chars().count();
    if len < 2 {
        return fail("length", "Full name must be at least 2 characters");
    }
    if len > 100 {
        return fail("length", "Full name must not exceed 100 characters");
    }
    if !name_regex().is_match(value) {
        return fail("pattern", "Full name must contain only letters and spaces");
    }
    Ok(())
}

pub fn email(value: &str) -> RuleResult {
    required(value, "Email address is required")?;
    email_shape(value)
}

pub fn email_shape(value: &str) -> RuleResult {
    if !value.validate_email() {
        return fail("email", "Please enter a valid email address");
    }
    if value.chars().count() > 254 {
        return fail("length", "Email address is too long");
    }
    Ok(())
}

pub fn is_phone_number(value: &str) -> bool {
    phone_regex().is_match(value)
}

pub fn phone(value: &str) -> RuleResult {
    required(value, "Phone number is required")?;
    phone_shape(value)
}

pub fn phone_shape(value: &str) -> RuleResult {
    if !is_phone_number(value) {
        return fail("pattern", "Please enter a valid phone number");
    }
    Ok(())
}

pub fn date_of_birth_on(value: NaiveDate, today: NaiveDate) -> RuleResult {
    if value > today {
        return fail("max", "Date of birth cannot be in the future");
    }
    let age = compute_age(value, today);
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return fail("age", "Age must be between 16 and 100 years");
    }
    Ok(())
}

pub fn date_of_birth(value: &NaiveDate) -> RuleResult {
    date_of_birth_on(*value, today())
}

pub fn not_in_future_on(value: NaiveDate, today: NaiveDate) -> RuleResult {
    if value > today {
        return fail("max", "Date cannot be in the future");
    }
    Ok(())
}

pub fn not_in_future(value: &NaiveDate) -> RuleResult {
    not_in_future_on(*value, today())
}

pub fn years_of_experience(value: f64) -> RuleResult {
    if value < 0.0 {
        return fail("range", "Years of experience must be at least 0");
    }
    if value > MAX_EXPERIENCE_YEARS {
        return fail("range", "Years of experience must not exceed 50");
    }
    if value.fract() != 0.0 || !value.is_finite() {
        return fail("integer", "Years of experience must be a whole number");
    }
    Ok(())
}

pub fn department(value: &str) -> RuleResult {
    required(value, "Please select a department")?;
    department_shape(value)
}

pub fn department_shape(value: &str) -> RuleResult {
    if !Department::ALL.iter().any(|d| d.as_str() == value) {
        return fail("one_of", "Please select a valid department");
    }
    Ok(())
}

pub fn new_status(value: &str) -> RuleResult {
    required(value, "Please select a new status")?;
    status_shape(value)
}

pub fn status_shape(value: &str) -> RuleResult {
    if !ApplicationStatus::ALL.iter().any(|s| s.as_str() == value) {
        return fail("one_of", "Please select a valid status");
    }
    Ok(())
}

pub fn admin_name(value: &str) -> RuleResult {
    required(value, "Admin name is required")?;
    let len = value.chars().count();
    if len < 2 {
        return fail("length", "Admin name must be at least 2 characters");
    }
    if len > 100 {
        return fail("length", "Admin name must not exceed 100 characters");
    }
    Ok(())
}

pub fn admin_name_filter(value: &str) -> RuleResult {
    if value.chars().count() < 2 {
        return fail("length", "Admin name must be at least 2 characters");
    }
    Ok(())
}

pub fn admin_email(value: &str) -> RuleResult {
    required(value, "Admin email is required")?;
    if !value.validate_email() {
        return fail("email", "Please enter a valid admin email address");
    }
    Ok(())
}

pub fn feedback(value: &str) -> RuleResult {
    required(value, "Feedback is required")?;
    let len = value.chars().count();
    if len < 10 {
        return fail("length", "Feedback must be at least 10 characters");
    }
    if len > 1000 {
        return fail("length", "Feedback must not exceed 1000 characters");
    }
    Ok(())
}

/// Checks a resume against the configured upload limits. Both messages are
/// built from `options`, so they always describe the limit that was applied.
pub fn resume(file: &UploadFile, options: &UploadOptions) -> RuleResult {
    if file.size() > options.max_size {
        return fail(
            "file_size",
            format!("File size must be less than {}", format_file_size(options.max_size)),
        );
    }
    let extension = file.extension();
    if !options.allowed_types.iter().any(|t| *t == extension) {
        return fail(
            "file_type",
            format!("Only {} files are allowed", type_list(&options.allowed_types)),
        );
    }
    Ok(())
}

/// `[".pdf", ".doc", ".docx"]` -> `"PDF, DOC, and DOCX"`.
fn type_list(types: &[String]) -> String {
    let names: Vec<String> = types
        .iter()
        .map(|t| t.trim_start_matches('.').to_uppercase())
        .collect();
    match names.as_slice() {
        [] => "listed".to_string(),
        [one] => one.clone(),
        [first, second] => format!("{} and {}", first, second),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn message(result: RuleResult) -> String {
        result.unwrap_err().message.unwrap().to_string()
    }

    #[test]
    fn age_counts_completed_years_only() {
        let today = date(2026, 10, 16);
        assert_eq!(compute_age(date(2000, 10, 16), today), 26);
        assert_eq!(compute_age(date(2000, 10, 17), today), 25);
        assert_eq!(compute_age(date(2000, 9, 30), today), 26);
        assert_eq!(compute_age(date(2000, 11, 1), today), 25);
        assert_eq!(compute_age(date(2000, 2, 29), date(2025, 2, 28)), 24);
        assert_eq!(compute_age(date(2000, 2, 29), date(2025, 3, 1)), 25);
    }

    #[test]
    fn date_of_birth_age_boundaries() {
        let today = date(2026, 10, 16);
        // 16 and 100 pass, 15 and 101 fail
        assert!(date_of_birth_on(date(2010, 10, 16), today).is_ok());
        assert!(date_of_birth_on(date(1926, 10, 16), today).is_ok());
        assert_eq!(
            message(date_of_birth_on(date(2010, 10, 17), today)),
            "Age must be between 16 and 100 years"
        );
        assert_eq!(
            message(date_of_birth_on(date(1925, 10, 16), today)),
            "Age must be between 16 and 100 years"
        );
        assert_eq!(
            message(date_of_birth_on(date(2026, 10, 17), today)),
            "Date of birth cannot be in the future"
        );
    }

    #[test]
    fn names_are_letters_and_spaces() {
        assert!(full_name("Jane Doe").is_ok());
        assert_eq!(message(full_name("")), "Full name is required");
        assert_eq!(message(full_name("J")), "Full name must be at least 2 characters");
        assert_eq!(message(full_name(&"a".repeat(101))), "Full name must not exceed 100 characters");
        assert_eq!(message(full_name("R2D2")), "Full name must contain only letters and spaces");
        assert_eq!(message(full_name("O'Brien")), "Full name must contain only letters and spaces");
    }

    #[test]
    fn phone_numbers_follow_e164_shape() {
        assert!(is_phone_number("+15551234567"));
        assert!(is_phone_number("9"));
        assert!(is_phone_number("1234567890123456"));
        assert!(!is_phone_number("12345678901234567"));
        assert!(!is_phone_number("0123"));
        assert!(!is_phone_number("+"));
        assert!(!is_phone_number("555-1234"));
        assert_eq!(message(phone("")), "Phone number is required");
    }

    #[test]
    fn experience_is_a_whole_number_in_range() {
        assert!(years_of_experience(0.0).is_ok());
        assert!(years_of_experience(50.0).is_ok());
        assert_eq!(message(years_of_experience(-1.0)), "Years of experience must be at least 0");
        assert_eq!(message(years_of_experience(51.0)), "Years of experience must not exceed 50");
        assert_eq!(message(years_of_experience(2.5)), "Years of experience must be a whole number");
    }

    #[test]
    fn choices_must_be_codes() {
        assert!(department("finance").is_ok());
        assert_eq!(message(department("marketing")), "Please select a valid department");
        assert_eq!(message(department("")), "Please select a department");
        assert!(new_status("under_review").is_ok());
        assert_eq!(message(new_status("archived")), "Please select a valid status");
    }

    #[test]
    fn feedback_length_limits() {
        assert_eq!(message(feedback("short")), "Feedback must be at least 10 characters");
        assert!(feedback("Good fit for the team").is_ok());
        assert!(feedback(&"x".repeat(1000)).is_ok());
        assert_eq!(message(feedback(&"x".repeat(1001))), "Feedback must not exceed 1000 characters");
    }

    #[test]
    fn emails_check_presence_then_shape() {
        assert_eq!(message(email("")), "Email address is required");
        assert_eq!(message(email("not-an-email")), "Please enter a valid email address");
        assert!(email("jane@example.com").is_ok());
        assert_eq!(message(admin_email("nope")), "Please enter a valid admin email address");
    }

    #[test]
    fn resume_uses_the_default_limits() {
        let options = UploadOptions::default();
        let ok = UploadFile::new("cv.DOCX", vec![0u8; 10]);
        assert!(resume(&ok, &options).is_ok());
        let big = UploadFile::new("cv.pdf", vec![0u8; 5 * 1024 * 1024 + 1]);
        assert_eq!(message(resume(&big, &options)), "File size must be less than 5 MB");
        let wrong = UploadFile::new("cv.png", vec![0u8; 10]);
        assert_eq!(
            message(resume(&wrong, &options)),
            "Only PDF, DOC, and DOCX files are allowed"
        );
    }

    #[test]
    fn resume_follows_configured_limits() {
        let options = UploadOptions {
            max_size: 10 * 1024 * 1024,
            allowed_types: vec![".pdf".to_string()],
            max_files: 1,
        };
        let seven_mb = UploadFile::new("cv.pdf", vec![0u8; 7 * 1024 * 1024]);
        assert!(resume(&seven_mb, &options).is_ok());

        let docx = UploadFile::new("cv.docx", vec![0u8; 10]);
        assert_eq!(message(resume(&docx, &options)), "Only PDF files are allowed");

        let huge = UploadFile::new("cv.pdf", vec![0u8; 10 * 1024 * 1024 + 1]);
        assert_eq!(message(resume(&huge, &options)), "File size must be less than 10 MB");
    }

    #[test]
    fn type_list_reads_naturally() {
        assert_eq!(type_list(&[".pdf".into(), ".doc".into()]), "PDF and DOC");
        assert_eq!(
            type_list(&[".pdf".into(), ".doc".into(), ".docx".into()]),
            "PDF, DOC, and DOCX"
        );
    }
}
