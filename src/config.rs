use crate::error::{Error, Result};
use crate::models::candidate::ApplicationStatus;
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;
/// The single resume size ceiling used by uploads and every schema.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const DEFAULT_ALLOWED_FILE_TYPES: &str = ".pdf,.doc,.docx";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub app: AppInfo,
    pub features: FeatureFlags,
    pub upload: UploadOptions,
    pub pagination: PaginationConfig,
    pub status_options: Vec<StatusOption>,
    pub ui: UiConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct AppInfo {
    pub title: String,
    pub version: String,
    pub debug: bool,
    pub enable_logging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub file_upload: bool,
    pub advanced_filters: bool,
    pub export_features: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub max_size: u64,
    /// Lowercase extensions including the leading dot, e.g. `.pdf`.
    pub allowed_types: Vec<String>,
    pub max_files: usize,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: parse_list(DEFAULT_ALLOWED_FILE_TYPES),
            max_files: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub page_size_options: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOption {
    pub value: ApplicationStatus,
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub theme: Theme,
    pub breakpoints: Breakpoints,
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub info: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Breakpoints {
    pub sm: u32,
    pub md: u32,
    pub lg: u32,
    pub xl: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_ms: DEFAULT_API_TIMEOUT_MS,
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            },
            app: AppInfo {
                title: "HR Candidate Management System".to_string(),
                version: "1.0.0".to_string(),
                debug: false,
                enable_logging: false,
            },
            features: FeatureFlags {
                file_upload: true,
                advanced_filters: true,
                export_features: true,
            },
            upload: UploadOptions::default(),
            pagination: PaginationConfig {
                default_page_size: DEFAULT_PAGE_SIZE,
                page_size_options: vec![5, 10, 20, 50],
            },
            status_options: ApplicationStatus::ALL
                .iter()
                .map(|status| StatusOption {
                    value: *status,
                    label: status.label(),
                    color: status.color(),
                })
                .collect(),
            ui: UiConfig {
                theme: Theme {
                    primary: "#3B82F6",
                    secondary: "#6B7280",
                    success: "#10B981",
                    warning: "#F59E0B",
                    error: "#EF4444",
                    info: "#3B82F6",
                },
                breakpoints: Breakpoints {
                    sm: 640,
                    md: 768,
                    lg: 1024,
                    xl: 1280,
                },
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_source(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup, falling back to the
    /// defaults for anything unset.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup("API_BASE_URL").filter(|v| !v.is_empty()) {
            config.api.base_url = base_url;
        }
        if let Some(timeout) = get_env_parse(&lookup, "API_TIMEOUT")? {
            config.api.timeout_ms = timeout;
        }
        if let Some(title) = lookup("APP_TITLE").filter(|v| !v.is_empty()) {
            config.app.title = title;
        }
        if let Some(version) = lookup("APP_VERSION").filter(|v| !v.is_empty()) {
            config.app.version = version;
        }
        config.app.debug = lookup("DEBUG_MODE").as_deref() == Some("true");
        config.app.enable_logging = lookup("ENABLE_LOGGING").as_deref() == Some("true");

        config.features.file_upload = lookup("ENABLE_FILE_UPLOAD").as_deref() != Some("false");
        config.features.advanced_filters =
            lookup("ENABLE_ADVANCED_FILTERS").as_deref() != Some("false");
        config.features.export_features =
            lookup("ENABLE_EXPORT_FEATURES").as_deref() != Some("false");

        if let Some(max_size) = get_env_parse(&lookup, "MAX_FILE_SIZE")? {
            config.upload.max_size = max_size;
        }
        if let Some(types) = lookup("ALLOWED_FILE_TYPES").filter(|v| !v.is_empty()) {
            config.upload.allowed_types = parse_list(&types);
        }

        Ok(config)
    }

    pub fn api_url(&self, endpoint: &str) -> String {
        join_url(&self.api.base_url, endpoint)
    }

    pub fn status_color(&self, status: &str) -> &'static str {
        self.find_status(status).map_or("gray", |option| option.color)
    }

    pub fn status_label<'a>(&self, status: &'a str) -> &'a str {
        match self.find_status(status) {
            Some(option) => option.label,
            None => status,
        }
    }

    fn find_status(&self, status: &str) -> Option<&StatusOption> {
        self.status_options
            .iter()
            .find(|option| option.value.as_str() == status)
    }
}

pub(crate) fn join_url(base: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

fn get_env_parse<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
    }
}
