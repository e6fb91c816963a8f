use tracing::debug;

use crate::config::UploadOptions;
use crate::models::upload::UploadFile;
use crate::utils::file;

/// Tracks files picked for upload and checks them against the configured
/// size ceiling and extension allowlist.
#[derive(Debug, Clone)]
pub struct FileUpload {
    options: UploadOptions,
    files: Vec<UploadFile>,
    upload_progress: u8,
    is_uploading: bool,
    upload_error: Option<String>,
}

impl FileUpload {
    pub fn new(options: UploadOptions) -> Self {
        Self {
            options,
            files: Vec::new(),
            upload_progress: 0,
            is_uploading: false,
            upload_error: None,
        }
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    pub fn upload_progress(&self) -> u8 {
        self.upload_progress
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    pub fn validate_file(&self, file: &UploadFile) -> Vec<String> {
        file::validate_file(file, &self.options)
    }

    /// Accepts the selection only if every file passes; keeps at most
    /// `max_files` of them. On rejection the previous selection stays.
    pub fn handle_file_select(&mut self, selected: Vec<UploadFile>) -> bool {
        let errors: Vec<String> = selected
            .iter()
            .flat_map(|f| self.validate_file(f))
            .collect();

        if !errors.is_empty() {
            debug!(rejected = selected.len(), "File selection rejected");
            self.upload_error = Some(errors.join(", "));
            return false;
        }

        self.files = selected.into_iter().take(self.options.max_files).collect();
        self.upload_error = None;
        true
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
        self.upload_error = None;
        self.upload_progress = 0;
    }

    pub fn begin_upload(&mut self) {
        self.is_uploading = true;
        self.upload_progress = 0;
        self.upload_error = None;
    }

    pub fn set_progress(&mut self, percent: u8) {
        self.upload_progress = percent.min(100);
    }

    pub fn finish_upload(&mut self, error: Option<String>) {
        self.is_uploading = false;
        if error.is_none() {
            self.upload_progress = 100;
        }
        self.upload_error = error;
    }

    pub fn format_file_size(&self, bytes: u64) -> String {
        file::format_file_size(bytes)
    }
}

impl Default for FileUpload {
    fn default() -> Self {
        Self::new(UploadOptions::default())
    }
}
