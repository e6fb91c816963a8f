use bytes::Bytes;
use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::utils::file::file_extension;

/// A file selected for upload, held in memory until it is sent.
///
/// Serializes as its metadata only; the contents never end up in logs or
/// validation error params.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    #[serde(skip)]
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).map(str::to_string);
        Self {
            file_name,
            content_type,
            data: data.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume")
            .to_string();
        Ok(Self::new(file_name, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn extension(&self) -> String {
        file_extension(&self.file_name)
    }
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
    match file_extension(file_name).as_str() {
        ".pdf" => Some("application/pdf"),
        ".doc" => Some("application/msword"),
        ".docx" => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_metadata_without_contents() {
        let file = UploadFile::new("cv.pdf", b"%PDF-1.4".to_vec());
        assert_eq!(
            serde_json::to_value(&file).unwrap(),
            json!({"file_name": "cv.pdf", "content_type": "application/pdf"})
        );
    }
}
