use std::collections::HashMap;
use std::path::Path;

use axum::extract::Multipart;
use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Text fields and files of a `multipart/form-data` body, keyed by field name.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = MultipartForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(|s| s.to_string()) else {
                continue;
            };
            let file_name = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string());

            if file_name.is_some() {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read '{name}': {e}")))?;
                if bytes.is_empty() {
                    continue;
                }
                form.files.insert(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                );
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read '{name}': {e}")))?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.files.insert(name.to_string(), file);
        self
    }

    /// Trimmed text value; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn require_text(&self, name: &str) -> AppResult<String> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    pub fn require_file(&mut self, name: &str) -> AppResult<UploadedFile> {
        self.take_file(name)
            .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
    }
}

/// Lowercase alphanumeric extension of the original file name, if it has a sane one.
pub fn file_extension(file_name: Option<&str>) -> Option<String> {
    let ext = Path::new(file_name?).extension()?.to_str()?.to_lowercase();
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

/// Writes the file under `{media_root}/uploads/{folder}/` and returns the path relative to
/// the media root.
pub async fn save_upload(media_root: &str, folder: &str, file: &UploadedFile) -> AppResult<String> {
    let name = match file_extension(file.file_name.as_deref()) {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    };
    let relative = format!("uploads/{folder}/{name}");
    let dir = Path::new(media_root).join("uploads").join(folder);
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to create {}: {e}", dir.display())))?;
    fs::write(dir.join(&name), &file.bytes)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to store upload: {e}")))?;

    tracing::debug!(path = %relative, size = file.bytes.len(), "stored upload");
    Ok(relative)
}

/// Removes a file written by `save_upload` when the row that would reference it was never
/// stored. Failures are logged only.
pub async fn discard_upload(media_root: &str, relative: &str) {
    let path = Path::new(media_root).join(relative);
    match fs::remove_file(&path).await {
        Ok(()) => tracing::debug!(path = %relative, "discarded upload"),
        Err(err) => tracing::warn!(path = %path.display(), error = %err, "failed to discard upload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_normalised_or_dropped() {
        assert_eq!(file_extension(Some("card.PNG")), Some("png".to_string()));
        assert_eq!(file_extension(Some("archive.tar.gz")), Some("gz".to_string()));
        assert_eq!(file_extension(Some("noext")), None);
        assert_eq!(file_extension(Some("evil.p/h")), None);
        assert_eq!(file_extension(None), None);
    }

    #[test]
    fn blank_text_fields_are_absent() {
        let form = MultipartForm::default()
            .with_field("title", "  Rust 101 ")
            .with_field("description", "   ");
        assert_eq!(form.text("title").as_deref(), Some("Rust 101"));
        assert!(form.text("description").is_none());
        assert!(form.require_text("price").is_err());
    }

    #[tokio::test]
    async fn discarded_upload_leaves_no_file() {
        let root = std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4()));
        let root = root.to_string_lossy().into_owned();
        let file = UploadedFile {
            file_name: Some("cover.png".into()),
            content_type: Some("image/png".into()),
            bytes: vec![1, 2, 3],
        };

        let relative = save_upload(&root, "courses", &file).await.unwrap();
        let stored = Path::new(&root).join(&relative);
        assert!(stored.exists());

        discard_upload(&root, &relative).await;
        assert!(!stored.exists());

        let _ = std::fs::remove_dir_all(&root);
    }
}
