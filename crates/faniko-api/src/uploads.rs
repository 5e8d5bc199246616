use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::error::ApiError;
use crate::storage::Storage;

/// One file part of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A multipart form read fully into memory. Only the first part per name is
/// kept.
#[derive(Debug, Default)]
pub struct Form {
    pub text: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl Form {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Form::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;
                    // Browsers send an empty part for an untouched file input.
                    if file_name.is_empty() && data.is_empty() {
                        continue;
                    }
                    form.files.entry(name).or_insert(UploadedFile {
                        file_name: Some(file_name).filter(|n| !n.is_empty()),
                        content_type,
                        data,
                    });
                }
                None => {
                    let value = field.text().await?;
                    form.text.entry(name).or_insert(value);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    /// Text value or empty string.
    pub fn text_or_default(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    /// Write the named file part to storage, returning its stored name.
    pub async fn store_file(&self, storage: &Storage, name: &str) -> Result<Option<String>, ApiError> {
        match self.files.get(name) {
            Some(file) => {
                let stored = storage
                    .save(name, file.file_name.as_deref(), &file.data)
                    .await?;
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }
}
