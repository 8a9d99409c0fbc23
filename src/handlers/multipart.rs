//! Shared multipart-form extraction for endpoints that mix text fields
//! with file uploads (profile images, complaint evidence, emergency media).

use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ApiError;

pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub data: Vec<u8>,
}

/// A fully drained multipart form: text fields by name, files in arrival
/// order. Repeated text fields keep the last value; repeated file fields
/// (e.g. several `evidence` parts) are all kept.
#[derive(Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl FormData {
    pub async fn collect(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
        {
            let name = match field.name() {
                Some(name) => name.to_string(),
                None => continue,
            };

            if let Some(file_name) = field.file_name() {
                let file_name = file_name.to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?
                    .to_vec();
                form.files.push(UploadedFile {
                    field: name,
                    file_name,
                    data,
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read field: {}", e)))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str()).filter(|s| !s.is_empty())
    }

    pub fn require(&self, name: &str) -> Result<String, ApiError> {
        self.text(name)
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::field_error(name, "This field is required"))
    }

    /// Parse a required field via FromStr (dates, numbers, bools)
    pub fn require_parsed<T: FromStr>(&self, name: &str) -> Result<T, ApiError> {
        self.require(name)?
            .parse::<T>()
            .map_err(|_| ApiError::field_error(name, "Invalid value"))
    }

    /// Parse an optional field via FromStr
    pub fn parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>, ApiError> {
        match self.text(name) {
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| ApiError::field_error(name, "Invalid value")),
            None => Ok(None),
        }
    }

    /// Parse an optional field through serde, for the status/priority/kind
    /// enums that deserialize from their wire names
    pub fn parsed_enum<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
        match self.text(name) {
            Some(raw) => serde_json::from_value(json!(raw))
                .map(Some)
                .map_err(|_| ApiError::field_error(name, "Invalid value")),
            None => Ok(None),
        }
    }

    /// First file uploaded under the given field name
    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == field)
    }

    /// All files uploaded under the given field name
    pub fn files_named<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a UploadedFile> {
        self.files.iter().filter(move |f| f.field == field)
    }
}
