//! API routes for the portal server

pub mod analyze;
pub mod chat;
pub mod compare;
pub mod sessions;

use axum::extract::multipart::Multipart;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// One uploaded file from a multipart request
pub(crate) struct UploadedFile {
    /// Form field the file arrived under
    pub field: String,
    /// Client-supplied filename
    pub filename: String,
    pub data: Vec<u8>,
}

/// Files and form fields carried by one multipart request.
///
/// Parts with a filename are treated as uploads; the rest are form fields.
pub(crate) struct MultipartPayload {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartPayload {
    /// Take the file uploaded under a named field
    pub fn take_file(&mut self, field: &str) -> Result<UploadedFile> {
        let pos = self
            .files
            .iter()
            .position(|f| f.field == field)
            .ok_or_else(|| Error::BadRequest(format!("missing file field {field:?}")))?;
        Ok(self.files.remove(pos))
    }
}

pub(crate) async fn read_multipart(mut multipart: Multipart) -> Result<MultipartPayload> {
    let mut files = Vec::new();
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::BadRequest(format!("failed to read {filename}: {e}")))?;
                files.push(UploadedFile {
                    field: name,
                    filename,
                    data: data.to_vec(),
                });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| Error::BadRequest(format!("failed to read field {name}: {e}")))?;
                fields.insert(name, value);
            }
        }
    }

    Ok(MultipartPayload { files, fields })
}

pub(crate) fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(Error::BadRequest(format!("invalid boolean: {other:?}"))),
    }
}
