//! Multipart form decoding for create and update
//!
//! Both endpoints share one field set. Scalar fields arrive as text parts,
//! `categories` and `items` as JSON text, `thumbnail_image` as a file part.
//! Unknown parts are skipped. Presence rules live in the commands.

use axum::extract::Multipart;
use playdeck_common::media::{extension_for, normalize_media_type};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::{RawCategory, RawItem};
use crate::storage::UploadFile;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error("{field} must be a boolean")]
    InvalidBoolean { field: String },

    #[error("{field} is not valid JSON: {message}")]
    InvalidJson { field: String, message: String },
}

/// Uploaded thumbnail part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailPart {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub media_type: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ThumbnailError {
    #[error("thumbnail_image is empty")]
    Empty,

    #[error("thumbnail_image must be an image, got {0}")]
    NotAnImage(String),
}

impl ThumbnailPart {
    /// Check the part and name it `thumbnail.<ext>`.
    pub fn into_upload(self) -> Result<UploadFile, ThumbnailError> {
        if self.bytes.is_empty() {
            return Err(ThumbnailError::Empty);
        }
        let media_type = match self.media_type {
            Some(mt) if mt.starts_with("image/") => mt,
            other => {
                return Err(ThumbnailError::NotAnImage(
                    other.unwrap_or_else(|| "no content type".to_string()),
                ))
            },
        };
        Ok(UploadFile {
            bytes: self.bytes,
            filename: format!("thumbnail.{}", extension_for(Some(&media_type))),
            media_type,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeedSortingForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<ThumbnailPart>,
    pub is_publish_immediately: Option<bool>,
    pub is_publish: Option<bool>,
    pub show_score_at_end: Option<bool>,
    pub categories: Option<Vec<RawCategory>>,
    pub items: Option<Vec<RawItem>>,
}

impl SpeedSortingForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| FormError::Multipart(e.to_string()))?
        {
            let field_name = field.name().unwrap_or("").to_string();

            if field_name == "thumbnail_image" {
                let filename = field.file_name().map(str::to_string);
                let media_type = field.content_type().and_then(normalize_media_type);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| FormError::Multipart(e.to_string()))?;
                form.thumbnail = Some(ThumbnailPart {
                    bytes: bytes.to_vec(),
                    filename,
                    media_type,
                });
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| FormError::Multipart(e.to_string()))?;
            form.set_text_field(&field_name, value)?;
        }

        Ok(form)
    }

    /// Apply one text part. Unknown names are ignored.
    pub fn set_text_field(&mut self, field: &str, value: String) -> Result<(), FormError> {
        match field {
            "name" => self.name = Some(value),
            "description" => self.description = Some(value),
            "is_publish_immediately" => {
                self.is_publish_immediately = Some(parse_bool(field, &value)?)
            },
            "is_publish" => self.is_publish = Some(parse_bool(field, &value)?),
            "show_score_at_end" => self.show_score_at_end = Some(parse_bool(field, &value)?),
            "categories" => self.categories = Some(parse_json(field, &value)?),
            "items" => self.items = Some(parse_json(field, &value)?),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
        Ok(())
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, FormError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(FormError::InvalidBoolean {
            field: field.to_string(),
        }),
    }
}

fn parse_json<T: DeserializeOwned>(field: &str, value: &str) -> Result<T, FormError> {
    serde_json::from_str(value).map_err(|e| FormError::InvalidJson {
        field: field.to_string(),
        message: e.to_string(),
    })
}
