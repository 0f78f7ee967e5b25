//! Data models and structures
//!
//! Defines the JSON envelopes exchanged with callers of the upload endpoint
//! and the image kind discriminator that selects a compression preset.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CHARACTER_TYPE: &str = "character";

/// Which preset an uploaded image is compressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Avatar-sized square thumbnails.
    Character,
    /// Everything else, bounded by width.
    Story,
}

impl ImageKind {
    /// Only the exact string `"character"` selects the character preset.
    pub fn from_type(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some(CHARACTER_TYPE) => ImageKind::Character,
            _ => ImageKind::Story,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Character => "character",
            ImageKind::Story => "story",
        }
    }
}

/// Upload request body.
///
/// Both fields are kept as raw JSON so that presence and type can be checked
/// explicitly instead of failing the whole body on a wrong `type`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompressRequest {
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<Value>,
}

impl CompressRequest {
    /// The image payload, or `None` when it is absent, null, false, zero or empty.
    pub fn image_payload(&self) -> Result<Option<&str>> {
        match &self.image {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
            Some(other) => Err(Error::InvalidRequest(format!(
                "image must be a string, got {}",
                json_type_name(other)
            ))),
        }
    }

    pub fn image_kind(&self) -> ImageKind {
        ImageKind::from_type(self.kind.as_ref())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompressResponse {
    pub success: bool,
    pub image_url: String,
    pub original_size: usize,
    pub compressed_size: usize,
    pub compression_ratio: String,
}

impl CompressResponse {
    pub fn new(image_url: String, original_size: usize, compressed_size: usize) -> Self {
        Self {
            success: true,
            image_url,
            original_size,
            compressed_size,
            compression_ratio: compression_ratio(original_size, compressed_size),
        }
    }
}

/// Percentage saved, formatted with two decimals. Negative when the output grew.
pub fn compression_ratio(original_size: usize, compressed_size: usize) -> String {
    if original_size == 0 {
        return "0.00".to_string();
    }
    let ratio = (1.0 - compressed_size as f64 / original_size as f64) * 100.0;
    // Ties round away from zero
    format!("{:.2}", (ratio * 100.0).round() / 100.0)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
