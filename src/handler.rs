//! The upload-image compression handler.
//!
//! Validates the request, picks a preset from the `type` field, runs the image
//! service and assembles the JSON envelope. Every failure is mapped to one of
//! three [`HandlerError`] kinds so nothing escapes as an unhandled fault.

use crate::data_uri::{self, DataUri};
use crate::image::{detect_image_mime, ImageService, Preset};
use crate::models::{CompressRequest, CompressResponse, ErrorBody, ImageKind};
use crate::Error;
use axum::http::{Method, StatusCode};
use std::sync::Arc;
use tracing::{debug, error, info};

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const NO_IMAGE_PROVIDED: &str = "No image provided";
pub const PROCESSING_FAILED: &str = "Image processing failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    MethodNotAllowed,
    MissingImage,
    /// Carries the underlying error message.
    ProcessingFailure(String),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            HandlerError::MissingImage => StatusCode::BAD_REQUEST,
            HandlerError::ProcessingFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            HandlerError::MethodNotAllowed => ErrorBody::new(METHOD_NOT_ALLOWED),
            HandlerError::MissingImage => ErrorBody::new(NO_IMAGE_PROVIDED),
            HandlerError::ProcessingFailure(details) => {
                ErrorBody::new(PROCESSING_FAILED).with_details(details.clone())
            }
        }
    }
}

impl From<Error> for HandlerError {
    fn from(e: Error) -> Self {
        error!("Image processing error: {}", e);
        HandlerError::ProcessingFailure(e.to_string())
    }
}

#[derive(Clone)]
pub struct ImageHandler {
    image: Arc<dyn ImageService>,
}

impl ImageHandler {
    pub fn new(image: Arc<dyn ImageService>) -> Self {
        Self { image }
    }

    /// Handle one raw invocation: HTTP method plus the unparsed request body.
    pub async fn handle(
        &self,
        method: &Method,
        body: &[u8],
    ) -> std::result::Result<CompressResponse, HandlerError> {
        if *method != Method::POST {
            debug!("Rejecting {} request", method);
            return Err(HandlerError::MethodNotAllowed);
        }

        let request: CompressRequest = serde_json::from_slice(body).map_err(Error::from)?;
        let Some(payload) = request.image_payload()? else {
            debug!("Request carried no image");
            return Err(HandlerError::MissingImage);
        };

        Ok(self.compress(payload, request.image_kind()).await?)
    }

    /// Decode a (data-URI or bare) base64 image and compress it for `kind`.
    pub async fn compress(
        &self,
        payload: &str,
        kind: ImageKind,
    ) -> crate::Result<CompressResponse> {
        let uri = DataUri::parse(payload);
        let original = uri.decode()?;
        debug!(
            "Decoded {} bytes (declared: {}, detected: {})",
            original.len(),
            uri.subtype.unwrap_or("none"),
            detect_image_mime(&original).unwrap_or("unknown")
        );

        let preset = Preset::for_kind(kind);
        let compressed = self.image.compress(&original, &preset).await?;

        let response = CompressResponse::new(
            data_uri::encode_jpeg(&compressed),
            original.len(),
            compressed.len(),
        );
        info!(
            "Compressed {} image: {} -> {} bytes ({}%)",
            kind.as_str(),
            response.original_size,
            response.compressed_size,
            response.compression_ratio
        );

        Ok(response)
    }
}
