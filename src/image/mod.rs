//! Image compression presets and the processing seam
//!
//! Uploaded images are decoded, resized according to one of two fixed
//! presets and re-encoded as JPEG.

pub mod mime;
pub mod mock;
pub mod processor;

pub use mime::detect_image_mime;
pub use mock::MockImageProcessor;
pub use processor::ImageProcessor;

use crate::models::ImageKind;
use crate::Result;
use async_trait::async_trait;

/// How the source is fitted into the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Fill the box exactly, cropping the overflow around the centre.
    Cover,
    /// Fit within the box, preserving aspect ratio.
    Inside,
}

/// Resize and JPEG encode parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub width: u32,
    /// `None` leaves the height unbounded (derived from the aspect ratio).
    pub height: Option<u32>,
    pub fit: Fit,
    /// Whether images smaller than the box may be enlarged.
    pub upscale: bool,
    pub quality: u8,
}

impl Preset {
    pub const CHARACTER: Preset = Preset {
        width: 150,
        height: Some(150),
        fit: Fit::Cover,
        upscale: true,
        quality: 80,
    };

    pub const STORY: Preset = Preset {
        width: 800,
        height: None,
        fit: Fit::Inside,
        upscale: false,
        quality: 70,
    };

    pub fn for_kind(kind: ImageKind) -> Self {
        match kind {
            ImageKind::Character => Self::CHARACTER,
            ImageKind::Story => Self::STORY,
        }
    }
}

#[async_trait]
pub trait ImageService: Send + Sync {
    /// Decode `image_data`, apply `preset` and return the JPEG bytes.
    async fn compress(&self, image_data: &[u8], preset: &Preset) -> Result<Vec<u8>>;
}
