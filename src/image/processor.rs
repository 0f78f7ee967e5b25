use super::{Fit, ImageService, Preset};
use crate::Result;
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

pub struct ImageProcessor {
    filter: FilterType,
}

impl ImageProcessor {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    fn compress_sync(image_data: &[u8], preset: &Preset, filter: FilterType) -> Result<Vec<u8>> {
        let img = image::load_from_memory(image_data)?;
        let resized = resize(img, preset, filter);
        encode_jpeg(&resized, preset.quality)
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Output dimensions for `preset` applied to a `width` x `height` source.
pub fn target_dimensions(width: u32, height: u32, preset: &Preset) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    match preset.fit {
        Fit::Cover => {
            let box_w = preset.width;
            let box_h = preset.height.unwrap_or(preset.width);
            if !preset.upscale && (width < box_w || height < box_h) {
                (width.min(box_w), height.min(box_h))
            } else {
                (box_w, box_h)
            }
        }
        Fit::Inside => {
            let scale_w = preset.width as f64 / width as f64;
            let scale = match preset.height {
                Some(box_h) => scale_w.min(box_h as f64 / height as f64),
                None => scale_w,
            };
            let scale = if preset.upscale { scale } else { scale.min(1.0) };
            if scale == 1.0 {
                return (width, height);
            }
            let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
            (scaled(width), scaled(height))
        }
    }
}

/// Centred crop of a `width` x `height` source with the aspect ratio of
/// `box_w` x `box_h`, as `(x, y, crop_w, crop_h)` in source pixels.
pub fn cover_crop(width: u32, height: u32, box_w: u32, box_h: u32) -> (u32, u32, u32, u32) {
    let (w, h, bw, bh) = (width as u64, height as u64, box_w as u64, box_h as u64);
    let (crop_w, crop_h) = if w * bh > h * bw {
        // Wider than the box: keep full height
        (((h * bw + bh / 2) / bh).clamp(1, w), h)
    } else {
        (w, ((w * bh + bw / 2) / bw).clamp(1, h))
    };
    let (crop_w, crop_h) = (crop_w as u32, crop_h as u32);
    ((width - crop_w) / 2, (height - crop_h) / 2, crop_w, crop_h)
}

fn resize(img: DynamicImage, preset: &Preset, filter: FilterType) -> DynamicImage {
    let (width, height) = img.dimensions();
    let (target_w, target_h) = target_dimensions(width, height, preset);
    if (target_w, target_h) == (width, height) {
        return img;
    }

    match preset.fit {
        // Crop before scaling so extreme aspect ratios never build a huge
        // intermediate image
        Fit::Cover => {
            let (x, y, crop_w, crop_h) = cover_crop(width, height, target_w, target_h);
            img.crop_imm(x, y, crop_w, crop_h)
                .resize_exact(target_w, target_h, filter)
        }
        Fit::Inside => img.resize_exact(target_w, target_h, filter),
    }
}

/// JPEG has no alpha channel, so everything is flattened to 8-bit RGB first.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder.encode_image(&rgb)?;
    Ok(bytes)
}

#[async_trait]
impl ImageService for ImageProcessor {
    async fn compress(&self, image_data: &[u8], preset: &Preset) -> Result<Vec<u8>> {
        let image_data = image_data.to_vec();
        let preset = *preset;
        let filter = self.filter;

        tokio::task::spawn_blocking(move || Self::compress_sync(&image_data, &preset, filter))
            .await?
    }
}
