use std::borrow::Cow;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::DecodeError;
use crate::models::variant::{Fit, Variant, VariantPolicy};

pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// JPEG renditions of one upload.
#[derive(Debug, Clone)]
pub struct ProcessedImages {
    pub original: Vec<u8>,
    pub medium: Vec<u8>,
    pub thumbnail: Vec<u8>,
}

impl ProcessedImages {
    /// Buffers paired with their variant, in upload order.
    pub fn into_variants(self) -> [(Variant, Vec<u8>); 3] {
        [
            (Variant::Original, self.original),
            (Variant::Medium, self.medium),
            (Variant::Thumbnail, self.thumbnail),
        ]
    }
}

/// Decodes `data` once and renders every variant. Either all three succeed or
/// nothing is returned.
pub fn process_image(data: &[u8]) -> Result<ProcessedImages, DecodeError> {
    let img = image::load_from_memory(data).map_err(|e| DecodeError(e.to_string()))?;

    Ok(ProcessedImages {
        original: render(&img, Variant::Original.policy())?,
        medium: render(&img, Variant::Medium.policy())?,
        thumbnail: render(&img, Variant::Thumbnail.policy())?,
    })
}

fn render(img: &DynamicImage, policy: VariantPolicy) -> Result<Vec<u8>, DecodeError> {
    let filter = FilterType::Lanczos3;

    let resized = match policy.fit {
        Fit::Cover => Cow::Owned(img.resize_to_fill(policy.width, policy.height, filter)),
        Fit::Contain if img.width() > policy.width || img.height() > policy.height => {
            Cow::Owned(img.resize(policy.width, policy.height, filter))
        }
        Fit::Contain => Cow::Borrowed(img),
    };

    encode_jpeg(&resized, policy.quality)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, DecodeError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    // JPEG has no alpha channel.
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| DecodeError(format!("JPEG encode failed: {}", e)))?;

    Ok(buffer.into_inner())
}
