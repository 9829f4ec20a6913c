//! Decode, resize and re-encode stored images

use crate::image::resize::ImageResize;
use bytes::Bytes;
use ferry_core::ResizeParams;
use image::{GenericImageView, ImageFormat};
use std::io::Cursor;

/// Output of a resize
#[derive(Debug, Clone)]
pub struct ResizedImage {
    pub data: Bytes,
    /// File extension matching the encoded format, without the dot
    pub extension: &'static str,
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Entry point for image transforms
pub struct ImageTransformer;

impl ImageTransformer {
    /// Resize `data` according to `params`, keeping the source format when it
    /// can be re-encoded and falling back to PNG otherwise.
    pub fn resize(data: &[u8], params: &ResizeParams) -> Result<ResizedImage, anyhow::Error> {
        let reader = image::ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = Self::output_format(reader.format());
        let img = reader.decode()?;

        let resized = ImageResize::apply_resize(&img, params);
        let (width, height) = resized.dimensions();

        // JPEG has no alpha channel
        let resized = if format == ImageFormat::Jpeg {
            image::DynamicImage::ImageRgb8(resized.to_rgb8())
        } else {
            resized
        };

        let estimated_size = (width as usize) * (height as usize) * 3;
        let mut buffer = Vec::with_capacity(estimated_size);
        resized.write_to(&mut Cursor::new(&mut buffer), format)?;

        tracing::debug!(
            mode = %params.mode,
            width = width,
            height = height,
            size_bytes = buffer.len(),
            "Image resized"
        );

        Ok(ResizedImage {
            data: Bytes::from(buffer),
            extension: format.extensions_str().first().copied().unwrap_or("png"),
            content_type: format.to_mime_type(),
            width,
            height,
        })
    }

    fn output_format(source: Option<ImageFormat>) -> ImageFormat {
        match source {
            Some(f @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP)) => f,
            _ => ImageFormat::Png,
        }
    }
}
