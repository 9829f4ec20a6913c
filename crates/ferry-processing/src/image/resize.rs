use ferry_core::{ResizeMode, ResizeParams};
use image::{DynamicImage, GenericImageView};

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Target dimensions for fit mode: the largest size that keeps the aspect
    /// ratio and stays inside every requested side.
    pub fn fit_dimensions(
        orig_width: u32,
        orig_height: u32,
        width: Option<u32>,
        height: Option<u32>,
    ) -> (u32, u32) {
        let scale_w = width.map(|w| w as f64 / orig_width as f64);
        let scale_h = height.map(|h| h as f64 / orig_height as f64);

        let scale = match (scale_w, scale_h) {
            (Some(sw), Some(sh)) => sw.min(sh),
            (Some(sw), None) => sw,
            (None, Some(sh)) => sh,
            (None, None) => return (orig_width, orig_height),
        };

        let w = (orig_width as f64 * scale).round() as u32;
        let h = (orig_height as f64 * scale).round() as u32;
        (w.max(1), h.max(1))
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> image::imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            image::imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            image::imageops::FilterType::CatmullRom
        } else {
            image::imageops::FilterType::Lanczos3
        }
    }

    /// Resize image to exact dimensions
    pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }

    /// Scale to cover `width`x`height`, then crop the overflow around the centre
    pub fn resize_to_fill(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_to_fill(width, height, filter)
    }

    /// Apply a validated resize request
    pub fn apply_resize(img: &DynamicImage, params: &ResizeParams) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();

        match (params.mode, params.width, params.height) {
            (ResizeMode::Fill, Some(w), Some(h)) => Self::resize_to_fill(img, w, h),
            (ResizeMode::Fixed, Some(w), Some(h)) => Self::resize_image(img, w, h),
            (_, width, height) => {
                let (w, h) = Self::fit_dimensions(orig_width, orig_height, width, height);
                Self::resize_image(img, w, h)
            }
        }
    }
}
