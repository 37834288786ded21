//! Image loading for callers that grade regions cropped from files
//!
//! ## Supported Formats
//!
//! JPEG, PNG, WebP, TIFF and BMP via the `image` crate.
//!
//! All images are decoded to 8-bit RGB. The grading engine itself does no
//! I/O; this module is a convenience for the detection pipeline and tools.

use std::path::Path;

use image::{ImageReader, RgbImage};

use crate::error::{GradingError, Result};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Tiff,
    Bmp,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    fn decoder_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// Load an image from disk as 8-bit RGB
///
/// # Errors
///
/// Returns `GradingError::ImageLoadError` if:
/// - The extension is not a supported format
/// - The file cannot be opened
/// - Decoding fails
///
/// # Example
///
/// ```rust,no_run
/// use produce_grading::image_loader::load_image;
/// use std::path::Path;
///
/// let frame = load_image(Path::new("crate_07.jpg"))?;
/// println!("Loaded frame: {}x{}", frame.width(), frame.height());
/// # Ok::<(), produce_grading::GradingError>(())
/// ```
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let format = ImageFormat::from_extension(path).ok_or_else(|| GradingError::ImageLoadError {
        message: format!("Unknown image format for file: {}", path.display()),
        source: None,
    })?;

    let mut reader = ImageReader::open(path).map_err(|e| {
        GradingError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;
    reader.set_format(format.decoder_format());

    let img = reader.decode().map_err(|e| {
        GradingError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    Ok(img.to_rgb8())
}

/// Get list of all supported file extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg", "png", "webp", "tiff", "tif", "bmp"]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}
