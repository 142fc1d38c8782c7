use image::DynamicImage;
use thiserror::Error;

/// Maximum accepted upload size (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Filename extensions accepted for picture uploads.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

/// Minimum accepted width and height, in pixels.
pub const MIN_DIMENSION: u32 = 200;

/// Maximum accepted width and height, in pixels.
pub const MAX_DIMENSION: u32 = 4000;

/// Rejection reasons for an uploaded picture.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error(
        "Image file too large: {:.2}MiB, maximum size is 5MiB",
        *actual as f64 / (1024.0 * 1024.0)
    )]
    FileTooLarge { actual: u64 },

    #[error("Unsupported image format '{extension}'. Allowed formats: jpeg, jpg, png, gif, webp")]
    UnsupportedFormat { extension: String },

    #[error("Cannot determine image dimensions, upload a valid image ({0})")]
    Undecodable(#[from] image::ImageError),

    #[error(
        "Image too small: {width}x{height}px, minimum dimensions are {MIN_DIMENSION}x{MIN_DIMENSION}px"
    )]
    TooSmall { width: u32, height: u32 },

    #[error(
        "Image too large: {width}x{height}px, maximum dimensions are {MAX_DIMENSION}x{MAX_DIMENSION}px"
    )]
    TooLarge { width: u32, height: u32 },

    #[error("Failed to encode optimized image: {0}")]
    Encode(image::ImageError),
}

/// An upload that passed validation, decoded once for reuse downstream.
#[derive(Debug)]
pub struct DecodedUpload {
    pub image: DynamicImage,
    pub width: u32,
    pub height: u32,
}

/// Validate an uploaded picture before any processing.
///
/// Checks run in order and the first violation is returned immediately:
/// declared byte size, filename extension, decodability, minimum and
/// maximum pixel dimensions.
pub fn validate_upload(
    bytes: &[u8],
    filename: &str,
    declared_size: u64,
) -> Result<DecodedUpload, ImageError> {
    if declared_size > MAX_UPLOAD_BYTES {
        return Err(ImageError::FileTooLarge {
            actual: declared_size,
        });
    }

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ImageError::UnsupportedFormat { extension });
    }

    let image = image::load_from_memory(bytes)?;
    let (width, height) = (image.width(), image.height());

    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(ImageError::TooSmall { width, height });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ImageError::TooLarge { width, height });
    }

    Ok(DecodedUpload {
        image,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn accepts_an_image_at_the_minimum_dimensions() {
        let bytes = png_bytes(200, 200);
        let size = bytes.len() as u64;
        let decoded = validate_upload(&bytes, "avatar.png", size).unwrap();
        assert_eq!((decoded.width, decoded.height), (200, 200));
    }

    #[test]
    fn rejects_declared_size_over_five_mib() {
        let bytes = png_bytes(200, 200);
        let err = validate_upload(&bytes, "avatar.png", MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert!(matches!(
            err,
            ImageError::FileTooLarge {
                actual
            } if actual == MAX_UPLOAD_BYTES + 1
        ));
        assert!(err.to_string().contains("5MiB"));
    }

    #[test]
    fn rejects_unsupported_extension() {
        let bytes = png_bytes(200, 200);
        let err = validate_upload(&bytes, "avatar.bmp", bytes.len() as u64).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat { extension } if extension == "bmp"));
    }

    #[test]
    fn rejects_a_filename_without_extension() {
        let bytes = png_bytes(200, 200);
        let err = validate_upload(&bytes, "avatar", bytes.len() as u64).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat { .. }));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let bytes = png_bytes(200, 200);
        assert!(validate_upload(&bytes, "avatar.PNG", bytes.len() as u64).is_ok());
    }

    #[test]
    fn rejects_undecodable_bytes() {
        let garbage = b"definitely not an image".to_vec();
        let err = validate_upload(&garbage, "avatar.png", garbage.len() as u64).unwrap_err();
        assert!(matches!(err, ImageError::Undecodable(_)));
    }

    #[test]
    fn rejects_images_below_minimum_dimensions() {
        for (w, h) in [(199, 200), (200, 199), (50, 50)] {
            let bytes = png_bytes(w, h);
            let err = validate_upload(&bytes, "small.png", bytes.len() as u64).unwrap_err();
            assert!(
                matches!(err, ImageError::TooSmall { width, height } if width == w && height == h),
                "{w}x{h}"
            );
        }
    }

    #[test]
    fn rejects_images_above_maximum_dimensions() {
        let bytes = png_bytes(4001, 200);
        let err = validate_upload(&bytes, "huge.png", bytes.len() as u64).unwrap_err();
        assert!(matches!(err, ImageError::TooLarge { width, .. } if width == 4001));
    }

    #[test]
    fn size_check_runs_before_extension_check() {
        let bytes = png_bytes(200, 200);
        let err = validate_upload(&bytes, "avatar.bmp", MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert!(matches!(err, ImageError::FileTooLarge { .. }));
    }
}
