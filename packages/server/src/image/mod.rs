//! Profile picture ingestion: upload validation and re-encoding.

mod optimize;
mod validate;

pub use optimize::{
    JPEG_QUALITY, MAX_EDGE, OptimizedImage, flatten_onto_white, optimize, optimized_filename,
};
pub use validate::{
    ALLOWED_EXTENSIONS, DecodedUpload, ImageError, MAX_DIMENSION, MAX_UPLOAD_BYTES, MIN_DIMENSION,
    validate_upload,
};

/// Upload size above which a picture is re-encoded (500 KiB). Smaller
/// uploads are stored byte-for-byte.
pub const OPTIMIZE_THRESHOLD: u64 = 500 * 1024;

/// A picture that passed validation and is ready to be persisted.
#[derive(Debug)]
pub struct PreparedPicture {
    pub bytes: Vec<u8>,
    /// Filename to serve the picture under: the original name, or the
    /// derived `_optimized.jpg` name when re-encoded.
    pub filename: String,
    /// Dimensions of the final stored bytes.
    pub width: u32,
    pub height: u32,
    /// Whether the codec adapter replaced the original bytes.
    pub optimized: bool,
}

/// Run the full ingestion pipeline over an uploaded picture.
///
/// Validation always runs; re-encoding only when the upload exceeds
/// [`OPTIMIZE_THRESHOLD`]. The returned metadata describes the bytes that
/// will actually be stored.
pub fn prepare_picture(bytes: Vec<u8>, filename: &str) -> Result<PreparedPicture, ImageError> {
    let declared_size = bytes.len() as u64;
    let decoded = validate_upload(&bytes, filename, declared_size)?;

    if declared_size <= OPTIMIZE_THRESHOLD {
        return Ok(PreparedPicture {
            bytes,
            filename: filename.to_string(),
            width: decoded.width,
            height: decoded.height,
            optimized: false,
        });
    }

    let output = optimize(decoded.image)?;
    Ok(PreparedPicture {
        bytes: output.bytes,
        filename: optimized_filename(filename),
        width: output.width,
        height: output.height,
        optimized: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    /// Deterministic noise so the PNG stays close to its raw size.
    fn noise_png(width: u32, height: u32) -> Vec<u8> {
        let mut seed: u32 = 0x2545_f491;
        let mut img = RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let [a, b, c, _] = seed.to_le_bytes();
            *pixel = Rgb([a, b, c]);
        }
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn flat_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([90, 120, 150]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn small_upload_is_stored_byte_for_byte() {
        let bytes = flat_png(300, 240);
        assert!((bytes.len() as u64) <= OPTIMIZE_THRESHOLD);

        let prepared = prepare_picture(bytes.clone(), "portrait.png").unwrap();
        assert!(!prepared.optimized);
        assert_eq!(prepared.bytes, bytes);
        assert_eq!(prepared.filename, "portrait.png");
        assert_eq!((prepared.width, prepared.height), (300, 240));
    }

    #[test]
    fn large_upload_goes_through_the_codec() {
        let bytes = noise_png(900, 700);
        assert!(
            (bytes.len() as u64) > OPTIMIZE_THRESHOLD,
            "noise fixture must exceed the gate ({} bytes)",
            bytes.len()
        );

        let prepared = prepare_picture(bytes, "portrait.png").unwrap();
        assert!(prepared.optimized);
        assert_eq!(prepared.filename, "portrait_optimized.jpg");
        assert!(prepared.width.max(prepared.height) <= MAX_EDGE);

        // The stored metadata matches the stored bytes.
        let reloaded = image::load_from_memory(&prepared.bytes).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (prepared.width, prepared.height));
    }

    #[test]
    fn oversized_large_upload_is_bounded_to_max_edge() {
        let bytes = noise_png(1400, 700);
        let prepared = prepare_picture(bytes, "wide.png").unwrap();
        assert!(prepared.optimized);
        assert_eq!((prepared.width, prepared.height), (1200, 600));
    }

    #[test]
    fn validation_failure_aborts_the_pipeline() {
        let bytes = flat_png(100, 100);
        let err = prepare_picture(bytes, "tiny.png").unwrap_err();
        assert!(matches!(err, ImageError::TooSmall { .. }));
    }
}
