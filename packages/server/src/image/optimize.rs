use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use super::validate::ImageError;

/// Maximum width/height of an optimized picture, in pixels.
pub const MAX_EDGE: u32 = 1200;

/// JPEG quality used when re-encoding.
pub const JPEG_QUALITY: u8 = 85;

/// The re-encoded output of the codec adapter.
pub struct OptimizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Flatten transparency onto an opaque white background.
///
/// Fully transparent pixels become white, opaque pixels keep their color,
/// partial alpha blends toward white.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());

    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let [r, g, b, a] = src.0;
        let alpha = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        dst.0 = [blend(r), blend(g), blend(b)];
    }

    out
}

/// Re-encode a decoded picture: flatten any alpha channel, bound both
/// dimensions to [`MAX_EDGE`] (downscale only, aspect ratio preserved,
/// Lanczos filter) and compress as JPEG at quality [`JPEG_QUALITY`].
///
/// The output is usually smaller than a large input, but that is not
/// guaranteed and is never asserted.
pub fn optimize(image: DynamicImage) -> Result<OptimizedImage, ImageError> {
    let opaque = if image.color().has_alpha() {
        DynamicImage::ImageRgb8(flatten_onto_white(&image))
    } else {
        image
    };

    let bounded = if opaque.width() > MAX_EDGE || opaque.height() > MAX_EDGE {
        opaque.resize(MAX_EDGE, MAX_EDGE, FilterType::Lanczos3)
    } else {
        opaque
    };

    let rgb = bounded.to_rgb8();
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(ImageError::Encode)?;

    Ok(OptimizedImage {
        bytes,
        width: rgb.width(),
        height: rgb.height(),
    })
}

/// Derived filename for an optimized picture: original stem + `_optimized.jpg`.
pub fn optimized_filename(original: &str) -> String {
    let stem = original
        .rsplit_once('.')
        .map_or(original, |(stem, _)| stem);
    format!("{stem}_optimized.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn fully_transparent_pixels_flatten_to_white() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 200, 30, 0]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(img));
        assert!(flat.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn opaque_pixels_keep_their_color() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 200, 30, 255]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(img));
        assert!(flat.pixels().all(|p| p.0 == [10, 200, 30]));
    }

    #[test]
    fn half_transparent_pixels_blend_toward_white() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(img));
        let [r, g, b] = flat.get_pixel(0, 0).0;
        // 50% black over white sits near mid-grey.
        for c in [r, g, b] {
            assert!((126..=129).contains(&c), "channel {c}");
        }
    }

    #[test]
    fn oversized_images_are_bounded_preserving_aspect_ratio() {
        let img = DynamicImage::new_rgb8(2400, 1200);
        let out = optimize(img).unwrap();
        assert_eq!((out.width, out.height), (1200, 600));
    }

    #[test]
    fn images_within_bounds_keep_their_dimensions() {
        let img = DynamicImage::new_rgb8(800, 600);
        let out = optimize(img).unwrap();
        assert_eq!((out.width, out.height), (800, 600));
    }

    #[test]
    fn output_decodes_as_jpeg_without_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(400, 300, Rgba([50, 60, 70, 0])));
        let out = optimize(img).unwrap();

        let format = image::guess_format(&out.bytes).unwrap();
        assert_eq!(format, image::ImageFormat::Jpeg);

        let reloaded = image::load_from_memory(&out.bytes).unwrap();
        assert!(!reloaded.color().has_alpha());

        // Transparent input flattened to white survives the lossy encode as
        // near-white; allow for JPEG rounding.
        let rgb = reloaded.to_rgb8();
        let center = rgb.get_pixel(200, 150);
        for c in center.0 {
            assert!(c >= 250, "channel {c} not near white");
        }
    }

    #[test]
    fn optimized_filename_replaces_the_extension() {
        assert_eq!(optimized_filename("portrait.png"), "portrait_optimized.jpg");
        assert_eq!(optimized_filename("a.b.webp"), "a.b_optimized.jpg");
        assert_eq!(optimized_filename("noext"), "noext_optimized.jpg");
    }
}
