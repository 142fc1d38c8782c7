use sha2::{Digest, Sha256};

/// Longest stem carried over from the upload filename.
const MAX_STEM_LEN: usize = 64;

/// Build the on-disk object name for an uploaded file.
///
/// The name is the sanitized filename stem, an 8-hex-character content
/// digest, and the lowercased original extension: `avatar-a1b2c3d4.jpg`.
/// Identical content uploaded under the same filename always maps to the
/// same object, so re-uploads overwrite rather than accumulate.
pub fn object_name(filename: &str, data: &[u8]) -> String {
    let (stem, ext) = split_filename(filename);
    let digest = Sha256::digest(data);
    let tag = hex::encode(&digest[..4]);

    match ext {
        Some(ext) => format!("{}-{}.{}", sanitize_stem(stem), tag, ext.to_lowercase()),
        None => format!("{}-{}", sanitize_stem(stem), tag),
    }
}

/// Split a filename into stem and extension. A name with no dot, or only a
/// leading dot, has no extension.
fn split_filename(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    }
}

/// Reduce a stem to a safe ASCII subset: alphanumerics, `-` and `_`.
/// Everything else becomes `-`; an empty result falls back to "media".
fn sanitize_stem(stem: &str) -> String {
    let mut out: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    out.truncate(MAX_STEM_LEN);

    if out.chars().all(|c| c == '-') {
        "media".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_deterministic() {
        let a = object_name("avatar.png", b"pixels");
        let b = object_name("avatar.png", b"pixels");
        assert_eq!(a, b);
    }

    #[test]
    fn name_differs_for_different_content() {
        let a = object_name("avatar.png", b"one");
        let b = object_name("avatar.png", b"two");
        assert_ne!(a, b);
    }

    #[test]
    fn extension_is_lowercased() {
        let name = object_name("Photo.JPG", b"data");
        assert!(name.ends_with(".jpg"), "{name}");
        assert!(name.starts_with("Photo-"), "{name}");
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        let name = object_name("../étc/pass wd.png", b"data");
        assert!(!name.contains('/'), "{name}");
        assert!(!name.contains(' '), "{name}");
        assert!(name.ends_with(".png"), "{name}");
    }

    #[test]
    fn no_extension_is_allowed() {
        let name = object_name("README", b"data");
        assert!(!name.contains('.'), "{name}");
        assert!(name.starts_with("README-"), "{name}");
    }

    #[test]
    fn pathological_stem_falls_back() {
        let name = object_name("....png", b"data");
        assert!(name.starts_with("media-"), "{name}");
    }

    #[test]
    fn long_stem_is_truncated() {
        let long = "a".repeat(200);
        let name = object_name(&format!("{long}.png"), b"data");
        // stem + "-" + 8 hex chars + ".png"
        assert!(name.len() <= MAX_STEM_LEN + 1 + 8 + 4, "{name}");
    }
}
