//! Capability classification: will this file type ever get a thumbnail?
//!
//! Classification looks at type metadata only. URLs and processing status
//! are deliberately out of reach here.

/// MIME types the generation pipeline produces thumbnails for
const THUMBNAILABLE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/pjpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
    "image/heic",
    "image/heif",
    "image/svg+xml",
    "video/mp4",
    "video/quicktime",
    "video/webm",
    "video/x-msvideo",
    "video/x-matroska",
    "application/pdf",
    "application/postscript",
    "image/vnd.adobe.photoshop",
];

/// Extensions the generation pipeline produces thumbnails for
const THUMBNAILABLE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff", "heic", "heif", "svg", "mp4",
    "mov", "webm", "avi", "mkv", "pdf", "ai", "eps", "psd",
];

/// Image formats the pipeline cannot decode yet, regardless of allowlists
const UNSUPPORTED_MIME_TYPES: &[&str] = &["image/avif"];
const UNSUPPORTED_EXTENSIONS: &[&str] = &["avif"];

/// Decide whether a thumbnail is ever expected for this file type.
///
/// The MIME type wins when both inputs are present. Missing or empty
/// inputs on both sides yield `false`.
pub fn is_thumbnailable(mime: Option<&str>, extension: Option<&str>) -> bool {
    let mime = mime.map(normalize_mime).filter(|m| !m.is_empty());
    let extension = extension.map(normalize_extension).filter(|e| !e.is_empty());

    if is_known_unsupported(mime.as_deref(), extension.as_deref()) {
        return false;
    }

    match (mime, extension) {
        (Some(mime), _) => THUMBNAILABLE_MIME_TYPES.contains(&mime.as_str()),
        (None, Some(ext)) => THUMBNAILABLE_EXTENSIONS.contains(&ext.as_str()),
        (None, None) => false,
    }
}

fn is_known_unsupported(mime: Option<&str>, extension: Option<&str>) -> bool {
    mime.is_some_and(|m| UNSUPPORTED_MIME_TYPES.contains(&m))
        || extension.is_some_and(|e| UNSUPPORTED_EXTENSIONS.contains(&e))
}

/// `Image/JPEG; charset=binary` -> `image/jpeg`
fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// `.JPG` -> `jpg`
fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_images_are_thumbnailable() {
        assert!(is_thumbnailable(Some("image/jpeg"), None));
        assert!(is_thumbnailable(Some("image/png"), Some("png")));
        assert!(is_thumbnailable(None, Some("JPG")));
        assert!(is_thumbnailable(None, Some(".webp")));
    }

    #[test]
    fn test_mime_preferred_over_extension() {
        // A text file with a misleading extension stays unsupported
        assert!(!is_thumbnailable(Some("text/plain"), Some("png")));
        assert!(is_thumbnailable(Some("video/mp4"), Some("bin")));
    }

    #[test]
    fn test_mime_parameters_ignored() {
        assert!(is_thumbnailable(Some(" Image/PNG; charset=binary"), None));
    }

    #[test]
    fn test_avif_is_never_thumbnailable() {
        assert!(!is_thumbnailable(Some("image/avif"), None));
        assert!(!is_thumbnailable(None, Some("avif")));
        assert!(!is_thumbnailable(Some("image/avif"), Some("jpg")));
    }

    #[test]
    fn test_missing_inputs() {
        assert!(!is_thumbnailable(None, None));
        assert!(!is_thumbnailable(Some(""), Some("  ")));
    }

    #[test]
    fn test_empty_mime_falls_back_to_extension() {
        assert!(is_thumbnailable(Some(""), Some("pdf")));
    }

    #[test]
    fn test_unknown_types() {
        assert!(!is_thumbnailable(Some("application/zip"), None));
        assert!(!is_thumbnailable(None, Some("exe")));
    }
}
