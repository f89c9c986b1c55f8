//! Media categories for fallback icons

use serde::{Deserialize, Serialize};

/// Broad media category of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still images
    Image,
    /// Video files
    Video,
    /// Audio files
    Audio,
    /// PDFs, office documents, text
    Document,
    /// Zip and friends
    Archive,
    /// Anything else
    #[default]
    Other,
}

impl MediaKind {
    /// Detect the category from MIME type, falling back to extension
    pub fn detect(mime: Option<&str>, extension: Option<&str>) -> Self {
        if let Some(mime) = mime {
            let mime = mime.trim().to_lowercase();
            let top = mime.split('/').next().unwrap_or_default();
            match top {
                "image" => return Self::Image,
                "video" => return Self::Video,
                "audio" => return Self::Audio,
                "text" => return Self::Document,
                _ => {}
            }
            if mime.contains("pdf") || mime.contains("officedocument") || mime.contains("msword") {
                return Self::Document;
            }
            if mime.contains("zip") || mime.contains("tar") || mime.contains("compressed") {
                return Self::Archive;
            }
        }

        let Some(ext) = extension else {
            return Self::Other;
        };
        match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "tif" | "tiff" | "avif" | "heic"
            | "svg" => Self::Image,
            "mp4" | "mov" | "webm" | "mkv" | "avi" => Self::Video,
            "mp3" | "wav" | "flac" | "ogg" | "m4a" => Self::Audio,
            "pdf" | "doc" | "docx" | "ppt" | "pptx" | "xls" | "xlsx" | "txt" | "md" => {
                Self::Document
            }
            "zip" | "tar" | "gz" | "7z" | "rar" => Self::Archive,
            _ => Self::Other,
        }
    }

    /// Get the emoji icon
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Image => "🖼️",
            Self::Video => "🎬",
            Self::Audio => "🎵",
            Self::Document => "📄",
            Self::Archive => "📦",
            Self::Other => "📁",
        }
    }

    /// Get the display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Document => "Document",
            Self::Archive => "Archive",
            Self::Other => "File",
        }
    }
}
