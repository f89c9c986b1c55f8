//! Asset record as delivered by the processing pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::MediaKind;

/// Declared state of server-side thumbnail generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// Queued, generation not started
    Pending,
    /// Generation in flight
    Processing,
    /// Generation finished
    Completed,
    /// Generation failed
    Failed,
    /// Pipeline decided not to generate a thumbnail
    Skipped,
}

impl ProcessingStatus {
    /// Get status as string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Parse status from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Get emoji for status
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Pending => "⏳",
            Self::Processing => "⚙️",
            Self::Completed => "✅",
            Self::Failed => "❌",
            Self::Skipped => "⏭️",
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A digital asset.
///
/// Thumbnail-relevant fields are owned by the upstream pipeline; the
/// dashboard only ever reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Stable identifier
    pub id: String,
    /// Original file name
    #[serde(default)]
    pub name: Option<String>,
    /// MIME type (e.g. `image/jpeg`)
    #[serde(default)]
    pub mime_type: Option<String>,
    /// File extension without the leading dot
    #[serde(default)]
    pub file_extension: Option<String>,
    /// Declared generation status
    #[serde(default, deserialize_with = "lenient_status")]
    pub processing_status: Option<ProcessingStatus>,
    /// Permanent, full-quality thumbnail
    #[serde(default)]
    pub final_image_url: Option<String>,
    /// Short-lived low-quality preview
    #[serde(default)]
    pub temporary_image_url: Option<String>,
    /// Single-URL thumbnail of records predating the final/temporary split
    #[serde(default)]
    pub legacy_image_url: Option<String>,
    /// Last modification time
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_modified_at: Option<DateTime<Utc>>,
    /// Creation time
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Asset {
    /// Create an asset with only an id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the MIME type
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    /// Set the file extension
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.file_extension = Some(ext.into());
        self
    }

    /// Set the processing status
    pub fn with_status(mut self, status: ProcessingStatus) -> Self {
        self.processing_status = Some(status);
        self
    }

    /// Set the final thumbnail URL
    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_image_url = Some(url.into());
        self
    }

    /// Set the temporary preview URL
    pub fn with_temporary_url(mut self, url: impl Into<String>) -> Self {
        self.temporary_image_url = Some(url.into());
        self
    }

    /// Set the legacy thumbnail URL
    pub fn with_legacy_url(mut self, url: impl Into<String>) -> Self {
        self.legacy_image_url = Some(url.into());
        self
    }

    /// Set the file name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name shown in lists
    pub fn display_name(&self) -> &str {
        non_empty(self.name.as_deref()).unwrap_or(&self.id)
    }

    /// Final URL, treating empty as absent
    pub fn final_url(&self) -> Option<&str> {
        non_empty(self.final_image_url.as_deref())
    }

    /// Temporary URL, treating empty as absent
    pub fn temporary_url(&self) -> Option<&str> {
        non_empty(self.temporary_image_url.as_deref())
    }

    /// Legacy URL, treating empty as absent
    pub fn legacy_url(&self) -> Option<&str> {
        non_empty(self.legacy_image_url.as_deref())
    }

    /// MIME type, treating empty as absent
    pub fn mime(&self) -> Option<&str> {
        non_empty(self.mime_type.as_deref())
    }

    /// Extension, treating empty as absent
    pub fn extension(&self) -> Option<&str> {
        non_empty(self.file_extension.as_deref())
    }

    /// Most recent known timestamp
    pub fn best_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_modified_at.or(self.created_at)
    }

    /// Broad media category used for fallback icons
    pub fn media_kind(&self) -> MediaKind {
        MediaKind::detect(self.mime(), self.extension())
    }

    /// Age of the most recent timestamp ("42s", "3h", "Jan 05")
    pub fn relative_time(&self) -> Option<String> {
        let at = self.best_timestamp()?;
        let duration = Utc::now().signed_duration_since(at);

        Some(if duration.num_seconds() < 60 {
            format!("{}s", duration.num_seconds().max(0))
        } else if duration.num_minutes() < 60 {
            format!("{}m", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h", duration.num_hours())
        } else if duration.num_days() < 7 {
            format!("{}d", duration.num_days())
        } else {
            at.format("%b %d").to_string()
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Unknown status strings are treated as absent rather than rejected.
fn lenient_status<'de, D>(deserializer: D) -> Result<Option<ProcessingStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(ProcessingStatus::parse))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}
