//! Version signal for memoizing thumbnail resolution.

use super::classify::is_thumbnailable;
use crate::models::Asset;

/// ASCII unit separator, not expected inside URLs or timestamps
const SEPARATOR: char = '\u{1f}';

/// Opaque token over every field that influences thumbnail display.
///
/// Equal signals imply [`resolve`](super::resolve) yields equal results for
/// the same retry count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSignal(String);

impl VersionSignal {
    /// Raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the version signal of an asset
pub fn version_of(asset: &Asset) -> VersionSignal {
    let supported = if is_thumbnailable(asset.mime(), asset.extension()) {
        "1"
    } else {
        "0"
    };
    let status = asset
        .processing_status
        .map_or("", |status| status.as_str());
    let timestamp = asset
        .best_timestamp()
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_default();

    let parts = [
        supported,
        asset.final_url().unwrap_or_default(),
        asset.temporary_url().unwrap_or_default(),
        asset.legacy_url().unwrap_or_default(),
        status,
        timestamp.as_str(),
    ];

    let mut token = String::with_capacity(parts.iter().map(|p| p.len() + 1).sum());
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            token.push(SEPARATOR);
        }
        token.push_str(part);
    }
    VersionSignal(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessingStatus;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_same_fields_same_signal() {
        let a = Asset::new("a").with_mime("image/png").with_final_url("f");
        let b = Asset::new("b").with_mime("image/png").with_final_url("f");
        assert_eq!(version_of(&a), version_of(&b));
    }

    #[test]
    fn test_url_change_changes_signal() {
        let before = Asset::new("a")
            .with_mime("image/jpeg")
            .with_status(ProcessingStatus::Processing)
            .with_temporary_url("t1");
        let after = before.clone().with_final_url("f1");
        assert_ne!(version_of(&before), version_of(&after));
    }

    #[test]
    fn test_empty_equals_missing() {
        let a = Asset::new("a").with_mime("image/png").with_final_url("");
        let b = Asset::new("a").with_mime("image/png");
        assert_eq!(version_of(&a), version_of(&b));
    }

    #[test]
    fn test_modified_at_preferred_over_created_at() {
        let mut a = Asset::new("a").with_mime("image/png");
        a.created_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let before = version_of(&a);
        a.last_modified_at = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        let after = version_of(&a);
        assert_ne!(before, after);
        assert!(after.as_str().contains("2024-02-01"));
        assert!(!after.as_str().contains("2024-01-01"));
    }

    #[test]
    fn test_fields_cannot_bleed_into_each_other() {
        let a = Asset::new("a").with_mime("image/png").with_final_url("x");
        let b = Asset::new("a").with_mime("image/png").with_temporary_url("x");
        assert_ne!(version_of(&a), version_of(&b));
    }

    #[test]
    fn test_classification_is_part_of_signal() {
        let png = Asset::new("a").with_mime("image/png").with_final_url("f");
        let avif = Asset::new("a").with_mime("image/avif").with_final_url("f");
        assert_ne!(version_of(&png), version_of(&avif));
    }
}
