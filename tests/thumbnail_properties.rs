use assetdeck::models::{Asset, ProcessingStatus};
use assetdeck::thumbnail::{
    MAX_RETRIES, ThumbnailState, TransitionDetector, UrlSource, resolve, version_of,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn status() -> impl Strategy<Value = Option<ProcessingStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(ProcessingStatus::Pending)),
        Just(Some(ProcessingStatus::Processing)),
        Just(Some(ProcessingStatus::Completed)),
        Just(Some(ProcessingStatus::Failed)),
        Just(Some(ProcessingStatus::Skipped)),
    ]
}

fn url(names: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        proptest::sample::select(names).prop_map(|s| Some(s.to_string())),
    ]
}

const MIME_TYPES: &[&str] = &[
    "",
    "image/jpeg",
    "IMAGE/PNG",
    "image/avif",
    "video/mp4",
    "application/pdf",
    "text/plain",
    "application/zip",
];

const EXTENSIONS: &[&str] = &["", "jpg", ".PNG", "avif", "mov", "txt", "zip"];

fn mime() -> impl Strategy<Value = Option<String>> {
    proptest::sample::select(MIME_TYPES).prop_map(|m| (!m.is_empty()).then(|| m.to_string()))
}

fn extension() -> impl Strategy<Value = Option<String>> {
    proptest::sample::select(EXTENSIONS).prop_map(|e| (!e.is_empty()).then(|| e.to_string()))
}

prop_compose! {
    fn asset()(
        id in "[a-z]{1,4}",
        mime_type in mime(),
        file_extension in extension(),
        processing_status in status(),
        final_image_url in url(&["f1", "f2"]),
        temporary_image_url in url(&["t1", "t2"]),
        legacy_image_url in url(&["l1"]),
        created in proptest::option::of(0i64..3),
    ) -> Asset {
        Asset {
            id,
            mime_type,
            file_extension,
            processing_status,
            final_image_url,
            temporary_image_url,
            legacy_image_url,
            created_at: created.and_then(|d| Utc.timestamp_opt(1_700_000_000 + d, 0).single()),
            ..Asset::default()
        }
    }
}

proptest! {
    #[test]
    fn prop_final_url_is_authoritative(mut asset in asset(), final_url in "[a-z]{1,3}") {
        asset.mime_type = Some("image/jpeg".to_string());
        asset.file_extension = None;
        asset.final_image_url = Some(final_url.clone());

        let resolved = resolve(&asset, 0);
        prop_assert_eq!(resolved.state, ThumbnailState::Available);
        prop_assert_eq!(resolved.url, Some(final_url));
        prop_assert_eq!(resolved.source, Some(UrlSource::Final));
    }

    #[test]
    fn prop_temporary_url_means_pending(
        mut asset in asset(),
        temporary in "[a-z]{1,3}",
        empty_final in any::<bool>(),
    ) {
        prop_assume!(!matches!(
            asset.processing_status,
            Some(ProcessingStatus::Failed | ProcessingStatus::Skipped)
        ));
        asset.mime_type = None;
        asset.file_extension = Some("png".to_string());
        asset.final_image_url = empty_final.then(String::new);
        asset.temporary_image_url = Some(temporary.clone());

        let resolved = resolve(&asset, 0);
        prop_assert_eq!(resolved.state, ThumbnailState::Pending);
        prop_assert_eq!(resolved.url.clone(), Some(temporary));
        prop_assert!(resolved.has_temporary_preview());
    }

    #[test]
    fn prop_excluded_types_are_never_supported(mut asset in asset(), via_mime in any::<bool>()) {
        if via_mime {
            asset.mime_type = Some("image/avif".to_string());
        } else {
            asset.mime_type = None;
            asset.file_extension = Some("avif".to_string());
        }

        let resolved = resolve(&asset, 0);
        prop_assert_eq!(resolved.state, ThumbnailState::NotSupported);
        prop_assert_eq!(resolved.url, None);
        prop_assert!(!resolved.can_retry);
    }

    #[test]
    fn prop_equal_versions_resolve_equally(a in asset(), b in asset(), retries in 0u32..4) {
        if version_of(&a) == version_of(&b) {
            prop_assert_eq!(resolve(&a, retries), resolve(&b, retries));
        }
    }

    #[test]
    fn prop_version_ignores_unrelated_fields(a in asset(), name in "[a-z ]{0,12}") {
        let mut b = a.clone();
        b.id.push('x');
        b.name = Some(name);
        prop_assert_eq!(version_of(&a), version_of(&b));
        prop_assert_eq!(resolve(&a, 1), resolve(&b, 1));
    }

    #[test]
    fn prop_retry_iff_failed_under_budget(asset in asset(), retries in 0u32..6) {
        let resolved = resolve(&asset, retries);
        prop_assert_eq!(
            resolved.can_retry,
            resolved.state == ThumbnailState::Failed && retries < MAX_RETRIES
        );
    }

    #[test]
    fn prop_detector_animates_once_per_qualifying_transition(
        states in proptest::collection::vec(
            prop_oneof![
                Just(ThumbnailState::NotSupported),
                Just(ThumbnailState::Pending),
                Just(ThumbnailState::Failed),
                Just(ThumbnailState::Skipped),
                Just(ThumbnailState::Available),
            ],
            1..12,
        )
    ) {
        let mut detector = TransitionDetector::new();
        prop_assert!(!detector.observe("a", states[0]));

        for pair in states.windows(2) {
            let expected = pair[0] != ThumbnailState::Available
                && pair[1] == ThumbnailState::Available;
            prop_assert_eq!(detector.observe("a", pair[1]), expected);
            // Re-render with unchanged state never re-signals
            prop_assert!(!detector.observe("a", pair[1]));
        }
    }

    #[test]
    fn prop_detector_never_animates_on_first_observation(
        before in prop_oneof![Just(ThumbnailState::Pending), Just(ThumbnailState::Failed)],
        id in "[a-z]{1,6}",
    ) {
        let mut detector = TransitionDetector::new();
        detector.observe("previous", before);
        let new_id = format!("new-{id}");
        prop_assert!(!detector.observe(&new_id, ThumbnailState::Available));
    }
}
