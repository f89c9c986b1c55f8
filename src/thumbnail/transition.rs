//! Detects transitions worth animating.

use super::ThumbnailState;

/// Per-instance memory of the last observed thumbnail state.
///
/// Only `<anything but Available> -> Available` animates, and only when the
/// previous state was actually observed for the same asset. The first
/// observation after mount or after the slot switches to another asset
/// never animates.
#[derive(Debug, Default)]
pub struct TransitionDetector {
    asset_id: Option<String>,
    previous: Option<ThumbnailState>,
}

impl TransitionDetector {
    /// Create a detector with no history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state` for `asset_id`; returns `true` if the change should animate.
    pub fn observe(&mut self, asset_id: &str, state: ThumbnailState) -> bool {
        if self.asset_id.as_deref() != Some(asset_id) {
            if self.asset_id.is_some() {
                tracing::trace!(asset_id, "transition detector re-armed for new asset");
            }
            self.asset_id = Some(asset_id.to_string());
            self.previous = None;
        }

        let animate = matches!(self.previous, Some(prev) if prev != ThumbnailState::Available)
            && state == ThumbnailState::Available;
        self.previous = Some(state);
        animate
    }

    /// Forget everything (instance unmounted)
    pub fn reset(&mut self) {
        self.asset_id = None;
        self.previous = None;
    }

    /// Last observed state, if any
    pub const fn previous(&self) -> Option<ThumbnailState> {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ThumbnailState; 5] = [
        ThumbnailState::NotSupported,
        ThumbnailState::Pending,
        ThumbnailState::Failed,
        ThumbnailState::Skipped,
        ThumbnailState::Available,
    ];

    #[test]
    fn test_first_observation_never_animates() {
        for state in ALL {
            let mut detector = TransitionDetector::new();
            assert!(!detector.observe("a", state));
        }
    }

    #[test]
    fn test_pending_to_available_animates_once() {
        let mut detector = TransitionDetector::new();
        assert!(!detector.observe("a", ThumbnailState::Pending));
        assert!(detector.observe("a", ThumbnailState::Available));
        assert!(!detector.observe("a", ThumbnailState::Available));
        assert!(!detector.observe("a", ThumbnailState::Available));
    }

    #[test]
    fn test_only_transitions_into_available_animate() {
        for from in ALL {
            for to in ALL {
                let mut detector = TransitionDetector::new();
                detector.observe("a", from);
                let expected =
                    from != ThumbnailState::Available && to == ThumbnailState::Available;
                assert_eq!(detector.observe("a", to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_asset_change_rearms() {
        let mut detector = TransitionDetector::new();
        detector.observe("a", ThumbnailState::Pending);
        // Different asset in the same slot: its first observation is a mount
        assert!(!detector.observe("b", ThumbnailState::Available));
        assert_eq!(detector.previous(), Some(ThumbnailState::Available));
    }

    #[test]
    fn test_available_again_after_regression() {
        let mut detector = TransitionDetector::new();
        detector.observe("a", ThumbnailState::Available);
        assert!(!detector.observe("a", ThumbnailState::Pending));
        assert!(detector.observe("a", ThumbnailState::Available));
    }

    #[test]
    fn test_reset() {
        let mut detector = TransitionDetector::new();
        detector.observe("a", ThumbnailState::Pending);
        detector.reset();
        assert_eq!(detector.previous(), None);
        assert!(!detector.observe("a", ThumbnailState::Available));
    }
}
