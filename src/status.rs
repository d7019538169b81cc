//! # Provider Status
//!
//! Decoding of the platform's integer provider status and the latch that
//! keeps repeated "available" reports from reaching the user.
//!
//! Status codes: 0 = OUT_OF_SERVICE, 1 = TEMPORARILY_UNAVAILABLE,
//! 2 = AVAILABLE, anything else is unknown.

use std::fmt;

use crate::TrackerError;

/// Decoded provider status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    OutOfService,
    TemporarilyUnavailable,
    Available,
    /// Any code outside 0..=2, kept for logging
    Unknown(i32),
}

impl ProviderStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ProviderStatus::OutOfService,
            1 => ProviderStatus::TemporarilyUnavailable,
            2 => ProviderStatus::Available,
            other => ProviderStatus::Unknown(other),
        }
    }

    /// The raw platform code.
    pub fn code(&self) -> i32 {
        match self {
            ProviderStatus::OutOfService => 0,
            ProviderStatus::TemporarilyUnavailable => 1,
            ProviderStatus::Available => 2,
            ProviderStatus::Unknown(code) => *code,
        }
    }

    /// Text shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderStatus::OutOfService => "OUT_OF_SERVICE",
            ProviderStatus::TemporarilyUnavailable => "TEMPORARILY_UNAVAILABLE",
            ProviderStatus::Available => "AVAILABLE",
            ProviderStatus::Unknown(_) => "no valid state found",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ProviderStatus::Available)
    }

    /// Error condition this status represents, if any.
    pub fn condition(&self, provider: &str) -> Option<TrackerError> {
        match self {
            ProviderStatus::Available => None,
            ProviderStatus::Unknown(code) => Some(TrackerError::UnknownStatus {
                provider: provider.to_string(),
                code: *code,
            }),
            unavailable => Some(TrackerError::ProviderUnavailable {
                provider: provider.to_string(),
                status: unavailable.label().to_string(),
            }),
        }
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Single-slot memory of the last observed status.
///
/// Pinned while the provider is available: a repeated `Available` is
/// swallowed. Any other status unpins the latch and is always announced.
#[derive(Debug, Clone, Default)]
pub struct StatusLatch {
    last: Option<ProviderStatus>,
}

impl StatusLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `status` and return whether it should be announced.
    pub fn observe(&mut self, status: ProviderStatus) -> bool {
        let announce = !(status.is_available() && self.is_pinned());
        self.last = Some(status);
        announce
    }

    /// Whether the last observed status was `Available`.
    pub fn is_pinned(&self) -> bool {
        self.last.is_some_and(|s| s.is_available())
    }

    pub fn last(&self) -> Option<ProviderStatus> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcements(codes: &[i32]) -> Vec<bool> {
        let mut latch = StatusLatch::new();
        codes
            .iter()
            .map(|&c| latch.observe(ProviderStatus::from_code(c)))
            .collect()
    }

    #[test]
    fn test_decode() {
        assert_eq!(ProviderStatus::from_code(0), ProviderStatus::OutOfService);
        assert_eq!(
            ProviderStatus::from_code(1),
            ProviderStatus::TemporarilyUnavailable
        );
        assert_eq!(ProviderStatus::from_code(2), ProviderStatus::Available);
        assert_eq!(ProviderStatus::from_code(3), ProviderStatus::Unknown(3));
        assert_eq!(ProviderStatus::from_code(-1), ProviderStatus::Unknown(-1));
        assert_eq!(ProviderStatus::from_code(42).code(), 42);
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(ProviderStatus::from_code(9).label(), "no valid state found");
        assert_eq!(ProviderStatus::Available.to_string(), "AVAILABLE");
    }

    #[test]
    fn test_conditions() {
        assert!(ProviderStatus::Available.condition("gps").is_none());
        assert!(matches!(
            ProviderStatus::OutOfService.condition("gps"),
            Some(TrackerError::ProviderUnavailable { .. })
        ));
        assert_eq!(
            ProviderStatus::Unknown(5).condition("gps"),
            Some(TrackerError::UnknownStatus {
                provider: "gps".to_string(),
                code: 5
            })
        );
    }

    #[test]
    fn test_latch_starts_unpinned() {
        let latch = StatusLatch::new();
        assert!(!latch.is_pinned());
        assert!(latch.last().is_none());
    }

    #[test]
    fn test_repeated_available_is_suppressed() {
        assert_eq!(announcements(&[2, 2, 2]), vec![true, false, false]);
    }

    #[test]
    fn test_available_resets_between_outages() {
        assert_eq!(announcements(&[0, 2, 0]), vec![true, true, true]);
        assert_eq!(announcements(&[2, 0, 2]), vec![true, true, true]);
    }

    #[test]
    fn test_unavailable_statuses_always_announced() {
        assert_eq!(announcements(&[0, 0]), vec![true, true]);
        assert_eq!(announcements(&[1, 1, 2, 0]), vec![true, true, true, true]);
        assert_eq!(announcements(&[2, 7, 2]), vec![true, true, true]);
    }

    #[test]
    fn test_latch_tracks_last_status() {
        let mut latch = StatusLatch::new();
        latch.observe(ProviderStatus::Available);
        assert!(latch.is_pinned());
        latch.observe(ProviderStatus::Unknown(4));
        assert!(!latch.is_pinned());
        assert_eq!(latch.last(), Some(ProviderStatus::Unknown(4)));
    }
}
