//! # GPS Location
//!
//! Permission-gated GPS location tracking for mobile hosts (iOS/Android).
//!
//! This library provides:
//! - A [`LocationTracker`] that requests fine-location permission, subscribes
//!   to the platform's location updates and caches the most recent fix
//! - Provider status decoding with a latch that suppresses repeated
//!   "available" notifications
//! - Ready-made log and notification sinks, including a CSV file logger
//!
//! ## Features
//!
//! - **`ffi`** - Enable UniFFI bindings for mobile platforms (iOS/Android)
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use gps_location::{
//!     LocationCallbacks, LocationPlatform, LocationTracker, LogCrateSink, LogNotificationSink,
//!     Permission, Position, SubscriptionId, TrackerConfig, UpdateRequest,
//! };
//!
//! struct AlwaysGranted;
//!
//! impl LocationPlatform for AlwaysGranted {
//!     fn has_permission(&self, _permission: Permission) -> bool {
//!         true
//!     }
//!     fn request_permission(&self, _permission: Permission, _request_code: u32) {}
//!     fn request_location_updates(
//!         &self,
//!         _request: &UpdateRequest,
//!         _listener: Arc<dyn LocationCallbacks>,
//!     ) -> gps_location::Result<SubscriptionId> {
//!         Ok(SubscriptionId(1))
//!     }
//!     fn remove_updates(&self, _subscription: SubscriptionId) -> gps_location::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let tracker = LocationTracker::new(
//!     TrackerConfig::default(),
//!     Arc::new(AlwaysGranted),
//!     Arc::new(LogNotificationSink),
//!     Arc::new(LogCrateSink),
//! )
//! .unwrap();
//!
//! tracker.init();
//! assert!(tracker.get_location().is_none());
//!
//! // The platform delivers fixes through the listener
//! tracker.listener().on_position(Position::new(49.0069, 8.4037));
//! assert_eq!(tracker.get_location().unwrap().latitude, 49.0069);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TrackerError};

// Tracker configuration and revision presets
pub mod config;
pub use config::TrackerConfig;

// Provider status decoding and notification latch
pub mod status;
pub use status::{ProviderStatus, StatusLatch};

// Collaborator traits the host platform implements
pub mod platform;
pub use platform::{
    LocationCallbacks, LocationPlatform, LogSink, NotificationDuration, NotificationSink,
    Permission, SubscriptionId, UpdateRequest,
};

// Ready-made sinks
pub mod sinks;
pub use sinks::{CsvFileLogSink, LogCrateSink, LogNotificationSink};

// The tracker itself
pub mod tracker;
pub use tracker::{LocationTracker, ResubscribeRequest, TrackerListener, PERMISSION_REQUEST_CODE};

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("GpsLocationRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A single location fix as delivered by the platform.
///
/// Only latitude and longitude are guaranteed; the remaining fields are
/// present when the provider reports them.
///
/// # Example
/// ```
/// use gps_location::Position;
/// let fix = Position::new(49.0069, 8.4037).with_speed(5.0);
/// assert_eq!(fix.speed_kmh(), Some(18.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude above the WGS84 ellipsoid in meters
    pub altitude: Option<f64>,
    /// Horizontal accuracy radius in meters
    pub accuracy: Option<f32>,
    /// Ground speed in m/s
    pub speed: Option<f32>,
    /// Bearing in degrees
    pub bearing: Option<f32>,
    /// Fix time as reported by the provider (Unix ms)
    pub time_millis: i64,
    /// Name of the provider that produced the fix
    pub provider: String,
}

impl Position {
    /// Create a fix with only coordinates set.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            accuracy: None,
            speed: None,
            bearing: None,
            time_millis: 0,
            provider: "gps".to_string(),
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_accuracy(mut self, accuracy: f32) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_bearing(mut self, bearing: f32) -> Self {
        self.bearing = Some(bearing);
        self
    }

    pub fn with_time_millis(mut self, time_millis: i64) -> Self {
        self.time_millis = time_millis;
        self
    }

    pub fn with_provider(mut self, provider: &str) -> Self {
        self.provider = provider.to_string();
        self
    }

    /// Check if the fix has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Ground speed in km/h, if the provider reported a speed.
    pub fn speed_kmh(&self) -> Option<f32> {
        self.speed.map(|mps| mps * 3600.0 / 1000.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
