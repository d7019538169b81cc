//! # Platform Collaborators
//!
//! Traits the host implements so the tracker can talk to the platform
//! location service, show transient notifications and append log lines.
//! Everything here is fire-and-forget from the tracker's point of view.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Position, Result};

// ============================================================================
// Types
// ============================================================================

/// Runtime permissions the tracker may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum Permission {
    /// Satellite-grade location access
    FineLocation,
}

impl Permission {
    /// Platform identifier of the permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::FineLocation => "ACCESS_FINE_LOCATION",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long a notification stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "lowercase")]
pub enum NotificationDuration {
    Short,
    #[default]
    Long,
}

/// Parameters of a location-update subscription.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct UpdateRequest {
    /// Provider to subscribe to (e.g. "gps")
    pub provider: String,
    /// Minimum time between updates in milliseconds
    pub min_interval_millis: u64,
    /// Minimum displacement between updates in meters
    pub min_displacement_meters: f32,
}

/// Handle of a registered subscription, issued by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

// ============================================================================
// Traits
// ============================================================================

/// Events the platform delivers for the lifetime of a subscription.
pub trait LocationCallbacks: Send + Sync {
    /// A new fix arrived.
    fn on_position(&self, fix: Position);
    /// The provider's status changed; `status_code` is the raw platform value.
    fn on_status(&self, provider: &str, status_code: i32);
    fn on_provider_enabled(&self, provider: &str);
    fn on_provider_disabled(&self, provider: &str);
}

/// The platform location service plus its permission gate.
pub trait LocationPlatform: Send + Sync {
    /// Whether the host currently holds `permission`.
    fn has_permission(&self, permission: Permission) -> bool;

    /// Ask the host to request `permission` from the user. The outcome is
    /// never reported back to the tracker.
    fn request_permission(&self, permission: Permission, request_code: u32);

    /// Register `listener` for updates matching `request`.
    fn request_location_updates(
        &self,
        request: &UpdateRequest,
        listener: Arc<dyn LocationCallbacks>,
    ) -> Result<SubscriptionId>;

    /// Tear down a subscription previously returned by `request_location_updates`.
    fn remove_updates(&self, subscription: SubscriptionId) -> Result<()>;
}

/// User-facing transient notifications (toasts).
pub trait NotificationSink: Send + Sync {
    fn show(&self, text: &str, duration: NotificationDuration);
}

/// Append-only event log.
pub trait LogSink: Send + Sync {
    fn write(&self, line: &str);
}
