//! FFI bindings for mobile platforms (iOS/Android).
//!
//! This module provides the UniFFI bindings that let a Kotlin or Swift host
//! drive a [`LocationTracker`]. The host implements the callback interfaces
//! below for permissions, subscriptions, toasts and logging, and forwards
//! its platform location listener events to the `on_*` methods of
//! [`FfiLocationTracker`].

use std::sync::Arc;

use log::{debug, info};

use crate::{
    init_logging, LocationCallbacks, LocationPlatform, LocationTracker, LogSink,
    NotificationDuration, NotificationSink, Permission, Position, Result, SubscriptionId,
    TrackerConfig, TrackerError, UpdateRequest,
};

// ============================================================================
// Callback Interfaces
// ============================================================================

/// The host's location service and permission gate.
/// Implement this in Kotlin/Swift on top of the platform location manager.
#[uniffi::export(callback_interface)]
pub trait HostLocationService: Send + Sync {
    /// Whether the app currently holds `permission`.
    fn has_permission(&self, permission: Permission) -> bool;
    /// Ask the user for `permission`. The result is not reported back.
    fn request_permission(&self, permission: Permission, request_code: u32);
    /// Register the host's listener for `request`.
    /// Returns a subscription id, or None if the platform refused.
    fn request_location_updates(&self, request: UpdateRequest) -> Option<u64>;
    fn remove_updates(&self, subscription_id: u64);
}

/// Transient on-screen notifications (toasts).
#[uniffi::export(callback_interface)]
pub trait HostNotifier: Send + Sync {
    fn show(&self, text: String, duration: NotificationDuration);
}

/// Append-only event log owned by the host.
#[uniffi::export(callback_interface)]
pub trait HostLogSink: Send + Sync {
    fn write(&self, line: String);
}

// ============================================================================
// Adapters
// ============================================================================

struct HostPlatform(Box<dyn HostLocationService>);

impl LocationPlatform for HostPlatform {
    fn has_permission(&self, permission: Permission) -> bool {
        self.0.has_permission(permission)
    }

    fn request_permission(&self, permission: Permission, request_code: u32) {
        self.0.request_permission(permission, request_code);
    }

    fn request_location_updates(
        &self,
        request: &UpdateRequest,
        _listener: Arc<dyn LocationCallbacks>,
    ) -> Result<SubscriptionId> {
        // Host listeners call back through FfiLocationTracker instead
        self.0
            .request_location_updates(request.clone())
            .map(SubscriptionId)
            .ok_or_else(|| TrackerError::Platform {
                message: format!("host refused updates for '{}'", request.provider),
            })
    }

    fn remove_updates(&self, subscription: SubscriptionId) -> Result<()> {
        self.0.remove_updates(subscription.0);
        Ok(())
    }
}

struct HostNotificationSink(Box<dyn HostNotifier>);

impl NotificationSink for HostNotificationSink {
    fn show(&self, text: &str, duration: NotificationDuration) {
        self.0.show(text.to_string(), duration);
    }
}

struct HostLog(Box<dyn HostLogSink>);

impl LogSink for HostLog {
    fn write(&self, line: &str) {
        self.0.write(line.to_string());
    }
}

// ============================================================================
// Tracker Object
// ============================================================================

/// A location tracker owned by the mobile host.
#[derive(uniffi::Object)]
pub struct FfiLocationTracker {
    tracker: LocationTracker,
}

#[uniffi::export]
impl FfiLocationTracker {
    /// Create a tracker. Fails only on an invalid configuration.
    #[uniffi::constructor]
    pub fn new(
        config: TrackerConfig,
        service: Box<dyn HostLocationService>,
        notifier: Box<dyn HostNotifier>,
        log_sink: Box<dyn HostLogSink>,
    ) -> std::result::Result<Arc<Self>, TrackerError> {
        init_logging();
        info!(
            "[GpsLocationRust] Creating tracker for '{}' ({} ms / {} m)",
            config.provider, config.min_interval_millis, config.min_displacement_meters
        );
        let tracker = LocationTracker::new(
            config,
            Arc::new(HostPlatform(service)),
            Arc::new(HostNotificationSink(notifier)),
            Arc::new(HostLog(log_sink)),
        )?;
        Ok(Arc::new(Self { tracker }))
    }

    /// Request permission if needed and subscribe to updates.
    pub fn init(&self) {
        self.tracker.init();
    }

    /// Remove all subscriptions created by this tracker.
    pub fn stop(&self) {
        self.tracker.stop();
    }

    /// Most recent fix, or None before the first one.
    pub fn get_location(&self) -> Option<Position> {
        self.tracker.get_location()
    }

    pub fn subscription_count(&self) -> u32 {
        saturating_u32(self.tracker.subscription_count())
    }

    /// Run queued re-subscriptions. Returns how many were performed (0 or 1).
    pub fn process_pending_resubscribes(&self) -> u32 {
        saturating_u32(self.tracker.process_pending_resubscribes())
    }

    pub fn on_location_changed(&self, position: Position) {
        self.tracker.listener().on_position(position);
    }

    pub fn on_status_changed(&self, provider: String, status: i32) {
        debug!(
            "[GpsLocationRust] Status {} from host for '{}'",
            status, provider
        );
        self.tracker.listener().on_status(&provider, status);
    }

    pub fn on_provider_enabled(&self, provider: String) {
        self.tracker.listener().on_provider_enabled(&provider);
    }

    pub fn on_provider_disabled(&self, provider: String) {
        self.tracker.listener().on_provider_disabled(&provider);
    }
}

/// Counts cross the FFI boundary as u32; larger values saturate.
fn saturating_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Get the default tracker configuration.
#[uniffi::export]
pub fn default_tracker_config() -> TrackerConfig {
    init_logging();
    TrackerConfig::default()
}

/// Parse a tracker configuration from JSON.
#[uniffi::export]
pub fn tracker_config_from_json(json: String) -> std::result::Result<TrackerConfig, TrackerError> {
    TrackerConfig::from_json(&json)
}
