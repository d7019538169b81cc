//! # Location Tracker
//!
//! Subscribes to platform location updates, caches the latest fix and turns
//! provider events into user notifications and log lines.
//!
//! ## Threading
//!
//! The platform may deliver callbacks on any thread. Position, latch and
//! subscription ids share one mutex; sinks are always called after it is
//! released, so a sink may call back into the tracker.
//!
//! ## Re-subscription
//!
//! With `resubscribe_on_provider_disabled` set, a disabled provider does not
//! re-enter `init()` from inside the callback. A request is queued instead
//! and the owner drains the queue with
//! [`LocationTracker::process_pending_resubscribes`], which coalesces any
//! number of requests into a single re-subscription.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, info, warn};

use crate::{
    LocationCallbacks, LocationPlatform, LogSink, NotificationSink, Permission, Position,
    ProviderStatus, Result, StatusLatch, SubscriptionId, TrackerConfig, TrackerError,
};

/// Request code attached to permission requests.
pub const PERMISSION_REQUEST_CODE: u32 = 1;

/// A queued re-subscription, raised when a provider is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResubscribeRequest {
    pub provider: String,
}

// ============================================================================
// Shared State
// ============================================================================

#[derive(Debug, Default)]
struct TrackerState {
    current: Option<Position>,
    latch: StatusLatch,
    subscriptions: Vec<SubscriptionId>,
}

struct TrackerShared {
    config: TrackerConfig,
    platform: Arc<dyn LocationPlatform>,
    notifier: Arc<dyn NotificationSink>,
    log_sink: Arc<dyn LogSink>,
    state: Mutex<TrackerState>,
    resubscribe_tx: Sender<ResubscribeRequest>,
}

impl TrackerShared {
    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Toast plus log line.
    fn announce(&self, text: &str, log_line: &str) {
        self.notifier.show(text, self.config.notification_duration);
        self.log_sink.write(log_line);
    }
}

impl LocationCallbacks for TrackerShared {
    fn on_position(&self, fix: Position) {
        debug!(
            "[LocationTracker] Fix from {}: {:.6}, {:.6}",
            fix.provider, fix.latitude, fix.longitude
        );
        self.state().current = Some(fix);
    }

    fn on_status(&self, provider: &str, status_code: i32) {
        let status = ProviderStatus::from_code(status_code);
        let announce = self.state().latch.observe(status);

        if let Some(condition) = status.condition(provider) {
            warn!("[LocationTracker] {}", condition);
        }

        if announce {
            self.announce(
                &format!("Location provider '{}' status: {}", provider, status.label()),
                &format!(
                    "onStatusChanged: provider={} status={}",
                    provider, status_code
                ),
            );
        } else {
            debug!(
                "[LocationTracker] Suppressed repeated {} for '{}'",
                status, provider
            );
        }
    }

    fn on_provider_enabled(&self, provider: &str) {
        info!("[LocationTracker] Provider '{}' enabled", provider);
        self.announce(
            &format!("Location provider '{}' enabled", provider),
            &format!("onProviderEnabled: provider={}", provider),
        );
    }

    fn on_provider_disabled(&self, provider: &str) {
        info!("[LocationTracker] Provider '{}' disabled", provider);
        self.announce(
            &format!("Location provider '{}' disabled", provider),
            &format!("onProviderDisabled: provider={}", provider),
        );

        if self.config.resubscribe_on_provider_disabled {
            let request = ResubscribeRequest {
                provider: provider.to_string(),
            };
            // The receiver lives as long as the tracker; a send error only
            // means the tracker is being dropped.
            if self.resubscribe_tx.send(request).is_err() {
                debug!("[LocationTracker] Tracker gone, dropping re-subscribe request");
            }
        }
    }
}

// ============================================================================
// Listener
// ============================================================================

/// Callback handle given to the platform.
///
/// Holds the tracker weakly: events arriving after the tracker is dropped
/// are ignored, and platform-held listeners never keep it alive.
#[derive(Clone)]
pub struct TrackerListener {
    shared: Weak<TrackerShared>,
}

impl TrackerListener {
    fn with_shared<F: FnOnce(&TrackerShared)>(&self, f: F) {
        match self.shared.upgrade() {
            Some(shared) => f(&shared),
            None => debug!("[LocationTracker] Event after tracker dropped, ignoring"),
        }
    }
}

impl LocationCallbacks for TrackerListener {
    fn on_position(&self, fix: Position) {
        self.with_shared(|s| s.on_position(fix));
    }

    fn on_status(&self, provider: &str, status_code: i32) {
        self.with_shared(|s| s.on_status(provider, status_code));
    }

    fn on_provider_enabled(&self, provider: &str) {
        self.with_shared(|s| s.on_provider_enabled(provider));
    }

    fn on_provider_disabled(&self, provider: &str) {
        self.with_shared(|s| s.on_provider_disabled(provider));
    }
}

// ============================================================================
// Location Tracker
// ============================================================================

/// Permission-gated location subscription with a single-slot fix cache.
pub struct LocationTracker {
    shared: Arc<TrackerShared>,
    resubscribe_rx: Mutex<Receiver<ResubscribeRequest>>,
}

impl LocationTracker {
    /// Create a tracker bound to the given platform and sinks.
    ///
    /// Nothing is requested from the platform until [`init`](Self::init).
    pub fn new(
        config: TrackerConfig,
        platform: Arc<dyn LocationPlatform>,
        notifier: Arc<dyn NotificationSink>,
        log_sink: Arc<dyn LogSink>,
    ) -> Result<Self> {
        config.validate()?;
        let (resubscribe_tx, resubscribe_rx) = mpsc::channel();

        Ok(Self {
            shared: Arc::new(TrackerShared {
                config,
                platform,
                notifier,
                log_sink,
                state: Mutex::new(TrackerState::default()),
                resubscribe_tx,
            }),
            resubscribe_rx: Mutex::new(resubscribe_rx),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.shared.config
    }

    /// Callback handle for the platform (or a host forwarding its events).
    pub fn listener(&self) -> TrackerListener {
        TrackerListener {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Request permission if needed, then register a location subscription.
    ///
    /// Every call registers a new subscription; calling twice leaves two
    /// live subscriptions until [`stop`](Self::stop). The permission request
    /// is not awaited, so the registration may be refused by the platform;
    /// such failures are logged, never returned.
    pub fn init(&self) {
        let shared = &self.shared;
        let permission = Permission::FineLocation;

        if !shared.platform.has_permission(permission) {
            let condition = TrackerError::PermissionDenied {
                permission: permission.to_string(),
            };
            info!("[LocationTracker] {}, requesting it", condition);
            shared
                .platform
                .request_permission(permission, PERMISSION_REQUEST_CODE);
        }

        let request = shared.config.update_request();
        let listener: Arc<dyn LocationCallbacks> = Arc::new(self.listener());

        match shared.platform.request_location_updates(&request, listener) {
            Ok(id) => {
                let live = {
                    let mut state = shared.state();
                    state.subscriptions.push(id);
                    state.subscriptions.len()
                };
                info!(
                    "[LocationTracker] Subscribed to '{}' ({} ms / {} m), {} live subscription(s)",
                    request.provider,
                    request.min_interval_millis,
                    request.min_displacement_meters,
                    live
                );
            }
            Err(e) => warn!(
                "[LocationTracker] Subscribing to '{}' failed: {}",
                request.provider, e
            ),
        }
    }

    /// Remove every subscription registered by this tracker.
    ///
    /// The cached fix is kept.
    pub fn stop(&self) {
        let subscriptions = std::mem::take(&mut self.shared.state().subscriptions);
        if subscriptions.is_empty() {
            return;
        }

        for id in &subscriptions {
            if let Err(e) = self.shared.platform.remove_updates(*id) {
                warn!(
                    "[LocationTracker] Removing subscription {:?} failed: {}",
                    id, e
                );
            }
        }
        info!(
            "[LocationTracker] Removed {} subscription(s)",
            subscriptions.len()
        );
    }

    /// The most recent fix, or `None` if none has arrived yet.
    pub fn get_location(&self) -> Option<Position> {
        self.shared.state().current.clone()
    }

    /// Number of subscriptions registered and not yet removed.
    pub fn subscription_count(&self) -> usize {
        self.shared.state().subscriptions.len()
    }

    /// Last status seen by the latch.
    pub fn last_status(&self) -> Option<ProviderStatus> {
        self.shared.state().latch.last()
    }

    /// Drain queued re-subscribe requests.
    ///
    /// Any number of pending requests results in one re-subscription:
    /// existing subscriptions are removed, then [`init`](Self::init) runs
    /// once. Returns the number of re-subscriptions performed (0 or 1).
    pub fn process_pending_resubscribes(&self) -> usize {
        let pending: Vec<ResubscribeRequest> = self
            .resubscribe_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_iter()
            .collect();

        if pending.is_empty() {
            return 0;
        }

        info!(
            "[LocationTracker] Re-subscribing after {} disable event(s) (last: '{}')",
            pending.len(),
            pending[pending.len() - 1].provider
        );
        self.stop();
        self.init();
        1
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NotificationDuration, UpdateRequest};
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct FakePlatform {
        granted: bool,
        next_id: AtomicU64,
        requests: Mutex<Vec<UpdateRequest>>,
        permission_requests: Mutex<Vec<(Permission, u32)>>,
        removed: Mutex<Vec<SubscriptionId>>,
    }

    impl LocationPlatform for FakePlatform {
        fn has_permission(&self, _permission: Permission) -> bool {
            self.granted
        }

        fn request_permission(&self, permission: Permission, request_code: u32) {
            self.permission_requests
                .lock()
                .unwrap()
                .push((permission, request_code));
        }

        fn request_location_updates(
            &self,
            request: &UpdateRequest,
            _listener: Arc<dyn LocationCallbacks>,
        ) -> Result<SubscriptionId> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst)))
        }

        fn remove_updates(&self, subscription: SubscriptionId) -> Result<()> {
            self.removed.lock().unwrap().push(subscription);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder {
        toasts: Mutex<Vec<String>>,
        lines: Mutex<Vec<String>>,
    }

    impl NotificationSink for Recorder {
        fn show(&self, text: &str, _duration: NotificationDuration) {
            self.toasts.lock().unwrap().push(text.to_string());
        }
    }

    impl LogSink for Recorder {
        fn write(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }

    fn tracker(
        config: TrackerConfig,
        granted: bool,
    ) -> (LocationTracker, Arc<FakePlatform>, Arc<Recorder>) {
        let platform = Arc::new(FakePlatform {
            granted,
            ..Default::default()
        });
        let recorder = Arc::new(Recorder::default());
        let tracker =
            LocationTracker::new(config, platform.clone(), recorder.clone(), recorder.clone())
                .unwrap();
        (tracker, platform, recorder)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let platform = Arc::new(FakePlatform::default());
        let recorder = Arc::new(Recorder::default());
        let mut config = TrackerConfig::default();
        config.provider = String::new();
        let result = LocationTracker::new(config, platform, recorder.clone(), recorder);
        assert!(matches!(result, Err(TrackerError::Config { .. })));
    }

    #[test]
    fn test_no_location_before_first_fix() {
        let (tracker, _, _) = tracker(TrackerConfig::default(), true);
        tracker.init();
        assert!(tracker.get_location().is_none());
    }

    #[test]
    fn test_init_uses_configured_request() {
        let (tracker, platform, _) = tracker(TrackerConfig::throttled(), true);
        tracker.init();

        let requests = platform.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], TrackerConfig::throttled().update_request());
        assert!(platform.permission_requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_permission_requested_then_subscribes() {
        let (tracker, platform, _) = tracker(TrackerConfig::default(), false);
        tracker.init();

        assert_eq!(
            *platform.permission_requests.lock().unwrap(),
            vec![(Permission::FineLocation, PERMISSION_REQUEST_CODE)]
        );
        assert_eq!(platform.requests.lock().unwrap().len(), 1);
        assert_eq!(tracker.subscription_count(), 1);
    }

    #[test]
    fn test_last_fix_wins() {
        let (tracker, _, _) = tracker(TrackerConfig::default(), true);
        let listener = tracker.listener();
        listener.on_position(Position::new(1.0, 1.0));
        listener.on_position(Position::new(2.0, 2.0));
        assert_eq!(tracker.get_location(), Some(Position::new(2.0, 2.0)));
    }

    #[test]
    fn test_status_texts() {
        let (tracker, _, recorder) = tracker(TrackerConfig::default(), true);
        tracker.listener().on_status("gps", 9);

        assert_eq!(
            *recorder.toasts.lock().unwrap(),
            vec!["Location provider 'gps' status: no valid state found".to_string()]
        );
        assert_eq!(
            *recorder.lines.lock().unwrap(),
            vec!["onStatusChanged: provider=gps status=9".to_string()]
        );
        assert_eq!(tracker.last_status(), Some(ProviderStatus::Unknown(9)));
    }

    #[test]
    fn test_stop_removes_subscriptions() {
        let (tracker, platform, _) = tracker(TrackerConfig::default(), true);
        tracker.init();
        tracker.init();
        tracker.listener().on_position(Position::new(3.0, 4.0));
        tracker.stop();

        assert_eq!(tracker.subscription_count(), 0);
        assert_eq!(
            *platform.removed.lock().unwrap(),
            vec![SubscriptionId(0), SubscriptionId(1)]
        );
        assert!(tracker.get_location().is_some());

        // Nothing left to remove
        tracker.stop();
        assert_eq!(platform.removed.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_disabled_queues_without_reentering_init() {
        let (tracker, platform, _) = tracker(TrackerConfig::every_fix(), true);
        tracker.init();
        tracker.listener().on_provider_disabled("gps");

        // Only the explicit init so far
        assert_eq!(platform.requests.lock().unwrap().len(), 1);
        assert_eq!(tracker.process_pending_resubscribes(), 1);
        assert_eq!(platform.requests.lock().unwrap().len(), 2);
        assert_eq!(tracker.subscription_count(), 1);
        assert_eq!(tracker.process_pending_resubscribes(), 0);
    }

    #[test]
    fn test_listener_outlives_tracker() {
        let (tracker, _, recorder) = tracker(TrackerConfig::default(), true);
        let listener = tracker.listener();
        drop(tracker);

        listener.on_provider_enabled("gps");
        listener.on_position(Position::new(0.0, 0.0));
        assert!(recorder.toasts.lock().unwrap().is_empty());
    }
}
