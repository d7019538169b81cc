//! Tracker configuration.
//!
//! Update interval and displacement are tunables, not constants: the host
//! application shipped with 0 ms / 0 m, then 400 ms / 0 m, then 200 ms / 1 m.
//! The presets below reproduce those three settings.

use serde::{Deserialize, Serialize};

use crate::{NotificationDuration, Result, TrackerError, UpdateRequest};

/// Configuration for a [`crate::LocationTracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct TrackerConfig {
    /// Location provider to subscribe to.
    /// Default: "gps"
    pub provider: String,

    /// Minimum time between updates in milliseconds.
    /// Default: 200
    pub min_interval_millis: u64,

    /// Minimum displacement between updates in meters.
    /// Default: 1.0
    pub min_displacement_meters: f32,

    /// Display duration for status notifications.
    /// Default: Long
    pub notification_duration: NotificationDuration,

    /// Queue a re-subscription whenever the provider is disabled.
    /// Default: false
    pub resubscribe_on_provider_disabled: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            provider: "gps".to_string(),
            min_interval_millis: 200,
            min_displacement_meters: 1.0,
            notification_duration: NotificationDuration::Long,
            resubscribe_on_provider_disabled: false,
        }
    }
}

impl TrackerConfig {
    /// Every fix the provider produces, re-subscribing when it is disabled.
    pub fn every_fix() -> Self {
        Self {
            min_interval_millis: 0,
            min_displacement_meters: 0.0,
            resubscribe_on_provider_disabled: true,
            ..Self::default()
        }
    }

    /// At most one fix per 400 ms, no displacement filter.
    pub fn throttled() -> Self {
        Self {
            min_interval_millis: 400,
            min_displacement_meters: 0.0,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reject settings the platform would refuse.
    pub fn validate(&self) -> Result<()> {
        if self.provider.trim().is_empty() {
            return Err(TrackerError::Config {
                message: "provider must not be empty".to_string(),
            });
        }
        if !self.min_displacement_meters.is_finite() || self.min_displacement_meters < 0.0 {
            return Err(TrackerError::Config {
                message: format!(
                    "min_displacement_meters must be >= 0, got {}",
                    self.min_displacement_meters
                ),
            });
        }
        Ok(())
    }

    /// The subscription request this configuration describes.
    pub fn update_request(&self) -> UpdateRequest {
        UpdateRequest {
            provider: self.provider.clone(),
            min_interval_millis: self.min_interval_millis,
            min_displacement_meters: self.min_displacement_meters,
        }
    }
}
