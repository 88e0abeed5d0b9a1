//! Relay configuration - capacities, limits and transfer cadence
//!
//! The defaults are the reference values of the extractor: a 128 unit
//! buffer, 16 units per attempt, one attempt every 5 ticks, lossless.

use serde::{Deserialize, Serialize};

/// Default charge capacity of a source
pub const DEFAULT_CAPACITY: u32 = 128;
/// Default maximum amount moved per transfer attempt
pub const DEFAULT_SEND_LIMIT: u32 = 16;
/// Default number of ticks between transfer attempts
pub const DEFAULT_TRANSFER_INTERVAL: u64 = 5;

/// Configuration for source devices
///
/// # Example
///
/// ```
/// use ember_core::RelayConfig;
///
/// let config = RelayConfig::default();
/// assert_eq!(config.capacity(), 128);
/// assert_eq!(config.send_limit(), 16);
///
/// // Send limit never exceeds capacity
/// let config = RelayConfig::default().with_capacity(8);
/// assert_eq!(config.send_limit(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Maximum storable charge
    capacity: u32,
    /// Maximum amount drained per transfer attempt
    send_limit: u32,
    /// Ticks between transfer attempts (the gate modulus), at least 1
    transfer_interval: u64,
    /// The source's own efficiency factor, in `[0, 1]`
    efficiency: f32,
}

impl RelayConfig {
    /// Set the capacity, shrinking the send limit if needed
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self.send_limit = self.send_limit.min(capacity);
        self
    }

    /// Set the send limit, clamped to `[0, capacity]`
    pub fn with_send_limit(mut self, send_limit: u32) -> Self {
        self.send_limit = send_limit.min(self.capacity);
        self
    }

    /// Set the transfer interval, clamped to at least 1
    pub fn with_transfer_interval(mut self, interval: u64) -> Self {
        self.transfer_interval = interval.max(1);
        self
    }

    /// Set the source's own efficiency, clamped to `[0, 1]`
    ///
    /// NaN is treated as 0.
    pub fn with_efficiency(mut self, efficiency: f32) -> Self {
        self.efficiency = clamp_efficiency(efficiency);
        self
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn send_limit(&self) -> u32 {
        self.send_limit
    }

    pub fn transfer_interval(&self) -> u64 {
        self.transfer_interval
    }

    pub fn efficiency(&self) -> f32 {
        self.efficiency
    }

    /// Re-apply the clamping rules
    ///
    /// Deserialized configs bypass the builder methods; loaders call this
    /// before handing the config to devices.
    pub fn normalized(self) -> Self {
        RelayConfig::default()
            .with_capacity(self.capacity)
            .with_send_limit(self.send_limit)
            .with_transfer_interval(self.transfer_interval)
            .with_efficiency(self.efficiency)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            send_limit: DEFAULT_SEND_LIMIT,
            transfer_interval: DEFAULT_TRANSFER_INTERVAL,
            efficiency: 1.0,
        }
    }
}

/// Configuration for refill actuators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Ticks after which an active actuator returns to inactive
    ///
    /// `None` leaves the release to an external driver.
    pub stroke_ticks: Option<u64>,
}

pub(crate) fn clamp_efficiency(efficiency: f32) -> f32 {
    if efficiency.is_nan() {
        0.0
    } else {
        efficiency.clamp(0.0, 1.0)
    }
}
