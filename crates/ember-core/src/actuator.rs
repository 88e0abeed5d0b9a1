//! Refill actuator - the piston that tops up a drained source

use crate::value::{read_flag, Record};
use crate::{ActuatorConfig, Tick};

/// A mechanical device engaged to replenish a source's upstream supply
///
/// Sources only query and trigger it; it is never owned by them and is
/// resolved fresh (by relative position) each time it is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefillActuator {
    active: bool,
    /// Ticks spent active since the last activation
    active_for: Tick,
    config: ActuatorConfig,
}

impl RefillActuator {
    pub fn new(config: ActuatorConfig) -> Self {
        Self {
            active: false,
            active_for: 0,
            config,
        }
    }

    pub fn config(&self) -> ActuatorConfig {
        self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// A refill may only be requested while disengaged
    pub fn can_refill(&self) -> bool {
        !self.active
    }

    /// Engage the actuator; a no-op if it is already active
    pub fn activate(&mut self) {
        if !self.active {
            self.active = true;
            self.active_for = 0;
        }
    }

    /// Return to inactive (the end of a stroke)
    pub fn release(&mut self) {
        self.active = false;
        self.active_for = 0;
    }

    /// Advance the stroke timer; returns `true` when this tick released it
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active_for += 1;
        match self.config.stroke_ticks {
            Some(stroke) if self.active_for >= stroke => {
                self.release();
                true
            }
            _ => false,
        }
    }

    pub fn serialize(&self) -> Record {
        let mut record = Record::new();
        record.insert("active".into(), self.active.into());
        record
    }

    pub fn restore(&mut self, record: &Record) {
        self.active = read_flag(record, "active");
        self.active_for = 0;
    }
}
