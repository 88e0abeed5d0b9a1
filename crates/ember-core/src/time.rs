//! Time system for tick-based simulation
//!
//! - `Tick` - Logical time unit (world time)
//! - `Clock` - Simulation clock with the fixed-cadence transfer gate

use serde::{Deserialize, Serialize};

/// A discrete tick identifier (logical time unit)
pub type Tick = u64;

/// Simulation clock state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clock {
    /// Current tick number
    pub tick: Tick,
}

impl Clock {
    /// Create a clock starting at a specific tick
    pub fn at(tick: Tick) -> Self {
        Self { tick }
    }

    /// Advance to the next tick, wrapping to 0 past `Tick::MAX`
    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }
}

/// Whether `tick` is a gated tick for `interval`
///
/// An interval of 0 is treated as 1 (every tick is gated).
pub fn is_gated(tick: Tick, interval: u64) -> bool {
    tick % interval.max(1) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        let mut clock = Clock::default();
        assert_eq!(clock.tick, 0);
        clock.advance();
        assert_eq!(clock.tick, 1);

        let mut clock = Clock::at(Tick::MAX);
        clock.advance();
        assert_eq!(clock.tick, 0);
    }

    #[test]
    fn test_gate() {
        let gated: Vec<Tick> = (0..16).filter(|t| is_gated(*t, 5)).collect();
        assert_eq!(gated, vec![0, 5, 10, 15]);
        assert!(is_gated(7, 0));
    }
}
