//! A plain capacity-bounded receiver

use crate::config::clamp_efficiency;
use crate::value::{read_clamped, Record};
use crate::EnergyTransferDevice;

/// Any device that accepts charge without relaying it further
#[derive(Debug, Clone, PartialEq)]
pub struct GenericReceiver {
    charge: u32,
    capacity: u32,
    efficiency: f32,
    is_sending: bool,
    is_receiving: bool,
}

impl GenericReceiver {
    /// Create an empty, lossless receiver
    pub fn new(capacity: u32) -> Self {
        Self {
            charge: 0,
            capacity,
            efficiency: 1.0,
            is_sending: false,
            is_receiving: false,
        }
    }

    /// Set the receiver's own efficiency, clamped to `[0, 1]`
    pub fn with_efficiency(mut self, efficiency: f32) -> Self {
        self.efficiency = clamp_efficiency(efficiency);
        self
    }

    /// Set the starting charge, clamped to capacity
    pub fn with_charge(mut self, charge: u32) -> Self {
        self.charge = charge.min(self.capacity);
        self
    }

    pub fn serialize(&self) -> Record {
        let mut record = Record::new();
        record.insert("charge".into(), self.charge.into());
        record
    }

    pub fn restore(&mut self, record: &Record) {
        self.charge = read_clamped(record, "charge", self.capacity);
    }
}

impl EnergyTransferDevice for GenericReceiver {
    fn charge(&self) -> u32 {
        self.charge
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn fill(&mut self, amount: u32) -> u32 {
        let room = self.capacity - self.charge;
        let stored = amount.min(room);
        self.charge += stored;
        amount - stored
    }

    fn drain(&mut self, amount: u32) -> u32 {
        let drained = amount.min(self.charge);
        self.charge -= drained;
        drained
    }

    fn can_receive(&self) -> bool {
        self.charge < self.capacity
    }

    fn send_limit(&self) -> u32 {
        0
    }

    fn receive_limit(&self) -> u32 {
        self.capacity - self.charge
    }

    fn efficiency(&self) -> f32 {
        self.efficiency
    }

    fn is_sending(&self) -> bool {
        self.is_sending
    }

    fn set_sending(&mut self, sending: bool) {
        self.is_sending = sending;
    }

    fn is_receiving(&self) -> bool {
        self.is_receiving
    }

    fn set_receiving(&mut self, receiving: bool) {
        if receiving {
            self.is_sending = false;
        }
        self.is_receiving = receiving;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::testing::{assert_drain_bounded, assert_fill_conserves};
    use crate::Value;

    #[test]
    fn test_fill_overfill() {
        let mut receiver = GenericReceiver::new(128).with_charge(120);
        assert_eq!(receiver.fill(16), 8);
        assert_eq!(receiver.charge(), 128);
        assert!(!receiver.can_receive());
        assert_eq!(receiver.receive_limit(), 0);
    }

    #[test]
    fn test_contracts() {
        let mut receiver = GenericReceiver::new(32).with_charge(10);
        assert_fill_conserves(&mut receiver, 50);
        assert_drain_bounded(&mut receiver, 40);
        assert_drain_bounded(&mut receiver, 5);
    }

    #[test]
    fn test_receiving_clears_sending() {
        let mut receiver = GenericReceiver::new(8);
        receiver.set_sending(true);
        receiver.set_receiving(true);
        assert!(!receiver.is_sending());
        assert!(receiver.is_receiving());
    }

    #[test]
    fn test_restore_clamps() {
        let mut receiver = GenericReceiver::new(64);
        let mut record = Record::new();
        record.insert("charge".into(), Value::Int(100));
        receiver.restore(&record);
        assert_eq!(receiver.charge(), 64);
        assert_eq!(receiver.serialize().get("charge"), Some(&Value::Int(64)));
    }
}
