//! The energy transfer capability shared by every relay participant

/// A device that stores charge and can take part in a relay
///
/// Implementors keep `0 <= charge() <= capacity()` at all times. Operations
/// never fail: out-of-range requests are clamped and the clamped-off part is
/// reported back to the caller.
pub trait EnergyTransferDevice {
    /// Current stored charge
    fn charge(&self) -> u32;

    /// Maximum storable charge
    fn capacity(&self) -> u32;

    /// Add `amount`, returning the overfill that did not fit
    fn fill(&mut self, amount: u32) -> u32;

    /// Remove up to `amount`, returning what was actually removed
    fn drain(&mut self, amount: u32) -> u32;

    /// Whether this device has charge to give
    fn can_send(&self) -> bool {
        self.charge() > 0
    }

    /// Whether this device accepts inbound charge
    fn can_receive(&self) -> bool;

    /// Maximum amount this device drains per transfer attempt
    fn send_limit(&self) -> u32;

    /// Maximum amount this device accepts per fill
    fn receive_limit(&self) -> u32;

    /// The device's own loss factor, applied multiplicatively along a relay
    fn efficiency(&self) -> f32;

    fn is_sending(&self) -> bool;

    fn set_sending(&mut self, sending: bool);

    fn is_receiving(&self) -> bool;

    /// Mark this device as the target of a relay
    ///
    /// Becoming a target clears `is_sending` on the same device.
    fn set_receiving(&mut self, receiving: bool);

    /// Consume the "charge changed, re-resolve the relay" mark
    ///
    /// Devices whose relay state depends on their neighbors set this from
    /// `fill`; the grid re-runs their transfer-state update when it sees it.
    fn take_pending_update(&mut self) -> bool {
        false
    }
}
