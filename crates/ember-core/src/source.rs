//! Source device - the ticking half of a relay
//!
//! A source accumulates charge and, on gated ticks, pushes up to its send
//! limit into whichever transfer device sits in front of it. The pairing is
//! never stored: every attempt and every state update re-resolves the
//! neighbor through a [`SpatialLookup`], so removing or replacing the
//! neighbor heals within one tick.
//!
//! # Relay states
//!
//! ```text
//!            fill / sync: can_send && neighbor.can_receive
//!   Idle ─────────────────────────────────────────────▶ Relaying
//!    ▲                                                     │
//!    │ source drained (refill requested)                   │ neighbor full or absent
//!    └─────────────────────────────────────────────────────┤
//!                                                          ▼
//!                                                       Blocked
//! ```

use crate::spatial::SpatialLookup;
use crate::time::{is_gated, Tick};
use crate::value::{read_clamped, Record};
use crate::{Cmd, EnergyTransferDevice, Facing, Position, RefillActuator, RelayConfig};
use tracing::{debug, trace};

/// Observable state of a source's relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Not sending; nothing to send or never paired
    Idle,
    /// Sending into a receptive neighbor
    Relaying,
    /// Has charge, but the neighbor is full or missing
    Blocked,
}

/// Why a relay stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    /// Neighbor cannot accept, or there is no neighbor
    Blocked,
    /// Source has nothing left to send
    Drained,
}

/// A charge buffer that relays into the device it faces
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDevice {
    pos: Position,
    facing: Facing,
    config: RelayConfig,
    charge: u32,
    is_sending: bool,
    is_receiving: bool,
    /// Own efficiency times the neighbor's, as of the last state update
    efficiency: f32,
    blocked: bool,
    dirty: bool,
    pending_update: bool,
}

impl SourceDevice {
    /// Create an empty source at `pos` relaying towards `facing`
    pub fn new(pos: Position, facing: Facing, config: RelayConfig) -> Self {
        Self {
            pos,
            facing,
            config,
            charge: 0,
            is_sending: false,
            is_receiving: false,
            efficiency: config.efficiency(),
            blocked: false,
            dirty: false,
            pending_update: false,
        }
    }

    /// Set the starting charge, clamped to capacity
    pub fn with_charge(mut self, charge: u32) -> Self {
        self.charge = charge.min(self.config.capacity());
        self
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Composite efficiency of the current relay path
    pub fn path_efficiency(&self) -> f32 {
        self.efficiency
    }

    pub fn state(&self) -> RelayState {
        if self.is_sending {
            RelayState::Relaying
        } else if self.blocked {
            RelayState::Blocked
        } else {
            RelayState::Idle
        }
    }

    /// Whether state changed since the last persistence write
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear and return the dirty mark
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Whether the actuator above is present and disengaged
    pub fn can_refill<L: SpatialLookup + ?Sized>(&self, lookup: &L) -> bool {
        self.pos
            .offset(Facing::Up)
            .and_then(|above| lookup.actuator(above))
            .is_some_and(RefillActuator::can_refill)
    }

    /// Scheduler entry point, called once per world tick
    pub fn tick<L: SpatialLookup + ?Sized>(&mut self, tick: Tick, lookup: &mut L) -> Cmd {
        if !self.is_sending {
            return Cmd::None;
        }
        if !is_gated(tick, self.config.transfer_interval()) {
            trace!(pos = %self.pos, tick, "transfer gate closed");
            return Cmd::None;
        }
        self.attempt_transfer(lookup)
    }

    /// Run one transfer attempt against the neighbor in front
    pub fn attempt_transfer<L: SpatialLookup + ?Sized>(&mut self, lookup: &mut L) -> Cmd {
        let Some(neighbor) = lookup.find_transfer(self.pos, self.facing) else {
            debug!(pos = %self.pos, facing = ?self.facing, "no neighbor to relay into");
            return self.halt(None, Halt::Blocked);
        };

        if !neighbor.can_receive() {
            debug!(pos = %self.pos, "neighbor cannot receive");
            return self.halt(Some(neighbor), Halt::Blocked);
        }

        if !self.can_send() {
            debug!(pos = %self.pos, "source drained");
            let cmd = self.halt(Some(neighbor), Halt::Drained);
            return Cmd::batch(vec![cmd, self.request_refill(lookup)]);
        }

        let requested = self.config.send_limit().min(neighbor.receive_limit());
        let amount = self.drain(requested);
        // Truncation loss is not returned upstream
        let delivered = (amount as f32 * self.efficiency) as u32;
        let overfill = neighbor.fill(delivered);
        if overfill > 0 {
            self.fill(overfill);
        }
        self.dirty = true;
        debug!(
            pos = %self.pos,
            amount,
            delivered,
            overfill,
            charge = self.charge,
            "relayed charge"
        );

        let cmd = if !neighbor.can_receive() {
            self.halt(Some(neighbor), Halt::Blocked)
        } else if !self.can_send() {
            let cmd = self.halt(Some(neighbor), Halt::Drained);
            Cmd::batch(vec![cmd, self.request_refill(lookup)])
        } else {
            Cmd::None
        };

        if self.pending_update {
            Cmd::batch(vec![cmd, self.update_transfer_state(lookup)])
        } else {
            cmd
        }
    }

    /// Re-resolve the neighbor and re-derive the relay flags and efficiency
    ///
    /// Idempotent: a second call with no intervening charge change yields the
    /// same flags and efficiency, and emits nothing.
    pub fn update_transfer_state<L: SpatialLookup + ?Sized>(&mut self, lookup: &mut L) -> Cmd {
        self.pending_update = false;
        let was_sending = self.is_sending;
        let can_send = self.can_send();

        let neighbor_flipped = match lookup.find_transfer(self.pos, self.facing) {
            Some(neighbor) => {
                let can_transfer = can_send && neighbor.can_receive();
                let was_receiving = neighbor.is_receiving();
                self.is_sending = can_transfer;
                neighbor.set_receiving(can_transfer);
                self.efficiency = self.config.efficiency() * neighbor.efficiency();
                self.blocked = can_send && !can_transfer;
                was_receiving != neighbor.is_receiving()
            }
            None => {
                self.is_sending = false;
                self.blocked = can_send;
                false
            }
        };
        self.dirty = true;

        let mut cmds = Vec::new();
        if was_sending != self.is_sending {
            trace!(pos = %self.pos, sending = self.is_sending, "relay state flipped");
            cmds.push(Cmd::block_update(self.pos));
        }
        if let Some(neighbor_pos) = self.pos.offset(self.facing).filter(|_| neighbor_flipped) {
            cmds.push(Cmd::block_update(neighbor_pos));
        }
        Cmd::batch(cmds)
    }

    /// Flat persistence record; only the charge is stored
    pub fn serialize(&self) -> Record {
        let mut record = Record::new();
        record.insert("charge".into(), self.charge.into());
        record
    }

    /// Apply a persistence record
    ///
    /// A missing `charge` key is a fresh device (charge 0). Stored values
    /// outside `[0, capacity]` are clamped. Derived flags are left alone;
    /// callers re-derive them with [`Self::update_transfer_state`].
    pub fn restore(&mut self, record: &Record) {
        self.charge = read_clamped(record, "charge", self.config.capacity());
    }

    pub fn produce_sync_payload(&self) -> Record {
        self.serialize()
    }

    /// Apply a payload from the authoritative copy and re-derive flags
    pub fn apply_sync_payload<L: SpatialLookup + ?Sized>(
        &mut self,
        payload: &Record,
        lookup: &mut L,
    ) -> Cmd {
        self.restore(payload);
        let cmd = self.update_transfer_state(lookup);
        let pos = self.pos;
        if cmd.count(|c| *c == Cmd::block_update(pos)) > 0 {
            cmd
        } else {
            Cmd::batch(vec![cmd, Cmd::block_update(pos)])
        }
    }

    fn halt(&mut self, neighbor: Option<&mut dyn EnergyTransferDevice>, reason: Halt) -> Cmd {
        self.is_sending = false;
        if let Some(neighbor) = neighbor {
            neighbor.set_receiving(false);
        }
        self.blocked = reason == Halt::Blocked && self.can_send();
        self.dirty = true;
        Cmd::batch(vec![Cmd::filled(self.pos), Cmd::block_update(self.pos)])
    }

    fn request_refill<L: SpatialLookup + ?Sized>(&mut self, lookup: &mut L) -> Cmd {
        let Some(pos) = self.pos.offset(Facing::Up) else {
            return Cmd::None;
        };
        match lookup.actuator_mut(pos) {
            Some(actuator) if actuator.can_refill() => {
                actuator.activate();
                debug!(source = %self.pos, actuator = %pos, "refill requested");
                Cmd::ActivateRefill { pos }
            }
            _ => Cmd::None,
        }
    }
}

impl EnergyTransferDevice for SourceDevice {
    fn charge(&self) -> u32 {
        self.charge
    }

    fn capacity(&self) -> u32 {
        self.config.capacity()
    }

    fn fill(&mut self, amount: u32) -> u32 {
        let room = self.config.capacity() - self.charge;
        let stored = amount.min(room);
        self.charge += stored;
        if stored > 0 {
            self.pending_update = true;
        }
        amount - stored
    }

    fn drain(&mut self, amount: u32) -> u32 {
        let drained = amount.min(self.charge);
        self.charge -= drained;
        drained
    }

    /// Sources never accept inbound charge from a relay
    fn can_receive(&self) -> bool {
        false
    }

    fn send_limit(&self) -> u32 {
        self.config.send_limit()
    }

    fn receive_limit(&self) -> u32 {
        0
    }

    fn efficiency(&self) -> f32 {
        self.config.efficiency()
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

    fn take_pending_update(&mut self) -> bool {
        std::mem::take(&mut self.pending_update)
    }
}
