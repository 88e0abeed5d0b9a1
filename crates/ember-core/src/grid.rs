//! In-memory block grid and tick driver
//!
//! The grid owns every placed block, answers [`SpatialLookup`] queries and
//! drives the per-tick update of each source. A source is detached from the
//! grid while its own update runs, so the grid can lend out its neighbors.

use crate::snapshot::{BlockSave, BlockSpec, GridSave};
use crate::spatial::SpatialLookup;
use crate::time::{Clock, Tick};
use crate::value::Record;
use crate::{
    Cmd, EnergyTransferDevice, Error, GenericReceiver, Position, RefillActuator, Result,
    SourceDevice,
};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

/// A block occupying one grid cell
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Source(SourceDevice),
    Receiver(GenericReceiver),
    Actuator(RefillActuator),
}

impl Block {
    /// Get the kind name of this block
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Source(_) => "source",
            Block::Receiver(_) => "receiver",
            Block::Actuator(_) => "actuator",
        }
    }

    /// The block's persistence record
    pub fn serialize(&self) -> Record {
        match self {
            Block::Source(source) => source.serialize(),
            Block::Receiver(receiver) => receiver.serialize(),
            Block::Actuator(actuator) => actuator.serialize(),
        }
    }

    /// The block as a transfer device, if it has the capability
    pub fn as_transfer(&self) -> Option<&dyn EnergyTransferDevice> {
        match self {
            Block::Source(source) => Some(source as &dyn EnergyTransferDevice),
            Block::Receiver(receiver) => Some(receiver as &dyn EnergyTransferDevice),
            Block::Actuator(_) => None,
        }
    }

    fn as_transfer_mut(&mut self) -> Option<&mut dyn EnergyTransferDevice> {
        match self {
            Block::Source(source) => Some(source as &mut dyn EnergyTransferDevice),
            Block::Receiver(receiver) => Some(receiver as &mut dyn EnergyTransferDevice),
            Block::Actuator(_) => None,
        }
    }
}

/// Everything a tick produced
#[derive(Debug, Clone)]
pub struct TickReport {
    /// The tick that just ran
    pub tick: Tick,
    /// Effects, block updates and refill triggers, in emission order
    pub cmd: Cmd,
    /// Sources whose state needs a persistence write
    pub dirty: Vec<Position>,
    /// Sync payloads for every position that requested a block update
    pub sync: IndexMap<Position, Record>,
}

/// Block storage plus the world clock
#[derive(Debug, Clone, Default)]
pub struct Grid {
    blocks: IndexMap<Position, Block>,
    clock: Clock,
}

impl Grid {
    /// Create an empty grid at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.tick
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &Block)> {
        self.blocks.iter().map(|(pos, block)| (*pos, block))
    }

    pub fn source(&self, pos: Position) -> Option<&SourceDevice> {
        match self.blocks.get(&pos) {
            Some(Block::Source(source)) => Some(source),
            _ => None,
        }
    }

    pub fn receiver(&self, pos: Position) -> Option<&GenericReceiver> {
        match self.blocks.get(&pos) {
            Some(Block::Receiver(receiver)) => Some(receiver),
            _ => None,
        }
    }

    pub fn actuator(&self, pos: Position) -> Option<&RefillActuator> {
        match self.blocks.get(&pos) {
            Some(Block::Actuator(actuator)) => Some(actuator),
            _ => None,
        }
    }

    /// Sum of charge held by every transfer device
    pub fn total_charge(&self) -> u64 {
        self.blocks
            .values()
            .filter_map(Block::as_transfer)
            .map(|device| device.charge() as u64)
            .sum()
    }

    /// Place a block, then re-derive the relays it touches
    pub fn place(&mut self, pos: Position, block: Block) -> Result<Cmd> {
        if self.blocks.contains_key(&pos) {
            return Err(Error::PositionOccupied(pos));
        }
        debug!(%pos, kind = block.kind_name(), "placed block");
        self.blocks.insert(pos, block);
        Ok(self.refresh_around(pos))
    }

    /// Remove a block, then re-derive the relays that pointed at it
    pub fn remove(&mut self, pos: Position) -> Result<(Block, Cmd)> {
        let block = self.blocks.shift_remove(&pos).ok_or(Error::NoBlockAt(pos))?;
        debug!(%pos, kind = block.kind_name(), "removed block");
        let cmd = self.refresh_around(pos);
        Ok((block, cmd))
    }

    /// Fill the transfer device at `pos` from outside the relay
    ///
    /// Returns the overfill and whatever the resulting state update emitted.
    pub fn fill(&mut self, pos: Position, amount: u32) -> Result<(u32, Cmd)> {
        let overfill = self.transfer_at(pos)?.fill(amount);
        Ok((overfill, self.settle()))
    }

    /// Drain the transfer device at `pos` from outside the relay
    ///
    /// Returns what was removed and whatever the re-derived relays emitted.
    pub fn drain(&mut self, pos: Position, amount: u32) -> Result<(u32, Cmd)> {
        let drained = self.transfer_at(pos)?.drain(amount);
        Ok((drained, self.refresh_around(pos)))
    }

    /// Release the actuator at `pos` from outside, ending its stroke
    pub fn release_actuator(&mut self, pos: Position) -> Result<()> {
        match self.blocks.get_mut(&pos) {
            Some(Block::Actuator(actuator)) => {
                actuator.release();
                Ok(())
            }
            Some(other) => Err(wrong_kind(pos, "actuator", other)),
            None => Err(Error::NoBlockAt(pos)),
        }
    }

    /// Advance the clock and update every block once
    pub fn tick(&mut self) -> TickReport {
        self.clock.advance();
        let tick = self.clock.tick;
        let mut cmds = Vec::new();

        for (pos, block) in self.blocks.iter_mut() {
            if let Block::Actuator(actuator) = block {
                if actuator.tick() {
                    debug!(%pos, "actuator stroke complete");
                    cmds.push(Cmd::block_update(*pos));
                }
            }
        }

        for pos in self.source_positions() {
            if let Some(cmd) = self.with_source(pos, |source, grid| source.tick(tick, grid)) {
                cmds.push(cmd);
            }
        }

        cmds.push(self.settle());
        trace!(tick, "tick complete");
        self.report(tick, Cmd::batch(cmds))
    }

    /// Sync payload for the block at `pos`
    pub fn sync_payload(&self, pos: Position) -> Result<Record> {
        match self.blocks.get(&pos) {
            Some(Block::Source(source)) => Ok(source.produce_sync_payload()),
            Some(block) => Ok(block.serialize()),
            None => Err(Error::NoBlockAt(pos)),
        }
    }

    /// Apply a sync payload from the authoritative grid
    pub fn apply_sync_payload(&mut self, pos: Position, payload: &Record) -> Result<Cmd> {
        match self.blocks.get_mut(&pos) {
            Some(Block::Receiver(receiver)) => receiver.restore(payload),
            Some(Block::Actuator(actuator)) => actuator.restore(payload),
            Some(Block::Source(_)) => {
                let cmd = self
                    .with_source(pos, |source, grid| source.apply_sync_payload(payload, grid))
                    .unwrap_or(Cmd::None);
                return Ok(cmd);
            }
            None => return Err(Error::NoBlockAt(pos)),
        }
        // The receiver's new charge may open or close a relay pointing at it
        Ok(Cmd::batch(vec![
            self.refresh_around(pos),
            Cmd::block_update(pos),
        ]))
    }

    /// Persist every block; derived relay flags are not saved
    pub fn save(&self) -> GridSave {
        GridSave {
            tick: self.clock.tick,
            blocks: self
                .blocks
                .iter()
                .map(|(pos, block)| BlockSave {
                    pos: *pos,
                    spec: BlockSpec::of(block),
                    record: block.serialize(),
                })
                .collect(),
        }
    }

    /// Rebuild a grid from a save, re-deriving every relay
    pub fn load(save: &GridSave) -> Result<Self> {
        let mut grid = Grid {
            blocks: IndexMap::with_capacity(save.blocks.len()),
            clock: Clock::at(save.tick),
        };
        for entry in &save.blocks {
            if grid.blocks.contains_key(&entry.pos) {
                return Err(Error::PositionOccupied(entry.pos));
            }
            grid.blocks.insert(entry.pos, entry.spec.build(entry.pos, &entry.record));
        }
        for pos in grid.source_positions() {
            grid.with_source(pos, |source, grid| source.update_transfer_state(grid));
        }
        grid.collect_dirty();
        Ok(grid)
    }

    fn transfer_at(&mut self, pos: Position) -> Result<&mut dyn EnergyTransferDevice> {
        match self.blocks.get_mut(&pos) {
            Some(block) => {
                let kind = block.kind_name();
                block.as_transfer_mut().ok_or(Error::WrongBlockKind {
                    pos,
                    expected: "transfer device",
                    got: kind,
                })
            }
            None => Err(Error::NoBlockAt(pos)),
        }
    }

    fn source_positions(&self) -> Vec<Position> {
        self.blocks
            .iter()
            .filter(|(_, block)| matches!(block, Block::Source(_)))
            .map(|(pos, _)| *pos)
            .collect()
    }

    /// Run `f` on the source at `pos` with the rest of the grid as lookup
    fn with_source<R>(
        &mut self,
        pos: Position,
        f: impl FnOnce(&mut SourceDevice, &mut Grid) -> R,
    ) -> Option<R> {
        let (index, _, block) = self.blocks.shift_remove_full(&pos)?;
        match block {
            Block::Source(mut source) => {
                let result = f(&mut source, self);
                self.blocks.shift_insert(index, pos, Block::Source(source));
                Some(result)
            }
            other => {
                self.blocks.shift_insert(index, pos, other);
                None
            }
        }
    }

    /// Re-derive any relay whose neighbor or actuator sits at `pos`
    fn refresh_around(&mut self, pos: Position) -> Cmd {
        let affected: Vec<Position> = self
            .blocks
            .iter()
            .filter_map(|(at, block)| match block {
                Block::Source(source)
                    if *at == pos || at.offset(source.facing()) == Some(pos) =>
                {
                    Some(*at)
                }
                _ => None,
            })
            .collect();

        let cmds = affected
            .into_iter()
            .filter_map(|at| self.with_source(at, |source, grid| source.update_transfer_state(grid)))
            .collect();
        Cmd::batch(cmds)
    }

    /// Resolve every pending transfer-state update left by a fill
    fn settle(&mut self) -> Cmd {
        let pending: Vec<Position> = self
            .blocks
            .iter_mut()
            .filter_map(|(pos, block)| {
                let device = block.as_transfer_mut()?;
                device.take_pending_update().then_some(*pos)
            })
            .collect();

        let cmds = pending
            .into_iter()
            .filter_map(|pos| self.with_source(pos, |source, grid| source.update_transfer_state(grid)))
            .collect();
        Cmd::batch(cmds)
    }

    fn collect_dirty(&mut self) -> Vec<Position> {
        self.blocks
            .iter_mut()
            .filter_map(|(pos, block)| match block {
                Block::Source(source) => source.take_dirty().then_some(*pos),
                _ => None,
            })
            .collect()
    }

    fn report(&mut self, tick: Tick, cmd: Cmd) -> TickReport {
        let updated: IndexSet<Position> = cmd
            .iter()
            .filter_map(|c| match c {
                Cmd::BlockUpdate { pos } => Some(*pos),
                _ => None,
            })
            .collect();

        let sync = updated
            .into_iter()
            .filter_map(|pos| self.sync_payload(pos).ok().map(|payload| (pos, payload)))
            .collect();

        TickReport {
            tick,
            dirty: self.collect_dirty(),
            cmd,
            sync,
        }
    }
}

impl SpatialLookup for Grid {
    fn transfer_device_mut(&mut self, pos: Position) -> Option<&mut dyn EnergyTransferDevice> {
        self.blocks.get_mut(&pos).and_then(Block::as_transfer_mut)
    }

    fn actuator_mut(&mut self, pos: Position) -> Option<&mut RefillActuator> {
        match self.blocks.get_mut(&pos) {
            Some(Block::Actuator(actuator)) => Some(actuator),
            _ => None,
        }
    }

    fn actuator(&self, pos: Position) -> Option<&RefillActuator> {
        Grid::actuator(self, pos)
    }
}

fn wrong_kind(pos: Position, expected: &'static str, got: &Block) -> Error {
    Error::WrongBlockKind {
        pos,
        expected,
        got: got.kind_name(),
    }
}
