//! Ember Core - Tick-driven energy relay between grid-placed devices
//!
//! This crate provides the relay state machine and the types around it:
//! - The `EnergyTransferDevice` capability and its two implementors,
//!   `SourceDevice` (the ticking, relaying half) and `GenericReceiver`
//! - `RefillActuator`, triggered when a relaying source runs dry
//! - `SpatialLookup`, the seam through which devices find their neighbors
//! - `Grid`, an in-memory world that implements the lookup and drives ticks
//! - Flat `Record`s for persistence and sync, and RON grid saves
//!
//! ## Relay cycle
//!
//! Every world tick the grid calls `SourceDevice::tick`. On gated ticks
//! (every `transfer_interval` ticks, 5 by default) a relaying source drains
//! up to its send limit, applies the path efficiency and fills the device it
//! faces. Overfill flows back into the source. When the neighbor fills up
//! or disappears the relay halts; when the source runs dry it also triggers
//! the actuator above it.
//!
//! Side effects are returned as `Cmd` values rather than performed.

mod actuator;
mod cmd;
pub mod config;
mod device;
mod error;
pub mod grid;
mod receiver;
pub mod snapshot;
mod source;
pub mod spatial;
pub mod time;
mod value;

pub use actuator::RefillActuator;
pub use cmd::{Cmd, CmdIter};
pub use config::{ActuatorConfig, RelayConfig};
pub use device::EnergyTransferDevice;
pub use error::{Error, Result};
pub use grid::{Block, Grid, TickReport};
pub use receiver::GenericReceiver;
pub use snapshot::{BlockSave, BlockSpec, GridSave};
pub use source::{RelayState, SourceDevice};
pub use spatial::{Facing, Position, SpatialLookup};
pub use time::{Clock, Tick};
pub use value::{Record, Value};
