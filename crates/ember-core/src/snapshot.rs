//! Grid saves - what survives a save/reload cycle
//!
//! A save holds each block's kind, placement and flat persistence record.
//! Relay flags and path efficiency are derived state and are never written;
//! [`Grid::load`](crate::Grid::load) re-derives them from the neighbors.

use crate::grid::Block;
use crate::time::Tick;
use crate::value::Record;
use crate::{
    ActuatorConfig, EnergyTransferDevice, Facing, GenericReceiver, Position, RefillActuator,
    RelayConfig, Result, SourceDevice,
};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};

/// How to construct a block, minus its persisted state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockSpec {
    Source {
        facing: Facing,
        #[serde(default)]
        config: RelayConfig,
    },
    Receiver {
        capacity: u32,
        #[serde(default = "lossless")]
        efficiency: f32,
    },
    Actuator {
        #[serde(default)]
        config: ActuatorConfig,
    },
}

fn lossless() -> f32 {
    1.0
}

impl BlockSpec {
    /// Describe an existing block
    pub fn of(block: &Block) -> Self {
        match block {
            Block::Source(source) => BlockSpec::Source {
                facing: source.facing(),
                config: *source.config(),
            },
            Block::Receiver(receiver) => BlockSpec::Receiver {
                capacity: receiver.capacity(),
                efficiency: receiver.efficiency(),
            },
            Block::Actuator(actuator) => BlockSpec::Actuator {
                config: actuator.config(),
            },
        }
    }

    /// Construct the block at `pos` and apply its record
    pub fn build(&self, pos: Position, record: &Record) -> Block {
        match self {
            BlockSpec::Source { facing, config } => {
                let mut source = SourceDevice::new(pos, *facing, config.normalized());
                source.restore(record);
                Block::Source(source)
            }
            BlockSpec::Receiver {
                capacity,
                efficiency,
            } => {
                let mut receiver = GenericReceiver::new(*capacity).with_efficiency(*efficiency);
                receiver.restore(record);
                Block::Receiver(receiver)
            }
            BlockSpec::Actuator { config } => {
                let mut actuator = RefillActuator::new(*config);
                actuator.restore(record);
                Block::Actuator(actuator)
            }
        }
    }
}

/// One saved block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSave {
    pub pos: Position,
    pub spec: BlockSpec,
    #[serde(default)]
    pub record: Record,
}

/// A whole-grid save
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSave {
    /// World time at save
    pub tick: Tick,
    pub blocks: Vec<BlockSave>,
}

impl GridSave {
    /// Encode as pretty-printed RON
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    /// Decode from RON text
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }
}
