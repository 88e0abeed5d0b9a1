//! Layout schema - a grid described as RON

use crate::error::{Error, Result};
use ember_core::{
    ActuatorConfig, BlockSpec, Facing, Grid, Position, Record, RelayConfig,
};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A complete grid layout
///
/// ```ron
/// (
///     config: (send_limit: 8),
///     actuator: (stroke_ticks: Some(10)),
///     blocks: [
///         (pos: (x: 0, y: 0, z: 0), kind: Source(facing: East)),
///         (pos: (x: 1, y: 0, z: 0), kind: Receiver(capacity: 64)),
///         (pos: (x: 0, y: 1, z: 0), kind: Actuator()),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDef {
    /// Relay configuration for sources without their own
    #[serde(default)]
    pub config: RelayConfig,
    /// Actuator configuration for actuators without their own
    #[serde(default)]
    pub actuator: ActuatorConfig,
    pub blocks: Vec<BlockDef>,
}

/// One block of a layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    pub pos: Position,
    pub kind: BlockKind,
    /// Initial persisted state, e.g. `{"charge": Int(64)}`
    #[serde(default)]
    pub record: Record,
}

/// Block kinds a layout can place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockKind {
    Source {
        facing: Facing,
        #[serde(default)]
        config: Option<RelayConfig>,
    },
    Receiver {
        capacity: u32,
        #[serde(default = "lossless")]
        efficiency: f32,
    },
    Actuator {
        #[serde(default)]
        config: Option<ActuatorConfig>,
    },
}

fn lossless() -> f32 {
    1.0
}

impl LayoutDef {
    /// Parse a layout from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let layout: LayoutDef = ron::from_str(content)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Check positions and block parameters
    pub fn validate(&self) -> Result<()> {
        let mut seen = IndexSet::with_capacity(self.blocks.len());
        for block in &self.blocks {
            if !seen.insert(block.pos) {
                return Err(Error::DuplicatePosition(block.pos));
            }
            if let BlockKind::Receiver {
                capacity,
                efficiency,
            } = block.kind
            {
                if capacity == 0 {
                    return Err(Error::InvalidLayout(format!(
                        "receiver at {} has zero capacity",
                        block.pos
                    )));
                }
                if !(0.0..=1.0).contains(&efficiency) {
                    return Err(Error::InvalidLayout(format!(
                        "receiver at {} has efficiency {efficiency} outside [0, 1]",
                        block.pos
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve a block definition against the layout defaults
    pub fn spec_for(&self, block: &BlockDef) -> BlockSpec {
        match &block.kind {
            BlockKind::Source { facing, config } => BlockSpec::Source {
                facing: *facing,
                config: config.unwrap_or(self.config).normalized(),
            },
            BlockKind::Receiver {
                capacity,
                efficiency,
            } => BlockSpec::Receiver {
                capacity: *capacity,
                efficiency: *efficiency,
            },
            BlockKind::Actuator { config } => BlockSpec::Actuator {
                config: config.unwrap_or(self.actuator),
            },
        }
    }

    /// Build a grid with every block placed and relay state derived
    pub fn build(&self) -> Result<Grid> {
        self.validate()?;
        let mut grid = Grid::new();
        for block in &self.blocks {
            let built = self.spec_for(block).build(block.pos, &block.record);
            grid.place(block.pos, built)?;
        }

        for block in &self.blocks {
            let below = block.pos.offset(Facing::Down);
            if matches!(block.kind, BlockKind::Actuator { .. })
                && below.and_then(|pos| grid.source(pos)).is_none()
            {
                warn!(pos = %block.pos, "actuator has no source below it");
            }
        }
        debug!(blocks = grid.len(), "built layout");
        Ok(grid)
    }
}
