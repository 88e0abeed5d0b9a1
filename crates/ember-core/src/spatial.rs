//! Grid positions, facings and the spatial lookup seam

use crate::{EnergyTransferDevice, RefillActuator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer cell coordinate in the block grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    /// Create a new position
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The adjacent cell in the given direction
    ///
    /// `None` when the step would leave the coordinate range.
    pub fn offset(self, facing: Facing) -> Option<Self> {
        let (dx, dy, dz) = facing.delta();
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            z: self.z.checked_add(dz)?,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One of the six axis-aligned directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    Down,
    Up,
    #[default]
    North,
    South,
    West,
    East,
}

impl Facing {
    /// Unit offset of this facing. North is -z, east is +x.
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Facing::Down => (0, -1, 0),
            Facing::Up => (0, 1, 0),
            Facing::North => (0, 0, -1),
            Facing::South => (0, 0, 1),
            Facing::West => (-1, 0, 0),
            Facing::East => (1, 0, 0),
        }
    }
}

/// Resolves devices by position and capability
///
/// Implemented by whatever owns device placement. Queries return `None` when
/// the cell is empty, off the grid, or holds a device without the capability.
/// None of them block or fail.
pub trait SpatialLookup {
    /// The device exposing the energy transfer capability at `pos`
    fn transfer_device_mut(&mut self, pos: Position) -> Option<&mut dyn EnergyTransferDevice>;

    /// The refill actuator at `pos`
    fn actuator_mut(&mut self, pos: Position) -> Option<&mut RefillActuator>;

    /// Read-only view of the refill actuator at `pos`
    fn actuator(&self, pos: Position) -> Option<&RefillActuator>;

    /// The transfer device adjacent to `origin` in direction `facing`
    fn find_transfer(
        &mut self,
        origin: Position,
        facing: Facing,
    ) -> Option<&mut dyn EnergyTransferDevice> {
        self.transfer_device_mut(origin.offset(facing)?)
    }

    /// The refill actuator adjacent to `origin` in direction `facing`
    fn find_actuator(&mut self, origin: Position, facing: Facing) -> Option<&mut RefillActuator> {
        self.actuator_mut(origin.offset(facing)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        let origin = Position::new(0, 64, 0);
        assert_eq!(origin.offset(Facing::Up), Some(Position::new(0, 65, 0)));
        assert_eq!(origin.offset(Facing::East), Some(Position::new(1, 64, 0)));
        assert_eq!(origin.offset(Facing::North), Some(Position::new(0, 64, -1)));
    }

    #[test]
    fn test_offset_off_grid() {
        let edge = Position::new(i32::MAX, i32::MIN, 0);
        assert_eq!(edge.offset(Facing::East), None);
        assert_eq!(edge.offset(Facing::Down), None);
        assert_eq!(edge.offset(Facing::West), Some(Position::new(i32::MAX - 1, i32::MIN, 0)));
    }

    struct Empty;

    impl SpatialLookup for Empty {
        fn transfer_device_mut(&mut self, _pos: Position) -> Option<&mut dyn EnergyTransferDevice> {
            panic!("off-grid cells are never looked up")
        }

        fn actuator_mut(&mut self, _pos: Position) -> Option<&mut RefillActuator> {
            panic!("off-grid cells are never looked up")
        }

        fn actuator(&self, _pos: Position) -> Option<&RefillActuator> {
            None
        }
    }

    #[test]
    fn test_find_off_grid_is_absent() {
        let edge = Position::new(i32::MAX, 0, 0);
        assert!(Empty.find_transfer(edge, Facing::East).is_none());
        let top = Position::new(0, i32::MAX, 0);
        assert!(Empty.find_actuator(top, Facing::Up).is_none());
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(1, 2, 3).to_string(), "(1, 2, 3)");
    }
}
