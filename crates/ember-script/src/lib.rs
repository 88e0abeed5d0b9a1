//! Ember Script - RON layouts and relay configuration
//!
//! Describes grids in RON and builds them into [`ember_core::Grid`]s:
//! - Relay configuration shared by every source of a layout
//! - Block definitions (sources, receivers, actuators) with optional records
//! - A loader that collects named layouts from files and directories

mod error;
mod layout;
mod loader;

pub use error::{Error, Result};
pub use layout::{BlockDef, BlockKind, LayoutDef};
pub use loader::{load_config_str, Layouts, Loader};
