//! Extractor Chain Example
//!
//! Loads a RON layout, then plays the world loop around it. It ticks the grid,
//! answers refill triggers by pumping charge back into the source and
//! releasing the actuator, then prints the final save.
//!
//! ```text
//! cargo run -p extractor_chain -- [layout.ron]
//! RUST_LOG=debug cargo run -p extractor_chain
//! ```

use ember_core::{Cmd, EnergyTransferDevice, Facing, Grid, RelayState};
use ember_script::{LayoutDef, Loader};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CHAIN: &str = include_str!("../chain.ron");

/// Charge pumped into a source per actuator stroke
const REFILL_AMOUNT: u32 = 48;
/// Number of refills before the pump runs dry
const REFILLS: u32 = 2;
const TICKS: u64 = 80;

fn load_layout() -> ember_script::Result<LayoutDef> {
    match std::env::args().nth(1) {
        Some(path) => {
            let mut loader = Loader::new();
            loader.load_file(&path)?;
            let layouts = loader.finish();
            let name = layouts.names().next().map(str::to_string).unwrap_or_default();
            layouts
                .get(&name)
                .cloned()
                .ok_or_else(|| ember_script::Error::InvalidLayout(format!("nothing loaded from {path}")))
        }
        None => LayoutDef::from_ron(CHAIN),
    }
}

fn print_status(grid: &Grid) {
    for (pos, block) in grid.iter() {
        let Some(device) = block.as_transfer() else {
            continue;
        };
        let state = grid
            .source(pos)
            .map(|s| match s.state() {
                RelayState::Idle => " idle",
                RelayState::Relaying => " relaying",
                RelayState::Blocked => " blocked",
            })
            .unwrap_or("");
        println!(
            "    {:<9} {}: {:>3}/{}{}",
            block.kind_name(),
            pos,
            device.charge(),
            device.capacity(),
            state
        );
    }
}

fn main() -> ember_script::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Ember Extractor Chain Example ===\n");

    let mut grid = load_layout()?.build()?;
    println!("Loaded {} blocks, total charge {}", grid.len(), grid.total_charge());
    print_status(&grid);
    println!();

    let mut refills_left = REFILLS;
    for _ in 0..TICKS {
        let report = grid.tick();

        let mut triggered = Vec::new();
        for cmd in report.cmd.iter() {
            match cmd {
                Cmd::ActivateRefill { pos } => triggered.push(*pos),
                Cmd::FilledEffect { pos } => info!(tick = report.tick, %pos, "relay halted"),
                _ => {}
            }
        }

        // The pump ends each actuator stroke once it has delivered
        for actuator in triggered {
            let Some(source) = actuator.offset(Facing::Down) else {
                continue;
            };
            if refills_left == 0 {
                info!(tick = report.tick, %source, "pump is dry, no refill");
                continue;
            }
            refills_left -= 1;
            let (overflow, _) = grid.fill(source, REFILL_AMOUNT)?;
            info!(tick = report.tick, %source, amount = REFILL_AMOUNT - overflow, "refilled source");
            grid.release_actuator(actuator)?;
        }

        if !report.dirty.is_empty() {
            println!("Tick {}:", report.tick);
            print_status(&grid);
        }
    }

    println!("\nFinal save:\n{}", grid.save().to_ron()?);
    Ok(())
}
