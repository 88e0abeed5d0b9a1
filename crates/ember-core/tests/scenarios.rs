//! End-to-end relay scenarios driven through the grid's tick loop.

use ember_core::{
    ActuatorConfig, Block, Cmd, EnergyTransferDevice, Facing, GenericReceiver,
    Grid, GridSave, Position, RefillActuator, RelayConfig, RelayState, SourceDevice,
    SpatialLookup, Value,
};

const SRC: Position = Position::new(0, 64, 0);

fn neighbor() -> Position {
    SRC.offset(Facing::East).unwrap()
}

fn above() -> Position {
    SRC.offset(Facing::Up).unwrap()
}

fn source_block(pos: Position, facing: Facing, charge: u32) -> Block {
    Block::Source(SourceDevice::new(pos, facing, RelayConfig::default()).with_charge(charge))
}

/// Source facing east into a receiver, actuator on top
fn extractor(source_charge: u32, receiver_charge: u32) -> Grid {
    let mut grid = Grid::new();
    grid.place(SRC, source_block(SRC, Facing::East, source_charge))
        .unwrap();
    grid.place(
        neighbor(),
        Block::Receiver(GenericReceiver::new(128).with_charge(receiver_charge)),
    )
    .unwrap();
    grid.place(
        above(),
        Block::Actuator(RefillActuator::default()),
    )
    .unwrap();
    grid
}

/// Tick until the next gated tick has run
fn run_to_gate(grid: &mut Grid) -> Vec<Cmd> {
    let mut cmds = Vec::new();
    loop {
        let report = grid.tick();
        cmds.push(report.cmd);
        if report.tick % 5 == 0 {
            return cmds;
        }
    }
}

fn count(cmds: &[Cmd], pred: impl Fn(&Cmd) -> bool + Copy) -> usize {
    cmds.iter().map(|cmd| cmd.count(pred)).sum()
}

#[test]
fn scenario_a_single_send_empties_source() {
    let mut grid = extractor(16, 0);
    assert_eq!(grid.source(SRC).unwrap().state(), RelayState::Relaying);

    let cmds = run_to_gate(&mut grid);

    let source = grid.source(SRC).unwrap();
    assert_eq!(source.charge(), 0);
    assert!(!source.is_sending());
    assert_eq!(grid.receiver(neighbor()).unwrap().charge(), 16);
    assert!(grid.actuator(above()).unwrap().is_active());
    assert_eq!(count(&cmds, |c| matches!(c, Cmd::ActivateRefill { .. })), 1);
}

#[test]
fn scenario_b_full_neighbor_stops_relay() {
    let mut grid = extractor(0, 120);
    // Start relaying while there is still room, then top the neighbor off
    grid.fill(SRC, 16).unwrap();
    assert!(grid.source(SRC).unwrap().is_sending());
    grid.fill(neighbor(), 8).unwrap();

    let cmds = run_to_gate(&mut grid);

    assert_eq!(grid.source(SRC).unwrap().charge(), 16);
    assert_eq!(grid.receiver(neighbor()).unwrap().charge(), 128);
    assert!(!grid.source(SRC).unwrap().is_sending());
    assert!(!grid.receiver(neighbor()).unwrap().is_receiving());
    assert_eq!(count(&cmds, |c| matches!(c, Cmd::FilledEffect { .. })), 1);
    assert!(count(&cmds, |c| *c == Cmd::block_update(SRC)) >= 1);
    assert!(!grid.actuator(above()).unwrap().is_active());
}

#[test]
fn scenario_c_missing_neighbor_matches_full_neighbor() {
    // Full neighbor
    let mut full = Grid::new();
    full.place(
        neighbor(),
        Block::Receiver(GenericReceiver::new(128).with_charge(128)),
    )
    .unwrap();
    let mut blocked = SourceDevice::new(SRC, Facing::East, RelayConfig::default()).with_charge(16);
    blocked.set_sending(true);
    let blocked_cmd = blocked.attempt_transfer(&mut full);

    // No neighbor at all
    let mut empty = Grid::new();
    let mut orphan = SourceDevice::new(SRC, Facing::East, RelayConfig::default()).with_charge(16);
    orphan.set_sending(true);
    let orphan_cmd = orphan.attempt_transfer(&mut empty);

    assert_eq!(orphan_cmd, blocked_cmd);
    assert_eq!(orphan.charge(), blocked.charge());
    assert_eq!(orphan.state(), blocked.state());
    assert_eq!(orphan.state(), RelayState::Blocked);
    assert_eq!(orphan_cmd.count(|c| matches!(c, Cmd::FilledEffect { .. })), 1);
    assert_eq!(orphan_cmd.count(|c| *c == Cmd::block_update(SRC)), 1);
}

#[test]
fn scenario_d_restore_clamps_to_capacity() {
    let mut grid = extractor(0, 0);
    let mut payload = ember_core::Record::new();
    payload.insert("charge".into(), Value::Int(200));

    let cmd = grid.apply_sync_payload(SRC, &payload).unwrap();

    assert_eq!(grid.source(SRC).unwrap().charge(), 128);
    assert!(grid.source(SRC).unwrap().is_sending());
    assert_eq!(cmd.count(|c| *c == Cmd::block_update(SRC)), 1);
}

#[test]
fn scenario_e_mutually_facing_sources() {
    let a = Position::new(0, 0, 0);
    let b = a.offset(Facing::East).unwrap();
    let mut grid = Grid::new();
    grid.place(a, source_block(a, Facing::East, 16)).unwrap();
    grid.place(b, source_block(b, Facing::West, 16)).unwrap();
    let before = grid.total_charge();

    for _ in 0..10 {
        grid.tick();
    }

    for pos in [a, b] {
        let source = grid.source(pos).unwrap();
        assert!(source.charge() <= 128);
        assert!(!source.is_sending());
    }
    assert!(grid.total_charge() <= before);
}

/// Two sources that both believe they are relaying into each other
#[test]
fn scenario_e_forced_attempts_move_nothing() {
    struct Pair {
        other: SourceDevice,
    }

    impl SpatialLookup for Pair {
        fn transfer_device_mut(&mut self, pos: Position) -> Option<&mut dyn EnergyTransferDevice> {
            if pos == self.other.position() {
                Some(&mut self.other as &mut dyn EnergyTransferDevice)
            } else {
                None
            }
        }

        fn actuator_mut(&mut self, _pos: Position) -> Option<&mut RefillActuator> {
            None
        }

        fn actuator(&self, _pos: Position) -> Option<&RefillActuator> {
            None
        }
    }

    let a_pos = Position::new(0, 0, 0);
    let b_pos = a_pos.offset(Facing::East).unwrap();
    let mut a = SourceDevice::new(a_pos, Facing::East, RelayConfig::default()).with_charge(16);
    let b = SourceDevice::new(b_pos, Facing::West, RelayConfig::default()).with_charge(16);
    a.set_sending(true);

    let mut pair = Pair { other: b };
    pair.other.set_sending(true);
    a.attempt_transfer(&mut pair);

    let mut b = pair.other;
    let mut pair = Pair { other: a };
    b.attempt_transfer(&mut pair);
    let a = pair.other;

    assert_eq!(a.charge() + b.charge(), 32);
    assert!(!a.is_sending());
    assert!(!b.is_sending());
}

#[test]
fn efficiency_compounds_along_the_path() {
    let config = RelayConfig::default().with_efficiency(0.5);
    let mut grid = Grid::new();
    grid.place(
        SRC,
        Block::Source(SourceDevice::new(SRC, Facing::East, config).with_charge(64)),
    )
    .unwrap();
    grid.place(
        neighbor(),
        Block::Receiver(GenericReceiver::new(128).with_efficiency(0.5)),
    )
    .unwrap();
    assert_eq!(grid.source(SRC).unwrap().path_efficiency(), 0.25);

    run_to_gate(&mut grid);
    assert_eq!(grid.source(SRC).unwrap().charge(), 48);
    assert_eq!(grid.receiver(neighbor()).unwrap().charge(), 4);
}

#[test]
fn replacing_neighbor_heals_relay() {
    let mut grid = extractor(64, 128);
    assert_eq!(grid.source(SRC).unwrap().state(), RelayState::Blocked);

    grid.remove(neighbor()).unwrap();
    grid.place(neighbor(), Block::Receiver(GenericReceiver::new(128)))
        .unwrap();
    assert_eq!(grid.source(SRC).unwrap().state(), RelayState::Relaying);

    run_to_gate(&mut grid);
    assert_eq!(grid.receiver(neighbor()).unwrap().charge(), 16);
}

#[test]
fn actuator_stroke_allows_another_refill() {
    let mut grid = Grid::new();
    grid.place(SRC, source_block(SRC, Facing::East, 0)).unwrap();
    grid.place(neighbor(), Block::Receiver(GenericReceiver::new(128)))
        .unwrap();
    grid.place(
        above(),
        Block::Actuator(RefillActuator::new(ActuatorConfig {
            stroke_ticks: Some(3),
        })),
    )
    .unwrap();

    grid.fill(SRC, 16).unwrap();
    run_to_gate(&mut grid);
    assert!(grid.actuator(above()).unwrap().is_active());

    for _ in 0..3 {
        grid.tick();
    }
    assert!(!grid.actuator(above()).unwrap().is_active());

    grid.fill(SRC, 16).unwrap();
    run_to_gate(&mut grid);
    assert!(grid.actuator(above()).unwrap().is_active());
}

#[test]
fn save_reload_resumes_relay() {
    let mut grid = extractor(0, 0);
    grid.fill(SRC, 100).unwrap();
    run_to_gate(&mut grid);

    let text = grid.save().to_ron().unwrap();
    let mut reloaded = Grid::load(&GridSave::from_ron(&text).unwrap()).unwrap();
    assert_eq!(reloaded.source(SRC).unwrap().charge(), 84);
    assert_eq!(reloaded.source(SRC).unwrap().state(), RelayState::Relaying);

    run_to_gate(&mut reloaded);
    assert_eq!(reloaded.source(SRC).unwrap().charge(), 68);
    assert_eq!(reloaded.receiver(neighbor()).unwrap().charge(), 32);
}

#[test]
fn relay_never_creates_charge() {
    let mut grid = extractor(0, 0);
    grid.fill(SRC, 128).unwrap();
    let before = grid.total_charge();

    for _ in 0..200 {
        grid.tick();
        assert!(grid.total_charge() <= before);
        assert!(grid.source(SRC).unwrap().charge() <= 128);
    }
    assert_eq!(grid.receiver(neighbor()).unwrap().charge(), 128);
    assert_eq!(grid.source(SRC).unwrap().charge(), 0);
}
