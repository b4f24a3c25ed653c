//! Causal discovery against the fake emulator: known causes, isolation of
//! trials, idempotence and precondition checks.

use std::collections::BTreeSet;

use ha_core::consts::{CAR_COLOR_START, CAR_FREEZE_VALUE, CAR_MOTION_START, LASER_X, RAM_SIZE};
use ha_core::discovery::{CausalDiscoveryEngine, Coordinate};
use ha_core::{ByteChange, DiscoveryError, MemorySnapshot, MemoryView};
use ha_test::{FRAME_COUNTER, FakeAtari};
use proptest::prelude::*;

fn set(addresses: &[usize]) -> BTreeSet<usize> {
    addresses.iter().copied().collect()
}

#[test]
fn test_car_pixel_depends_on_position_and_color() {
    let mut atari = FakeAtari::freeway();
    let mut engine = CausalDiscoveryEngine::default();
    let causes = engine.discover(&mut atari, 14, 24).unwrap();
    assert_eq!(causes, set(&[CAR_COLOR_START, 108]));
}

#[test]
fn test_frozen_car_also_depends_on_motion_cell() {
    let mut atari = FakeAtari::freeway();
    atari.write_byte(CAR_MOTION_START, CAR_FREEZE_VALUE);
    let mut engine = CausalDiscoveryEngine::default();
    let causes = engine.discover(&mut atari, 10, 24).unwrap();
    assert_eq!(causes, set(&[CAR_MOTION_START, CAR_COLOR_START, 108]));
}

#[test]
fn test_laser_pixel() {
    let mut atari = FakeAtari::space_invaders();
    let mut engine = CausalDiscoveryEngine::default();
    let causes = engine.discover(&mut atari, 100, 105).unwrap();
    assert_eq!(causes, set(&[LASER_X, 88]));
}

#[test]
fn test_empty_background_has_no_causes() {
    let mut atari = FakeAtari::freeway();
    let mut engine = CausalDiscoveryEngine::default();
    let causes = engine.discover(&mut atari, 150, 5).unwrap();
    assert!(causes.is_empty());
    assert!(engine.map().causes(Coordinate::new(150, 5)).unwrap().is_empty());
}

#[test]
fn test_every_trial_starts_from_baseline() {
    let mut atari = FakeAtari::freeway();
    let baseline = MemorySnapshot::capture(&atari);
    let mut engine = CausalDiscoveryEngine::default();

    let mut tried = Vec::new();
    let mut observer = |address: usize, value: u8, memory: &[u8]| {
        assert_eq!(value, 0);
        assert_eq!(memory, baseline.as_bytes(), "memory differs after trial {address}");
        tried.push(address);
    };
    let report = engine
        .discover_with(&mut atari, Coordinate::new(14, 24), &mut observer)
        .unwrap();

    assert_eq!(tried, (0..RAM_SIZE).collect::<Vec<_>>());
    assert_eq!(report.trials, RAM_SIZE);
    assert!(baseline.matches(&atari));
}

#[test]
fn test_discovery_is_idempotent() {
    let mut atari = FakeAtari::freeway();
    let mut engine = CausalDiscoveryEngine::default();
    let first = engine
        .discover_with(&mut atari, Coordinate::new(28, 42), &mut ha_core::discovery::NullObserver)
        .unwrap();
    let second = engine
        .discover_with(&mut atari, Coordinate::new(28, 42), &mut ha_core::discovery::NullObserver)
        .unwrap();
    assert_eq!(first, second);
    assert!(!first.causes.is_empty());
}

#[test]
fn test_new_query_replaces_old_entry_only() {
    let mut atari = FakeAtari::freeway();
    let mut engine = CausalDiscoveryEngine::default();
    engine.discover(&mut atari, 14, 24).unwrap();
    engine.discover(&mut atari, 150, 5).unwrap();
    assert_eq!(engine.map().len(), 2);
    assert_eq!(engine.map().causes(Coordinate::new(14, 24)).unwrap().len(), 2);
}

#[test]
fn test_out_of_frame_coordinate_rejected() {
    let mut atari = FakeAtari::freeway();
    let before = MemorySnapshot::capture(&atari);
    let frame = atari.frame_number();
    let mut engine = CausalDiscoveryEngine::default();

    assert_eq!(
        engine.discover(&mut atari, 160, 0),
        Err(DiscoveryError::CoordinateOutOfFrame {
            x: 160,
            y: 0,
            width: 160,
            height: 210
        })
    );
    assert!(engine.discover(&mut atari, 0, 210).is_err());
    // nothing was stepped or written
    assert_eq!(atari.frame_number(), frame);
    assert!(before.matches(&atari));
}

#[test]
fn test_failed_restore_is_reported() {
    let mut atari = FakeAtari::freeway().with_locked_cell(FRAME_COUNTER);
    let mut engine = CausalDiscoveryEngine::default();
    assert_eq!(
        engine.discover(&mut atari, 14, 24),
        Err(DiscoveryError::RestoreMismatch {
            address: FRAME_COUNTER,
            changes: vec![ByteChange {
                address: FRAME_COUNTER,
                before: 0,
                after: 1
            }],
        })
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_same_baseline_same_causes(x in 0usize..160, y in 0usize..210) {
        let mut atari = FakeAtari::freeway();
        let mut engine = CausalDiscoveryEngine::default();
        let first = engine.discover(&mut atari, x, y).unwrap();
        let second = engine.discover(&mut atari, x, y).unwrap();
        prop_assert_eq!(first, second);
    }
}
