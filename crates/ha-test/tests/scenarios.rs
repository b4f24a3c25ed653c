//! Variants driven through the hooked emulator, frame by frame.

use ha_core::catalog::{self, curved_space_invaders};
use ha_core::consts::{
    CAR_COLOR_END, CAR_COLOR_START, CAR_FREEZE_VALUE, CAR_MOTION_END, CAR_MOTION_START, LASER_X,
    LOWER_CARS_PARKED_X, LOWER_CARS_X_END, LOWER_CARS_X_START, UPPER_CARS_PARKED_X, UPPER_CARS_X_END,
    UPPER_CARS_X_START,
};
use ha_core::rules::{CarColor, StopMode};
use ha_core::{Action, Emulator, HookedEmulator, MemoryView, VariantConfig, VariantRng};
use ha_test::{FakeAtari, palette};

fn hooked(atari: FakeAtari, variant: VariantConfig, seed: u64) -> HookedEmulator<FakeAtari> {
    let mut hooked = HookedEmulator::new(atari, VariantRng::new(seed));
    hooked.apply_variant(variant).unwrap();
    hooked
}

/// RAM after each of `frames` hooked NOOP steps.
fn trace(hooked: &mut HookedEmulator<FakeAtari>, frames: usize) -> Vec<Vec<u8>> {
    (0..frames)
        .map(|_| hooked.hooked_step(Action::NOOP).unwrap().observation)
        .collect()
}

#[test]
fn test_laser_curves_inside_band() {
    let mut hooked = hooked(FakeAtari::space_invaders(), curved_space_invaders().unwrap(), 0);
    assert_eq!(hooked.emulator().read_byte(LASER_X), Some(100));

    let result = hooked.hooked_step(Action::NOOP).unwrap();
    assert_eq!(result.observation[LASER_X], 101);
    assert_eq!(result.info.frame_number, 1);
}

#[test]
fn test_laser_outside_band_is_left_alone() {
    let mut atari = FakeAtari::space_invaders();
    atari.write_byte(LASER_X, 30);
    let mut hooked = hooked(atari, curved_space_invaders().unwrap(), 0);

    hooked.hooked_step(Action::NOOP).unwrap();
    assert_eq!(hooked.emulator().read_byte(LASER_X), Some(30));
}

#[test]
fn test_laser_leaves_band_and_stops() {
    let mut hooked = hooked(FakeAtari::space_invaders(), curved_space_invaders().unwrap(), 0);
    let frames = trace(&mut hooked, 40);
    let positions: Vec<u8> = frames.iter().map(|ram| ram[LASER_X]).collect();

    assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    let last = *positions.last().unwrap();
    assert!(last >= 122);
    // once outside the band nothing moves it
    assert_eq!(positions[38], last);
}

#[test]
fn test_invisible_cars() {
    let variant = catalog::from_modifs("Freeway", &["color=8"]).unwrap();
    assert_eq!(variant.name(), "freeway_invisible");
    let mut hooked = hooked(FakeAtari::freeway(), variant, 0);

    hooked.hooked_step(Action::NOOP).unwrap();
    let ram = hooked.emulator().memory();
    assert!(ram[CAR_COLOR_START..CAR_COLOR_END].iter().all(|&c| c == 6));

    // car 0 moved to x = 11 during the frame
    let screen = hooked.emulator().screen_rgb();
    assert_eq!(screen.pixel(11, 24), Some(palette(6)));
}

#[test]
fn test_standard_colors_are_rewritten_every_frame() {
    let variant = catalog::freeway(CarColor::Standard, None).unwrap();
    let mut hooked = hooked(FakeAtari::freeway(), variant, 0);
    let before = hooked.emulator().memory()[CAR_COLOR_START..CAR_COLOR_END].to_vec();

    hooked.emulator_mut().write_byte(CAR_COLOR_START + 3, 0);
    hooked.hooked_step(Action::NOOP).unwrap();
    assert_eq!(&hooked.emulator().memory()[CAR_COLOR_START..CAR_COLOR_END], &before[..]);
}

#[test]
fn test_all_stopped_parks_cars() {
    let variant = catalog::freeway(CarColor::Standard, Some(StopMode::AllStopped)).unwrap();
    let mut hooked = hooked(FakeAtari::freeway(), variant, 0);

    for _ in 0..5 {
        let ram = hooked.hooked_step(Action::NOOP).unwrap().observation;
        assert!(ram[CAR_MOTION_START..CAR_MOTION_END].iter().all(|&m| m == CAR_FREEZE_VALUE));
        assert!(ram[LOWER_CARS_X_START..LOWER_CARS_X_END]
            .iter()
            .all(|&x| x == LOWER_CARS_PARKED_X));
        assert!(ram[UPPER_CARS_X_START..UPPER_CARS_X_END]
            .iter()
            .all(|&x| x == UPPER_CARS_PARKED_X));
    }
}

#[test]
fn test_all_stopped_ignores_seed() {
    let variant = catalog::freeway(CarColor::Red, Some(StopMode::AllStopped)).unwrap();
    let mut first = hooked(FakeAtari::freeway(), variant.clone(), 1);
    let mut second = hooked(FakeAtari::freeway(), variant, 99);
    assert_eq!(trace(&mut first, 10), trace(&mut second, 10));
}

#[test]
fn test_random_stop_modes_reproducible_per_seed() {
    for mode in [StopMode::RandomSingle, StopMode::Simultaneous] {
        let variant = catalog::freeway(CarColor::Standard, Some(mode)).unwrap();
        let mut first = hooked(FakeAtari::freeway(), variant.clone(), 7);
        let mut second = hooked(FakeAtari::freeway(), variant, 7);
        assert_eq!(trace(&mut first, 30), trace(&mut second, 30), "{}", mode.name());
    }
}

#[test]
fn test_freeze_only_touches_motion_cells() {
    let variant = catalog::freeway(CarColor::Standard, Some(StopMode::Simultaneous)).unwrap();
    let mut hooked = hooked(FakeAtari::freeway(), variant, 3);
    for ram in trace(&mut hooked, 20) {
        assert!(ram[CAR_MOTION_START..CAR_MOTION_END]
            .iter()
            .all(|&m| m == 0 || m == CAR_FREEZE_VALUE));
    }
}

#[test]
fn test_reset_keeps_variant() {
    let mut hooked = hooked(FakeAtari::space_invaders(), curved_space_invaders().unwrap(), 0);
    trace(&mut hooked, 3);

    let observation = hooked.reset();
    assert_eq!(observation[LASER_X], 100);
    assert_eq!(hooked.variant().name(), "curved_space_invaders");

    hooked.hooked_step(Action::NOOP).unwrap();
    assert_eq!(hooked.emulator().read_byte(LASER_X), Some(101));
}

#[test]
fn test_unmodified_variant_is_plain_step() {
    let mut plain = FakeAtari::freeway();
    let mut hooked = HookedEmulator::new(FakeAtari::freeway(), VariantRng::new(0));
    for _ in 0..5 {
        let expected = plain.step(Action::NOOP).observation;
        assert_eq!(hooked.hooked_step(Action::NOOP).unwrap().observation, expected);
    }
}

#[test]
fn test_variant_too_large_for_ram_rejected() {
    let atari = FakeAtari::new(vec![0; 64], Vec::new(), None);
    let mut hooked = HookedEmulator::new(atari, VariantRng::new(0));
    assert!(hooked.apply_variant(curved_space_invaders().unwrap()).is_err());
    assert!(hooked.variant().is_empty());
}

#[test]
fn test_json_config_drives_emulator() {
    let json = catalog::freeway(CarColor::Green, None).unwrap().to_json().unwrap();
    let variant = VariantConfig::from_json(&json).unwrap();
    let mut hooked = hooked(FakeAtari::freeway(), variant, 0);
    let ram = hooked.hooked_step(Action::NOOP).unwrap().observation;
    assert!(ram[CAR_COLOR_START..CAR_COLOR_END].iter().all(|&c| c == 210));
}
