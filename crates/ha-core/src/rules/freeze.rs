//! Stopping and releasing moving objects.
//!
//! Writing the freeze value into an object's motion cell stops it; writing the
//! release value lets it move again. Three mutually exclusive stop modes decide
//! which cells get which value each frame.

use serde::{Deserialize, Serialize};

use crate::consts::{
    CAR_FREEZE_VALUE, CAR_MOTION_END, CAR_MOTION_START, CAR_RELEASE_VALUE,
    LOWER_CARS_PARKED_X, LOWER_CARS_X_END, LOWER_CARS_X_START, SIMULTANEOUS_RELEASE_PROBABILITY,
    SINGLE_RELEASE_PROBABILITY, UPPER_CARS_PARKED_X, UPPER_CARS_X_END, UPPER_CARS_X_START,
};
use crate::error::ConfigError;
use crate::rng::VariantRng;
use crate::rules::{AddressRange, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopMode {
    /// One random object per frame is stopped or released
    RandomSingle,
    /// All objects are stopped or released together
    Simultaneous,
    /// All objects stay stopped, parked off the play field
    AllStopped,
}

impl StopMode {
    /// Map a numeric stop mode; 0 means no stop mode.
    pub fn from_id(id: i32) -> Result<Option<Self>, ConfigError> {
        match id {
            0 => Ok(None),
            1 => Ok(Some(StopMode::RandomSingle)),
            2 => Ok(Some(StopMode::Simultaneous)),
            3 => Ok(Some(StopMode::AllStopped)),
            _ => Err(ConfigError::InvalidStopMode(id)),
        }
    }

    pub fn id(self) -> i32 {
        match self {
            StopMode::RandomSingle => 1,
            StopMode::Simultaneous => 2,
            StopMode::AllStopped => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StopMode::RandomSingle => "stop_random_single",
            StopMode::Simultaneous => "stop_simultaneous",
            StopMode::AllStopped => "stop_all",
        }
    }
}

/// A range of cells forced to a fixed value while everything is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parking {
    pub range: AddressRange,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreezeRule {
    mode: StopMode,
    range: AddressRange,
    freeze_value: u8,
    release_value: u8,
    /// Chance that the draw releases rather than freezes
    release_probability: f64,
    #[serde(default)]
    parking: Vec<Parking>,
}

impl FreezeRule {
    pub fn new(mode: StopMode, range: AddressRange, freeze_value: u8, release_value: u8) -> Self {
        Self {
            mode,
            range,
            freeze_value,
            release_value,
            release_probability: 0.5,
            parking: Vec::new(),
        }
    }

    pub fn with_release_probability(mut self, probability: f64) -> Self {
        self.release_probability = probability;
        self
    }

    pub fn with_parking(mut self, range: AddressRange, value: u8) -> Self {
        self.parking.push(Parking { range, value });
        self
    }

    /// Freeway cars with the reference probabilities and parking spots.
    pub fn cars(mode: StopMode) -> Self {
        let rule = Self::new(
            mode,
            AddressRange::new(CAR_MOTION_START, CAR_MOTION_END),
            CAR_FREEZE_VALUE,
            CAR_RELEASE_VALUE,
        );
        match mode {
            StopMode::RandomSingle => rule.with_release_probability(SINGLE_RELEASE_PROBABILITY),
            StopMode::Simultaneous => rule.with_release_probability(SIMULTANEOUS_RELEASE_PROBABILITY),
            StopMode::AllStopped => rule
                .with_parking(
                    AddressRange::new(LOWER_CARS_X_START, LOWER_CARS_X_END),
                    LOWER_CARS_PARKED_X,
                )
                .with_parking(
                    AddressRange::new(UPPER_CARS_X_START, UPPER_CARS_X_END),
                    UPPER_CARS_PARKED_X,
                ),
        }
    }

    pub fn mode(&self) -> StopMode {
        self.mode
    }

    pub fn range(&self) -> AddressRange {
        self.range
    }

    pub fn freeze_value(&self) -> u8 {
        self.freeze_value
    }

    pub fn parking(&self) -> &[Parking] {
        &self.parking
    }

    pub fn targets(&self) -> Vec<AddressRange> {
        let mut targets = vec![self.range];
        if self.mode == StopMode::AllStopped {
            targets.extend(self.parking.iter().map(|p| p.range));
        }
        targets
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let name = self.mode.name();
        self.range.require_non_empty(name)?;
        if !(0.0..=1.0).contains(&self.release_probability) {
            return Err(ConfigError::InvalidParameter {
                rule: name.into(),
                reason: format!("release probability {} is not in [0, 1]", self.release_probability),
            });
        }
        let targets = self.targets();
        for (i, a) in targets.iter().enumerate() {
            a.require_non_empty(name)?;
            if let Some(b) = targets[i + 1..].iter().find(|b| a.overlaps(b)) {
                return Err(ConfigError::ConflictingTargets {
                    address: a.start.max(b.start),
                    first: name.into(),
                    second: name.into(),
                });
            }
        }
        Ok(())
    }

    fn value_for(&self, released: bool) -> u8 {
        if released { self.release_value } else { self.freeze_value }
    }

    pub(crate) fn apply(&self, rng: &mut VariantRng, out: &mut Vec<Write>) {
        match self.mode {
            StopMode::RandomSingle => {
                let released = rng.biased_choice(true, false, self.release_probability);
                let address = rng.address_in(self.range.start, self.range.end);
                out.push(Write::new(address, self.value_for(released)));
            }
            StopMode::Simultaneous => {
                let value = self.value_for(rng.biased_choice(true, false, self.release_probability));
                out.extend(self.range.iter().map(|address| Write::new(address, value)));
            }
            StopMode::AllStopped => {
                out.extend(self.range.iter().map(|address| Write::new(address, self.freeze_value)));
                for parking in &self.parking {
                    out.extend(parking.range.iter().map(|address| Write::new(address, parking.value)));
                }
            }
        }
    }
}
