//! Parabolic trajectory shaping.
//!
//! Each frame a coordinate inside the active band is pushed a fixed fraction
//! of its own value away from the field midpoint, so a straight shot bends
//! toward the nearer edge and curves harder the further out it gets.

use serde::{Deserialize, Serialize};

use crate::Address;
use crate::consts::{
    LASER_CURVATURE, LASER_LOWER_BOUND, LASER_MIDPOINT, LASER_UPPER_BOUND, LASER_X,
};
use crate::error::ConfigError;
use crate::rules::{AddressRange, Write, clamp_to_byte};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParabolicDisplacement {
    address: Address,
    midpoint: u8,
    curvature: f64,
    /// Exclusive lower bound of the active band
    lower: u8,
    /// Exclusive upper bound of the active band
    upper: u8,
}

impl ParabolicDisplacement {
    /// Displacement of `address` with the reference band and curvature.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            midpoint: LASER_MIDPOINT,
            curvature: LASER_CURVATURE,
            lower: LASER_LOWER_BOUND,
            upper: LASER_UPPER_BOUND,
        }
    }

    /// The Space Invaders laser shot
    pub fn laser() -> Self {
        Self::new(LASER_X)
    }

    pub fn with_midpoint(mut self, midpoint: u8) -> Self {
        self.midpoint = midpoint;
        self
    }

    pub fn with_curvature(mut self, curvature: f64) -> Self {
        self.curvature = curvature;
        self
    }

    /// Restrict the rule to values strictly between `lower` and `upper`.
    pub fn with_band(mut self, lower: u8, upper: u8) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn target(&self) -> AddressRange {
        AddressRange::single(self.address)
    }

    pub fn in_band(&self, value: u8) -> bool {
        self.lower < value && value < self.upper
    }

    /// New value for a cell holding `value`; unchanged outside the band.
    ///
    /// At the midpoint itself the direction is zero and nothing moves.
    pub fn displace(&self, value: u8) -> u8 {
        if !self.in_band(value) {
            return value;
        }
        let v = f64::from(value);
        let direction = f64::from((i16::from(value) - i16::from(self.midpoint)).signum());
        clamp_to_byte(v + direction * self.curvature * v)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.address.checked_add(1).is_none() {
            return Err(ConfigError::InvalidParameter {
                rule: "displacement".into(),
                reason: format!("address {} is not addressable", self.address),
            });
        }
        if self.lower >= self.upper {
            return Err(ConfigError::InvalidParameter {
                rule: "displacement".into(),
                reason: format!("empty band {}..{}", self.lower, self.upper),
            });
        }
        if !self.curvature.is_finite() || self.curvature < 0.0 {
            return Err(ConfigError::InvalidParameter {
                rule: "displacement".into(),
                reason: format!("curvature must be finite and non-negative, got {}", self.curvature),
            });
        }
        Ok(())
    }

    pub(crate) fn apply(&self, memory: &[u8], out: &mut Vec<Write>) {
        let Some(&value) = memory.get(self.address) else {
            return;
        };
        if self.in_band(value) {
            out.push(Write::new(self.address, self.displace(value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_right_of_midpoint_moves_right() {
        let rule = ParabolicDisplacement::laser();
        assert_eq!(rule.displace(100), 101);
        assert_eq!(rule.displace(121), 122);
    }

    #[test]
    fn test_left_of_midpoint_moves_left() {
        let rule = ParabolicDisplacement::laser();
        // 60 - 0.6 = 59.4
        assert_eq!(rule.displace(60), 59);
        // 41 - 0.41 = 40.59
        assert_eq!(rule.displace(41), 41);
    }

    #[test]
    fn test_midpoint_is_fixed() {
        let rule = ParabolicDisplacement::laser();
        assert_eq!(rule.displace(81), 81);
    }

    #[test]
    fn test_band_edges_are_exclusive() {
        let rule = ParabolicDisplacement::laser();
        assert_eq!(rule.displace(40), 40);
        assert_eq!(rule.displace(122), 122);
        assert_eq!(rule.displace(0), 0);
        assert_eq!(rule.displace(255), 255);
    }

    #[test]
    fn test_apply_outside_band_writes_nothing() {
        let rule = ParabolicDisplacement::laser();
        let mut ram = [0u8; 128];
        ram[87] = 30;
        let mut out = Vec::new();
        rule.apply(&ram, &mut out);
        assert!(out.is_empty());

        ram[87] = 100;
        rule.apply(&ram, &mut out);
        assert_eq!(out, vec![Write::new(87, 101)]);
    }

    #[test]
    fn test_large_curvature_saturates() {
        let rule = ParabolicDisplacement::new(0)
            .with_band(0, 255)
            .with_curvature(5.0);
        assert_eq!(rule.displace(200), 255);
        assert_eq!(rule.displace(10), 0);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(ParabolicDisplacement::laser().with_band(50, 50).validate().is_err());
        assert!(ParabolicDisplacement::laser().with_curvature(f64::NAN).validate().is_err());
        assert!(ParabolicDisplacement::laser().with_curvature(-0.5).validate().is_err());
        assert!(ParabolicDisplacement::new(Address::MAX).validate().is_err());
        assert!(ParabolicDisplacement::laser().validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_moves_away_from_midpoint(v in 41u8..122) {
            let rule = ParabolicDisplacement::laser();
            let out = rule.displace(v);
            let before = (i16::from(v) - 81).abs();
            let after = (i16::from(out) - 81).abs();
            prop_assert!(after >= before, "v={v} -> {out}");
            // never crosses to the other side
            prop_assert!((i16::from(v) - 81).signum() * (i16::from(out) - 81).signum() >= 0);
        }

        #[test]
        fn prop_outside_band_is_identity(v in prop_oneof![0u8..=40, 122u8..=255]) {
            prop_assert_eq!(ParabolicDisplacement::laser().displace(v), v);
        }
    }
}
