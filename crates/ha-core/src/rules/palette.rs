//! Sprite recoloring.
//!
//! Either every cell of the target range receives one palette byte, or the
//! game's own per-cell defaults are written back. The two are never mixed in
//! a single frame.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use crate::Address;
use crate::consts::{CAR_COLOR_END, CAR_COLOR_START, CAR_DEFAULT_COLORS};
use crate::error::ConfigError;
use crate::rules::{AddressRange, Write};

/// Car colors selectable for Freeway.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CarColor {
    /// The game's own colors
    #[default]
    Standard,
    Black,
    Grey,
    Red,
    White,
    Green,
    Purple,
    Blue,
    /// Matches the road, so the cars cannot be seen
    Invisible,
}

impl CarColor {
    /// Map a numeric selector.
    ///
    /// 1..=8 pick a palette color; 0 and anything above 8 mean standard
    /// colors. Negative selectors are rejected.
    pub fn from_selector(selector: i32) -> Result<Self, ConfigError> {
        Ok(match selector {
            i32::MIN..=-1 => return Err(ConfigError::InvalidSelector(selector)),
            1 => CarColor::Black,
            2 => CarColor::Grey,
            3 => CarColor::Red,
            4 => CarColor::White,
            5 => CarColor::Green,
            6 => CarColor::Purple,
            7 => CarColor::Blue,
            8 => CarColor::Invisible,
            _ => CarColor::Standard,
        })
    }

    /// Palette byte written to every car, `None` for the default table.
    pub fn palette_byte(self) -> Option<u8> {
        match self {
            CarColor::Standard => None,
            CarColor::Black => Some(0),
            CarColor::Grey => Some(2),
            CarColor::Red => Some(66),
            CarColor::White => Some(15),
            CarColor::Green => Some(210),
            CarColor::Purple => Some(120),
            CarColor::Blue => Some(145),
            CarColor::Invisible => Some(6),
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteRecolor {
    color: CarColor,
    /// Cells that receive a uniform palette byte
    range: AddressRange,
    /// First cell of the default table
    defaults_start: Address,
    defaults: Vec<u8>,
}

impl PaletteRecolor {
    pub fn new(color: CarColor, range: AddressRange, defaults_start: Address, defaults: Vec<u8>) -> Self {
        Self {
            color,
            range,
            defaults_start,
            defaults,
        }
    }

    /// Freeway cars
    pub fn cars(color: CarColor) -> Self {
        Self::new(
            color,
            AddressRange::new(CAR_COLOR_START, CAR_COLOR_END),
            CAR_COLOR_START,
            CAR_DEFAULT_COLORS.to_vec(),
        )
    }

    pub fn color(&self) -> CarColor {
        self.color
    }

    pub fn range(&self) -> AddressRange {
        self.range
    }

    fn defaults_range(&self) -> AddressRange {
        AddressRange::new(
            self.defaults_start,
            self.defaults_start.saturating_add(self.defaults.len()),
        )
    }

    pub fn targets(&self) -> Vec<AddressRange> {
        vec![self.range, self.defaults_range()]
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults_start.checked_add(self.defaults.len()).is_none() {
            return Err(ConfigError::InvalidParameter {
                rule: "palette".into(),
                reason: format!(
                    "default table of {} bytes at {} runs past the address space",
                    self.defaults.len(),
                    self.defaults_start
                ),
            });
        }
        self.range.require_non_empty("palette")?;
        self.defaults_range().require_non_empty("palette")
    }

    pub(crate) fn apply(&self, out: &mut Vec<Write>) {
        match self.color.palette_byte() {
            Some(byte) => out.extend(self.range.iter().map(|address| Write::new(address, byte))),
            None => out.extend(
                self.defaults
                    .iter()
                    .enumerate()
                    .map(|(i, &byte)| Write::new(self.defaults_start + i, byte)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_selector_mapping() {
        assert_eq!(CarColor::from_selector(0).unwrap(), CarColor::Standard);
        assert_eq!(CarColor::from_selector(3).unwrap(), CarColor::Red);
        assert_eq!(CarColor::from_selector(8).unwrap(), CarColor::Invisible);
        assert_eq!(CarColor::from_selector(9).unwrap(), CarColor::Standard);
        assert_eq!(CarColor::from_selector(200).unwrap(), CarColor::Standard);
        assert!(matches!(
            CarColor::from_selector(-1),
            Err(ConfigError::InvalidSelector(-1))
        ));
    }

    #[test]
    fn test_palette_bytes() {
        let bytes: Vec<Option<u8>> = CarColor::iter().map(CarColor::palette_byte).collect();
        assert_eq!(
            bytes,
            vec![None, Some(0), Some(2), Some(66), Some(15), Some(210), Some(120), Some(145), Some(6)]
        );
    }

    #[test]
    fn test_uniform_color_covers_range() {
        for selector in 1..=8 {
            let color = CarColor::from_selector(selector).unwrap();
            let byte = color.palette_byte().unwrap();
            let mut out = Vec::new();
            PaletteRecolor::cars(color).apply(&mut out);
            assert_eq!(out.len(), 10);
            assert!(out.iter().all(|w| w.value == byte));
            let addresses: Vec<_> = out.iter().map(|w| w.address).collect();
            assert_eq!(addresses, (77..87).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_standard_writes_default_table() {
        for selector in [0, 9, 42] {
            let mut out = Vec::new();
            PaletteRecolor::cars(CarColor::from_selector(selector).unwrap()).apply(&mut out);
            let values: Vec<u8> = out.iter().map(|w| w.value).collect();
            assert_eq!(values, CAR_DEFAULT_COLORS.to_vec());
            assert_eq!(out.first().unwrap().address, 77);
            assert_eq!(out.last().unwrap().address, 87);
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(CarColor::Invisible.name(), "invisible");
        assert_eq!(CarColor::Standard.name(), "standard");
    }

    #[test]
    fn test_empty_ranges_rejected() {
        let rule = PaletteRecolor::new(CarColor::Red, AddressRange::new(5, 5), 5, vec![1]);
        assert!(matches!(rule.validate(), Err(ConfigError::EmptyRange { .. })));
        let rule = PaletteRecolor::new(CarColor::Red, AddressRange::new(5, 6), 5, vec![]);
        assert!(rule.validate().is_err());
        let rule = PaletteRecolor::new(CarColor::Red, AddressRange::new(5, 6), Address::MAX, vec![1, 2]);
        assert!(matches!(rule.validate(), Err(ConfigError::InvalidParameter { .. })));
    }
}
