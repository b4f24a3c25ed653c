//! Built-in variants of the reference games.
//!
//! Variants are selected the same way on every front end: a game name plus a
//! list of modification strings such as `curved_laser`, `color=3` or
//! `stop_mode=2`.

use std::str::FromStr;

use log::info;
use strum::{EnumIter, EnumString};

use crate::error::ConfigError;
use crate::rules::{CarColor, FreezeRule, PaletteRecolor, ParabolicDisplacement, Rule, StopMode};
use crate::variant::VariantConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Game {
    #[strum(serialize = "spaceinvaders", serialize = "space_invaders")]
    SpaceInvaders,
    #[strum(serialize = "freeway")]
    Freeway,
}

impl Game {
    pub fn name(self) -> &'static str {
        match self {
            Game::SpaceInvaders => "SpaceInvaders",
            Game::Freeway => "Freeway",
        }
    }

    /// Modifications understood for this game
    pub fn modifications(self) -> &'static [&'static str] {
        match self {
            Game::SpaceInvaders => &["curved_laser"],
            Game::Freeway => &["color=<0-8>", "stop_mode=<0-3>"],
        }
    }
}

/// Space Invaders with a laser that curves toward the nearer edge.
pub fn curved_space_invaders() -> Result<VariantConfig, ConfigError> {
    VariantConfig::new(
        "curved_space_invaders",
        "The laser shoots in a parabolic curve instead of a straight line",
        vec![ParabolicDisplacement::laser().into()],
    )
}

/// Freeway with recolored cars and an optional stop mode.
pub fn freeway(color: CarColor, stop_mode: Option<StopMode>) -> Result<VariantConfig, ConfigError> {
    let mut rules: Vec<Rule> = vec![PaletteRecolor::cars(color).into()];
    let mut name = format!("freeway_{}", color.name());
    if let Some(mode) = stop_mode {
        rules.push(FreezeRule::cars(mode).into());
        name.push('_');
        name.push_str(mode.name());
    }
    let description = match stop_mode {
        None => format!("Cars are {}", color.name()),
        Some(mode) => format!("Cars are {}, {}", color.name(), mode.name().replace('_', " ")),
    };
    VariantConfig::new(name, description, rules)
}

/// Build a variant from a game name and its modification list.
///
/// An empty list gives the unmodified game for SpaceInvaders, and standard
/// car colors rewritten every frame for Freeway.
pub fn from_modifs<S: AsRef<str>>(game: &str, modifs: &[S]) -> Result<VariantConfig, ConfigError> {
    let game = Game::from_str(game).map_err(|_| ConfigError::UnknownGame(game.to_string()))?;

    let config = match game {
        Game::SpaceInvaders => {
            let mut curved = false;
            for modif in modifs {
                match modif.as_ref() {
                    "curved_laser" => curved = true,
                    other => return Err(unknown(game, other)),
                }
            }
            if curved {
                curved_space_invaders()?
            } else {
                VariantConfig::unmodified()
            }
        }
        Game::Freeway => {
            let mut color = CarColor::Standard;
            let mut stop_mode = None;
            for modif in modifs {
                let modif = modif.as_ref();
                match modif.split_once('=') {
                    Some(("color", value)) => {
                        color = CarColor::from_selector(parse_value(modif, value)?)?;
                    }
                    Some(("stop_mode", value)) => {
                        stop_mode = StopMode::from_id(parse_value(modif, value)?)?;
                    }
                    _ => return Err(unknown(game, modif)),
                }
            }
            freeway(color, stop_mode)?
        }
    };

    info!("{}: selected variant '{}'", game.name(), config.name());
    Ok(config)
}

fn unknown(game: Game, modif: &str) -> ConfigError {
    ConfigError::UnknownModification {
        game: game.name().into(),
        modif: modif.into(),
    }
}

fn parse_value(modif: &str, value: &str) -> Result<i32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidModificationValue {
            modif: modif.into(),
            value: value.into(),
        })
}
