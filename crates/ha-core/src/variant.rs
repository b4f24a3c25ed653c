//! Declarative game variants.
//!
//! A `VariantConfig` is a named set of rules applied every frame. It is
//! validated once, when built or deserialized; a config that exists is
//! always consistent.

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::Address;
use crate::error::ConfigError;
use crate::rng::VariantRng;
use crate::rules::{Rule, Write};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VariantConfigDef", into = "VariantConfigDef")]
pub struct VariantConfig {
    name: String,
    description: String,
    rules: Vec<Rule>,
}

/// Unvalidated serialized form
#[derive(Serialize, Deserialize)]
struct VariantConfigDef {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    rules: Vec<Rule>,
}

impl TryFrom<VariantConfigDef> for VariantConfig {
    type Error = ConfigError;

    fn try_from(def: VariantConfigDef) -> Result<Self, Self::Error> {
        VariantConfig::new(def.name, def.description, def.rules)
    }
}

impl From<VariantConfig> for VariantConfigDef {
    fn from(config: VariantConfig) -> Self {
        Self {
            name: config.name,
            description: config.description,
            rules: config.rules,
        }
    }
}

impl VariantConfig {
    /// Build a variant, rejecting invalid rules, more than one stop mode, and
    /// any address written by two different rules.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        rules: Vec<Rule>,
    ) -> Result<Self, ConfigError> {
        for rule in &rules {
            rule.validate()?;
        }

        if rules.iter().filter(|r| matches!(r, Rule::Freeze(_))).count() > 1 {
            return Err(ConfigError::MultipleStopModes);
        }

        for (index, rule) in rules.iter().enumerate() {
            for earlier in &rules[..index] {
                if let Some(address) = first_overlap(earlier, rule) {
                    return Err(ConfigError::ConflictingTargets {
                        address,
                        first: earlier.name().into(),
                        second: rule.name().into(),
                    });
                }
            }
        }

        Ok(Self {
            name: name.into(),
            description: description.into(),
            rules,
        })
    }

    /// Variant with no rules; frames run unmodified.
    pub fn unmodified() -> Self {
        Self {
            name: "unmodified".into(),
            description: "The original game".into(),
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True if some rule declares `address` as a target.
    pub fn declares(&self, address: Address) -> bool {
        self.rules.iter().any(|rule| rule.declares(address))
    }

    /// All addresses any rule may write
    pub fn declared_addresses(&self) -> BTreeSet<Address> {
        self.rules
            .iter()
            .flat_map(|rule| rule.targets())
            .flat_map(|range| range.iter())
            .collect()
    }

    /// Check every declared address against a memory of `len` bytes.
    ///
    /// Reports the lowest declared address at or beyond `len`.
    pub fn check_memory_len(&self, len: usize) -> Result<(), ConfigError> {
        let beyond = self
            .rules
            .iter()
            .flat_map(|rule| rule.targets())
            .filter(|range| !range.is_empty() && range.end > len)
            .map(|range| range.start.max(len))
            .min();
        match beyond {
            Some(address) => Err(ConfigError::AddressOutOfRange {
                variant: self.name.clone(),
                address,
                len,
            }),
            None => Ok(()),
        }
    }

    /// Writes for this frame, in rule order.
    ///
    /// Pure given `memory` and the sequence of draws from `rng`.
    pub fn apply(&self, memory: &[u8], rng: &mut VariantRng) -> Vec<Write> {
        let mut writes = Vec::new();
        for rule in &self.rules {
            let before = writes.len();
            rule.apply(memory, rng, &mut writes);
            debug!(
                "{}: rule '{}' produced {} writes",
                self.name,
                rule.name(),
                writes.len() - before
            );
        }
        writes
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Lowest address written by both rules, if any.
fn first_overlap(a: &Rule, b: &Rule) -> Option<Address> {
    let b_targets = b.targets();
    a.targets()
        .iter()
        .flat_map(|x| b_targets.iter().filter(|y| x.overlaps(y)).map(move |y| x.start.max(y.start)))
        .min()
}
