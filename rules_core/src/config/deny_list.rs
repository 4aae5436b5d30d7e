//! Ability properties that mark engine features outside the resolver

use super::ConfigError;
use crate::data::Ability;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Property names that exclude an ability from resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityDenyList {
    #[serde(default)]
    pub properties: Vec<String>,
}

impl AbilityDenyList {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        super::load_toml(path)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        super::parse_toml(content)
    }

    /// First denied property the ability sets, if any
    pub fn rejected_by<'a>(&'a self, ability: &Ability) -> Option<&'a str> {
        self.properties
            .iter()
            .map(String::as_str)
            .find(|prop| ability.is_property_set(prop))
    }

    pub fn rejects(&self, ability: &Ability) -> bool {
        self.rejected_by(ability).is_some()
    }
}

/// Get the built-in deny-list
pub fn default_ability_deny_list() -> AbilityDenyList {
    let toml = include_str!("../../config/ability_deny_list.toml");
    AbilityDenyList::parse(toml).unwrap_or_default()
}
