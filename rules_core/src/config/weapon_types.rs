//! Weapon type catalog

use super::ConfigError;
use crate::data::{eq_ci, WeaponStats};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One weapon family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponType {
    /// Tag used by skill trees and perk checks, e.g. `Sword`
    pub weapon_tag: String,
    pub ui_name: String,
    /// Item class that identifies the family on weapon stat rows
    pub item_class: String,
    /// Representative weapon stat row
    pub stats_ref: String,
    /// Prefix of the family's rows in the damage table
    pub damage_table_prefix: String,
    /// Ammo the family consumes, if any
    #[serde(default)]
    pub ammo_type: Option<String>,
}

/// Container for the weapon type catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponTypes {
    #[serde(rename = "weapon_types", default)]
    pub types: Vec<WeaponType>,
}

impl WeaponTypes {
    /// Load a catalog from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        super::load_toml(path)
    }

    /// Load a catalog from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        super::parse_toml(content)
    }

    pub fn by_tag(&self, weapon_tag: &str) -> Option<&WeaponType> {
        self.types.iter().find(|it| eq_ci(&it.weapon_tag, weapon_tag))
    }

    /// Family of a weapon stat row, matched through its item classes
    pub fn for_weapon(&self, weapon: &WeaponStats) -> Option<&WeaponType> {
        self.types.iter().find(|it| weapon.has_item_class(&it.item_class))
    }

    /// Ammo type expected by a weapon family
    pub fn ammo_type(&self, weapon_tag: &str) -> Option<&str> {
        self.by_tag(weapon_tag).and_then(|it| it.ammo_type.as_deref())
    }
}

/// Get the built-in weapon type catalog
pub fn default_weapon_types() -> WeaponTypes {
    let toml = include_str!("../../config/weapon_types.toml");
    WeaponTypes::parse(toml).unwrap_or_default()
}
