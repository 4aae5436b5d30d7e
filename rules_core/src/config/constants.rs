//! Game constants configuration

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable game constants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConstants {
    #[serde(default)]
    pub gear_score: GearScoreConstants,
    #[serde(default)]
    pub damage: DamageConstants,
    #[serde(default)]
    pub armor: ArmorConstants,
    #[serde(default)]
    pub equip_load: EquipLoadConstants,
    #[serde(default)]
    pub character: CharacterConstants,
}

impl GameConstants {
    /// Constants shipped with the crate
    pub fn builtin() -> Self {
        let toml = include_str!("../../config/constants.toml");
        super::parse_toml(toml).unwrap_or_default()
    }

    /// Load constants from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        super::load_toml(path)
    }

    /// Load constants from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        super::parse_toml(content)
    }

    /// Reject values that would make the formulas divide by zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gear_score.rounding_interval <= 0.0 {
            return Err(ConfigError::ValidationError(
                "gear_score.rounding_interval must be positive".to_string(),
            ));
        }
        if self.damage.gear_score_interval <= 0.0 {
            return Err(ConfigError::ValidationError(
                "damage.gear_score_interval must be positive".to_string(),
            ));
        }
        if self.gear_score.min > self.gear_score.max {
            return Err(ConfigError::ValidationError(
                "gear_score.min must not exceed gear_score.max".to_string(),
            ));
        }
        if self.equip_load.ratio_normal > self.equip_load.ratio_slow {
            return Err(ConfigError::ValidationError(
                "equip_load.ratio_normal must not exceed equip_load.ratio_slow".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearScoreConstants {
    #[serde(default = "default_min_gear_score")]
    pub min: f64,
    #[serde(default = "default_max_gear_score")]
    pub max: f64,
    #[serde(default = "default_rounding_interval")]
    pub rounding_interval: f64,
    /// Round gear score up to the interval instead of down
    #[serde(default = "default_round_up")]
    pub round_up: bool,
}

impl Default for GearScoreConstants {
    fn default() -> Self {
        GearScoreConstants {
            min: 100.0,
            max: 700.0,
            rounding_interval: 5.0,
            round_up: true,
        }
    }
}

fn default_min_gear_score() -> f64 {
    100.0
}
fn default_max_gear_score() -> f64 {
    700.0
}
fn default_rounding_interval() -> f64 {
    5.0
}
fn default_round_up() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageConstants {
    /// Compound damage increase per gear score interval
    #[serde(default = "default_compound_increase")]
    pub base_damage_compound_increase: f64,
    /// Factor applied to the compound increase above the diminishing threshold
    #[serde(default = "default_diminishing_multiplier")]
    pub compound_increase_diminishing_multiplier: f64,
    #[serde(default = "default_gear_score_interval")]
    pub gear_score_interval: f64,
    #[serde(default = "default_min_weapon_gear_score")]
    pub min_possible_weapon_gear_score: f64,
    #[serde(default = "default_diminishing_threshold")]
    pub diminishing_gear_score_threshold: f64,
    /// Damage bonus per character level above 1
    #[serde(default = "default_level_multiplier")]
    pub level_damage_multiplier: f64,
}

impl Default for DamageConstants {
    fn default() -> Self {
        DamageConstants {
            base_damage_compound_increase: 0.0112,
            compound_increase_diminishing_multiplier: 0.6667,
            gear_score_interval: 5.0,
            min_possible_weapon_gear_score: 100.0,
            diminishing_gear_score_threshold: 500.0,
            level_damage_multiplier: 0.025,
        }
    }
}

fn default_compound_increase() -> f64 {
    0.0112
}
fn default_diminishing_multiplier() -> f64 {
    0.6667
}
fn default_gear_score_interval() -> f64 {
    5.0
}
fn default_min_weapon_gear_score() -> f64 {
    100.0
}
fn default_diminishing_threshold() -> f64 {
    500.0
}
fn default_level_multiplier() -> f64 {
    0.025
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorConstants {
    #[serde(default)]
    pub min_mitigation: f64,
    /// Upper bound of the rating ratio before it is turned into a mitigation
    #[serde(default = "default_max_mitigation")]
    pub max_mitigation: f64,
    #[serde(default = "default_armor_scale_factor")]
    pub physical_scale_factor: f64,
    #[serde(default = "default_armor_scale_factor")]
    pub elemental_scale_factor: f64,
    #[serde(default = "default_armor_exponent")]
    pub mitigation_exponent: f64,
}

impl Default for ArmorConstants {
    fn default() -> Self {
        ArmorConstants {
            min_mitigation: 0.0,
            max_mitigation: 2.0,
            physical_scale_factor: 1850.0,
            elemental_scale_factor: 1850.0,
            mitigation_exponent: 1.2,
        }
    }
}

fn default_max_mitigation() -> f64 {
    2.0
}
fn default_armor_scale_factor() -> f64 {
    1850.0
}
fn default_armor_exponent() -> f64 {
    1.2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipLoadConstants {
    /// Maximum equip load; the ratios below are percentages of it
    #[serde(default = "default_max_load")]
    pub max_load: f64,
    #[serde(default = "default_ratio_normal")]
    pub ratio_normal: f64,
    #[serde(default = "default_ratio_slow")]
    pub ratio_slow: f64,
    #[serde(default = "default_damage_mult_fast")]
    pub damage_mult_fast: f64,
    #[serde(default = "default_damage_mult_normal")]
    pub damage_mult_normal: f64,
    #[serde(default)]
    pub damage_mult_slow: f64,
    #[serde(default = "default_heal_mult_fast")]
    pub heal_mult_fast: f64,
    #[serde(default = "default_heal_mult_normal")]
    pub heal_mult_normal: f64,
    #[serde(default = "default_heal_mult_slow")]
    pub heal_mult_slow: f64,
}

impl Default for EquipLoadConstants {
    fn default() -> Self {
        EquipLoadConstants {
            max_load: 50.0,
            ratio_normal: 26.0,
            ratio_slow: 46.0,
            damage_mult_fast: 0.2,
            damage_mult_normal: 0.1,
            damage_mult_slow: 0.0,
            heal_mult_fast: 1.3,
            heal_mult_normal: 1.0,
            heal_mult_slow: 0.7,
        }
    }
}

fn default_max_load() -> f64 {
    50.0
}
fn default_ratio_normal() -> f64 {
    26.0
}
fn default_ratio_slow() -> f64 {
    46.0
}
fn default_damage_mult_fast() -> f64 {
    0.2
}
fn default_damage_mult_normal() -> f64 {
    0.1
}
fn default_heal_mult_fast() -> f64 {
    1.3
}
fn default_heal_mult_normal() -> f64 {
    1.0
}
fn default_heal_mult_slow() -> f64 {
    0.7
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterConstants {
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    #[serde(default = "default_max_points")]
    pub max_points_per_attribute: i32,
}

impl Default for CharacterConstants {
    fn default() -> Self {
        CharacterConstants {
            max_level: 65,
            max_points_per_attribute: 500,
        }
    }
}

fn default_max_level() -> u32 {
    65
}
fn default_max_points() -> i32 {
    500
}
