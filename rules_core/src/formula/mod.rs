//! DamageFormulas - gear score, level, attribute and armor scaling
//!
//! Pure numeric functions shared by the build pipeline and the sandbox.

use crate::config::{ArmorConstants, DamageConstants, GameConstants, GearScoreConstants};
use crate::data::WeaponStats;
use crate::types::AttributeSet;
use serde::{Deserialize, Serialize};

/// Round to 8 decimals
///
/// Table values are stored with fixed precision; rounding keeps float noise
/// from leaking into the scaling curves.
pub fn patch_precision(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}

/// Clamp a gear score into range and snap it to the rounding interval
pub fn round_gear_score(gear_score: f64, constants: &GearScoreConstants) -> f64 {
    let gear_score = gear_score.clamp(constants.min, constants.max);
    let steps = gear_score / constants.rounding_interval;
    let steps = if constants.round_up {
        steps.ceil()
    } else {
        steps.floor()
    };
    steps * constants.rounding_interval
}

/// Damage multiplier of a weapon gear score
///
/// Compounds per interval up to the diminishing threshold, and with a reduced
/// increase above it.
pub fn damage_factor_for_gs(gear_score: f64, constants: &GameConstants) -> f64 {
    let dmg = &constants.damage;
    let gear_score = round_gear_score(gear_score, &constants.gear_score)
        .max(dmg.min_possible_weapon_gear_score);
    let increase = dmg.base_damage_compound_increase;
    let diminished = increase * dmg.compound_increase_diminishing_multiplier;

    let below = (gear_score.min(dmg.diminishing_gear_score_threshold) - dmg.min_possible_weapon_gear_score)
        / dmg.gear_score_interval;
    let above = (gear_score - dmg.diminishing_gear_score_threshold).max(0.0) / dmg.gear_score_interval;
    (1.0 + increase).powf(below) * (1.0 + diminished).powf(above)
}

/// Additive damage bonus of the character level
pub fn damage_factor_for_level(level: u32, constants: &DamageConstants) -> f64 {
    f64::from(level.max(1) - 1) * constants.level_damage_multiplier
}

/// Attribute scaling columns of a weapon
pub fn damage_scale_attrs(weapon: &WeaponStats) -> AttributeSet<f64> {
    AttributeSet {
        constitution: 0.0,
        dexterity: weapon.scaling_dexterity,
        focus: weapon.scaling_focus,
        intelligence: weapon.scaling_intelligence,
        strength: weapon.scaling_strength,
    }
}

/// Additive damage bonus of the attributes a weapon scales with
///
/// `attributes` holds the per-attribute scale values from the level tables.
pub fn damage_factor_for_attrs(weapon: &AttributeSet<f64>, attributes: &AttributeSet<f64>) -> f64 {
    weapon
        .iter()
        .map(|(attr, scale)| scale * attributes.get(attr))
        .sum()
}

/// Inputs of a single weapon hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponDamageInput {
    pub player_level: u32,
    pub base_damage: f64,
    pub weapon_gear_score: f64,
    pub weapon_scale: AttributeSet<f64>,
    pub attributes: AttributeSet<f64>,
    pub damage_coef: f64,
    pub ammo_mod: f64,
    pub base_mod: f64,
    pub crit_mod: f64,
    pub empower_mod: f64,
}

/// Damage of one hit before mitigation
pub fn damage_for_weapon(input: &WeaponDamageInput, constants: &GameConstants) -> f64 {
    let gs = damage_factor_for_gs(input.weapon_gear_score, constants);
    let level = damage_factor_for_level(input.player_level, &constants.damage);
    let attrs = damage_factor_for_attrs(&input.weapon_scale, &input.attributes);
    input.base_damage
        * input.damage_coef
        * gs
        * (1.0 + level + attrs)
        * (1.0 + input.ammo_mod)
        * (1.0 + input.base_mod + input.crit_mod)
        * (1.0 + input.empower_mod)
}

/// Crit bonus on top of a normal hit, never negative
pub fn crit_mod_sum(crit_damage_multiplier: f64, crit_mods: f64) -> f64 {
    (crit_damage_multiplier - 1.0 + crit_mods).max(0.0)
}

/// Effective gear score in player versus player combat
///
/// Without both average gear scores the weapon gear score is used as is.
pub fn pvp_gear_score(
    weapon_gear_score: f64,
    attacker_avg_gear_score: f64,
    defender_avg_gear_score: f64,
    constants: &GearScoreConstants,
) -> f64 {
    if attacker_avg_gear_score <= 0.0 || defender_avg_gear_score <= 0.0 {
        return weapon_gear_score;
    }
    (weapon_gear_score + attacker_avg_gear_score - defender_avg_gear_score).clamp(constants.min, constants.max)
}

/// Inputs of an armor mitigation check
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MitigationInput {
    pub armor_rating: f64,
    pub armor_penetration: f64,
    pub gear_score: f64,
    /// `true` for elemental damage
    pub elemental: bool,
}

/// Share of damage that passes the defender's armor
///
/// Returns 1 when the armor scale is not positive.
pub fn damage_mitigation_factor(input: &MitigationInput, constants: &GameConstants) -> f64 {
    let armor: &ArmorConstants = &constants.armor;
    let scale = if input.elemental {
        armor.elemental_scale_factor
    } else {
        armor.physical_scale_factor
    };
    let denominator = scale * damage_factor_for_gs(input.gear_score, constants);
    if denominator <= 0.0 || !denominator.is_finite() {
        return 1.0;
    }
    let rating = input.armor_rating.max(0.0) * (1.0 - input.armor_penetration.clamp(0.0, 1.0));
    let ratio = (rating / denominator)
        .powf(armor.mitigation_exponent)
        .clamp(armor.min_mitigation, armor.max_mitigation);
    1.0 - ratio / (1.0 + ratio)
}
