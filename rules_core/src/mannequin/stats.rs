//! Derived stat panels: weapon damage, armor, damage categories and health

use super::attributes::ActiveAttribute;
use super::equip_load::EquipLoadCategory;
use super::weapon::ActiveWeapon;
use super::MannequinState;
use crate::config::GameConstants;
use crate::data::{DamageRow, GameData};
use crate::formula::{crit_mod_sum, damage_for_weapon, damage_scale_attrs, WeaponDamageInput};
use crate::modifier::{modifier_sum, ActiveMods, ModifierKey};
use crate::types::AttributeSet;
use serde::{Deserialize, Serialize};

/// Damage of the selected attack before mitigation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponDamage {
    pub attack_id: String,
    pub damage_type: Option<String>,
    pub base_mod: f64,
    pub crit_mod: f64,
    pub empower_mod: f64,
    pub standard: f64,
    pub crit: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmorRating {
    pub physical: f64,
    pub elemental: f64,
}

/// Summed value of one modifier key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatTotal {
    pub key: ModifierKey,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildStats {
    pub weapon_damage: Option<WeaponDamage>,
    pub armor: ArmorRating,
    /// Non-zero `DMG*` sums
    pub damage: Vec<StatTotal>,
    /// Non-zero `ABS*` sums
    pub absorption: Vec<StatTotal>,
    pub max_health: f64,
    pub heal_mult: f64,
}

/// Standard and crit damage of the selected attack
///
/// `None` without weapon stats or attack. The equip load category adds its
/// damage bonus to the base damage modifiers.
pub fn select_weapon_damage(
    weapon: &ActiveWeapon<'_>,
    attack: Option<&DamageRow>,
    attributes: &AttributeSet<ActiveAttribute>,
    mods: &ActiveMods<'_>,
    state: &MannequinState,
    category: EquipLoadCategory,
    constants: &GameConstants,
) -> Option<WeaponDamage> {
    let stats = weapon.weapon?;
    let attack = attack?;
    let damage_type = attack.damage_type.clone();
    let base_mod = modifier_sum(ModifierKey::BaseDamage, mods).value + category.damage_mult(&constants.equip_load);
    let crit_mod = crit_mod_sum(
        stats.crit_damage_multiplier,
        modifier_sum(ModifierKey::CritDamage, mods).value,
    );
    let empower_mod = damage_type
        .as_deref()
        .and_then(ModifierKey::empower)
        .map(|key| modifier_sum(key, mods).value)
        .unwrap_or(0.0);

    let input = WeaponDamageInput {
        player_level: state.level,
        base_damage: stats.base_damage,
        weapon_gear_score: weapon.gear_score,
        weapon_scale: damage_scale_attrs(stats),
        attributes: attributes.map(|_, it| it.scale),
        damage_coef: attack.dmg_coef,
        ammo_mod: weapon.ammo.map(|it| it.damage_modifier).unwrap_or(0.0),
        base_mod,
        crit_mod: 0.0,
        empower_mod,
    };
    let standard = damage_for_weapon(&input, constants);
    let crit = damage_for_weapon(&WeaponDamageInput { crit_mod, ..input }, constants);

    Some(WeaponDamage {
        attack_id: attack.damage_id.clone(),
        damage_type,
        base_mod,
        crit_mod,
        empower_mod,
        standard,
        crit,
    })
}

/// Armor of equipped armor and shields plus armor modifiers
pub fn select_armor_rating(db: &GameData, state: &MannequinState, mods: &ActiveMods<'_>) -> ArmorRating {
    let mut rating = ArmorRating::default();
    for item in state.equipped_items.iter().filter_map(|it| db.items.get(&it.item_id)) {
        let stats_ref = item.item_stats_ref.as_deref();
        if item.is_armor() {
            if let Some(armor) = db.armors.get_opt(stats_ref) {
                rating.physical += armor.physical_armor;
                rating.elemental += armor.elemental_armor;
            }
        } else if item.is_shield() {
            if let Some(shield) = db.weapons.get_opt(stats_ref) {
                rating.physical += shield.physical_armor;
                rating.elemental += shield.elemental_armor;
            }
        }
    }
    rating.physical += modifier_sum(ModifierKey::PhysicalArmor, mods).value;
    rating.elemental += modifier_sum(ModifierKey::ElementalArmor, mods).value;
    rating
}

fn totals(keys: impl Iterator<Item = ModifierKey>, mods: &ActiveMods<'_>) -> Vec<StatTotal> {
    keys.map(|key| StatTotal {
        key,
        value: modifier_sum(key, mods).value,
    })
    .filter(|it| it.value != 0.0)
    .collect()
}

pub fn select_damage_totals(mods: &ActiveMods<'_>) -> Vec<StatTotal> {
    totals(ModifierKey::damages(), mods)
}

pub fn select_absorption_totals(mods: &ActiveMods<'_>) -> Vec<StatTotal> {
    totals(ModifierKey::absorptions(), mods)
}

/// Attribute health scaled by `MaxHealthMod`
pub fn select_max_health(attributes: &AttributeSet<ActiveAttribute>, mods: &ActiveMods<'_>) -> f64 {
    let health: f64 = attributes.iter().map(|(_, it)| it.health).sum();
    health * (1.0 + modifier_sum(ModifierKey::MaxHealthMod, mods).value)
}

#[allow(clippy::too_many_arguments)]
pub fn select_stats(
    db: &GameData,
    state: &MannequinState,
    weapon: &ActiveWeapon<'_>,
    attack: Option<&DamageRow>,
    attributes: &AttributeSet<ActiveAttribute>,
    mods: &ActiveMods<'_>,
    category: EquipLoadCategory,
    constants: &GameConstants,
) -> BuildStats {
    BuildStats {
        weapon_damage: select_weapon_damage(weapon, attack, attributes, mods, state, category, constants),
        armor: select_armor_rating(db, state, mods),
        damage: select_damage_totals(mods),
        absorption: select_absorption_totals(mods),
        max_health: select_max_health(attributes, mods),
        heal_mult: category.heal_mult(&constants.equip_load),
    }
}
