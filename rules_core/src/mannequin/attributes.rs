//! Attribute pipeline: base, bonus, assigned points and placement bonuses

use super::MannequinState;
use crate::data::{AttributeLevel, GameData};
use crate::modifier::{ActiveEffect, ActivePerk, ModifierKey};
use crate::types::{AttributeRef, AttributeSet};
use serde::{Deserialize, Serialize};

/// Resolved value of one attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveAttribute {
    /// Table minimum plus equipped attribute modifiers
    pub base: i32,
    /// Consumable effects
    pub bonus: i32,
    /// Player-allocated points
    pub assigned: i32,
    /// Placement bonus distributed by the solver
    pub magnify: i32,
    pub total: i32,
    /// Health granted at exactly this level, 0 if the table has no row
    pub health: f64,
    /// Damage scale at exactly this level, 0 if the table has no row
    pub scale: f64,
    /// Abilities unlocked at or below this level
    pub abilities: Vec<String>,
}

pub(crate) fn mod_key(attr: AttributeRef) -> ModifierKey {
    match attr {
        AttributeRef::Con => ModifierKey::ModConstitution,
        AttributeRef::Dex => ModifierKey::ModDexterity,
        AttributeRef::Foc => ModifierKey::ModFocus,
        AttributeRef::Int => ModifierKey::ModIntelligence,
        AttributeRef::Str => ModifierKey::ModStrength,
    }
}

/// Gear-score multiplier of a perk's attribute modifiers; 1 for non-scaling perks
fn attribute_scale(perk: &ActivePerk<'_>) -> f64 {
    if perk.perk.scaling_per_gear_score != 0.0 {
        perk.affix_multiplier()
    } else {
        1.0
    }
}

/// Lowest table level plus the floored `MOD*` values of every perk affix
pub fn select_equipped_attributes(db: &GameData, perks: &[ActivePerk<'_>]) -> AttributeSet<i32> {
    let mut result = AttributeSet::from_fn(|attr| {
        db.attribute_levels(attr)
            .iter()
            .map(|it| it.level)
            .min()
            .unwrap_or(0)
    });
    for perk in perks {
        let Some(affix) = perk.affix else {
            continue;
        };
        let scale = attribute_scale(perk);
        for attr in AttributeRef::all() {
            let value = affix
                .stats
                .get(mod_key(*attr))
                .and_then(|it| it.as_number())
                .unwrap_or(0.0);
            *result.get_mut(*attr) += (value * scale).floor() as i32;
        }
    }
    result
}

/// Attribute modifiers of effects that come from consumables
///
/// Values are summed as they are and floored once per attribute.
pub fn select_bonus_attributes(effects: &[ActiveEffect<'_>]) -> AttributeSet<i32> {
    let mut sums = AttributeSet::<f64>::default();
    for effect in effects.iter().filter(|it| it.consumable.is_some()) {
        for attr in AttributeRef::all() {
            *sums.get_mut(*attr) += effect
                .effect
                .stats
                .get(mod_key(*attr))
                .and_then(|it| it.as_number())
                .unwrap_or(0.0);
        }
    }
    sums.map(|_, value| value.floor() as i32)
}

/// Placement magnitudes summed per position across all perks
///
/// Each perk's `AttributePlacingMods` list is scaled and floored per entry
/// before the lists are added position by position.
pub fn select_placing_mods(perks: &[ActivePerk<'_>]) -> Vec<i32> {
    let mut result: Vec<i32> = Vec::new();
    for perk in perks {
        let Some(mods) = perk.affix.and_then(|it| it.attribute_placing_mods.as_deref()) else {
            continue;
        };
        if mods.trim().is_empty() {
            continue;
        }
        let scale = attribute_scale(perk);
        for (index, value) in mods.split(',').enumerate() {
            let value: f64 = value.trim().parse().unwrap_or(0.0);
            let value = (value * scale).floor() as i32;
            if result.len() <= index {
                result.resize(index + 1, 0);
            }
            result[index] += value;
        }
    }
    result
}

/// Distribute placement magnitudes over the attributes
///
/// Attributes are ranked by value, highest first, ties kept in canonical
/// order. The first magnitude goes to the highest attribute, the second to
/// the next and so on. Empty or all-zero lists distribute nothing.
pub fn solve_attribute_placing_mods(stats: &AttributeSet<i32>, placing_mods: &[i32]) -> AttributeSet<i32> {
    let mut result = AttributeSet::<i32>::default();
    if placing_mods.iter().all(|it| *it == 0) {
        return result;
    }
    let mut ranked: Vec<(AttributeRef, i32)> = stats.iter().map(|(attr, value)| (attr, *value)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    for ((attr, _), value) in ranked.into_iter().zip(placing_mods) {
        *result.get_mut(attr) += value;
    }
    result
}

fn level_row(levels: &[AttributeLevel], value: i32) -> Option<&AttributeLevel> {
    levels.iter().find(|it| it.level == value)
}

/// Resolve all five attributes of a build
pub fn select_attributes(
    db: &GameData,
    perks: &[ActivePerk<'_>],
    effects: &[ActiveEffect<'_>],
    state: &MannequinState,
) -> AttributeSet<ActiveAttribute> {
    let base = select_equipped_attributes(db, perks);
    let bonus = select_bonus_attributes(effects);
    let placing = select_placing_mods(perks);

    let mut result = AttributeSet::from_fn(|attr| {
        let base = *base.get(attr);
        let bonus = *bonus.get(attr);
        let assigned = *state.assigned_attributes.get(attr);
        ActiveAttribute {
            base,
            bonus,
            assigned,
            total: base + bonus + assigned,
            ..Default::default()
        }
    });

    let totals = result.map(|_, it| it.total);
    let magnify = solve_attribute_placing_mods(&totals, &placing);
    for attr in AttributeRef::all() {
        let levels = db.attribute_levels(*attr);
        let entry = result.get_mut(*attr);
        entry.magnify = *magnify.get(*attr);
        entry.total += entry.magnify;
        let row = level_row(levels, entry.total);
        entry.health = row.map(|it| it.health).unwrap_or(0.0);
        entry.scale = row.map(|it| it.modifier_value_sum).unwrap_or(0.0);
        entry.abilities = levels
            .iter()
            .filter(|it| it.level <= entry.total)
            .flat_map(|it| it.equip_abilities.iter().cloned())
            .collect();
    }
    result
}
