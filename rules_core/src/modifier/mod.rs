//! ModifierEngine - aggregates stat properties over the active game objects
//!
//! `each_modifier` walks the sources in a fixed order: bonuses, effects, perk
//! affixes, abilities, ability self-effects and (for `DMGVitalsCategory`
//! only) consumables. Within a category the input order is kept. The walk is
//! lazy, so existence checks stop at the first hit.

mod perk;
mod property;

pub use perk::{
    affix_abss, affix_mods, affix_properties, has_perk_inherent_affix, is_perk_applicable_to_item,
    is_perk_gem, is_perk_generated, is_perk_inherent, item_gs_bonus, perk_gem_abss,
    perk_inherent_mods, perk_multiplier, AffixProperty, AffixStat,
};
pub use property::{ModifierKey, ModifierStats, PropertyKind, PropertyValue, UnknownModifierKey};

use crate::data::{
    fold, Ability, Affix, Consumable, HousingItem, ItemDefinition, Perk, StatusEffect,
};
use crate::types::EquipSlot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Item a modifier was granted by
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SourceItem<'a> {
    Item(&'a ItemDefinition),
    Housing(&'a HousingItem),
}

/// A flat, named value added on top of everything else
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveBonus {
    pub key: ModifierKey,
    pub name: String,
    pub value: f64,
}

/// A perk on an equipped item
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivePerk<'a> {
    pub perk: &'a Perk,
    pub affix: Option<&'a Affix>,
    pub item: Option<&'a ItemDefinition>,
    pub slot: EquipSlot,
    pub gear_score: f64,
}

impl<'a> ActivePerk<'a> {
    /// Multiplier for effects and abilities granted by this perk
    pub fn multiplier(&self) -> f64 {
        perk_multiplier(self.perk, self.gear_score)
    }

    /// Multiplier for the perk's own affix, including the item's gear score bonus
    pub fn affix_multiplier(&self) -> f64 {
        perk_multiplier(self.perk, self.gear_score + item_gs_bonus(self.perk, self.item))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveEffect<'a> {
    pub effect: &'a StatusEffect,
    pub perk: Option<ActivePerk<'a>>,
    pub ability: Option<&'a Ability>,
    pub item: Option<SourceItem<'a>>,
    /// Set when the effect comes from a consumed item
    pub consumable: Option<&'a Consumable>,
}

impl<'a> ActiveEffect<'a> {
    pub fn new(effect: &'a StatusEffect) -> Self {
        ActiveEffect {
            effect,
            perk: None,
            ability: None,
            item: None,
            consumable: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveAbility<'a> {
    pub ability: &'a Ability,
    /// Status effects the ability applies to its owner
    pub self_effects: Vec<&'a StatusEffect>,
    pub perk: Option<ActivePerk<'a>>,
    /// Ability specific scale, 1 for most abilities
    pub scale: f64,
}

impl<'a> ActiveAbility<'a> {
    fn multiplier(&self) -> f64 {
        let perk = self.perk.map(|it| it.multiplier()).unwrap_or(1.0);
        if self.scale != 0.0 {
            perk * self.scale
        } else {
            perk
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveConsumable<'a> {
    pub item: Option<&'a ItemDefinition>,
    pub consumable: &'a Consumable,
}

/// Snapshot of every active modifier source of a build
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActiveMods<'a> {
    pub bonuses: Vec<ActiveBonus>,
    pub effects: Vec<ActiveEffect<'a>>,
    pub perks: Vec<ActivePerk<'a>>,
    pub abilities: Vec<ActiveAbility<'a>>,
    pub consumables: Vec<ActiveConsumable<'a>>,
}

/// Provenance of a modifier value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModifierSource<'a> {
    pub label: Option<String>,
    pub perk: Option<&'a Perk>,
    pub ability: Option<&'a Ability>,
    pub item: Option<SourceItem<'a>>,
    pub slot: Option<EquipSlot>,
    pub effect: Option<&'a StatusEffect>,
}

/// One contribution to a property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifierValue<'a> {
    pub value: PropertyValue<'a>,
    pub scale: f64,
    pub source: ModifierSource<'a>,
}

impl<'a> ModifierValue<'a> {
    /// Numeric contribution, `None` for text values
    pub fn scaled(&self) -> Option<f64> {
        self.value.as_number().map(|value| value * self.scale)
    }
}

/// Accumulated value of a property with its ordered sources
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModifierResult<'a> {
    pub value: f64,
    pub source: Vec<ModifierValue<'a>>,
}

/// Start a result, optionally seeded with a base contribution
pub fn modifier_result(base: Option<ModifierValue<'_>>) -> ModifierResult<'_> {
    match base {
        Some(base) => ModifierResult {
            value: base.value.as_number().unwrap_or(0.0),
            source: vec![base],
        },
        None => ModifierResult::default(),
    }
}

fn contributes(mod_value: &ModifierValue<'_>) -> Option<f64> {
    mod_value
        .scaled()
        .filter(|_| mod_value.value.is_truthy())
}

/// Add a contribution; zero and text values are ignored
pub fn modifier_add<'a>(result: &mut ModifierResult<'a>, mod_value: ModifierValue<'a>) {
    if let Some(value) = contributes(&mod_value) {
        result.value += value;
        result.source.push(mod_value);
    }
}

/// Multiply by a contribution; zero and text values are ignored
pub fn modifier_mult<'a>(result: &mut ModifierResult<'a>, mod_value: ModifierValue<'a>) {
    if let Some(value) = contributes(&mod_value) {
        result.value *= value;
        result.source.push(mod_value);
    }
}

/// Active effects with their stack limits applied
///
/// An effect with `StackMax` is dropped once that many effects with the same
/// status id have been seen.
pub fn each_effect<'m, 'a>(mods: &'m ActiveMods<'a>) -> impl Iterator<Item = &'m ActiveEffect<'a>> {
    let mut stack: HashMap<String, u32> = HashMap::new();
    mods.effects.iter().filter(move |it| {
        let Some(max) = it.effect.stack_max.filter(|max| *max > 0) else {
            return true;
        };
        let count = stack.entry(fold(&it.effect.status_id)).or_insert(0);
        let seen = *count;
        *count += 1;
        seen < max
    })
}

/// Active abilities with their stack limits applied
///
/// A stackable ability with `IsStackableMax` is dropped once its running
/// count exceeds the maximum.
pub fn each_ability<'m, 'a>(mods: &'m ActiveMods<'a>) -> impl Iterator<Item = &'m ActiveAbility<'a>> {
    let mut stack: HashMap<String, u32> = HashMap::new();
    mods.abilities.iter().filter(move |it| {
        let count = stack.entry(fold(&it.ability.ability_id)).or_insert(0);
        *count += 1;
        match it.ability.is_stackable_max.filter(|max| *max > 0) {
            Some(max) if it.ability.is_stackable_ability => *count <= max,
            _ => true,
        }
    })
}

pub fn each_perk<'m, 'a>(mods: &'m ActiveMods<'a>) -> impl Iterator<Item = &'m ActivePerk<'a>> {
    mods.perks.iter()
}

pub fn each_bonus<'m>(mods: &'m ActiveMods<'_>) -> impl Iterator<Item = &'m ActiveBonus> {
    mods.bonuses.iter()
}

fn truthy<'a>(value: Option<PropertyValue<'a>>) -> Option<PropertyValue<'a>> {
    value.filter(PropertyValue::is_truthy)
}

/// Every contribution to `key`, in source order
pub fn each_modifier<'m, 'a>(
    key: ModifierKey,
    mods: &'m ActiveMods<'a>,
) -> impl Iterator<Item = ModifierValue<'a>> + 'm {
    let bonuses = each_bonus(mods)
        .filter(move |bonus| bonus.key == key)
        .map(|bonus| ModifierValue {
            value: PropertyValue::Number(bonus.value),
            scale: 1.0,
            source: ModifierSource {
                label: Some(bonus.name.clone()),
                ..Default::default()
            },
        });

    let effects = each_effect(mods).filter_map(move |it| {
        let effect: &'a StatusEffect = it.effect;
        let value = truthy(effect.stats.get(key))?;
        Some(ModifierValue {
            value,
            scale: it.perk.map(|perk| perk.multiplier()).unwrap_or(1.0),
            source: ModifierSource {
                ability: it.ability,
                perk: it.perk.map(|perk| perk.perk),
                item: it.item,
                slot: it.perk.map(|perk| perk.slot),
                effect: Some(effect),
                ..Default::default()
            },
        })
    });

    let perks = each_perk(mods).filter_map(move |it| {
        let affix: &'a Affix = it.affix?;
        let value = truthy(affix.stats.get(key))?;
        Some(ModifierValue {
            value,
            scale: it.affix_multiplier(),
            source: ModifierSource {
                perk: Some(it.perk),
                item: it.item.map(SourceItem::Item),
                slot: Some(it.slot),
                ..Default::default()
            },
        })
    });

    let abilities = each_ability(mods).filter_map(move |it| {
        let ability: &'a Ability = it.ability;
        let value = truthy(ability.stats.get(key))?;
        Some(ModifierValue {
            value,
            scale: it.multiplier(),
            source: ModifierSource {
                ability: Some(ability),
                perk: it.perk.map(|perk| perk.perk),
                ..Default::default()
            },
        })
    });

    let self_effects = each_ability(mods).flat_map(move |it| {
        it.self_effects.iter().filter_map(move |&effect| {
            let value = truthy(effect.stats.get(key))?;
            Some(ModifierValue {
                value,
                scale: it.multiplier(),
                source: ModifierSource {
                    ability: Some(it.ability),
                    perk: it.perk.map(|perk| perk.perk),
                    effect: Some(effect),
                    ..Default::default()
                },
            })
        })
    });

    let consumables = mods
        .consumables
        .iter()
        .filter(move |_| key == ModifierKey::DmgVitalsCategory)
        .filter_map(move |it| {
            let consumable: &'a Consumable = it.consumable;
            let value = truthy(consumable.stats.get(key))?;
            Some(ModifierValue {
                value,
                scale: 1.0,
                source: ModifierSource {
                    item: it.item.map(SourceItem::Item),
                    ..Default::default()
                },
            })
        });

    bonuses
        .chain(effects)
        .chain(perks)
        .chain(abilities)
        .chain(self_effects)
        .chain(consumables)
}

/// Sum every contribution to `key`
pub fn modifier_sum<'a>(key: ModifierKey, mods: &ActiveMods<'a>) -> ModifierResult<'a> {
    modifier_sum_by(key, mods, |_| true)
}

/// Sum the contributions to `key` accepted by `predicate`
pub fn modifier_sum_by<'a, P>(key: ModifierKey, mods: &ActiveMods<'a>, mut predicate: P) -> ModifierResult<'a>
where
    P: FnMut(&ModifierValue<'a>) -> bool,
{
    let mut result = modifier_result(None);
    for value in each_modifier(key, mods) {
        if predicate(&value) {
            modifier_add(&mut result, value);
        }
    }
    result
}

/// Whether any source contributes to `key`
pub fn has_modifier(key: ModifierKey, mods: &ActiveMods<'_>) -> bool {
    each_modifier(key, mods).next().is_some()
}
