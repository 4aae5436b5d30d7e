//! Active status effects and consumables

use super::MannequinState;
use crate::data::{GameData, StatusEffect};
use crate::modifier::{ActiveConsumable, ActiveEffect, ActivePerk, SourceItem};

/// Resolve status effect ids, skipping and logging unknown ones
pub fn status_effect_list<'d>(db: &'d GameData, ids: &[String]) -> Vec<&'d StatusEffect> {
    ids.iter()
        .filter_map(|id| {
            let effect = db.effects.get(id);
            if effect.is_none() {
                tracing::warn!(effect = %id, "missing status effect");
            }
            effect
        })
        .collect()
}

/// Equipped consumables, assumed to be consumed
pub fn select_active_consumables<'d>(db: &'d GameData, state: &MannequinState) -> Vec<ActiveConsumable<'d>> {
    state
        .equipped_items
        .iter()
        .filter_map(|it| {
            Some(ActiveConsumable {
                item: db.items.get(&it.item_id),
                consumable: db.consumables.get(&it.item_id)?,
            })
        })
        .collect()
}

/// Status effects applied by equipped consumables
pub fn select_consumable_effects<'d>(db: &'d GameData, state: &MannequinState) -> Vec<ActiveEffect<'d>> {
    let mut result = Vec::new();
    for equipped in &state.equipped_items {
        let Some(consumable) = db.consumables.get(&equipped.item_id) else {
            continue;
        };
        let item = db.items.get(&equipped.item_id);
        for id in &consumable.add_status_effects {
            if let Some(effect) = db.effects.get(id) {
                result.push(ActiveEffect {
                    item: item.map(SourceItem::Item),
                    consumable: Some(consumable),
                    ..ActiveEffect::new(effect)
                });
            }
        }
    }
    result
}

/// Status effects of placed housing items, always active
pub fn select_housing_effects<'d>(db: &'d GameData, state: &MannequinState) -> Vec<ActiveEffect<'d>> {
    state
        .equipped_items
        .iter()
        .filter_map(|it| {
            let housing = db.housings.get(&it.item_id)?;
            let effect = db.effects.get_opt(housing.housing_status_effect.as_deref())?;
            Some(ActiveEffect {
                item: Some(SourceItem::Housing(housing)),
                ..ActiveEffect::new(effect)
            })
        })
        .collect()
}

/// Status effects granted through perk affixes
pub fn select_perk_effects<'d>(db: &'d GameData, perks: &[ActivePerk<'d>]) -> Vec<ActiveEffect<'d>> {
    perks
        .iter()
        .filter_map(|perk| {
            let effect = db
                .effects
                .get_opt(perk.affix.and_then(|it| it.status_effect.as_deref()))?;
            Some(ActiveEffect {
                perk: Some(*perk),
                ..ActiveEffect::new(effect)
            })
        })
        .collect()
}

/// Effects forced by the build, such as town buffs, repeated per stack
pub fn select_enforced_effects<'d>(db: &'d GameData, state: &MannequinState) -> Vec<ActiveEffect<'d>> {
    state
        .enforced_effects
        .iter()
        .filter_map(|it| db.effects.get(&it.id).map(|effect| (effect, it.stack)))
        .flat_map(|(effect, stack)| (0..stack).map(move |_| ActiveEffect::new(effect)))
        .collect()
}

/// Every active effect: consumables, housing, perks and enforced effects
pub fn select_active_effects<'d>(
    db: &'d GameData,
    perks: &[ActivePerk<'d>],
    state: &MannequinState,
) -> Vec<ActiveEffect<'d>> {
    let mut result = select_consumable_effects(db, state);
    result.extend(select_housing_effects(db, state));
    result.extend(select_perk_effects(db, perks));
    result.extend(select_enforced_effects(db, state));
    result
}
