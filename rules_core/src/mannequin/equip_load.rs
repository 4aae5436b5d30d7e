//! Equip load from armor and shield weights

use super::MannequinState;
use crate::config::EquipLoadConstants;
use crate::data::GameData;
use crate::modifier::{ActivePerk, ModifierKey};
use serde::{Deserialize, Serialize};

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|it| *it != 0.0)
}

/// Total weight of equipped armor and shields
///
/// Each item weighs its stats row's `WeightOverride` or else its own `Weight`,
/// in tenths. The first perk on the same item scales it by `1 + WeightMultiplier`.
pub fn select_equip_load(db: &GameData, state: &MannequinState, perks: &[ActivePerk<'_>]) -> f64 {
    state
        .equipped_items
        .iter()
        .filter_map(|it| db.items.get(&it.item_id))
        .filter(|item| item.is_armor() || item.is_shield())
        .map(|item| {
            let stats_ref = item.item_stats_ref.as_deref();
            let weight = non_zero(db.weapons.get_opt(stats_ref).and_then(|it| it.weight_override))
                .or_else(|| non_zero(db.armors.get_opt(stats_ref).and_then(|it| it.weight_override)))
                .or(item.weight)
                .unwrap_or(0.0);
            let multiplier = perks
                .iter()
                .find(|perk| perk.item.is_some_and(|it| std::ptr::eq(it, item)))
                .and_then(|perk| perk.affix)
                .and_then(|affix| affix.stats.get(ModifierKey::WeightMultiplier))
                .and_then(|it| it.as_number())
                .unwrap_or(0.0);
            weight.floor() / 10.0 * (1.0 + multiplier)
        })
        .sum()
}

/// Movement class derived from the equip load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquipLoadCategory {
    Light,
    Medium,
    Heavy,
}

impl EquipLoadCategory {
    /// Additive damage bonus of the category
    pub fn damage_mult(&self, constants: &EquipLoadConstants) -> f64 {
        match self {
            EquipLoadCategory::Light => constants.damage_mult_fast,
            EquipLoadCategory::Medium => constants.damage_mult_normal,
            EquipLoadCategory::Heavy => constants.damage_mult_slow,
        }
    }

    /// Multiplier on outgoing healing
    pub fn heal_mult(&self, constants: &EquipLoadConstants) -> f64 {
        match self {
            EquipLoadCategory::Light => constants.heal_mult_fast,
            EquipLoadCategory::Medium => constants.heal_mult_normal,
            EquipLoadCategory::Heavy => constants.heal_mult_slow,
        }
    }
}

pub fn equip_load_category(load: f64, constants: &EquipLoadConstants) -> EquipLoadCategory {
    let normal = constants.max_load * constants.ratio_normal / 100.0;
    let slow = constants.max_load * constants.ratio_slow / 100.0;
    if load < normal {
        EquipLoadCategory::Light
    } else if load < slow {
        EquipLoadCategory::Medium
    } else {
        EquipLoadCategory::Heavy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Affix, Perk};
    use crate::mannequin::EquippedItem;
    use crate::types::EquipSlot;

    fn db() -> GameData {
        GameData::from_json(
            r#"{
                "items": [
                    {"ItemID": "Chest", "ItemType": "Armor", "ItemStatsRef": "Chest_T5", "Weight": 99},
                    {"ItemID": "Legs", "ItemType": "Armor", "Weight": 45.5},
                    {"ItemID": "Shield", "ItemType": "Weapon", "ItemClass": ["Shield"], "ItemStatsRef": "Shield_T5"},
                    {"ItemID": "Sword", "ItemType": "Weapon", "ItemClass": ["Sword"], "Weight": 70}
                ],
                "armors": [{"ArmorID": "Chest_T5", "WeightOverride": 80}],
                "weapons": [{"WeaponID": "Shield_T5", "WeightOverride": 60}]
            }"#,
        )
        .unwrap()
    }

    fn equipped(slot: EquipSlot, item_id: &str) -> EquippedItem {
        EquippedItem {
            slot,
            item_id: item_id.into(),
            gear_score: 600.0,
            perks: Default::default(),
        }
    }

    #[test]
    fn test_equip_load_counts_armor_and_shields() {
        let db = db();
        let state = MannequinState {
            equipped_items: vec![
                equipped(EquipSlot::Chest, "Chest"),
                equipped(EquipSlot::Legs, "Legs"),
                equipped(EquipSlot::Weapon3, "Shield"),
                equipped(EquipSlot::Weapon1, "Sword"),
            ],
            ..Default::default()
        };
        let load = select_equip_load(&db, &state, &[]);
        assert!((load - (8.0 + 4.5 + 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_weight_multiplier_from_item_perk() {
        let db = db();
        let state = MannequinState {
            equipped_items: vec![equipped(EquipSlot::Chest, "Chest")],
            ..Default::default()
        };
        let perk = Perk::default();
        let mut affix = Affix::default();
        affix.stats.set_number(ModifierKey::WeightMultiplier, -0.5);
        let chest = db.items.get("Chest").unwrap();
        let perks = [ActivePerk {
            perk: &perk,
            affix: Some(&affix),
            item: Some(chest),
            slot: EquipSlot::Chest,
            gear_score: 600.0,
        }];
        assert!((select_equip_load(&db, &state, &perks) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_equip_load_category() {
        let constants = EquipLoadConstants::default();
        assert_eq!(equip_load_category(12.9, &constants), EquipLoadCategory::Light);
        assert_eq!(equip_load_category(13.0, &constants), EquipLoadCategory::Medium);
        assert_eq!(equip_load_category(23.0, &constants), EquipLoadCategory::Heavy);
        assert_eq!(EquipLoadCategory::Light.damage_mult(&constants), 0.2);
        assert_eq!(EquipLoadCategory::Heavy.heal_mult(&constants), 0.7);
    }
}
