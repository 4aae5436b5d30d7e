//! Equipped and active perks

use super::weapon::ActiveWeapon;
use super::{EquippedItem, MannequinState};
use crate::data::{eq_ci, GameData, ItemDefinition};
use crate::modifier::ActivePerk;
use crate::types::EquipSlot;

/// Perk ids of an item, honoring per-slot overrides
///
/// An override replaces the perk of its slot; an empty override clears it.
pub fn item_perk_ids_with_override<'a>(item: &'a ItemDefinition, equipped: &'a EquippedItem) -> Vec<&'a str> {
    item.perk_slots()
        .iter()
        .filter_map(|slot| match equipped.perk_override(slot.key) {
            Some(id) => Some(id).filter(|it| !it.is_empty()),
            None => slot.perk_id,
        })
        .collect()
}

/// Every perk on every equipped item, in equip order
pub fn select_equipped_perks<'d>(db: &'d GameData, state: &MannequinState) -> Vec<ActivePerk<'d>> {
    let mut result = Vec::new();
    for equipped in &state.equipped_items {
        let Some(item) = db.items.get(&equipped.item_id) else {
            continue;
        };
        for perk_id in item_perk_ids_with_override(item, equipped) {
            let Some(perk) = db.perks.get(perk_id) else {
                continue;
            };
            result.push(ActivePerk {
                perk,
                affix: db.affixes.get_opt(perk.affix.as_deref()),
                item: Some(item),
                slot: equipped.slot,
                gear_score: equipped.gear_score,
            });
        }
    }
    result
}

/// Whether a perk applies in the current weapon state
///
/// `OnEquip` perks and perks on non-weapon items always apply. Weapon and
/// shield perks need their item in the active slot (the shield slot counts
/// while a sword or flail is drawn); `OnActive` then applies and
/// `OnUnsheathed` needs the weapon drawn.
pub fn is_perk_active(perk: &ActivePerk<'_>, weapon: &ActiveWeapon<'_>) -> bool {
    let condition = perk.perk.condition_event.as_deref();
    if condition == Some("OnEquip") {
        return true;
    }
    let is_weapon_item = perk.item.is_some_and(|it| it.is_weapon() || it.is_shield());
    if !is_weapon_item {
        return true;
    }
    let pairs_with_shield = weapon
        .weapon_tag
        .as_deref()
        .is_some_and(|tag| eq_ci(tag, "Sword") || eq_ci(tag, "Flail"));
    let is_active_weapon =
        weapon.slot == Some(perk.slot) || (perk.slot == EquipSlot::Weapon3 && pairs_with_shield);
    if !is_active_weapon {
        return false;
    }
    match condition {
        Some("OnActive") => true,
        Some("OnUnsheathed") => weapon.unsheathed,
        _ => false,
    }
}

/// Equipped perks that currently apply
pub fn select_active_perks<'d>(
    db: &'d GameData,
    state: &MannequinState,
    weapon: &ActiveWeapon<'_>,
) -> Vec<ActivePerk<'d>> {
    select_equipped_perks(db, state)
        .into_iter()
        .filter(|it| is_perk_active(it, weapon))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Perk;

    fn item(item_type: &str, class: &str) -> ItemDefinition {
        ItemDefinition {
            item_id: "Item".into(),
            item_type: item_type.into(),
            item_class: vec![class.into()],
            perk1: Some("PerkA".into()),
            perk2: Some("PerkB".into()),
            perk_bucket3: Some("Bucket".into()),
            ..Default::default()
        }
    }

    fn perk(condition: &str) -> Perk {
        Perk {
            perk_id: "Perk".into(),
            condition_event: Some(condition.into()),
            ..Default::default()
        }
    }

    fn active<'a>(perk: &'a Perk, item: &'a ItemDefinition, slot: EquipSlot) -> ActivePerk<'a> {
        ActivePerk {
            perk,
            affix: None,
            item: Some(item),
            slot,
            gear_score: 600.0,
        }
    }

    fn weapon(slot: EquipSlot, tag: &str, unsheathed: bool) -> ActiveWeapon<'static> {
        ActiveWeapon {
            slot: Some(slot),
            weapon_tag: Some(tag.into()),
            unsheathed,
            ..Default::default()
        }
    }

    #[test]
    fn test_perk_override() {
        let item = item("Weapon", "Sword");
        let mut equipped = EquippedItem {
            slot: EquipSlot::Weapon1,
            item_id: "Item".into(),
            gear_score: 600.0,
            perks: Default::default(),
        };
        assert_eq!(item_perk_ids_with_override(&item, &equipped), vec!["PerkA", "PerkB"]);

        equipped.perks.insert("Perk2".into(), String::new());
        equipped.perks.insert("Perk3".into(), "PerkC".into());
        assert_eq!(item_perk_ids_with_override(&item, &equipped), vec!["PerkA", "PerkC"]);
    }

    #[test]
    fn test_on_equip_and_armor_perks_always_active() {
        let sword = item("Weapon", "Sword");
        let armor = item("Armor", "EquippableChest");
        let on_active = perk("OnActive");
        let on_equip = perk("OnEquip");
        let drawn = weapon(EquipSlot::Weapon2, "Bow", false);

        assert!(is_perk_active(&active(&on_equip, &sword, EquipSlot::Weapon1), &drawn));
        assert!(is_perk_active(&active(&on_active, &armor, EquipSlot::Chest), &drawn));
        assert!(!is_perk_active(&active(&on_active, &sword, EquipSlot::Weapon1), &drawn));
    }

    #[test]
    fn test_unsheathed_condition() {
        let sword = item("Weapon", "Sword");
        let on_unsheathed = perk("OnUnsheathed");
        let perk = active(&on_unsheathed, &sword, EquipSlot::Weapon1);
        assert!(!is_perk_active(&perk, &weapon(EquipSlot::Weapon1, "Sword", false)));
        assert!(is_perk_active(&perk, &weapon(EquipSlot::Weapon1, "Sword", true)));
    }

    #[test]
    fn test_shield_slot_follows_sword_and_flail() {
        let shield = item("Weapon", "Shield");
        let on_active = perk("OnActive");
        let perk = active(&on_active, &shield, EquipSlot::Weapon3);
        assert!(is_perk_active(&perk, &weapon(EquipSlot::Weapon1, "Sword", false)));
        assert!(is_perk_active(&perk, &weapon(EquipSlot::Weapon2, "flail", false)));
        assert!(!is_perk_active(&perk, &weapon(EquipSlot::Weapon1, "Spear", false)));
    }
}
