//! Active weapon, its ammo and its attacks

use super::MannequinState;
use crate::config::WeaponTypes;
use crate::data::{eq_ci, AmmoStats, DamageRow, GameData, ItemDefinition, WeaponStats};
use crate::types::EquipSlot;
use serde::Serialize;

/// Weapon stats row used when no weapon is drawn
pub const UNARMED_WEAPON_ID: &str = "Unarmed";
/// Damage table prefix of unarmed attacks
pub const UNARMED_DAMAGE_PREFIX: &str = "Unarmed_";

/// The weapon in the selected weapon slot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActiveWeapon<'d> {
    pub item: Option<&'d ItemDefinition>,
    pub weapon: Option<&'d WeaponStats>,
    pub weapon_tag: Option<String>,
    pub gear_score: f64,
    pub slot: Option<EquipSlot>,
    pub unsheathed: bool,
    /// Equipped ammo, only when it fits the weapon
    pub ammo: Option<&'d AmmoStats>,
}

/// Resolve the weapon of the selected slot
///
/// Falls back to the unarmed stats row when the slot is empty. Ammo is taken
/// from the arrow or cartridge slot and kept only if its type matches the
/// weapon family.
pub fn select_active_weapon<'d>(
    db: &'d GameData,
    weapon_types: &WeaponTypes,
    state: &MannequinState,
) -> ActiveWeapon<'d> {
    let equipped = state
        .equipped_items
        .iter()
        .find(|it| state.weapon_active.is_active_slot(it.slot));
    let item = db.items.get_opt(equipped.map(|it| it.item_id.as_str()));
    let weapon = db
        .weapons
        .get_opt(item.and_then(|it| it.item_stats_ref.as_deref()))
        .or_else(|| db.weapons.get(UNARMED_WEAPON_ID));
    let weapon_type = weapon.and_then(|it| weapon_types.for_weapon(it));
    let weapon_tag = weapon_type.map(|it| it.weapon_tag.clone());

    let ammo_slot = match weapon.and_then(|it| it.ammo_type.as_deref()) {
        Some("Arrow") => Some(EquipSlot::Arrow),
        Some("Shot") => Some(EquipSlot::Cartridge),
        _ => None,
    };
    let ammo = ammo_slot
        .and_then(|slot| state.equipped_item(slot))
        .and_then(|it| db.ammos.get(&it.item_id))
        .filter(|ammo| {
            weapon_type
                .and_then(|it| it.ammo_type.as_deref())
                .is_some_and(|expected| eq_ci(&ammo.ammo_type, expected))
        });

    ActiveWeapon {
        item,
        weapon,
        weapon_tag,
        gear_score: equipped.map(|it| it.gear_score).unwrap_or(0.0),
        slot: equipped.map(|it| it.slot),
        unsheathed: state.weapon_unsheathed,
        ammo,
    }
}

/// Light and heavy attacks of the active weapon
///
/// A weapon with a tag but no catalog entry has no known attacks.
pub fn select_weapon_attacks<'d>(
    db: &'d GameData,
    weapon_types: &WeaponTypes,
    weapon: &ActiveWeapon<'_>,
) -> Vec<&'d DamageRow> {
    let weapon_type = weapon.weapon_tag.as_deref().and_then(|tag| weapon_types.by_tag(tag));
    if weapon.weapon_tag.is_some() && weapon_type.is_none() {
        return Vec::new();
    }
    let prefix = weapon_type
        .map(|it| it.damage_table_prefix.as_str())
        .unwrap_or(UNARMED_DAMAGE_PREFIX);
    db.damage_table
        .iter()
        .filter(|row| row.dmg_coef != 0.0)
        .filter(|row| row.damage_id.starts_with(prefix))
        .filter(|row| row.attack_type == "Light" || row.attack_type == "Heavy")
        .collect()
}

/// The selected attack, or the first attack when none is selected
pub fn select_damage_table_row<'d>(rows: &[&'d DamageRow], state: &MannequinState) -> Option<&'d DamageRow> {
    state
        .selected_attack
        .as_deref()
        .and_then(|selected| rows.iter().copied().find(|it| it.damage_id == selected))
        .or_else(|| rows.first().copied())
}
