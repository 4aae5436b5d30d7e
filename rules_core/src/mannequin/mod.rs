//! BuildResolver - character build state to derived stats
//!
//! The pipeline is a chain of pure selectors over `GameData` and a
//! `MannequinState`: active weapon, perks, effects, attributes, abilities,
//! equip load and finally the stat panels. `Mannequin::resolve` runs the
//! whole chain and returns a fresh `ResolvedBuild` each time.

pub mod abilities;
pub mod attributes;
pub mod conditions;
pub mod effects;
pub mod equip_load;
pub mod perks;
pub mod stats;
pub mod weapon;

pub use abilities::{
    ability_scale, is_active_ability, select_active_abilities, select_activated_abilities,
    select_all_abilities, select_attribute_abilities, select_perk_abilities, select_weapon_abilities,
};
pub use attributes::{
    select_attributes, select_bonus_attributes, select_equipped_attributes, select_placing_mods,
    solve_attribute_placing_mods, ActiveAttribute,
};
pub use conditions::{AllConditionsPass, ConditionCheck};
pub use effects::{
    select_active_consumables, select_active_effects, select_consumable_effects, select_enforced_effects,
    select_housing_effects, select_perk_effects, status_effect_list,
};
pub use equip_load::{equip_load_category, select_equip_load, EquipLoadCategory};
pub use perks::{is_perk_active, item_perk_ids_with_override, select_active_perks, select_equipped_perks};
pub use stats::{select_stats, ArmorRating, BuildStats, StatTotal, WeaponDamage};
pub use weapon::{select_active_weapon, select_damage_table_row, select_weapon_attacks, ActiveWeapon};

use crate::config::{
    default_ability_deny_list, default_weapon_types, AbilityDenyList, ConfigError, GameConstants, WeaponTypes,
};
use crate::data::{eq_ci, DamageRow, GameData};
use crate::modifier::{ActiveBonus, ActiveMods};
use crate::types::{AttributeSet, EquipSlot, WeaponSelection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An item in a build slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquippedItem {
    pub slot: EquipSlot,
    pub item_id: String,
    #[serde(default)]
    pub gear_score: f64,
    /// Perk overrides keyed by perk slot (`Perk1` .. `Perk5`)
    #[serde(default)]
    pub perks: BTreeMap<String, String>,
}

impl EquippedItem {
    /// Override for a perk slot; an empty string clears the slot
    pub fn perk_override(&self, key: &str) -> Option<&str> {
        self.perks
            .iter()
            .find(|(slot, _)| eq_ci(slot, key))
            .map(|(_, id)| id.as_str())
    }
}

/// Status effect forced onto the build, e.g. a town buff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnforcedEffect {
    pub id: String,
    #[serde(default = "default_stack")]
    pub stack: u32,
}

fn default_stack() -> u32 {
    1
}

/// Abilities picked in the two skill trees of one weapon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquippedSkills {
    pub weapon: String,
    #[serde(default)]
    pub tree1: Vec<String>,
    #[serde(default)]
    pub tree2: Vec<String>,
}

/// Character build input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MannequinState {
    pub level: u32,
    pub equipped_items: Vec<EquippedItem>,
    pub assigned_attributes: AttributeSet<i32>,
    pub weapon_active: WeaponSelection,
    pub weapon_unsheathed: bool,
    /// Damage table id of the selected attack
    pub selected_attack: Option<String>,
    pub enforced_effects: Vec<EnforcedEffect>,
    pub activated_abilities: Vec<String>,
    pub equipped_skills1: Option<EquippedSkills>,
    pub equipped_skills2: Option<EquippedSkills>,
    /// Enemies nearby, for abilities scaling with `NumAroundMe`
    pub num_around_me: f64,
    /// Consecutive hits, for the mauler ultimate
    pub num_hits: f64,
    pub bonuses: Vec<ActiveBonus>,
}

impl Default for MannequinState {
    fn default() -> Self {
        MannequinState {
            level: 65,
            equipped_items: Vec::new(),
            assigned_attributes: AttributeSet::default(),
            weapon_active: WeaponSelection::Primary,
            weapon_unsheathed: false,
            selected_attack: None,
            enforced_effects: Vec::new(),
            activated_abilities: Vec::new(),
            equipped_skills1: None,
            equipped_skills2: None,
            num_around_me: 0.0,
            num_hits: 0.0,
            bonuses: Vec::new(),
        }
    }
}

impl MannequinState {
    /// First item equipped in `slot`
    pub fn equipped_item(&self, slot: EquipSlot) -> Option<&EquippedItem> {
        self.equipped_items.iter().find(|it| it.slot == slot)
    }
}

/// Everything derived from one build state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBuild<'d> {
    pub weapon: ActiveWeapon<'d>,
    pub attacks: Vec<&'d DamageRow>,
    pub attack: Option<&'d DamageRow>,
    pub attributes: AttributeSet<ActiveAttribute>,
    pub mods: ActiveMods<'d>,
    pub equip_load: f64,
    pub equip_load_category: EquipLoadCategory,
    pub stats: BuildStats,
}

/// Build resolver bound to one set of game data and configuration
#[derive(Debug, Clone)]
pub struct Mannequin<'d> {
    db: &'d GameData,
    constants: GameConstants,
    weapon_types: WeaponTypes,
    deny_list: AbilityDenyList,
}

impl<'d> Mannequin<'d> {
    /// Resolver with the built-in configuration
    pub fn new(db: &'d GameData) -> Self {
        Mannequin {
            db,
            constants: GameConstants::builtin(),
            weapon_types: default_weapon_types(),
            deny_list: default_ability_deny_list(),
        }
    }

    /// Replace the built-in constants, rejecting ones the formulas cannot use
    pub fn with_constants(mut self, constants: GameConstants) -> Result<Self, ConfigError> {
        constants.validate()?;
        self.constants = constants;
        Ok(self)
    }

    pub fn with_weapon_types(mut self, weapon_types: WeaponTypes) -> Self {
        self.weapon_types = weapon_types;
        self
    }

    pub fn with_deny_list(mut self, deny_list: AbilityDenyList) -> Self {
        self.deny_list = deny_list;
        self
    }

    pub fn constants(&self) -> &GameConstants {
        &self.constants
    }

    pub fn weapon_types(&self) -> &WeaponTypes {
        &self.weapon_types
    }

    /// Run the full pipeline for `state`
    pub fn resolve(&self, state: &MannequinState, conditions: &dyn ConditionCheck) -> ResolvedBuild<'d> {
        let db = self.db;
        let weapon = select_active_weapon(db, &self.weapon_types, state);
        let attacks = select_weapon_attacks(db, &self.weapon_types, &weapon);
        let attack = select_damage_table_row(&attacks, state);

        let perks = select_active_perks(db, state, &weapon);
        let effects = select_active_effects(db, &perks, state);
        let consumables = select_active_consumables(db, state);
        let attributes = select_attributes(db, &perks, &effects, state);
        let abilities = select_active_abilities(
            db,
            &attributes,
            &weapon,
            attack,
            &perks,
            state,
            conditions,
            &self.deny_list,
        );

        let equip_load = select_equip_load(db, state, &perks);
        let category = equip_load_category(equip_load, &self.constants.equip_load);
        tracing::debug!(
            weapon = ?weapon.weapon_tag,
            attack = ?attack.map(|it| it.damage_id.as_str()),
            perks = perks.len(),
            effects = effects.len(),
            abilities = abilities.len(),
            equip_load,
            "resolved build"
        );

        let mods = ActiveMods {
            bonuses: state.bonuses.clone(),
            effects,
            perks,
            abilities,
            consumables,
        };
        let stats = select_stats(db, state, &weapon, attack, &attributes, &mods, category, &self.constants);

        ResolvedBuild {
            weapon,
            attacks,
            attack,
            attributes,
            mods,
            equip_load,
            equip_load_category: category,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_toml_defaults() {
        let state: MannequinState = toml::from_str(
            r#"
level = 60
weapon_active = "secondary"

[[equipped_items]]
slot = "weapon2"
item_id = "SwordT5"
gear_score = 600

[equipped_items.perks]
Perk1 = "PerkA"

[[enforced_effects]]
id = "TownBuff"
"#,
        )
        .unwrap();
        assert_eq!(state.level, 60);
        assert_eq!(state.weapon_active, WeaponSelection::Secondary);
        assert_eq!(state.enforced_effects[0].stack, 1);
        let item = state.equipped_item(EquipSlot::Weapon2).unwrap();
        assert_eq!(item.perk_override("perk1"), Some("PerkA"));
        assert_eq!(item.perk_override("Perk2"), None);
    }

    #[test]
    fn test_resolve_empty_build_is_unarmed() {
        let db = GameData::from_json(
            r#"{
                "weapons": [{"WeaponID": "Unarmed", "BaseDamage": 20, "CritDamageMultiplier": 1}],
                "damage_table": [{"DamageID": "Unarmed_Light", "AttackType": "Light", "DmgCoef": 1}]
            }"#,
        )
        .unwrap();
        let mannequin = Mannequin::new(&db);
        let build = mannequin.resolve(&MannequinState::default(), &AllConditionsPass);
        assert_eq!(build.attack.map(|it| it.damage_id.as_str()), Some("Unarmed_Light"));
        assert_eq!(build.equip_load_category, EquipLoadCategory::Light);
        let damage = build.stats.weapon_damage.unwrap();
        assert!(damage.standard > 0.0);
        assert_eq!(damage.standard, damage.crit);
    }

    #[test]
    fn test_with_constants_rejects_zero_interval() {
        let db = GameData::default();
        let mut constants = GameConstants::default();
        constants.damage.gear_score_interval = 0.0;
        assert!(matches!(
            Mannequin::new(&db).with_constants(constants),
            Err(ConfigError::ValidationError(_))
        ));

        let mut constants = GameConstants::default();
        constants.damage.level_damage_multiplier = 0.05;
        assert!(Mannequin::new(&db).with_constants(constants).is_ok());
    }
}
