//! Record shapes of the normalized game data tables
//!
//! Field names follow the column names produced by the import pipeline.

use super::key::eq_ci;
use crate::modifier::ModifierStats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A column that the importer emits either as number or as numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    Text(String),
}

impl Default for NumberOrString {
    fn default() -> Self {
        NumberOrString::Number(0.0)
    }
}

impl NumberOrString {
    /// Numeric value, NaN when the text is not a number
    ///
    /// Blank text counts as 0.
    pub fn as_f64(&self) -> f64 {
        match self {
            NumberOrString::Number(value) => *value,
            NumberOrString::Text(text) if text.trim().is_empty() => 0.0,
            NumberOrString::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

fn has_class(classes: &[String], class: &str) -> bool {
    classes.iter().any(|it| eq_ci(it, class))
}

// === Items ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemDefinition {
    #[serde(rename = "ItemID")]
    pub item_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub item_type: String,
    #[serde(default)]
    pub item_class: Vec<String>,
    #[serde(default)]
    pub item_stats_ref: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub tier: Option<u32>,
    /// Extra gear score granted to the item's inherent perks
    #[serde(default)]
    pub gear_score_bonus: Option<f64>,
    #[serde(default)]
    pub perk1: Option<String>,
    #[serde(default)]
    pub perk2: Option<String>,
    #[serde(default)]
    pub perk3: Option<String>,
    #[serde(default)]
    pub perk4: Option<String>,
    #[serde(default)]
    pub perk5: Option<String>,
    #[serde(default)]
    pub perk_bucket1: Option<String>,
    #[serde(default)]
    pub perk_bucket2: Option<String>,
    #[serde(default)]
    pub perk_bucket3: Option<String>,
    #[serde(default)]
    pub perk_bucket4: Option<String>,
    #[serde(default)]
    pub perk_bucket5: Option<String>,
}

/// One perk slot of an item: fixed perk and/or random bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerkSlot<'a> {
    /// Slot key used by per-slot overrides (`"Perk1"` .. `"Perk5"`)
    pub key: &'static str,
    pub perk_id: Option<&'a str>,
    pub bucket_id: Option<&'a str>,
}

impl ItemDefinition {
    /// Perk slots in column order
    pub fn perk_slots(&self) -> [PerkSlot<'_>; 5] {
        fn slot<'a>(
            key: &'static str,
            perk: &'a Option<String>,
            bucket: &'a Option<String>,
        ) -> PerkSlot<'a> {
            PerkSlot {
                key,
                perk_id: perk.as_deref().filter(|it| !it.is_empty()),
                bucket_id: bucket.as_deref().filter(|it| !it.is_empty()),
            }
        }
        [
            slot("Perk1", &self.perk1, &self.perk_bucket1),
            slot("Perk2", &self.perk2, &self.perk_bucket2),
            slot("Perk3", &self.perk3, &self.perk_bucket3),
            slot("Perk4", &self.perk4, &self.perk_bucket4),
            slot("Perk5", &self.perk5, &self.perk_bucket5),
        ]
    }

    pub fn has_item_class(&self, class: &str) -> bool {
        has_class(&self.item_class, class)
    }

    pub fn is_shield(&self) -> bool {
        self.has_item_class("Shield")
    }

    pub fn is_weapon(&self) -> bool {
        eq_ci(&self.item_type, "Weapon") && !self.is_shield()
    }

    pub fn is_jewelry(&self) -> bool {
        ["EquippableAmulet", "EquippableRing", "EquippableToken"]
            .iter()
            .any(|class| self.has_item_class(class))
    }

    pub fn is_armor(&self) -> bool {
        eq_ci(&self.item_type, "Armor") && !self.is_jewelry()
    }

    pub fn is_tool(&self) -> bool {
        self.has_item_class("EquippableTool")
    }

    pub fn is_consumable(&self) -> bool {
        eq_ci(&self.item_type, "Consumable")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HousingItem {
    #[serde(rename = "HouseItemID")]
    pub house_item_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub housing_status_effect: Option<String>,
}

// === Perks and affixes ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Perk {
    #[serde(rename = "PerkID")]
    pub perk_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// `Inherent`, `Gem`, `Generated`, ...
    #[serde(default)]
    pub perk_type: Option<String>,
    #[serde(default)]
    pub affix: Option<String>,
    #[serde(default)]
    pub scaling_per_gear_score: f64,
    /// `OnEquip`, `OnActive`, `OnUnsheathed`
    #[serde(default)]
    pub condition_event: Option<String>,
    #[serde(default)]
    pub equip_ability: Vec<String>,
    #[serde(default)]
    pub item_class: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Affix {
    #[serde(rename = "StatusID")]
    pub status_id: String,
    #[serde(default)]
    pub status_effect: Option<String>,
    /// Comma separated magnitudes, e.g. `"25,15"`
    #[serde(default)]
    pub attribute_placing_mods: Option<String>,
    #[serde(flatten)]
    pub stats: ModifierStats,
}

// === Effects and abilities ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusEffect {
    #[serde(rename = "StatusID")]
    pub status_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub stack_max: Option<u32>,
    #[serde(default)]
    pub potency_per_level: Option<f64>,
    #[serde(flatten)]
    pub stats: ModifierStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ability {
    #[serde(rename = "AbilityID")]
    pub ability_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Restricts the ability to `Light`, `Heavy`, `Ability` or `Magic` attacks
    #[serde(default)]
    pub attack_type: Vec<String>,
    #[serde(default)]
    pub damage_is_melee: bool,
    #[serde(default)]
    pub damage_is_ranged: bool,
    #[serde(default)]
    pub on_hit: bool,
    #[serde(default)]
    pub on_hit_taken: bool,
    #[serde(default)]
    pub damage_table_row: Vec<String>,
    #[serde(rename = "CDRImmediatelyOptions", default)]
    pub cdr_immediately_options: Option<String>,
    #[serde(default)]
    pub is_stackable_ability: bool,
    #[serde(default)]
    pub is_stackable_max: Option<u32>,
    #[serde(default)]
    pub num_around_me: Option<f64>,
    #[serde(default)]
    pub max_num_around_me: Option<f64>,
    #[serde(default)]
    pub self_apply_status_effect: Vec<String>,
    #[serde(flatten)]
    pub stats: ModifierStats,
    /// Every column the engine does not model, kept for deny-list checks
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(it) => *it,
        Value::Number(it) => it.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(true),
        Value::String(it) => !it.is_empty(),
        Value::Array(it) => !it.is_empty(),
        Value::Object(_) => true,
    }
}

impl Ability {
    /// Whether the named column carries a truthy value
    pub fn is_property_set(&self, name: &str) -> bool {
        if eq_ci(name, "OnHit") {
            return self.on_hit;
        }
        if eq_ci(name, "OnHitTaken") {
            return self.on_hit_taken;
        }
        if eq_ci(name, "DamageTableRow") {
            return !self.damage_table_row.is_empty();
        }
        if let Ok(key) = name.parse() {
            if let Some(value) = self.stats.get(key) {
                return value.is_truthy();
            }
        }
        self.extra
            .iter()
            .any(|(key, value)| eq_ci(key, name) && is_truthy(value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Consumable {
    #[serde(rename = "ConsumableID")]
    pub consumable_id: String,
    #[serde(default)]
    pub add_status_effects: Vec<String>,
    #[serde(flatten)]
    pub stats: ModifierStats,
}

// === Weapons, armor, ammo ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeaponStats {
    #[serde(rename = "WeaponID")]
    pub weapon_id: String,
    #[serde(default)]
    pub item_class: Vec<String>,
    #[serde(default)]
    pub base_damage: f64,
    #[serde(default)]
    pub crit_damage_multiplier: f64,
    #[serde(default)]
    pub scaling_strength: f64,
    #[serde(default)]
    pub scaling_dexterity: f64,
    #[serde(default)]
    pub scaling_intelligence: f64,
    #[serde(default)]
    pub scaling_focus: f64,
    /// `Arrow` or `Shot` for ranged weapons
    #[serde(default)]
    pub ammo_type: Option<String>,
    #[serde(default)]
    pub weight_override: Option<f64>,
    #[serde(default)]
    pub physical_armor: f64,
    #[serde(default)]
    pub elemental_armor: f64,
}

impl WeaponStats {
    pub fn has_item_class(&self, class: &str) -> bool {
        has_class(&self.item_class, class)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArmorStats {
    #[serde(rename = "ArmorID", alias = "WeaponID")]
    pub armor_id: String,
    #[serde(default)]
    pub weight_override: Option<f64>,
    #[serde(default)]
    pub physical_armor: f64,
    #[serde(default)]
    pub elemental_armor: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AmmoStats {
    #[serde(rename = "AmmoID")]
    pub ammo_id: String,
    #[serde(default)]
    pub ammo_type: String,
    #[serde(default)]
    pub damage_modifier: f64,
}

/// Row of the damage table: one attack of one weapon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DamageRow {
    #[serde(rename = "DamageID")]
    pub damage_id: String,
    #[serde(default)]
    pub attack_type: String,
    #[serde(default)]
    pub dmg_coef: f64,
    #[serde(default)]
    pub is_ranged: bool,
    #[serde(default)]
    pub damage_type: Option<String>,
}

/// Row of an attribute level table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeLevel {
    pub level: i32,
    #[serde(default)]
    pub health: f64,
    #[serde(default)]
    pub modifier_value_sum: f64,
    #[serde(default)]
    pub equip_abilities: Vec<String>,
}

// === Loot ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LootTableEntry {
    #[serde(rename = "LootTableID")]
    pub loot_table_id: String,
    /// Gating condition names, all of which must pass
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub max_roll: f64,
    /// `AND` rolls every row, `OR` picks the highest reached row
    #[serde(rename = "AND/OR", default)]
    pub and_or: Option<String>,
    #[serde(default)]
    pub items: Vec<LootTableRow>,
}

impl LootTableEntry {
    pub fn is_or(&self) -> bool {
        self.and_or.as_deref().is_some_and(|it| eq_ci(it, "OR"))
    }
}

/// What a loot table row points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootRowRef<'a> {
    Item(&'a str),
    Table(&'a str),
    Bucket(&'a str),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LootTableRow {
    /// Item id, `[LTID]<table>` or `[LBID]<bucket>`
    #[serde(rename = "ItemID", default)]
    pub item_id: String,
    /// Roll threshold or condition value
    #[serde(default)]
    pub prob: NumberOrString,
    #[serde(default)]
    pub qty: Option<NumberOrString>,
}

impl LootTableRow {
    pub fn reference(&self) -> LootRowRef<'_> {
        if let Some(id) = self.item_id.strip_prefix("[LTID]") {
            LootRowRef::Table(id)
        } else if let Some(id) = self.item_id.strip_prefix("[LBID]") {
            LootRowRef::Bucket(id)
        } else {
            LootRowRef::Item(&self.item_id)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LootBucketTag {
    pub name: String,
    /// One value is a lower bound, two values an inclusive range
    #[serde(default)]
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LootBucketRow {
    pub loot_bucket: String,
    #[serde(default)]
    pub row: u32,
    #[serde(default)]
    pub item: String,
    /// OR semantics over the tags when set, AND otherwise
    #[serde(default)]
    pub match_one: bool,
    #[serde(default)]
    pub quantity: Vec<f64>,
    #[serde(default)]
    pub tags: Vec<LootBucketTag>,
}

impl LootBucketRow {
    pub fn tag(&self, name: &str) -> Option<&LootBucketTag> {
        self.tags.iter().find(|tag| eq_ci(&tag.name, name))
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tag(name).is_some()
    }
}

/// All rows of one loot bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LootBucket {
    pub id: String,
    pub rows: Vec<LootBucketRow>,
}
