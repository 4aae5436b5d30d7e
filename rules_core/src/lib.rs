//! rules_core - Rules-resolution engine for game item and combat data
//!
//! This library provides:
//! - GameData: Imported tables indexed by case-insensitive id
//! - LootContext / LootGraph: Conditional loot gating and table expansion
//! - ModifierEngine: Stat aggregation over effects, perks, abilities and consumables
//! - Mannequin: Build state to weapon, attributes, abilities and stat panels
//! - Formulas: Gear score, level, attribute and armor scaling
//! - Expressions: `${...}` placeholder resolution in description text

pub mod config;
pub mod data;
pub mod expression;
pub mod formula;
pub mod loot;
pub mod mannequin;
pub mod modifier;
pub mod prelude;
pub mod types;

// Re-export core types for convenience
pub use config::{
    default_ability_deny_list, default_weapon_types, AbilityDenyList, ConfigError, GameConstants, WeaponTypes,
};
pub use data::{DataError, GameData, IndexedTable, RawTables};
pub use expression::{solve, try_solve, ExpressionContext, ExpressionError};
pub use loot::{LootContext, LootGraph, LootNode, LootNodeKind};
pub use mannequin::{
    AllConditionsPass, ConditionCheck, EquippedItem, Mannequin, MannequinState, ResolvedBuild,
};
pub use modifier::{
    each_modifier, has_modifier, modifier_sum, modifier_sum_by, perk_multiplier, ActiveMods, ModifierKey,
    ModifierResult,
};
pub use types::{AttributeRef, AttributeSet, EquipSlot, WeaponSelection};
