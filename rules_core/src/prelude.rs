//! Prelude module for convenient imports
//!
//! ```rust
//! use rules_core::prelude::*;
//! ```

// Data
pub use crate::data::{GameData, NumberOrString};

// Loot
pub use crate::loot::{LootContext, LootGraph, LootNode};

// Modifiers
pub use crate::modifier::{
    each_modifier, modifier_mult, modifier_result, modifier_sum, ActiveBonus, ActiveMods, ModifierKey,
};

// Build resolution
pub use crate::mannequin::{AllConditionsPass, EquippedItem, Mannequin, MannequinState, ResolvedBuild};

// Formulas
pub use crate::formula::{damage_for_weapon, damage_mitigation_factor, MitigationInput, WeaponDamageInput};

// Config
pub use crate::config::{GameConstants, WeaponTypes};

// Core types
pub use crate::types::{AttributeRef, AttributeSet, EquipSlot, WeaponSelection};
