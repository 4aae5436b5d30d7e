//! Stat properties carried by effects, abilities, affixes and consumables
//!
//! `ModifierKey` is the closed set of property names the engine aggregates.
//! `ModifierStats` is the matching typed block flattened into every record
//! shape that can contribute a modifier, and `ModifierStats::get` is the one
//! place that maps a key to its column.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Whether a property holds a number or a `"Name=value"` text pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Numeric,
    Text,
}

/// A property value borrowed from a record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl<'a> PropertyValue<'a> {
    /// Zero, NaN and empty text contribute nothing
    pub fn is_truthy(&self) -> bool {
        match self {
            PropertyValue::Number(value) => *value != 0.0 && !value.is_nan(),
            PropertyValue::Text(text) => !text.is_empty(),
        }
    }

    /// Numeric view; text never takes part in sums
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(value) => Some(*value),
            PropertyValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            PropertyValue::Number(_) => None,
            PropertyValue::Text(text) => Some(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown modifier key: {0}")]
pub struct UnknownModifierKey(pub String);

macro_rules! modifier_properties {
    (
        numeric { $($num:ident / $num_field:ident => $num_name:literal,)* }
        text { $($txt:ident / $txt_field:ident => $txt_name:literal,)* }
    ) => {
        /// Name of an aggregatable stat property
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ModifierKey {
            $(#[serde(rename = $num_name)] $num,)*
            $(#[serde(rename = $txt_name)] $txt,)*
        }

        impl ModifierKey {
            /// Every key, numeric keys first
            pub const ALL: &'static [ModifierKey] = &[
                $(ModifierKey::$num,)*
                $(ModifierKey::$txt,)*
            ];

            /// Column name as it appears in the data tables
            pub fn name(&self) -> &'static str {
                match self {
                    $(ModifierKey::$num => $num_name,)*
                    $(ModifierKey::$txt => $txt_name,)*
                }
            }

            pub fn kind(&self) -> PropertyKind {
                match self {
                    $(ModifierKey::$num => PropertyKind::Numeric,)*
                    $(ModifierKey::$txt => PropertyKind::Text,)*
                }
            }
        }

        /// Typed stat columns shared by every modifier-bearing record
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct ModifierStats {
            $(
                #[serde(rename = $num_name, default, skip_serializing_if = "Option::is_none")]
                pub $num_field: Option<f64>,
            )*
            $(
                #[serde(rename = $txt_name, default, skip_serializing_if = "Option::is_none")]
                pub $txt_field: Option<String>,
            )*
        }

        impl ModifierStats {
            /// Raw value of `key`, if the record defines it
            pub fn get(&self, key: ModifierKey) -> Option<PropertyValue<'_>> {
                match key {
                    $(ModifierKey::$num => self.$num_field.map(PropertyValue::Number),)*
                    $(ModifierKey::$txt => self.$txt_field.as_deref().map(PropertyValue::Text),)*
                }
            }

            /// Set a numeric property; text keys are left untouched
            pub fn set_number(&mut self, key: ModifierKey, value: f64) {
                match key {
                    $(ModifierKey::$num => self.$num_field = Some(value),)*
                    $(ModifierKey::$txt => {},)*
                }
            }
        }
    };
}

modifier_properties! {
    numeric {
        ModConstitution / mod_constitution => "MODConstitution",
        ModDexterity / mod_dexterity => "MODDexterity",
        ModFocus / mod_focus => "MODFocus",
        ModIntelligence / mod_intelligence => "MODIntelligence",
        ModStrength / mod_strength => "MODStrength",
        AbsArcane / abs_arcane => "ABSArcane",
        AbsCorruption / abs_corruption => "ABSCorruption",
        AbsFire / abs_fire => "ABSFire",
        AbsIce / abs_ice => "ABSIce",
        AbsLightning / abs_lightning => "ABSLightning",
        AbsNature / abs_nature => "ABSNature",
        AbsSiege / abs_siege => "ABSSiege",
        AbsSlash / abs_slash => "ABSSlash",
        AbsStandard / abs_standard => "ABSStandard",
        AbsStrike / abs_strike => "ABSStrike",
        AbsThrust / abs_thrust => "ABSThrust",
        DmgArcane / dmg_arcane => "DMGArcane",
        DmgCorruption / dmg_corruption => "DMGCorruption",
        DmgFire / dmg_fire => "DMGFire",
        DmgIce / dmg_ice => "DMGIce",
        DmgLightning / dmg_lightning => "DMGLightning",
        DmgNature / dmg_nature => "DMGNature",
        DmgSiege / dmg_siege => "DMGSiege",
        DmgSlash / dmg_slash => "DMGSlash",
        DmgStandard / dmg_standard => "DMGStandard",
        DmgStrike / dmg_strike => "DMGStrike",
        DmgThrust / dmg_thrust => "DMGThrust",
        BaseDamage / base_damage => "BaseDamage",
        CritChance / crit_chance => "CritChance",
        CritDamage / crit_damage => "CritDamage",
        CritDamageReduction / crit_damage_reduction => "CritDamageReduction",
        PhysicalArmor / physical_armor => "PhysicalArmor",
        ElementalArmor / elemental_armor => "ElementalArmor",
        ArmorPenetration / armor_penetration => "ArmorPenetration",
        HealthMod / health_mod => "HealthMod",
        MaxHealthMod / max_health_mod => "MaxHealthMod",
        HealScalingValueMultiplier / heal_scaling_value_multiplier => "HealScalingValueMultiplier",
        StaminaRate / stamina_rate => "StaminaRate",
        ManaRate / mana_rate => "ManaRate",
        EncumbranceMod / encumbrance_mod => "EncumbranceMod",
        WeightMultiplier / weight_multiplier => "WeightMultiplier",
        BlockStaminaDamage / block_stamina_damage => "BlockStaminaDamage",
        CooldownReduction / cooldown_reduction => "CooldownReduction",
        DamageReduction / damage_reduction => "DamageReduction",
    }
    text {
        AbsVitalsCategory / abs_vitals_category => "ABSVitalsCategory",
        DmgVitalsCategory / dmg_vitals_category => "DMGVitalsCategory",
    }
}

impl ModifierKey {
    /// Absorption key for a damage type name such as `"Slash"`
    pub fn absorption(damage_type: &str) -> Option<ModifierKey> {
        format!("ABS{damage_type}").parse().ok()
    }

    /// Empower key for a damage type name such as `"Slash"`
    pub fn empower(damage_type: &str) -> Option<ModifierKey> {
        format!("DMG{damage_type}").parse().ok()
    }

    /// Numeric absorption keys (`ABS*`)
    pub fn absorptions() -> impl Iterator<Item = ModifierKey> {
        Self::ALL
            .iter()
            .copied()
            .filter(|key| key.kind() == PropertyKind::Numeric && key.name().starts_with("ABS"))
    }

    /// Numeric damage keys (`DMG*`)
    pub fn damages() -> impl Iterator<Item = ModifierKey> {
        Self::ALL
            .iter()
            .copied()
            .filter(|key| key.kind() == PropertyKind::Numeric && key.name().starts_with("DMG"))
    }
}

impl FromStr for ModifierKey {
    type Err = UnknownModifierKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModifierKey::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownModifierKey(s.to_string()))
    }
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
