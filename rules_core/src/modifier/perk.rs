//! Perk classification, gear-score scaling and affix property extraction

use super::property::{ModifierKey, PropertyValue};
use crate::data::{eq_ci, Affix, ItemDefinition, NumberOrString, Perk};
use crate::formula::patch_precision;
use serde::Serialize;

fn has_perk_type(perk: &Perk, perk_type: &str) -> bool {
    perk.perk_type.as_deref().is_some_and(|it| it == perk_type)
}

pub fn is_perk_inherent(perk: &Perk) -> bool {
    has_perk_type(perk, "Inherent")
}

pub fn is_perk_gem(perk: &Perk) -> bool {
    has_perk_type(perk, "Gem")
}

pub fn is_perk_generated(perk: &Perk) -> bool {
    has_perk_type(perk, "Generated")
}

/// Whether the perk and the item share at least one item class
pub fn is_perk_applicable_to_item(perk: &Perk, item: &ItemDefinition) -> bool {
    perk.item_class
        .iter()
        .any(|class| item.item_class.iter().any(|it| eq_ci(it, class)))
}

pub fn has_perk_inherent_affix(perk: &Perk) -> bool {
    is_perk_inherent(perk) && perk.affix.as_deref().is_some_and(|it| !it.is_empty())
}

/// Gear-score multiplier of a scaling perk
///
/// The scaling factor is rounded to 8 decimals before use. Gear scores at or
/// below 100 give exactly 1.
pub fn perk_multiplier(perk: &Perk, gear_score: f64) -> f64 {
    let scale = patch_precision(perk.scaling_per_gear_score);
    (gear_score - 100.0).max(0.0) * scale + 1.0
}

/// Extra gear score an item grants to its inherent perks
pub fn item_gs_bonus(perk: &Perk, item: Option<&ItemDefinition>) -> f64 {
    if !is_perk_inherent(perk) {
        return 0.0;
    }
    item.and_then(|it| it.gear_score_bonus).unwrap_or(0.0)
}

/// A non-empty property of an affix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffixProperty {
    /// Column name; `Name=value` text columns become `"<column> <Name>"`
    pub key: String,
    pub value: NumberOrString,
}

/// An affix property prepared for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffixStat {
    pub key: String,
    /// Localization keys, most specific first
    pub labels: Vec<String>,
    pub value: NumberOrString,
}

fn is_truthy(value: &NumberOrString) -> bool {
    match value {
        NumberOrString::Number(it) => *it != 0.0 && !it.is_nan(),
        NumberOrString::Text(it) => !it.is_empty(),
    }
}

/// Every set property of an affix in column order
///
/// Text values of the form `Name=value` are split so that the name joins the
/// key and the value becomes numeric.
pub fn affix_properties(affix: &Affix) -> Vec<AffixProperty> {
    ModifierKey::ALL
        .iter()
        .filter_map(|key| {
            let value = affix.stats.get(*key)?;
            let property = match value {
                PropertyValue::Number(it) => AffixProperty {
                    key: key.name().to_string(),
                    value: NumberOrString::Number(it),
                },
                PropertyValue::Text(text) => match text.split_once('=') {
                    Some((name, value)) => AffixProperty {
                        key: format!("{} {}", key.name(), name),
                        value: NumberOrString::Number(value.trim().parse().unwrap_or(f64::NAN)),
                    },
                    None => AffixProperty {
                        key: key.name().to_string(),
                        value: NumberOrString::Text(text.to_string()),
                    },
                },
            };
            Some(property).filter(|it| is_truthy(&it.value))
        })
        .collect()
}

/// Attribute modifiers of an affix, scaled and floored to whole points
pub fn affix_mods(affix: &Affix, scale: f64) -> Vec<AffixStat> {
    affix_properties(affix)
        .into_iter()
        .filter(|it| it.key.starts_with("MOD"))
        .map(|AffixProperty { key, value }| {
            let label = format!("ui_{}", key.trim_start_matches("MOD").to_lowercase());
            let value = match value {
                NumberOrString::Number(it) => NumberOrString::Number((it * scale).floor()),
                other => other,
            };
            AffixStat {
                key,
                labels: vec![label],
                value,
            }
        })
        .collect()
}

/// Absorption properties of an affix, scaled but not floored
pub fn affix_abss(affix: &Affix, scale: f64) -> Vec<AffixStat> {
    affix_properties(affix)
        .into_iter()
        .filter(|it| it.key.starts_with("ABS"))
        .map(|AffixProperty { key, value }| {
            let name = key.trim_start_matches("ABS").to_lowercase();
            let label = match name.strip_prefix("vitalscategory ") {
                Some(category) => format!("VC_{category}"),
                None => format!("{name}_DamageName"),
            };
            let value = match value {
                NumberOrString::Number(it) => NumberOrString::Number(it * scale),
                other => other,
            };
            AffixStat {
                key,
                labels: vec![label, "ui_resistance".to_string()],
                value,
            }
        })
        .collect()
}

/// Attribute modifiers granted by an inherent perk at a gear score
pub fn perk_inherent_mods(perk: &Perk, affix: &Affix, gear_score: f64) -> Vec<AffixStat> {
    affix_mods(affix, perk_multiplier(perk, gear_score))
}

/// Absorptions granted by a gem perk at a gear score
pub fn perk_gem_abss(perk: &Perk, affix: &Affix, gear_score: f64) -> Vec<AffixStat> {
    affix_abss(affix, perk_multiplier(perk, gear_score))
}
