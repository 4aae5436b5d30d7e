//! Property tests for perk scaling and modifier aggregation

use proptest::prelude::*;
use rules_core::data::{Ability, Affix, Perk, StatusEffect};
use rules_core::modifier::{
    each_ability, each_effect, ActiveAbility, ActiveBonus, ActiveEffect, ActiveMods, ActivePerk,
};
use rules_core::{modifier_sum, perk_multiplier, EquipSlot, ModifierKey};

fn perk(scale: f64) -> Perk {
    Perk {
        perk_id: "Perk".into(),
        scaling_per_gear_score: scale,
        ..Default::default()
    }
}

fn bonuses(values: &[f64]) -> Vec<ActiveBonus> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| ActiveBonus {
            key: ModifierKey::BaseDamage,
            name: format!("Bonus{i}"),
            value: *value,
        })
        .collect()
}

/// Generated source: (value, stack limit, scaling in 1/1000, gear score)
type Kind = (f64, u32, u32, f64);

fn kind() -> impl Strategy<Value = Kind> {
    (-1.0f64..1.0, 0u32..4, 0u32..10, 100.0f64..700.0)
}

/// Four kinds, referenced by index from the order lists
fn kinds() -> impl Strategy<Value = Vec<Kind>> {
    prop::collection::vec(kind(), 4)
}

fn order_and_shuffle() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    prop::collection::vec(0usize..4, 0..16).prop_flat_map(|order| (Just(order.clone()), Just(order).prop_shuffle()))
}

fn affix_kinds_and_shuffle() -> impl Strategy<Value = (Vec<Kind>, Vec<usize>)> {
    prop::collection::vec(kind(), 0..8).prop_flat_map(|kinds| {
        let order: Vec<usize> = (0..kinds.len()).collect();
        (Just(kinds), Just(order).prop_shuffle())
    })
}

fn ability_scale(kind: &Kind) -> f64 {
    0.5 + f64::from(kind.2) / 4.0
}

fn active_perk<'a>(perk: &'a Perk, affix: Option<&'a Affix>, gear_score: f64) -> ActivePerk<'a> {
    ActivePerk {
        perk,
        affix,
        item: None,
        slot: EquipSlot::Chest,
        gear_score,
    }
}

/// Entries kept after stacking, for one kind
fn kept(order: &[usize], kind: usize, max: u32) -> f64 {
    let count = order.iter().filter(|it| **it == kind).count();
    let kept = if max > 0 { count.min(max as usize) } else { count };
    kept as f64
}

/// Owned records behind generated effects, abilities and perk affixes
struct Sources {
    effect_kinds: Vec<Kind>,
    ability_kinds: Vec<Kind>,
    affix_kinds: Vec<Kind>,
    effect_perks: Vec<Perk>,
    ability_perks: Vec<Perk>,
    affix_perks: Vec<Perk>,
    effects: Vec<StatusEffect>,
    abilities: Vec<Ability>,
    affixes: Vec<Affix>,
}

impl Sources {
    fn new(effect_kinds: Vec<Kind>, ability_kinds: Vec<Kind>, affix_kinds: Vec<Kind>) -> Self {
        let perks = |kinds: &[Kind]| -> Vec<Perk> { kinds.iter().map(|it| perk(f64::from(it.2) / 1000.0)).collect() };
        let effects = effect_kinds
            .iter()
            .enumerate()
            .map(|(i, (value, max, _, _))| {
                let mut effect = StatusEffect {
                    status_id: format!("Effect{i}"),
                    stack_max: Some(*max),
                    ..Default::default()
                };
                effect.stats.set_number(ModifierKey::BaseDamage, *value);
                effect
            })
            .collect();
        let abilities = ability_kinds
            .iter()
            .enumerate()
            .map(|(i, (value, max, _, _))| {
                let mut ability = Ability {
                    ability_id: format!("Ability{i}"),
                    is_stackable_ability: true,
                    is_stackable_max: Some(*max),
                    ..Default::default()
                };
                ability.stats.set_number(ModifierKey::BaseDamage, *value);
                ability
            })
            .collect();
        let affixes = affix_kinds
            .iter()
            .map(|(value, _, _, _)| {
                let mut affix = Affix::default();
                affix.stats.set_number(ModifierKey::BaseDamage, *value);
                affix
            })
            .collect();
        Sources {
            effect_perks: perks(&effect_kinds),
            ability_perks: perks(&ability_kinds),
            affix_perks: perks(&affix_kinds),
            effect_kinds,
            ability_kinds,
            affix_kinds,
            effects,
            abilities,
            affixes,
        }
    }

    fn mods(&self, effect_order: &[usize], ability_order: &[usize], affix_order: &[usize]) -> ActiveMods<'_> {
        ActiveMods {
            effects: effect_order
                .iter()
                .map(|&k| ActiveEffect {
                    perk: Some(active_perk(&self.effect_perks[k], None, self.effect_kinds[k].3)),
                    ..ActiveEffect::new(&self.effects[k])
                })
                .collect(),
            abilities: ability_order
                .iter()
                .map(|&k| ActiveAbility {
                    ability: &self.abilities[k],
                    self_effects: Vec::new(),
                    perk: Some(active_perk(&self.ability_perks[k], None, self.ability_kinds[k].3)),
                    scale: ability_scale(&self.ability_kinds[k]),
                })
                .collect(),
            perks: affix_order
                .iter()
                .map(|&i| active_perk(&self.affix_perks[i], Some(&self.affixes[i]), self.affix_kinds[i].3))
                .collect(),
            ..Default::default()
        }
    }

    fn expected(&self, effect_order: &[usize], ability_order: &[usize]) -> f64 {
        let effects: f64 = (0..self.effect_kinds.len())
            .map(|k| {
                let (value, max, _, gs) = self.effect_kinds[k];
                kept(effect_order, k, max) * value * perk_multiplier(&self.effect_perks[k], gs)
            })
            .sum();
        let abilities: f64 = (0..self.ability_kinds.len())
            .map(|k| {
                let kind = self.ability_kinds[k];
                let scale = perk_multiplier(&self.ability_perks[k], kind.3) * ability_scale(&kind);
                kept(ability_order, k, kind.1) * kind.0 * scale
            })
            .sum();
        let affixes: f64 = self
            .affix_kinds
            .iter()
            .zip(&self.affix_perks)
            .map(|((value, _, _, gs), perk)| value * perk_multiplier(perk, *gs))
            .sum();
        effects + abilities + affixes
    }
}

proptest! {
    #[test]
    fn perk_multiplier_is_one_up_to_100(gs in 0.0f64..=100.0, milli in 0u32..10) {
        let perk = perk(milli as f64 / 1000.0);
        prop_assert_eq!(perk_multiplier(&perk, gs), 1.0);
    }

    #[test]
    fn perk_multiplier_is_linear_above_100(gs in 100.0f64..800.0, milli in 0u32..10) {
        let scale = milli as f64 / 1000.0;
        let expected = 1.0 + (gs - 100.0) * scale;
        prop_assert!((perk_multiplier(&perk(scale), gs) - expected).abs() < 1e-9);
    }

    #[test]
    fn perk_multiplier_is_monotonic(a in 0.0f64..800.0, b in 0.0f64..800.0, milli in 0u32..10) {
        let perk = perk(milli as f64 / 1000.0);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(perk_multiplier(&perk, low) <= perk_multiplier(&perk, high));
    }

    #[test]
    fn stack_limit_caps_effect_count(count in 0usize..12, max in 1u32..6) {
        let effect = StatusEffect {
            status_id: "Stacking".into(),
            stack_max: Some(max),
            ..Default::default()
        };
        let mods = ActiveMods {
            effects: (0..count).map(|_| ActiveEffect::new(&effect)).collect(),
            ..Default::default()
        };
        prop_assert_eq!(each_effect(&mods).count(), count.min(max as usize));
    }

    #[test]
    fn modifier_sum_ignores_source_order(
        (values, shuffled) in prop::collection::vec(-1.0f64..1.0, 0..16)
            .prop_flat_map(|values| (Just(values.clone()), Just(values).prop_shuffle()))
    ) {
        let forward = ActiveMods { bonuses: bonuses(&values), ..Default::default() };
        let reordered = ActiveMods { bonuses: bonuses(&shuffled), ..Default::default() };
        let a = modifier_sum(ModifierKey::BaseDamage, &forward).value;
        let b = modifier_sum(ModifierKey::BaseDamage, &reordered).value;
        prop_assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn ability_stack_limit_caps_count(count in 0usize..12, max in 1u32..6) {
        let ability = Ability {
            ability_id: "Stacking".into(),
            is_stackable_ability: true,
            is_stackable_max: Some(max),
            ..Default::default()
        };
        let mods = ActiveMods {
            abilities: (0..count)
                .map(|_| ActiveAbility { ability: &ability, self_effects: Vec::new(), perk: None, scale: 1.0 })
                .collect(),
            ..Default::default()
        };
        prop_assert_eq!(each_ability(&mods).count(), count.min(max as usize));
    }

    #[test]
    fn scaled_stacked_sum_ignores_source_order(
        effect_kinds in kinds(),
        ability_kinds in kinds(),
        (effect_order, effect_shuffled) in order_and_shuffle(),
        (ability_order, ability_shuffled) in order_and_shuffle(),
        (affix_kinds, affix_shuffled) in affix_kinds_and_shuffle(),
    ) {
        let sources = Sources::new(effect_kinds, ability_kinds, affix_kinds);
        let affix_order: Vec<usize> = (0..sources.affixes.len()).collect();

        let forward = sources.mods(&effect_order, &ability_order, &affix_order);
        let reordered = sources.mods(&effect_shuffled, &ability_shuffled, &affix_shuffled);
        let a = modifier_sum(ModifierKey::BaseDamage, &forward).value;
        let b = modifier_sum(ModifierKey::BaseDamage, &reordered).value;
        prop_assert!((a - b).abs() < 1e-9);
        prop_assert!((a - sources.expected(&effect_order, &ability_order)).abs() < 1e-9);
    }
}

#[test]
fn test_unlimited_effects_all_count() {
    let effect = StatusEffect {
        status_id: "Plain".into(),
        ..Default::default()
    };
    let mods = ActiveMods {
        effects: vec![ActiveEffect::new(&effect); 4],
        ..Default::default()
    };
    assert_eq!(each_effect(&mods).count(), 4);
}
