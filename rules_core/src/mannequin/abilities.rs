//! Ability selection and activation gating

use super::attributes::ActiveAttribute;
use super::conditions::ConditionCheck;
use super::effects::status_effect_list;
use super::weapon::ActiveWeapon;
use super::MannequinState;
use crate::config::AbilityDenyList;
use crate::data::{eq_ci, Ability, DamageRow, GameData};
use crate::modifier::{ActiveAbility, ActivePerk};
use crate::types::AttributeSet;

/// Ability whose scale follows the hit counter instead of its own data
pub const MAULER_ULTIMATE_ID: &str = "Ultimate_Greataxe_Mauler";
const MAULER_ULTIMATE_MAX_HITS: f64 = 10.0;

/// Ability specific scale factor
///
/// Abilities with `NumAroundMe` and `MaxNumAroundMe` scale with the number of
/// nearby enemies. The mauler ultimate scales with consecutive hits.
pub fn ability_scale(ability: &Ability, state: &MannequinState) -> f64 {
    let around_me = ability.num_around_me.filter(|it| *it != 0.0);
    let max_around_me = ability.max_num_around_me.filter(|it| *it != 0.0);
    if let (Some(_), Some(max)) = (around_me, max_around_me) {
        return state.num_around_me.min(max).max(1.0);
    }
    if ability.ability_id == MAULER_ULTIMATE_ID {
        // TODO: take the hit cap from the ability's status effect once the tables expose it
        return state.num_hits.min(MAULER_ULTIMATE_MAX_HITS).max(1.0);
    }
    1.0
}

fn active_ability<'d>(
    db: &'d GameData,
    ability: &'d Ability,
    perk: Option<ActivePerk<'d>>,
    state: &MannequinState,
) -> ActiveAbility<'d> {
    ActiveAbility {
        ability,
        self_effects: status_effect_list(db, &ability.self_apply_status_effect),
        perk,
        scale: ability_scale(ability, state),
    }
}

/// Abilities unlocked by attribute levels
pub fn select_attribute_abilities<'d>(
    db: &'d GameData,
    attributes: &AttributeSet<ActiveAttribute>,
) -> Vec<&'d Ability> {
    attributes
        .iter()
        .flat_map(|(_, attr)| attr.abilities.iter())
        .filter_map(|id| db.abilities.get(id))
        .collect()
}

/// Abilities picked in the skill trees of the active weapon
pub fn select_weapon_abilities<'d>(
    db: &'d GameData,
    weapon: &ActiveWeapon<'_>,
    state: &MannequinState,
) -> Vec<&'d Ability> {
    let Some(tag) = weapon.weapon_tag.as_deref() else {
        return Vec::new();
    };
    [&state.equipped_skills1, &state.equipped_skills2]
        .into_iter()
        .flatten()
        .filter(|skills| eq_ci(&skills.weapon, tag))
        .flat_map(|skills| skills.tree1.iter().chain(skills.tree2.iter()))
        .filter_map(|id| db.abilities.get(id))
        .collect()
}

/// Abilities granted by perks, carrying the perk for scaling
pub fn select_perk_abilities<'d>(
    db: &'d GameData,
    perks: &[ActivePerk<'d>],
    state: &MannequinState,
) -> Vec<ActiveAbility<'d>> {
    let mut result = Vec::new();
    for perk in perks {
        for id in &perk.perk.equip_ability {
            if let Some(ability) = db.abilities.get(id) {
                result.push(active_ability(db, ability, Some(*perk), state));
            }
        }
    }
    result
}

/// Abilities the player switched on by hand
pub fn select_activated_abilities<'d>(db: &'d GameData, state: &MannequinState) -> Vec<&'d Ability> {
    state
        .activated_abilities
        .iter()
        .filter_map(|id| db.abilities.get(id))
        .collect()
}

/// Every candidate ability: attributes, weapon trees, activated and perk abilities
pub fn select_all_abilities<'d>(
    db: &'d GameData,
    attributes: &AttributeSet<ActiveAttribute>,
    weapon: &ActiveWeapon<'_>,
    perks: &[ActivePerk<'d>],
    state: &MannequinState,
) -> Vec<ActiveAbility<'d>> {
    let plain = select_attribute_abilities(db, attributes)
        .into_iter()
        .chain(select_weapon_abilities(db, weapon, state))
        .chain(select_activated_abilities(db, state));
    let mut result: Vec<ActiveAbility<'d>> = plain
        .map(|ability| active_ability(db, ability, None, state))
        .collect();
    result.extend(select_perk_abilities(db, perks, state));
    result
}

/// Whether an ability applies to the current attack
///
/// Checks run in order and the first failing one rejects the ability. Abilities
/// that reset the active weapon's cooldown on hit are accepted before the deny
/// list is consulted.
pub fn is_active_ability(
    ability: &Ability,
    attack: Option<&DamageRow>,
    state: &MannequinState,
    conditions: &dyn ConditionCheck,
    deny_list: &AbilityDenyList,
) -> bool {
    let Some(attack) = attack else {
        return false;
    };
    if !conditions.check_all(ability, state) {
        return false;
    }
    if !ability.attack_type.is_empty() && !ability.attack_type.iter().any(|it| eq_ci(it, &attack.attack_type)) {
        return false;
    }
    if ability.damage_is_melee && (!ability.on_hit || attack.is_ranged) {
        return false;
    }
    if ability.damage_is_ranged && (!ability.on_hit || !attack.is_ranged) {
        return false;
    }
    if !ability.damage_table_row.is_empty() {
        if !ability.damage_table_row.iter().any(|it| eq_ci(it, &attack.damage_id)) {
            return false;
        }
        if !ability.on_hit {
            return false;
        }
    }
    if ability.cdr_immediately_options.as_deref() == Some("ActiveWeapon") && (ability.on_hit_taken || ability.on_hit) {
        return true;
    }
    if let Some(property) = deny_list.rejected_by(ability) {
        tracing::debug!(ability = %ability.ability_id, property, "unsupported ability property");
        return false;
    }
    true
}

/// Candidate abilities that pass `is_active_ability`
#[allow(clippy::too_many_arguments)]
pub fn select_active_abilities<'d>(
    db: &'d GameData,
    attributes: &AttributeSet<ActiveAttribute>,
    weapon: &ActiveWeapon<'_>,
    attack: Option<&DamageRow>,
    perks: &[ActivePerk<'d>],
    state: &MannequinState,
    conditions: &dyn ConditionCheck,
    deny_list: &AbilityDenyList,
) -> Vec<ActiveAbility<'d>> {
    select_all_abilities(db, attributes, weapon, perks, state)
        .into_iter()
        .filter(|it| is_active_ability(it.ability, attack, state, conditions, deny_list))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_ability_deny_list;
    use crate::mannequin::{AllConditionsPass, EquippedSkills};

    fn attack(id: &str, attack_type: &str, ranged: bool) -> DamageRow {
        DamageRow {
            damage_id: id.into(),
            attack_type: attack_type.into(),
            dmg_coef: 1.0,
            is_ranged: ranged,
            ..Default::default()
        }
    }

    fn check(ability: &Ability, attack: &DamageRow) -> bool {
        is_active_ability(
            ability,
            Some(attack),
            &MannequinState::default(),
            &AllConditionsPass,
            &default_ability_deny_list(),
        )
    }

    #[test]
    fn test_ability_scale() {
        let mut state = MannequinState {
            num_around_me: 7.0,
            num_hits: 25.0,
            ..Default::default()
        };
        let crowd = Ability {
            ability_id: "Crowd".into(),
            num_around_me: Some(1.0),
            max_num_around_me: Some(5.0),
            ..Default::default()
        };
        assert_eq!(ability_scale(&crowd, &state), 5.0);
        state.num_around_me = 0.0;
        assert_eq!(ability_scale(&crowd, &state), 1.0);

        let mauler = Ability {
            ability_id: MAULER_ULTIMATE_ID.into(),
            ..Default::default()
        };
        assert_eq!(ability_scale(&mauler, &state), 10.0);
        state.num_hits = 4.0;
        assert_eq!(ability_scale(&mauler, &state), 4.0);

        assert_eq!(ability_scale(&Ability::default(), &state), 1.0);
    }

    #[test]
    fn test_missing_attack_and_conditions() {
        let ability = Ability::default();
        let deny = default_ability_deny_list();
        let state = MannequinState::default();
        assert!(!is_active_ability(&ability, None, &state, &AllConditionsPass, &deny));

        let light = attack("Sword_Light", "Light", false);
        let never = |_: &Ability, _: &MannequinState| false;
        assert!(!is_active_ability(&ability, Some(&light), &state, &never, &deny));
        assert!(is_active_ability(&ability, Some(&light), &state, &AllConditionsPass, &deny));
    }

    #[test]
    fn test_attack_type_and_range_gates() {
        let light = attack("Bow_Light", "Light", true);
        let heavy = attack("Sword_Heavy", "Heavy", false);

        let heavy_only = Ability {
            attack_type: vec!["Heavy".into()],
            ..Default::default()
        };
        assert!(!check(&heavy_only, &light));
        assert!(check(&heavy_only, &heavy));

        let melee = Ability {
            damage_is_melee: true,
            on_hit: true,
            ..Default::default()
        };
        assert!(check(&melee, &heavy));
        assert!(!check(&melee, &light));

        let ranged_without_hit = Ability {
            damage_is_ranged: true,
            ..Default::default()
        };
        assert!(!check(&ranged_without_hit, &light));
    }

    #[test]
    fn test_damage_table_row_gate() {
        let light = attack("Sword_Light", "Light", false);
        let mut ability = Ability {
            damage_table_row: vec!["Sword_Light".into()],
            ..Default::default()
        };
        assert!(!check(&ability, &light));
        ability.on_hit = true;
        assert!(check(&ability, &light));
        ability.damage_table_row = vec!["sword_light".into()];
        assert!(check(&ability, &light));
        ability.damage_table_row = vec!["Sword_Heavy".into()];
        assert!(!check(&ability, &light));
    }

    #[test]
    fn test_active_weapon_cooldown_bypasses_deny_list() {
        let light = attack("Sword_Light", "Light", false);
        let mut ability = Ability {
            on_hit_taken: true,
            ..Default::default()
        };
        assert!(!check(&ability, &light));
        ability.cdr_immediately_options = Some("ActiveWeapon".into());
        assert!(check(&ability, &light));
    }

    #[test]
    fn test_weapon_abilities_match_tag() {
        let db = GameData::from_json(
            r#"{"abilities": [{"AbilityID": "Sword_A"}, {"AbilityID": "Sword_B"}, {"AbilityID": "Bow_A"}]}"#,
        )
        .unwrap();
        let state = MannequinState {
            equipped_skills1: Some(EquippedSkills {
                weapon: "sword".into(),
                tree1: vec!["Sword_A".into()],
                tree2: vec!["Sword_B".into(), "Missing".into()],
            }),
            equipped_skills2: Some(EquippedSkills {
                weapon: "Bow".into(),
                tree1: vec!["Bow_A".into()],
                tree2: Vec::new(),
            }),
            ..Default::default()
        };
        let weapon = ActiveWeapon {
            weapon_tag: Some("Sword".into()),
            ..Default::default()
        };
        let ids: Vec<&str> = select_weapon_abilities(&db, &weapon, &state)
            .iter()
            .map(|it| it.ability_id.as_str())
            .collect();
        assert_eq!(ids, vec!["Sword_A", "Sword_B"]);
        assert!(select_weapon_abilities(&db, &ActiveWeapon::default(), &state).is_empty());
    }
}
