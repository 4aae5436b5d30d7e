//! Integration test: game data -> build state -> resolved build
//!
//! Runs the whole mannequin pipeline over a small but complete data set:
//! weapon with perks, armor, a consumable, attribute tables and abilities.

use rules_core::mannequin::EquippedSkills;
use rules_core::modifier::ActiveBonus;
use rules_core::{
    AllConditionsPass, EquipSlot, EquippedItem, GameData, Mannequin, MannequinState, ModifierKey, WeaponSelection,
};

fn db() -> GameData {
    GameData::from_json(
        r#"{
            "items": [
                {
                    "ItemID": "SwordT5", "ItemType": "Weapon", "ItemClass": ["Sword"],
                    "ItemStatsRef": "Sword_T5", "Perk1": "Perk_Str", "Perk2": "Perk_Drawn"
                },
                {
                    "ItemID": "BowT5", "ItemType": "Weapon", "ItemClass": ["Bow"],
                    "ItemStatsRef": "Bow_T5"
                },
                {
                    "ItemID": "ChestT5", "ItemType": "Armor", "ItemClass": ["EquippableChest"],
                    "ItemStatsRef": "Chest_T5", "Perk1": "Perk_Light"
                },
                {"ItemID": "FoodT5", "ItemType": "Consumable"}
            ],
            "perks": [
                {"PerkID": "Perk_Str", "PerkType": "Generated", "Affix": "Affix_Str",
                 "ScalingPerGearScore": 0.001, "ConditionEvent": "OnActive"},
                {"PerkID": "Perk_Drawn", "PerkType": "Generated", "ConditionEvent": "OnUnsheathed",
                 "EquipAbility": ["Drawn_Empower"]},
                {"PerkID": "Perk_Light", "PerkType": "Generated", "Affix": "Affix_Light",
                 "ConditionEvent": "OnEquip"}
            ],
            "affixes": [
                {"StatusID": "Affix_Str", "MODStrength": 10},
                {"StatusID": "Affix_Light", "WeightMultiplier": -0.5}
            ],
            "effects": [
                {"StatusID": "Food_Dex", "MODDexterity": 20},
                {"StatusID": "Town_Dmg", "DMGSlash": 0.05, "StackMax": 1}
            ],
            "consumables": [{"ConsumableID": "FoodT5", "AddStatusEffects": ["Food_Dex"]}],
            "abilities": [
                {"AbilityID": "Drawn_Empower", "DMGSlash": 0.1},
                {"AbilityID": "Str_Melee", "DamageIsMelee": true, "OnHit": true, "BaseDamage": 0.1},
                {"AbilityID": "Sword_Tree", "AttackType": ["Heavy"], "BaseDamage": 0.2},
                {"AbilityID": "Sword_Kill", "OnKill": true, "BaseDamage": 1}
            ],
            "weapons": [
                {"WeaponID": "Unarmed", "BaseDamage": 10},
                {"WeaponID": "Sword_T5", "ItemClass": ["Sword"], "BaseDamage": 50,
                 "CritDamageMultiplier": 1.25, "ScalingStrength": 0.9},
                {"WeaponID": "Bow_T5", "ItemClass": ["Bow"], "BaseDamage": 60, "AmmoType": "Arrow"}
            ],
            "armors": [{"ArmorID": "Chest_T5", "WeightOverride": 100, "PhysicalArmor": 300}],
            "damage_table": [
                {"DamageID": "Unarmed_Light", "AttackType": "Light", "DmgCoef": 1},
                {"DamageID": "1hSword_Light", "AttackType": "Light", "DmgCoef": 1, "DamageType": "Slash"},
                {"DamageID": "1hSword_Heavy", "AttackType": "Heavy", "DmgCoef": 1.5, "DamageType": "Slash"},
                {"DamageID": "Bow_Light", "AttackType": "Light", "DmgCoef": 1, "IsRanged": true}
            ],
            "attributes": {
                "str": [
                    {"Level": 5, "Health": 0, "ModifierValueSum": 0},
                    {"Level": 20, "Health": 0, "ModifierValueSum": 0.5, "EquipAbilities": ["Str_Melee"]}
                ],
                "dex": [
                    {"Level": 5},
                    {"Level": 25, "ModifierValueSum": 0.3}
                ],
                "con": [
                    {"Level": 5, "Health": 1000},
                    {"Level": 10, "Health": 1200}
                ]
            }
        }"#,
    )
    .unwrap()
}

fn equipped(slot: EquipSlot, item_id: &str) -> EquippedItem {
    EquippedItem {
        slot,
        item_id: item_id.into(),
        gear_score: 600.0,
        perks: Default::default(),
    }
}

fn state() -> MannequinState {
    MannequinState {
        level: 60,
        equipped_items: vec![
            equipped(EquipSlot::Weapon1, "SwordT5"),
            equipped(EquipSlot::Weapon2, "BowT5"),
            equipped(EquipSlot::Chest, "ChestT5"),
            equipped(EquipSlot::BuffFood1, "FoodT5"),
        ],
        ..Default::default()
    }
}

#[test]
fn test_scaled_attribute_affix() {
    let db = db();
    let build = Mannequin::new(&db).resolve(&state(), &AllConditionsPass);

    // 5 from the table minimum, floor(10 * (1 + 500 * 0.001)) from the affix
    assert_eq!(build.attributes.strength.base, 20);
    assert_eq!(build.attributes.strength.total, 20);
    assert!((build.attributes.strength.scale - 0.5).abs() < 1e-12);
    assert_eq!(build.attributes.strength.abilities, vec!["Str_Melee".to_string()]);

    // consumable effects land in the bonus column
    assert_eq!(build.attributes.dexterity.bonus, 20);
    assert_eq!(build.attributes.dexterity.total, 25);
    assert_eq!(build.attributes.constitution.health, 1000.0);
}

#[test]
fn test_weapon_perks_follow_active_slot() {
    let db = db();
    let mannequin = Mannequin::new(&db);

    let primary = mannequin.resolve(&state(), &AllConditionsPass);
    assert_eq!(primary.weapon.weapon_tag.as_deref(), Some("Sword"));
    let perk_ids: Vec<&str> = primary.mods.perks.iter().map(|it| it.perk.perk_id.as_str()).collect();
    assert_eq!(perk_ids, vec!["Perk_Str", "Perk_Light"]);

    let secondary = MannequinState {
        weapon_active: WeaponSelection::Secondary,
        ..state()
    };
    let build = mannequin.resolve(&secondary, &AllConditionsPass);
    assert_eq!(build.weapon.weapon_tag.as_deref(), Some("Bow"));
    let perk_ids: Vec<&str> = build.mods.perks.iter().map(|it| it.perk.perk_id.as_str()).collect();
    assert_eq!(perk_ids, vec!["Perk_Light"]);
    assert_eq!(build.attributes.strength.base, 5);
}

#[test]
fn test_abilities_gate_on_attack() {
    let db = db();
    let mannequin = Mannequin::new(&db);
    let skilled = MannequinState {
        weapon_unsheathed: true,
        equipped_skills1: Some(EquippedSkills {
            weapon: "Sword".into(),
            tree1: vec!["Sword_Tree".into(), "Sword_Kill".into()],
            tree2: Vec::new(),
        }),
        ..state()
    };

    let light = mannequin.resolve(&skilled, &AllConditionsPass);
    let ids: Vec<&str> = light.mods.abilities.iter().map(|it| it.ability.ability_id.as_str()).collect();
    assert_eq!(ids, vec!["Str_Melee", "Drawn_Empower"]);

    let heavy_state = MannequinState {
        selected_attack: Some("1hSword_Heavy".into()),
        ..skilled
    };
    let heavy = mannequin.resolve(&heavy_state, &AllConditionsPass);
    let ids: Vec<&str> = heavy.mods.abilities.iter().map(|it| it.ability.ability_id.as_str()).collect();
    assert_eq!(ids, vec!["Str_Melee", "Sword_Tree", "Drawn_Empower"]);

    let perk_ability = heavy.mods.abilities.iter().find(|it| it.perk.is_some()).unwrap();
    assert_eq!(perk_ability.ability.ability_id, "Drawn_Empower");
}

#[test]
fn test_stat_panels() {
    let db = db();
    let build = Mannequin::new(&db).resolve(&state(), &AllConditionsPass);

    // floor(100) / 10 halved by the chest perk
    assert!((build.equip_load - 5.0).abs() < 1e-9);
    assert_eq!(build.stats.armor.physical, 300.0);

    let damage = build.stats.weapon_damage.as_ref().unwrap();
    assert_eq!(damage.attack_id, "1hSword_Light");
    assert!(damage.standard > 0.0);
    assert!(damage.crit > damage.standard);
    assert!((damage.crit_mod - 0.25).abs() < 1e-12);
    assert!((build.stats.max_health - 1000.0).abs() < 1e-9);
}

#[test]
fn test_bonuses_and_enforced_effects() {
    let db = db();
    let mut state = state();
    state.bonuses.push(ActiveBonus {
        key: ModifierKey::DmgSlash,
        name: "Sandbox".into(),
        value: 0.1,
    });
    state.enforced_effects.push(rules_core::mannequin::EnforcedEffect {
        id: "Town_Dmg".into(),
        stack: 3,
    });
    let build = Mannequin::new(&db).resolve(&state, &AllConditionsPass);
    let slash = build
        .stats
        .damage
        .iter()
        .find(|it| it.key == ModifierKey::DmgSlash)
        .map(|it| it.value)
        .unwrap_or_default();
    // three enforced stacks, one passes the stack limit
    assert!((slash - 0.15).abs() < 1e-9);
    let damage = build.stats.weapon_damage.unwrap();
    assert!((damage.empower_mod - 0.15).abs() < 1e-9);
}

#[test]
fn test_resolve_is_deterministic() {
    let db = db();
    let mannequin = Mannequin::new(&db);
    let state = state();
    let first = mannequin.resolve(&state, &AllConditionsPass);
    let second = mannequin.resolve(&state, &AllConditionsPass);
    assert_eq!(first, second);
    assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
}
