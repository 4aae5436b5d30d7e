//! Table index - imported data tables wrapped into id-keyed lookups
//!
//! The import pipeline supplies one JSON array per table. `GameData` indexes
//! them once; every resolution call afterwards only borrows from it.

mod key;
mod records;
mod table;

pub use key::{eq_ci, fold, starts_with_ci, CiMap, CiSet};
pub use records::{
    Ability, Affix, AmmoStats, ArmorStats, AttributeLevel, Consumable, DamageRow, HousingItem,
    ItemDefinition, LootBucket, LootBucketRow, LootBucketTag, LootRowRef, LootTableEntry,
    LootTableRow, NumberOrString, Perk, PerkSlot, StatusEffect, WeaponStats,
};
pub use table::IndexedTable;

use crate::types::{AttributeRef, AttributeSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Table loading error
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read table file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse table file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw table contents as delivered by the import pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTables {
    pub items: Vec<ItemDefinition>,
    pub housings: Vec<HousingItem>,
    pub perks: Vec<Perk>,
    pub affixes: Vec<Affix>,
    pub effects: Vec<StatusEffect>,
    pub abilities: Vec<Ability>,
    pub consumables: Vec<Consumable>,
    pub weapons: Vec<WeaponStats>,
    pub armors: Vec<ArmorStats>,
    pub ammos: Vec<AmmoStats>,
    pub damage_table: Vec<DamageRow>,
    pub attributes: AttributeSet<Vec<AttributeLevel>>,
    pub loot_tables: Vec<LootTableEntry>,
    pub loot_buckets: Vec<LootBucketRow>,
}

/// Indexed game data, immutable after construction
#[derive(Debug, Clone, Default)]
pub struct GameData {
    pub items: IndexedTable<ItemDefinition>,
    pub housings: IndexedTable<HousingItem>,
    pub perks: IndexedTable<Perk>,
    pub affixes: IndexedTable<Affix>,
    pub effects: IndexedTable<StatusEffect>,
    pub abilities: IndexedTable<Ability>,
    pub consumables: IndexedTable<Consumable>,
    pub weapons: IndexedTable<WeaponStats>,
    pub armors: IndexedTable<ArmorStats>,
    pub ammos: IndexedTable<AmmoStats>,
    /// Kept in table order; attacks are selected by prefix scans
    pub damage_table: Vec<DamageRow>,
    /// Level tables per attribute, sorted by level
    pub attributes: AttributeSet<Vec<AttributeLevel>>,
    pub loot_tables: IndexedTable<LootTableEntry>,
    pub loot_buckets: IndexedTable<LootBucket>,
}

impl GameData {
    /// Index raw tables
    pub fn from_tables(tables: RawTables) -> Self {
        let mut attributes = tables.attributes;
        for attr in AttributeRef::all() {
            attributes.get_mut(*attr).sort_by_key(|row| row.level);
        }

        GameData {
            items: IndexedTable::from_records(tables.items, |it| &it.item_id),
            housings: IndexedTable::from_records(tables.housings, |it| &it.house_item_id),
            perks: IndexedTable::from_records(tables.perks, |it| &it.perk_id),
            affixes: IndexedTable::from_records(tables.affixes, |it| &it.status_id),
            effects: IndexedTable::from_records(tables.effects, |it| &it.status_id),
            abilities: IndexedTable::from_records(tables.abilities, |it| &it.ability_id),
            consumables: IndexedTable::from_records(tables.consumables, |it| &it.consumable_id),
            weapons: IndexedTable::from_records(tables.weapons, |it| &it.weapon_id),
            armors: IndexedTable::from_records(tables.armors, |it| &it.armor_id),
            ammos: IndexedTable::from_records(tables.ammos, |it| &it.ammo_id),
            damage_table: tables.damage_table,
            attributes,
            loot_tables: IndexedTable::from_records(tables.loot_tables, |it| &it.loot_table_id),
            loot_buckets: IndexedTable::from_records(group_buckets(tables.loot_buckets), |it| &it.id),
        }
    }

    /// Load every known table file from a directory
    ///
    /// Each table lives in its own `<name>.json` file holding a JSON array.
    /// Missing files load as empty tables.
    pub fn load_dir(dir: &Path) -> Result<Self, DataError> {
        let tables = RawTables {
            items: load_table(dir, "items")?,
            housings: load_table(dir, "housings")?,
            perks: load_table(dir, "perks")?,
            affixes: load_table(dir, "affixes")?,
            effects: load_table(dir, "effects")?,
            abilities: load_table(dir, "abilities")?,
            consumables: load_table(dir, "consumables")?,
            weapons: load_table(dir, "weapons")?,
            armors: load_table(dir, "armors")?,
            ammos: load_table(dir, "ammos")?,
            damage_table: load_table(dir, "damage_table")?,
            attributes: AttributeSet {
                constitution: load_table(dir, "attr_con")?,
                dexterity: load_table(dir, "attr_dex")?,
                focus: load_table(dir, "attr_foc")?,
                intelligence: load_table(dir, "attr_int")?,
                strength: load_table(dir, "attr_str")?,
            },
            loot_tables: load_table(dir, "loot_tables")?,
            loot_buckets: load_table(dir, "loot_buckets")?,
        };
        Ok(Self::from_tables(tables))
    }

    /// Parse all tables from one JSON object keyed by table name
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let tables: RawTables = serde_json::from_str(content)?;
        Ok(Self::from_tables(tables))
    }

    /// Level table of one attribute
    pub fn attribute_levels(&self, attr: AttributeRef) -> &[AttributeLevel] {
        self.attributes.get(attr)
    }
}

fn load_table<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>, DataError> {
    let path = dir.join(format!("{name}.json"));
    if !path.exists() {
        tracing::debug!(table = name, "table file missing, using empty table");
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path).map_err(|source| DataError::IoError {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DataError::ParseError { path, source })
}

fn group_buckets(rows: Vec<LootBucketRow>) -> Vec<LootBucket> {
    let mut buckets: Vec<LootBucket> = Vec::new();
    let mut index: CiMap<usize> = CiMap::new();
    for row in rows {
        match index.get(&row.loot_bucket) {
            Some(&i) => buckets[i].rows.push(row),
            None => {
                index.insert(&row.loot_bucket, buckets.len());
                buckets.push(LootBucket {
                    id: row.loot_bucket.clone(),
                    rows: vec![row],
                });
            }
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_indexes_tables() {
        let db = GameData::from_json(
            r#"{
                "items": [{"ItemID": "SwordT5", "ItemType": "Weapon", "ItemClass": ["Sword"]}],
                "perks": [{"PerkID": "PerkA", "ScalingPerGearScore": 0.001}],
                "attributes": {"str": [{"Level": 10}, {"Level": 5}]},
                "loot_buckets": [
                    {"LootBucket": "B1", "Item": "x"},
                    {"LootBucket": "b1", "Item": "y"},
                    {"LootBucket": "B2", "Item": "z"}
                ]
            }"#,
        )
        .unwrap();

        assert!(db.items.get("swordt5").is_some());
        assert!((db.perks.get("PERKA").unwrap().scaling_per_gear_score - 0.001).abs() < f64::EPSILON);
        assert_eq!(db.attribute_levels(AttributeRef::Str)[0].level, 5);
        assert_eq!(db.loot_buckets.get("B1").unwrap().rows.len(), 2);
        assert_eq!(db.loot_buckets.len(), 2);
    }

    #[test]
    fn test_bucket_rows_grouped_in_first_seen_order() {
        let row = |bucket: &str, item: &str| LootBucketRow {
            loot_bucket: bucket.into(),
            item: item.into(),
            ..Default::default()
        };
        let buckets = group_buckets(vec![row("B1", "x"), row("B2", "y"), row("b1", "z"), row("B3", "w")]);
        let ids: Vec<&str> = buckets.iter().map(|it| it.id.as_str()).collect();
        assert_eq!(ids, vec!["B1", "B2", "B3"]);
        let items: Vec<&str> = buckets[0].rows.iter().map(|it| it.item.as_str()).collect();
        assert_eq!(items, vec!["x", "z"]);
    }

    #[test]
    fn test_load_dir_missing_files_are_empty() {
        let dir = std::env::temp_dir().join("rules_core_missing_tables");
        let db = GameData::load_dir(&dir).unwrap();
        assert!(db.items.is_empty());
        assert!(db.damage_table.is_empty());
    }
}
