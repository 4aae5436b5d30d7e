//! Scenario files: one TOML document describing what to resolve

use rules_core::config::load_toml;
use rules_core::data::NumberOrString;
use rules_core::expression::ExpressionContext;
use rules_core::formula::{MitigationInput, WeaponDamageInput};
use rules_core::{GameConstants, GameData, LootContext, MannequinState};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to load scenario {path}: {source}")]
    Load {
        path: PathBuf,
        source: rules_core::ConfigError,
    },
    #[error("Scenario has no [{0}] section")]
    MissingSection(&'static str),
}

/// Loot request of a scenario
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LootScenario {
    /// Loot table to expand
    pub table: Option<String>,
    /// Loot bucket to expand when no table is given
    pub bucket: Option<String>,
    pub tags: Vec<String>,
    pub values: BTreeMap<String, NumberOrString>,
    pub ignore_ids: Vec<String>,
    pub bucket_tags: Vec<String>,
    pub highlight: Option<String>,
    /// Print locked nodes too
    pub show_locked: bool,
}

impl LootScenario {
    pub fn context(&self) -> LootContext {
        LootContext::new(
            self.tags.iter().map(String::as_str),
            self.values.iter().map(|(key, value)| (key.as_str(), value.clone())),
        )
        .with_ignore_ids(&self.ignore_ids)
        .with_bucket_tags(&self.bucket_tags)
    }
}

/// Description text to resolve
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextScenario {
    pub text: String,
    #[serde(flatten)]
    pub context: ExpressionContext,
}

/// A sandbox scenario
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Directory with the JSON tables, relative to the scenario file
    pub data_dir: Option<PathBuf>,
    /// Constants override, relative to the scenario file
    pub constants: Option<PathBuf>,
    pub damage: Option<WeaponDamageInput>,
    pub mitigation: Option<MitigationInput>,
    pub build: Option<MannequinState>,
    pub loot: Option<LootScenario>,
    pub text: Vec<TextScenario>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let mut scenario: Scenario = load_toml(path).map_err(|source| ScenarioError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        scenario.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(scenario)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Game data from `data_dir`, or empty tables without one
    pub fn game_data(&self) -> anyhow::Result<GameData> {
        match &self.data_dir {
            Some(dir) => Ok(GameData::load_dir(&self.resolve_path(dir))?),
            None => {
                tracing::warn!("scenario has no data_dir, using empty tables");
                Ok(GameData::default())
            }
        }
    }

    /// Built-in constants unless the scenario points at its own file
    pub fn game_constants(&self) -> anyhow::Result<GameConstants> {
        let constants = match &self.constants {
            Some(path) => GameConstants::load(&self.resolve_path(path))?,
            None => GameConstants::builtin(),
        };
        constants.validate()?;
        Ok(constants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_scenario() {
        let scenario: Scenario = toml::from_str(
            r#"
data_dir = "data"

[damage]
player_level = 60
base_damage = 50
weapon_gear_score = 600
damage_coef = 1.0

[damage.weapon_scale]
str = 0.9

[mitigation]
armor_rating = 800
gear_score = 600

[build]
level = 60

[[build.equipped_items]]
slot = "weapon1"
item_id = "SwordT5"
gear_score = 600

[loot]
table = "Root"
tags = ["Elite"]
values = { Level = 30, Territory = "Everfall" }
highlight = "Sword"

[[text]]
text = "Deals ${charLevel * 2} damage"
char_level = 10
"#,
        )
        .unwrap();

        let damage = scenario.damage.unwrap();
        assert_eq!(damage.player_level, 60);
        assert!((damage.weapon_scale.strength - 0.9).abs() < 1e-12);
        assert_eq!(scenario.build.unwrap().equipped_items.len(), 1);
        assert_eq!(scenario.text[0].context.char_level, 10);

        let loot = scenario.loot.unwrap();
        let ctx = loot.context();
        assert!(ctx.tags.contains("elite"));
        assert_eq!(ctx.values.get("level").map(|it| it.as_f64()), Some(30.0));
    }

    #[test]
    fn test_empty_scenario() {
        let scenario: Scenario = toml::from_str("").unwrap();
        assert!(scenario.damage.is_none());
        assert!(scenario.text.is_empty());
        assert!(scenario.game_data().unwrap().items.is_empty());
    }
}
