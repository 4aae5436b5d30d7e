//! rules_sandbox - Command-line sandbox for damage, build and loot resolution
//!
//! Usage: `rules_sandbox <damage|build|loot|text> <scenario.toml>`

mod report;
mod scenario;

use anyhow::{bail, Context, Result};
use rules_core::expression::solve;
use rules_core::formula::{damage_for_weapon, damage_mitigation_factor, WeaponDamageInput};
use rules_core::{AllConditionsPass, LootGraph, Mannequin};
use scenario::{Scenario, ScenarioError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: rules_sandbox <damage|build|loot|text> <scenario.toml>";

fn run_damage(scenario: &Scenario) -> Result<String> {
    let input = scenario.damage.as_ref().ok_or(ScenarioError::MissingSection("damage"))?;
    let constants = scenario.game_constants()?;
    let standard = damage_for_weapon(
        &WeaponDamageInput {
            crit_mod: 0.0,
            ..input.clone()
        },
        &constants,
    );
    let crit = damage_for_weapon(input, &constants);
    let mitigation = scenario
        .mitigation
        .as_ref()
        .map(|it| damage_mitigation_factor(it, &constants));
    Ok(report::damage_report(standard, crit, mitigation))
}

fn run_build(scenario: &Scenario) -> Result<String> {
    let state = scenario.build.as_ref().ok_or(ScenarioError::MissingSection("build"))?;
    let db = scenario.game_data()?;
    let mannequin = Mannequin::new(&db).with_constants(scenario.game_constants()?)?;
    let build = mannequin.resolve(state, &AllConditionsPass);
    Ok(report::build_report(&build))
}

fn run_loot(scenario: &Scenario) -> Result<String> {
    let loot = scenario.loot.as_ref().ok_or(ScenarioError::MissingSection("loot"))?;
    let db = scenario.game_data()?;
    let ctx = loot.context();
    let mut graph = LootGraph::new(&db, &ctx);
    if let Some(item_id) = &loot.highlight {
        graph = graph.with_highlight(item_id.as_str());
    }
    let root = match (&loot.table, &loot.bucket) {
        (Some(table), _) => graph.build_table(table),
        (None, Some(bucket)) => graph.build_bucket(bucket),
        (None, None) => bail!("[loot] needs a table or a bucket"),
    };
    let Some(root) = root else {
        bail!("loot table or bucket not found (or ignored)");
    };
    Ok(report::loot_report(&root, loot.show_locked))
}

fn run_text(scenario: &Scenario) -> Result<String> {
    if scenario.text.is_empty() {
        return Err(ScenarioError::MissingSection("text").into());
    }
    let db = scenario.game_data()?;
    let lines: Vec<String> = scenario
        .text
        .iter()
        .map(|it| solve(&db, &it.context, &it.text))
        .collect();
    Ok(lines.join("\n") + "\n")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(command), Some(path)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };
    let path = PathBuf::from(path);
    let scenario = Scenario::load(&path).with_context(|| format!("loading {}", path.display()))?;

    let output = match command.as_str() {
        "damage" => run_damage(&scenario)?,
        "build" => run_build(&scenario)?,
        "loot" => run_loot(&scenario)?,
        "text" => run_text(&scenario)?,
        other => bail!("unknown command `{other}`\n{USAGE}"),
    };
    print!("{output}");
    Ok(())
}
