//! Plain text rendering of resolution results

use rules_core::mannequin::{ActiveAttribute, BuildStats};
use rules_core::{AttributeSet, LootNode, LootNodeKind, ResolvedBuild};
use std::fmt::Write;

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn damage_report(standard: f64, crit: f64, mitigation: Option<f64>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "standard: {standard:.2}");
    let _ = writeln!(out, "crit:     {crit:.2}");
    if let Some(factor) = mitigation {
        let _ = writeln!(out, "after armor ({} passes):", percent(factor));
        let _ = writeln!(out, "  standard: {:.2}", standard * factor);
        let _ = writeln!(out, "  crit:     {:.2}", crit * factor);
    }
    out
}

fn attributes_report(out: &mut String, attributes: &AttributeSet<ActiveAttribute>) {
    let _ = writeln!(out, "attributes:");
    for (attr, it) in attributes.iter() {
        let _ = writeln!(
            out,
            "  {:<4} {:>4} (base {}, bonus {}, assigned {}, magnify {}) scale {:.3}",
            format!("{attr:?}").to_lowercase(),
            it.total,
            it.base,
            it.bonus,
            it.assigned,
            it.magnify,
            it.scale
        );
    }
}

fn stats_report(out: &mut String, stats: &BuildStats) {
    if let Some(damage) = &stats.weapon_damage {
        let _ = writeln!(
            out,
            "attack {} ({}): {:.2} / crit {:.2}",
            damage.attack_id,
            damage.damage_type.as_deref().unwrap_or("untyped"),
            damage.standard,
            damage.crit
        );
        let _ = writeln!(
            out,
            "  base {}  crit {}  empower {}",
            percent(damage.base_mod),
            percent(damage.crit_mod),
            percent(damage.empower_mod)
        );
    }
    let _ = writeln!(
        out,
        "armor: physical {:.0}, elemental {:.0}",
        stats.armor.physical, stats.armor.elemental
    );
    let _ = writeln!(out, "max health: {:.0}", stats.max_health);
    for total in &stats.damage {
        let _ = writeln!(out, "  {:<16} {}", total.key.name(), percent(total.value));
    }
    for total in &stats.absorption {
        let _ = writeln!(out, "  {:<16} {}", total.key.name(), percent(total.value));
    }
}

pub fn build_report(build: &ResolvedBuild<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "weapon: {} ({})",
        build.weapon.weapon_tag.as_deref().unwrap_or("unarmed"),
        build.weapon.weapon.map(|it| it.weapon_id.as_str()).unwrap_or("-")
    );
    let _ = writeln!(out, "equip load: {:.1} ({:?})", build.equip_load, build.equip_load_category);
    attributes_report(&mut out, &build.attributes);

    let _ = writeln!(out, "perks:");
    for perk in &build.mods.perks {
        let _ = writeln!(out, "  {} x{:.3}", perk.perk.perk_id, perk.affix_multiplier());
    }
    let _ = writeln!(out, "abilities:");
    for ability in &build.mods.abilities {
        let _ = writeln!(out, "  {}", ability.ability.ability_id);
    }
    let _ = writeln!(out, "effects:");
    for effect in &build.mods.effects {
        let _ = writeln!(out, "  {}", effect.effect.status_id);
    }
    stats_report(&mut out, &build.stats);
    out
}

fn node_label(node: &LootNode) -> String {
    match &node.kind {
        LootNodeKind::Table { table_id, is_or, .. } => {
            format!("[table {table_id} {}]", if *is_or { "OR" } else { "AND" })
        }
        LootNodeKind::Bucket { bucket_id } => format!("[bucket {bucket_id}]"),
        LootNodeKind::TableItem { item_id, .. } | LootNodeKind::BucketRow { item_id, .. } => item_id.clone(),
    }
}

fn loot_node(out: &mut String, node: &LootNode, depth: usize, show_locked: bool) {
    if !node.unlocked && !show_locked {
        return;
    }
    let _ = writeln!(
        out,
        "{}{}{} {} ({} of {} items){}",
        "  ".repeat(depth),
        if node.highlight { "* " } else { "" },
        node_label(node),
        percent(node.chance_absolute),
        node.unlocked_item_count,
        node.total_item_count,
        if node.unlocked { "" } else { " locked" }
    );
    for child in &node.children {
        loot_node(out, child, depth + 1, show_locked);
    }
}

pub fn loot_report(root: &LootNode, show_locked: bool) -> String {
    let mut out = String::new();
    loot_node(&mut out, root, 0, show_locked);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules_core::data::NumberOrString;

    fn item(id: &str, unlocked: bool) -> LootNode {
        LootNode {
            kind: LootNodeKind::TableItem {
                item_id: id.into(),
                prob: NumberOrString::Number(0.0),
                quantity: None,
            },
            unlocked,
            highlight: false,
            chance_relative: 0.5,
            chance_absolute: 0.5,
            unlocked_item_count: usize::from(unlocked),
            total_item_count: 1,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_loot_report_hides_locked() {
        let root = LootNode {
            kind: LootNodeKind::Table {
                table_id: "Root".into(),
                max_roll: 100.0,
                is_or: false,
            },
            unlocked: true,
            highlight: false,
            chance_relative: 1.0,
            chance_absolute: 1.0,
            unlocked_item_count: 1,
            total_item_count: 2,
            children: vec![item("Coin", true), item("Gem", false)],
        };
        let report = loot_report(&root, false);
        assert!(report.contains("[table Root AND] 100.00% (1 of 2 items)"));
        assert!(report.contains("  Coin 50.00%"));
        assert!(!report.contains("Gem"));
        assert!(loot_report(&root, true).contains("Gem 50.00% (0 of 1 items) locked"));
    }

    #[test]
    fn test_damage_report_applies_mitigation() {
        let report = damage_report(100.0, 150.0, Some(0.5));
        assert!(report.contains("standard: 100.00"));
        assert!(report.contains("after armor (50.00% passes)"));
        assert!(report.contains("  crit:     75.00"));
    }
}
