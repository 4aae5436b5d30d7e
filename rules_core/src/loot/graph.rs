//! LootGraph - expands a loot table or bucket into a tree of resolved nodes

use super::LootContext;
use crate::data::{
    eq_ci, CiSet, GameData, LootBucket, LootRowRef, LootTableEntry, LootTableRow, NumberOrString,
};
use serde::Serialize;

/// What a node of the graph stands for
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LootNodeKind {
    Table {
        table_id: String,
        max_roll: f64,
        is_or: bool,
    },
    TableItem {
        item_id: String,
        /// Roll threshold or condition value of the row
        prob: NumberOrString,
        quantity: Option<NumberOrString>,
    },
    Bucket {
        bucket_id: String,
    },
    BucketRow {
        item_id: String,
        quantity: Vec<f64>,
    },
}

/// A resolved node with its reachability in the current context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LootNode {
    pub kind: LootNodeKind,
    /// Every gate on the path from the root passes
    pub unlocked: bool,
    /// Unlocked and on a path to the highlighted item
    pub highlight: bool,
    /// Chance of this node given its parent was reached
    pub chance_relative: f64,
    /// Product of relative chances along the path
    pub chance_absolute: f64,
    pub unlocked_item_count: usize,
    pub total_item_count: usize,
    pub children: Vec<LootNode>,
}

impl LootNode {
    fn leaf(kind: LootNodeKind, unlocked: bool, chance: Chance, highlight: bool) -> Self {
        LootNode {
            kind,
            unlocked,
            highlight: unlocked && highlight,
            chance_relative: chance.relative,
            chance_absolute: chance.absolute,
            unlocked_item_count: usize::from(unlocked),
            total_item_count: 1,
            children: Vec::new(),
        }
    }

    fn branch(kind: LootNodeKind, unlocked: bool, chance: Chance, children: Vec<LootNode>) -> Self {
        LootNode {
            kind,
            unlocked,
            highlight: unlocked && children.iter().any(|it| it.highlight),
            chance_relative: chance.relative,
            chance_absolute: chance.absolute,
            unlocked_item_count: children.iter().map(|it| it.unlocked_item_count).sum(),
            total_item_count: children.iter().map(|it| it.total_item_count).sum(),
            children,
        }
    }

    /// Depth-first walk over this node and all descendants
    pub fn walk(&self) -> Vec<&LootNode> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.walk());
        }
        nodes
    }

    pub fn id(&self) -> &str {
        match &self.kind {
            LootNodeKind::Table { table_id, .. } => table_id,
            LootNodeKind::TableItem { item_id, .. } => item_id,
            LootNodeKind::Bucket { bucket_id } => bucket_id,
            LootNodeKind::BucketRow { item_id, .. } => item_id,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Chance {
    relative: f64,
    absolute: f64,
}

impl Chance {
    const ROOT: Chance = Chance {
        relative: 1.0,
        absolute: 1.0,
    };

    fn child(&self, relative: f64) -> Chance {
        Chance {
            relative,
            absolute: self.absolute * relative,
        }
    }
}

/// Builds loot graphs over indexed game data
pub struct LootGraph<'d> {
    db: &'d GameData,
    context: &'d LootContext,
    highlight: Option<String>,
}

impl<'d> LootGraph<'d> {
    pub fn new(db: &'d GameData, context: &'d LootContext) -> Self {
        LootGraph {
            db,
            context,
            highlight: None,
        }
    }

    /// Mark unlocked paths leading to this item
    pub fn with_highlight(mut self, item_id: impl Into<String>) -> Self {
        self.highlight = Some(item_id.into());
        self
    }

    /// Expand the table with the given id
    pub fn build_table(&self, table_id: &str) -> Option<LootNode> {
        let table = self.db.loot_tables.get(table_id)?;
        let mut visited = CiSet::new();
        self.table_node(table, true, Chance::ROOT, &mut visited)
    }

    /// Expand the bucket with the given id
    pub fn build_bucket(&self, bucket_id: &str) -> Option<LootNode> {
        let bucket = self.db.loot_buckets.get(bucket_id)?;
        let mut visited = CiSet::new();
        self.bucket_node(bucket, true, Chance::ROOT, &mut visited)
    }

    fn is_highlight(&self, item_id: &str) -> bool {
        self.highlight.as_deref().is_some_and(|it| eq_ci(it, item_id))
    }

    fn table_node(
        &self,
        table: &LootTableEntry,
        parent_unlocked: bool,
        chance: Chance,
        visited: &mut CiSet,
    ) -> Option<LootNode> {
        if self.context.is_ignored_id(&table.loot_table_id) {
            tracing::debug!(table = %table.loot_table_id, "loot table ignored");
            return None;
        }
        if !visited.insert(&table.loot_table_id) {
            tracing::debug!(table = %table.loot_table_id, "loot table already visited");
            return None;
        }

        let unlocked = parent_unlocked && self.context.access_table(table);
        let chances = row_chances(table);
        let mut children = Vec::with_capacity(table.items.len());
        for (row, relative) in table.items.iter().zip(chances) {
            let row_unlocked = unlocked && self.context.access_table_row(table, row);
            let row_chance = chance.child(if row_unlocked { relative } else { 0.0 });
            if let Some(node) = self.row_node(row, row_unlocked, row_chance, visited) {
                children.push(node);
            }
        }

        let kind = LootNodeKind::Table {
            table_id: table.loot_table_id.clone(),
            max_roll: table.max_roll,
            is_or: table.is_or(),
        };
        Some(LootNode::branch(kind, unlocked, chance, children))
    }

    fn row_node(
        &self,
        row: &LootTableRow,
        unlocked: bool,
        chance: Chance,
        visited: &mut CiSet,
    ) -> Option<LootNode> {
        match row.reference() {
            LootRowRef::Item(item_id) => {
                let kind = LootNodeKind::TableItem {
                    item_id: item_id.to_string(),
                    prob: row.prob.clone(),
                    quantity: row.qty.clone(),
                };
                Some(LootNode::leaf(kind, unlocked, chance, self.is_highlight(item_id)))
            }
            LootRowRef::Table(table_id) => match self.db.loot_tables.get(table_id) {
                Some(table) => self.table_node(table, unlocked, chance, visited),
                None => {
                    tracing::debug!(table = table_id, "unknown loot table reference");
                    None
                }
            },
            LootRowRef::Bucket(bucket_id) => match self.db.loot_buckets.get(bucket_id) {
                Some(bucket) => self.bucket_node(bucket, unlocked, chance, visited),
                None => {
                    tracing::debug!(bucket = bucket_id, "unknown loot bucket reference");
                    None
                }
            },
        }
    }

    fn bucket_node(
        &self,
        bucket: &LootBucket,
        parent_unlocked: bool,
        chance: Chance,
        visited: &mut CiSet,
    ) -> Option<LootNode> {
        if self.context.is_ignored_id(&bucket.id) {
            tracing::debug!(bucket = %bucket.id, "loot bucket ignored");
            return None;
        }
        if !visited.insert(&bucket.id) {
            tracing::debug!(bucket = %bucket.id, "loot bucket already visited");
            return None;
        }

        let access: Vec<bool> = bucket
            .rows
            .iter()
            .map(|row| parent_unlocked && self.context.access_bucket_row(row))
            .collect();
        let open_rows = access.iter().filter(|it| **it).count();

        let children = bucket
            .rows
            .iter()
            .zip(access)
            .map(|(row, unlocked)| {
                let relative = if unlocked { 1.0 / open_rows as f64 } else { 0.0 };
                let kind = LootNodeKind::BucketRow {
                    item_id: row.item.clone(),
                    quantity: row.quantity.clone(),
                };
                LootNode::leaf(kind, unlocked, chance.child(relative), self.is_highlight(&row.item))
            })
            .collect();

        let kind = LootNodeKind::Bucket {
            bucket_id: bucket.id.clone(),
        };
        Some(LootNode::branch(kind, parent_unlocked, chance, children))
    }
}

/// Relative chance of every row of a table, in row order
///
/// `AND` tables roll each row against `MaxRoll`. `OR` tables pick the highest
/// reached threshold, so a row owns the band up to the next higher threshold,
/// shared with the rows on the same threshold. Tables without a roll give
/// every row a chance of 1.
fn row_chances(table: &LootTableEntry) -> Vec<f64> {
    let max_roll = table.max_roll;
    if max_roll <= 0.0 {
        return vec![1.0; table.items.len()];
    }
    let probs: Vec<f64> = table.items.iter().map(|row| row.prob.as_f64()).collect();
    if !table.is_or() {
        return probs
            .iter()
            .map(|prob| ratio(max_roll - prob, max_roll))
            .collect();
    }

    let mut thresholds: Vec<f64> = probs.iter().copied().filter(|it| !it.is_nan()).collect();
    thresholds.sort_by(f64::total_cmp);
    thresholds.dedup();
    probs
        .iter()
        .map(|prob| {
            if prob.is_nan() {
                return 0.0;
            }
            let upper = thresholds
                .iter()
                .copied()
                .find(|it| it > prob)
                .unwrap_or(max_roll);
            let sharing = probs.iter().filter(|it| *it == prob).count() as f64;
            ratio(upper - prob, max_roll) / sharing
        })
        .collect()
}

fn ratio(part: f64, whole: f64) -> f64 {
    let value = part / whole;
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
