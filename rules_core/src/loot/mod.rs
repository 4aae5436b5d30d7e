//! Loot resolution: context gating and table/bucket graph expansion

mod context;
mod graph;

pub use context::LootContext;
pub use graph::{LootGraph, LootNode, LootNodeKind};
