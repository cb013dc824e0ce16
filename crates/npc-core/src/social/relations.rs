//! Relation Graph
//!
//! World-scoped directed graph of NPC-to-NPC sentiment in [-100,100].
//! Edges default to zero; the mutual value averages both directions and is
//! what ambient interaction selection keys off.

use std::collections::BTreeMap;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resource: directed sentiment edges between NPCs.
#[derive(Resource, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RelationGraph {
    edges: BTreeMap<Uuid, BTreeMap<Uuid, i32>>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// How `from` feels about `to`; unknown pairs are neutral.
    pub fn get(&self, from: Uuid, to: Uuid) -> i32 {
        self.edges
            .get(&from)
            .and_then(|m| m.get(&to))
            .copied()
            .unwrap_or(0)
    }

    /// Shifts one directed edge, clamped to [-100,100].
    pub fn adjust(&mut self, from: Uuid, to: Uuid, delta: i32) {
        if from == to {
            return;
        }
        let edge = self.edges.entry(from).or_default().entry(to).or_insert(0);
        *edge = (*edge + delta).clamp(-100, 100);
    }

    /// Shifts both directions by the same amount.
    pub fn adjust_mutual(&mut self, a: Uuid, b: Uuid, delta: i32) {
        self.adjust(a, b, delta);
        self.adjust(b, a, delta);
    }

    pub fn set(&mut self, from: Uuid, to: Uuid, value: i32) {
        if from == to {
            return;
        }
        self.edges
            .entry(from)
            .or_default()
            .insert(to, value.clamp(-100, 100));
    }

    /// Average of the two directed edges.
    pub fn mutual(&self, a: Uuid, b: Uuid) -> i32 {
        (self.get(a, b) + self.get(b, a)) / 2
    }

    pub fn friends_of(&self, npc: Uuid, floor: i32) -> Vec<Uuid> {
        self.edges
            .get(&npc)
            .map(|m| {
                m.iter()
                    .filter(|(_, v)| **v >= floor)
                    .map(|(other, _)| *other)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Removes an NPC as both source and target of edges.
    pub fn forget_npc(&mut self, npc: Uuid) {
        self.edges.remove(&npc);
        for targets in self.edges.values_mut() {
            targets.remove(&npc);
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Uuid, Uuid) {
        (Uuid::from_u128(1), Uuid::from_u128(2))
    }

    #[test]
    fn test_unknown_pairs_are_neutral() {
        let graph = RelationGraph::new();
        let (a, b) = pair();
        assert_eq!(graph.get(a, b), 0);
        assert_eq!(graph.mutual(a, b), 0);
    }

    #[test]
    fn test_adjust_is_directed_and_clamped() {
        let mut graph = RelationGraph::new();
        let (a, b) = pair();
        graph.adjust(a, b, 30);
        assert_eq!(graph.get(a, b), 30);
        assert_eq!(graph.get(b, a), 0);
        graph.adjust(a, b, 500);
        assert_eq!(graph.get(a, b), 100);
        graph.adjust(a, b, -1_000);
        assert_eq!(graph.get(a, b), -100);
    }

    #[test]
    fn test_self_edges_ignored() {
        let mut graph = RelationGraph::new();
        let (a, _) = pair();
        graph.adjust(a, a, 50);
        assert_eq!(graph.get(a, a), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_mutual_averages_both_directions() {
        let mut graph = RelationGraph::new();
        let (a, b) = pair();
        graph.set(a, b, 40);
        graph.set(b, a, -10);
        assert_eq!(graph.mutual(a, b), 15);
        assert_eq!(graph.mutual(b, a), 15);
    }

    #[test]
    fn test_adjust_mutual() {
        let mut graph = RelationGraph::new();
        let (a, b) = pair();
        graph.adjust_mutual(a, b, -5);
        assert_eq!(graph.get(a, b), -5);
        assert_eq!(graph.get(b, a), -5);
    }

    #[test]
    fn test_friends_of_filters_by_floor() {
        let mut graph = RelationGraph::new();
        let (a, b) = pair();
        let c = Uuid::from_u128(3);
        graph.set(a, b, 40);
        graph.set(a, c, 10);
        assert_eq!(graph.friends_of(a, 20), vec![b]);
    }

    #[test]
    fn test_forget_npc_removes_both_directions() {
        let mut graph = RelationGraph::new();
        let (a, b) = pair();
        graph.adjust_mutual(a, b, 25);
        graph.forget_npc(b);
        assert_eq!(graph.get(a, b), 0);
        assert_eq!(graph.get(b, a), 0);
        assert_eq!(graph.edge_count(), 0);
    }
}
