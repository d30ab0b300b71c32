//! Weighted undirected graph with O(1) vertex and edge mutation
//!
//! Vertices live in a registry list and are found through a chained hash
//! table keyed by the caller's vertex object. Every vertex owns an adjacency
//! list whose entries name the neighbouring vertex's registry node. An edge
//! is a single record in the edge table, keyed by the unordered endpoint
//! pair, holding handles to both of its adjacency entries so it can be
//! unlinked from both lists without searching either one.
//!
//! # Invariants
//! - Each key maps to exactly one registry node.
//! - At most one edge exists per unordered pair of vertices.
//! - A non-self edge occupies one entry in each endpoint's adjacency list;
//!   a self-edge occupies exactly one entry, so it adds one to the degree.
//!
//! # Complexity
//! `add_vertex`, `add_edge`, `remove_edge`, `is_edge`, `weight` and
//! `degree` run in O(1) expected time; `remove_vertex` and `get_neighbors`
//! in O(d); `get_vertices` in O(|V|).
//!
//! Missing vertices and edges are never errors. Internal reference failures
//! are logged and the affected operation degrades to having no effect.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::hash::{Hash, Hasher};

use log::{error, trace};
use thiserror::Error;

use crate::data_structures::hash_table::{fnv_hash, ChainedHashMap};
use crate::data_structures::list::{Cursor, ListError, ListHandle, NodeList};

/// Edge weight
pub type Weight = i64;

/// Internal graph failures
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Stale graph reference: {0}")]
    InvalidNode(#[from] ListError),

    #[error("Graph inconsistency: {0}")]
    Inconsistent(String),
}

/// Neighbours of a vertex with the weights of the connecting edges
///
/// `weight_list[i]` is the weight of the edge to `neighbor_list[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbors<K> {
    pub neighbor_list: Vec<K>,
    pub weight_list: Vec<Weight>,
}

impl<K> Neighbors<K> {
    pub fn len(&self) -> usize {
        self.neighbor_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbor_list.is_empty()
    }

    /// Pairs of (neighbour, weight)
    pub fn iter(&self) -> impl Iterator<Item = (&K, Weight)> + '_ {
        self.neighbor_list
            .iter()
            .zip(self.weight_list.iter().copied())
    }
}

#[derive(Debug, Clone, Copy)]
struct AdjacencyEntry {
    /// Registry node of the vertex at the far end
    neighbor: ListHandle,
}

#[derive(Debug, Clone)]
struct VertexRecord<K> {
    key: K,
    adjacency: NodeList<AdjacencyEntry>,
}

/// One endpoint of an edge: the vertex and the adjacency entry it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EdgeEnd {
    vertex: ListHandle,
    entry: ListHandle,
}

#[derive(Debug, Clone)]
struct EdgeRecord {
    weight: Weight,
    first: EdgeEnd,
    second: EdgeEnd,
}

impl EdgeRecord {
    #[inline]
    fn is_self_edge(&self) -> bool {
        self.first == self.second
    }
}

/// Unordered vertex pair: `(u, v)` and `(v, u)` are equal and hash alike
#[derive(Debug, Clone)]
struct VertexPair<K> {
    first: K,
    second: K,
}

impl<K> VertexPair<K> {
    fn new(first: K, second: K) -> Self {
        Self { first, second }
    }
}

impl<K: PartialEq> PartialEq for VertexPair<K> {
    fn eq(&self, other: &Self) -> bool {
        (self.first == other.first && self.second == other.second)
            || (self.first == other.second && self.second == other.first)
    }
}

impl<K: Eq> Eq for VertexPair<K> {}

impl<K: Hash> Hash for VertexPair<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let a = fnv_hash(&self.first);
        let b = fnv_hash(&self.second);
        state.write_u64(a.min(b));
        state.write_u64(a.max(b));
    }
}

/// Weighted undirected graph; self-edges are permitted
#[derive(Debug, Clone)]
pub struct WeightedGraph<K> {
    vertex_table: ChainedHashMap<K, ListHandle>,
    edge_table: ChainedHashMap<VertexPair<K>, EdgeRecord>,
    registry: NodeList<VertexRecord<K>>,
}

impl<K: Hash + Eq + Clone> Default for WeightedGraph<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone> WeightedGraph<K> {
    /// Creates a graph with no vertices or edges
    pub fn new() -> Self {
        Self {
            vertex_table: ChainedHashMap::new(),
            edge_table: ChainedHashMap::new(),
            registry: NodeList::new(),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of edges; a self-edge counts once
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_table.len()
    }

    /// Copies of every vertex key supplied to [`add_vertex`](Self::add_vertex)
    pub fn get_vertices(&self) -> Vec<K> {
        self.vertices().cloned().collect()
    }

    /// Borrowing view of the vertex keys, in registry order
    pub fn vertices(&self) -> impl Iterator<Item = &K> + '_ {
        self.registry.iter().map(|(_, record)| &record.key)
    }

    /// Adds `vertex` with no incident edges; no-op if already present
    pub fn add_vertex(&mut self, vertex: K) {
        if self.vertex_table.find(&vertex).is_some() {
            return;
        }
        let node = self.registry.insert_front(VertexRecord {
            key: vertex.clone(),
            adjacency: NodeList::new(),
        });
        self.vertex_table.insert(vertex, node);
    }

    /// Removes `vertex` and all incident edges; no-op if absent
    pub fn remove_vertex(&mut self, vertex: &K) {
        let Some(node) = self.vertex_node(vertex) else {
            return;
        };
        if let Err(err) = self.detach_vertex(vertex, node) {
            error!("remove_vertex: {err}");
        }
    }

    #[inline]
    pub fn is_vertex(&self, vertex: &K) -> bool {
        self.vertex_table.find(vertex).is_some()
    }

    /// Degree of `vertex`, or 0 if absent; a self-edge adds one
    pub fn degree(&self, vertex: &K) -> usize {
        let Some(node) = self.vertex_node(vertex) else {
            return 0;
        };
        match self.registry.get(node) {
            Ok(record) => record.adjacency.len(),
            Err(err) => {
                error!("degree: {err}");
                0
            }
        }
    }

    /// Neighbours of `vertex` with edge weights
    ///
    /// Returns `None` both when `vertex` is absent and when it has degree
    /// zero; the two cases are indistinguishable here.
    pub fn get_neighbors(&self, vertex: &K) -> Option<Neighbors<K>> {
        let node = self.vertex_node(vertex)?;
        match self.collect_neighbors(vertex, node) {
            Ok(neighbors) if neighbors.is_empty() => None,
            Ok(neighbors) => Some(neighbors),
            Err(err) => {
                error!("get_neighbors: {err}");
                None
            }
        }
    }

    /// Adds edge `(u, v)` or overwrites its weight if it already exists
    ///
    /// Leaves the graph unchanged if either endpoint is absent.
    pub fn add_edge(&mut self, u: &K, v: &K, weight: Weight) {
        let (Some(node_u), Some(node_v)) = (self.vertex_node(u), self.vertex_node(v)) else {
            trace!("add_edge: endpoint missing, ignored");
            return;
        };

        let pair = VertexPair::new(u.clone(), v.clone());
        if let Some(edge) = self.edge_table.find_mut(&pair) {
            edge.value_mut().weight = weight;
            return;
        }

        if let Err(err) = self.link_edge(pair, node_u, node_v, weight) {
            error!("add_edge: {err}");
        }
    }

    /// Removes edge `(u, v)`; no-op if either endpoint or the edge is absent
    pub fn remove_edge(&mut self, u: &K, v: &K) {
        if !self.is_vertex(u) || !self.is_vertex(v) {
            return;
        }
        if let Err(err) = self.unlink_edge(u, v) {
            error!("remove_edge: {err}");
        }
    }

    pub fn is_edge(&self, u: &K, v: &K) -> bool {
        self.edge(u, v).is_some()
    }

    /// Weight of `(u, v)`, or 0 if it is not an edge
    ///
    /// A zero result does not imply a zero-weight edge; check
    /// [`is_edge`](Self::is_edge) first.
    pub fn weight(&self, u: &K, v: &K) -> Weight {
        self.edge(u, v).map_or(0, |edge| edge.weight)
    }

    /// Every edge once, as `(u, v, weight)`
    pub fn edges(&self) -> Vec<(K, K, Weight)> {
        self.edge_table
            .iter()
            .map(|entry| {
                let pair = entry.key();
                (pair.first.clone(), pair.second.clone(), entry.value().weight)
            })
            .collect()
    }

    /// Sum of all edge weights
    pub fn total_weight(&self) -> i64 {
        self.edge_table.iter().map(|entry| entry.value().weight).sum()
    }

    /// Checks the cross-reference invariants between registry, tables and
    /// adjacency lists
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.vertex_table.len() != self.registry.len() {
            return Err(GraphError::Inconsistent(format!(
                "{} keys indexed but {} vertices registered",
                self.vertex_table.len(),
                self.registry.len()
            )));
        }

        for (node, record) in self.registry.iter() {
            if self.vertex_node(&record.key) != Some(node) {
                return Err(GraphError::Inconsistent(
                    "vertex key does not resolve to its registry node".into(),
                ));
            }
        }

        let mut self_edges = 0;
        for entry in self.edge_table.iter() {
            let (pair, edge) = (entry.key(), entry.value());
            if edge.is_self_edge() {
                self_edges += 1;
            }

            let first = self.registry.get(edge.first.vertex)?;
            let second = self.registry.get(edge.second.vertex)?;
            if VertexPair::new(first.key.clone(), second.key.clone()) != *pair {
                return Err(GraphError::Inconsistent(
                    "edge endpoints do not match its key".into(),
                ));
            }

            let toward_second = first.adjacency.get(edge.first.entry)?;
            let toward_first = second.adjacency.get(edge.second.entry)?;
            if toward_second.neighbor != edge.second.vertex
                || toward_first.neighbor != edge.first.vertex
            {
                return Err(GraphError::Inconsistent(
                    "adjacency entry points at the wrong neighbour".into(),
                ));
            }
        }

        let degree_sum: usize = self
            .registry
            .iter()
            .map(|(_, record)| record.adjacency.len())
            .sum();
        let expected = 2 * self.edge_count() - self_edges;
        if degree_sum != expected {
            return Err(GraphError::Inconsistent(format!(
                "degree sum {degree_sum} but {expected} adjacency entries expected"
            )));
        }

        Ok(())
    }

    fn vertex_node(&self, vertex: &K) -> Option<ListHandle> {
        self.vertex_table.find(vertex).map(|entry| *entry.value())
    }

    fn edge(&self, u: &K, v: &K) -> Option<&EdgeRecord> {
        self.edge_table
            .find(&VertexPair::new(u.clone(), v.clone()))
            .map(|entry| entry.value())
    }

    fn collect_neighbors(&self, vertex: &K, node: ListHandle) -> Result<Neighbors<K>, GraphError> {
        let record = self.registry.get(node)?;
        let mut neighbor_list = Vec::with_capacity(record.adjacency.len());
        let mut weight_list = Vec::with_capacity(record.adjacency.len());

        for (_, adjacency) in record.adjacency.iter() {
            let neighbor = &self.registry.get(adjacency.neighbor)?.key;
            weight_list.push(self.weight(vertex, neighbor));
            neighbor_list.push(neighbor.clone());
        }

        Ok(Neighbors {
            neighbor_list,
            weight_list,
        })
    }

    fn link_edge(
        &mut self,
        pair: VertexPair<K>,
        node_u: ListHandle,
        node_v: ListHandle,
        weight: Weight,
    ) -> Result<(), GraphError> {
        let entry_u = self
            .registry
            .get_mut(node_u)?
            .adjacency
            .insert_front(AdjacencyEntry { neighbor: node_v });

        let entry_v = if node_u == node_v {
            entry_u
        } else {
            match self.registry.get_mut(node_v) {
                Ok(record) => record
                    .adjacency
                    .insert_front(AdjacencyEntry { neighbor: node_u }),
                Err(err) => {
                    // Roll back the half-linked entry before reporting
                    self.registry.get_mut(node_u)?.adjacency.remove(entry_u)?;
                    return Err(err.into());
                }
            }
        };

        self.edge_table.insert(
            pair,
            EdgeRecord {
                weight,
                first: EdgeEnd {
                    vertex: node_u,
                    entry: entry_u,
                },
                second: EdgeEnd {
                    vertex: node_v,
                    entry: entry_v,
                },
            },
        );
        Ok(())
    }

    /// Removes the edge record for `(u, v)` and both adjacency entries
    fn unlink_edge(&mut self, u: &K, v: &K) -> Result<bool, GraphError> {
        let Some(entry) = self.edge_table.remove(&VertexPair::new(u.clone(), v.clone())) else {
            return Ok(false);
        };
        let (_, edge) = entry.into_parts();

        let first = self.detach_entry(edge.first);
        let second = if edge.is_self_edge() {
            Ok(())
        } else {
            self.detach_entry(edge.second)
        };
        first.and(second)?;
        Ok(true)
    }

    fn detach_entry(&mut self, end: EdgeEnd) -> Result<(), GraphError> {
        self.registry
            .get_mut(end.vertex)?
            .adjacency
            .remove(end.entry)?;
        Ok(())
    }

    fn detach_vertex(&mut self, vertex: &K, node: ListHandle) -> Result<(), GraphError> {
        let mut cursor = self.registry.get(node)?.adjacency.front();

        loop {
            match cursor {
                Cursor::End => break,
                Cursor::Stale(entry) => return Err(ListError::InvalidNode(entry).into()),
                Cursor::Node(entry) => {
                    let record = self.registry.get(node)?;
                    let neighbor = record.adjacency.get(entry)?.neighbor;
                    // Advance before the current entry is unlinked
                    cursor = record.adjacency.next(entry);
                    let neighbor_key = self.registry.get(neighbor)?.key.clone();
                    self.unlink_edge(vertex, &neighbor_key)?;
                }
            }
        }

        self.vertex_table.remove(vertex);
        self.registry.remove(node)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn square() -> WeightedGraph<&'static str> {
        let mut graph = WeightedGraph::new();
        for v in ["a", "b", "c", "d"] {
            graph.add_vertex(v);
        }
        graph.add_edge(&"a", &"b", 1);
        graph.add_edge(&"b", &"c", 2);
        graph.add_edge(&"c", &"d", 3);
        graph.add_edge(&"d", &"a", 4);
        graph
    }

    fn degree_sum<K: Hash + Eq + Clone>(graph: &WeightedGraph<K>) -> usize {
        graph.vertices().map(|v| graph.degree(v)).sum()
    }

    #[test]
    fn test_empty_graph() {
        let graph: WeightedGraph<u32> = WeightedGraph::new();
        assert_eq!(graph.vertex_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.get_vertices().is_empty());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_add_vertex_is_idempotent() {
        let mut graph = WeightedGraph::new();
        graph.add_vertex(String::from("x"));
        graph.add_vertex(String::from("x"));

        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.get_vertices(), vec![String::from("x")]);
        assert!(graph.is_vertex(&String::from("x")));
    }

    #[test]
    fn test_get_vertices_returns_caller_keys() {
        let graph = square();
        let mut vertices = graph.get_vertices();
        vertices.sort_unstable();
        assert_eq!(vertices, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_edge_round_trip_and_symmetry() {
        let graph = square();
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.is_edge(&"a", &"b"));
        assert!(graph.is_edge(&"b", &"a"));
        assert_eq!(graph.weight(&"c", &"b"), 2);
        assert_eq!(graph.weight(&"a", &"d"), 4);
        assert!(!graph.is_edge(&"a", &"c"));
        assert_eq!(graph.weight(&"a", &"c"), 0);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_add_edge_overwrites_weight() {
        let mut graph = square();
        graph.add_edge(&"b", &"a", 9);

        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.weight(&"a", &"b"), 9);
        assert_eq!(graph.degree(&"a"), 2);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_add_edge_with_missing_endpoint_is_noop() {
        init_logging();
        let mut graph = square();
        graph.add_edge(&"a", &"zz", 5);
        graph.add_edge(&"zz", &"zz", 5);

        assert_eq!(graph.edge_count(), 4);
        assert!(!graph.is_edge(&"a", &"zz"));
        assert_eq!(graph.weight(&"a", &"zz"), 0);
    }

    #[test]
    fn test_self_edge_counts_once() {
        let mut graph = square();
        graph.add_edge(&"a", &"a", 7);

        assert_eq!(graph.edge_count(), 5);
        assert_eq!(graph.degree(&"a"), 3);
        assert_eq!(graph.weight(&"a", &"a"), 7);
        assert_eq!(degree_sum(&graph), 2 * graph.edge_count() - 1);

        let neighbors = graph.get_neighbors(&"a").unwrap();
        assert_eq!(neighbors.iter().filter(|(n, _)| **n == "a").count(), 1);
        assert!(graph.validate().is_ok());

        graph.remove_edge(&"a", &"a");
        assert_eq!(graph.degree(&"a"), 2);
        assert!(!graph.is_edge(&"a", &"a"));
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_remove_edge_unlinks_both_sides() {
        let mut graph = square();
        graph.remove_edge(&"c", &"b");

        assert_eq!(graph.edge_count(), 3);
        assert!(!graph.is_edge(&"b", &"c"));
        assert_eq!(graph.degree(&"b"), 1);
        assert_eq!(graph.degree(&"c"), 1);
        assert!(graph.validate().is_ok());

        // Removing again is a no-op
        graph.remove_edge(&"b", &"c");
        graph.remove_edge(&"b", &"zz");
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_neighbors_carry_weights() {
        let graph = square();
        let neighbors = graph.get_neighbors(&"a").unwrap();
        assert_eq!(neighbors.len(), 2);

        let mut pairs: Vec<(&str, Weight)> = neighbors.iter().map(|(n, w)| (*n, w)).collect();
        pairs.sort_unstable();
        assert_eq!(pairs, vec![("b", 1), ("d", 4)]);
    }

    #[test]
    fn test_neighbors_absent_and_isolated_look_alike() {
        let mut graph = square();
        graph.add_vertex("lonely");

        assert!(graph.get_neighbors(&"lonely").is_none());
        assert!(graph.get_neighbors(&"missing").is_none());
        assert_eq!(graph.degree(&"lonely"), 0);
        assert_eq!(graph.degree(&"missing"), 0);
    }

    #[test]
    fn test_remove_vertex_removes_incident_edges() {
        let mut graph = square();
        graph.add_edge(&"a", &"a", 1);
        graph.add_edge(&"a", &"c", 5);
        graph.remove_vertex(&"a");

        assert_eq!(graph.vertex_count(), 3);
        assert!(!graph.is_vertex(&"a"));
        assert_eq!(graph.edge_count(), 2);
        assert!(!graph.is_edge(&"a", &"b"));
        assert!(!graph.is_edge(&"a", &"a"));
        assert_eq!(graph.degree(&"b"), 1);
        assert_eq!(graph.degree(&"c"), 2);
        assert_eq!(graph.degree(&"d"), 1);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_remove_missing_vertex_is_noop() {
        let mut graph = square();
        let before = {
            let mut edges = graph.edges();
            edges.sort_unstable();
            edges
        };
        graph.remove_vertex(&"nope");

        let mut after = graph.edges();
        after.sort_unstable();
        assert_eq!(before, after);
        assert_eq!(graph.vertex_count(), 4);
    }

    #[test]
    fn test_vertex_can_be_readded_after_removal() {
        let mut graph = square();
        graph.remove_vertex(&"b");
        graph.add_vertex("b");
        graph.add_edge(&"b", &"d", 6);

        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.degree(&"b"), 1);
        assert_eq!(graph.weight(&"d", &"b"), 6);
        assert!(!graph.is_edge(&"a", &"b"));
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_edges_and_total_weight() {
        let graph = square();
        assert_eq!(graph.edges().len(), 4);
        assert_eq!(graph.total_weight(), 10);
    }

    #[test]
    fn test_growth_with_many_vertices() {
        let mut graph = WeightedGraph::new();
        for i in 0..500u32 {
            graph.add_vertex(i);
        }
        for i in 1..500u32 {
            graph.add_edge(&(i - 1), &i, i64::from(i));
        }

        assert_eq!(graph.vertex_count(), 500);
        assert_eq!(graph.edge_count(), 499);
        assert_eq!(graph.weight(&250, &249), 250);
        assert_eq!(degree_sum(&graph), 2 * 499);
        assert!(graph.validate().is_ok());

        for i in (0..500u32).step_by(2) {
            graph.remove_vertex(&i);
        }
        assert_eq!(graph.vertex_count(), 250);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_pair_hash_is_order_independent() {
        let forward = VertexPair::new(3, 8);
        let backward = VertexPair::new(8, 3);
        assert_eq!(forward, backward);
        assert_eq!(fnv_hash(&forward), fnv_hash(&backward));
        assert_ne!(VertexPair::new(3, 8), VertexPair::new(3, 9));
    }
}
