//! Minimum Spanning Tree Algorithm Implementation
//!
//! Kruskal's algorithm over a [`WeightedGraph`], producing a new graph that
//! holds every input vertex and a minimum-weight spanning forest (a tree
//! when the input is connected). The input graph is only read.
//!
//! # Algorithm
//!
//! 1. Copy every vertex into the output graph and give it a dense index
//!    through a [`ChainedHashMap`].
//! 2. Collect a `(weight, a, b)` triple for every adjacency entry. Each
//!    non-self edge is seen from both endpoints, so it appears twice unless
//!    `deduplicate_edges` is set.
//! 3. Stable-sort the triples by weight.
//! 4. Walk them once, accepting an edge exactly when its endpoints have
//!    different [`DisjointSets`] representatives.
//!
//! The second copy of an accepted edge finds its endpoints already joined,
//! and the second copy of a rejected edge is rejected again, so duplicates
//! never change the result.
//!
//! # Algorithmic Complexity
//!
//! - Sorting: O(E log E)
//! - Union-find walk: O(E α(V))
//! - Space: O(V + E)
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::hash::Hash;
use std::time::Instant;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{
    parse_bool_parameter, Algorithm, AlgorithmComplexity, AlgorithmError, AlgorithmParameter,
    ParameterType,
};
use crate::data_structures::disjoint_sets::DisjointSets;
use crate::data_structures::graph::{Weight, WeightedGraph};
use crate::data_structures::hash_table::ChainedHashMap;

/// Candidate edge collected from an adjacency scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MSTEdge<K> {
    pub weight: Weight,
    pub source: K,
    pub target: K,
}

/// Kruskal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MSTParameters {
    /// Keep a single triple per undirected edge instead of one per endpoint
    pub deduplicate_edges: bool,
    /// Publish per-run counters through [`MinimumSpanningTree::get_statistics`]
    pub collect_statistics: bool,
}

impl Default for MSTParameters {
    fn default() -> Self {
        Self {
            deduplicate_edges: false,
            collect_statistics: true,
        }
    }
}

impl MSTParameters {
    /// Parses parameters from JSON; omitted fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, AlgorithmError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MSTStatistics {
    pub edges_collected: usize,
    pub edges_examined: usize,
    pub find_operations: usize,
    pub union_operations: usize,
    pub edges_accepted: usize,
    pub execution_time_ms: f64,
}

/// Outcome of [`MinimumSpanningTree::compute`]
#[derive(Debug, Clone)]
pub struct MSTResult<K> {
    /// Every input vertex plus the accepted edges
    pub forest: WeightedGraph<K>,
    pub total_weight: i64,
    /// Connected components of the input, i.e. trees in the forest
    pub components: usize,
    pub statistics: MSTStatistics,
}

/// Minimum spanning forest of `graph`
///
/// Returns a new graph with the same vertex set; `graph` is not modified.
pub fn min_span_tree<K: Hash + Eq + Clone>(graph: &WeightedGraph<K>) -> WeightedGraph<K> {
    MinimumSpanningTree::new().compute(graph).forest
}

/// Configurable Kruskal driver
#[derive(Debug, Clone, Default)]
pub struct MinimumSpanningTree {
    parameters: MSTParameters,
    statistics: MSTStatistics,
}

impl MinimumSpanningTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: MSTParameters) -> Self {
        Self {
            parameters,
            statistics: MSTStatistics::default(),
        }
    }

    pub fn parameters_ref(&self) -> &MSTParameters {
        &self.parameters
    }

    /// Counters from the last run; all zero when statistics are disabled
    pub fn get_statistics(&self) -> &MSTStatistics {
        &self.statistics
    }

    pub fn reset_statistics(&mut self) {
        self.statistics = MSTStatistics::default();
    }

    /// Runs Kruskal's algorithm on `graph`
    pub fn compute<K: Hash + Eq + Clone>(&mut self, graph: &WeightedGraph<K>) -> MSTResult<K> {
        let start_time = Instant::now();
        let mut statistics = MSTStatistics::default();

        let vertices = graph.get_vertices();
        let mut forest = WeightedGraph::new();
        let mut vertex_index = ChainedHashMap::with_size_estimate(vertices.len());
        for (index, vertex) in vertices.iter().enumerate() {
            forest.add_vertex(vertex.clone());
            vertex_index.insert(vertex.clone(), index);
        }

        let mut edges = self.collect_edges(graph, &vertices, &vertex_index);
        statistics.edges_collected = edges.len();

        // Stable, so equal weights keep their scan order
        edges.sort_by_key(|edge| edge.weight);

        let mut sets = DisjointSets::new(vertices.len());
        let mut total_weight = 0;

        for edge in &edges {
            statistics.edges_examined += 1;

            let (Some(a), Some(b)) = (
                index_of(&vertex_index, &edge.source),
                index_of(&vertex_index, &edge.target),
            ) else {
                warn!("Kruskal: edge endpoint has no vertex index, skipped");
                continue;
            };

            let root_a = sets.find(a);
            let root_b = sets.find(b);
            statistics.find_operations += 2;

            if root_a != root_b {
                sets.union(root_a, root_b);
                statistics.union_operations += 1;
                forest.add_edge(&edge.source, &edge.target, edge.weight);
                total_weight += edge.weight;
                statistics.edges_accepted += 1;
                trace!("Kruskal: accepted edge of weight {}", edge.weight);
            }
        }

        statistics.execution_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "Kruskal: {} vertices, {} candidate edges, {} accepted, total weight {}",
            vertices.len(),
            statistics.edges_collected,
            statistics.edges_accepted,
            total_weight
        );

        if self.parameters.collect_statistics {
            self.statistics = statistics.clone();
        } else {
            self.statistics = MSTStatistics::default();
        }

        MSTResult {
            forest,
            total_weight,
            components: sets.components(),
            statistics,
        }
    }

    fn collect_edges<K: Hash + Eq + Clone>(
        &self,
        graph: &WeightedGraph<K>,
        vertices: &[K],
        vertex_index: &ChainedHashMap<K, usize>,
    ) -> Vec<MSTEdge<K>> {
        let mut edges = Vec::with_capacity(2 * graph.edge_count());

        for (index, vertex) in vertices.iter().enumerate() {
            let Some(neighbors) = graph.get_neighbors(vertex) else {
                continue;
            };

            for (neighbor, weight) in neighbors.iter() {
                if self.parameters.deduplicate_edges {
                    // The lower-indexed endpoint owns the edge
                    match index_of(vertex_index, neighbor) {
                        Some(other) if other < index => continue,
                        _ => {}
                    }
                }
                edges.push(MSTEdge {
                    weight,
                    source: vertex.clone(),
                    target: neighbor.clone(),
                });
            }
        }

        edges
    }
}

fn index_of<K: Hash + Eq>(vertex_index: &ChainedHashMap<K, usize>, vertex: &K) -> Option<usize> {
    vertex_index.find(vertex).map(|entry| *entry.value())
}

impl Algorithm for MinimumSpanningTree {
    fn name(&self) -> &'static str {
        "Minimum Spanning Tree"
    }

    fn category(&self) -> &'static str {
        "graph"
    }

    fn description(&self) -> String {
        "Kruskal's algorithm: sorts every edge by weight and keeps an edge exactly when it \
         joins two components of a disjoint-set forest, yielding a minimum spanning forest."
            .to_string()
    }

    fn complexity(&self) -> AlgorithmComplexity {
        AlgorithmComplexity {
            time_complexity: "O(E log E)".to_string(),
            space_complexity: "O(V + E)".to_string(),
        }
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        vec![
            AlgorithmParameter {
                name: "deduplicate_edges".to_string(),
                value: self.parameters.deduplicate_edges.to_string(),
                value_type: ParameterType::Boolean,
                description: "Collect one candidate per undirected edge".to_string(),
            },
            AlgorithmParameter {
                name: "collect_statistics".to_string(),
                value: self.parameters.collect_statistics.to_string(),
                value_type: ParameterType::Boolean,
                description: "Keep counters from the last run".to_string(),
            },
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "deduplicate_edges" => {
                self.parameters.deduplicate_edges = parse_bool_parameter(name, value)?;
                Ok(())
            }
            "collect_statistics" => {
                self.parameters.collect_statistics = parse_bool_parameter(name, value)?;
                Ok(())
            }
            _ => Err(AlgorithmError::InvalidParameter {
                name: name.to_string(),
                reason: "unknown parameter; valid parameters: deduplicate_edges, collect_statistics"
                    .to_string(),
            }),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "deduplicate_edges" => Some(self.parameters.deduplicate_edges.to_string()),
            "collect_statistics" => Some(self.parameters.collect_statistics.to_string()),
            _ => None,
        }
    }
}
