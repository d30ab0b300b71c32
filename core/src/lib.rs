//! Weighted undirected graphs and minimum spanning forests
//!
//! The crate is layered leaf to root: an arena-indexed doubly-linked list,
//! a chained hash table and a disjoint-set forest, a weighted undirected
//! graph built from those three, and Kruskal's algorithm on top.
//!
//! ```
//! use wugraph_core::{min_span_tree, WeightedGraph};
//!
//! let mut graph = WeightedGraph::new();
//! for v in ["A", "B", "C"] {
//!     graph.add_vertex(v);
//! }
//! graph.add_edge(&"A", &"B", 1);
//! graph.add_edge(&"B", &"C", 2);
//! graph.add_edge(&"A", &"C", 3);
//!
//! let tree = min_span_tree(&graph);
//! assert_eq!(tree.edge_count(), 2);
//! assert_eq!(tree.total_weight(), 3);
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod data_structures;

pub use crate::algorithm::graph::mst::{min_span_tree, MSTResult, MSTStatistics, MinimumSpanningTree};
pub use crate::algorithm::traits::{Algorithm, AlgorithmError};
pub use crate::data_structures::graph::{Neighbors, Weight, WeightedGraph};
