//! Primitive containers the graph is built from
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod list;
pub mod hash_table;
pub mod disjoint_sets;
pub mod graph;

pub use self::list::{Cursor, ListError, ListHandle, NodeList};
pub use self::hash_table::{BucketHistogram, ChainedHashMap, Entry, EntryHandle};
pub use self::disjoint_sets::DisjointSets;
pub use self::graph::{GraphError, Neighbors, Weight, WeightedGraph};
