//! Graph algorithms
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod mst;

pub use self::mst::{min_span_tree, MSTEdge, MSTParameters, MSTResult, MSTStatistics, MinimumSpanningTree};
