//! Disjoint-set forest over a dense index universe
//!
//! Union by size with path compression keeps any interleaving of `m` finds
//! and `n - 1` unions within O((m + n) α(n)). Sets can only merge; there is
//! no split or removal.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::cmp::Ordering;

/// Union-find structure for indices `0..n`
///
/// # Panics
/// Every operation taking an index panics if the index is not below
/// [`len`](Self::len).
#[derive(Debug, Clone)]
pub struct DisjointSets {
    /// Parent pointer; a self-pointer marks a representative
    parent: Vec<usize>,
    /// Set size, meaningful only at representatives
    size: Vec<usize>,
    components: usize,
}

impl DisjointSets {
    /// Creates `n` singleton sets
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
            components: n,
        }
    }

    /// Size of the universe
    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets
    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    /// Representative of the set containing `x`
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Point every node on the walked path straight at the root
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }

    /// Merges the sets containing `x` and `y`
    ///
    /// Returns false, leaving the forest unchanged, when both are already in
    /// the same set.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return false;
        }

        let (larger, smaller) = match self.size[root_x].cmp(&self.size[root_y]) {
            Ordering::Less => (root_y, root_x),
            Ordering::Greater | Ordering::Equal => (root_x, root_y),
        };

        self.parent[smaller] = larger;
        self.size[larger] += self.size[smaller];
        self.components -= 1;
        true
    }

    /// True if `x` and `y` share a representative
    pub fn connected(&mut self, x: usize, y: usize) -> bool {
        self.find(x) == self.find(y)
    }

    /// Number of elements in the set containing `x`
    pub fn set_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        let mut sets = DisjointSets::new(4);
        assert_eq!(sets.len(), 4);
        assert_eq!(sets.components(), 4);
        for i in 0..4 {
            assert_eq!(sets.find(i), i);
            assert_eq!(sets.set_size(i), 1);
        }
    }

    #[test]
    fn test_union_joins_representatives() {
        let mut sets = DisjointSets::new(5);

        assert!(sets.union(0, 1));
        assert_eq!(sets.find(0), sets.find(1));
        assert_eq!(sets.components(), 4);

        // Already joined
        assert!(!sets.union(1, 0));
        assert_eq!(sets.components(), 4);

        assert!(sets.union(2, 3));
        assert!(!sets.connected(0, 3));
        assert!(sets.union(1, 2));
        assert!(sets.connected(0, 3));
        assert_eq!(sets.set_size(3), 4);
        assert_eq!(sets.components(), 2);
        assert!(!sets.connected(4, 0));
    }

    #[test]
    fn test_chain_of_unions_yields_single_representative() {
        let n = 1_000;
        let mut sets = DisjointSets::new(n);
        for i in 1..n {
            assert!(sets.union(i - 1, i));
        }

        assert_eq!(sets.components(), 1);
        let root = sets.find(0);
        for i in 0..n {
            assert_eq!(sets.find(i), root);
        }
        assert_eq!(sets.set_size(n - 1), n);
    }

    #[test]
    fn test_smaller_set_hangs_under_larger() {
        let mut sets = DisjointSets::new(4);
        sets.union(0, 1);
        sets.union(0, 2);
        let big_root = sets.find(0);

        sets.union(3, 0);
        assert_eq!(sets.find(3), big_root);
    }

    #[test]
    fn test_empty_universe() {
        let sets = DisjointSets::new(0);
        assert!(sets.is_empty());
        assert_eq!(sets.components(), 0);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_index_panics() {
        let mut sets = DisjointSets::new(2);
        sets.find(2);
    }
}
