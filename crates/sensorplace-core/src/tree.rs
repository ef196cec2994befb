use crate::error::{PlacementError, Result};
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::OnceLock;

/// Wire form of a tree: declared node count plus undirected edge list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: usize,
    pub edges: Vec<(NodeId, NodeId)>,
}

/// Immutable, validated tree over nodes `0..n`.
///
/// Adjacency is an index arena: `adjacency[v]` lists the neighbors of `v` in
/// ascending order and `incident[v][i]` is the index (into [`Tree::edges`]) of
/// the edge between `v` and `adjacency[v][i]`. Hop distances are computed by
/// breadth-first search on first use and cached per source node.
#[derive(Clone, Debug)]
pub struct Tree {
    edges: Vec<(NodeId, NodeId)>,
    adjacency: Vec<Vec<NodeId>>,
    incident: Vec<Vec<usize>>,
    distances: Vec<OnceLock<Vec<u32>>>,
}

impl Tree {
    /// Build a tree from `n` declared nodes and an undirected edge list.
    pub fn from_edges(n: usize, edges: &[(NodeId, NodeId)]) -> Result<Self> {
        if n == 0 {
            return Err(PlacementError::invalid_tree("a tree needs at least one node"));
        }
        if edges.len() != n - 1 {
            return Err(PlacementError::invalid_tree(format!(
                "{} nodes need exactly {} edges, got {}",
                n,
                n - 1,
                edges.len()
            )));
        }

        let mut components = DisjointSets::new(n);
        for &(u, v) in edges {
            if u >= n || v >= n {
                return Err(PlacementError::invalid_tree(format!(
                    "edge ({}, {}) references a node outside 0..{}",
                    u, v, n
                )));
            }
            if u == v {
                return Err(PlacementError::invalid_tree(format!("self-loop on node {}", u)));
            }
            // n - 1 edges without a cycle always span all n nodes
            if !components.union(u, v) {
                return Err(PlacementError::invalid_tree(format!(
                    "edge ({}, {}) closes a cycle",
                    u, v
                )));
            }
        }

        let mut pairs: Vec<Vec<(NodeId, usize)>> = vec![Vec::new(); n];
        for (index, &(u, v)) in edges.iter().enumerate() {
            pairs[u].push((v, index));
            pairs[v].push((u, index));
        }
        let mut adjacency = Vec::with_capacity(n);
        let mut incident = Vec::with_capacity(n);
        for mut list in pairs {
            list.sort_unstable();
            adjacency.push(list.iter().map(|&(w, _)| w).collect());
            incident.push(list.iter().map(|&(_, e)| e).collect());
        }

        Ok(Self {
            edges: edges.to_vec(),
            adjacency,
            incident,
            distances: (0..n).map(|_| OnceLock::new()).collect(),
        })
    }

    /// A single node, the smallest valid tree.
    pub fn singleton() -> Self {
        Self {
            edges: Vec::new(),
            adjacency: vec![Vec::new()],
            incident: vec![Vec::new()],
            distances: vec![OnceLock::new()],
        }
    }

    /// Path `0 - 1 - ... - (n-1)`.
    pub fn path(n: usize) -> Result<Self> {
        let edges: Vec<_> = (1..n).map(|v| (v - 1, v)).collect();
        Self::from_edges(n, &edges)
    }

    /// Star with center `0` and leaves `1..=leaves`.
    pub fn star(leaves: usize) -> Result<Self> {
        let edges: Vec<_> = (1..=leaves).map(|v| (0, v)).collect();
        Self::from_edges(leaves + 1, &edges)
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Nodes in ascending identifier order, the order used for every tie-break.
    pub fn nodes(&self) -> Range<NodeId> {
        0..self.num_nodes()
    }

    /// Edges in input order; indices into this slice identify edges.
    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// Neighbors of `v` in ascending order (empty for unknown nodes).
    pub fn neighbors(&self, v: NodeId) -> &[NodeId] {
        self.adjacency.get(v).map(|n| n.as_slice()).unwrap_or(&[])
    }

    /// Edge indices aligned with [`Tree::neighbors`].
    pub fn incident_edges(&self, v: NodeId) -> &[usize] {
        self.incident.get(v).map(|e| e.as_slice()).unwrap_or(&[])
    }

    pub fn degree(&self, v: NodeId) -> usize {
        self.neighbors(v).len()
    }

    /// Degree at most one; the only node of a singleton tree is a leaf.
    pub fn is_leaf(&self, v: NodeId) -> bool {
        v < self.num_nodes() && self.degree(v) <= 1
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes().filter(|&v| self.is_leaf(v)).collect()
    }

    pub fn contains(&self, v: NodeId) -> bool {
        v < self.num_nodes()
    }

    /// Index of the edge joining `u` and `v`, if they are adjacent.
    pub fn edge_index(&self, u: NodeId, v: NodeId) -> Option<usize> {
        let neighbors = self.neighbors(u);
        neighbors
            .binary_search(&v)
            .ok()
            .map(|pos| self.incident[u][pos])
    }

    /// Hop distances from `u` to every node. Panics if `u` is not a node.
    pub fn distances_from(&self, u: NodeId) -> &[u32] {
        self.distances[u].get_or_init(|| self.bfs(u))
    }

    /// Hop distance between `u` and `v`.
    pub fn distance(&self, u: NodeId, v: NodeId) -> u32 {
        self.distances_from(u)[v]
    }

    fn bfs(&self, source: NodeId) -> Vec<u32> {
        let mut dist = vec![u32::MAX; self.num_nodes()];
        dist[source] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(source);
        while let Some(v) = queue.pop_front() {
            for &w in self.neighbors(v) {
                if dist[w] == u32::MAX {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
            }
        }
        dist
    }

    /// Smallest-id node that is not a leaf, or node 0 when every node is a leaf.
    pub fn default_root(&self) -> NodeId {
        self.nodes().find(|&v| !self.is_leaf(v)).unwrap_or(0)
    }

    /// Orient the tree away from `root`. Panics if `root` is not a node.
    pub fn rooted_at(&self, root: NodeId) -> RootedTree {
        RootedTree::new(self, root)
    }

    pub fn to_spec(&self) -> TreeSpec {
        TreeSpec {
            nodes: self.num_nodes(),
            edges: self.edges.clone(),
        }
    }
}

impl TryFrom<TreeSpec> for Tree {
    type Error = PlacementError;

    fn try_from(spec: TreeSpec) -> Result<Self> {
        Tree::from_edges(spec.nodes, &spec.edges)
    }
}

impl TryFrom<&TreeSpec> for Tree {
    type Error = PlacementError;

    fn try_from(spec: &TreeSpec) -> Result<Self> {
        Tree::from_edges(spec.nodes, &spec.edges)
    }
}

/// Rooted view of a [`Tree`].
///
/// The pre-order keeps every subtree contiguous, so `preorder[enter[v]..enter[v] + size[v]]`
/// is exactly the subtree of `v`. Reversing the pre-order visits children before parents.
#[derive(Clone, Debug)]
pub struct RootedTree {
    root: NodeId,
    parent: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
    preorder: Vec<NodeId>,
    enter: Vec<usize>,
    size: Vec<usize>,
}

impl RootedTree {
    fn new(tree: &Tree, root: NodeId) -> Self {
        let n = tree.num_nodes();
        assert!(root < n, "root {} outside tree of {} nodes", root, n);

        let mut parent = vec![None; n];
        let mut children = vec![Vec::new(); n];
        let mut preorder = Vec::with_capacity(n);
        let mut stack = vec![root];
        let mut seen = vec![false; n];
        seen[root] = true;

        while let Some(v) = stack.pop() {
            preorder.push(v);
            for &w in tree.neighbors(v) {
                if !seen[w] {
                    seen[w] = true;
                    parent[w] = Some(v);
                    children[v].push(w);
                }
            }
            // reversed so that children are visited in ascending order
            stack.extend(children[v].iter().rev());
        }

        let mut enter = vec![0; n];
        for (index, &v) in preorder.iter().enumerate() {
            enter[v] = index;
        }
        let mut size = vec![1; n];
        for &v in preorder.iter().rev() {
            if let Some(p) = parent[v] {
                size[p] += size[v];
            }
        }

        Self { root, parent, children, preorder, enter, size }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn num_nodes(&self) -> usize {
        self.preorder.len()
    }

    pub fn parent(&self, v: NodeId) -> Option<NodeId> {
        self.parent[v]
    }

    /// Children of `v` in ascending order.
    pub fn children(&self, v: NodeId) -> &[NodeId] {
        &self.children[v]
    }

    pub fn subtree_size(&self, v: NodeId) -> usize {
        self.size[v]
    }

    /// Nodes of the subtree rooted at `v` (pre-order, `v` first).
    pub fn subtree(&self, v: NodeId) -> &[NodeId] {
        let start = self.enter[v];
        &self.preorder[start..start + self.size[v]]
    }

    /// Whether `v` lies in the subtree rooted at `top`.
    pub fn in_subtree(&self, top: NodeId, v: NodeId) -> bool {
        let start = self.enter[top];
        let at = self.enter[v];
        start <= at && at < start + self.size[top]
    }

    pub fn preorder(&self) -> &[NodeId] {
        &self.preorder
    }

    /// Every node after all of its descendants.
    pub fn post_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.preorder.iter().rev().copied()
    }
}

/// Union-find with path halving, used only for cycle detection.
struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect(), rank: vec![0; n] }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Returns false when `a` and `b` were already connected.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        //       0
        //     / | \
        //    1  2  3
        //   / \     \
        //  4   5     6
        Tree::from_edges(7, &[(0, 1), (0, 2), (0, 3), (1, 4), (5, 1), (3, 6)]).unwrap()
    }

    #[test]
    fn test_neighbors_sorted() {
        let t = sample();
        assert_eq!(t.neighbors(1), &[0, 4, 5]);
        assert_eq!(t.neighbors(0), &[1, 2, 3]);
        assert_eq!(t.neighbors(42), &[] as &[NodeId]);
        assert_eq!(t.degree(0), 3);
        assert_eq!(t.leaves(), vec![2, 4, 5, 6]);
        assert_eq!(t.default_root(), 0);
    }

    #[test]
    fn test_edge_index() {
        let t = sample();
        assert_eq!(t.edge_index(1, 5), Some(4));
        assert_eq!(t.edge_index(5, 1), Some(4));
        assert_eq!(t.edge_index(4, 5), None);
    }

    #[test]
    fn test_distances() {
        let t = sample();
        assert_eq!(t.distance(4, 6), 4);
        assert_eq!(t.distance(5, 5), 0);
        assert_eq!(t.distances_from(2), &[1, 2, 0, 2, 3, 3, 3]);
        // cached row is reused
        assert!(std::ptr::eq(t.distances_from(2), t.distances_from(2)));
    }

    #[test]
    fn test_rejects_cycle() {
        let err = Tree::from_edges(4, &[(0, 1), (1, 2), (2, 0)]).unwrap_err();
        assert!(matches!(err, PlacementError::InvalidTree { .. }));
    }

    #[test]
    fn test_rejects_bad_counts_and_ids() {
        assert!(Tree::from_edges(0, &[]).is_err());
        assert!(Tree::from_edges(3, &[(0, 1)]).is_err());
        assert!(Tree::from_edges(3, &[(0, 1), (1, 2), (0, 2)]).is_err());
        assert!(Tree::from_edges(3, &[(0, 1), (1, 3)]).is_err());
        assert!(Tree::from_edges(3, &[(0, 1), (1, 1)]).is_err());
        assert!(Tree::from_edges(3, &[(0, 1), (0, 1)]).is_err());
    }

    #[test]
    fn test_singleton() {
        let t = Tree::from_edges(1, &[]).unwrap();
        assert_eq!(t.num_nodes(), 1);
        assert!(t.is_leaf(0));
        assert_eq!(t.distance(0, 0), 0);
        assert_eq!(t.rooted_at(0).subtree_size(0), 1);
    }

    #[test]
    fn test_rooted_view() {
        let t = sample();
        let r = t.rooted_at(1);
        assert_eq!(r.root(), 1);
        assert_eq!(r.parent(0), Some(1));
        assert_eq!(r.parent(1), None);
        assert_eq!(r.children(1), &[0, 4, 5]);
        assert_eq!(r.subtree_size(0), 4);
        assert_eq!(r.subtree(0), &[0, 2, 3, 6]);
        assert!(r.in_subtree(0, 6));
        assert!(!r.in_subtree(0, 4));
        assert!(r.in_subtree(1, 4));

        let order: Vec<_> = r.post_order().collect();
        for v in t.nodes() {
            if let Some(p) = r.parent(v) {
                let pos_v = order.iter().position(|&x| x == v).unwrap();
                let pos_p = order.iter().position(|&x| x == p).unwrap();
                assert!(pos_v < pos_p);
            }
        }
    }

    #[test]
    fn test_spec_round_trip() {
        let t = sample();
        let spec = t.to_spec();
        let back = Tree::try_from(&spec).unwrap();
        assert_eq!(back.edges(), t.edges());
        assert_eq!(back.num_nodes(), 7);
    }
}
