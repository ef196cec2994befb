use serde::{Deserialize, Serialize};
use tracing::debug;

use sensorplace_core::{NodeId, PlacementError, Result, Tree};

use crate::rng::TreeRng;

/// Random tree families available to experiments and the CLI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreeKind {
    /// Each new node attaches to a uniformly chosen earlier node
    Recursive,
    /// Each new node attaches proportionally to degree + 1
    Preferential,
    /// Uniform over labelled trees
    Prufer,
}

impl TreeKind {
    pub fn generate(&self, n: usize, rng: &mut TreeRng) -> Result<Tree> {
        match self {
            TreeKind::Recursive => random_recursive_tree(n, rng),
            TreeKind::Preferential => preferential_attachment_tree(n, rng),
            TreeKind::Prufer => prufer_tree(n, rng),
        }
    }
}

fn require_nodes(n: usize) -> Result<()> {
    if n == 0 {
        return Err(PlacementError::invalid_tree("a tree needs at least one node"));
    }
    Ok(())
}

pub fn random_recursive_tree(n: usize, rng: &mut TreeRng) -> Result<Tree> {
    require_nodes(n)?;
    let edges: Vec<(NodeId, NodeId)> = (1..n).map(|v| (rng.index(v), v)).collect();
    debug!(n, "generated random recursive tree");
    Tree::from_edges(n, &edges)
}

pub fn preferential_attachment_tree(n: usize, rng: &mut TreeRng) -> Result<Tree> {
    require_nodes(n)?;
    // node v appears 1 + degree(v) times
    let mut targets: Vec<NodeId> = Vec::with_capacity(3 * n);
    targets.push(0);
    let mut edges = Vec::with_capacity(n.saturating_sub(1));
    for v in 1..n {
        let u = targets[rng.index(targets.len())];
        edges.push((u, v));
        targets.extend([u, v, v]);
    }
    debug!(n, "generated preferential attachment tree");
    Tree::from_edges(n, &edges)
}

/// Uniform labelled tree decoded from a random Prufer sequence.
pub fn prufer_tree(n: usize, rng: &mut TreeRng) -> Result<Tree> {
    require_nodes(n)?;
    if n <= 2 {
        return Tree::path(n);
    }
    let sequence: Vec<NodeId> = (0..n - 2).map(|_| rng.index(n)).collect();

    let mut degree = vec![1usize; n];
    for &v in &sequence {
        degree[v] += 1;
    }
    let mut edges = Vec::with_capacity(n - 1);
    let mut ptr = degree.iter().position(|&d| d == 1).unwrap_or(0);
    let mut leaf = ptr;
    for &v in &sequence {
        edges.push((leaf, v));
        degree[v] -= 1;
        if degree[v] == 1 && v < ptr {
            leaf = v;
        } else {
            ptr += 1;
            while degree[ptr] != 1 {
                ptr += 1;
            }
            leaf = ptr;
        }
    }
    edges.push((leaf, n - 1));
    debug!(n, "generated prufer tree");
    Tree::from_edges(n, &edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_valid() {
        let mut rng = TreeRng::new(11);
        for kind in [TreeKind::Recursive, TreeKind::Preferential, TreeKind::Prufer] {
            for n in 1..40 {
                let tree = kind.generate(n, &mut rng).unwrap();
                assert_eq!(tree.num_nodes(), n);
                assert_eq!(tree.num_edges(), n - 1);
            }
        }
    }

    #[test]
    fn test_zero_nodes_rejected() {
        let mut rng = TreeRng::new(0);
        assert!(random_recursive_tree(0, &mut rng).is_err());
        assert!(prufer_tree(0, &mut rng).is_err());
    }

    #[test]
    fn test_prufer_covers_small_trees() {
        // 16 labelled trees on 4 nodes: 12 paths and 4 stars
        let mut rng = TreeRng::new(5);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2000 {
            let tree = prufer_tree(4, &mut rng).unwrap();
            let mut edges: Vec<_> = tree
                .edges()
                .iter()
                .map(|&(u, v)| (u.min(v), u.max(v)))
                .collect();
            edges.sort_unstable();
            seen.insert(edges);
        }
        assert_eq!(seen.len(), 16);
    }
}
