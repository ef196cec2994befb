use serde::Serialize;

use crate::error::{PlacementError, Result};
use crate::tree::Tree;
use crate::{NodeId, F};

/// Prior over candidate sources as strictly positive integer weights.
///
/// The probability of `v` is `weight(v) / total()`. Keeping the weights
/// integral makes every class cost exact, which the optimizers rely on when
/// comparing candidate placements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Prior {
    weights: Vec<u64>,
    #[serde(skip)]
    total: u64,
}

impl Prior {
    /// Upper bound on the total weight; keeps pairwise products inside `i128`.
    pub const MAX_TOTAL: u64 = u32::MAX as u64;

    pub fn uniform(n: usize) -> Self {
        Self {
            weights: vec![1; n],
            total: n as u64,
        }
    }

    pub fn from_weights(tree: &Tree, weights: Vec<u64>) -> Result<Self> {
        if weights.len() != tree.num_nodes() {
            return Err(PlacementError::invalid_prior(format!(
                "{} weights given for {} nodes",
                weights.len(),
                tree.num_nodes()
            )));
        }
        if let Some(v) = weights.iter().position(|&w| w == 0) {
            return Err(PlacementError::invalid_prior(format!("node {} has zero weight", v)));
        }
        let total = weights
            .iter()
            .try_fold(0u64, |acc, &w| acc.checked_add(w))
            .filter(|&t| t <= Self::MAX_TOTAL)
            .ok_or_else(|| {
                PlacementError::invalid_prior(format!(
                    "total weight exceeds {}",
                    Self::MAX_TOTAL
                ))
            })?;
        Ok(Self { weights, total })
    }

    /// Uniform prior when `weights` is `None`.
    pub fn or_uniform(tree: &Tree, weights: Option<Vec<u64>>) -> Result<Self> {
        match weights {
            Some(w) => Self::from_weights(tree, w),
            None => Ok(Self::uniform(tree.num_nodes())),
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight(&self, v: NodeId) -> u64 {
        self.weights[v]
    }

    pub fn weights(&self) -> &[u64] {
        &self.weights
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn probability(&self, v: NodeId) -> F {
        self.weights[v] as F / self.total as F
    }

    /// Summed weight of `nodes`.
    pub fn mass(&self, nodes: &[NodeId]) -> u64 {
        nodes.iter().map(|&v| self.weights[v]).sum()
    }

    pub fn is_uniform(&self) -> bool {
        self.weights.windows(2).all(|w| w[0] == w[1])
    }

    /// Check that this prior was built for a tree of the same size.
    pub fn check_against(&self, tree: &Tree) -> Result<()> {
        if self.len() != tree.num_nodes() {
            return Err(PlacementError::invalid_prior(format!(
                "prior has {} weights but the tree has {} nodes",
                self.len(),
                tree.num_nodes()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform() {
        let prior = Prior::uniform(4);
        assert_eq!(prior.total(), 4);
        assert!(prior.is_uniform());
        assert_relative_eq!(prior.probability(2), 0.25);
        assert_eq!(prior.mass(&[0, 3]), 2);
    }

    #[test]
    fn test_weighted() {
        let tree = Tree::path(3).unwrap();
        let prior = Prior::from_weights(&tree, vec![1, 2, 5]).unwrap();
        assert_eq!(prior.total(), 8);
        assert!(!prior.is_uniform());
        assert_relative_eq!(prior.probability(2), 0.625);
    }

    #[test]
    fn test_rejects_bad_weights() {
        let tree = Tree::path(3).unwrap();
        assert!(matches!(
            Prior::from_weights(&tree, vec![1, 2]),
            Err(PlacementError::InvalidPrior { .. })
        ));
        assert!(matches!(
            Prior::from_weights(&tree, vec![1, 0, 1]),
            Err(PlacementError::InvalidPrior { .. })
        ));
        assert!(matches!(
            Prior::from_weights(&tree, vec![u64::MAX, 1, 1]),
            Err(PlacementError::InvalidPrior { .. })
        ));
    }
}
