use super::ClassCost;
use crate::estimator::map_among;
use crate::prior::Prior;
use crate::tree::Tree;
use crate::{NodeId, F};

/// MAP estimation: every source in a class except the heaviest one is missed.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorCost;

impl ErrorCost {
    /// Exact integer form of the class cost: the class mass minus the weight
    /// of its MAP estimate.
    pub fn exact(prior: &Prior, class: &[NodeId]) -> u64 {
        let hit = map_among(prior, class).map_or(0, |v| prior.weight(v));
        prior.mass(class) - hit
    }
}

impl ClassCost for ErrorCost {
    fn class_cost(&self, _tree: &Tree, prior: &Prior, class: &[NodeId]) -> F {
        Self::exact(prior, class) as F
    }
}
