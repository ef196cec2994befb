use super::ClassCost;
use crate::estimator::Posterior;
use crate::prior::Prior;
use crate::tree::Tree;
use crate::{NodeId, F};

/// Posterior-sampling estimation: the estimate is drawn from the class
/// posterior, so a class costs `sum_{u,v} w_u w_v d(u,v) / mass`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DistanceCost;

impl ClassCost for DistanceCost {
    fn class_cost(&self, tree: &Tree, prior: &Prior, class: &[NodeId]) -> F {
        match Posterior::among(prior, class) {
            Some(post) if class.len() > 1 => post.pair_sum(tree) as F / post.mass() as F,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_class_cost() {
        let tree = Tree::path(3).unwrap();
        let prior = Prior::uniform(3);
        assert_relative_eq!(DistanceCost.class_cost(&tree, &prior, &[0, 1, 2]), 8.0 / 3.0);
        assert_eq!(DistanceCost.class_cost(&tree, &prior, &[1]), 0.0);
        assert_eq!(DistanceCost.class_cost(&tree, &prior, &[]), 0.0);
    }

    #[test]
    fn test_weighted_class_is_mass_times_posterior_error() {
        let tree = Tree::star(2).unwrap();
        let prior = Prior::from_weights(&tree, vec![3, 1, 2]).unwrap();
        let post = Posterior::among(&prior, &[0, 1, 2]).unwrap();
        assert_relative_eq!(
            DistanceCost.class_cost(&tree, &prior, &[0, 1, 2]),
            6.0 * post.expected_pairwise_distance(&tree)
        );
        assert_relative_eq!(DistanceCost.class_cost(&tree, &prior, &[0, 1, 2]), 26.0 / 6.0);
    }
}
