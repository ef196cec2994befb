use crate::diffusion::{DiffusionModel, EdgeDelay};
use crate::error::{PlacementError, Result};
use crate::observation::Observation;
use crate::prior::Prior;
use crate::tree::Tree;
use crate::{NodeId, F};

/// Source estimator for a fixed diffusion model and prior.
///
/// A candidate is consistent with an observation when a diffusion started
/// there reproduces it exactly; every consistent candidate has likelihood one.
pub struct Estimator<'m, 't, D: EdgeDelay> {
    model: &'m DiffusionModel<'t, D>,
    prior: &'m Prior,
}

impl<'m, 't, D: EdgeDelay> Estimator<'m, 't, D> {
    pub fn new(model: &'m DiffusionModel<'t, D>, prior: &'m Prior) -> Result<Self> {
        prior.check_against(model.tree())?;
        Ok(Self { model, prior })
    }

    pub fn prior(&self) -> &Prior {
        self.prior
    }

    /// Every candidate source that reproduces `obs`, ascending.
    pub fn consistent_sources(&self, obs: &Observation) -> Result<Vec<NodeId>> {
        let tree = self.model.tree();
        obs.check_against(tree)?;
        let mut consistent = Vec::new();
        for s in tree.nodes() {
            if self.model.observe(s, &obs.sensors)?.matches(obs) {
                consistent.push(s);
            }
        }
        Ok(consistent)
    }

    /// Maximum a-posteriori source (maximum likelihood under a uniform prior).
    pub fn map_estimate(&self, obs: &Observation) -> Result<NodeId> {
        let candidates = self.consistent_sources(obs)?;
        map_among(self.prior, &candidates).ok_or_else(no_candidate)
    }

    /// Prior restricted to the consistent candidates and renormalised.
    pub fn posterior(&self, obs: &Observation) -> Result<Posterior> {
        let candidates = self.consistent_sources(obs)?;
        Posterior::among(self.prior, &candidates).ok_or_else(no_candidate)
    }
}

fn no_candidate() -> PlacementError {
    PlacementError::InvalidObservation {
        reason: "no candidate source reproduces the observation".to_string(),
    }
}

/// Largest prior weight among `candidates`, ties by smallest id.
pub fn map_among(prior: &Prior, candidates: &[NodeId]) -> Option<NodeId> {
    candidates
        .iter()
        .copied()
        .max_by(|&a, &b| prior.weight(a).cmp(&prior.weight(b)).then(b.cmp(&a)))
}

/// Posterior over the sources consistent with one observation.
///
/// Weights stay integral; probabilities are `weight / mass`.
#[derive(Clone, Debug, PartialEq)]
pub struct Posterior {
    support: Vec<(NodeId, u64)>,
    mass: u64,
}

impl Posterior {
    pub fn among(prior: &Prior, candidates: &[NodeId]) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        Some(Self {
            support: candidates.iter().map(|&v| (v, prior.weight(v))).collect(),
            mass: prior.mass(candidates),
        })
    }

    pub fn support(&self) -> &[(NodeId, u64)] {
        &self.support
    }

    /// Prior weight of the whole support.
    pub fn mass(&self) -> u64 {
        self.mass
    }

    pub fn probability(&self, v: NodeId) -> F {
        self.support
            .iter()
            .find(|&&(u, _)| u == v)
            .map(|&(_, w)| w as F / self.mass as F)
            .unwrap_or(0.0)
    }

    /// Expected hop distance from `target` to a source drawn from the posterior.
    pub fn expected_distance_to(&self, tree: &Tree, target: NodeId) -> F {
        let row = tree.distances_from(target);
        let weighted: u128 = self
            .support
            .iter()
            .map(|&(u, w)| w as u128 * row[u] as u128)
            .sum();
        weighted as F / self.mass as F
    }

    /// `sum_{u,v} w_u w_v d(u,v)` over ordered pairs of the support.
    pub fn pair_sum(&self, tree: &Tree) -> u128 {
        let mut sum = 0u128;
        for (i, &(u, wu)) in self.support.iter().enumerate() {
            let row = tree.distances_from(u);
            for &(v, wv) in &self.support[i + 1..] {
                sum += wu as u128 * wv as u128 * row[v] as u128;
            }
        }
        2 * sum
    }

    /// Expected distance between two independent posterior draws, i.e. the
    /// error of an estimate sampled from the posterior.
    pub fn expected_pairwise_distance(&self, tree: &Tree) -> F {
        let mass = self.mass as F;
        self.pair_sum(tree) as F / (mass * mass)
    }

    /// Weighted tree median: the node minimising the expected distance, ties by
    /// smallest id.
    pub fn median(&self, tree: &Tree) -> NodeId {
        let mut best = (F::INFINITY, 0);
        for v in tree.nodes() {
            let d = self.expected_distance_to(tree, v);
            if d < best.0 - 1e-12 {
                best = (d, v);
            }
        }
        best.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffusion::UnitDelay;
    use crate::observation::SensorSet;
    use approx::assert_relative_eq;

    #[test]
    fn test_path_single_sensor() {
        // 0 - 1 - 2 - 3, sensor at 1
        let tree = Tree::path(4).unwrap();
        let model = DiffusionModel::new(&tree, UnitDelay).unwrap();
        let prior = Prior::uniform(4);
        let est = Estimator::new(&model, &prior).unwrap();
        let sensors = SensorSet::new(&tree, [1]).unwrap();

        let obs = model.observe(3, &sensors).unwrap();
        assert_eq!(est.consistent_sources(&obs).unwrap(), vec![2, 3]);
        assert_eq!(est.map_estimate(&obs).unwrap(), 2);

        let obs = model.observe(0, &sensors).unwrap();
        assert_eq!(est.map_estimate(&obs).unwrap(), 0);
    }

    #[test]
    fn test_map_prefers_heavier_candidate() {
        let tree = Tree::path(4).unwrap();
        let model = DiffusionModel::new(&tree, UnitDelay).unwrap();
        let prior = Prior::from_weights(&tree, vec![1, 1, 1, 3]).unwrap();
        let est = Estimator::new(&model, &prior).unwrap();
        let sensors = SensorSet::new(&tree, [1]).unwrap();
        let obs = model.observe(2, &sensors).unwrap();
        assert_eq!(est.map_estimate(&obs).unwrap(), 3);

        let post = est.posterior(&obs).unwrap();
        assert_relative_eq!(post.probability(3), 0.75);
        assert_relative_eq!(post.probability(0), 0.0);
        // draws land on {2, 3}: 2 * 0.25 * 0.75 * 1
        assert_relative_eq!(post.expected_pairwise_distance(&tree), 0.375);
        assert_eq!(post.median(&tree), 3);
    }

    #[test]
    fn test_unreproducible_observation() {
        let tree = Tree::path(3).unwrap();
        let model = DiffusionModel::new(&tree, UnitDelay).unwrap();
        let prior = Prior::uniform(3);
        let est = Estimator::new(&model, &prior).unwrap();
        let sensors = SensorSet::new(&tree, [0, 2]).unwrap();
        let mut obs = model.observe(1, &sensors).unwrap();
        obs.offsets[1] = 7.0;
        assert!(matches!(
            est.map_estimate(&obs),
            Err(PlacementError::InvalidObservation { .. })
        ));
    }

    #[test]
    fn test_median_ties_to_smallest_id() {
        let tree = Tree::path(2).unwrap();
        let post = Posterior::among(&Prior::uniform(2), &[0, 1]).unwrap();
        assert_eq!(post.median(&tree), 0);
        assert_relative_eq!(post.expected_distance_to(&tree, 1), 0.5);
    }

    #[test]
    fn test_pair_sum() {
        let tree = Tree::path(3).unwrap();
        let post = Posterior::among(&Prior::uniform(3), &[0, 1, 2]).unwrap();
        // d(0,1) + d(0,2) + d(1,2) = 4, counted both ways
        assert_eq!(post.pair_sum(&tree), 8);
        assert_relative_eq!(post.expected_pairwise_distance(&tree), 8.0 / 9.0);

        let star = Tree::star(2).unwrap();
        let prior = Prior::from_weights(&star, vec![3, 1, 2]).unwrap();
        // 3*1*1 + 3*2*1 + 1*2*2 = 13
        assert_eq!(Posterior::among(&prior, &[0, 1, 2]).unwrap().pair_sum(&star), 26);
        assert!(Posterior::among(&prior, &[]).is_none());
    }
}
