use tracing::trace;

use crate::criteria::Criterion;
use crate::diffusion::{DiffusionModel, EdgeDelay};
use crate::error::{PlacementError, Result};
use crate::observation::{Observation, SensorSet};
use crate::prior::Prior;
use crate::tree::Tree;
use crate::{NodeId, F};

/// Scores sensor sets by simulating the diffusion from every candidate source.
pub struct ObjectiveEvaluator<'m, 't, D: EdgeDelay> {
    model: &'m DiffusionModel<'t, D>,
    prior: &'m Prior,
}

impl<'m, 't, D: EdgeDelay> ObjectiveEvaluator<'m, 't, D> {
    pub fn new(model: &'m DiffusionModel<'t, D>, prior: &'m Prior) -> Result<Self> {
        prior.check_against(model.tree())?;
        Ok(Self { model, prior })
    }

    pub fn tree(&self) -> &'t Tree {
        self.model.tree()
    }

    pub fn prior(&self) -> &Prior {
        self.prior
    }

    /// Partition of the candidate sources by what `sensors` observe.
    ///
    /// Classes are listed by smallest member and each class is ascending.
    pub fn classes(&self, sensors: &SensorSet) -> Result<Vec<Vec<NodeId>>> {
        let tree = self.tree();
        if sensors.len() > tree.num_nodes() {
            return Err(PlacementError::invalid_budget(sensors.len(), tree.num_nodes()));
        }
        if let Some(&bad) = sensors.iter().find(|&&v| !tree.contains(v)) {
            return Err(PlacementError::UnknownNode { node: bad, nodes: tree.num_nodes() });
        }

        let mut representatives: Vec<Observation> = Vec::new();
        let mut classes: Vec<Vec<NodeId>> = Vec::new();
        for s in tree.nodes() {
            let obs = self.model.observe(s, sensors)?;
            match representatives.iter().position(|r| r.matches(&obs)) {
                Some(i) => classes[i].push(s),
                None => {
                    representatives.push(obs);
                    classes.push(vec![s]);
                }
            }
        }
        Ok(classes)
    }

    /// Objective value of `sensors`: the prior-weighted loss of the estimator
    /// for `criterion`, as a probability (error) or in hops (distance).
    pub fn evaluate(&self, sensors: &SensorSet, criterion: Criterion) -> Result<F> {
        let classes = self.classes(sensors)?;
        let cost = criterion.cost();
        let total: F = classes
            .iter()
            .map(|class| cost.class_cost(self.tree(), self.prior, class))
            .sum();
        let value = total / self.prior.total() as F;
        trace!(sensors = ?&sensors[..], classes = classes.len(), value, "evaluated");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffusion::UnitDelay;
    use approx::assert_relative_eq;

    #[test]
    fn test_path_classes() {
        let tree = Tree::path(4).unwrap();
        let model = DiffusionModel::new(&tree, UnitDelay).unwrap();
        let prior = Prior::uniform(4);
        let eval = ObjectiveEvaluator::new(&model, &prior).unwrap();

        let sensors = SensorSet::new(&tree, [1]).unwrap();
        assert_eq!(eval.classes(&sensors).unwrap(), vec![vec![0], vec![1], vec![2, 3]]);
        assert_relative_eq!(
            eval.evaluate(&sensors, Criterion::ProbabilityOfError).unwrap(),
            0.25
        );

        let sensors = SensorSet::new(&tree, [0]).unwrap();
        assert_relative_eq!(
            eval.evaluate(&sensors, Criterion::ProbabilityOfError).unwrap(),
            0.5
        );
    }

    #[test]
    fn test_empty_set_is_one_class() {
        let tree = Tree::star(3).unwrap();
        let model = DiffusionModel::new(&tree, UnitDelay).unwrap();
        let prior = Prior::uniform(4);
        let eval = ObjectiveEvaluator::new(&model, &prior).unwrap();
        let empty = SensorSet::empty();
        assert_eq!(eval.classes(&empty).unwrap().len(), 1);
        assert_relative_eq!(
            eval.evaluate(&empty, Criterion::ProbabilityOfError).unwrap(),
            0.75
        );
        // 3 center-leaf pairs at 1 hop, 3 leaf-leaf pairs at 2 hops, both ways
        assert_relative_eq!(
            eval.evaluate(&empty, Criterion::ExpectedDistance).unwrap(),
            18.0 / 16.0
        );
    }

    #[test]
    fn test_prior_size_mismatch() {
        let tree = Tree::path(3).unwrap();
        let model = DiffusionModel::new(&tree, UnitDelay).unwrap();
        let prior = Prior::uniform(4);
        assert!(matches!(
            ObjectiveEvaluator::new(&model, &prior),
            Err(PlacementError::InvalidPrior { .. })
        ));
    }
}
