use crate::error::{PlacementError, Result};
use crate::observation::{InfectionTimes, Observation, SensorSet};
use crate::tree::Tree;
use crate::{NodeId, F};

/// Per-edge propagation delay shared by the whole tree.
///
/// Delays are deterministic once the model is built; random families are
/// realised by sampling every edge once (see `sensorplace-models`).
pub trait EdgeDelay: Send + Sync {
    /// Delay along the edge with index `edge` in [`Tree::edges`]
    fn delay(&self, edge: usize) -> F;

    /// Reject delays that cannot order infections (non-finite or non-positive)
    fn validate(&self, tree: &Tree) -> Result<()> {
        for edge in 0..tree.num_edges() {
            let d = self.delay(edge);
            if !d.is_finite() || d <= 0.0 {
                let (u, v) = tree.edges()[edge];
                return Err(PlacementError::numerical(format!(
                    "edge {} ({}, {}) has delay {}; delays must be finite and positive",
                    edge, u, v, d
                )));
            }
        }
        Ok(())
    }
}

/// Every edge takes one time unit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UnitDelay;

impl EdgeDelay for UnitDelay {
    fn delay(&self, _edge: usize) -> F {
        1.0
    }
}

impl<D: EdgeDelay + ?Sized> EdgeDelay for Box<D> {
    fn delay(&self, edge: usize) -> F {
        (**self).delay(edge)
    }

    fn validate(&self, tree: &Tree) -> Result<()> {
        (**self).validate(tree)
    }
}

impl<D: EdgeDelay + ?Sized> EdgeDelay for &D {
    fn delay(&self, edge: usize) -> F {
        (**self).delay(edge)
    }

    fn validate(&self, tree: &Tree) -> Result<()> {
        (**self).validate(tree)
    }
}

/// Diffusion of a single infection over a fixed tree and delay model.
pub struct DiffusionModel<'t, D: EdgeDelay> {
    tree: &'t Tree,
    delays: D,
}

impl<'t, D: EdgeDelay> DiffusionModel<'t, D> {
    pub fn new(tree: &'t Tree, delays: D) -> Result<Self> {
        delays.validate(tree)?;
        Ok(Self { tree, delays })
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    pub fn delays(&self) -> &D {
        &self.delays
    }

    /// Infection time of every node and the neighbor it was infected through
    /// when the diffusion starts at `source` at time zero.
    pub fn infection_times(&self, source: NodeId) -> Result<InfectionTimes> {
        let n = self.tree.num_nodes();
        if source >= n {
            return Err(PlacementError::UnknownNode { node: source, nodes: n });
        }

        let mut times = vec![F::NAN; n];
        let mut via = vec![None; n];
        times[source] = 0.0;
        let mut stack = vec![source];

        while let Some(v) = stack.pop() {
            let neighbors = self.tree.neighbors(v);
            let edges = self.tree.incident_edges(v);
            for (&w, &edge) in neighbors.iter().zip(edges) {
                if Some(w) == via[v] {
                    continue;
                }
                times[w] = times[v] + self.delays.delay(edge);
                via[w] = Some(v);
                stack.push(w);
            }
        }

        Ok(InfectionTimes::new(source, times, via))
    }

    /// What `sensors` report when the diffusion starts at `source`.
    pub fn observe(&self, source: NodeId, sensors: &SensorSet) -> Result<Observation> {
        let times = self.infection_times(source)?;
        Observation::from_times(sensors, &times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    struct Doubling;

    impl EdgeDelay for Doubling {
        fn delay(&self, edge: usize) -> F {
            2.0_f64.powi(edge as i32)
        }
    }

    struct Broken;

    impl EdgeDelay for Broken {
        fn delay(&self, edge: usize) -> F {
            if edge == 1 { 0.0 } else { 1.0 }
        }
    }

    #[test]
    fn test_unit_times_are_hop_counts() {
        let tree = Tree::from_edges(5, &[(0, 1), (1, 2), (1, 3), (3, 4)]).unwrap();
        let model = DiffusionModel::new(&tree, UnitDelay).unwrap();
        let times = model.infection_times(2).unwrap();
        for v in tree.nodes() {
            assert_abs_diff_eq!(times.time(v), tree.distance(2, v) as F);
        }
        assert_eq!(times.infected_through(2), None);
        assert_eq!(times.infected_through(4), Some(3));
        assert_eq!(times.infected_through(0), Some(1));
    }

    #[test]
    fn test_weighted_times() {
        let tree = Tree::path(4).unwrap();
        let model = DiffusionModel::new(&tree, Doubling).unwrap();
        let times = model.infection_times(0).unwrap();
        assert_abs_diff_eq!(times.time(3), 1.0 + 2.0 + 4.0);
        let times = model.infection_times(3).unwrap();
        assert_abs_diff_eq!(times.time(1), 4.0 + 2.0);
    }

    #[test]
    fn test_rejects_non_positive_delay() {
        let tree = Tree::path(3).unwrap();
        let err = DiffusionModel::new(&tree, Broken).err().unwrap();
        assert!(matches!(err, PlacementError::NumericalInstability { .. }));
    }

    #[test]
    fn test_unknown_source() {
        let tree = Tree::path(3).unwrap();
        let model = DiffusionModel::new(&tree, UnitDelay).unwrap();
        assert!(model.infection_times(3).is_err());
    }
}
