use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::error::{PlacementError, Result};
use crate::tree::Tree;
use crate::{NodeId, F};

/// Relative tolerance used when comparing reported infection times.
pub const TIME_RTOL: F = 1e-9;

/// Ascending, duplicate-free set of sensor nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorSet(Vec<NodeId>);

impl SensorSet {
    pub fn new<I: IntoIterator<Item = NodeId>>(tree: &Tree, nodes: I) -> Result<Self> {
        let mut nodes: Vec<NodeId> = nodes.into_iter().collect();
        if let Some(&bad) = nodes.iter().find(|&&v| !tree.contains(v)) {
            return Err(PlacementError::UnknownNode { node: bad, nodes: tree.num_nodes() });
        }
        nodes.sort_unstable();
        nodes.dedup();
        Ok(Self(nodes))
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn all(tree: &Tree) -> Self {
        Self(tree.nodes().collect())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.0.binary_search(&node).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of this set with `node` added.
    pub fn with(&self, node: NodeId) -> Self {
        let mut nodes = self.0.clone();
        if let Err(pos) = nodes.binary_search(&node) {
            nodes.insert(pos, node);
        }
        Self(nodes)
    }

    pub fn into_vec(self) -> Vec<NodeId> {
        self.0
    }
}

impl Deref for SensorSet {
    type Target = [NodeId];

    fn deref(&self) -> &[NodeId] {
        &self.0
    }
}

/// Complete outcome of one diffusion started at `source`.
#[derive(Clone, Debug)]
pub struct InfectionTimes {
    source: NodeId,
    times: Vec<F>,
    via: Vec<Option<NodeId>>,
}

impl InfectionTimes {
    pub(crate) fn new(source: NodeId, times: Vec<F>, via: Vec<Option<NodeId>>) -> Self {
        Self { source, times, via }
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn time(&self, node: NodeId) -> F {
        self.times[node]
    }

    pub fn times(&self) -> &[F] {
        &self.times
    }

    /// Neighbor that passed the infection to `node`; `None` at the source.
    pub fn infected_through(&self, node: NodeId) -> Option<NodeId> {
        self.via[node]
    }
}

/// What a sensor set reports: infection times relative to the first sensor
/// (the start time is unknown) and the arrival neighbor of every sensor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub sensors: SensorSet,
    pub offsets: Vec<F>,
    pub arrivals: Vec<Option<NodeId>>,
}

impl Observation {
    pub fn from_times(sensors: &SensorSet, times: &InfectionTimes) -> Result<Self> {
        let n = times.times().len();
        if let Some(&bad) = sensors.iter().find(|&&v| v >= n) {
            return Err(PlacementError::UnknownNode { node: bad, nodes: n });
        }
        let base = sensors.first().map(|&s| times.time(s)).unwrap_or(0.0);
        Ok(Self {
            sensors: sensors.clone(),
            offsets: sensors.iter().map(|&s| times.time(s) - base).collect(),
            arrivals: sensors.iter().map(|&s| times.infected_through(s)).collect(),
        })
    }

    /// Same sensors, same arrival neighbors and the same relative times.
    pub fn matches(&self, other: &Observation) -> bool {
        self.sensors == other.sensors
            && self.arrivals == other.arrivals
            && self
                .offsets
                .iter()
                .zip(&other.offsets)
                .all(|(&a, &b)| (a - b).abs() <= TIME_RTOL * a.abs().max(b.abs()).max(1.0))
    }

    pub fn check_against(&self, tree: &Tree) -> Result<()> {
        if self.offsets.len() != self.sensors.len() || self.arrivals.len() != self.sensors.len() {
            return Err(PlacementError::InvalidObservation {
                reason: format!(
                    "{} sensors but {} times and {} arrivals",
                    self.sensors.len(),
                    self.offsets.len(),
                    self.arrivals.len()
                ),
            });
        }
        for (&s, arrival) in self.sensors.iter().zip(&self.arrivals) {
            if !tree.contains(s) {
                return Err(PlacementError::UnknownNode { node: s, nodes: tree.num_nodes() });
            }
            if let Some(a) = *arrival {
                if tree.edge_index(s, a).is_none() {
                    return Err(PlacementError::InvalidObservation {
                        reason: format!("sensor {} reports arrival from non-neighbor {}", s, a),
                    });
                }
            }
        }
        Ok(())
    }
}
