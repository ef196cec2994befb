pub mod config;
pub mod dp;
pub mod exhaustive;
pub mod exp_distance;
pub mod prob_error;
pub mod stats;
pub mod table;

use serde::{Deserialize, Serialize};
use tracing::info;

use sensorplace_core::{Criterion, PlacementError, Prior, Result, SensorSet, Tree, F};

pub use config::PlacementConfig;
pub use exhaustive::{binomial, Combinations};
pub use exp_distance::DistanceRule;
pub use prob_error::ErrorRule;

/// Optimal sensor set for one budget and criterion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub sensors: SensorSet,
    pub value: F,
    pub criterion: Criterion,
}

/// Search strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    Dp,         // Tree dynamic program
    Exhaustive, // Every size-k subset
}

/// Best placement of `k` sensors on `tree` by the tree DP.
///
/// Ties between equally good sets go to the lexicographically smallest
/// ascending id sequence.
pub fn optimize(
    tree: &Tree,
    prior: &Prior,
    k: usize,
    criterion: Criterion,
    config: &PlacementConfig,
) -> Result<Placement> {
    place(Method::Dp, tree, prior, k, criterion, config)
}

/// Same contract as [`optimize`] by enumerating every subset.
pub fn optimize_exhaustive(
    tree: &Tree,
    prior: &Prior,
    k: usize,
    criterion: Criterion,
    config: &PlacementConfig,
) -> Result<Placement> {
    place(Method::Exhaustive, tree, prior, k, criterion, config)
}

/// Best placement of `k` sensors with the given search `method`.
pub fn place(
    method: Method,
    tree: &Tree,
    prior: &Prior,
    k: usize,
    criterion: Criterion,
    config: &PlacementConfig,
) -> Result<Placement> {
    prior.check_against(tree)?;
    let n = tree.num_nodes();
    if k > n {
        return Err(PlacementError::invalid_budget(k, n));
    }
    let total = prior.total() as F;

    let (sensors, value) = if k == 0 {
        let all: Vec<_> = tree.nodes().collect();
        let value = criterion.cost().class_cost(tree, prior, &all) / total;
        (SensorSet::empty(), value)
    } else {
        match method {
            Method::Exhaustive => exhaustive::search(tree, prior, k, criterion, config)?,
            Method::Dp => {
                if criterion == Criterion::ExpectedDistance
                    && prior.total() > DistanceRule::MAX_TOTAL_WEIGHT
                {
                    return Err(PlacementError::invalid_prior(format!(
                        "total weight {} exceeds {} supported by the expected-distance tree DP",
                        prior.total(),
                        DistanceRule::MAX_TOTAL_WEIGHT
                    )));
                }
                let root = config.root.unwrap_or_else(|| tree.default_root());
                if !tree.contains(root) {
                    return Err(PlacementError::UnknownNode { node: root, nodes: n });
                }
                let eps = config.tie_epsilon;
                let (nodes, cost) = match criterion {
                    Criterion::ProbabilityOfError => {
                        let cell = dp::solve(tree, prior, k, root, eps, &ErrorRule)?;
                        (cell.sensors, cell.cost as F)
                    }
                    Criterion::ExpectedDistance => {
                        let cell = dp::solve(tree, prior, k, root, eps, &DistanceRule)?;
                        (cell.sensors, cell.cost)
                    }
                };
                (SensorSet::new(tree, nodes)?, cost / total)
            }
        }
    };

    info!(
        ?method,
        %criterion,
        k,
        n,
        sensors = ?&sensors[..],
        value,
        "placement found"
    );
    Ok(Placement { sensors, value, criterion })
}
