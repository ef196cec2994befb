pub mod exp_distance;
pub mod prob_error;

use serde::{Deserialize, Serialize};

use crate::prior::Prior;
use crate::tree::Tree;
use crate::{NodeId, F};

pub use exp_distance::DistanceCost;
pub use prob_error::ErrorCost;

/// Localization accuracy criterion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criterion {
    /// Probability that the estimate is not the true source
    ProbabilityOfError,
    /// Expected hop distance between the estimate and the true source
    ExpectedDistance,
}

impl Criterion {
    pub const ALL: [Criterion; 2] = [Criterion::ProbabilityOfError, Criterion::ExpectedDistance];

    pub fn name(&self) -> &'static str {
        match self {
            Criterion::ProbabilityOfError => "probability-of-error",
            Criterion::ExpectedDistance => "expected-distance",
        }
    }

    pub fn cost(&self) -> &'static dyn ClassCost {
        match self {
            Criterion::ProbabilityOfError => &ErrorCost,
            Criterion::ExpectedDistance => &DistanceCost,
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Loss contributed by one class of indistinguishable sources, in prior
/// weight units (divide by the total weight for a probability-scaled value).
pub trait ClassCost: Send + Sync {
    fn class_cost(&self, tree: &Tree, prior: &Prior, class: &[NodeId]) -> F;
}
