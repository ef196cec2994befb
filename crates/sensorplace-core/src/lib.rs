pub mod error;
pub mod tree;
pub mod diffusion;
pub mod observation;
pub mod prior;
pub mod estimator;
pub mod criteria;
pub mod objective;

// Core types
pub type NodeId = usize;
pub type F = f64;
pub use error::{budget_from_signed, PlacementError, Result};
pub use tree::{RootedTree, Tree, TreeSpec};

// Diffusion and what sensors see of it
pub use diffusion::{DiffusionModel, EdgeDelay, UnitDelay};
pub use observation::{InfectionTimes, Observation, SensorSet};

// Inference
pub use prior::Prior;
pub use estimator::{map_among, Estimator, Posterior};

// Criteria and evaluation
pub use criteria::{ClassCost, Criterion, DistanceCost, ErrorCost};
pub use objective::ObjectiveEvaluator;
