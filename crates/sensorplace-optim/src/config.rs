use sensorplace_core::{NodeId, F};

/// Configuration for the placement optimizers
#[derive(Clone, Debug)]
pub struct PlacementConfig {
    pub root: Option<NodeId>, // DP root (None = smallest-id non-leaf)
    pub use_parallel: bool,   // Parallel candidate evaluation in the exhaustive search
    pub tie_epsilon: F,       // Relative tolerance before tie-breaking on sensor ids
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            root: None,
            use_parallel: false,
            tie_epsilon: 1e-9,
        }
    }
}

impl PlacementConfig {
    pub fn with_root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn with_tie_epsilon(mut self, tie_epsilon: F) -> Self {
        self.tie_epsilon = tie_epsilon;
        self
    }
}
