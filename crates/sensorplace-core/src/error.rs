use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("invalid tree: {reason}")]
    InvalidTree { reason: String },

    #[error("invalid budget: {budget} sensors requested for a tree with {nodes} nodes")]
    InvalidBudget { budget: i64, nodes: usize },

    #[error("numerical instability: {reason}")]
    NumericalInstability { reason: String },

    #[error("invalid prior: {reason}")]
    InvalidPrior { reason: String },

    #[error("invalid observation: {reason}")]
    InvalidObservation { reason: String },

    #[error("node {node} is not part of a tree with {nodes} nodes")]
    UnknownNode { node: usize, nodes: usize },
}

impl PlacementError {
    pub fn invalid_tree(reason: impl Into<String>) -> Self {
        Self::InvalidTree { reason: reason.into() }
    }

    pub fn invalid_budget(budget: usize, nodes: usize) -> Self {
        Self::InvalidBudget {
            budget: i64::try_from(budget).unwrap_or(i64::MAX),
            nodes,
        }
    }

    pub fn numerical(reason: impl Into<String>) -> Self {
        Self::NumericalInstability { reason: reason.into() }
    }

    pub fn invalid_prior(reason: impl Into<String>) -> Self {
        Self::InvalidPrior { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, PlacementError>;

/// Check a budget coming from a signed surface (CLI, JSON) against the tree size.
pub fn budget_from_signed(budget: i64, nodes: usize) -> Result<usize> {
    match usize::try_from(budget) {
        Ok(k) if k <= nodes => Ok(k),
        _ => Err(PlacementError::InvalidBudget { budget, nodes }),
    }
}
