use rand_distr::Exp;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sensorplace_core::{EdgeDelay, PlacementError, Result, Tree, F};

use crate::rng::TreeRng;

/// Same delay on every edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstantDelay(pub F);

impl EdgeDelay for ConstantDelay {
    fn delay(&self, _edge: usize) -> F {
        self.0
    }
}

/// Explicit delay per edge, indexed like [`Tree::edges`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeDelays {
    delays: Vec<F>,
}

impl EdgeDelays {
    pub fn new(tree: &Tree, delays: Vec<F>) -> Result<Self> {
        if delays.len() != tree.num_edges() {
            return Err(PlacementError::numerical(format!(
                "{} delays given for {} edges",
                delays.len(),
                tree.num_edges()
            )));
        }
        let delays = Self { delays };
        delays.validate(tree)?;
        Ok(delays)
    }

    /// Draw one exponential delay per edge; the draw is then frozen.
    pub fn sample_exponential(tree: &Tree, rate: F, rng: &mut TreeRng) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(PlacementError::numerical(format!(
                "exponential rate must be finite and positive, got {}",
                rate
            )));
        }
        let exp = Exp::new(rate).map_err(|e| PlacementError::numerical(e.to_string()))?;
        let delays = (0..tree.num_edges()).map(|_| rng.sample(&exp)).collect();
        debug!(edges = tree.num_edges(), rate, "sampled exponential edge delays");
        Self::new(tree, delays)
    }

    pub fn as_slice(&self) -> &[F] {
        &self.delays
    }
}

impl EdgeDelay for EdgeDelays {
    fn delay(&self, edge: usize) -> F {
        self.delays.get(edge).copied().unwrap_or(F::NAN)
    }
}
