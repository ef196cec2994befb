//! Reference optimizer: every size-k subset through the objective evaluator.

use rayon::prelude::*;
use tracing::{debug, warn};

use sensorplace_core::{
    Criterion, DiffusionModel, NodeId, ObjectiveEvaluator, Prior, Result, SensorSet, Tree,
    UnitDelay, F,
};

use crate::table::Cost;
use crate::PlacementConfig;

/// Size-k subsets of `0..n` in lexicographic order.
pub struct Combinations {
    n: usize,
    current: Option<Vec<NodeId>>,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            current: (k <= n).then(|| (0..k).collect()),
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<NodeId>;

    fn next(&mut self) -> Option<Vec<NodeId>> {
        let current = self.current.take()?;
        let k = current.len();
        let mut next = current.clone();
        // rightmost position that can still move
        let mut i = k;
        while i > 0 && next[i - 1] == self.n - k + i - 1 {
            i -= 1;
        }
        if i > 0 {
            next[i - 1] += 1;
            for j in i..k {
                next[j] = next[j - 1] + 1;
            }
            self.current = Some(next);
        }
        Some(current)
    }
}

/// Number of size-k subsets of an n-set.
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1u128, |acc, i| acc * (n - i) as u128 / (i + 1) as u128)
}

pub fn search(
    tree: &Tree,
    prior: &Prior,
    k: usize,
    criterion: Criterion,
    config: &PlacementConfig,
) -> Result<(SensorSet, F)> {
    let model = DiffusionModel::new(tree, UnitDelay)?;
    let evaluator = ObjectiveEvaluator::new(&model, prior)?;
    let candidates = binomial(tree.num_nodes(), k);
    if candidates > 1_000_000 {
        warn!(candidates, "exhaustive search over a large candidate space");
    }
    debug!(k, candidates, parallel = config.use_parallel, "exhaustive search started");

    let scored: Vec<(SensorSet, F)> = if config.use_parallel {
        let subsets: Vec<Vec<NodeId>> = Combinations::new(tree.num_nodes(), k).collect();
        subsets
            .into_par_iter()
            .map(|nodes| {
                let sensors = SensorSet::new(tree, nodes)?;
                let value = evaluator.evaluate(&sensors, criterion)?;
                Ok((sensors, value))
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        Combinations::new(tree.num_nodes(), k)
            .map(|nodes| {
                let sensors = SensorSet::new(tree, nodes)?;
                let value = evaluator.evaluate(&sensors, criterion)?;
                Ok((sensors, value))
            })
            .collect::<Result<Vec<_>>>()?
    };

    // sequential reduction in lexicographic order; the first of equal values wins
    let mut best: Option<(SensorSet, F)> = None;
    for (sensors, value) in scored {
        let better = match &best {
            None => true,
            Some((_, current)) => value.compare(current, config.tie_epsilon).is_lt(),
        };
        if better {
            best = Some((sensors, value));
        }
    }
    best.ok_or_else(|| sensorplace_core::PlacementError::invalid_budget(k, tree.num_nodes()))
}
