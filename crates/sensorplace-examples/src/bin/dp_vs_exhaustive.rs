//! Random trees: the tree DP against every size-k subset.
//!
//! Usage: dp_vs_exhaustive [cases]

use anyhow::{ensure, Context};
use sensorplace_core::{Criterion, Prior};
use sensorplace_models::{TreeKind, TreeRng};
use sensorplace_optim::{optimize, optimize_exhaustive, PlacementConfig};
use tracing::info;

const COMPARE_EPSILON: f64 = 1e-9;
const DEFAULT_CASES: u64 = 500;
const MIN_NODES: usize = 5;
const MAX_NODES: usize = 12;
const RANDOM_SEED: u64 = 14052015;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
        .init();

    let cases = match std::env::args().nth(1) {
        Some(arg) => arg.parse().context("cases must be a non-negative integer")?,
        None => DEFAULT_CASES,
    };
    let config = PlacementConfig::default().with_parallel(true);
    let kinds = [TreeKind::Recursive, TreeKind::Preferential, TreeKind::Prufer];

    for case in 0..cases {
        let mut rng = TreeRng::from_case_id(RANDOM_SEED, case);
        let n = MIN_NODES + rng.index(MAX_NODES - MIN_NODES + 1);
        let kind = kinds[case as usize % kinds.len()];
        let tree = kind.generate(n, &mut rng)?;
        let prior = if case % 2 == 0 {
            Prior::uniform(n)
        } else {
            Prior::from_weights(&tree, rng.weights(n, 4))?
        };
        let k = 1 + rng.index(n);

        for criterion in Criterion::ALL {
            let dp = optimize(&tree, &prior, k, criterion, &config)?;
            let brute = optimize_exhaustive(&tree, &prior, k, criterion, &config)?;
            ensure!(
                (dp.value - brute.value).abs() < COMPARE_EPSILON,
                "case {} ({:?}, n={}, k={}, {}): dp {} vs exhaustive {}",
                case,
                kind,
                n,
                k,
                criterion,
                dp.value,
                brute.value
            );
        }
        println!("Test #{} passed! ({:?}, n={}, k={})", case, kind, n, k);
    }

    info!(cases, "all cases agree");
    println!("✓ {} random trees agree", cases);
    Ok(())
}
