use approx::assert_relative_eq;
use sensorplace_core::{Criterion, DiffusionModel, ObjectiveEvaluator, Prior, Tree, UnitDelay};
use sensorplace_models::{TreeKind, TreeRng};
use sensorplace_optim::{optimize, optimize_exhaustive, PlacementConfig};

fn check(tree: &Tree, prior: &Prior, label: &str) {
    let config = PlacementConfig::default();
    let model = DiffusionModel::new(tree, UnitDelay).unwrap();
    let eval = ObjectiveEvaluator::new(&model, prior).unwrap();

    for k in 0..=tree.num_nodes() {
        for criterion in Criterion::ALL {
            let dp = optimize(tree, prior, k, criterion, &config).unwrap();
            let brute = optimize_exhaustive(tree, prior, k, criterion, &config).unwrap();
            assert_relative_eq!(dp.value, brute.value, epsilon = 1e-9, max_relative = 1e-9);
            assert_eq!(dp.sensors.len(), k);

            // the reported value is what the evaluator says about the set
            let direct = eval.evaluate(&dp.sensors, criterion).unwrap();
            assert_relative_eq!(dp.value, direct, epsilon = 1e-9, max_relative = 1e-9);

            assert_eq!(
                dp.sensors, brute.sensors,
                "{} {} k={} edges={:?}",
                label,
                criterion,
                k,
                tree.edges()
            );
        }
    }
}

#[test]
fn test_random_trees_uniform_prior() {
    let mut cases = 0;
    for kind in [TreeKind::Recursive, TreeKind::Preferential, TreeKind::Prufer] {
        for case in 0..12u64 {
            let mut rng = TreeRng::from_case_id(77, case);
            let n = 1 + case as usize % 8;
            let tree = kind.generate(n, &mut rng).unwrap();
            check(&tree, &Prior::uniform(n), "uniform");
            cases += 1;
        }
    }
    println!("checked {} random trees", cases);
}

#[test]
fn test_random_trees_weighted_prior() {
    for case in 0..30u64 {
        let mut rng = TreeRng::from_case_id(4242, case);
        let n = 2 + case as usize % 7;
        let tree = TreeKind::Prufer.generate(n, &mut rng).unwrap();
        let weights = rng.weights(n, 5);
        let prior = Prior::from_weights(&tree, weights).unwrap();
        check(&tree, &prior, "weighted");
    }
}

#[test]
fn test_every_root_gives_the_same_answer() {
    let tree = Tree::from_edges(8, &[(4, 0), (4, 1), (4, 2), (2, 3), (3, 5), (3, 6), (6, 7)])
        .unwrap();
    let prior = Prior::from_weights(&tree, vec![1, 3, 2, 1, 1, 4, 2, 1]).unwrap();
    for criterion in Criterion::ALL {
        for k in 1..=tree.num_nodes() {
            let base = optimize(&tree, &prior, k, criterion, &PlacementConfig::default()).unwrap();
            for root in tree.nodes() {
                let config = PlacementConfig::default().with_root(root);
                let p = optimize(&tree, &prior, k, criterion, &config).unwrap();
                assert_relative_eq!(p.value, base.value, epsilon = 1e-9, max_relative = 1e-9);
            }
        }
    }
}
