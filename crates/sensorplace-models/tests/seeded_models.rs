use approx::assert_relative_eq;
use sensorplace_core::{
    Criterion, DiffusionModel, Estimator, ObjectiveEvaluator, Prior, SensorSet, UnitDelay,
};
use sensorplace_models::{ConstantDelay, EdgeDelays, TreeKind, TreeRng};

#[test]
fn test_generators_are_seed_deterministic() {
    for kind in [TreeKind::Recursive, TreeKind::Preferential, TreeKind::Prufer] {
        for case in 0..20u64 {
            let a = kind.generate(25, &mut TreeRng::from_case_id(1234, case)).unwrap();
            let b = kind.generate(25, &mut TreeRng::from_case_id(1234, case)).unwrap();
            assert_eq!(a.to_spec(), b.to_spec(), "{:?} case {}", kind, case);
        }
    }
}

#[test]
fn test_classes_agree_across_delay_models() {
    let mut rng = TreeRng::new(2024);
    for case in 0..30 {
        let n = 2 + case % 9;
        let tree = TreeKind::Prufer.generate(n, &mut rng).unwrap();
        let prior = Prior::uniform(n);
        let exp_delays = EdgeDelays::sample_exponential(&tree, 0.8, &mut rng).unwrap();

        let unit = DiffusionModel::new(&tree, UnitDelay).unwrap();
        let constant = DiffusionModel::new(&tree, ConstantDelay(3.0)).unwrap();
        let sampled = DiffusionModel::new(&tree, exp_delays).unwrap();
        let unit_eval = ObjectiveEvaluator::new(&unit, &prior).unwrap();
        let constant_eval = ObjectiveEvaluator::new(&constant, &prior).unwrap();
        let sampled_eval = ObjectiveEvaluator::new(&sampled, &prior).unwrap();

        for _ in 0..10 {
            let k = rng.index(n + 1);
            let nodes: Vec<usize> = (0..k).map(|_| rng.index(n)).collect();
            let sensors = SensorSet::new(&tree, nodes).unwrap();
            let expected = unit_eval.classes(&sensors).unwrap();
            assert_eq!(constant_eval.classes(&sensors).unwrap(), expected);
            assert_eq!(
                sampled_eval.classes(&sensors).unwrap(),
                expected,
                "tree {:?} sensors {:?}",
                tree.edges(),
                &sensors[..]
            );
        }
    }
}

#[test]
fn test_objective_is_estimator_loss_averaged_over_sources() {
    let mut rng = TreeRng::new(31337);
    for case in 0..25 {
        let n = 2 + case % 8;
        let tree = TreeKind::Recursive.generate(n, &mut rng).unwrap();
        let prior = Prior::from_weights(&tree, rng.weights(n, 6)).unwrap();
        let delays = EdgeDelays::sample_exponential(&tree, 1.5, &mut rng).unwrap();
        let model = DiffusionModel::new(&tree, delays).unwrap();
        let estimator = Estimator::new(&model, &prior).unwrap();
        let eval = ObjectiveEvaluator::new(&model, &prior).unwrap();

        for _ in 0..6 {
            let k = rng.index(n + 1);
            let nodes: Vec<usize> = (0..k).map(|_| rng.index(n)).collect();
            let sensors = SensorSet::new(&tree, nodes).unwrap();

            let mut missed = 0.0;
            let mut distance = 0.0;
            for s in tree.nodes() {
                let obs = model.observe(s, &sensors).unwrap();
                if estimator.map_estimate(&obs).unwrap() != s {
                    missed += prior.probability(s);
                }
                let posterior = estimator.posterior(&obs).unwrap();
                distance += prior.probability(s) * posterior.expected_distance_to(&tree, s);
            }

            let error = eval.evaluate(&sensors, Criterion::ProbabilityOfError).unwrap();
            let expected = eval.evaluate(&sensors, Criterion::ExpectedDistance).unwrap();
            assert_relative_eq!(error, missed, epsilon = 1e-12, max_relative = 1e-9);
            assert_relative_eq!(expected, distance, epsilon = 1e-12, max_relative = 1e-9);
        }
    }
}
