use sensorplace_core::{Criterion, Prior, Tree};
use sensorplace_optim::{optimize, PlacementConfig};

fn main() -> anyhow::Result<()> {
    // A small caterpillar: spine 0 - 1 - 2 - 3 with two legs on every spine node
    let mut edges = vec![(0, 1), (1, 2), (2, 3)];
    for spine in 0..4 {
        edges.push((spine, 4 + 2 * spine));
        edges.push((spine, 5 + 2 * spine));
    }
    let tree = Tree::from_edges(12, &edges)?;
    let prior = Prior::uniform(tree.num_nodes());
    let config = PlacementConfig::default();

    println!("Caterpillar with {} nodes, uniform prior", tree.num_nodes());
    println!();
    println!("{:>3}  {:>10}  {:>10}  sensors (error / distance)", "k", "P(error)", "E[dist]");

    for k in 0..=tree.num_nodes() {
        let err = optimize(&tree, &prior, k, Criterion::ProbabilityOfError, &config)?;
        let dist = optimize(&tree, &prior, k, Criterion::ExpectedDistance, &config)?;
        println!(
            "{:>3}  {:>10.4}  {:>10.4}  {:?} / {:?}",
            k,
            err.value,
            dist.value,
            &err.sensors[..],
            &dist.sensors[..]
        );
    }
    Ok(())
}
