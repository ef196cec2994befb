use crate::{read_prior, read_tree, write_json, PlacementReport, PriorSpec, RunManifest};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};

use sensorplace_core::{
    budget_from_signed, Criterion, DiffusionModel, EdgeDelay, ObjectiveEvaluator, Tree, UnitDelay,
    F,
};
use sensorplace_models::{ConstantDelay, EdgeDelays, TreeKind, TreeRng};
use sensorplace_optim::{place, Method, Placement, PlacementConfig};

#[derive(Parser)]
#[command(name = "sensorplace")]
#[command(about = "Budgeted sensor placement for diffusion source localization on trees")]
#[command(long_about = "Places k sensors on a tree so that the source of a diffusion can be \
recovered with the smallest error probability or expected hop distance")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the best placement for one budget
    Place {
        /// Tree file (JSON: {"nodes": n, "edges": [[u, v], ...]})
        #[arg(long)]
        tree: PathBuf,

        /// Number of sensors
        #[arg(long, allow_hyphen_values = true)]
        budget: i64,

        /// Accuracy criterion
        #[arg(long, value_enum, default_value = "probability-of-error")]
        criterion: CriterionType,

        /// Prior weights file (JSON: {"weights": [...]}); uniform if omitted
        #[arg(long)]
        prior: Option<PathBuf>,

        /// Search method
        #[arg(long, value_enum, default_value = "dp")]
        method: MethodType,

        /// Edge delay model used to check the placement
        #[arg(long, value_enum, default_value = "unit")]
        delay: DelayType,

        /// Constant delay, or rate of the exponential delays
        #[arg(long)]
        delay_param: Option<F>,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Root of the tree DP
        #[arg(long)]
        root: Option<usize>,

        /// Evaluate exhaustive candidates in parallel
        #[arg(long)]
        parallel: bool,

        /// Output report file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write a random tree
    Generate {
        /// Number of nodes
        #[arg(long)]
        nodes: usize,

        /// Tree family
        #[arg(long, value_enum, default_value = "prufer")]
        kind: KindType,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output tree file
        #[arg(long)]
        out: PathBuf,

        /// Also write random prior weights in 1..=max-weight to this file
        #[arg(long)]
        prior_out: Option<PathBuf>,

        /// Largest random prior weight
        #[arg(long, default_value = "4")]
        max_weight: u64,
    },

    /// Optimal value for every budget from 0 to n
    Sweep {
        /// Tree file
        #[arg(long)]
        tree: PathBuf,

        /// Accuracy criterion
        #[arg(long, value_enum, default_value = "probability-of-error")]
        criterion: CriterionType,

        /// Prior weights file; uniform if omitted
        #[arg(long)]
        prior: Option<PathBuf>,

        /// Output file with every placement
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CriterionType {
    #[value(name = "probability-of-error")]
    ProbabilityOfError,
    #[value(name = "expected-distance")]
    ExpectedDistance,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MethodType {
    #[value(name = "dp")]
    Dp,
    #[value(name = "exhaustive")]
    Exhaustive,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DelayType {
    #[value(name = "unit")]
    Unit,
    #[value(name = "constant")]
    Constant,
    #[value(name = "exponential")]
    Exponential,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindType {
    #[value(name = "recursive")]
    Recursive,
    #[value(name = "preferential")]
    Preferential,
    #[value(name = "prufer")]
    Prufer,
}

impl From<CriterionType> for Criterion {
    fn from(criterion: CriterionType) -> Self {
        match criterion {
            CriterionType::ProbabilityOfError => Criterion::ProbabilityOfError,
            CriterionType::ExpectedDistance => Criterion::ExpectedDistance,
        }
    }
}

impl From<MethodType> for Method {
    fn from(method: MethodType) -> Self {
        match method {
            MethodType::Dp => Method::Dp,
            MethodType::Exhaustive => Method::Exhaustive,
        }
    }
}

impl From<KindType> for TreeKind {
    fn from(kind: KindType) -> Self {
        match kind {
            KindType::Recursive => TreeKind::Recursive,
            KindType::Preferential => TreeKind::Preferential,
            KindType::Prufer => TreeKind::Prufer,
        }
    }
}

impl DelayType {
    fn name(&self) -> &'static str {
        match self {
            DelayType::Unit => "unit",
            DelayType::Constant => "constant",
            DelayType::Exponential => "exponential",
        }
    }

    /// Build the delay model; sampled delays are drawn once from `seed`.
    pub fn build(
        &self,
        tree: &Tree,
        param: Option<F>,
        seed: u64,
    ) -> anyhow::Result<Box<dyn EdgeDelay>> {
        Ok(match self {
            DelayType::Unit => Box::new(UnitDelay),
            DelayType::Constant => Box::new(ConstantDelay(param.unwrap_or(1.0))),
            DelayType::Exponential => {
                let mut rng = TreeRng::new(seed);
                Box::new(EdgeDelays::sample_exponential(tree, param.unwrap_or(1.0), &mut rng)?)
            }
        })
    }
}

pub struct PlaceArgs {
    pub tree: PathBuf,
    pub budget: i64,
    pub criterion: CriterionType,
    pub prior: Option<PathBuf>,
    pub method: MethodType,
    pub delay: DelayType,
    pub delay_param: Option<F>,
    pub seed: u64,
    pub root: Option<usize>,
    pub parallel: bool,
    pub out: Option<PathBuf>,
}

pub fn run_place_command(args: PlaceArgs) -> anyhow::Result<PlacementReport> {
    let tree = read_tree(&args.tree)?;
    let prior = read_prior(args.prior.as_deref(), &tree)?;
    let n = tree.num_nodes();
    let k = budget_from_signed(args.budget, n)?;
    let criterion = Criterion::from(args.criterion);
    let method = Method::from(args.method);

    println!("Sensor Placement");
    println!("================");
    println!("Tree: {:?} ({} nodes)", args.tree, n);
    println!("Budget: {}", k);
    println!("Criterion: {}", criterion);
    println!("Method: {:?}", method);
    println!("Delay: {}", args.delay.name());
    println!(
        "Prior: {} (total weight {})",
        if prior.is_uniform() { "uniform" } else { "weighted" },
        prior.total()
    );

    // delays are validated up front even though the optimum does not depend on them
    let delays = args.delay.build(&tree, args.delay_param, args.seed)?;
    let model = DiffusionModel::new(&tree, delays)?;

    let mut config = PlacementConfig::default().with_parallel(args.parallel);
    if let Some(root) = args.root {
        config = config.with_root(root);
    }
    let placement = place(method, &tree, &prior, k, criterion, &config)?;

    let evaluator = ObjectiveEvaluator::new(&model, &prior)?;
    let simulated = evaluator.evaluate(&placement.sensors, criterion)?;
    debug!(reported = placement.value, simulated, "placement re-evaluated under the delay model");
    if (simulated - placement.value).abs() > 1e-9 * placement.value.abs().max(1.0) {
        anyhow::bail!(
            "placement value {} disagrees with simulation {}",
            placement.value,
            simulated
        );
    }

    let manifest = RunManifest::new(
        args.seed,
        method,
        criterion,
        k,
        n,
        args.delay.name(),
        args.delay_param,
        args.root,
    );
    let report = PlacementReport { placement, manifest };

    println!();
    println!("Sensors: {:?}", &report.placement.sensors[..]);
    println!("Objective: {:.6}", report.placement.value);

    if let Some(out) = &args.out {
        write_json(out, &report)?;
        info!(path = %out.display(), run_id = %report.manifest.run_id, "wrote placement report");
        println!("Wrote report to {}", out.display());
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(report)
}

pub fn run_generate_command(
    nodes: usize,
    kind: KindType,
    seed: u64,
    out: PathBuf,
    prior_out: Option<PathBuf>,
    max_weight: u64,
) -> anyhow::Result<Tree> {
    let mut rng = TreeRng::new(seed);
    let tree = TreeKind::from(kind)
        .generate(nodes, &mut rng)
        .with_context(|| format!("generating a {:?} tree with {} nodes", kind, nodes))?;
    write_json(&out, &tree.to_spec())?;
    println!("Wrote {} nodes to {}", tree.num_nodes(), out.display());

    if let Some(prior_out) = prior_out {
        let spec = PriorSpec {
            weights: rng.weights(nodes, max_weight),
        };
        write_json(&prior_out, &spec)?;
        println!("Wrote prior weights to {}", prior_out.display());
    }
    Ok(tree)
}

pub fn run_sweep_command(
    tree_path: PathBuf,
    criterion: CriterionType,
    prior: Option<PathBuf>,
    out: Option<PathBuf>,
) -> anyhow::Result<Vec<Placement>> {
    let tree = read_tree(&tree_path)?;
    let prior = read_prior(prior.as_deref(), &tree)?;
    let criterion = Criterion::from(criterion);
    let config = PlacementConfig::default();

    println!("{:>4}  {:>12}  sensors", "k", criterion.name());
    let mut placements = Vec::with_capacity(tree.num_nodes() + 1);
    for k in 0..=tree.num_nodes() {
        let placement = place(Method::Dp, &tree, &prior, k, criterion, &config)?;
        println!("{:>4}  {:>12.6}  {:?}", k, placement.value, &placement.sensors[..]);
        placements.push(placement);
    }

    if let Some(out) = out {
        write_json(&out, &placements)?;
        println!("Wrote sweep to {}", out.display());
    }
    Ok(placements)
}
