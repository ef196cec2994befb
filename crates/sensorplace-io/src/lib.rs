use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use sensorplace_core::{Criterion, Prior, Tree, TreeSpec, F};
use sensorplace_optim::{Method, Placement};

pub mod cli;
pub use cli::*;

/// Run manifest for complete reproducibility
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub timestamp: String,
    pub seed: u64,
    pub method: Method,
    pub criterion: Criterion,
    pub budget: usize,
    pub n_nodes: usize,
    pub delay: String,        // "unit" | "constant" | "exponential"
    pub delay_param: Option<F>,
    pub root: Option<usize>,
    pub commit_hash: Option<String>,
    pub rust_version: String,
}

impl RunManifest {
    pub fn new(
        seed: u64,
        method: Method,
        criterion: Criterion,
        budget: usize,
        n_nodes: usize,
        delay: &str,
        delay_param: Option<F>,
        root: Option<usize>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            seed,
            method,
            criterion,
            budget,
            n_nodes,
            delay: delay.to_string(),
            delay_param,
            root,
            commit_hash: get_git_commit(),
            rust_version: get_rust_version(),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        write_json(path, self)
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        read_json(path)
    }
}

/// What `place` writes: the placement and how it was obtained.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacementReport {
    pub placement: Placement,
    pub manifest: RunManifest,
}

/// Prior weights on disk
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriorSpec {
    pub weights: Vec<u64>,
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn read_tree(path: &Path) -> anyhow::Result<Tree> {
    let spec: TreeSpec = read_json(path)?;
    Tree::try_from(spec).with_context(|| format!("building tree from {}", path.display()))
}

/// Uniform prior when no file is given.
pub fn read_prior(path: Option<&Path>, tree: &Tree) -> anyhow::Result<Prior> {
    let weights = match path {
        Some(p) => Some(read_json::<PriorSpec>(p)?.weights),
        None => None,
    };
    Ok(Prior::or_uniform(tree, weights)?)
}

/// Get git commit hash for reproducibility
fn get_git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn get_rust_version() -> String {
    std::process::Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
