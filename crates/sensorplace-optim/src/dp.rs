//! Post-order tree DP shared by both criteria.
//!
//! `row[v][b]` is the best cost of the classes owned by the subtree `T_v`
//! when `T_v` holds exactly `b` sensors. For `b < k` there are sensors
//! outside `T_v`, so `v` lies on the Steiner tree of the sensors and every
//! class owned by `T_v` stays inside it. For `b = k` the outside of `T_v` is
//! sensor-free and is owned by `T_v` as well.

use tracing::{debug, trace};

use sensorplace_core::{NodeId, PlacementError, Prior, Result, Tree, F};

use crate::stats::{Branch, BranchStats};
use crate::table::{offer, Cell, Choice, Cost, Knapsack};

/// A child of the node being filled.
pub struct ChildView<C> {
    pub branch: Branch,           // child subtree anchored at the parent
    pub sensored: Vec<Choice<C>>, // (b, cell) for 1 <= b < k
}

pub struct NodeView<C> {
    pub node: NodeId,
    pub weight: u64,
    pub budget: usize,
    pub children: Vec<ChildView<C>>,
    pub outside: Branch, // complement of the subtree anchored at the node
    pub tie_epsilon: F,
}

/// How a criterion prices the class of a relay node.
pub trait RelayRule {
    type Cost: Cost;

    /// Cost of a sensor-free branch that forms a class of its own.
    fn isolated(&self, branch: &Branch) -> Self::Cost;

    /// Best cells with the node as a relay, indexed by `b` in `0..=k`.
    fn relay(&self, view: &NodeView<Self::Cost>) -> Vec<Option<Cell<Self::Cost>>>;
}

pub fn solve<R: RelayRule>(
    tree: &Tree,
    prior: &Prior,
    k: usize,
    root: NodeId,
    tie_epsilon: F,
    rule: &R,
) -> Result<Cell<R::Cost>> {
    let n = tree.num_nodes();
    let rooted = tree.rooted_at(root);
    let stats = BranchStats::new(&rooted, prior);
    debug!(n, k, root, "tree DP started");

    let mut rows: Vec<Vec<Option<Cell<R::Cost>>>> = vec![Vec::new(); n];
    for v in rooted.post_order() {
        let children = rooted.children(v);
        let view = NodeView {
            node: v,
            weight: prior.weight(v),
            budget: k,
            children: children
                .iter()
                .map(|&c| ChildView {
                    branch: stats.down(c).lifted(),
                    sensored: (1..k)
                        .filter_map(|b| rows[c].get(b).cloned().flatten().map(|cell| (b, cell)))
                        .collect(),
                })
                .collect(),
            outside: *stats.up(v),
            tie_epsilon,
        };

        let mut row: Vec<Option<Cell<R::Cost>>> = vec![None; k + 1];

        // v is a sensor
        let mut knapsack = Knapsack::seeded(k - 1, Cell::new(R::Cost::ZERO));
        for child in &view.children {
            let mut choices = vec![(0, Cell::new(rule.isolated(&child.branch)))];
            choices.extend(child.sensored.iter().cloned());
            knapsack = knapsack.absorb(&choices, tie_epsilon);
        }
        for b in 1..=k {
            if let Some(cell) = knapsack.get(b - 1) {
                let mut cell = cell.clone().with_sensor(v);
                if b == k && !view.outside.is_empty() {
                    cell = cell.plus(rule.isolated(&view.outside));
                }
                offer(&mut row[b], cell, tie_epsilon);
            }
        }

        // v relays
        for (b, cell) in rule.relay(&view).into_iter().enumerate().skip(1) {
            if let Some(cell) = cell {
                offer(&mut row[b], cell, tie_epsilon);
            }
        }

        // every sensor sits in one child subtree
        for &c in children {
            if let Some(cell) = rows[c].get_mut(k).and_then(Option::take) {
                offer(&mut row[k], cell, tie_epsilon);
            }
            rows[c] = Vec::new();
        }

        trace!(
            node = v,
            filled = row.iter().filter(|c| c.is_some()).count(),
            "row filled"
        );
        rows[v] = row;
    }

    rows[root]
        .get_mut(k)
        .and_then(Option::take)
        .ok_or_else(|| PlacementError::invalid_budget(k, n))
}
