//! Expected-distance placement.
//!
//! Joining branches `i` at a relay gives a class of mass `M` whose pair sum is
//! `sum_i (pairs_i - 2 reach_i mass_i + 2 reach_i M)`. For a fixed `M` every
//! branch contributes independently, so the relay is solved by one knapsack
//! per reachable class mass, with the mass as a second dimension. Only masses
//! that some subset of branches actually reaches are visited, and knapsack
//! states are kept sparse.

use std::collections::{BTreeMap, BTreeSet};

use sensorplace_core::F;

use crate::dp::{NodeView, RelayRule};
use crate::stats::Branch;
use crate::table::{offer, Cell};

pub struct DistanceRule;

impl DistanceRule {
    /// Largest prior total the relay knapsack indexes by class mass.
    pub const MAX_TOTAL_WEIGHT: u64 = 1 << 20;
}

impl RelayRule for DistanceRule {
    type Cost = F;

    fn isolated(&self, branch: &Branch) -> F {
        if branch.mass == 0 {
            return 0.0;
        }
        branch.pairs as F / branch.mass as F
    }

    fn relay(&self, view: &NodeView<F>) -> Vec<Option<Cell<F>>> {
        let k = view.budget;
        let mut out = vec![None; k + 1];
        // a relay needs a sensor below it
        if view.children.iter().all(|c| c.sensored.is_empty()) {
            return out;
        }

        let reachable = subset_masses(view.weight, view.children.iter().map(|c| c.branch.mass as u64));
        let outside_mass = view.outside.mass as u64;
        let class_masses: BTreeSet<u64> = reachable
            .iter()
            .flat_map(|&m| [m, m + outside_mass])
            .collect();

        for class_mass in class_masses {
            let open_target = reachable.contains(&class_mass).then_some(class_mass);
            let closed_target = class_mass
                .checked_sub(outside_mass)
                .filter(|m| reachable.contains(m));
            let Some(cap) = open_target.max(closed_target) else { continue };

            let table = class_knapsack(view, class_mass, cap);

            if let Some(m) = open_target {
                for (b, slot) in out.iter_mut().enumerate().take(k).skip(1) {
                    if let Some(cell) = table.get(b, m) {
                        offer(slot, cell.clone(), view.tie_epsilon);
                    }
                }
            }
            if let Some(m) = closed_target {
                if let Some(cell) = table.get(k, m) {
                    let cell = if view.outside.is_empty() {
                        cell.clone()
                    } else {
                        cell.plus(term(&view.outside, class_mass))
                    };
                    offer(&mut out[k], cell, view.tie_epsilon);
                }
            }
        }
        out
    }
}

/// Share of a branch in the cost of a class of mass `class_mass`.
fn term(branch: &Branch, class_mass: u64) -> F {
    branch.pair_term(class_mass as i128) as F / class_mass as F
}

/// Inner masses `own + sum(subset of branch masses)` that can be formed.
fn subset_masses(own: u64, masses: impl Iterator<Item = u64>) -> BTreeSet<u64> {
    let mut reachable = BTreeSet::from([own]);
    for mass in masses {
        let shifted: Vec<u64> = reachable.iter().map(|m| m + mass).collect();
        reachable.extend(shifted);
    }
    reachable
}

/// Knapsack over the children with the class mass fixed at `class_mass`,
/// keyed by sensors used and inner class mass (relay plus free branches).
fn class_knapsack(view: &NodeView<F>, class_mass: u64, cap: u64) -> MassKnapsack {
    let eps = view.tie_epsilon;
    let mut table = MassKnapsack::seeded(view.budget, cap, view.weight);
    for child in &view.children {
        let mass = child.branch.mass as u64;
        let mut choices: Vec<(usize, u64, Cell<F>)> = child
            .sensored
            .iter()
            .map(|(b, cell)| (*b, 0, cell.clone()))
            .collect();
        if mass <= cap {
            choices.push((0, mass, Cell::new(term(&child.branch, class_mass))));
        }
        table = table.absorb(&choices, eps);
    }
    table
}

/// Sparse knapsack keyed by sensors used and accumulated class mass.
struct MassKnapsack {
    budget_cap: usize,
    mass_cap: u64,
    states: BTreeMap<(usize, u64), Option<Cell<F>>>,
}

impl MassKnapsack {
    fn seeded(budget_cap: usize, mass_cap: u64, mass: u64) -> Self {
        let mut states = BTreeMap::new();
        if mass <= mass_cap {
            states.insert((0, mass), Some(Cell::new(0.0)));
        }
        Self { budget_cap, mass_cap, states }
    }

    fn get(&self, used: usize, mass: u64) -> Option<&Cell<F>> {
        self.states.get(&(used, mass)).and_then(Option::as_ref)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.states.len()
    }

    fn absorb(&self, choices: &[(usize, u64, Cell<F>)], eps: F) -> Self {
        let mut states = BTreeMap::new();
        for (&(used, mass), cell) in &self.states {
            let Some(cell) = cell else { continue };
            for (b, m, choice) in choices {
                let (u, t) = (used + b, mass + m);
                if u > self.budget_cap || t > self.mass_cap {
                    continue;
                }
                offer(states.entry((u, t)).or_insert(None), cell.join(choice), eps);
            }
        }
        Self {
            budget_cap: self.budget_cap,
            mass_cap: self.mass_cap,
            states,
        }
    }
}
