//! Probability-of-error placement.
//!
//! A relay class costs `mass - heaviest`. The heaviest member is picked by a
//! two-layer knapsack: `pending` has not chosen the member that the MAP
//! estimate returns yet, `chosen` has (the relay itself or the heaviest node
//! of one sensor-free branch).

use crate::dp::{NodeView, RelayRule};
use crate::stats::Branch;
use crate::table::{offer, Cell, Knapsack};

pub struct ErrorRule;

impl RelayRule for ErrorRule {
    type Cost = u64;

    fn isolated(&self, branch: &Branch) -> u64 {
        branch.mass as u64 - branch.heaviest
    }

    fn relay(&self, view: &NodeView<u64>) -> Vec<Option<Cell<u64>>> {
        let k = view.budget;
        let eps = view.tie_epsilon;
        let mut pending = Knapsack::seeded(k, Cell::new(view.weight));
        let mut chosen = Knapsack::seeded(k, Cell::new(0));

        for child in &view.children {
            let mass = child.branch.mass as u64;
            let mut keep = vec![(0, Cell::new(mass))];
            keep.extend(child.sensored.iter().cloned());
            let lead = [(0, Cell::new(mass - child.branch.heaviest))];

            let mut next = chosen.absorb(&keep, eps);
            next.merge(pending.absorb(&lead, eps), eps);
            chosen = next;
            pending = pending.absorb(&keep, eps);
        }

        let mut out = vec![None; k + 1];
        for (b, slot) in out.iter_mut().enumerate().take(k).skip(1) {
            *slot = chosen.get(b).cloned();
        }

        // the sensor-free outside joins the class
        let outside = &view.outside;
        let outside_mass = outside.mass as u64;
        let mut closed = chosen.get(k).map(|c| c.plus(outside_mass));
        if !outside.is_empty() {
            if let Some(cell) = pending.get(k) {
                offer(&mut closed, cell.plus(outside_mass - outside.heaviest), eps);
            }
        }
        out[k] = closed;
        out
    }
}
