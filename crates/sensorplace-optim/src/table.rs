//! DP cells and budget-indexed knapsack rows shared by both optimizers.

use std::cmp::Ordering;
use std::ops::Add;

use sensorplace_core::{NodeId, F};

/// Cost carried by a DP cell.
pub trait Cost: Copy + Add<Output = Self> + std::fmt::Debug {
    const ZERO: Self;

    fn compare(&self, other: &Self, tie_epsilon: F) -> Ordering;
}

impl Cost for u64 {
    const ZERO: Self = 0;

    fn compare(&self, other: &Self, _tie_epsilon: F) -> Ordering {
        self.cmp(other)
    }
}

impl Cost for F {
    const ZERO: Self = 0.0;

    fn compare(&self, other: &Self, tie_epsilon: F) -> Ordering {
        let scale = self.abs().max(other.abs()).max(1.0);
        if (self - other).abs() <= tie_epsilon * scale {
            Ordering::Equal
        } else {
            self.total_cmp(other)
        }
    }
}

/// Best partial placement found for one DP state.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell<C> {
    pub cost: C,
    pub sensors: Vec<NodeId>, // ascending
}

impl<C: Cost> Cell<C> {
    pub fn new(cost: C) -> Self {
        Self { cost, sensors: Vec::new() }
    }

    pub fn with_sensor(mut self, v: NodeId) -> Self {
        let pos = self.sensors.partition_point(|&u| u < v);
        self.sensors.insert(pos, v);
        self
    }

    pub fn plus(&self, cost: C) -> Self {
        Self {
            cost: self.cost + cost,
            sensors: self.sensors.clone(),
        }
    }

    /// Cells from disjoint subtrees combined.
    pub fn join(&self, other: &Cell<C>) -> Self {
        Self {
            cost: self.cost + other.cost,
            sensors: merge_sorted(&self.sensors, &other.sensors),
        }
    }

    /// Lower cost, then lexicographically smaller sensor sequence.
    pub fn better_than(&self, other: &Cell<C>, tie_epsilon: F) -> bool {
        match self.cost.compare(&other.cost, tie_epsilon) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.sensors < other.sensors,
        }
    }
}

/// Keep `candidate` in `slot` if the slot is empty or it is better.
pub fn offer<C: Cost>(slot: &mut Option<Cell<C>>, candidate: Cell<C>, tie_epsilon: F) {
    match slot {
        Some(current) if !candidate.better_than(current, tie_epsilon) => {}
        _ => *slot = Some(candidate),
    }
}

pub fn merge_sorted(a: &[NodeId], b: &[NodeId]) -> Vec<NodeId> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// One way to fill a child's part of a knapsack: `budget` sensors at `cell`.
pub type Choice<C> = (usize, Cell<C>);

/// Min-plus knapsack indexed by sensors used, capped at `cap`.
#[derive(Clone, Debug)]
pub struct Knapsack<C> {
    slots: Vec<Option<Cell<C>>>,
}

impl<C: Cost> Knapsack<C> {
    pub fn empty(cap: usize) -> Self {
        Self { slots: vec![None; cap + 1] }
    }

    pub fn seeded(cap: usize, cell: Cell<C>) -> Self {
        let mut knapsack = Self::empty(cap);
        knapsack.slots[0] = Some(cell);
        knapsack
    }

    pub fn cap(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn get(&self, used: usize) -> Option<&Cell<C>> {
        self.slots.get(used).and_then(|s| s.as_ref())
    }

    /// Extend every partial solution with exactly one of `choices`.
    pub fn absorb(&self, choices: &[Choice<C>], tie_epsilon: F) -> Self {
        let mut next = Self::empty(self.cap());
        for (used, slot) in self.slots.iter().enumerate() {
            let Some(cell) = slot else { continue };
            for (budget, choice) in choices {
                let total = used + budget;
                if total > self.cap() {
                    continue;
                }
                offer(&mut next.slots[total], cell.join(choice), tie_epsilon);
            }
        }
        next
    }

    /// Slot-wise best of `self` and `other`.
    pub fn merge(&mut self, other: Knapsack<C>, tie_epsilon: F) {
        for (slot, cell) in self.slots.iter_mut().zip(other.slots) {
            if let Some(cell) = cell {
                offer(slot, cell, tie_epsilon);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sorted() {
        assert_eq!(merge_sorted(&[1, 4, 9], &[0, 5]), vec![0, 1, 4, 5, 9]);
        assert_eq!(merge_sorted(&[], &[2]), vec![2]);
    }

    #[test]
    fn test_tie_breaks_on_sensor_ids() {
        let a = Cell { cost: 3u64, sensors: vec![1, 5] };
        let b = Cell { cost: 3u64, sensors: vec![2, 3] };
        assert!(a.better_than(&b, 0.0));
        assert!(!b.better_than(&a, 0.0));
        let c = Cell { cost: 2u64, sensors: vec![7, 8] };
        assert!(c.better_than(&a, 0.0));
    }

    #[test]
    fn test_float_tolerance() {
        let a = Cell { cost: 1.0 + 1e-12, sensors: vec![0] };
        let b = Cell { cost: 1.0, sensors: vec![1] };
        assert!(a.better_than(&b, 1e-9));
        assert!(b.better_than(&a, 0.0));
    }

    #[test]
    fn test_knapsack_absorb() {
        let start = Knapsack::seeded(3, Cell::new(0u64));
        let child_a = vec![(0, Cell::new(5)), (1, Cell::new(1).with_sensor(2))];
        let child_b = vec![(0, Cell::new(4)), (2, Cell::new(0).with_sensor(3).with_sensor(4))];
        let k = start.absorb(&child_a, 0.0).absorb(&child_b, 0.0);
        assert_eq!(k.get(0).unwrap().cost, 9);
        assert_eq!(k.get(1).unwrap().sensors, vec![2]);
        assert_eq!(k.get(2).unwrap().cost, 5);
        assert_eq!(k.get(3).unwrap().sensors, vec![2, 3, 4]);
        assert_eq!(k.get(3).unwrap().cost, 1);
    }
}
