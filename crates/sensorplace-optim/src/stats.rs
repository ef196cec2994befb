//! Weighted subtree statistics for closed-form class costs.

use sensorplace_core::{NodeId, Prior, RootedTree};

/// Summary of a set of nodes hanging off an anchor node.
///
/// `mass` is the prior weight of the set, `reach` the weighted hop distance
/// from the anchor to every node of the set and `pairs` the weighted hop
/// distance over all ordered pairs inside the set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Branch {
    pub mass: i128,
    pub reach: i128,
    pub pairs: i128,
    pub heaviest: u64, // largest single weight, 0 for an empty set
}

impl Branch {
    /// Same set seen from one hop further away.
    pub fn lifted(&self) -> Branch {
        Branch {
            reach: self.reach + self.mass,
            ..*self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mass == 0
    }

    /// Contribution to the pair sum of a class of total mass `class_mass`
    /// formed by joining branches at a common anchor.
    pub fn pair_term(&self, class_mass: i128) -> i128 {
        self.pairs - 2 * self.reach * self.mass + 2 * self.reach * class_mass
    }
}

/// Branch statistics of every subtree (`down[v]`, anchored at `v`) and of
/// every complement `V \ T_v` (`up[v]`, anchored at `v` through its parent).
pub struct BranchStats {
    pub down: Vec<Branch>,
    pub up: Vec<Branch>,
}

impl BranchStats {
    pub fn new(rooted: &RootedTree, prior: &Prior) -> Self {
        let n = rooted.num_nodes();
        let total = prior.total() as i128;
        let mut down = vec![Branch::default(); n];

        for v in rooted.post_order() {
            let w = prior.weight(v);
            let mut mass = w as i128;
            let mut reach = 0;
            let mut heaviest = w;
            for &c in rooted.children(v) {
                let b = down[c].lifted();
                mass += b.mass;
                reach += b.reach;
                heaviest = heaviest.max(b.heaviest);
            }
            let pairs: i128 = rooted
                .children(v)
                .iter()
                .map(|&c| down[c].lifted().pair_term(mass))
                .sum();
            down[v] = Branch { mass, reach, pairs, heaviest };
        }

        let mut up = vec![Branch::default(); n];
        for &p in rooted.preorder() {
            let children = rooted.children(p);
            if children.is_empty() {
                continue;
            }
            // branches at p: the outside of T_p (already anchored at p), then each child subtree
            let outside = up[p];
            let lifted: Vec<Branch> = children.iter().map(|&c| down[c].lifted()).collect();
            let sum_reach: i128 = outside.reach + lifted.iter().map(|b| b.reach).sum::<i128>();
            let sum_base: i128 = base_term(&outside) + lifted.iter().map(base_term).sum::<i128>();
            let heaviest = heaviest_excluding(prior.weight(p).max(outside.heaviest), &lifted);

            for (i, &c) in children.iter().enumerate() {
                let mass = total - down[c].mass;
                let reach = sum_reach - lifted[i].reach;
                let pairs = sum_base - base_term(&lifted[i]) + 2 * reach * mass;
                up[c] = Branch {
                    mass,
                    reach: reach + mass,
                    pairs,
                    heaviest: heaviest[i],
                };
            }
        }

        Self { down, up }
    }

    pub fn down(&self, v: NodeId) -> &Branch {
        &self.down[v]
    }

    pub fn up(&self, v: NodeId) -> &Branch {
        &self.up[v]
    }
}

fn base_term(b: &Branch) -> i128 {
    b.pairs - 2 * b.reach * b.mass
}

/// For each branch, the largest weight among `anchor_max` and every other branch.
fn heaviest_excluding(anchor_max: u64, branches: &[Branch]) -> Vec<u64> {
    let len = branches.len();
    let mut suffix = vec![0u64; len + 1];
    for i in (0..len).rev() {
        suffix[i] = suffix[i + 1].max(branches[i].heaviest);
    }
    let mut prefix = anchor_max;
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        out.push(prefix.max(suffix[i + 1]));
        prefix = prefix.max(branches[i].heaviest);
    }
    out
}
