use crate::random_oracle::{Domain, RandomOracle};
use crate::tree::{left_child, parent, sibling};
use crate::{IV_SIZE, LAMBDA_BYTES};

pub type Seed = [u8; LAMBDA_BYTES];

/// Expand a node into its two children.
fn expand(node: &Seed, iv: &[u8; IV_SIZE], rep: usize, index: usize) -> (Seed, Seed) {
    let child = |side: u8| {
        let mut ro = RandomOracle::new(Domain::TreeExpand);
        ro.update(iv)
            .update_u32(rep as u32)
            .update_u32(index as u32)
            .update([side])
            .update(node);
        ro.finalize()
    };
    (child(0), child(1))
}

/// Seed and commitment of a leaf.
pub(crate) fn leaf_commit(leaf: &Seed, iv: &[u8; IV_SIZE], rep: usize, j: usize) -> (Seed, Seed) {
    let hash = |domain| {
        let mut ro = RandomOracle::new(domain);
        ro.update(iv)
            .update_u32(rep as u32)
            .update_u32(j as u32)
            .update(leaf);
        ro.finalize()
    };
    (hash(Domain::LeafSeed), hash(Domain::LeafCommit))
}

/// h_i: the commitment of one repetition to all its leaf commitments.
pub(crate) fn repetition_commit(coms: &[Seed]) -> Seed {
    let mut ro = RandomOracle::new(Domain::RepetitionCommit);
    coms.iter().for_each(|c| {
        ro.update(c);
    });
    ro.finalize()
}

#[derive(Debug, Clone)]
pub(crate) struct SeedTree {
    pub(crate) k: usize,
    pub(crate) nodes: Vec<Seed>,
}

/// Opening of every leaf of a seed tree except one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllButOneOpening {
    /// siblings of the hidden path, from the leaf level up
    pub(crate) co_path: Vec<Seed>,
    /// commitment of the hidden leaf
    pub(crate) hidden_com: Seed,
}

impl SeedTree {
    pub(crate) fn generate(root: &Seed, iv: &[u8; IV_SIZE], rep: usize, k: usize) -> Self {
        let num_leaves = 1usize << k;
        let mut nodes = vec![[0u8; LAMBDA_BYTES]; 2 * num_leaves - 1];
        nodes[0] = *root;
        for i in 0..num_leaves - 1 {
            let (l, r) = expand(&nodes[i], iv, rep, i);
            let left = left_child(i);
            nodes[left] = l;
            nodes[left + 1] = r;
        }
        Self { k, nodes }
    }

    pub(crate) fn num_leaves(&self) -> usize {
        1 << self.k
    }

    pub(crate) fn leaves(&self) -> &[Seed] {
        &self.nodes[self.num_leaves() - 1..]
    }

    /// Reveal everything needed to recompute all leaves except `hidden`.
    pub(crate) fn open(&self, hidden: usize, hidden_com: Seed) -> AllButOneOpening {
        let mut co_path = Vec::with_capacity(self.k);
        let mut pos = self.num_leaves() - 1 + hidden;
        while pos > 0 {
            co_path.push(self.nodes[sibling(pos)]);
            pos = parent(pos);
        }
        AllButOneOpening {
            co_path,
            hidden_com,
        }
    }
}

/// Recompute every leaf except `hidden` from an opening. Returns `None` if the
/// opening has the wrong shape.
pub(crate) fn reconstruct_leaves(
    opening: &AllButOneOpening,
    hidden: usize,
    iv: &[u8; IV_SIZE],
    rep: usize,
    k: usize,
) -> Option<Vec<Option<Seed>>> {
    let num_leaves = 1usize << k;
    if opening.co_path.len() != k || hidden >= num_leaves {
        return None;
    }

    let mut nodes: Vec<Option<Seed>> = vec![None; 2 * num_leaves - 1];
    let mut pos = num_leaves - 1 + hidden;
    for node in opening.co_path.iter() {
        nodes[sibling(pos)] = Some(*node);
        pos = parent(pos);
    }
    // parents precede their children in the flat layout
    for i in 0..num_leaves - 1 {
        if let Some(node) = nodes[i] {
            let (l, r) = expand(&node, iv, rep, i);
            let left = left_child(i);
            nodes[left] = Some(l);
            nodes[left + 1] = Some(r);
        }
    }
    Some(nodes.split_off(num_leaves - 1))
}
