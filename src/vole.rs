use ark_std::{end_timer, start_timer};

use crate::field::Gf256;
use crate::random_oracle::prg;
use crate::veccom::{
    leaf_commit, reconstruct_leaves, repetition_commit, AllButOneOpening, Seed, SeedTree,
};
use crate::{ELL_HAT, ELL_HAT_BYTES, IV_SIZE};

fn xor_into(dst: &mut [u8], src: &[u8]) {
    dst.iter_mut().zip(src.iter()).for_each(|(d, s)| *d ^= s);
}

/// Prover side of one repetition: every leaf seed expands to a column `r_j`,
/// `u = sum_j r_j` and `v_b` sums the `r_j` with bit `b` of `j` set.
pub(crate) struct RepetitionVole {
    pub(crate) u: Vec<u8>,
    pub(crate) v: Vec<Vec<u8>>,
    pub(crate) tree: SeedTree,
    pub(crate) coms: Vec<Seed>,
    /// h_i
    pub(crate) h: Seed,
}

impl RepetitionVole {
    pub(crate) fn commit(seed: &Seed, iv: &[u8; IV_SIZE], rep: usize, k: usize) -> Self {
        let tree = SeedTree::generate(seed, iv, rep, k);
        let mut u = vec![0u8; ELL_HAT_BYTES];
        let mut v = vec![vec![0u8; ELL_HAT_BYTES]; k];
        let mut coms = Vec::with_capacity(tree.num_leaves());

        for (j, leaf) in tree.leaves().iter().enumerate() {
            let (sd, com) = leaf_commit(leaf, iv, rep, j);
            coms.push(com);
            let r = prg(&sd, ELL_HAT_BYTES);
            xor_into(&mut u, &r);
            for (b, column) in v.iter_mut().enumerate() {
                if (j >> b) & 1 == 1 {
                    xor_into(column, &r);
                }
            }
        }

        let h = repetition_commit(&coms);
        Self {
            u,
            v,
            tree,
            coms,
            h,
        }
    }

    /// Open every leaf except `delta`.
    pub(crate) fn open(&self, delta: usize) -> AllButOneOpening {
        self.tree.open(delta, self.coms[delta])
    }
}

/// Verifier side of one repetition: the `k` columns `q_b` and `h_i`, or `None`
/// if the opening is malformed.
///
/// `correction` is `c_i` for every repetition but the first.
pub(crate) fn reconstruct_repetition(
    opening: &AllButOneOpening,
    delta: usize,
    correction: Option<&[u8]>,
    iv: &[u8; IV_SIZE],
    rep: usize,
    k: usize,
) -> Option<(Vec<Vec<u8>>, Seed)> {
    let leaves = reconstruct_leaves(opening, delta, iv, rep, k)?;
    let mut q = vec![vec![0u8; ELL_HAT_BYTES]; k];
    let mut coms = Vec::with_capacity(leaves.len());

    for (j, leaf) in leaves.iter().enumerate() {
        match leaf {
            Some(leaf) => {
                let (sd, com) = leaf_commit(leaf, iv, rep, j);
                coms.push(com);
                let r = prg(&sd, ELL_HAT_BYTES);
                for (b, column) in q.iter_mut().enumerate() {
                    if ((j ^ delta) >> b) & 1 == 1 {
                        xor_into(column, &r);
                    }
                }
            }
            None => coms.push(opening.hidden_com),
        }
    }

    if let Some(c) = correction {
        if c.len() != ELL_HAT_BYTES {
            return None;
        }
        for (b, column) in q.iter_mut().enumerate() {
            if (delta >> b) & 1 == 1 {
                xor_into(column, c);
            }
        }
    }

    Some((q, repetition_commit(&coms)))
}

/// c_i = u^(0) + u^(i)
pub(crate) fn correction(u0: &[u8], ui: &[u8]) -> Vec<u8> {
    u0.iter().zip(ui.iter()).map(|(a, b)| a ^ b).collect()
}

/// Turn `LAMBDA` columns of `ELL_HAT` bits into `ELL_HAT` field elements; bit
/// `c` of row `r` is bit `r` of column `c`.
pub(crate) fn transpose(columns: &[&[u8]]) -> Vec<Gf256> {
    let timer = start_timer!(|| format!("transpose {} vole columns", columns.len()));
    let res = (0..ELL_HAT)
        .map(|row| {
            Gf256::from_bits(
                columns
                    .iter()
                    .map(|c| ((c[row >> 3] >> (row & 7)) & 1) as u64),
            )
        })
        .collect();
    end_timer!(timer);
    res
}
