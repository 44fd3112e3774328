use ark_std::{end_timer, start_timer};

use crate::commit::{CommitmentEngine, S_0, S_1};
use crate::{RainRingError, Result, KEY_NUM, TREE_NODE_BYTE_SIZE, TREE_NODE_NUM};

pub type TreeNode = [u8; TREE_NODE_BYTE_SIZE];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingTree {
    pub(crate) nodes: Vec<TreeNode>,
}

#[inline]
pub(crate) fn left_child(i: usize) -> usize {
    2 * i + 1
}

#[inline]
pub(crate) fn parent(i: usize) -> usize {
    (i - 1) >> 1
}

/// Sibling of a non-root node, computed without branching.
#[inline]
pub(crate) fn sibling(i: usize) -> usize {
    ((i - 1) ^ 1) + 1
}

/// Salt of the commitment that produces node `i`.
pub(crate) fn salt_of(i: usize) -> &'static TreeNode {
    if left_child(i) >= KEY_NUM - 1 {
        &S_0
    } else {
        &S_1
    }
}

/// Salt of the commitment at `level` steps above the leaves.
pub(crate) fn level_salt(level: usize) -> &'static TreeNode {
    if level == 0 {
        &S_0
    } else {
        &S_1
    }
}

impl RingTree {
    /// Build the tree from the public keys (treegen).
    pub fn generate(leaves: &[TreeNode], engine: &CommitmentEngine) -> Result<Self> {
        if leaves.len() != KEY_NUM {
            return Err(RainRingError::Configuration(format!(
                "ring tree needs {} leaves, got {}",
                KEY_NUM,
                leaves.len()
            )));
        }
        let timer = start_timer!(|| "ring tree generation");

        let mut nodes = vec![[0u8; TREE_NODE_BYTE_SIZE]; TREE_NODE_NUM];
        nodes[KEY_NUM - 1..].clone_from_slice(leaves);
        for i in (0..KEY_NUM - 1).rev() {
            let left = left_child(i);
            nodes[i] = engine.commit(&nodes[left], &nodes[left + 1], salt_of(i));
        }

        end_timer!(timer);
        Ok(Self { nodes })
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn leaf(&self, index: usize) -> Option<&TreeNode> {
        if index < KEY_NUM {
            Some(&self.nodes[KEY_NUM - 1 + index])
        } else {
            None
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }
}
