/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Tries of labels.
//!
//! A [`LabelTrie`] stores the labels of hostnames from the rightmost to the
//! leftmost: the children of the root are top-level domains, their children
//! are second-level domains, and so on. Every node but the root refers to a
//! label in a [`LabelStore`], and the same label under the same parent is
//! stored only once, regardless of how many hostnames contain it.
//!
//! Nodes live in an arena and are addressed by their [`NodeId`], which never
//! changes. The children of a node are sorted by [`compare_labels`], so
//! lookups are binary searches. Labels are compared ignoring ASCII case, and
//! the case of the first insertion is the one that is stored.

use crate::store::{LabelStore, StoreError};
use core::cmp::Ordering;
use mem_dbg::*;

/// The index of a node in a [`LabelTrie`].
pub type NodeId = usize;

/// The root of every [`LabelTrie`].
pub const ROOT: NodeId = 0;

/// Compare two labels ignoring ASCII case.
///
/// Bytes are compared pairwise on the length of the shorter label; if they
/// are all equal, the shorter label comes first.
#[inline]
pub fn compare_labels(a: &[u8], b: &[u8]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase()) {
            Ordering::Equal => {}
            ord => return ord,
        }
    }
    a.len().cmp(&b.len())
}

#[derive(Debug, Clone, Default, MemDbg, MemSize)]
struct Node {
    /// The offset of the label in the store; zero for the root.
    offset: u32,
    /// The children, sorted by label.
    children: Vec<NodeId>,
}

/// A trie of labels backed by a [`LabelStore`].
///
/// The trie does not own its store: the same store must be passed to every
/// call, as offsets are only meaningful with respect to it.
#[derive(Debug, Clone, MemDbg, MemSize)]
pub struct LabelTrie {
    nodes: Vec<Node>,
}

impl Default for LabelTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelTrie {
    /// Create a trie containing just the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    /// Binary search `label` among the children of `node`, returning the
    /// position of the child or the position where it should be inserted.
    #[inline]
    fn search(&self, store: &LabelStore, node: NodeId, label: &[u8]) -> Result<usize, usize> {
        self.nodes[node]
            .children
            .binary_search_by(|&child| compare_labels(store.label(self.nodes[child].offset), label))
    }

    /// Return the child of `node` with the given label, if any.
    pub fn find(&self, store: &LabelStore, node: NodeId, label: &[u8]) -> Option<NodeId> {
        self.search(store, node, label)
            .ok()
            .map(|pos| self.nodes[node].children[pos])
    }

    /// Return the child of `node` with the given label, creating it if
    /// necessary.
    ///
    /// If the label is already present the store is not touched. Otherwise the
    /// label is appended to `store` and a new child is inserted in sorted
    /// position; if the append fails, the trie is not modified.
    pub fn find_or_insert(
        &mut self,
        store: &mut LabelStore,
        node: NodeId,
        label: &[u8],
    ) -> Result<NodeId, StoreError> {
        match self.search(store, node, label) {
            Ok(pos) => Ok(self.nodes[node].children[pos]),
            Err(pos) => {
                let offset = store.append(label)?;
                let child = self.nodes.len();
                self.nodes.push(Node {
                    offset,
                    children: Vec::new(),
                });
                self.nodes[node].children.insert(pos, child);
                Ok(child)
            }
        }
    }

    /// Return the child of `node` whose label is stored exactly at `offset`.
    ///
    /// Returns `None` if `offset` is not a valid entry of `store` or if it is
    /// not the offset of a child of `node`.
    pub fn child_with_offset(
        &self,
        store: &LabelStore,
        node: NodeId,
        offset: u32,
    ) -> Option<NodeId> {
        let label = store.get(offset)?;
        let child = self.find(store, node, label)?;
        (self.nodes[child].offset == offset).then_some(child)
    }

    /// The offset of the label of `node`; zero for the root.
    #[inline(always)]
    pub fn offset(&self, node: NodeId) -> u32 {
        self.nodes[node].offset
    }

    /// The children of `node`, sorted by label.
    #[inline(always)]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].children
    }

    /// The number of nodes, including the root.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return true if the trie contains just the root.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}
