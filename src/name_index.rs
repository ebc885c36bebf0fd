//! Duplicate-name index of a single block.
//!
//! For every name the index keeps the ascending raw positions of the nodes carrying it,
//! separately for parameters and blocks. Looking up the k-th occurrence of a name is a
//! hash lookup plus a slice index; the occurrence count is the slice length.
//!
//! Every insertion and deletion in the owning block goes through here, so the index is
//! never stale.

use crate::node::{Node, NodeKind};

use ahash::RandomState;
use hashbrown::HashMap;
use log::trace;

type Positions = HashMap<String, Vec<usize>, RandomState>;

#[derive(Debug, Default, Clone)]
pub(crate) struct NameIndex {
    params: Positions,
    blocks: Positions,
}

impl NameIndex {
    pub(crate) fn build(nodes: &[Node]) -> Self {
        let mut index = NameIndex::default();
        for (position, node) in nodes.iter().enumerate() {
            if let Some(name) = node.name() {
                index.insert(node.kind(), name, position);
            }
        }
        index
    }

    fn map(&self, kind: NodeKind) -> Option<&Positions> {
        match kind {
            NodeKind::Param => Some(&self.params),
            NodeKind::Block => Some(&self.blocks),
            NodeKind::Empty => None,
        }
    }

    fn map_mut(&mut self, kind: NodeKind) -> Option<&mut Positions> {
        match kind {
            NodeKind::Param => Some(&mut self.params),
            NodeKind::Block => Some(&mut self.blocks),
            NodeKind::Empty => None,
        }
    }

    /// Records a node appended at `position`, which must be past every indexed position.
    pub(crate) fn insert(&mut self, kind: NodeKind, name: &str, position: usize) {
        let Some(map) = self.map_mut(kind) else {
            return;
        };

        match map.get_mut(name) {
            Some(positions) => {
                debug_assert!(positions.last().is_none_or(|&last| last < position));
                positions.push(position);
            }
            None => {
                map.insert(name.to_owned(), vec![position]);
            }
        }
    }

    /// Forgets the node at `position` and shifts every later position down by one.
    pub(crate) fn remove(&mut self, kind: NodeKind, name: &str, position: usize) {
        if let Some(map) = self.map_mut(kind) {
            if let Some(positions) = map.get_mut(name) {
                if let Ok(i) = positions.binary_search(&position) {
                    positions.remove(i);
                }
                if positions.is_empty() {
                    map.remove(name);
                }
            }
        }

        trace!("name index: removed `{}` at {}, shifting tail", name, position);

        for positions in self.params.values_mut().chain(self.blocks.values_mut()) {
            let first_after = positions.partition_point(|&p| p < position);
            for p in &mut positions[first_after..] {
                *p -= 1;
            }
        }
    }

    pub(crate) fn positions(&self, kind: NodeKind, name: &str) -> &[usize] {
        self.map(kind)
            .and_then(|map| map.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn nth(&self, kind: NodeKind, name: &str, index: usize) -> Option<usize> {
        self.positions(kind, name).get(index).copied()
    }

    pub(crate) fn first(&self, kind: NodeKind, name: &str) -> Option<usize> {
        self.nth(kind, name, 0)
    }

    pub(crate) fn count(&self, kind: NodeKind, name: &str) -> usize {
        self.positions(kind, name).len()
    }

    pub(crate) fn clear(&mut self) {
        self.params.clear();
        self.blocks.clear();
    }

    /// Compares the index with one rebuilt from scratch.
    #[cfg(test)]
    pub(crate) fn is_consistent_with(&self, nodes: &[Node]) -> bool {
        let fresh = NameIndex::build(nodes);
        self.params == fresh.params && self.blocks == fresh.blocks
    }
}
