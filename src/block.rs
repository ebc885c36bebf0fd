use crate::err::{BlockParError, Result};
use crate::name_index::NameIndex;
use crate::node::{Node, NodeKind};
use crate::value::{EMPTY_VALUE, ParamValue};

use log::trace;

/// One block of the tree: an ordered sequence of parameters and nested blocks.
///
/// Order is significant; positional access and serialization both follow it.
/// Names may repeat, and lookups by name address the `index`-th occurrence (0 is the first).
///
/// Two kinds of positions are used:
/// - *raw* positions (`all_*`, [`BlockPar::param_delete`]) index the full sequence of nodes,
/// - *ordinal* positions (`param_at`, `block_at`, ...) count only nodes of one kind.
#[derive(Debug, Default, Clone)]
pub struct BlockPar {
    nodes: Vec<Node>,
    param_count: usize,
    block_count: usize,
    index: NameIndex,
}

impl PartialEq for BlockPar {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl BlockPar {
    pub fn new() -> Self {
        BlockPar::default()
    }

    /// Removes every node (and with them every nested block).
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.param_count = 0;
        self.block_count = 0;
        self.index.clear();
    }

    /// Replaces the contents of `self` with a deep copy of `other`.
    pub fn copy_from(&mut self, other: &BlockPar) {
        self.clone_from(other);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        let param_count = nodes.iter().filter(|n| n.kind() == NodeKind::Param).count();
        let block_count = nodes.iter().filter(|n| n.kind() == NodeKind::Block).count();
        let index = NameIndex::build(&nodes);

        BlockPar {
            nodes,
            param_count,
            block_count,
            index,
        }
    }

    fn push(&mut self, node: Node) -> usize {
        let position = self.nodes.len();

        match node.kind() {
            NodeKind::Param => self.param_count += 1,
            NodeKind::Block => self.block_count += 1,
            NodeKind::Empty => return position,
        }
        if let Some(name) = node.name() {
            self.index.insert(node.kind(), name, position);
        }

        self.nodes.push(node);
        position
    }

    fn remove_at(&mut self, position: usize) -> Node {
        let node = std::mem::take(&mut self.nodes[position]);

        match &node {
            Node::Param { name, .. } => {
                self.param_count -= 1;
                self.index.remove(NodeKind::Param, name, position);
            }
            Node::Block { name, .. } => {
                self.block_count -= 1;
                self.index.remove(NodeKind::Block, name, position);
            }
            Node::Empty => {}
        }

        self.nodes.remove(position);
        trace!("removed {} at raw position {}", node.kind(), position);
        node
    }

    /// Raw position of the `ordinal`-th node of `kind`.
    fn ordinal_position(&self, kind: NodeKind, ordinal: usize) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.kind() == kind)
            .nth(ordinal)
            .map(|(position, _)| position)
    }

    fn node_at(&self, position: usize) -> Result<&Node> {
        self.nodes
            .get(position)
            .ok_or_else(|| BlockParError::range("node", position, self.nodes.len()))
    }

    fn node_at_mut(&mut self, position: usize) -> Result<&mut Node> {
        let len = self.nodes.len();
        self.nodes
            .get_mut(position)
            .ok_or_else(|| BlockParError::range("node", position, len))
    }

    fn mismatch(position: usize, expected: NodeKind, found: &Node) -> BlockParError {
        BlockParError::TypeMismatch {
            position,
            expected,
            found: found.kind(),
        }
    }

    fn value_at_mut(&mut self, position: usize) -> Option<&mut ParamValue> {
        match self.nodes.get_mut(position) {
            Some(Node::Param { value, .. }) => Some(value),
            _ => None,
        }
    }

    fn child_at(&self, position: usize) -> Option<&BlockPar> {
        self.nodes.get(position).and_then(Node::block)
    }

    fn child_at_mut(&mut self, position: usize) -> Option<&mut BlockPar> {
        self.nodes.get_mut(position).and_then(Node::block_mut)
    }

    /// Raw position of the first parameter named `name`.
    pub(crate) fn find_param(&self, name: &str) -> Option<usize> {
        self.index.first(NodeKind::Param, name)
    }

    /// Raw position of the first block named `name`.
    pub(crate) fn find_block(&self, name: &str) -> Option<usize> {
        self.index.first(NodeKind::Block, name)
    }

    // Parameters

    /// Appends a parameter and returns its raw position.
    pub fn param_add(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> usize {
        self.push(Node::Param {
            name: name.into(),
            value: value.into(),
            comment: None,
        })
    }

    /// Overwrites the first parameter named `name`. Returns false if there is none.
    pub fn param_set_if_exists(&mut self, name: &str, value: impl Into<ParamValue>) -> bool {
        let Some(position) = self.find_param(name) else {
            return false;
        };

        match self.value_at_mut(position) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn param_set(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<()> {
        if self.param_set_if_exists(name, value) {
            Ok(())
        } else {
            Err(BlockParError::param_not_found(name, 0))
        }
    }

    pub fn param_set_or_add(&mut self, name: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        if let Some(slot) = self.find_param(name).and_then(|p| self.value_at_mut(p)) {
            *slot = value;
        } else {
            self.param_add(name, value);
        }
    }

    /// Stores a float with eight fractional digits.
    pub fn param_set_or_add_f64(&mut self, name: &str, value: f64) {
        self.param_set_or_add(name, format!("{:.8}", value));
    }

    /// Value of the `index`-th parameter named `name`.
    pub fn param_get(&self, name: &str, index: usize) -> Result<&ParamValue> {
        self.index
            .nth(NodeKind::Param, name, index)
            .and_then(|position| self.nodes[position].value())
            .ok_or_else(|| BlockParError::param_not_found(name, index))
    }

    /// Like [`BlockPar::param_get`], but yields an empty value when absent.
    pub fn param_get_or_default(&self, name: &str, index: usize) -> &ParamValue {
        self.param_get(name, index).unwrap_or(&EMPTY_VALUE)
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    pub fn param_count_of(&self, name: &str) -> usize {
        self.index.count(NodeKind::Param, name)
    }

    /// Removes the parameter at raw `position`.
    ///
    /// A position past the end, or one holding a block, is a `Range` error.
    pub fn param_delete(&mut self, position: usize) -> Result<()> {
        if self.all_type(position)? != NodeKind::Param {
            return Err(BlockParError::range(
                "parameter position",
                position,
                self.nodes.len(),
            ));
        }

        self.remove_at(position);
        Ok(())
    }

    /// Removes the first parameter named `name`.
    pub fn param_delete_named(&mut self, name: &str) -> Result<()> {
        let position = self
            .find_param(name)
            .ok_or_else(|| BlockParError::param_not_found(name, 0))?;

        self.remove_at(position);
        Ok(())
    }

    fn param_position(&self, ordinal: usize) -> Result<usize> {
        self.ordinal_position(NodeKind::Param, ordinal)
            .ok_or_else(|| BlockParError::range("parameter", ordinal, self.param_count))
    }

    /// Value of the `ordinal`-th parameter, counting parameters only.
    pub fn param_at(&self, ordinal: usize) -> Result<&ParamValue> {
        let position = self.param_position(ordinal)?;
        self.all_param_value(position)
    }

    pub fn param_set_at(&mut self, ordinal: usize, value: impl Into<ParamValue>) -> Result<()> {
        let position = self.param_position(ordinal)?;
        if let Some(slot) = self.value_at_mut(position) {
            *slot = value.into();
        }
        Ok(())
    }

    pub fn param_name_at(&self, ordinal: usize) -> Result<&str> {
        let position = self.param_position(ordinal)?;
        self.all_name(position)
    }

    // Blocks

    /// Appends a new empty block and returns it.
    pub fn block_add(&mut self, name: impl Into<String>) -> &mut BlockPar {
        let position = self.push(Node::Block {
            name: name.into(),
            child: BlockPar::new(),
            comment: None,
        });

        match &mut self.nodes[position] {
            Node::Block { child, .. } => child,
            _ => unreachable!("a block was pushed at {}", position),
        }
    }

    pub fn block_get_or_none(&self, name: &str) -> Option<&BlockPar> {
        self.find_block(name).and_then(|p| self.child_at(p))
    }

    pub fn block_get_or_none_mut(&mut self, name: &str) -> Option<&mut BlockPar> {
        self.find_block(name).and_then(|p| self.child_at_mut(p))
    }

    pub fn block_get(&self, name: &str) -> Result<&BlockPar> {
        self.block_get_or_none(name)
            .ok_or_else(|| BlockParError::block_not_found(name))
    }

    pub fn block_get_mut(&mut self, name: &str) -> Result<&mut BlockPar> {
        self.block_get_or_none_mut(name)
            .ok_or_else(|| BlockParError::block_not_found(name))
    }

    pub fn block_get_or_add(&mut self, name: &str) -> &mut BlockPar {
        match self.find_block(name) {
            Some(position) => match &mut self.nodes[position] {
                Node::Block { child, .. } => child,
                _ => unreachable!("name index points at a non-block"),
            },
            None => self.block_add(name),
        }
    }

    /// Removes the first block named `name` together with everything beneath it.
    pub fn block_delete(&mut self, name: &str) -> Result<()> {
        let position = self
            .find_block(name)
            .ok_or_else(|| BlockParError::block_not_found(name))?;

        self.remove_at(position);
        Ok(())
    }

    fn block_position(&self, ordinal: usize) -> Result<usize> {
        self.ordinal_position(NodeKind::Block, ordinal)
            .ok_or_else(|| BlockParError::range("block", ordinal, self.block_count))
    }

    /// Removes the `ordinal`-th block, counting blocks only.
    pub fn block_delete_at(&mut self, ordinal: usize) -> Result<()> {
        let position = self.block_position(ordinal)?;
        self.remove_at(position);
        Ok(())
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    pub fn block_count_of(&self, name: &str) -> usize {
        self.index.count(NodeKind::Block, name)
    }

    pub fn block_at(&self, ordinal: usize) -> Result<&BlockPar> {
        let position = self.block_position(ordinal)?;
        self.all_block(position)
    }

    pub fn block_at_mut(&mut self, ordinal: usize) -> Result<&mut BlockPar> {
        let position = self.block_position(ordinal)?;
        self.all_block_mut(position)
    }

    pub fn block_name_at(&self, ordinal: usize) -> Result<&str> {
        let position = self.block_position(ordinal)?;
        self.all_name(position)
    }

    // Mixed (raw position) access

    pub fn all_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn all_type(&self, position: usize) -> Result<NodeKind> {
        self.node_at(position).map(Node::kind)
    }

    pub fn all_block(&self, position: usize) -> Result<&BlockPar> {
        let node = self.node_at(position)?;
        node.block()
            .ok_or_else(|| Self::mismatch(position, NodeKind::Block, node))
    }

    pub fn all_block_mut(&mut self, position: usize) -> Result<&mut BlockPar> {
        match self.node_at_mut(position)? {
            Node::Block { child, .. } => Ok(child),
            other => Err(Self::mismatch(position, NodeKind::Block, other)),
        }
    }

    pub fn all_param_value(&self, position: usize) -> Result<&ParamValue> {
        let node = self.node_at(position)?;
        node.value()
            .ok_or_else(|| Self::mismatch(position, NodeKind::Param, node))
    }

    /// Name of the parameter or block at raw `position`.
    pub fn all_name(&self, position: usize) -> Result<&str> {
        let node = self.node_at(position)?;
        node.name()
            .ok_or_else(|| Self::mismatch(position, NodeKind::Param, node))
    }

    /// Comment attached to the entry at raw `position`, if any.
    pub fn all_comment(&self, position: usize) -> Result<Option<&str>> {
        self.node_at(position).map(Node::comment)
    }

    /// Attaches (or with `None`, removes) the comment written above the entry at `position`.
    pub fn all_set_comment(&mut self, position: usize, comment: Option<String>) -> Result<()> {
        if let Some(slot) = self.node_at_mut(position)?.comment_mut() {
            *slot = comment;
        }
        Ok(())
    }

    pub fn get(&self, position: usize) -> Option<&Node> {
        self.nodes.get(position)
    }

    /// Nodes in raw order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert!(self.index.is_consistent_with(&self.nodes), "stale name index");
        assert_eq!(self.param_count + self.block_count, self.nodes.len());
        assert!(self.nodes.iter().all(|n| n.kind() != NodeKind::Empty));
        for child in self.nodes.iter().filter_map(Node::block) {
            child.assert_invariants();
        }
    }
}

impl<'a> IntoIterator for &'a BlockPar {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
