use crate::block::BlockPar;
use crate::value::ParamValue;

use std::fmt;

/// Discriminant of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Empty,
    Param,
    Block,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Empty => "empty",
            NodeKind::Param => "parameter",
            NodeKind::Block => "block",
        };
        f.write_str(s)
    }
}

/// A single entry of a block.
///
/// `Empty` only exists transiently while a node is being moved out of its block;
/// a `BlockPar` never holds one once an operation has returned.
///
/// `comment` holds the `//` lines written directly above the entry, without the
/// leading slashes, joined with `\n`.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Node {
    #[default]
    Empty,
    Param {
        name: String,
        value: ParamValue,
        comment: Option<String>,
    },
    Block {
        name: String,
        child: BlockPar,
        comment: Option<String>,
    },
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Empty => NodeKind::Empty,
            Node::Param { .. } => NodeKind::Param,
            Node::Block { .. } => NodeKind::Block,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Empty => None,
            Node::Param { name, .. } | Node::Block { name, .. } => Some(name),
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Node::Empty => None,
            Node::Param { comment, .. } | Node::Block { comment, .. } => comment.as_deref(),
        }
    }

    pub(crate) fn comment_mut(&mut self) -> Option<&mut Option<String>> {
        match self {
            Node::Empty => None,
            Node::Param { comment, .. } | Node::Block { comment, .. } => Some(comment),
        }
    }

    pub fn value(&self) -> Option<&ParamValue> {
        match self {
            Node::Param { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn block(&self) -> Option<&BlockPar> {
        match self {
            Node::Block { child, .. } => Some(child),
            _ => None,
        }
    }

    pub fn block_mut(&mut self) -> Option<&mut BlockPar> {
        match self {
            Node::Block { child, .. } => Some(child),
            _ => None,
        }
    }
}
