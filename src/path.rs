//! Hierarchical paths such as `ship/engine/speed`.
//!
//! Every segment but the last names a block; the last names a parameter or a block,
//! depending on the operation. When siblings share a name, the first one is taken.
//! Delimiters cannot be escaped, so names containing the delimiter are only reachable
//! through the non-path operations of [`BlockPar`].

use crate::block::BlockPar;
use crate::err::{BlockParError, Result};
use crate::value::ParamValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathResolver {
    delimiter: char,
}

impl Default for PathResolver {
    fn default() -> Self {
        PathResolver {
            delimiter: Self::DEFAULT_DELIMITER,
        }
    }
}

/// A path split into its parent segments and its final segment.
struct SplitPath<'p> {
    parents: Vec<&'p str>,
    last: &'p str,
}

impl PathResolver {
    pub const DEFAULT_DELIMITER: char = '/';

    pub fn new(delimiter: char) -> Self {
        PathResolver { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    fn split<'p>(&self, path: &'p str) -> Result<SplitPath<'p>> {
        let mut parents: Vec<&str> = path.split(self.delimiter).collect();

        if let Some(empty) = parents.iter().find(|segment| segment.is_empty()) {
            return Err(BlockParError::Path {
                path: path.to_owned(),
                segment: (*empty).to_owned(),
                reason: "empty segment",
            });
        }

        // `split` always yields at least one item.
        let last = parents.pop().unwrap_or_default();
        Ok(SplitPath { parents, last })
    }

    fn unresolved(path: &str, segment: &str, block: &BlockPar) -> BlockParError {
        let reason = if block.param_count_of(segment) > 0 {
            "segment names a parameter, not a block"
        } else {
            "no such block"
        };

        BlockParError::Path {
            path: path.to_owned(),
            segment: segment.to_owned(),
            reason,
        }
    }

    fn walk<'t>(path: &str, tree: &'t BlockPar, segments: &[&str]) -> Result<&'t BlockPar> {
        let mut current = tree;
        for segment in segments {
            current = current
                .block_get_or_none(segment)
                .ok_or_else(|| Self::unresolved(path, segment, current))?;
        }
        Ok(current)
    }

    fn walk_mut<'t>(
        path: &str,
        tree: &'t mut BlockPar,
        segments: &[&str],
    ) -> Result<&'t mut BlockPar> {
        let mut current = tree;
        for segment in segments {
            let Some(position) = current.find_block(segment) else {
                return Err(Self::unresolved(path, segment, current));
            };
            current = current.all_block_mut(position)?;
        }
        Ok(current)
    }

    fn walk_or_create<'t>(tree: &'t mut BlockPar, segments: &[&str]) -> &'t mut BlockPar {
        let mut current = tree;
        for segment in segments {
            current = current.block_get_or_add(segment);
        }
        current
    }

    pub fn param_get<'t>(&self, tree: &'t BlockPar, path: &str) -> Result<&'t ParamValue> {
        self.param_get_nth(tree, path, 0)
    }

    /// The `index`-th parameter named by the last segment, inside the first block
    /// the parent segments lead to.
    pub fn param_get_nth<'t>(
        &self,
        tree: &'t BlockPar,
        path: &str,
        index: usize,
    ) -> Result<&'t ParamValue> {
        let split = self.split(path)?;
        Self::walk(path, tree, &split.parents)?.param_get(split.last, index)
    }

    pub fn param_set(
        &self,
        tree: &mut BlockPar,
        path: &str,
        value: impl Into<ParamValue>,
    ) -> Result<()> {
        let split = self.split(path)?;
        Self::walk_mut(path, tree, &split.parents)?.param_set(split.last, value)
    }

    /// Sets the parameter, adding it to an existing parent block when missing.
    pub fn param_set_or_add(
        &self,
        tree: &mut BlockPar,
        path: &str,
        value: impl Into<ParamValue>,
    ) -> Result<()> {
        let split = self.split(path)?;
        Self::walk_mut(path, tree, &split.parents)?.param_set_or_add(split.last, value);
        Ok(())
    }

    /// Adds a parameter, creating every missing parent block on the way.
    pub fn param_add(
        &self,
        tree: &mut BlockPar,
        path: &str,
        value: impl Into<ParamValue>,
    ) -> Result<()> {
        let split = self.split(path)?;
        Self::walk_or_create(tree, &split.parents).param_add(split.last, value);
        Ok(())
    }

    pub fn param_delete(&self, tree: &mut BlockPar, path: &str) -> Result<()> {
        let split = self.split(path)?;
        Self::walk_mut(path, tree, &split.parents)?.param_delete_named(split.last)
    }

    pub fn block_get<'t>(&self, tree: &'t BlockPar, path: &str) -> Result<&'t BlockPar> {
        let split = self.split(path)?;
        let parent = Self::walk(path, tree, &split.parents)?;
        parent
            .block_get_or_none(split.last)
            .ok_or_else(|| Self::unresolved(path, split.last, parent))
    }

    pub fn block_get_mut<'t>(&self, tree: &'t mut BlockPar, path: &str) -> Result<&'t mut BlockPar> {
        let split = self.split(path)?;
        let mut segments = split.parents;
        segments.push(split.last);
        Self::walk_mut(path, tree, &segments)
    }

    /// Creates missing parents and always appends a new final block.
    pub fn block_add<'t>(&self, tree: &'t mut BlockPar, path: &str) -> Result<&'t mut BlockPar> {
        let split = self.split(path)?;
        Ok(Self::walk_or_create(tree, &split.parents).block_add(split.last))
    }

    /// Creates only the blocks that are missing; repeated calls return the same block.
    pub fn block_get_or_add<'t>(
        &self,
        tree: &'t mut BlockPar,
        path: &str,
    ) -> Result<&'t mut BlockPar> {
        let split = self.split(path)?;
        let mut segments = split.parents;
        segments.push(split.last);
        Ok(Self::walk_or_create(tree, &segments))
    }
}

/// Path operations using [`PathResolver::DEFAULT_DELIMITER`].
impl BlockPar {
    pub fn param_path_get(&self, path: &str) -> Result<&ParamValue> {
        PathResolver::default().param_get(self, path)
    }

    pub fn param_path_set(&mut self, path: &str, value: impl Into<ParamValue>) -> Result<()> {
        PathResolver::default().param_set(self, path, value)
    }

    pub fn param_path_set_or_add(
        &mut self,
        path: &str,
        value: impl Into<ParamValue>,
    ) -> Result<()> {
        PathResolver::default().param_set_or_add(self, path, value)
    }

    pub fn param_path_add(&mut self, path: &str, value: impl Into<ParamValue>) -> Result<()> {
        PathResolver::default().param_add(self, path, value)
    }

    pub fn param_path_delete(&mut self, path: &str) -> Result<()> {
        PathResolver::default().param_delete(self, path)
    }

    pub fn block_path_get(&self, path: &str) -> Result<&BlockPar> {
        PathResolver::default().block_get(self, path)
    }

    pub fn block_path_get_mut(&mut self, path: &str) -> Result<&mut BlockPar> {
        PathResolver::default().block_get_mut(self, path)
    }

    pub fn block_path_add(&mut self, path: &str) -> Result<&mut BlockPar> {
        PathResolver::default().block_add(self, path)
    }

    pub fn block_path_get_or_add(&mut self, path: &str) -> Result<&mut BlockPar> {
        PathResolver::default().block_get_or_add(self, path)
    }
}
