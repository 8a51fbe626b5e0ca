//! The node registry: one live wrapper per compiler node, per project.
//!
//! Wrappers hold a [`WrapperId`] only. The registry is the single arena mapping ids
//! to their current [`NodeHandle`]; forgetting a wrapper removes its entry and
//! nothing else needs to be cleaned up.

use crate::compose::WrapperKind;
use crate::syntax::{NodeHandle, SyntaxTree};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WrapperId(u64);

impl fmt::Display for WrapperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WrapperEntry {
    pub node: NodeHandle,
    pub file: FileId,
    pub kind: WrapperKind,
}

#[derive(Debug, Default)]
pub struct NodeRegistry {
    next_id: u64,
    by_node: HashMap<NodeHandle, WrapperId>,
    entries: HashMap<WrapperId, WrapperEntry>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached wrapper for `node`, or a new one of the kind dispatched from `syntax_kind`.
    pub(crate) fn get_or_create(
        &mut self,
        node: NodeHandle,
        file: FileId,
        syntax_kind: &str,
    ) -> (WrapperId, WrapperKind) {
        if let Some(&id) = self.by_node.get(&node) {
            return (id, self.entries[&id].kind);
        }

        self.next_id += 1;
        let id = WrapperId(self.next_id);
        let kind = WrapperKind::from_syntax_kind(syntax_kind);
        self.by_node.insert(node, id);
        self.entries.insert(id, WrapperEntry { node, file, kind });
        (id, kind)
    }

    pub(crate) fn entry(&self, id: WrapperId) -> Option<&WrapperEntry> {
        self.entries.get(&id)
    }

    pub fn was_forgotten(&self, id: WrapperId) -> bool {
        !self.entries.contains_key(&id)
    }

    /// Forget the wrapper at `index` and every wrapper below it. Returns how many
    /// entries were dropped; forgetting twice is a no-op.
    pub(crate) fn forget_subtree(&mut self, tree: &SyntaxTree, index: usize) -> usize {
        let end = tree.node(index).subtree_end as usize;
        let mut dropped = 0;
        for i in index..end {
            if let Some(id) = self.by_node.remove(&tree.handle(i)) {
                self.entries.remove(&id);
                dropped += 1;
            }
        }
        dropped
    }

    /// Rebind every wrapper of `file` through `mapping`; unmapped wrappers are forgotten.
    ///
    /// Returns `(remapped, forgotten)`.
    pub(crate) fn remap_file(
        &mut self,
        file: FileId,
        mapping: &HashMap<NodeHandle, NodeHandle>,
    ) -> (usize, usize) {
        let mut remapped = 0;
        let mut forgotten = Vec::new();
        let mut rebound = Vec::new();

        for (&id, entry) in self.entries.iter_mut().filter(|(_, e)| e.file == file) {
            self.by_node.remove(&entry.node);
            match mapping.get(&entry.node) {
                Some(&new) => {
                    entry.node = new;
                    rebound.push((new, id));
                    remapped += 1;
                }
                None => forgotten.push(id),
            }
        }

        self.by_node.extend(rebound);
        for id in &forgotten {
            self.entries.remove(id);
        }
        (remapped, forgotten.len())
    }

    /// Forget every wrapper of `file`.
    pub(crate) fn forget_file(&mut self, file: FileId) -> usize {
        self.remap_file(file, &HashMap::new()).1
    }
}
