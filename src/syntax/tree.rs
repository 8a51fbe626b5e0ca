use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one parse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity of a compiler node: the tree it belongs to plus its preorder index.
///
/// Handles from different parses never compare equal, even for nodes that are
/// textually identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    tree: TreeId,
    index: u32,
}

impl NodeHandle {
    pub fn tree(&self) -> TreeId {
        self.tree
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// One lowered syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Grammar kind, e.g. `lexical_declaration`
    pub kind: &'static str,
    /// Field name this node occupies in its parent, e.g. `name`
    pub field: Option<&'static str>,
    /// Named nodes are grammar rules; anonymous ones are tokens such as `async` or `;`
    pub named: bool,
    pub is_error: bool,
    pub is_missing: bool,
    pub range: Range<usize>,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
    /// Preorder index one past the last descendant
    pub subtree_end: u32,
}

impl NodeData {
    pub fn is_token(&self, token: &str) -> bool {
        !self.named && self.kind == token
    }

    pub fn is_comment(&self) -> bool {
        self.kind == "comment"
    }
}

/// An immutable, owned syntax tree produced by a [`ParseService`](super::ParseService).
///
/// Nodes live in a preorder arena, so a parent always precedes its children and a
/// subtree is the contiguous index range `[index, subtree_end)`.
pub struct SyntaxTree {
    id: TreeId,
    nodes: Vec<NodeData>,
    backing: Option<tree_sitter::Tree>,
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("id", &self.id)
            .field("nodes", &self.nodes.len())
            .field("incremental", &self.backing.is_some())
            .finish()
    }
}

impl SyntaxTree {
    /// Lower a tree-sitter tree into an owned arena.
    pub fn from_tree_sitter(tree: tree_sitter::Tree) -> Self {
        let nodes = lower(&tree);
        Self {
            id: TreeId::next(),
            nodes,
            backing: Some(tree),
        }
    }

    /// Build a tree from already-lowered nodes (for services not backed by tree-sitter).
    ///
    /// `nodes` must be in preorder with the root at index 0; `subtree_end` is recomputed.
    pub fn from_nodes(mut nodes: Vec<NodeData>) -> Self {
        compute_subtree_ends(&mut nodes);
        Self {
            id: TreeId::next(),
            nodes,
            backing: None,
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> NodeHandle {
        self.handle(0)
    }

    pub fn handle(&self, index: usize) -> NodeHandle {
        NodeHandle {
            tree: self.id,
            index: index as u32,
        }
    }

    /// Resolve a handle; `None` if it belongs to another tree.
    pub fn get(&self, handle: NodeHandle) -> Option<&NodeData> {
        if handle.tree != self.id {
            return None;
        }
        self.nodes.get(handle.index())
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn node(&self, index: usize) -> &NodeData {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[NodeData] {
        &self.nodes
    }

    pub(crate) fn backing(&self) -> Option<&tree_sitter::Tree> {
        self.backing.as_ref()
    }

    /// True if `descendant` lies strictly inside the subtree rooted at `ancestor`.
    pub fn is_ancestor(&self, ancestor: usize, descendant: usize) -> bool {
        ancestor < descendant && descendant < self.nodes[ancestor].subtree_end as usize
    }

    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes[index].children.iter().map(|&c| c as usize)
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.nodes[index].parent.map(|p| p as usize)
    }

    /// First direct child occupying `field`.
    pub fn child_by_field(&self, index: usize, field: &str) -> Option<usize> {
        self.children(index)
            .find(|&c| self.nodes[c].field == Some(field))
    }

    /// Preorder indices of the strict descendants of `index`.
    pub fn descendants(&self, index: usize) -> Range<usize> {
        index + 1..self.nodes[index].subtree_end as usize
    }

    /// Outermost node whose range is exactly `span` and that satisfies `predicate`.
    pub fn find_exact(&self, span: &Range<usize>, predicate: impl Fn(&NodeData) -> bool) -> Option<usize> {
        (0..self.nodes.len()).find(|&i| {
            let data = &self.nodes[i];
            data.range == *span && predicate(data)
        })
    }

    /// Outermost nodes contained in `span` that satisfy `predicate`.
    pub fn find_within(
        &self,
        span: &Range<usize>,
        predicate: impl Fn(&NodeData) -> bool,
    ) -> Vec<usize> {
        let mut found = Vec::new();
        let mut i = 0;
        while i < self.nodes.len() {
            let data = &self.nodes[i];
            if data.range.start >= span.start && data.range.end <= span.end && predicate(data) {
                found.push(i);
                i = data.subtree_end as usize;
            } else {
                i += 1;
            }
        }
        found
    }

    /// Byte ranges of every ERROR and MISSING node.
    pub fn error_ranges(&self) -> Vec<Range<usize>> {
        self.nodes
            .iter()
            .filter(|n| n.is_error || n.is_missing)
            .map(|n| n.range.clone())
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.nodes.iter().any(|n| n.is_error || n.is_missing)
    }
}

fn lower(tree: &tree_sitter::Tree) -> Vec<NodeData> {
    let mut nodes: Vec<NodeData> = Vec::new();
    let mut parents: Vec<u32> = Vec::new();
    let mut cursor = tree.walk();

    loop {
        let node = cursor.node();
        let index = nodes.len() as u32;
        let parent = parents.last().copied();
        nodes.push(NodeData {
            kind: node.kind(),
            field: cursor.field_name(),
            named: node.is_named(),
            is_error: node.is_error(),
            is_missing: node.is_missing(),
            range: node.byte_range(),
            parent,
            children: Vec::new(),
            subtree_end: index + 1,
        });
        if let Some(p) = parent {
            nodes[p as usize].children.push(index);
        }

        if cursor.goto_first_child() {
            parents.push(index);
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                compute_subtree_ends(&mut nodes);
                return nodes;
            }
            parents.pop();
        }
    }
}

fn compute_subtree_ends(nodes: &mut [NodeData]) {
    for i in (0..nodes.len()).rev() {
        let end = match nodes[i].children.last() {
            Some(&last) => nodes[last as usize].subtree_end,
            None => i as u32 + 1,
        };
        nodes[i].subtree_end = end;
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::{ParseService, TreeSitterParser};

    #[test]
    fn lowers_preorder_with_fields() {
        let mut parser = TreeSitterParser::typescript().unwrap();
        let tree = parser.parse("const x: number = 1;", None).unwrap();

        assert_eq!(tree.node(0).kind, "program");
        let decl = tree.children(0).next().unwrap();
        assert_eq!(tree.node(decl).kind, "lexical_declaration");

        let declarator = tree
            .children(decl)
            .find(|&c| tree.node(c).kind == "variable_declarator")
            .unwrap();
        let name = tree.child_by_field(declarator, "name").unwrap();
        assert_eq!(tree.node(name).kind, "identifier");
        assert_eq!(tree.node(name).range, 6..7);
        assert!(tree.child_by_field(declarator, "type").is_some());
        assert!(tree.child_by_field(declarator, "value").is_some());
    }

    #[test]
    fn subtree_ends_bound_descendants() {
        let mut parser = TreeSitterParser::typescript().unwrap();
        let tree = parser.parse("let a = 1;\nlet b = 2;", None).unwrap();

        let statements: Vec<usize> = tree.children(0).collect();
        assert_eq!(statements.len(), 2);
        let (first, second) = (statements[0], statements[1]);

        for d in tree.descendants(first) {
            assert!(tree.is_ancestor(first, d));
            assert!(!tree.is_ancestor(second, d));
        }
        assert!(tree.is_ancestor(0, second));
        assert!(!tree.is_ancestor(second, second));
    }

    #[test]
    fn tree_ids_are_unique() {
        let mut parser = TreeSitterParser::typescript().unwrap();
        let a = parser.parse("let a = 1;", None).unwrap();
        let b = parser.parse("let a = 1;", None).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(!b.contains(a.root()));
    }
}
