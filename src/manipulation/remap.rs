//! Matching nodes of an old tree to nodes of its reparse.
//!
//! Old nodes are visited in preorder. Each one computes where its range would sit in
//! the new text given the edits, then looks for an unused new node of the same wrapper
//! kind at exactly that range, below the image of its nearest matched ancestor.
//! Nodes that an edit partially overlaps or replaces have no candidate range and are
//! left unmatched. Leaf nodes never grow: an edit inside or against a token leaves it
//! unmatched unless the token only shifts. The roots always match each other.

use crate::compose::WrapperKind;
use crate::edit::TextEdit;
use crate::syntax::{NodeData, NodeHandle, SyntaxTree};
use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RemapKey {
    Kind(WrapperKind),
    Syntax(&'static str),
}

impl RemapKey {
    fn of(data: &NodeData) -> Self {
        match WrapperKind::from_syntax_kind(data.kind) {
            WrapperKind::Generic => RemapKey::Syntax(data.kind),
            kind => RemapKey::Kind(kind),
        }
    }
}

/// Old handle to new handle for every node that survived the edits.
pub(crate) fn map_nodes(
    old: &SyntaxTree,
    new: &SyntaxTree,
    prepared: &[TextEdit],
) -> HashMap<NodeHandle, NodeHandle> {
    let mut mapping = HashMap::new();
    if old.is_empty() || new.is_empty() {
        return mapping;
    }

    let mut by_range: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (i, data) in new.nodes().iter().enumerate() {
        by_range
            .entry((data.range.start, data.range.end))
            .or_default()
            .push(i);
    }

    let mut image: Vec<Option<usize>> = vec![None; old.len()];
    let mut used = vec![false; new.len()];
    image[0] = Some(0);
    used[0] = true;
    mapping.insert(old.root(), new.root());

    for i in 1..old.len() {
        let data = old.node(i);
        if data.range.is_empty() || data.is_missing {
            continue;
        }

        let anchor = nearest_image(old, &image, i);
        let key = RemapKey::of(data);

        let found = candidate_ranges(&data.range, prepared, !data.children.is_empty())
            .into_iter()
            .find_map(|range| {
                by_range.get(&(range.start, range.end))?.iter().copied().find(|&j| {
                    !used[j]
                        && new.node(j).named == data.named
                        && RemapKey::of(new.node(j)) == key
                        && new.is_ancestor(anchor, j)
                })
            });

        if let Some(j) = found {
            image[i] = Some(j);
            used[j] = true;
            mapping.insert(old.handle(i), new.handle(j));
        }
    }

    mapping
}

fn nearest_image(old: &SyntaxTree, image: &[Option<usize>], index: usize) -> usize {
    let mut current = old.parent(index);
    while let Some(p) = current {
        if let Some(j) = image[p] {
            return j;
        }
        current = old.parent(p);
    }
    0
}

/// Where `range` may have moved to, most likely first. Empty if an edit overlaps it.
///
/// An insertion exactly at the start of an `extendable` node may belong to it (a new
/// leading modifier) or precede it (a new sibling), and one exactly at the end may
/// extend it or follow it, so boundary insertions yield two candidates each. A node
/// that is not extendable only ever shifts.
pub(crate) fn candidate_ranges(
    range: &Range<usize>,
    prepared: &[TextEdit],
    extendable: bool,
) -> Vec<Range<usize>> {
    let (s, e) = (range.start, range.end);
    let mut deltas: Vec<(isize, isize)> = vec![(0, 0)];

    // Prepared edits are descending; walk them in text order.
    for edit in prepared.iter().rev() {
        let d = edit.delta();
        let (a, b) = (edit.start, edit.end);

        let options: &[(isize, isize)] = if edit.is_insertion() {
            if a < s || (a == s && !extendable) {
                &[(1, 1)]
            } else if a == s {
                &[(1, 1), (0, 1)]
            } else if a < e && extendable {
                &[(0, 1)]
            } else if a < e {
                return Vec::new();
            } else if a == e && extendable {
                &[(0, 0), (0, 1)]
            } else {
                &[(0, 0)]
            }
        } else if b <= s {
            &[(1, 1)]
        } else if a >= e {
            &[(0, 0)]
        } else if extendable && s <= a && b <= e && !(a == s && b == e) {
            &[(0, 1)]
        } else {
            return Vec::new();
        };

        deltas = deltas
            .iter()
            .flat_map(|&(ds, de)| {
                options
                    .iter()
                    .map(move |&(ms, me)| (ds + ms * d, de + me * d))
            })
            .collect();
    }

    let mut ranges: Vec<Range<usize>> = Vec::with_capacity(deltas.len());
    for (ds, de) in deltas {
        let (Some(start), Some(end)) = (s.checked_add_signed(ds), e.checked_add_signed(de)) else {
            continue;
        };
        if start < end && !ranges.contains(&(start..end)) {
            ranges.push(start..end);
        }
    }
    ranges
}
