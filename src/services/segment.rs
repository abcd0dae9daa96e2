//! Segment trie used to tell static path segments from dynamic ones.
//!
//! Every node counts the distinct literal children ever created under it.
//! Once that count exceeds the analyzer threshold the node is promoted: its
//! literal children are folded into a single wildcard child that absorbs all
//! later traffic for that position. Promotion never reverts.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Marker substituted for segments judged high-cardinality
pub const DYNAMIC_SEGMENT: &str = "\u{22ef}";

/// One node of a per-identifier segment trie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentNode {
    name: String,
    count: usize,
    children: HashMap<String, SegmentNode>,
}

impl SegmentNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
            children: HashMap::new(),
        }
    }

    /// Literal segment text, or [`DYNAMIC_SEGMENT`]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct literal children ever created directly under this node
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn child(&self, segment: &str) -> Option<&SegmentNode> {
        self.children.get(segment)
    }

    pub fn children(&self) -> impl Iterator<Item = &SegmentNode> {
        self.children.values()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Whether this position has been promoted to a wildcard
    pub fn is_next_dynamic(&self) -> bool {
        self.children.contains_key(DYNAMIC_SEGMENT)
    }

    /// Route one raw segment to the child that represents it
    ///
    /// A saturated node is promoted before routing. The wildcard marker and
    /// every literal arriving at a promoted node land in the wildcard child;
    /// otherwise an existing literal child is reused or a new one created.
    pub(crate) fn route(&mut self, segment: &str, threshold: usize) -> &mut SegmentNode {
        if self.count > threshold && !self.is_next_dynamic() {
            self.promote();
        }

        if segment == DYNAMIC_SEGMENT || self.is_next_dynamic() {
            return self.dynamic_child();
        }

        match self.children.entry(segment.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.count += 1;
                entry.insert(SegmentNode::new(segment))
            }
        }
    }

    /// The wildcard child, promoting first if it is missing or not alone
    fn dynamic_child(&mut self) -> &mut SegmentNode {
        if self.children.len() != 1 || !self.is_next_dynamic() {
            self.promote();
        }
        self.children
            .entry(DYNAMIC_SEGMENT.to_string())
            .or_insert_with(|| SegmentNode::new(DYNAMIC_SEGMENT))
    }

    /// Replace all children with one wildcard child holding their subtrees
    fn promote(&mut self) {
        let mut dynamic = self
            .children
            .remove(DYNAMIC_SEGMENT)
            .unwrap_or_else(|| SegmentNode::new(DYNAMIC_SEGMENT));

        for (_, literal) in self.children.drain() {
            dynamic.absorb(literal);
        }

        let literals = dynamic
            .children
            .keys()
            .filter(|name| name.as_str() != DYNAMIC_SEGMENT)
            .count();
        dynamic.count = dynamic.count.max(literals);

        self.children.insert(DYNAMIC_SEGMENT.to_string(), dynamic);
    }

    /// Merge the children of `other` into this node by segment name
    ///
    /// Colliding children add their counts together and merge recursively.
    fn absorb(&mut self, other: SegmentNode) {
        for (name, child) in other.children {
            match self.children.entry(name) {
                Entry::Occupied(mut entry) => {
                    let existing = entry.get_mut();
                    existing.count += child.count;
                    existing.absorb(child);
                }
                Entry::Vacant(entry) => {
                    entry.insert(child);
                }
            }
        }
    }
}
