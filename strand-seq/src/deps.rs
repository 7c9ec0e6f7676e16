//! Dependency Manager
//!
//! A derived fact is tagged with the set of e-pair equalities it was
//! computed under. Sets are content-addressed nodes in an append-only
//! arena: a leaf holds one e-pair, a join unions two existing nodes.
//! `None` is the empty dependency, so joins with it cost nothing and
//! leaves for identical e-nodes vanish.
//!
//! The arena only grows inside a scope; `truncate` to a saved mark drops
//! every node created since, together with its hash-cons entry.

use crate::host::EPair;
use rustc_hash::{FxHashMap, FxHashSet};

/// Index of an interned dependency node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepId(u32);

/// A dependency set; `None` is empty.
pub type Dep = Option<DepId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DepNode {
    Leaf(EPair),
    Join(DepId, DepId),
}

/// Arena and hash-cons table for dependency sets.
#[derive(Debug, Default)]
pub struct DepManager {
    nodes: Vec<DepNode>,
    table: FxHashMap<DepNode, DepId>,
}

impl DepManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, node: DepNode) -> DepId {
        if let Some(&id) = self.table.get(&node) {
            return id;
        }
        let id = DepId(u32::try_from(self.nodes.len()).expect("dependency arena overflow"));
        self.nodes.push(node);
        self.table.insert(node, id);
        id
    }

    /// Dependency containing the single e-pair `(a, b)`; empty when the
    /// two e-nodes coincide.
    pub fn leaf(&mut self, pair: EPair) -> Dep {
        if pair.0 == pair.1 {
            return None;
        }
        Some(self.intern(DepNode::Leaf(pair)))
    }

    /// Union of two dependencies. Idempotent and commutative in content.
    pub fn join(&mut self, d1: Dep, d2: Dep) -> Dep {
        match (d1, d2) {
            (None, d) | (d, None) => d,
            (Some(a), Some(b)) if a == b => Some(a),
            (Some(a), Some(b)) => {
                let (a, b) = if a <= b { (a, b) } else { (b, a) };
                Some(self.intern(DepNode::Join(a, b)))
            }
        }
    }

    /// Flatten a dependency into its e-pairs. Shared subtrees are visited
    /// once, so the output stays linear in the number of distinct nodes.
    pub fn linearize(&self, d: Dep, out: &mut Vec<EPair>) {
        let Some(root) = d else { return };
        let mut seen: FxHashSet<DepId> = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            match self.nodes[id.0 as usize] {
                DepNode::Leaf(pair) => out.push(pair),
                DepNode::Join(a, b) => {
                    stack.push(a);
                    stack.push(b);
                }
            }
        }
    }

    /// Current arena length, for scope marks.
    pub fn mark(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node created after `mark`.
    pub fn truncate(&mut self, mark: usize) {
        for node in self.nodes.drain(mark..) {
            self.table.remove(&node);
        }
    }
}
