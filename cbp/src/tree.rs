//! The sole structural element of the output: a tree of nodes whose durations satisfy the
//! conservation invariants listed in spec §3.
//!
//! Children are stored densely (`Vec<Tree>`) without a parent backlink — no pointer stability, but
//! tighter packing, and it keeps the post-order reconciliation pass and the merge engine's mapping
//! step trivially recursive instead of requiring parent links to be recomputed from flattened
//! depths (see DESIGN.md for the tradeoff against a flattened representation).

use serde::Serialize;

use crate::time::Microseconds;

/// Node categorization: drives nesting rules (§3 invariant 5) and which components touch which
/// nodes (e.g. only `Parse` and `Instantiate` names get prettified).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    Targets,
    Target,
    TranslationUnit,
    Parsing,
    Parse,
    Instantiation,
    Instantiate,
    LlvmCodegen,
    Optimization,
    NativeCodegen,
}

impl TreeKind {
    /// Whether this kind is one of the five compilation stages.
    pub fn is_compilation_stage(self) -> bool {
        matches!(
            self,
            TreeKind::Parsing
                | TreeKind::Instantiation
                | TreeKind::LlvmCodegen
                | TreeKind::Optimization
                | TreeKind::NativeCodegen
        )
    }

    /// Whether this kind is a `Parse` or `Instantiate` leaf-family node.
    pub fn is_node(self) -> bool {
        matches!(self, TreeKind::Parse | TreeKind::Instantiate)
    }
}

/// Coarse severity bucket used for coloring and pruning; warmer colors correspond to nodes that
/// took more wall time (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeCategory {
    #[default]
    None,
    Gray,
    White,
    Yellow,
    Red,
}

/// A node in the profiling tree.
#[derive(Debug, Clone, Serialize)]
pub struct Tree {
    pub kind: TreeKind,
    #[serde(default)]
    pub category: TreeCategory,
    pub name: String,
    pub total: Microseconds,
    #[serde(rename = "self")]
    pub self_time: Microseconds,
    /// Internal accumulator used during reconciliation (spec §3); always zero once a tree leaves
    /// `analyze`/`merge`. Not part of the public wire contract in spirit, but left visible (and
    /// serialized) since every invariant check in `tests/` wants to assert it is zero.
    #[serde(skip)]
    pub carry: Microseconds,
    pub children: Vec<Tree>,
}

impl Tree {
    /// A freshly created node with all durations at zero and no children.
    pub fn new(kind: TreeKind, name: impl Into<String>) -> Tree {
        Tree {
            kind,
            category: TreeCategory::None,
            name: name.into(),
            total: Microseconds::ZERO,
            self_time: Microseconds::ZERO,
            carry: Microseconds::ZERO,
            children: Vec::new(),
        }
    }

    /// Sets `total` to the sum of the direct children's `total`. Used by the handful of builders
    /// (parsing subtree, instantiation subtree, target/build aggregators) whose root total is
    /// purely additive over already-finalized children.
    pub fn sum_children_into_total(&mut self) {
        self.total = self.children.iter().map(|c| c.total).sum();
    }

    /// Applies a function to this node and every descendant, preorder — mirroring the original's
    /// `tree::for_all`.
    pub fn for_each<F: FnMut(&Tree)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.for_each(f);
        }
    }

    /// Mutable preorder traversal.
    pub fn for_each_mut<F: FnMut(&mut Tree)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_children_into_total_ignores_self_time() {
        let mut root = Tree::new(TreeKind::Parsing, "Parsing");
        let mut a = Tree::new(TreeKind::Parse, "a.h");
        a.total = Microseconds::new(10);
        let mut b = Tree::new(TreeKind::Parse, "b.h");
        b.total = Microseconds::new(20);
        root.children.push(a);
        root.children.push(b);

        root.sum_children_into_total();
        assert_eq!(root.total, Microseconds::new(30));
    }

    #[test]
    fn for_each_visits_preorder() {
        let mut root = Tree::new(TreeKind::Parsing, "root");
        let mut child = Tree::new(TreeKind::Parse, "child");
        child.children.push(Tree::new(TreeKind::Parse, "grandchild"));
        root.children.push(child);

        let mut names = Vec::new();
        root.for_each(&mut |t| names.push(t.name.clone()));
        assert_eq!(names, vec!["root", "child", "grandchild"]);
    }

    #[test]
    fn for_each_mut_can_rewrite_every_node() {
        let mut root = Tree::new(TreeKind::Parsing, "root");
        root.children.push(Tree::new(TreeKind::Parse, "child"));

        root.for_each_mut(&mut |t| t.name.push('!'));
        assert_eq!(root.name, "root!");
        assert_eq!(root.children[0].name, "child!");
    }

    #[test]
    fn is_compilation_stage_and_is_node_partition_the_kinds() {
        assert!(TreeKind::Parsing.is_compilation_stage());
        assert!(!TreeKind::Parse.is_compilation_stage());
        assert!(TreeKind::Instantiate.is_node());
        assert!(!TreeKind::TranslationUnit.is_node());
    }
}
