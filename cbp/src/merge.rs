//! Cross-translation-unit merge: unions per-TU trees for a given compilation stage into a
//! shared-impact tree, summing durations per distinct identifier (spec §4.7).

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::tree::{Tree, TreeKind};

/// One merged tree per compilation stage, wrapped as children of a synthetic root.
#[derive(Debug, Clone)]
pub struct MergeSummary {
    pub stages: Tree,
}

/// Merges `b` into `a` in place: totals add, same-named children recursively merge, new children
/// move over untouched, then `a.children` is stably re-sorted by descending total (spec §4.7).
fn merge_trees(a: &mut Tree, b: Tree) {
    a.total += b.total;
    a.self_time += b.self_time;

    let mut index_by_name: HashMap<String, usize> = HashMap::with_capacity(a.children.len());
    for (i, child) in a.children.iter().enumerate() {
        index_by_name.insert(child.name.clone(), i);
    }

    for child_b in b.children {
        if let Some(&i) = index_by_name.get(&child_b.name) {
            merge_trees(&mut a.children[i], child_b);
        } else {
            index_by_name.insert(child_b.name.clone(), a.children.len());
            a.children.push(child_b);
        }
    }

    a.children.sort_by(|x, y| y.total.cmp(&x.total));
}

/// Visits descendants of `tree` looking for nodes of `target_kind`, without descending past any
/// compilation-stage node or `parse`/`instantiate` node (spec §4.7 stage extraction), merging each
/// match found into `accumulator`.
fn expand_and_merge_for_stage(accumulator: &mut Tree, tree: &Tree, target_kind: TreeKind) -> Result<()> {
    if tree.kind == target_kind {
        merge_trees(accumulator, tree.clone());
        return Ok(());
    }

    if tree.kind.is_compilation_stage() {
        return Ok(()); // a different stage, don't expand further
    }

    if tree.kind.is_node() {
        return Err(Error::SchemaMismatch {
            message: "tree expansion descended into a parse/instantiate node while looking for a compilation stage"
                .to_string(),
        });
    }

    for child in &tree.children {
        expand_and_merge_for_stage(accumulator, child, target_kind)?;
    }

    Ok(())
}

fn create_merged_tree_for_stage(tree: &Tree, target_kind: TreeKind) -> Result<Tree> {
    debug_assert!(target_kind.is_compilation_stage());
    let mut accumulator = Tree::new(target_kind, "");
    expand_and_merge_for_stage(&mut accumulator, tree, target_kind)?;
    Ok(accumulator)
}

/// Produces a [`MergeSummary`] containing one merged tree per compilation stage.
pub fn create_merge_summary(tree: &Tree) -> Result<MergeSummary> {
    let mut parsing = create_merged_tree_for_stage(tree, TreeKind::Parsing)
        .map_err(|e| e.context("could not merge parsing stage"))?;
    let mut instantiation = create_merged_tree_for_stage(tree, TreeKind::Instantiation)
        .map_err(|e| e.context("could not merge instantiation stage"))?;
    let mut llvm_codegen = create_merged_tree_for_stage(tree, TreeKind::LlvmCodegen)
        .map_err(|e| e.context("could not merge llvm_codegen stage"))?;
    let mut optimization = create_merged_tree_for_stage(tree, TreeKind::Optimization)
        .map_err(|e| e.context("could not merge optimization stage"))?;
    let mut native_codegen = create_merged_tree_for_stage(tree, TreeKind::NativeCodegen)
        .map_err(|e| e.context("could not merge native_codegen stage"))?;

    parsing.name = "Parsing".to_string();
    instantiation.name = "Template instantiation".to_string();
    llvm_codegen.name = "LLVM IR generation".to_string();
    optimization.name = "Optimization".to_string();
    native_codegen.name = "Machine code generation".to_string();

    let mut stages = Tree::new(TreeKind::TranslationUnit, "Compilation stages");
    stages.children = vec![parsing, instantiation, llvm_codegen, optimization, native_codegen];
    // Expected to land a bit below 100%: unattributed TU time isn't part of any stage.
    stages.sum_children_into_total();

    Ok(MergeSummary { stages })
}
