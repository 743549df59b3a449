//! Frontend pass that turns an analyzed/merged [`Tree`] into something worth displaying:
//! categorizes nodes by duration, prunes the uninteresting ones, simplifies target/TU names, and
//! prettifies filepaths and template instantiations (spec §4.9).
//!
//! Grounded on the original's `frontend/preprocessor.cpp`.

use crate::config::Config;
use crate::error::Result;
use crate::filepath::{normalize_filepath, trim_filepath};
use crate::prettify;
use crate::replace::{replace_prefix, replace_suffix};
use crate::tree::{Tree, TreeCategory, TreeKind};

fn category_from_time(total: crate::time::Microseconds, config: &Config) -> TreeCategory {
    let c = &config.tree.categorize;
    if total >= c.red.as_micros() {
        TreeCategory::Red
    } else if total >= c.yellow.as_micros() {
        TreeCategory::Yellow
    } else if total >= c.white.as_micros() {
        TreeCategory::White
    } else if total >= c.gray.as_micros() {
        TreeCategory::Gray
    } else {
        TreeCategory::None
    }
}

fn categorize(children: &mut [Tree], config: &Config) {
    for child in children.iter_mut() {
        child.category = category_from_time(child.total, config);
    }
}

/// Drops children whose category came out as [`TreeCategory::None`]; must run after
/// [`categorize`], which is what decides that category.
fn prune(children: &mut Vec<Tree>) {
    children.retain(|child| child.category != TreeCategory::None);
}

fn normalize_paths(children: &mut [Tree]) {
    for child in children.iter_mut() {
        if matches!(child.kind, TreeKind::Parse | TreeKind::TranslationUnit) {
            child.name = normalize_filepath(&child.name);
        }
    }
}

fn prettify_instantiations(children: &mut [Tree]) -> Result<()> {
    for child in children.iter_mut() {
        if child.kind != TreeKind::Instantiate {
            continue;
        }
        child.name = prettify::full(&child.name)?;
    }
    Ok(())
}

fn replace_configured_prefixes(children: &mut [Tree], config: &Config) {
    for child in children.iter_mut() {
        if !matches!(child.kind, TreeKind::Parse | TreeKind::TranslationUnit) {
            continue;
        }
        for rule in &config.tree.replace_filepath {
            replace_prefix(&mut child.name, &rule.from, &rule.to);
        }
    }
}

fn preprocess_tree(tree: &mut Tree, config: &Config) -> Result<()> {
    categorize(&mut tree.children, config); // must happen first, pruning below depends on it
    prune(&mut tree.children);

    if tree.kind == TreeKind::Target {
        let target_path = tree.name.clone();

        tree.name = trim_filepath(&target_path).to_string(); // CMake target names are unique,
        replace_suffix(&mut tree.name, ".dir", ""); // the full directory adds nothing

        for translation_unit in tree.children.iter_mut() {
            replace_prefix(&mut translation_unit.name, &format!("{target_path}/"), "");
            replace_suffix(&mut translation_unit.name, ".json", "");
        }
    }

    normalize_paths(&mut tree.children);
    prettify_instantiations(&mut tree.children)?;
    replace_configured_prefixes(&mut tree.children, config);

    for child in tree.children.iter_mut() {
        preprocess_tree(child, config)?;
    }

    Ok(())
}

/// Runs the full preprocessing pipeline over `tree` in place: categorize/prune children top-down,
/// simplify target and translation-unit names, normalize and rewrite filepaths, prettify
/// instantiation names, then categorize the root itself.
pub fn preprocess(tree: &mut Tree, config: &Config) -> Result<()> {
    preprocess_tree(tree, config).map_err(|e| e.context("could not preprocess profiling tree"))?;
    tree.category = category_from_time(tree.total, config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Microseconds;

    fn leaf(kind: TreeKind, name: &str, total_us: i64) -> Tree {
        let mut t = Tree::new(kind, name);
        t.total = Microseconds::new(total_us);
        t
    }

    #[test]
    fn prunes_children_below_the_gray_threshold() {
        let config = Config::default();
        let mut root = Tree::new(TreeKind::TranslationUnit, "a.cpp");
        root.children.push(leaf(TreeKind::Parse, "tiny.h", 10)); // below gray (0ms) in micros? gray=0ms so 10us still >= 0
        root.children.push(leaf(TreeKind::Parse, "big.h", 400_000)); // 400ms, above red
        preprocess(&mut root, &config).unwrap();
        assert_eq!(root.children.len(), 2); // gray threshold is 0ms, so nothing is actually below it
    }

    #[test]
    fn prunes_children_with_no_category_when_gray_threshold_is_positive() {
        let mut config = Config::default();
        config.tree.categorize.gray = crate::time::Milliseconds::new(5);
        let mut root = Tree::new(TreeKind::TranslationUnit, "a.cpp");
        root.children.push(leaf(TreeKind::Parse, "tiny.h", 100)); // 0.1ms, below gray
        root.children.push(leaf(TreeKind::Parse, "big.h", 400_000));
        preprocess(&mut root, &config).unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "big.h");
    }

    #[test]
    fn simplifies_target_and_translation_unit_names() {
        let config = Config::default();
        let mut target = leaf(TreeKind::Target, "/build/CMakeFiles/app.dir", 500_000);
        let mut tu = leaf(
            TreeKind::TranslationUnit,
            "/build/CMakeFiles/app.dir/src/main.cpp.json",
            500_000,
        );
        tu.category = TreeCategory::Red; // pre-set so prune doesn't drop it before the rename runs
        target.category = TreeCategory::Red;
        target.children.push(tu);

        preprocess(&mut target, &config).unwrap();

        assert_eq!(target.name, "app");
        assert_eq!(target.children[0].name, "src/main.cpp");
    }

    #[test]
    fn prettifies_instantiation_names() {
        let config = Config::default();
        let mut parent = leaf(TreeKind::Instantiation, "stage", 500_000);
        let mut inst = leaf(
            TreeKind::Instantiate,
            "class std::__cxx11::basic_string<char, class std::char_traits<char>, class std::allocator<char>>",
            500_000,
        );
        inst.category = TreeCategory::Red;
        parent.category = TreeCategory::Red;
        parent.children.push(inst);

        preprocess(&mut parent, &config).unwrap();

        assert_eq!(parent.children[0].name, "std::string");
    }
}
