//! Trace-to-tree analysis: event classification, the parsing/instantiation subtree builders, and
//! the translation-unit assembler with its reconciliation pass (spec §4.2–§4.5).
//!
//! The stack-of-open-scopes shape of [`build_parsing_subtree`] mirrors the `stack: Vec<TraceNode>`
//! + `attach_to_parent` idiom this crate's own parse-tracing module uses elsewhere in the corpus
//! this is grounded on: push a fresh node on "begin", pop and attach to the new top on "end".

use crate::error::{Error, Result};
use crate::time::Microseconds;
use crate::trace::Event;
use crate::tree::{Tree, TreeKind};

// --- Event classification (§4.2) ---

/// Partitions `events` in place: elements matching `predicate` are removed and returned, in their
/// original relative order; the rest remain in `events`, also in their original relative order.
/// Equivalent to the original's `extract_events`, built on a stable partition.
fn extract_events(events: &mut Vec<Event>, predicate: impl Fn(&Event) -> bool) -> Vec<Event> {
    let mut extracted = Vec::new();
    let mut remaining = Vec::with_capacity(events.len());
    for event in events.drain(..) {
        if predicate(&event) {
            extracted.push(event);
        } else {
            remaining.push(event);
        }
    }
    *events = remaining;
    extracted
}

fn extract_parsing_events(events: &mut Vec<Event>) -> Vec<Event> {
    extract_events(events, |e| e.name == "Source")
}

fn extract_instantiation_events(events: &mut Vec<Event>) -> Vec<Event> {
    // The pair {"InstantiateClass", "InstantiateFunction"} is the intended set (spec §9).
    extract_events(events, |e| e.name == "InstantiateClass" || e.name == "InstantiateFunction")
}

/// Removes and returns the first event named `name`, if any.
fn extract_event_by_name(events: &mut Vec<Event>, name: &str) -> Option<Event> {
    let index = events.iter().position(|e| e.name == name)?;
    Some(events.remove(index))
}

// --- Parsing subtree (§4.3) ---

fn is_parsing_begin(event: &Event) -> bool {
    event.name == "Source" && matches!(event.phase, crate::trace::Phase::Begin)
}

fn is_parsing_end(event: &Event) -> bool {
    event.name == "Source" && matches!(event.phase, crate::trace::Phase::End)
}

/// Builds the `parsing` node whose descendants mirror `#include` nesting, with early template
/// instantiation time subtracted into `carry` so the reconciliation pass attributes it to the
/// instantiation subtree instead (spec §4.3).
#[allow(clippy::expect_used)] // every expect() here is guarded by a `stack.len()` check just above it
fn build_parsing_subtree(parsing_events: Vec<Event>, instantiation_events: Vec<Event>) -> Result<Tree> {
    let mut events = parsing_events;
    events.extend(instantiation_events);
    events.sort_by(|a, b| a.time.cmp(&b.time)); // stable: ties keep relative input order

    let mut stack = vec![Tree::new(TreeKind::Parsing, "Parsing")];
    let mut last_instantiation_end = Microseconds::new(i64::MIN);

    for event in &events {
        if is_parsing_begin(event) {
            let mut node = Tree::new(TreeKind::Parse, event.detail()?);
            node.total = -event.time;
            stack.push(node);
        } else if is_parsing_end(event) {
            if stack.len() <= 1 {
                return Err(Error::SchemaMismatch {
                    message: "'Source' event begin-end mismatch".to_string(),
                });
            }
            let mut node = stack.pop().expect("checked len above");
            node.total += event.time;
            stack.last_mut().expect("checked len above").children.push(node);
        } else {
            // Instantiation event encountered while parsing.
            if event.time < last_instantiation_end {
                continue; // nested instantiation, already accounted for by its enclosing one
            }
            if stack.len() == 1 {
                continue; // not during parsing (no parent beyond the root)
            }
            let duration = event.required_duration()?;
            stack.last_mut().expect("len > 1").carry -= duration;
            last_instantiation_end = event.time + duration;
        }
    }

    if stack.len() != 1 {
        return Err(Error::SchemaMismatch {
            message: "'Source' event begin-end mismatch".to_string(),
        });
    }

    let mut root = stack.pop().expect("checked len == 1");
    root.sum_children_into_total();
    Ok(root)
}

// --- Instantiation subtree (§4.4) ---

fn build_instantiate_node(events: &[Event], cursor: &mut usize) -> Result<Tree> {
    let event = &events[*cursor];
    let duration = event.required_duration()?;
    let end_time = event.time + duration;

    let mut node = Tree::new(TreeKind::Instantiate, event.detail()?);
    node.total = duration;

    *cursor += 1;
    while *cursor < events.len() && events[*cursor].time < end_time {
        let child = build_instantiate_node(events, cursor)?;
        node.children.push(child);
    }

    Ok(node)
}

/// Builds the `instantiation` node: each complete event greedily absorbs subsequent events whose
/// interval it fully contains (spec §4.4).
fn build_instantiation_subtree(instantiation_events: &[Event]) -> Result<Tree> {
    let mut root = Tree::new(TreeKind::Instantiation, "Template instantiation");

    let mut cursor = 0;
    while cursor < instantiation_events.len() {
        let child = build_instantiate_node(instantiation_events, &mut cursor)?;
        root.children.push(child);
    }

    root.sum_children_into_total();
    Ok(root)
}

// --- Reconciliation (§4.5 step 4) ---

/// Depth-first post-order carry propagation. Returns the carry that should be added to the
/// parent's own carry, and leaves this node's carry at zero (spec §3: `carry == 0` post-pass).
fn reconcile(tree: &mut Tree) -> Microseconds {
    let mut children_carry = Microseconds::ZERO;
    let mut children_total = Microseconds::ZERO;

    for child in &mut tree.children {
        children_carry += reconcile(child);
        children_total += child.total;
    }

    tree.carry += children_carry;
    tree.total += tree.carry;
    tree.self_time = tree.total - children_total;

    if tree.kind != TreeKind::TranslationUnit {
        // Compilation-stage order must be preserved for TU children; every other parent sorts
        // descending by total, stably (spec §3 invariant 4).
        tree.children.sort_by(|a, b| b.total.cmp(&a.total));
    }

    std::mem::replace(&mut tree.carry, Microseconds::ZERO)
}

fn leaf(kind: TreeKind, name: &str, duration: Microseconds) -> Tree {
    let mut node = Tree::new(kind, name);
    node.total = duration;
    node.self_time = duration;
    node
}

// --- Translation-unit assembler (§4.5) ---

/// Analyzes a single trace's events into a `translation_unit` tree.
#[allow(clippy::expect_used)] // guarded by the is_empty() check just above
pub fn analyze_trace(mut events: Vec<Event>, name: impl Into<String>) -> Result<Tree> {
    if events.is_empty() {
        return Err(Error::EmptyTrace { path: None });
    }

    events.sort_by(|a, b| a.time.cmp(&b.time));

    let mut translation_unit = Tree::new(TreeKind::TranslationUnit, name);
    translation_unit.total = events.last().expect("non-empty").time - events.first().expect("non-empty").time;

    // Parsing & instantiation events can be interleaved, so both are extracted before either
    // subtree is built (spec §4.5 step 3).
    let parsing_events = extract_parsing_events(&mut events);
    let instantiation_events = extract_instantiation_events(&mut events);

    if !parsing_events.is_empty() {
        let parsing_subtree = build_parsing_subtree(parsing_events, instantiation_events.clone())?;
        translation_unit.children.push(parsing_subtree);
    }

    if !instantiation_events.is_empty() {
        let instantiation_subtree = build_instantiation_subtree(&instantiation_events)?;
        translation_unit.children.push(instantiation_subtree);
    }

    // The trace emits two "Frontend" complete events: the first summarizes parsing +
    // instantiation (already decomposed above, so it is discarded to avoid double-counting); the
    // second covers IR generation, which has no finer-grained events (spec §4.2).
    let _first_frontend = extract_event_by_name(&mut events, "Frontend");

    if let Some(event) = extract_event_by_name(&mut events, "Frontend") {
        translation_unit
            .children
            .push(leaf(TreeKind::LlvmCodegen, "LLVM IR generation", event.required_duration()?));
    }

    if let Some(event) = extract_event_by_name(&mut events, "Total Optimizer") {
        translation_unit
            .children
            .push(leaf(TreeKind::Optimization, "Optimization", event.required_duration()?));
    }

    if let Some(event) = extract_event_by_name(&mut events, "Total CodeGenPasses") {
        translation_unit.children.push(leaf(
            TreeKind::NativeCodegen,
            "Machine code generation",
            event.required_duration()?,
        ));
    }

    let root_carry = reconcile(&mut translation_unit);
    // Cancel out the upwards carry: whatever duration can't be attributed to anything else stays
    // with the translation unit rather than inflating it twice (spec §4.5 step 5).
    translation_unit.total -= root_carry;
    translation_unit.self_time -= root_carry;

    Ok(translation_unit)
}
