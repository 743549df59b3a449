//! Colored, indented tree printer. Grounded on the original's `frontend/terminal.cpp`.

use owo_colors::{OwoColorize, Style};

use cbp::time::Microseconds;
use cbp::{Tree, TreeCategory};

const MAX_NAME_WIDTH: usize = 117;

fn style_for(category: TreeCategory) -> Style {
    match category {
        TreeCategory::Red => Style::new().red(),
        TreeCategory::Yellow => Style::new().yellow(),
        TreeCategory::White => Style::new().white(),
        TreeCategory::Gray | TreeCategory::None => Style::new().bright_black(),
    }
}

fn to_ms(us: Microseconds) -> f64 {
    us.0 as f64 / 1000.0
}

fn to_percentage(us: Microseconds, timeframe: Microseconds) -> f64 {
    if timeframe.0 == 0 {
        0.0
    } else {
        100.0 * (us.0 as f64) / (timeframe.0 as f64)
    }
}

fn truncated_name(name: &str) -> String {
    if name.chars().count() < MAX_NAME_WIDTH {
        name.to_string()
    } else {
        let prefix: String = name.chars().take(MAX_NAME_WIDTH).collect();
        format!("{prefix}...")
    }
}

fn serialize(out: &mut String, tree: &Tree, depth: usize, timeframe: Microseconds) {
    let indent = "|  ".repeat(depth);
    let style = style_for(tree.category);

    let abs_total = to_ms(tree.total);
    let abs_self = to_ms(tree.self_time);
    let rel_total = to_percentage(tree.total, timeframe);
    let rel_self = to_percentage(tree.self_time, timeframe);
    let name = truncated_name(&tree.name);

    out.push_str(&format!(
        "{}{}\n",
        indent.bright_black(),
        format!("> {name} ({abs_total:.0} ms, {rel_total:.2}%) | self ({abs_self:.0} ms, {rel_self:.2}%)")
            .style(style)
    ));

    for child in &tree.children {
        serialize(out, child, depth + 1, timeframe);
    }
}

/// Prints `tree` to stdout as an indented, color-coded report.
pub fn print(tree: &Tree) {
    let mut out = String::new();
    serialize(&mut out, tree, 0, tree.total);
    println!("{out}");
}
