//! JSON report output. Grounded on the original's `frontend/json.cpp`, minus the on-disk
//! `.cbp/profiling.json` artifact directory — here the report goes straight to stdout, which
//! fits a CLI better than writing to a fixed relative path the caller doesn't control.

use cbp::Tree;

/// Prints `tree` to stdout as pretty-printed JSON.
pub fn print(tree: &Tree) {
    match serde_json::to_string_pretty(tree) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("could not serialize tree to JSON: {e}"),
    }
}
