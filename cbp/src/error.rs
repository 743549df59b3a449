//! Error taxonomy surfaced at every crate boundary.
//!
//! Each layer that re-throws wraps the causal error in [`Error::Context`] rather than discarding
//! it, so a terminated run can print the full chain (see `cbp-cli`'s error printing, which walks
//! `source()` innermost-first).

use std::path::PathBuf;

/// Result alias used throughout the crate, the same way `ingredient` exports `IngredientResult`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed trace: {message}")]
    MalformedTrace { message: String },

    #[error("could not analyze an empty trace{}", path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    EmptyTrace { path: Option<PathBuf> },

    #[error("incorrect trace schema: {message}")]
    SchemaMismatch { message: String },

    #[error("could not locate build manifest at {path}")]
    MissingManifest { path: PathBuf },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("self-similar replacement {{ {from:?} -> {to:?} }} would not terminate")]
    SelfSimilarReplacement { from: String, to: String },

    #[error("template replacement pattern {{ {from:?} }} does not end in '<'")]
    InvalidTemplatePattern { from: String },

    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Prepends additional context to an error as it ascends through a layer boundary, mirroring
    /// the original implementation's "each layer prepends its own context" policy (spec §7).
    pub fn context(self, message: impl Into<String>) -> Error {
        Error::Context {
            message: message.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait mirroring `anyhow::Context` but scoped to our own [`Error`] type, so call
/// sites can write `result.context("...")?` instead of manually matching and re-wrapping.
pub trait Context<T> {
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(message))
    }
}

/// Prints the full error chain, innermost cause last, one line per layer. Used by `cbp-cli` as
/// the single place a terminated run reports failure (spec §7).
pub fn render_chain(error: &Error) -> String {
    use std::error::Error as _;

    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        out.push_str("\ncaused by: ");
        out.push_str(&err.to_string());
        source = err.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_chain_renders_all_layers() {
        let base = Error::SchemaMismatch {
            message: "begin-end mismatch".into(),
        };
        let wrapped = base.context("could not build parsing subtree");
        let rendered = render_chain(&wrapped);
        assert!(rendered.contains("could not build parsing subtree"));
        assert!(rendered.contains("begin-end mismatch"));
    }
}
