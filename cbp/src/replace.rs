//! Substring & regex replacement primitives used by the prettifier (spec §4.8). Kept as small,
//! mostly-literal operations rather than one general-purpose regex pipeline, since large anchored
//! regexes are slower than literal substring search for the patterns the prettifier needs
//! (spec §9: "prefers literal substring search where possible").

use regex::Regex;

use crate::error::{Error, Result};

/// Replaces every non-overlapping occurrence of `from` with `to`, advancing past each
/// replacement.
pub fn replace_all(text: &mut String, from: &str, to: &str) {
    if from.is_empty() {
        return;
    }
    let mut start = 0;
    while let Some(pos) = text[start..].find(from) {
        let at = start + pos;
        text.replace_range(at..at + from.len(), to);
        start = at + to.len();
    }
}

/// Replaces every regex match with `to`.
pub fn replace_all_regex(text: &mut String, pattern: &Regex, to: &str) {
    if pattern.is_match(text) {
        *text = pattern.replace_all(text, to).into_owned();
    }
}

/// Iteratively replaces `from` with `to`, advancing by only one byte past each replacement
/// instead of past the whole replaced region, so that a replacement which creates a new match is
/// caught in the same pass — e.g. folding `"> > >"` into `">>>"` via repeated `"> >"` -> `">>"`.
///
/// Rejects configurations where dropping `to`'s first character still leaves `from` somewhere
/// inside it: such a pair reproduces `from` one byte after the replacement point no matter what
/// follows, looping forever (e.g. `from = "123"`, `to = "0123"`: after replacing, the very next
/// search position lands on `to`'s `"123"` tail, matching `from` again).
pub fn replace_all_dynamically(text: &mut String, from: &str, to: &str) -> Result<()> {
    if from.is_empty() {
        return Ok(());
    }
    let to_tail: String = to.chars().skip(1).collect();
    if !to_tail.is_empty() && to_tail.contains(from) {
        return Err(Error::SelfSimilarReplacement {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let mut start = 0;
    while let Some(pos) = text[start..].find(from) {
        let at = start + pos;
        text.replace_range(at..at + from.len(), to);
        start = at + 1; // do NOT step over the whole replaced region
    }

    Ok(())
}

/// Replaces `from` (which must end in `<`) together with everything up to its matching `>`,
/// tracking angle-bracket depth. Used for template-aware argument removal (spec §4.8 phase 3).
pub fn replace_all_template(text: &mut String, from: &str, to: &str) -> Result<()> {
    if !from.ends_with('<') {
        return Err(Error::InvalidTemplatePattern { from: from.to_string() });
    }

    let mut start = 0;
    while let Some(pos) = text[start..].find(from) {
        let match_start = start + pos;
        let mut match_end = match_start + from.len();
        let mut depth: i32 = 1;

        let bytes = text.as_bytes();
        while match_end < bytes.len() && depth > 0 {
            match bytes[match_end] {
                b'<' => depth += 1,
                b'>' => depth -= 1,
                _ => {}
            }
            match_end += 1;
        }

        text.replace_range(match_start..match_end, to);
        start = match_start + to.len();
    }

    Ok(())
}

/// Removes a literal prefix, if present.
pub fn replace_prefix(text: &mut String, from: &str, to: &str) {
    if let Some(rest) = text.strip_prefix(from) {
        *text = format!("{to}{rest}");
    }
}

/// Removes a literal suffix, if present.
pub fn replace_suffix(text: &mut String, from: &str, to: &str) {
    if let Some(rest) = text.strip_suffix(from) {
        *text = format!("{rest}{to}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_all_dynamically_folds_repeated_angle_brackets() {
        let mut s = "X<Y<Z> > >".to_string();
        replace_all_dynamically(&mut s, "> >", ">>").unwrap();
        assert_eq!(s, "X<Y<Z>>>");
    }

    #[test]
    fn replace_all_dynamically_rejects_self_similar_patterns() {
        let mut s = "123".to_string();
        let err = replace_all_dynamically(&mut s, "123", "0123").unwrap_err();
        assert!(matches!(err, Error::SelfSimilarReplacement { .. }));
    }

    #[test]
    fn replace_all_template_tracks_nesting_depth() {
        let mut s = "std::vector<std::pair<int, int>, std::allocator<std::pair<int, int>>>".to_string();
        replace_all_template(&mut s, ", std::allocator<", "").unwrap();
        assert_eq!(s, "std::vector<std::pair<int, int>>");
    }

    #[test]
    fn replace_all_template_requires_trailing_angle_bracket() {
        let mut s = "whatever".to_string();
        let err = replace_all_template(&mut s, "std::allocator", "").unwrap_err();
        assert!(matches!(err, Error::InvalidTemplatePattern { .. }));
    }

    #[test]
    fn replace_prefix_and_suffix_are_literal() {
        let mut s = "build/main.cpp.json".to_string();
        replace_prefix(&mut s, "build/", "");
        replace_suffix(&mut s, ".json", "");
        assert_eq!(s, "main.cpp");
    }
}
