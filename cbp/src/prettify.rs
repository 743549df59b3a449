//! Four-phase identifier prettifier: normalize, deobfuscate, collapse, shorten (spec §4.8).
//!
//! Ported from the original project's `prettify.cpp`, which in turn credits cpptrace's identifier
//! cleanup as a starting point before extending the replacement rules and simplifying the regex
//! (large anchored regexes are slower than literal substring search for most of these patterns).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::filepath::normalize_filepath;
use crate::replace::{replace_all, replace_all_dynamically, replace_all_regex, replace_all_template};

static CLASS_OR_STRUCT: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)] // pattern is a compile-time constant
    Regex::new(r"\b(class|struct)\s+").expect("invalid class/struct regex")
});
static OBFUSCATED_STD_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"std(::_[a-zA-Z0-9_]+)?::").expect("invalid std-namespace regex")
});
static ABI_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\[abi:[a-zA-Z0-9]+\]").expect("invalid abi-suffix regex")
});

/// Phase 1: folds cross-compiler formatting quirks (angle-bracket spacing, pointer/comma spacing,
/// `class`/`struct` keywords, MSVC's anonymous-namespace spelling) into one shared form.
pub fn normalize(identifier: &str) -> Result<String> {
    let mut s = identifier.to_string();

    replace_all_dynamically(&mut s, "> >", ">>")?;

    replace_all(&mut s, " *", "*");
    replace_all(&mut s, " &", "&");

    // left-trim, right-trim, then re-add the canonical right-hand space.
    replace_all(&mut s, " ,", ",");
    replace_all(&mut s, ", ", ",");
    replace_all(&mut s, ",", ", ");

    replace_all_regex(&mut s, &CLASS_OR_STRUCT, "");

    replace_all(&mut s, "`anonymous namespace'", "(anonymous namespace)");

    Ok(s)
}

/// Phase 2: strips implementation-specific obfuscation (inline namespace mangling, ABI tags) that
/// differs across standard library vendors but carries no information for a reader.
pub fn deobfuscate(identifier: &str) -> Result<String> {
    let mut s = identifier.to_string();
    replace_all_regex(&mut s, &OBFUSCATED_STD_NAMESPACE, "std::");
    replace_all_regex(&mut s, &ABI_SUFFIX, "");
    Ok(s)
}

/// Phase 3: collapses verbose template instantiations down to their familiar typedef'd names.
pub fn collapse(identifier: &str) -> Result<String> {
    let mut s = identifier.to_string();

    // Lossy but overwhelmingly the common case: explicit non-default allocators/deleters/traits
    // lack the leading comma this pattern requires, so they survive untouched.
    replace_all_template(&mut s, ", std::allocator<", "")?;
    replace_all_template(&mut s, ", std::default_delete<", "")?;
    replace_all_template(&mut s, ", std::char_traits<", "")?;

    collapse_string(&mut s);
    collapse_regex(&mut s);
    collapse_ratio(&mut s); // must run before collapse_chrono
    collapse_chrono(&mut s);
    collapse_format(&mut s);
    collapse_iostream(&mut s);

    Ok(s)
}

fn collapse_string(s: &mut String) {
    replace_all(s, "std::basic_string<char>", "std::string");
    replace_all(s, "std::basic_string<wchar_t>", "std::wstring");
    replace_all(s, "std::basic_string<char8_t>", "std::u8string");
    replace_all(s, "std::basic_string<char16_t>", "std::u16string");
    replace_all(s, "std::basic_string<char32_t>", "std::u32string");
    replace_all(s, "std::basic_string_view<char>", "std::string_view");
    replace_all(s, "std::basic_string_view<wchar_t>", "std::wstring_view");
    replace_all(s, "std::basic_string_view<char8_t>", "std::u8string_view");
    replace_all(s, "std::basic_string_view<char16_t>", "std::u16string_view");
    replace_all(s, "std::basic_string_view<char32_t>", "std::u32string_view");
}

fn collapse_regex(s: &mut String) {
    replace_all(s, "std::basic_regex<char>", "std::regex");
    replace_all(s, "std::basic_regex<wchar_t>", "std::wregex");
}

fn collapse_ratio(s: &mut String) {
    replace_all(s, "std::ratio<1, 1000000000000>", "std::pico");
    replace_all(s, "std::ratio<1, 1000000000>", "std::nano");
    replace_all(s, "std::ratio<1, 1000000>", "std::micro");
    replace_all(s, "std::ratio<1, 1000>", "std::milli");
    replace_all(s, "std::ratio<1000, 1>", "std::kilo");
    replace_all(s, "std::ratio<1000000, 1>", "std::mega");
    replace_all(s, "std::ratio<1000000000, 1>", "std::giga");
    replace_all(s, "std::ratio<1000000000000, 1>", "std::tera");
}

fn collapse_chrono(s: &mut String) {
    // LLVM-internal typedefs that would otherwise block the duration collapse below.
    for unit in [
        "nanoseconds",
        "microseconds",
        "milliseconds",
        "seconds",
        "minutes",
        "hours",
        "days",
        "weeks",
        "months",
        "years",
    ] {
        replace_all(s, &format!("std::chrono:{unit}::duration"), "std::chrono::duration");
    }

    replace_all(s, "std::chrono::duration<long long, std::nano>", "std::chrono::nanoseconds");
    replace_all(s, "std::chrono::duration<long long, std::micro>", "std::chrono::microseconds");
    replace_all(s, "std::chrono::duration<long long, std::milli>", "std::chrono::milliseconds");
    replace_all(s, "std::chrono::duration<long long>", "std::chrono::seconds");
    replace_all(s, "std::chrono::duration<long, std::ratio<60>>", "std::chrono::minutes");
    replace_all(s, "std::chrono::duration<long, std::ratio<3600>>", "std::chrono::hours");
    replace_all(s, "std::chrono::duration<int, std::ratio<86400>>", "std::chrono::days");
    replace_all(s, "std::chrono::duration<int, std::ratio<604800>>", "std::chrono::weeks");
    replace_all(s, "std::chrono::duration<int, std::ratio<2629746>>", "std::chrono::months");
    replace_all(s, "std::chrono::duration<int, std::ratio<31556952>>", "std::chrono::years");
}

fn collapse_format(s: &mut String) {
    replace_all(s, "std::basic_format_string<char>", "std::format_string");
    replace_all(s, "std::basic_format_parse_context<char>", "std::format_parse_context");
    replace_all(s, "std::basic_format_args<std::format_context>", "std::format_args");
    // TODO(prettify): some format templates need non-trivial work to simplify further.
}

fn collapse_iostream(s: &mut String) {
    replace_all(s, "std::basic_ifstream<char>", "std::ifstream");
    replace_all(s, "std::basic_ifstream<wchar_t>", "std::wifstream");
    replace_all(s, "std::basic_ofstream<char>", "std::ofstream");
    replace_all(s, "std::basic_ofstream<wchar_t>", "std::wofstream");
    replace_all(s, "std::basic_fstream<char>", "std::fstream");
    replace_all(s, "std::basic_fstream<wchar_t>", "std::wfstream");
    replace_all(s, "std::basic_filebuf<char>", "std::filebuf");
    replace_all(s, "std::basic_filebuf<wchar_t>", "std::wfilebuf");
    replace_all(s, "std::basic_istream<char>", "std::istream");
    replace_all(s, "std::basic_istream<wchar_t>", "std::wistream");
    replace_all(s, "std::basic_ostream<char>", "std::ostream");
    replace_all(s, "std::basic_ostream<wchar_t>", "std::wostream");
    replace_all(s, "std::basic_istringstream<char>", "std::istringstream");
    replace_all(s, "std::basic_istringstream<wchar_t>", "std::wistringstream");
    replace_all(s, "std::basic_ostringstream<char>", "std::ostringstream");
    replace_all(s, "std::basic_ostringstream<wchar_t>", "std::wostringstream");
    replace_all(s, "std::basic_stringstream<char>", "std::stringstream");
    replace_all(s, "std::basic_stringstream<wchar_t>", "std::wstringstream");
    replace_all(s, "std::basic_stringbuf<char>", "std::stringbuf");
    replace_all(s, "std::basic_stringbuf<wchar_t>", "std::wstringbuf");
}

/// Phase 4: shortens verbose-but-equivalent spellings (transparent functor specializations,
/// lambda closure paths) for display.
pub fn shorten(identifier: &str) -> Result<String> {
    let mut s = identifier.to_string();
    shorten_transparent_functors(&mut s);
    shorten_lambda_paths(&mut s);
    Ok(s)
}

fn shorten_transparent_functors(s: &mut String) {
    // 'void' is the default template argument here, so it's safe to drop.
    for name in [
        "plus",
        "minus",
        "multiplies",
        "divides",
        "modulus",
        "negate",
        "equal_to",
        "not_equal_to",
        "greater",
        "less",
        "greater_equal",
        "less_equal",
    ] {
        replace_all(s, &format!("std::{name}<void>"), &format!("std::{name}<>"));
    }
}

fn shorten_lambda_paths(s: &mut String) {
    const MATCH: &str = "(lambda at ";
    let mut i = 0;
    while let Some(pos) = s[i..].find(MATCH) {
        let path_begin = i + pos + MATCH.len();
        let Some(colon_offset) = s[path_begin..].find(':') else {
            return; // path doesn't terminate, leave it as is
        };
        let path_end = path_begin + colon_offset;
        let normalized = normalize_filepath(&s[path_begin..path_end]);
        s.replace_range(path_begin..path_end, &normalized);
        i = path_begin + normalized.len();
    }
}

/// Runs all four phases in the order the prettifier requires: normalize, deobfuscate, collapse,
/// then shorten.
pub fn full(identifier: &str) -> Result<String> {
    tracing::trace!(identifier, "prettifying identifier");
    let s = normalize(identifier)?;
    let s = deobfuscate(&s)?;
    let s = collapse(&s)?;
    let s = shorten(&s)?;
    tracing::trace!(result = %s, "prettified identifier");
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_brackets_and_strips_class_keyword() {
        let out = normalize("class Foo<class Bar>").unwrap();
        assert_eq!(out, "Foo<Bar>");
    }

    #[test]
    fn normalize_is_idempotent_on_already_clean_input() {
        let out = normalize("std::vector<int>").unwrap();
        assert_eq!(out, "std::vector<int>");
    }

    #[test]
    fn deobfuscate_strips_inline_namespace_and_abi_tag() {
        let out = deobfuscate("std::__cxx11::basic_string<char>[abi:ne210103]").unwrap();
        assert_eq!(out, "std::basic_string<char>");
    }

    #[test]
    fn collapse_maps_basic_string_to_string() {
        let out = collapse("std::basic_string<char, std::char_traits<char>, std::allocator<char>>").unwrap();
        assert_eq!(out, "std::string");
    }

    #[test]
    fn collapse_maps_ratio_before_duration() {
        let out = collapse("std::chrono::duration<long long, std::nano>").unwrap();
        assert_eq!(out, "std::chrono::nanoseconds");
    }

    #[test]
    fn shorten_collapses_transparent_less() {
        let out = shorten("std::less<void>").unwrap();
        assert_eq!(out, "std::less<>");
    }

    #[test]
    fn shorten_normalizes_lambda_path() {
        let out = shorten("(lambda at /usr/lib/llvm-21/bin/../include/foo.hpp:12:5)").unwrap();
        assert_eq!(out, "(lambda at /usr/lib/llvm-21/include/foo.hpp:12:5)");
    }

    #[test]
    fn full_runs_every_phase_in_order() {
        let out = full(
            "class std::__cxx11::basic_string<char, class std::char_traits<char>, class std::allocator<char>>",
        )
        .unwrap();
        assert_eq!(out, "std::string");
    }

    #[test]
    fn full_is_a_noop_on_identifiers_without_angle_brackets() {
        let out = full("main").unwrap();
        assert_eq!(out, "main");
    }

    #[test]
    fn full_is_idempotent() {
        let once = full("std::vector<std::pair<int, int>, std::allocator<std::pair<int, int>>>").unwrap();
        let twice = full(&once).unwrap();
        assert_eq!(once, twice);
    }
}
