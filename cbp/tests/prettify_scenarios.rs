#![allow(clippy::unwrap_used)]
//! Table-driven prettifier expectations (concrete scenarios), following `ingredient-parser`'s
//! `#[rstest]`/`#[case::name(...)]` style for table-driven cases.

use cbp::prettify::full;
use rstest::rstest;

#[rstest]
#[case::collapses_basic_string(
    "std::basic_string<char, std::char_traits<char>, std::allocator<char>>",
    "std::string"
)]
#[case::collapses_nanosecond_duration(
    "std::chrono::duration<long long, std::nano>",
    "std::chrono::nanoseconds"
)]
#[case::strips_class_keyword_and_folds_brackets("class Foo<class Bar>", "Foo<Bar>")]
#[case::folds_doubled_closing_brackets_in_one_pass("X<Y<Z> >", "X<Y<Z>>")]
fn full_matches_expected_output(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(full(input).unwrap(), expected);
}
