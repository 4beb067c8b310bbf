//! Natural ("human") ordering of file and title names.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::cmp::Ordering;

/// Splits a name into alternating runs of digits and non-digits.
static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+|\D+").expect("valid regex"));

/// A single comparable run inside a name.
#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Number(&'a str),
    Text(String),
}

fn tokenize(s: &str) -> Vec<Token<'_>> {
    TOKEN_REGEX
        .find_iter(s)
        .map(|m| {
            let run = m.as_str();
            if run.as_bytes()[0].is_ascii_digit() {
                Token::Number(run)
            } else {
                Token::Text(run.to_lowercase())
            }
        })
        .collect()
}

/// Compares two digit runs by numeric value without parsing, so runs longer
/// than any integer type still order correctly.
fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
}

/// Compares two names in natural order.
///
/// Digit runs compare by numeric value (`page2 < page10`) and text runs
/// compare case-insensitively. Names that are equal under those rules fall
/// back to plain byte order so the result is a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = tokenize(a);
    let right = tokenize(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ordering = match (l, r) {
            (Token::Number(x), Token::Number(y)) => compare_numbers(x, y),
            (Token::Number(x), Token::Text(y)) => (*x).cmp(y.as_str()),
            (Token::Text(x), Token::Number(y)) => x.as_str().cmp(*y),
            (Token::Text(x), Token::Text(y)) => x.cmp(y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

/// Sorts a slice of strings in natural order.
pub fn natural_sort<S: AsRef<str>>(items: &mut [S]) {
    items.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}
