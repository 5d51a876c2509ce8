//! Free-text search sanitizer.
//!
//! Search terms are spliced into `col.op.value,col.op.value` filter
//! expressions, which have no escaping. The sanitizer removes every character
//! and operator token that could close the clause or start a new one.

use std::fmt;

/// Operator names of the filter expression grammar.
const OPERATORS: &[&str] = &[
    "eq", "neq", "gt", "gte", "lt", "lte", "like", "ilike", "match", "imatch", "in", "is", "isdistinct", "fts",
    "plfts", "phfts", "wfts", "cs", "cd", "ov", "sl", "sr", "nxr", "nxl", "adj", "not", "or", "and", "all", "any",
];

const STRIPPED_CHARS: &[char] = &['\\', '(', ')', ',', '%'];

/// Search text that has been through [`sanitize_search_text`]. Search helpers
/// only accept this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSearch(String);

impl SanitizedSearch {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SanitizedSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn sanitize_search_text(text: &str) -> SanitizedSearch {
    SanitizedSearch(sanitize(text))
}

/// Strip grammar characters and `.<operator>.` tokens, then trim. Repeated
/// until nothing changes, so removing one token cannot expose another.
pub fn sanitize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn sanitize_once(text: &str) -> String {
    let without_chars: String = text.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    strip_operator_tokens(&without_chars).trim().to_string()
}

/// Remove `.op.` for every known operator, case-insensitively.
fn strip_operator_tokens(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '.' {
            if let Some(len) = operator_token_len(&chars[i..]) {
                i += len;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Length of the `.op.` token at the start of `chars`, if there is one.
fn operator_token_len(chars: &[char]) -> Option<usize> {
    let end = chars.iter().skip(1).position(|c| *c == '.')? + 1;
    let word: String = chars[1..end].iter().collect::<String>().to_ascii_lowercase();
    if OPERATORS.contains(&word.as_str()) {
        Some(end + 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::expression;

    #[test]
    fn strips_grammar_characters() {
        assert_eq!(sanitize("test),full_name.eq.admin"), "testfull_nameadmin");
        assert_eq!(sanitize("50% off (today)"), "50 off today");
        assert_eq!(sanitize("a\\b"), "ab");
    }

    #[test]
    fn strips_operators_case_insensitively() {
        assert_eq!(sanitize("x.ILIKE.y"), "xy");
        assert_eq!(sanitize("name.not.is.null"), "nameis.null");
        assert_eq!(sanitize("jane.doe@zoo.example"), "jane.doe@zoo.example");
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "");
        assert!(sanitize_search_text(" (),% ").is_empty());
    }

    #[test]
    fn is_idempotent() {
        let inputs = [
            "test),full_name.eq.admin",
            "a..eq.eq.b",
            ".e.eq.q.",
            " x.or.(y,z) ",
            "%%\\\\((",
            "plain text",
            "a.in.b.is.c",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn generated_inputs_reach_a_clean_fixed_point() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        const FRAGMENTS: &[&str] = &[
            "\\", "(", ")", ",", "%", ".", "..", " ", "eq", "EQ", "ilike", "not", "is", "or", "in", "null", "a",
            "name", "x@y", "full_name",
        ];
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..5000 {
            let parts = rng.gen_range(0..12);
            let input: String = (0..parts).map(|_| FRAGMENTS[rng.gen_range(0..FRAGMENTS.len())]).collect();
            let once = sanitize(&input);

            assert_eq!(sanitize(&once), once, "input {:?}", input);
            assert!(!once.contains(STRIPPED_CHARS), "input {:?} -> {:?}", input, once);
            let lower = once.to_ascii_lowercase();
            for op in OPERATORS {
                assert!(!lower.contains(&format!(".{}.", op)), "input {:?} -> {:?}", input, once);
            }
            assert_eq!(once.trim(), once);
        }
    }

    #[test]
    fn sanitized_term_cannot_add_clauses() {
        let term = sanitize_search_text("test),full_name.eq.admin");
        let expr = format!("full_name.ilike.%{}%,email.ilike.%{}%", term, term);
        let clauses = expression::parse(&expr).unwrap();
        assert_eq!(clauses.len(), 2);
        assert!(clauses.iter().all(|c| c.column == "full_name" || c.column == "email"));
    }
}
