//! Identifier normalization.
//!
//! [`normalize`] turns arbitrary text (file names, sheet names, column headers) into a
//! deterministic identifier that is safe as a file name, a table name and a column name.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::{DatabaseError, DatabaseResult};
use crate::types::TableSet;

/// Turkish letters and their ASCII replacements.
const TRANSLITERATION: [(char, char); 12] = [
    ('ı', 'i'),
    ('İ', 'I'),
    ('ğ', 'g'),
    ('Ğ', 'G'),
    ('ü', 'u'),
    ('Ü', 'U'),
    ('ş', 's'),
    ('Ş', 'S'),
    ('ö', 'o'),
    ('Ö', 'O'),
    ('ç', 'c'),
    ('Ç', 'C'),
];

/// Normalize `text` into a lowercase `[a-z0-9_]` identifier.
///
/// Steps, in order:
///
/// - a `.` anywhere but the first position starts an extension; it and everything after it
///   are dropped
/// - remaining dots become `_`
/// - Turkish letters are transliterated, then everything is lowercased
/// - every other character outside `[a-z0-9_]` becomes `_`
/// - runs of `_` collapse and leading/trailing `_` are trimmed
/// - a leading digit gets a `col_` prefix
///
/// ```rust
/// use data_import::naming::normalize;
///
/// assert_eq!(normalize("Test@Special#Characters!"), "test_special_characters");
/// assert_eq!(normalize("test.file.csv"), "test");
/// assert_eq!(normalize("123test"), "col_123test");
/// ```
pub fn normalize(text: &str) -> String {
    let base = match text.find('.') {
        Some(idx) if idx > 0 => &text[..idx],
        _ => text,
    };

    let mut out = String::with_capacity(base.len());
    for ch in base.chars() {
        let ch = transliterate(ch);
        for lower in ch.to_lowercase() {
            let safe = if lower.is_ascii_lowercase() || lower.is_ascii_digit() {
                lower
            } else {
                '_'
            };
            if safe == '_' && out.ends_with('_') {
                continue;
            }
            out.push(safe);
        }
    }

    let trimmed = out.trim_matches('_');
    match trimmed.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("col_{trimmed}"),
        _ => trimmed.to_string(),
    }
}

fn transliterate(ch: char) -> char {
    TRANSLITERATION
        .iter()
        .find(|(from, _)| *from == ch)
        .map_or(ch, |(_, to)| *to)
}

/// Returns `true` if `name` is already a well-formed identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    identifier_violation(name).is_none()
}

/// Allow-list check applied right before a name is written into SQL text.
pub fn validate_identifier(name: &str) -> DatabaseResult<&str> {
    match identifier_violation(name) {
        None => Ok(name),
        Some(reason) => Err(DatabaseError::InvalidIdentifier {
            name: name.to_string(),
            reason,
        }),
    }
}

/// Double-quote an identifier for SQL text.
///
/// Only meant for names that passed [`validate_identifier`]: they are lowercase
/// `[a-z0-9_]`, so the quoted form names the same relation as the bare one while reserved
/// words (`order`, `user`, ...) stay usable.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{name}\"")
}

fn identifier_violation(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("empty after normalization");
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
    {
        return Some("characters outside [a-z0-9_]");
    }
    if name.as_bytes()[0].is_ascii_digit() {
        return Some("starts with a digit");
    }
    if name.starts_with('_') || name.ends_with('_') {
        return Some("leading or trailing underscore");
    }
    if name.contains("__") {
        return Some("repeated underscore");
    }
    None
}

/// Hands out unique names within one scope (the tables of a run, or the columns of a table).
///
/// A name that is already taken gets the first free `_2`, `_3`, ... suffix. Empty names
/// pass through unchanged so the identifier check can reject them.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name`, returning the (possibly suffixed) name actually assigned.
    pub fn claim(&mut self, name: String) -> String {
        if name.is_empty() || self.taken.insert(name.clone()) {
            return name;
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{name}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Normalize and de-duplicate a sequence of names, logging every collision under `scope`.
pub fn normalize_unique<'a, I>(scope: &str, names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut unique = UniqueNames::new();
    names
        .into_iter()
        .map(|original| {
            let normalized = normalize(original);
            let assigned = unique.claim(normalized.clone());
            if assigned != normalized {
                warn!(
                    scope,
                    original,
                    %normalized,
                    %assigned,
                    "normalized name collides, using suffix"
                );
            }
            assigned
        })
        .collect()
}

/// Rename every table key to its normalized identifier.
pub fn normalize_table_keys(tables: TableSet) -> TableSet {
    let originals: Vec<String> = tables.keys().map(str::to_string).collect();
    let renamed = normalize_unique("tables", originals.iter().map(String::as_str));
    info!(keys = ?renamed, "cleaned table names");

    tables
        .into_iter()
        .zip(renamed)
        .map(|((_, table), key)| (key, table))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_are_valid_and_quoted() {
        for word in ["order", "user", "group", "desc", "from"] {
            assert_eq!(validate_identifier(word).unwrap(), word);
            assert_eq!(quote_identifier(word), format!("\"{word}\""));
        }
    }

    #[test]
    fn removes_special_characters() {
        assert_eq!(normalize("Test@Special#Characters!"), "test_special_characters");
    }

    #[test]
    fn strips_extension_and_everything_after_first_dot() {
        assert_eq!(normalize("test.file.csv"), "test");
    }

    #[test]
    fn leading_dot_is_not_an_extension() {
        assert_eq!(normalize(".hidden.csv"), "hidden_csv");
    }

    #[test]
    fn transliterates_turkish_letters() {
        assert_eq!(normalize("İşçiğüŞöÇı"), "iscigusoci");
    }

    #[test]
    fn collapses_underscores() {
        assert_eq!(normalize("multiple___underscores"), "multiple_underscores");
    }

    #[test]
    fn prefixes_leading_digit() {
        assert_eq!(normalize("123test"), "col_123test");
    }

    #[test]
    fn empty_and_symbol_only_inputs_yield_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("???"), "");
        assert_eq!(normalize("."), "");
    }

    #[test]
    fn non_turkish_letters_become_underscores() {
        assert_eq!(normalize("Straße Größe"), "stra_e_gro_e");
    }

    #[test]
    fn output_is_always_a_valid_identifier_or_empty() {
        let inputs = [
            "Col 1",
            "__x__",
            "9lives",
            "a..b",
            "Ünıversite Adı",
            "ÇĞŞ-2024.xlsx",
            "  spaced  out  ",
            "données",
            "日本語",
        ];
        for input in inputs {
            let out = normalize(input);
            assert!(out.is_empty() || is_valid_identifier(&out), "{input:?} -> {out:?}");
            assert_eq!(normalize(&out), out, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn validator_rejects_unsafe_names() {
        assert!(validate_identifier("orders").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1abc").is_err());
        assert!(validate_identifier("drop table x;").is_err());
        assert!(validate_identifier("a__b").is_err());
        assert!(validate_identifier("_a").is_err());
    }

    #[test]
    fn unique_names_suffixes_collisions() {
        let names = normalize_unique("columns", ["Col 1", "Col_1", "col-1", "other"]);
        assert_eq!(names, vec!["col_1", "col_1_2", "col_1_3", "other"]);
    }

    #[test]
    fn unique_names_skips_suffix_already_present() {
        let names = normalize_unique("columns", ["a_2", "a", "A"]);
        assert_eq!(names, vec!["a_2", "a", "a_3"]);
    }
}
