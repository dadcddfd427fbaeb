//! Text normalization for folder names and paths.

use deunicode::deunicode;
use regex::Regex;
use std::sync::LazyLock;

/// Everything outside the alias key alphabet.
static RE_NON_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]").expect("Invalid regex"));

/// Reduce a folder name to an alias lookup key.
///
/// Pipeline:
/// 1. Transliterate to Latin via deunicode (strips diacritics, romanizes CJK)
/// 2. Lowercase
/// 3. Drop every character outside `[a-z0-9]`
///
/// Applying it to its own output returns the same string.
pub fn normalize_key(text: &str) -> String {
    let latin = deunicode(text).to_lowercase();
    RE_NON_KEY.replace_all(&latin, "").into_owned()
}

/// Map leetspeak digits in a normalized key back to letters.
pub fn fold_leetspeak(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '0' => 'o',
            '1' => 'i',
            '3' => 'e',
            '4' => 'a',
            '5' => 's',
            '7' => 't',
            other => other,
        })
        .collect()
}

/// Canonical textual form of a user-supplied folder path.
///
/// Unifies separators to `/` and trims surrounding whitespace and trailing
/// separators (a bare root such as `/` is kept).
pub fn normalize_path_string(path: &str) -> String {
    let mut s = path.trim().replace('\\', "/");
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// Last path component, accepting either separator.
pub fn file_name_of(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
}

/// Trimmed value, or `None` when blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "tests/normalizer_tests.rs"]
mod tests;
