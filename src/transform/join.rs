use regex::Regex;
use std::sync::LazyLock;

static NEWLINE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());

// Same set as `is_whitespace`: BOM counts, NEL does not
static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[[\s\x{FEFF}]--\x{85}]+").unwrap());

/// Collapses `text` into a single line.
///
/// Every run of newlines becomes one space, then every run of whitespace
/// becomes one space. Leading and trailing whitespace is collapsed, not
/// stripped: `"  a\nb "` joins to `" a b "`.
pub fn join_lines(text: &str) -> String {
    let joined = NEWLINE_RUN_RE.replace_all(text, " ");
    WHITESPACE_RUN_RE.replace_all(&joined, " ").into_owned()
}
