//! Per-line transforms. Input is split strictly on `\n`, so a trailing
//! newline yields a trailing empty line and `\r` stays part of its line.

/// Whitespace as editors see it: Unicode `White_Space` plus the byte order
/// mark U+FEFF, minus NEL U+0085.
#[inline]
pub fn is_whitespace(c: char) -> bool {
    c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{85}')
}

#[inline]
pub fn trim_line(line: &str) -> &str {
    line.trim_matches(is_whitespace)
}

/// A line is empty when nothing but whitespace is left after trimming.
#[inline]
pub fn is_empty_line(line: &str) -> bool {
    trim_line(line).is_empty()
}

pub fn remove_empty_lines(text: &str) -> String {
    text.split('\n')
        .filter(|line| !is_empty_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keeps the first empty line of every run and drops the rest.
///
/// The first line has no predecessor and always survives.
pub fn remove_consecutive_empty_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut prev_empty = false;

    for line in text.split('\n') {
        let is_empty = is_empty_line(line);
        if !(is_empty && prev_empty) {
            lines.push(line);
        }
        prev_empty = is_empty;
    }

    lines.join("\n")
}

/// Trims every line in place; line count and order never change.
pub fn trim_leading_trailing_spaces(text: &str) -> String {
    text.split('\n')
        .map(trim_line)
        .collect::<Vec<_>>()
        .join("\n")
}
