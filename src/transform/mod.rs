//! Pure string-to-string transforms behind the four commands.

mod join;
mod lines;

pub use join::join_lines;
pub use lines::{
    is_empty_line, is_whitespace, remove_consecutive_empty_lines, remove_empty_lines,
    trim_leading_trailing_spaces, trim_line,
};
