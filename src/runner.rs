use crate::commands::{Applied, Registry};
use crate::config::Config;
use crate::source::{Document, LineRange};
use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// One `run` invocation as given on the command line.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    pub command: &'a str,
    pub file: Option<&'a Path>,
    pub lines: Option<LineRange>,
    /// Explicit `--in-place` flag; `output.in_place` from config is separate.
    pub in_place: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Result text for stdout.
    Text(String),
    /// Result written back to the file.
    Written(PathBuf),
    /// In-place run where the command skipped; the file was not touched.
    Unchanged(PathBuf),
}

/// Reads the input (FILE, or `stdin` without one), runs the command and
/// either writes the file back or hands the text out for printing.
pub fn execute(invocation: &Invocation<'_>, config: &Config, stdin: impl Read) -> Result<Output> {
    let registry = Registry::filtered(&config.commands.enabled)?;

    let in_place = match invocation.file {
        Some(_) => invocation.in_place || config.output.in_place,
        None if invocation.in_place => anyhow::bail!("In-place output needs a FILE argument"),
        None => {
            if config.output.in_place {
                tracing::debug!("Reading stdin, ignoring output.in_place from config");
            }
            false
        }
    };

    let max_bytes = config.input.max_bytes;
    let text = match invocation.file {
        Some(path) => read_file(path, max_bytes)?,
        None => read_limited(stdin, max_bytes).context("Failed to read stdin")?,
    };

    let mut document = match invocation.lines {
        Some(range) => Document::select_lines(text, range),
        None => Document::new(text),
    };

    let applied = registry.invoke(invocation.command, &mut document)?;
    tracing::info!("{} applied to {:?}", invocation.command, applied);

    match invocation.file {
        Some(path) if in_place => {
            if applied == Applied::Skipped {
                return Ok(Output::Unchanged(path.to_path_buf()));
            }
            fs::write(path, document.text())
                .with_context(|| format!("Failed to write {:?}", path))?;
            Ok(Output::Written(path.to_path_buf()))
        }
        _ => Ok(Output::Text(document.into_text())),
    }
}

/// Reads at most `max_bytes` of UTF-8; anything longer is refused.
pub fn read_limited(reader: impl Read, max_bytes: u64) -> Result<String> {
    let mut buf = Vec::new();
    reader.take(max_bytes + 1).read_to_end(&mut buf)?;

    if buf.len() as u64 > max_bytes {
        anyhow::bail!("Input exceeds limit of {} bytes", max_bytes);
    }

    String::from_utf8(buf).context("Input is not valid UTF-8")
}

fn read_file(path: &Path, max_bytes: u64) -> Result<String> {
    let len = fs::metadata(path)
        .with_context(|| format!("Failed to read {:?}", path))?
        .len();
    if len > max_bytes {
        anyhow::bail!("{:?} is {} bytes, limit is {}", path, len, max_bytes);
    }

    let file = fs::File::open(path).with_context(|| format!("Failed to read {:?}", path))?;
    read_limited(file, max_bytes).with_context(|| format!("Failed to read {:?}", path))
}
