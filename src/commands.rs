use crate::source::TextSource;
use crate::transform;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    JoinLines,
    RemoveEmptyLines,
    RemoveConsecutiveEmptyLines,
    TrimLeadingTrailingSpaces,
}

/// How far a command reaches when nothing is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Selection only; an empty selection makes the command a no-op.
    Selection,
    /// Selection, falling back to the whole document.
    Document,
}

/// What a single invocation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Selection,
    Document,
    Skipped,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::JoinLines,
        Command::RemoveEmptyLines,
        Command::RemoveConsecutiveEmptyLines,
        Command::TrimLeadingTrailingSpaces,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Command::JoinLines => "join-lines",
            Command::RemoveEmptyLines => "remove-empty-lines",
            Command::RemoveConsecutiveEmptyLines => "remove-consecutive-empty-lines",
            Command::TrimLeadingTrailingSpaces => "trim-leading-trailing-spaces",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::JoinLines => "Join lines",
            Command::RemoveEmptyLines => "Remove Empty Lines",
            Command::RemoveConsecutiveEmptyLines => "Remove Consecutive Empty Lines",
            Command::TrimLeadingTrailingSpaces => "Trim Leading and Trailing Spaces",
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            Command::JoinLines => Scope::Selection,
            _ => Scope::Document,
        }
    }

    pub fn transform(self) -> fn(&str) -> String {
        match self {
            Command::JoinLines => transform::join_lines,
            Command::RemoveEmptyLines => transform::remove_empty_lines,
            Command::RemoveConsecutiveEmptyLines => transform::remove_consecutive_empty_lines,
            Command::TrimLeadingTrailingSpaces => transform::trim_leading_trailing_spaces,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Command::ALL
            .into_iter()
            .find(|cmd| cmd.id() == s)
            .ok_or_else(|| {
                let known = Command::ALL.map(Command::id).join(", ");
                anyhow::anyhow!("Unknown command '{}'. Known commands: {}", s, known)
            })
    }
}

/// Routes one invocation: a non-empty selection is transformed and replaced,
/// otherwise the whole document is, unless the command is selection-only.
/// Reads once and writes at most once.
pub fn run<S: TextSource + ?Sized>(command: Command, source: &mut S) -> Applied {
    let transform = command.transform();

    if source.has_selection() {
        let result = transform(source.selection());
        tracing::debug!("{}: replacing selection ({} bytes)", command, result.len());
        source.replace_selection(result);
        return Applied::Selection;
    }

    match command.scope() {
        Scope::Selection => {
            tracing::debug!("{}: empty selection, nothing to do", command);
            Applied::Skipped
        }
        Scope::Document => {
            let result = transform(source.full_text());
            tracing::debug!("{}: replacing document ({} bytes)", command, result.len());
            source.set_full_text(result);
            Applied::Document
        }
    }
}

/// Flat table of the commands a host exposes, keyed by id.
#[derive(Debug, Clone)]
pub struct Registry {
    commands: Vec<Command>,
}

impl Registry {
    pub fn with_defaults() -> Self {
        Self {
            commands: Command::ALL.to_vec(),
        }
    }

    /// Registers only `ids`, in the order given. An empty list registers all.
    pub fn filtered(ids: &[String]) -> Result<Self> {
        if ids.is_empty() {
            return Ok(Self::with_defaults());
        }

        let mut commands = Vec::with_capacity(ids.len());
        for id in ids {
            let command: Command = id.parse()?;
            if !commands.contains(&command) {
                commands.push(command);
            }
        }

        tracing::debug!("Registered {} of {} commands", commands.len(), Command::ALL.len());
        Ok(Self { commands })
    }

    pub fn get(&self, id: &str) -> Option<Command> {
        self.commands.iter().copied().find(|cmd| cmd.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = Command> + '_ {
        self.commands.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn invoke<S: TextSource + ?Sized>(&self, id: &str, source: &mut S) -> Result<Applied> {
        let command = self
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("Command '{}' is not registered", id))?;
        Ok(run(command, source))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Document;
    use crate::test_utils::{RecordingSource, selected};

    #[test]
    fn test_join_lines_selection() {
        let mut doc = selected("hello\nworld");
        assert_eq!(run(Command::JoinLines, &mut doc), Applied::Selection);
        assert_eq!(doc.text(), "hello world");
    }

    #[test]
    fn test_join_lines_empty_selection_is_noop() {
        let mut source = RecordingSource::new("a\nb", "");
        assert_eq!(run(Command::JoinLines, &mut source), Applied::Skipped);
        assert_eq!(source.full_text_reads.get(), 0);
        assert!(source.writes.is_empty());
    }

    #[test]
    fn test_join_lines_whitespace_selection_is_applied() {
        let mut source = RecordingSource::new("a\n\n\nb", "\n\n");
        assert_eq!(run(Command::JoinLines, &mut source), Applied::Selection);
        assert_eq!(source.writes, vec![("selection", " ".to_string())]);
    }

    #[test]
    fn test_remove_empty_lines_selection() {
        let mut doc = selected("a\n\n\nb");
        run(Command::RemoveEmptyLines, &mut doc);
        assert_eq!(doc.text(), "a\nb");
    }

    #[test]
    fn test_remove_empty_lines_blank_selection() {
        let mut doc = selected("   \n\t\n");
        assert_eq!(run(Command::RemoveEmptyLines, &mut doc), Applied::Selection);
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn test_remove_consecutive_empty_lines_selection() {
        let mut doc = selected("a\n\n\nb\n\nc");
        run(Command::RemoveConsecutiveEmptyLines, &mut doc);
        assert_eq!(doc.text(), "a\n\nb\n\nc");
    }

    #[test]
    fn test_trim_selection() {
        let mut doc = selected("  a  \n b ");
        run(Command::TrimLeadingTrailingSpaces, &mut doc);
        assert_eq!(doc.text(), "a\nb");
    }

    #[test]
    fn test_selection_leaves_rest_of_document() {
        let mut doc = Document::with_selection("  keep  \n  x  \n\n\n  y  ", 9..22);
        run(Command::TrimLeadingTrailingSpaces, &mut doc);
        assert_eq!(doc.text(), "  keep  \nx\n\n\ny");
    }

    #[test]
    fn test_document_fallback() {
        for command in [
            Command::RemoveEmptyLines,
            Command::RemoveConsecutiveEmptyLines,
            Command::TrimLeadingTrailingSpaces,
        ] {
            let mut source = RecordingSource::new(" a \n\n\n b ", "");
            assert_eq!(run(command, &mut source), Applied::Document);
            assert_eq!(source.full_text_reads.get(), 1);
            assert_eq!(source.writes.len(), 1);
            assert_eq!(source.writes[0].0, "document");
        }
    }

    #[test]
    fn test_document_fallback_results() {
        let mut doc = Document::new(" a \n\n\n b ");
        run(Command::RemoveConsecutiveEmptyLines, &mut doc);
        assert_eq!(doc.text(), " a \n\n b ");

        let mut doc = Document::new(" a \n\n\n b ");
        run(Command::TrimLeadingTrailingSpaces, &mut doc);
        assert_eq!(doc.text(), "a\n\n\nb");
    }

    #[test]
    fn test_ids_round_trip() {
        for command in Command::ALL {
            assert_eq!(command.id().parse::<Command>().unwrap(), command);
        }
        assert!("join_lines".parse::<Command>().is_err());
    }

    #[test]
    fn test_only_join_lines_is_selection_scoped() {
        let scoped: Vec<_> = Command::ALL
            .into_iter()
            .filter(|cmd| cmd.scope() == Scope::Selection)
            .collect();
        assert_eq!(scoped, vec![Command::JoinLines]);
    }

    #[test]
    fn test_registry_defaults() {
        let registry = Registry::with_defaults();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("join-lines"), Some(Command::JoinLines));
    }

    #[test]
    fn test_registry_filtered() {
        let ids = vec![
            "trim-leading-trailing-spaces".to_string(),
            "join-lines".to_string(),
            "join-lines".to_string(),
        ];
        let registry = Registry::filtered(&ids).unwrap();
        let registered: Vec<_> = registry.iter().collect();
        assert_eq!(
            registered,
            vec![Command::TrimLeadingTrailingSpaces, Command::JoinLines]
        );
        assert!(registry.get("remove-empty-lines").is_none());
    }

    #[test]
    fn test_registry_filtered_unknown_id() {
        assert!(Registry::filtered(&["sort-lines".to_string()]).is_err());
    }

    #[test]
    fn test_registry_invoke() {
        let registry = Registry::filtered(&["remove-empty-lines".to_string()]).unwrap();
        let mut doc = Document::new("a\n\nb");
        assert_eq!(
            registry.invoke("remove-empty-lines", &mut doc).unwrap(),
            Applied::Document
        );
        assert_eq!(doc.text(), "a\nb");
        assert!(registry.invoke("join-lines", &mut doc).is_err());
    }
}
