//! Filesystem-backed sub-completer for path parameters.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::param::{SubCompleter, SubCompletion};

/// Completes file and directory names relative to a base directory.
///
/// The partial value is split at its last `/`: the head names the directory to list and the tail
/// is matched as a name prefix. Hidden entries are only offered once the prefix starts with `.`.
/// Directory candidates are displayed with a trailing `/`. Listing happens synchronously on every
/// call.
#[derive(Debug, Clone, Default)]
pub struct PathCompleter {
    only_directories: bool,
    base: Option<PathBuf>,
}

impl PathCompleter {
    /// Completes files and directories relative to the process working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts candidates to directories.
    pub fn only_directories(mut self, only_directories: bool) -> Self {
        self.only_directories = only_directories;
        self
    }

    /// Resolves relative partial paths against `base` instead of the working directory.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    fn directory_for(&self, head: &str) -> PathBuf {
        let base = self.base.as_deref().unwrap_or_else(|| Path::new("."));
        if head.is_empty() {
            base.to_path_buf()
        } else if Path::new(head).is_absolute() {
            PathBuf::from(head)
        } else {
            base.join(head)
        }
    }

    fn list(&self, partial: &str) -> io::Result<Vec<SubCompletion>> {
        let (head, prefix) = match partial.rfind('/') {
            Some(index) => partial.split_at(index + 1),
            None => ("", partial),
        };
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.directory_for(head))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(prefix) || (name.starts_with('.') && !prefix.starts_with('.')) {
                continue;
            }
            let is_dir = entry.path().is_dir();
            if self.only_directories && !is_dir {
                continue;
            }
            entries.push((name, is_dir));
        }
        entries.sort();
        Ok(entries
            .into_iter()
            .map(|(name, is_dir)| {
                let display = if is_dir { format!("{name}/") } else { name.clone() };
                SubCompletion::new(format!("{head}{name}")).with_display(display)
            })
            .collect())
    }
}

impl SubCompleter for PathCompleter {
    fn complete(&self, partial: &str) -> Vec<SubCompletion> {
        self.list(partial).unwrap_or_else(|err| {
            debug!(partial, %err, "path listing failed");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use action_completer_contract::DisplayText;
    use pretty_assertions::assert_eq;

    use super::*;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("docs")).expect("docs");
        fs::create_dir(dir.path().join("docs").join("guides")).expect("guides");
        fs::write(dir.path().join("docs").join("intro.md"), "").expect("intro");
        fs::write(dir.path().join("deploy.sh"), "").expect("deploy");
        fs::write(dir.path().join(".env"), "").expect("env");
        dir
    }

    fn texts(completions: &[SubCompletion]) -> Vec<&str> {
        completions
            .iter()
            .map(|completion| completion.text.as_str())
            .collect()
    }

    #[test]
    fn lists_matching_entries_sorted() {
        let dir = fixture();
        let completer = PathCompleter::new().with_base(dir.path());
        let completions = completer.complete("d");
        assert_eq!(texts(&completions), vec!["deploy.sh", "docs"]);
        assert_eq!(completions[1].display, Some(DisplayText::from("docs/")));
    }

    #[test]
    fn descends_into_typed_directories() {
        let dir = fixture();
        let completer = PathCompleter::new().with_base(dir.path());
        assert_eq!(
            texts(&completer.complete("docs/")),
            vec!["docs/guides", "docs/intro.md"]
        );
    }

    #[test]
    fn hidden_entries_need_a_dot_prefix() {
        let dir = fixture();
        let completer = PathCompleter::new().with_base(dir.path());
        assert!(!texts(&completer.complete("")).contains(&".env"));
        assert_eq!(texts(&completer.complete(".")), vec![".env"]);
    }

    #[test]
    fn directory_only_mode_skips_files() {
        let dir = fixture();
        let completer = PathCompleter::new().only_directories(true).with_base(dir.path());
        assert_eq!(texts(&completer.complete("")), vec!["docs"]);
    }

    #[test]
    fn missing_directories_yield_nothing() {
        let dir = fixture();
        let completer = PathCompleter::new().with_base(dir.path());
        assert!(completer.complete("nowhere/x").is_empty());
    }
}
