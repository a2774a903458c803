use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::args::Usage;

/// Either one file path or stdin.
///
/// This is for commands that read line delimited records from at most one
/// file, and from stdin otherwise. A path of `-` also means stdin.
#[derive(Clone, Debug, Default)]
pub struct FileOrStdin {
    /// Whether an input was given at all, including `-`.
    given: bool,
    /// The file to read, or `None` for stdin.
    path: Option<PathBuf>,
}

impl FileOrStdin {
    pub const USAGE: Usage = Usage::arg(
        "<path>",
        "A file of JSON lines event records.",
        r#"
A file of JSON lines event records.

When no path is given, or when the path is `-`, records are read from stdin
instead.
"#,
    );

    /// Sets the path to read from. It's an error to set it twice.
    pub fn set(&mut self, path: impl Into<OsString>) -> anyhow::Result<()> {
        anyhow::ensure!(!self.given, "command only accepts a single path");
        self.given = true;
        let path = PathBuf::from(path.into());
        if path != Path::new("-") {
            self.path = Some(path);
        }
        Ok(())
    }

    /// Returns something printable for error messages: the file path, or
    /// `<stdin>`.
    pub fn display(&self) -> impl std::fmt::Display + '_ {
        self.path.as_deref().unwrap_or_else(|| Path::new("<stdin>")).display()
    }

    /// Opens a buffered reader for the file or stdin.
    pub fn reader(&self) -> anyhow::Result<Box<dyn io::BufRead>> {
        let Some(ref path) = self.path else {
            return Ok(Box::new(io::stdin().lock()));
        };
        let file = std::fs::File::open(path)
            .with_context(|| format!("{}", path.display()))?;
        Ok(Box::new(io::BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_path() {
        let mut input = FileOrStdin::default();
        input.set("events.jsonl").unwrap();
        assert_eq!(input.display().to_string(), "events.jsonl");
        assert!(input.set("more.jsonl").is_err());

        let mut input = FileOrStdin::default();
        input.set("-").unwrap();
        assert_eq!(input.display().to_string(), "<stdin>");
        let err = input.set("more.jsonl").unwrap_err();
        insta::assert_snapshot!(err, @"command only accepts a single path");

        let mut input = FileOrStdin::default();
        input.set("events.jsonl").unwrap();
        assert!(input.set("-").is_err());
    }
}
