//! Output destination.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where generated G-code is written.
///
/// In configuration files and on the command line, `"-"` and `"stdout"`
/// select [`OutputTarget::Stream`]; any other string is a file path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputTarget {
    /// Standard output.
    Stream,
    /// A file, created or truncated.
    File(PathBuf),
}

impl OutputTarget {
    /// Parse a destination string.
    pub fn parse(s: &str) -> Self {
        match s {
            "-" | "stdout" => OutputTarget::Stream,
            path => OutputTarget::File(PathBuf::from(path)),
        }
    }

    /// Default destination for a config file: same path, `.gcode` extension.
    pub fn beside<P: AsRef<Path>>(config_path: P) -> Self {
        OutputTarget::File(config_path.as_ref().with_extension("gcode"))
    }

    /// Check if this is standard output.
    #[inline]
    pub fn is_stream(&self) -> bool {
        matches!(self, OutputTarget::Stream)
    }

    /// Open the destination for writing.
    pub fn open(&self) -> Result<Box<dyn Write>> {
        Ok(match self {
            OutputTarget::Stream => Box::new(BufWriter::new(io::stdout().lock())),
            OutputTarget::File(path) => Box::new(BufWriter::new(File::create(path)?)),
        })
    }
}

impl From<String> for OutputTarget {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<OutputTarget> for String {
    fn from(target: OutputTarget) -> Self {
        target.to_string()
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stream => write!(f, "-"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentinels() {
        assert_eq!(OutputTarget::parse("-"), OutputTarget::Stream);
        assert_eq!(OutputTarget::parse("stdout"), OutputTarget::Stream);
        assert_eq!(
            OutputTarget::parse("stdout.gcode"),
            OutputTarget::File(PathBuf::from("stdout.gcode"))
        );
    }

    #[test]
    fn test_beside() {
        assert_eq!(
            OutputTarget::beside("configs/pyramid.json"),
            OutputTarget::File(PathBuf::from("configs/pyramid.gcode"))
        );
    }

    #[test]
    fn test_serde() {
        let target: OutputTarget = serde_json::from_str("\"stdout\"").unwrap();
        assert!(target.is_stream());
        assert_eq!(serde_json::to_string(&target).unwrap(), "\"-\"");

        let file: OutputTarget = serde_json::from_str("\"a/b.gcode\"").unwrap();
        assert_eq!(file.to_string(), "a/b.gcode");
    }
}
