use super::artifact::SourceFile;
use super::runner::ProcessError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Pipeline stage in which a target failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Archive,
    Link,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Compile => "compile",
            Stage::Archive => "archive",
            Stage::Link => "link",
        };
        write!(f, "{}", name)
    }
}

/// Fatal error raised by a single stage.
///
/// A missing source never appears here. It is downgraded to a warning and a
/// placeholder object.
#[derive(Debug)]
pub enum StageError {
    /// A file or directory the stage needs could not be prepared
    Io {
        stage: Stage,
        path: PathBuf,
        source: io::Error,
    },
    /// One or more existing sources failed to compile, in source order
    Compile {
        failures: Vec<(SourceFile, ProcessError)>,
    },
    /// Every object was missing or a placeholder; the archiver was not run
    EmptyArchive { library: PathBuf },
    Archive {
        library: PathBuf,
        error: ProcessError,
    },
    /// One entry per product that failed to link
    Link {
        failures: Vec<(String, ProcessError)>,
    },
}

impl StageError {
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Io { stage, .. } => *stage,
            StageError::Compile { .. } => Stage::Compile,
            StageError::EmptyArchive { .. } | StageError::Archive { .. } => Stage::Archive,
            StageError::Link { .. } => Stage::Link,
        }
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::Io { path, source, .. } => {
                write!(f, "cannot prepare {}: {}", path.display(), source)
            }
            StageError::Compile { failures } => {
                let names: Vec<String> = failures
                    .iter()
                    .map(|(src, _)| src.path.display().to_string())
                    .collect();
                write!(f, "failed to compile {}", names.join(", "))
            }
            StageError::EmptyArchive { library } => {
                write!(f, "no object files to archive into {}", library.display())
            }
            StageError::Archive { library, error } => {
                write!(f, "failed to create {}: {}", library.display(), error)
            }
            StageError::Link { failures } => {
                let names: Vec<&str> = failures.iter().map(|(name, _)| name.as_str()).collect();
                write!(f, "failed to link {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StageError::Io { source, .. } => Some(source),
            StageError::Archive { error, .. } => Some(error),
            StageError::Compile { failures } => {
                failures.first().map(|(_, e)| e as &(dyn std::error::Error + 'static))
            }
            StageError::Link { failures } => {
                failures.first().map(|(_, e)| e as &(dyn std::error::Error + 'static))
            }
            StageError::EmptyArchive { .. } => None,
        }
    }
}

/// A target's pipeline ended in `Failed`
#[derive(Debug)]
pub struct BuildError {
    pub target: String,
    pub error: StageError,
}

impl BuildError {
    pub fn stage(&self) -> Stage {
        self.error.stage()
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "target '{}' failed during {}: {}",
            self.target,
            self.stage(),
            self.error
        )
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
