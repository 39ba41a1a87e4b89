//! External process invocation.
//!
//! Every compiler, archiver and linker call goes through [`ProcessRunner`].
//! Commands are structured argument vectors handed straight to the OS, never
//! a shell string. Only the exit status matters: child stdout/stderr are
//! inherited and not parsed.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A program plus its argument vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().to_string())
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Value following `flag`, e.g. the output of `-o`.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Failure of a single external invocation
#[derive(Debug)]
pub enum ProcessError {
    /// The program could not be started at all
    Spawn { program: String, source: io::Error },
    /// The program ran and exited non-zero (`None` when killed by a signal)
    Exit { program: String, code: Option<i32> },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn { program, source } => {
                write!(f, "failed to start '{}': {}", program, source)
            }
            ProcessError::Exit {
                program,
                code: Some(code),
            } => write!(f, "'{}' exited with code {}", program, code),
            ProcessError::Exit {
                program,
                code: None,
            } => write!(f, "'{}' was terminated by a signal", program),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Spawn { source, .. } => Some(source),
            ProcessError::Exit { .. } => None,
        }
    }
}

/// Runs one external command to completion.
///
/// Blocks the calling thread until the process exits. Implementations must be
/// shareable across the compile pool's worker threads.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, command: &CommandLine) -> Result<(), ProcessError>;
}

/// Spawns real processes through `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &CommandLine) -> Result<(), ProcessError> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .map_err(|source| ProcessError::Spawn {
                program: command.program_name(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::Exit {
                program: command.program_name(),
                code: status.code(),
            })
        }
    }
}
