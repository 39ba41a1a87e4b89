//! Shared helpers: a scripted toolchain and scratch project trees.

#![allow(dead_code)]

use buildmatrix::build::{
    CommandLine, LogChannel, MatrixReport, MemorySink, ProcessError, ProcessRunner, BuildMatrix,
};
use buildmatrix::toolchain::{TargetKind, ToolchainConfig};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Compile,
    Archive,
    Link,
}

pub fn kind_of(cmd: &CommandLine) -> Kind {
    if cmd.args.first().is_some_and(|a| a == "rcs") {
        Kind::Archive
    } else if cmd.args.iter().any(|a| a == "-c") {
        Kind::Compile
    } else {
        Kind::Link
    }
}

/// Records every invocation. Exits with `exit_code` for compiles and 0 for
/// everything else; successful commands create their output file.
///
/// Like a real spawn, a program given as a path that does not exist fails
/// to start.
pub struct ScriptedToolchain {
    pub compile_exit: i32,
    calls: Mutex<Vec<CommandLine>>,
}

impl ScriptedToolchain {
    pub fn new(compile_exit: i32) -> Self {
        Self {
            compile_exit,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<CommandLine> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, kind: Kind) -> usize {
        self.calls().iter().filter(|c| kind_of(c) == kind).count()
    }
}

impl ProcessRunner for ScriptedToolchain {
    fn run(&self, command: &CommandLine) -> Result<(), ProcessError> {
        self.calls.lock().unwrap().push(command.clone());
        if command.program.components().count() > 1 && !command.program.exists() {
            return Err(ProcessError::Spawn {
                program: command.program_name(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        let kind = kind_of(command);
        if kind == Kind::Compile && self.compile_exit != 0 {
            return Err(ProcessError::Exit {
                program: command.program_name(),
                code: Some(self.compile_exit),
            });
        }
        let output = match kind {
            Kind::Archive => command.args.get(1).cloned(),
            _ => command.value_of("-o").map(str::to_string),
        };
        if let Some(output) = output {
            fs::write(output, b"").unwrap();
        }
        Ok(())
    }
}

pub fn toolchain(root: &Path, name: &str) -> ToolchainConfig {
    ToolchainConfig {
        name: name.to_string(),
        kind: TargetKind::Desktop,
        compiler: PathBuf::from("g++"),
        archiver: PathBuf::from("ar"),
        compile_flags: vec!["-std=c++11".to_string()],
        include_flags: vec!["-I.".to_string()],
        link_flags: Vec::new(),
        bin_dir: root.join(name).join("bin"),
        obj_dir: root.join(name).join("obj"),
        library_name: "pycxx".to_string(),
        exe_suffix: String::new(),
    }
}

pub fn write_source(root: &Path, name: &str) -> PathBuf {
    let path = root.join(name);
    fs::write(&path, "int main() { return 0; }\n").unwrap();
    path
}

/// Run the matrix with a fresh log channel, draining it before returning.
pub fn run(matrix: &BuildMatrix, runner: &ScriptedToolchain) -> (MatrixReport, MemorySink) {
    let sink = MemorySink::new();
    let channel = LogChannel::spawn(sink.clone()).unwrap();
    let report = matrix.run(runner, &channel.sender());
    channel.shutdown().unwrap();
    (report, sink)
}
