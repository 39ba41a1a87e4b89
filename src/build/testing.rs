//! Scripted toolchain and scratch project for stage tests.

use super::artifact::SourceFile;
use super::log::{LogChannel, MemorySink};
use super::pipeline::StageContext;
use super::runner::{CommandLine, ProcessError, ProcessRunner};
use crate::toolchain::{TargetKind, ToolchainConfig};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Compile,
    Archive,
    Link,
}

impl Invocation {
    pub fn of(cmd: &CommandLine) -> Self {
        if cmd.args.first().is_some_and(|a| a == "rcs") {
            Invocation::Archive
        } else if cmd.args.iter().any(|a| a == "-c") {
            Invocation::Compile
        } else {
            Invocation::Link
        }
    }
}

type ExitFn = Box<dyn Fn(&CommandLine) -> i32 + Send + Sync>;

/// Records every command; exit code comes from the script. Successful
/// commands create their output file like a real toolchain would.
pub struct FakeRunner {
    calls: Mutex<Vec<CommandLine>>,
    exit: ExitFn,
}

impl FakeRunner {
    pub fn calls(&self) -> Vec<CommandLine> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, kind: Invocation) -> Vec<CommandLine> {
        self.calls()
            .into_iter()
            .filter(|c| Invocation::of(c) == kind)
            .collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, command: &CommandLine) -> Result<(), ProcessError> {
        self.calls.lock().unwrap().push(command.clone());

        let code = (self.exit)(command);
        if code != 0 {
            return Err(ProcessError::Exit {
                program: command.program_name(),
                code: Some(code),
            });
        }

        let output = match Invocation::of(command) {
            Invocation::Archive => command.args.get(1).map(String::as_str),
            _ => command.value_of("-o"),
        };
        if let Some(output) = output {
            fs::write(output, b"").unwrap();
        }
        Ok(())
    }
}

pub struct Fixture {
    dir: TempDir,
    pub config: ToolchainConfig,
    pub logs: MemorySink,
    pool: ThreadPool,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolchainConfig {
            name: "test".to_string(),
            kind: TargetKind::Desktop,
            compiler: PathBuf::from("c++"),
            archiver: PathBuf::from("ar"),
            compile_flags: vec!["-std=c++11".to_string(), "-Wall".to_string()],
            include_flags: vec!["-I.".to_string()],
            link_flags: Vec::new(),
            bin_dir: dir.path().join("bin"),
            obj_dir: dir.path().join("obj"),
            library_name: "test".to_string(),
            exe_suffix: String::new(),
        };
        fs::create_dir_all(&config.bin_dir).unwrap();
        fs::create_dir_all(&config.obj_dir).unwrap();
        let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();

        Self {
            dir,
            config,
            logs: MemorySink::new(),
            pool,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create a source file on disk
    pub fn source(&self, name: &str) -> SourceFile {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "int f() { return 0; }\n").unwrap();
        SourceFile::new(path)
    }

    pub fn runner_with<F>(&self, exit: F) -> FakeRunner
    where
        F: Fn(&CommandLine) -> i32 + Send + Sync + 'static,
    {
        FakeRunner {
            calls: Mutex::new(Vec::new()),
            exit: Box::new(exit),
        }
    }

    /// Run `f` with a live log channel; logs are flushed before returning.
    pub fn run<R>(&self, runner: &FakeRunner, f: impl FnOnce(&StageContext<'_>) -> R) -> R {
        let channel = LogChannel::spawn(self.logs.clone()).unwrap();
        let log = channel.sender();
        let ctx = StageContext {
            config: &self.config,
            runner,
            log: &log,
            pool: &self.pool,
        };
        let result = f(&ctx);
        channel.shutdown().unwrap();
        result
    }
}
