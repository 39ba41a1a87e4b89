//! Compile -> archive -> link for one target.

use super::archive::archive;
use super::artifact::{Archive, Executable, ObjectFile, Product, SourceFile};
use super::compdb::write_compile_database;
use super::compile::compile;
use super::error::{BuildError, Stage, StageError};
use super::link::link_all;
use super::log::LogSender;
use super::runner::ProcessRunner;
use crate::toolchain::ToolchainConfig;
use rayon::ThreadPool;
use std::fmt;
use std::fs;

/// Everything a stage needs for one target
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    pub config: &'a ToolchainConfig,
    pub runner: &'a dyn ProcessRunner,
    pub log: &'a LogSender,
    pub pool: &'a ThreadPool,
}

/// Per-target lifecycle. Only moves forward; `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetState {
    Pending,
    Compiling,
    Archiving,
    Linking,
    Done,
    Failed,
}

impl TargetState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TargetState::Done | TargetState::Failed)
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetState::Pending => "pending",
            TargetState::Compiling => "compiling",
            TargetState::Archiving => "archiving",
            TargetState::Linking => "linking",
            TargetState::Done => "done",
            TargetState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Artifacts of a target that reached `Done`
#[derive(Debug, Clone)]
pub struct TargetBuild {
    pub objects: Vec<ObjectFile>,
    pub archive: Archive,
    pub executables: Vec<Executable>,
}

pub struct BuildPipeline<'a> {
    ctx: StageContext<'a>,
    sources: &'a [SourceFile],
    products: &'a [Product],
    compile_commands: bool,
    state: TargetState,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(ctx: StageContext<'a>, sources: &'a [SourceFile], products: &'a [Product]) -> Self {
        Self {
            ctx,
            sources,
            products,
            compile_commands: false,
            state: TargetState::Pending,
        }
    }

    pub fn with_compile_commands(mut self, enabled: bool) -> Self {
        self.compile_commands = enabled;
        self
    }

    pub fn state(&self) -> TargetState {
        self.state
    }

    fn advance(&mut self, next: TargetState) {
        debug_assert!(
            !self.state.is_terminal() && next > self.state,
            "illegal transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }

    fn fail(&mut self, error: StageError) -> BuildError {
        self.state = TargetState::Failed;
        BuildError {
            target: self.ctx.config.name.clone(),
            error,
        }
    }

    /// Run the whole pipeline once. No retries: a failed stage is final.
    pub fn run(&mut self) -> Result<TargetBuild, BuildError> {
        let config = self.ctx.config;

        self.advance(TargetState::Compiling);
        self.ctx.log.info(format!("Starting {} build...", config.name));
        for dir in [&config.bin_dir, &config.obj_dir] {
            if let Err(source) = fs::create_dir_all(dir) {
                self.ctx.log.error(format!(
                    "Failed to create {} [{}]: {}",
                    dir.display(),
                    config.name,
                    source
                ));
                return Err(self.fail(StageError::Io {
                    stage: Stage::Compile,
                    path: dir.clone(),
                    source,
                }));
            }
        }

        let objects = compile(&self.ctx, self.sources).map_err(|e| self.fail(e))?;

        if self.compile_commands {
            match write_compile_database(config, self.sources) {
                Ok(path) => self
                    .ctx
                    .log
                    .info(format!("Wrote {}", path.display())),
                Err(e) => self
                    .ctx
                    .log
                    .warning(format!("Could not write compile database: {:#}", e)),
            }
        }

        self.advance(TargetState::Archiving);
        let archive = archive(&self.ctx, &objects).map_err(|e| self.fail(e))?;

        self.advance(TargetState::Linking);
        let executables =
            link_all(&self.ctx, &archive, self.products).map_err(|e| self.fail(e))?;

        self.advance(TargetState::Done);
        self.ctx.log.info(format!("{} build complete.", config.name));

        Ok(TargetBuild {
            objects,
            archive,
            executables,
        })
    }
}
