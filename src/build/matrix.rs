//! Runs the pipeline for every configured target, one target at a time.
//!
//! All targets share a single rayon pool created up front, so peak
//! concurrency is bounded by `jobs` no matter how many targets there are.

use super::artifact::{Executable, Product, SourceFile};
use super::error::BuildError;
use super::log::LogSender;
use super::pipeline::{BuildPipeline, StageContext, TargetState};
use super::runner::ProcessRunner;
use crate::config::MatrixConfig;
use crate::toolchain::ToolchainConfig;
use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::{Duration, Instant};

/// What to do with the remaining targets once one fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep building later targets
    Continue,
    /// Leave later targets `Pending`
    Stop,
}

#[derive(Debug)]
pub struct TargetOutcome {
    pub target: String,
    pub state: TargetState,
    pub error: Option<BuildError>,
    pub executables: Vec<Executable>,
    pub elapsed: Duration,
}

/// One outcome per configured target, in build order
#[derive(Debug, Default)]
pub struct MatrixReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl MatrixReport {
    /// True only when every target reached `Done`
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|o| o.state == TargetState::Done)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.state == TargetState::Failed)
    }

    pub fn exit_code(&self) -> i32 {
        if self.success() { 0 } else { 1 }
    }
}

pub struct BuildMatrix {
    targets: Vec<ToolchainConfig>,
    sources: Vec<SourceFile>,
    products: Vec<Product>,
    policy: FailurePolicy,
    compile_commands: bool,
    pool: ThreadPool,
}

impl BuildMatrix {
    /// `jobs == 0` sizes the pool from available parallelism.
    pub fn new(
        targets: Vec<ToolchainConfig>,
        sources: Vec<SourceFile>,
        products: Vec<Product>,
        jobs: usize,
    ) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("bmx-compile-{}", i))
            .build()
            .context("Failed to create compile worker pool")?;

        Ok(Self {
            targets,
            sources,
            products,
            policy: FailurePolicy::Continue,
            compile_commands: false,
            pool,
        })
    }

    pub fn from_config(config: &MatrixConfig, targets: Vec<ToolchainConfig>) -> Result<Self> {
        let sources = config
            .project
            .sources
            .iter()
            .map(|s| SourceFile::new(s.as_str()))
            .collect();
        let products = config
            .products
            .iter()
            .map(|p| Product::new(p.name.clone(), p.sources.iter().map(String::as_str)))
            .collect();
        let policy = if config.project.continue_on_failure {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Stop
        };

        Ok(Self::new(targets, sources, products, config.project.jobs)?
            .with_policy(policy)
            .with_compile_commands(config.project.compile_commands))
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_compile_commands(mut self, enabled: bool) -> Self {
        self.compile_commands = enabled;
        self
    }

    pub fn targets(&self) -> &[ToolchainConfig] {
        &self.targets
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn jobs(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Build every target in order and collect the outcomes.
    ///
    /// The caller owns `log` and must shut its channel down after this
    /// returns; every compile task has joined by then.
    pub fn run(&self, runner: &dyn ProcessRunner, log: &LogSender) -> MatrixReport {
        let mut report = MatrixReport::default();
        let mut halted = false;

        for config in &self.targets {
            if halted {
                log.warning(format!(
                    "Skipping {} build after an earlier failure",
                    config.name
                ));
                report.outcomes.push(TargetOutcome {
                    target: config.name.clone(),
                    state: TargetState::Pending,
                    error: None,
                    executables: Vec::new(),
                    elapsed: Duration::ZERO,
                });
                continue;
            }

            let start_time = Instant::now();
            let ctx = StageContext {
                config,
                runner,
                log,
                pool: &self.pool,
            };
            let mut pipeline = BuildPipeline::new(ctx, &self.sources, &self.products)
                .with_compile_commands(self.compile_commands);
            let result = pipeline.run();

            let outcome = match result {
                Ok(build) => TargetOutcome {
                    target: config.name.clone(),
                    state: pipeline.state(),
                    error: None,
                    executables: build.executables,
                    elapsed: start_time.elapsed(),
                },
                Err(e) => {
                    if self.policy == FailurePolicy::Stop {
                        halted = true;
                    }
                    TargetOutcome {
                        target: config.name.clone(),
                        state: pipeline.state(),
                        error: Some(e),
                        executables: Vec::new(),
                        elapsed: start_time.elapsed(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        report
    }
}
