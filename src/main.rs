//! # bmx CLI Entry Point
//!
//! Parses arguments with clap and routes to the build, listing, clean and
//! init handlers.
//!
//! - `bmx build`   - run the compile/archive/link pipeline for every target
//! - `bmx targets` - list resolved toolchains
//! - `bmx clean`   - remove every target's output directories
//! - `bmx init`    - write a default `bmx.toml`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use buildmatrix::build::{self, BuildMatrix, ConsoleSink, FailurePolicy, LogChannel, SystemRunner};
use buildmatrix::config::{self, CONFIG_FILE};
use buildmatrix::toolchain::{self, ToolchainConfig};
use buildmatrix::ui;

#[derive(Parser)]
#[command(name = "bmx")]
#[command(about = "Build one C/C++ project for the desktop and every cross target", version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the project file
    #[arg(long, short = 'c', global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile, archive and link every target
    Build {
        /// Compile worker threads (0 = all cores); overrides [project].jobs
        #[arg(long, short = 'j')]
        jobs: Option<usize>,
        /// Stop at the first failed target instead of continuing
        #[arg(long)]
        fail_fast: bool,
        /// Only build the named target (repeatable)
        #[arg(long = "target", short = 't')]
        targets: Vec<String>,
        /// Write compile_commands.json into each object directory
        #[arg(long)]
        compile_commands: bool,
    },
    /// List the resolved build targets
    Targets,
    /// Remove build outputs for every target
    Clean,
    /// Create a default bmx.toml
    Init,
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "x".red(), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Init => {
            config::init_config(&cli.config)?;
            Ok(0)
        }
        Commands::Targets => {
            let config = config::load_config(&cli.config)?;
            let targets = toolchain::resolve_targets(&config)?;
            warn_unresolved(&targets);
            print_targets(&targets);
            Ok(0)
        }
        Commands::Clean => {
            let config = config::load_config(&cli.config)?;
            let targets = toolchain::resolve_targets(&config)?;
            build::clean(&targets)?;
            Ok(0)
        }
        Commands::Build {
            jobs,
            fail_fast,
            targets,
            compile_commands,
        } => {
            let mut config = config::load_config(&cli.config)?;
            if let Some(jobs) = jobs {
                config.project.jobs = jobs;
            }
            if fail_fast {
                config.project.continue_on_failure = false;
            }
            if compile_commands {
                config.project.compile_commands = true;
            }
            if config.products.is_empty() {
                eprintln!(
                    "   {} No [[product]] entries, only the library will be built",
                    "⚠".yellow()
                );
            }
            run_build(&config, &targets)
        }
    }
}

fn select_targets(all: Vec<ToolchainConfig>, wanted: &[String]) -> Result<Vec<ToolchainConfig>> {
    if wanted.is_empty() {
        return Ok(all);
    }
    for name in wanted {
        if !all.iter().any(|t| &t.name == name) {
            let known: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
            anyhow::bail!("Unknown target '{}' (available: {})", name, known.join(", "));
        }
    }
    Ok(all.into_iter().filter(|t| wanted.contains(&t.name)).collect())
}

fn run_build(config: &config::MatrixConfig, wanted: &[String]) -> Result<i32> {
    let targets = select_targets(toolchain::resolve_targets(config)?, wanted)?;
    warn_unresolved(&targets);
    let matrix = BuildMatrix::from_config(config, targets)?;

    println!("{}", "=".repeat(50).green());
    println!(
        "  {} {}",
        "🚀".cyan(),
        format!("Building lib{}", config.project.library).bold()
    );
    println!(
        "     {} targets, {} sources, {} workers",
        matrix.targets().len(),
        config.project.sources.len(),
        matrix.jobs()
    );
    println!("{}", "=".repeat(50).green());

    let channel = LogChannel::spawn(ConsoleSink::stdout()).context("Failed to start log thread")?;
    let log = channel.sender();
    let report = matrix.run(&SystemRunner, &log);
    drop(log);
    channel
        .shutdown()
        .map_err(|_| anyhow::anyhow!("Log thread panicked"))?;

    println!();
    ui::summary_table(&report).print();

    if report.success() {
        println!("{} All targets built", "✓".green());
    } else {
        let failed: Vec<&str> = report.failures().map(|o| o.target.as_str()).collect();
        if matrix.policy() == FailurePolicy::Stop {
            println!("{} Stopped after failure in {}", "x".red(), failed.join(", "));
        } else {
            println!("{} Failed targets: {}", "x".red(), failed.join(", "));
        }
    }
    Ok(report.exit_code())
}

fn warn_unresolved(targets: &[ToolchainConfig]) {
    let missing = toolchain::unresolved_targets(targets);
    if !missing.is_empty() {
        eprintln!(
            "   {} Android NDK not found, {} will fail to compile",
            "⚠".yellow(),
            missing.join(", ")
        );
        eprintln!(
            "     💡 Tip: Set 'ndk' under [cross] in bmx.toml or export ANDROID_NDK_HOME."
        );
    }
}

fn print_targets(targets: &[ToolchainConfig]) {
    println!("{} {}", "🎯".cyan(), "Build Targets".bold());
    let mut table = ui::Table::new(&["Target", "Compiler", "Objects", "Binaries"]);
    for tc in targets {
        table.add_row(vec![
            tc.name.clone(),
            tc.compiler.display().to_string(),
            tc.obj_dir.display().to_string(),
            tc.bin_dir.display().to_string(),
        ]);
    }
    table.print();
}
