//! Fan-out compilation of library sources.

use super::artifact::{ObjectFile, SourceFile};
use super::error::StageError;
use super::pipeline::StageContext;
use super::runner::{CommandLine, ProcessError};
use crate::toolchain::ToolchainConfig;
use rayon::prelude::*;
use std::path::Path;

/// `compiler <flags> <includes> -c <source> -o <object>`
pub fn compile_command(config: &ToolchainConfig, source: &Path, object: &Path) -> CommandLine {
    CommandLine::new(&config.compiler)
        .args(config.compile_flags.iter().cloned())
        .args(config.include_flags.iter().cloned())
        .arg("-c")
        .path_arg(source)
        .arg("-o")
        .path_arg(object)
}

/// Compile every source on the shared pool.
///
/// All tasks run to completion even when one fails. The returned objects
/// follow `sources` order regardless of which task finished first.
pub fn compile(ctx: &StageContext<'_>, sources: &[SourceFile]) -> Result<Vec<ObjectFile>, StageError> {
    let results: Vec<Result<ObjectFile, (SourceFile, ProcessError)>> = ctx.pool.install(|| {
        sources
            .par_iter()
            .map(|source| compile_one(ctx, source))
            .collect()
    });

    let mut objects = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(object) => objects.push(object),
            Err(failure) => failures.push(failure),
        }
    }

    if failures.is_empty() {
        Ok(objects)
    } else {
        Err(StageError::Compile { failures })
    }
}

fn compile_one(
    ctx: &StageContext<'_>,
    source: &SourceFile,
) -> Result<ObjectFile, (SourceFile, ProcessError)> {
    let object_path = ctx.config.object_path(&source.path);

    // Disk may have changed since the list was built.
    if !source.exists() {
        ctx.log
            .warning(format!("Skipping missing file: {}", source.display()));
        return Ok(ObjectFile {
            path: object_path,
            source: source.clone(),
            produced: false,
        });
    }

    ctx.log.info(format!("Compiling {}...", source.display()));
    let command = compile_command(ctx.config, &source.path, &object_path);
    match ctx.runner.run(&command) {
        Ok(()) => Ok(ObjectFile {
            path: object_path,
            source: source.clone(),
            produced: true,
        }),
        Err(e) => {
            ctx.log.error(format!(
                "Failed to compile {} [{}]: {}",
                source.display(),
                ctx.config.name,
                e
            ));
            Err((source.clone(), e))
        }
    }
}
