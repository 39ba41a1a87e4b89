//! Link each product against the target's static library.

use super::artifact::{Archive, Executable, Product};
use super::error::StageError;
use super::pipeline::StageContext;
use super::runner::{CommandLine, ProcessError};
use crate::toolchain::ToolchainConfig;
use std::path::Path;

/// `compiler <flags> <includes> <entry sources> <library> <link flags> -o <exe>`
pub fn link_command(
    config: &ToolchainConfig,
    library: &Path,
    product: &Product,
    output: &Path,
) -> CommandLine {
    let mut command = CommandLine::new(&config.compiler)
        .args(config.compile_flags.iter().cloned())
        .args(config.include_flags.iter().cloned());
    for source in &product.entry_sources {
        command = command.path_arg(&source.path);
    }
    command
        .path_arg(library)
        .args(config.link_flags.iter().cloned())
        .arg("-o")
        .path_arg(output)
}

/// Link a single product
pub fn link(
    ctx: &StageContext<'_>,
    archive: &Archive,
    product: &Product,
) -> Result<Executable, ProcessError> {
    let output = ctx.config.executable_path(&product.name);
    ctx.log.info(format!("Linking {}...", output.display()));

    let command = link_command(ctx.config, &archive.path, product, &output);
    if let Err(e) = ctx.runner.run(&command) {
        ctx.log.error(format!(
            "Failed to link {} [{}]: {}",
            output.display(),
            ctx.config.name,
            e
        ));
        return Err(e);
    }

    Ok(Executable {
        path: output,
        entry_sources: product.entry_sources.clone(),
        library: archive.path.clone(),
    })
}

/// Link every product. A failure never stops the remaining products from
/// being attempted; all failures are returned together.
pub fn link_all(
    ctx: &StageContext<'_>,
    archive: &Archive,
    products: &[Product],
) -> Result<Vec<Executable>, StageError> {
    let mut executables = Vec::with_capacity(products.len());
    let mut failures = Vec::new();

    for product in products {
        match link(ctx, archive, product) {
            Ok(exe) => executables.push(exe),
            Err(e) => failures.push((product.name.clone(), e)),
        }
    }

    if failures.is_empty() {
        Ok(executables)
    } else {
        Err(StageError::Link { failures })
    }
}
