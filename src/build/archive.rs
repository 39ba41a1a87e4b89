//! Fan-in: bundle the surviving objects into one static library.

use super::artifact::{Archive, ObjectFile};
use super::error::{Stage, StageError};
use super::pipeline::StageContext;
use super::runner::CommandLine;
use crate::toolchain::ToolchainConfig;
use std::fs;
use std::path::Path;

/// `archiver rcs <library> <object>...`
pub fn archive_command(config: &ToolchainConfig, library: &Path, objects: &[ObjectFile]) -> CommandLine {
    let mut command = CommandLine::new(&config.archiver)
        .arg("rcs")
        .path_arg(library);
    for object in objects {
        command = command.path_arg(&object.path);
    }
    command
}

/// Archive every usable object.
///
/// Placeholders and objects missing from disk are left out. If nothing
/// survives, the archiver is not run and the target fails with
/// [`StageError::EmptyArchive`].
pub fn archive(ctx: &StageContext<'_>, objects: &[ObjectFile]) -> Result<Archive, StageError> {
    let library = ctx.config.library_path();
    let members: Vec<ObjectFile> = objects.iter().filter(|o| o.is_usable()).cloned().collect();

    if members.is_empty() {
        ctx.log.error(format!(
            "No object files to archive into {} [{}]",
            library.display(),
            ctx.config.name
        ));
        return Err(StageError::EmptyArchive { library });
    }

    // `ar rcs` appends to an existing archive; start from scratch instead.
    if library.exists()
        && let Err(source) = fs::remove_file(&library)
    {
        ctx.log.error(format!(
            "Failed to remove stale archive {} [{}]: {}",
            library.display(),
            ctx.config.name,
            source
        ));
        return Err(StageError::Io {
            stage: Stage::Archive,
            path: library,
            source,
        });
    }

    ctx.log.info(format!(
        "Creating archive {} ({} objects)...",
        library.display(),
        members.len()
    ));
    let command = archive_command(ctx.config, &library, &members);
    if let Err(error) = ctx.runner.run(&command) {
        ctx.log.error(format!(
            "Failed to create archive {} [{}]: {}",
            library.display(),
            ctx.config.name,
            error
        ));
        return Err(StageError::Archive { library, error });
    }

    Ok(Archive {
        path: library,
        members,
    })
}
