//! `compile_commands.json` generation for editor tooling.

use super::artifact::SourceFile;
use super::compile::compile_command;
use crate::toolchain::ToolchainConfig;
use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

pub const COMPDB_FILE: &str = "compile_commands.json";

/// One entry per source that exists, using the exact compile argv.
pub fn compile_database(
    config: &ToolchainConfig,
    sources: &[SourceFile],
    directory: &Path,
) -> serde_json::Value {
    let directory = directory.to_string_lossy().to_string();
    let entries: Vec<serde_json::Value> = sources
        .iter()
        .filter(|s| s.exists())
        .map(|source| {
            let object = config.object_path(&source.path);
            let command = compile_command(config, &source.path, &object);
            let mut arguments = vec![command.program_name()];
            arguments.extend(command.args);
            json!({
                "directory": directory,
                "arguments": arguments,
                "file": source.path.to_string_lossy(),
                "output": object.to_string_lossy(),
            })
        })
        .collect();
    serde_json::Value::Array(entries)
}

/// Write `<obj_dir>/compile_commands.json`
pub fn write_compile_database(config: &ToolchainConfig, sources: &[SourceFile]) -> Result<PathBuf> {
    let current_dir = std::env::current_dir()?;
    let db = compile_database(config, sources, &current_dir);
    let path = config.obj_dir.join(COMPDB_FILE);
    let json_str = serde_json::to_string_pretty(&db)?;
    fs::write(&path, json_str).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
