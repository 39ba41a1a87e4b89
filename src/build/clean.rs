//! Build artifact cleanup.
//!
//! `bmx clean` removes the binary and object directories of every resolved
//! target. Source trees and `bmx.toml` are never touched.

use crate::toolchain::ToolchainConfig;
use anyhow::{Context, Result};
use colored::*;
use std::fs;

/// Returns how many directories were removed.
pub fn clean(targets: &[ToolchainConfig]) -> Result<usize> {
    let mut removed = 0;

    for target in targets {
        for dir in [&target.bin_dir, &target.obj_dir] {
            if dir.exists() {
                fs::remove_dir_all(dir)
                    .with_context(|| format!("Failed to remove {}", dir.display()))?;
                println!("{} Removed {} ({})", "🗑️".red(), dir.display(), target.name);
                removed += 1;
            }
        }
    }

    if removed > 0 {
        println!("{} Clean complete.", "✓".green());
    } else {
        println!("{} Nothing to clean", "!".yellow());
    }
    Ok(removed)
}
