//! Build target resolution
//!
//! Turns the `[desktop]` and `[cross]` sections of `bmx.toml` into one
//! [`ToolchainConfig`] per target. The desktop target always comes first,
//! followed by the cross targets in declared order.
//!
//! Cross targets use the Android NDK's LLVM toolchain. The NDK root is taken
//! from the config, then `$ANDROID_NDK_HOME`, `$ANDROID_NDK_ROOT`, and finally
//! the default SDK location under the home directory. Discovered locations
//! must exist; the configured one is taken as written.
//!
//! A missing NDK does not stop resolution. Cross compilers are rooted at
//! [`MISSING_NDK`] instead, so those targets fail when their first compile
//! cannot start while the desktop target still builds.

pub mod types;

pub use types::{OBJECT_SUFFIX, TargetKind, ToolchainConfig};

use crate::config::{CrossConfig, CrossTarget, MatrixConfig};
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

pub const DESKTOP_TARGET: &str = "desktop";

/// Stand-in NDK root used when no NDK could be found
pub const MISSING_NDK: &str = "ANDROID_NDK_NOT_FOUND";

/// Resolve every configured target, desktop first
pub fn resolve_targets(config: &MatrixConfig) -> Result<Vec<ToolchainConfig>> {
    let ndk = config.cross.as_ref().and_then(locate_ndk);
    resolve_targets_with_ndk(config, ndk)
}

/// Resolve targets against an already located NDK root.
///
/// `None` roots every cross compiler at [`MISSING_NDK`].
pub fn resolve_targets_with_ndk(
    config: &MatrixConfig,
    ndk: Option<PathBuf>,
) -> Result<Vec<ToolchainConfig>> {
    let mut targets = vec![desktop_toolchain(config)];

    if let Some(cross) = &config.cross
        && !cross.targets.is_empty()
    {
        let ndk = ndk.unwrap_or_else(|| PathBuf::from(MISSING_NDK));
        let host = cross.host.clone().unwrap_or_else(|| host_tag().to_string());
        for target in &cross.targets {
            targets.push(cross_toolchain(config, cross, target, &ndk, &host));
        }
    }

    for tc in &targets {
        if tc.bin_dir == tc.obj_dir {
            bail!(
                "Target '{}' uses the same directory for binaries and objects: {}",
                tc.name,
                tc.bin_dir.display()
            );
        }
    }

    Ok(targets)
}

fn desktop_toolchain(config: &MatrixConfig) -> ToolchainConfig {
    let desktop = &config.desktop;
    ToolchainConfig {
        name: DESKTOP_TARGET.to_string(),
        kind: TargetKind::Desktop,
        compiler: PathBuf::from(&desktop.compiler),
        archiver: PathBuf::from(&desktop.archiver),
        compile_flags: desktop.flags.clone(),
        include_flags: desktop.includes.clone(),
        link_flags: desktop.link_flags.clone(),
        bin_dir: desktop.bin_dir.clone(),
        obj_dir: desktop.obj_dir.clone(),
        library_name: config.project.library.clone(),
        exe_suffix: if cfg!(target_os = "windows") {
            ".exe".to_string()
        } else {
            String::new()
        },
    }
}

fn cross_toolchain(
    config: &MatrixConfig,
    cross: &CrossConfig,
    target: &CrossTarget,
    ndk: &Path,
    host: &str,
) -> ToolchainConfig {
    let mut include_flags = cross.includes.clone();
    include_flags.push(format!(
        "-I{}",
        ndk.join("sources").join("android").display()
    ));

    ToolchainConfig {
        name: target.name.clone(),
        kind: TargetKind::Cross,
        compiler: ndk_compiler(ndk, host, &target.triple, &target.api),
        archiver: PathBuf::from(&cross.archiver),
        compile_flags: cross.flags.clone(),
        include_flags,
        link_flags: cross.link_flags.clone(),
        bin_dir: cross.bin_dir.join(target.subdir()),
        obj_dir: cross.obj_dir.join(target.subdir()),
        library_name: config.project.library.clone(),
        exe_suffix: String::new(),
    }
}

/// `<ndk>/toolchains/llvm/prebuilt/<host>/bin/<triple><api>-clang++`
pub fn ndk_compiler(ndk: &Path, host: &str, triple: &str, api: &str) -> PathBuf {
    ndk.join("toolchains")
        .join("llvm")
        .join("prebuilt")
        .join(host)
        .join("bin")
        .join(format!("{}{}-clang++", triple, api))
}

/// Find the NDK root for cross builds
pub fn locate_ndk(cross: &CrossConfig) -> Option<PathBuf> {
    search_ndk(cross, |var| std::env::var(var).ok(), dirs::home_dir())
}

fn search_ndk(
    cross: &CrossConfig,
    env: impl Fn(&str) -> Option<String>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(ndk) = &cross.ndk {
        return Some(ndk.clone());
    }

    let from_env = ["ANDROID_NDK_HOME", "ANDROID_NDK_ROOT"]
        .into_iter()
        .filter_map(|var| env(var))
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    let bundled = home.map(|home| home.join("Android").join("Sdk").join("ndk-bundle"));

    from_env.chain(bundled).find(|candidate| candidate.is_dir())
}

/// Names of cross targets whose compiler is rooted at [`MISSING_NDK`]
pub fn unresolved_targets(targets: &[ToolchainConfig]) -> Vec<&str> {
    targets
        .iter()
        .filter(|tc| tc.is_cross() && tc.compiler.starts_with(MISSING_NDK))
        .map(|tc| tc.name.as_str())
        .collect()
}

/// NDK prebuilt directory name for the machine running the build
pub fn host_tag() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows-x86_64"
    } else if cfg!(target_os = "macos") {
        "darwin-x86_64"
    } else {
        "linux-x86_64"
    }
}
