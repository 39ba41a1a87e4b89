use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "bmx.toml";

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MatrixConfig {
    pub project: ProjectConfig,
    #[serde(default, rename = "product")]
    pub products: Vec<ProductConfig>,
    #[serde(default)]
    pub desktop: DesktopConfig,
    pub cross: Option<CrossConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProjectConfig {
    /// Static library name, without the `lib` prefix or `.a` suffix.
    pub library: String,
    pub sources: Vec<String>,
    /// Worker threads for the compile pool. 0 = available parallelism.
    #[serde(default)]
    pub jobs: usize,
    #[serde(default = "default_true")]
    pub continue_on_failure: bool,
    #[serde(default)]
    pub compile_commands: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProductConfig {
    pub name: String,
    pub sources: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DesktopConfig {
    #[serde(default = "default_desktop_compiler")]
    pub compiler: String,
    #[serde(default = "default_archiver")]
    pub archiver: String,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default)]
    pub link_flags: Vec<String>,
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,
    #[serde(default = "default_obj_dir")]
    pub obj_dir: PathBuf,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            compiler: default_desktop_compiler(),
            archiver: default_archiver(),
            flags: Vec::new(),
            includes: default_includes(),
            link_flags: Vec::new(),
            bin_dir: default_bin_dir(),
            obj_dir: default_obj_dir(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CrossConfig {
    /// NDK root. Falls back to the environment when unset.
    pub ndk: Option<PathBuf>,
    /// Prebuilt host tag, e.g. `linux-x86_64`. Detected when unset.
    pub host: Option<String>,
    #[serde(default = "default_archiver")]
    pub archiver: String,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default)]
    pub link_flags: Vec<String>,
    #[serde(default = "default_cross_bin_dir")]
    pub bin_dir: PathBuf,
    #[serde(default = "default_cross_obj_dir")]
    pub obj_dir: PathBuf,
    #[serde(default, rename = "target")]
    pub targets: Vec<CrossTarget>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CrossTarget {
    pub name: String,
    pub triple: String,
    pub api: String,
    /// Output subdirectory under the cross bin/obj roots. Defaults to `name`.
    pub subdir: Option<String>,
}

impl CrossTarget {
    pub fn subdir(&self) -> &str {
        self.subdir.as_deref().unwrap_or(&self.name)
    }
}

fn default_true() -> bool {
    true
}

fn default_desktop_compiler() -> String {
    "g++".to_string()
}

fn default_archiver() -> String {
    "ar".to_string()
}

fn default_includes() -> Vec<String> {
    vec!["-I.".to_string()]
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from("bin")
}

fn default_obj_dir() -> PathBuf {
    PathBuf::from("obj")
}

fn default_cross_bin_dir() -> PathBuf {
    PathBuf::from("android_bin")
}

fn default_cross_obj_dir() -> PathBuf {
    PathBuf::from("android_obj")
}

// --- Helper: Load Config ---
pub fn load_config(path: &Path) -> Result<MatrixConfig> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "{} not found.\n\n\
            💡 Tip: Run 'bmx init' to create one.",
            path.display()
        ));
    }
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&config_str).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_config(config_str: &str) -> Result<MatrixConfig> {
    let config: MatrixConfig = toml::from_str(config_str)?;
    Ok(config)
}

/// The reference project: a bytecode library plus two tools, built for the
/// desktop and two Android ABIs.
pub fn default_config() -> MatrixConfig {
    let mut sources: Vec<String> = [
        "bytecode.cpp",
        "data.cpp",
        "pyc_code.cpp",
        "pyc_module.cpp",
        "pyc_numeric.cpp",
        "pyc_object.cpp",
        "pyc_sequence.cpp",
        "pyc_string.cpp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    for major in 1..=3 {
        for minor in 0..=13 {
            sources.push(format!("bytes/python_{}_{}.cpp", major, minor));
        }
    }

    let strict = |extra: &[&str]| -> Vec<String> {
        ["-std=c++11", "-Wall", "-Wextra"]
            .iter()
            .chain(extra.iter())
            .map(|s| s.to_string())
            .collect()
    };

    MatrixConfig {
        project: ProjectConfig {
            library: "pycxx".to_string(),
            sources,
            jobs: 0,
            continue_on_failure: true,
            compile_commands: false,
        },
        products: vec![
            ProductConfig {
                name: "pycdas".to_string(),
                sources: vec!["pycdas.cpp".to_string()],
            },
            ProductConfig {
                name: "pycdc".to_string(),
                sources: vec![
                    "pycdc.cpp".to_string(),
                    "ASTree.cpp".to_string(),
                    "ASTNode.cpp".to_string(),
                ],
            },
        ],
        desktop: DesktopConfig {
            flags: strict(&["-Wno-error=shadow", "-Werror"]),
            ..DesktopConfig::default()
        },
        cross: Some(CrossConfig {
            ndk: None,
            host: None,
            archiver: default_archiver(),
            flags: strict(&[]),
            includes: default_includes(),
            link_flags: Vec::new(),
            bin_dir: default_cross_bin_dir(),
            obj_dir: default_cross_obj_dir(),
            targets: vec![
                CrossTarget {
                    name: "armv7".to_string(),
                    triple: "armv7a-linux-androideabi".to_string(),
                    api: "21".to_string(),
                    subdir: Some("armv7".to_string()),
                },
                CrossTarget {
                    name: "aarch64".to_string(),
                    triple: "aarch64-linux-android".to_string(),
                    api: "21".to_string(),
                    subdir: Some("aarch64".to_string()),
                },
            ],
        }),
    }
}

/// Write a default `bmx.toml`; refuses to overwrite.
pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(anyhow::anyhow!("{} already exists", path.display()));
    }
    let content = toml::to_string_pretty(&default_config())?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Created {}", "✓".green(), path.display());
    Ok(())
}
