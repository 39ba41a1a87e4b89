use std::path::{Path, PathBuf};

/// Suffix for compiled object files.
pub const OBJECT_SUFFIX: &str = "o";

/// Which family a target belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Host toolchain (g++/clang++ on PATH)
    Desktop,
    /// Cross toolchain (NDK clang for one triple/API level)
    Cross,
}

/// Everything needed to run one target's pipeline.
///
/// Built once per target before any stage runs and never mutated afterwards.
/// Nothing here is validated up front: a bad compiler path shows up as a spawn
/// failure, a bad output directory as an I/O error on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// Target identifier (`desktop`, `armv7`, ...)
    pub name: String,

    pub kind: TargetKind,

    /// Compiler binary, also used as the linker driver
    pub compiler: PathBuf,

    /// Static archiver (`ar`, `llvm-ar`)
    pub archiver: PathBuf,

    pub compile_flags: Vec<String>,

    pub include_flags: Vec<String>,

    /// Extra arguments placed after the library on link lines
    pub link_flags: Vec<String>,

    /// Executables land here
    pub bin_dir: PathBuf,

    /// Objects and the static library land here
    pub obj_dir: PathBuf,

    /// Library name without `lib` prefix or `.a` suffix
    pub library_name: String,

    /// `.exe` for Windows desktop builds, empty otherwise
    pub exe_suffix: String,
}

impl ToolchainConfig {
    /// `<obj_dir>/<source stem>.o`
    pub fn object_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        self.obj_dir.join(format!("{}.{}", stem, OBJECT_SUFFIX))
    }

    /// `<obj_dir>/lib<name>.a`
    pub fn library_path(&self) -> PathBuf {
        self.obj_dir.join(format!("lib{}.a", self.library_name))
    }

    /// `<bin_dir>/<product><exe_suffix>`
    pub fn executable_path(&self, product: &str) -> PathBuf {
        self.bin_dir.join(format!("{}{}", product, self.exe_suffix))
    }

    pub fn is_cross(&self) -> bool {
        self.kind == TargetKind::Cross
    }
}
