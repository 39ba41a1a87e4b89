use std::path::PathBuf;

/// A configured input. Existence is checked at use time, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn display(&self) -> std::path::Display<'_> {
        self.path.display()
    }
}

impl From<&str> for SourceFile {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Result of one compile task.
///
/// `produced == false` marks a placeholder for a source that was missing at
/// compile time. Placeholders keep their slot so the stage output lines up
/// with the source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFile {
    pub path: PathBuf,
    pub source: SourceFile,
    pub produced: bool,
}

impl ObjectFile {
    /// Can this object go into the archive?
    pub fn is_usable(&self) -> bool {
        self.produced && self.path.exists()
    }
}

/// The static library for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub path: PathBuf,
    pub members: Vec<ObjectFile>,
}

/// An executable to link: output name plus its entry-point sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub entry_sources: Vec<SourceFile>,
}

impl Product {
    pub fn new<I, S>(name: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SourceFile>,
    {
        Self {
            name: name.into(),
            entry_sources: sources.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<String> for SourceFile {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    pub path: PathBuf,
    pub entry_sources: Vec<SourceFile>,
    pub library: PathBuf,
}
