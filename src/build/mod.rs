mod archive;
mod artifact;
mod clean;
mod compdb;
mod compile;
mod error;
mod link;
pub mod log;
mod matrix;
mod pipeline;
pub mod runner;

#[cfg(test)]
mod testing;

pub use archive::{archive, archive_command};
pub use artifact::{Archive, Executable, ObjectFile, Product, SourceFile};
pub use clean::clean;
pub use compdb::{COMPDB_FILE, compile_database, write_compile_database};
pub use compile::{compile, compile_command};
pub use error::{BuildError, Stage, StageError};
pub use link::{link, link_all, link_command};
pub use log::{ConsoleSink, LogChannel, LogMessage, LogSender, LogSink, MemorySink, Severity};
pub use matrix::{BuildMatrix, FailurePolicy, MatrixReport, TargetOutcome};
pub use pipeline::{BuildPipeline, StageContext, TargetBuild, TargetState};
pub use runner::{CommandLine, ProcessError, ProcessRunner, SystemRunner};
