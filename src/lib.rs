//! # buildmatrix - Multi-Target Native Build Orchestrator
//!
//! buildmatrix compiles one fixed set of C/C++ sources into a static library
//! and links a handful of executables against it, once for the desktop
//! toolchain and once for every configured cross toolchain (Android NDK
//! triples out of the box).
//!
//! ## Features
//!
//! - **Parallel Compiles**: every source of a target is compiled at once on a
//!   shared, explicitly sized worker pool
//! - **Strict Ordering**: archive waits for all compiles, links wait for the archive
//! - **Best-Effort Sources**: missing sources are skipped with a warning
//! - **Ordered Logging**: one consumer thread serializes all progress output
//! - **Explicit Failure Policy**: continue past a failed target or stop
//!
//! ## Quick Start
//!
//! ```bash
//! bmx init       # write a default bmx.toml
//! bmx targets    # show the resolved toolchains
//! bmx build -j 8
//! ```
//!
//! ## Module Organization
//!
//! - [`build`] - Stages, pipeline, matrix and the log channel
//! - [`config`] - Configuration parsing (`bmx.toml`)
//! - [`toolchain`] - Per-target toolchain resolution
//! - [`ui`] - Terminal tables

/// Compile, archive and link stages plus the orchestration around them.
pub mod build;

/// Configuration file parsing (`bmx.toml`).
pub mod config;

/// Desktop and cross toolchain resolution.
pub mod toolchain;

/// Terminal UI utilities (tables).
pub mod ui;
