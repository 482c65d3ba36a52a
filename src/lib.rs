//! Keel - project scaffolding and CMake build orchestration for C++
//!
//! This crate provides the library behind the `keel` command: the
//! `CMake.json` project descriptor, `CMakeLists.txt` synthesis, and a
//! build orchestrator that drives CMake through configure, build, install
//! and uninstall without reconfiguring when nothing changed.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for Keel unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a recording process executor and
/// descriptor fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::cmake::{BuildOrchestrator, BuildType, CacheState};
pub use core::descriptor::{ProjectDescriptor, ProjectKind};
pub use core::platform::{PlatformFacts, PlatformFamily};
pub use util::context::GlobalContext;
