//! Core data structures for Keel.
//!
//! - Platform facts (OS family and file naming conventions)
//! - The `CMake.json` project descriptor

pub mod descriptor;
pub mod platform;

pub use descriptor::{DependencySet, ProjectDescriptor, ProjectKind};
pub use platform::{PlatformFacts, PlatformFamily};
