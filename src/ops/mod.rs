//! High-level operations.
//!
//! This module contains the implementation of Keel commands.

pub mod keel_build;
pub mod keel_get;
pub mod keel_install;
pub mod keel_new;

pub use keel_build::{build, clean, BuildOptions, BuildResult};
pub use keel_get::{get, library_name, Cloner, GetOptions, GetReport, GitCloner};
pub use keel_install::{install, uninstall};
pub use keel_new::{init_project, new_project, NewOptions, ProjectSummary};
