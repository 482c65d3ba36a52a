//! CMake generation and orchestration.
//!
//! This module turns a project descriptor into a `CMakeLists.txt` and
//! drives CMake over the resulting build directory.

pub mod cmake;
pub mod cmakelists;
pub mod platform;
pub mod toolchain;

pub use cmake::{BuildOrchestrator, OrchestratorError, OrchestratorSettings};
pub use cmakelists::{synthesize, write_cmakelists};
pub use platform::{strategy_for, PlatformStrategy};
pub use toolchain::{CompilerToolchain, GccToolchain, MsvcToolchain};
