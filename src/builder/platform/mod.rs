//! Operating-system strategies.
//!
//! Everything that differs between Windows and POSIX hosts, in both the
//! generated build definition and the commands that drive CMake, lives
//! behind [`PlatformStrategy`]. One strategy is selected at startup from
//! [`PlatformFacts`] and passed to every call site.

use std::path::Path;

use anyhow::Result;

use crate::builder::cmakelists::CMakeWriter;
use crate::core::descriptor::DependencySet;
use crate::core::platform::{PlatformFacts, PlatformFamily};
use crate::util::process::Executor;

mod posix;
mod windows;

pub use posix::PosixPlatform;
pub use windows::WindowsPlatform;

/// Trait for platform-specific generation and command construction.
pub trait PlatformStrategy {
    /// The facts this strategy was selected for.
    fn facts(&self) -> PlatformFacts;

    /// Emit the package lookup for every dependency, in order.
    ///
    /// Only called when at least one dependency exists.
    fn write_dependency_discovery(&self, out: &mut CMakeWriter, deps: &DependencySet);

    /// Emit the statements that link `target` against every dependency.
    ///
    /// Only called when at least one dependency exists.
    fn write_dependency_linking(&self, out: &mut CMakeWriter, target: &str, deps: &DependencySet);

    /// `install(TARGETS ...)` destinations for a shared library.
    fn shared_library_destinations(&self) -> &'static [(&'static str, &'static str)];

    /// Install prefix used when none is configured.
    fn default_install_prefix(&self) -> &'static str;

    /// Extra arguments selecting a CMake generator, if this platform pins one.
    fn generator_args(&self, generator: &str) -> Vec<String>;

    /// Prepare an install prefix for use in a `-D` definition.
    fn escape_install_prefix(&self, prefix: &str) -> String;

    /// Number of parallel build jobs to request, `None` for CMake's default.
    fn parallel_jobs(&self, configured: Option<usize>) -> Option<usize>;

    /// Whether install and uninstall need elevated privileges.
    fn elevates_installs(&self) -> bool;

    /// Delete the contents of a build directory.
    ///
    /// The directory may or may not survive; callers recreate it.
    fn clear_build_dir(&self, dir: &Path) -> Result<()>;

    /// Remove one file listed in an install manifest.
    ///
    /// `sudo` is the elevation program to use, if elevation is enabled.
    fn remove_installed_file(
        &self,
        entry: &str,
        sudo: Option<&Path>,
        exec: &dyn Executor,
    ) -> Result<()>;
}

/// Select the strategy for the given platform facts.
pub fn strategy_for(facts: PlatformFacts) -> Box<dyn PlatformStrategy> {
    match facts.family() {
        PlatformFamily::Windows => Box::new(WindowsPlatform::new(facts)),
        PlatformFamily::MacOs | PlatformFamily::Linux => Box::new(PosixPlatform::new(facts)),
    }
}
