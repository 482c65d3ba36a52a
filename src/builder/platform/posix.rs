//! POSIX (Linux, macOS) platform strategy.
//!
//! Dependencies are discovered through `pkg-config`, builds use CMake's
//! default generator with one job per available core, and installs write
//! outside the user's tree, so they run under `sudo`.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::builder::cmakelists::CMakeWriter;
use crate::core::descriptor::DependencySet;
use crate::core::platform::PlatformFacts;
use crate::util::fs::{remove_dir_all_if_exists, remove_dir_contents};
use crate::util::process::{Executor, ProcessBuilder};

use super::PlatformStrategy;

/// POSIX strategy.
#[derive(Debug, Clone, Copy)]
pub struct PosixPlatform {
    facts: PlatformFacts,
}

impl PosixPlatform {
    pub fn new(facts: PlatformFacts) -> Self {
        PosixPlatform { facts }
    }
}

impl PlatformStrategy for PosixPlatform {
    fn facts(&self) -> PlatformFacts {
        self.facts
    }

    fn write_dependency_discovery(&self, out: &mut CMakeWriter, deps: &DependencySet) {
        out.line("# Dependencies (pkg-config)");
        out.line("find_package(PkgConfig REQUIRED)");
        for dep in deps.iter() {
            out.line(format!("pkg_check_modules({0} REQUIRED {0})", dep));
        }

        out.blank();
        out.line("include_directories(");
        for dep in deps.iter() {
            out.line(format!("    ${{{}_INCLUDE_DIRS}}", dep));
        }
        out.line(")");
        out.line("link_directories(");
        for dep in deps.iter() {
            out.line(format!("    ${{{}_LIBRARY_DIRS}}", dep));
        }
        out.line(")");
        out.line("add_definitions(");
        for dep in deps.iter() {
            out.line(format!("    ${{{}_CFLAGS_OTHER}}", dep));
        }
        out.line(")");
        out.blank();
    }

    fn write_dependency_linking(&self, out: &mut CMakeWriter, target: &str, deps: &DependencySet) {
        out.blank();
        out.line("# Link dependencies");
        out.line(format!("target_link_libraries({} PUBLIC", target));
        for dep in deps.iter() {
            out.line(format!("    ${{{}_LIBRARIES}}", dep));
        }
        out.line(")");
    }

    fn shared_library_destinations(&self) -> &'static [(&'static str, &'static str)] {
        &[("LIBRARY", "lib")]
    }

    fn default_install_prefix(&self) -> &'static str {
        "/usr/local"
    }

    fn generator_args(&self, _generator: &str) -> Vec<String> {
        Vec::new()
    }

    fn escape_install_prefix(&self, prefix: &str) -> String {
        prefix.to_string()
    }

    fn parallel_jobs(&self, configured: Option<usize>) -> Option<usize> {
        configured.or_else(|| match std::thread::available_parallelism() {
            Ok(n) => Some(n.get()),
            Err(e) => {
                tracing::debug!("Could not probe available parallelism: {}", e);
                None
            }
        })
    }

    fn elevates_installs(&self) -> bool {
        true
    }

    fn clear_build_dir(&self, dir: &Path) -> Result<()> {
        match remove_dir_all_if_exists(dir) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::debug!("Fast removal failed ({:#}), removing entries one by one", e);
                remove_dir_contents(dir)
            }
        }
    }

    fn remove_installed_file(
        &self,
        entry: &str,
        sudo: Option<&Path>,
        exec: &dyn Executor,
    ) -> Result<()> {
        let path = Path::new(entry);
        if !path.exists() && !path.is_symlink() {
            bail!("file not found: {}", entry);
        }

        match sudo {
            Some(sudo) => {
                let cmd = ProcessBuilder::new("rm").args(["-f", entry]).wrapped_by(sudo);
                exec.run_checked(&cmd)
            }
            None => std::fs::remove_file(path)
                .with_context(|| format!("failed to remove file: {}", entry)),
        }
    }
}
