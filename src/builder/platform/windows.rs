//! Windows platform strategy.
//!
//! Dependencies are discovered through CMake config packages (as installed
//! by vcpkg), builds use the MinGW generator, and files produced by the
//! toolchain may carry the read-only attribute.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::cmakelists::CMakeWriter;
use crate::core::descriptor::DependencySet;
use crate::core::platform::PlatformFacts;
use crate::util::fs::{make_writable, make_writable_recursive, remove_dir_all_if_exists};
use crate::util::process::Executor;

use super::PlatformStrategy;

/// Windows strategy.
#[derive(Debug, Clone, Copy)]
pub struct WindowsPlatform {
    facts: PlatformFacts,
}

impl WindowsPlatform {
    pub fn new(facts: PlatformFacts) -> Self {
        WindowsPlatform { facts }
    }
}

impl PlatformStrategy for WindowsPlatform {
    fn facts(&self) -> PlatformFacts {
        self.facts
    }

    fn write_dependency_discovery(&self, out: &mut CMakeWriter, deps: &DependencySet) {
        out.line("# Dependencies (CMake config packages)");
        for dep in deps.iter() {
            out.line(format!("find_package({} REQUIRED)", dep));
        }
        out.blank();
    }

    fn write_dependency_linking(&self, out: &mut CMakeWriter, target: &str, deps: &DependencySet) {
        out.blank();
        out.line("# Link dependencies");
        out.line(format!("target_include_directories({} PUBLIC", target));
        for dep in deps.iter() {
            out.line(format!("    ${{{}_INCLUDE_DIRS}}", dep));
        }
        out.line(")");
        out.line(format!("target_link_libraries({} PUBLIC", target));
        for dep in deps.iter() {
            out.line(format!("    ${{{}_LIBRARIES}}", dep));
        }
        out.line(")");
    }

    fn shared_library_destinations(&self) -> &'static [(&'static str, &'static str)] {
        // The DLL is a runtime artifact; its import library is an archive
        &[("RUNTIME", "bin"), ("LIBRARY", "lib"), ("ARCHIVE", "lib")]
    }

    fn default_install_prefix(&self) -> &'static str {
        ".\\install"
    }

    fn generator_args(&self, generator: &str) -> Vec<String> {
        vec!["-G".to_string(), generator.to_string()]
    }

    fn escape_install_prefix(&self, prefix: &str) -> String {
        prefix.replace('\\', "\\\\")
    }

    fn parallel_jobs(&self, _configured: Option<usize>) -> Option<usize> {
        None
    }

    fn elevates_installs(&self) -> bool {
        false
    }

    fn clear_build_dir(&self, dir: &Path) -> Result<()> {
        if !dir.exists() {
            return Ok(());
        }
        make_writable_recursive(dir)?;
        remove_dir_all_if_exists(dir)
    }

    fn remove_installed_file(
        &self,
        entry: &str,
        _sudo: Option<&Path>,
        _exec: &dyn Executor,
    ) -> Result<()> {
        let path = PathBuf::from(entry.replace('/', "\\"));
        if !path.exists() {
            bail!("file not found: {}", path.display());
        }
        make_writable(&path)?;
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to remove file: {}", path.display()))
    }
}
