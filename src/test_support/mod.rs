//! Test utilities and mocks for Keel unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use keel::test_support::{descriptor, MockExecutor};
//!
//! #[test]
//! fn test_example() {
//!     let exec = MockExecutor::new().emulating_cmake().failing_on("--build", 2);
//!     let project = descriptor("app", ProjectKind::Executable, &["zlib"]);
//!
//!     // Drive an orchestrator with `&exec`, then inspect `exec.calls()`.
//! }
//! ```

use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;

use crate::builder::cmake::CACHE_FILE;
use crate::core::descriptor::{DependencySet, ProjectDescriptor, ProjectKind};
use crate::util::process::{Executor, ProcessBuilder, ProcessStatus};

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command line.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Any => true,
        }
    }
}

/// Mock executor that records commands instead of running them.
///
/// Every command succeeds unless a failure pattern matches. With
/// [`emulating_cmake`](MockExecutor::emulating_cmake), configure commands
/// leave a `CMakeCache.txt` behind in their working directory the way CMake
/// would.
#[derive(Debug, Default)]
pub struct MockExecutor {
    calls: Mutex<Vec<ProcessBuilder>>,
    failures: Vec<(CommandPattern, i32)>,
    emulate_cmake: bool,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Write a CMake cache when a configure command runs.
    pub fn emulating_cmake(mut self) -> Self {
        self.emulate_cmake = true;
        self
    }

    /// Fail commands containing `needle` with the given exit code.
    pub fn failing_on(mut self, needle: &str, code: i32) -> Self {
        self.failures
            .push((CommandPattern::Contains(needle.to_string()), code));
        self
    }

    /// Fail every command with the given exit code.
    pub fn failing_all(mut self, code: i32) -> Self {
        self.failures.push((CommandPattern::Any, code));
        self
    }

    /// Commands run so far, in order.
    pub fn calls(&self) -> Vec<ProcessBuilder> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, cmd: &ProcessBuilder) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(cmd.clone());
        }
    }
}

impl Executor for MockExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessStatus> {
        self.record(cmd);

        let line = cmd.display_command();
        if let Some((_, code)) = self.failures.iter().find(|(p, _)| p.matches(&line)) {
            return Ok(ProcessStatus::failure(*code));
        }

        if self.emulate_cmake {
            let build_type = cmd
                .get_args()
                .iter()
                .find_map(|a| a.strip_prefix("-DCMAKE_BUILD_TYPE="));
            if let (Some(build_type), Some(cwd)) = (build_type, cmd.get_cwd()) {
                write_cache(cwd, build_type);
            }
        }

        Ok(ProcessStatus::success())
    }
}

/// Write a minimal CMake cache recording `build_type` into `build_dir`.
pub fn write_cache(build_dir: &Path, build_type: &str) {
    std::fs::create_dir_all(build_dir).unwrap();
    std::fs::write(
        build_dir.join(CACHE_FILE),
        format!(
            "# This is the CMakeCache file.\n\
             CMAKE_BUILD_TYPE:STRING={}\n\
             CMAKE_CXX_COMPILER:STRING=g++\n",
            build_type
        ),
    )
    .unwrap();
}

/// Build a descriptor with default version and no extras.
pub fn descriptor(name: &str, kind: ProjectKind, deps: &[&str]) -> ProjectDescriptor {
    let (dependencies, dropped) = DependencySet::bounded(deps.iter().copied());
    assert!(dropped.is_empty(), "fixture exceeds dependency limit");

    ProjectDescriptor {
        name: name.to_string(),
        kind,
        dependencies,
        ..ProjectDescriptor::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_records_and_fails() {
        let exec = MockExecutor::new().failing_on("--build", 3);

        let ok = exec.run(&ProcessBuilder::new("cmake").arg("--version")).unwrap();
        let failed = exec
            .run(&ProcessBuilder::new("cmake").args(["--build", "."]))
            .unwrap();

        assert!(ok.is_success());
        assert_eq!(failed.code, Some(3));
        assert_eq!(exec.calls().len(), 2);
    }

    #[test]
    fn test_mock_emulates_cmake_cache() {
        let tmp = TempDir::new().unwrap();
        let exec = MockExecutor::new().emulating_cmake();

        exec.run(
            &ProcessBuilder::new("cmake")
                .arg("-DCMAKE_BUILD_TYPE=MinSizeRel")
                .cwd(tmp.path()),
        )
        .unwrap();

        let cache = std::fs::read_to_string(tmp.path().join(CACHE_FILE)).unwrap();
        assert!(cache.contains("CMAKE_BUILD_TYPE:STRING=MinSizeRel"));
    }
}
