//! CMake build orchestration.
//!
//! [`BuildOrchestrator`] drives one build directory through
//! configure / build / install / uninstall / clean. Whether a configure step
//! is needed is decided from the `CMAKE_BUILD_TYPE` recorded in
//! `CMakeCache.txt`:
//!
//! - no cache file: configure
//! - cached type equals the requested type: skip straight to the build
//! - cached type differs or cannot be read: configure again
//!
//! The process working directory is never changed; every subprocess gets an
//! explicit working directory instead.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use thiserror::Error;

use crate::builder::platform::PlatformStrategy;
use crate::builder::toolchain::{default_toolchain, GccToolchain};
use crate::util::config::Config;
use crate::util::fs::{ensure_dir, read_to_string};
use crate::util::process::{find_executable, Executor, ProcessBuilder, ProcessStatus};

/// Cache file written by CMake into the build directory.
pub const CACHE_FILE: &str = "CMakeCache.txt";

/// Manifest written by `cmake --install` into the build directory.
pub const INSTALL_MANIFEST: &str = "install_manifest.txt";

const BUILD_TYPE_ENTRY: &str = "CMAKE_BUILD_TYPE:STRING";

/// CMake build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildType {
    #[default]
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err(format!(
                "invalid build type '{}'; expected Debug, Release, RelWithDebInfo, or MinSizeRel",
                s
            )),
        }
    }
}

/// What the build directory currently holds relative to a requested build type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    /// No `CMakeCache.txt` exists.
    NoCache,
    /// The cache was configured for the requested build type.
    Fresh,
    /// The cache records another build type, or none could be read.
    Stale { recorded: Option<String> },
}

/// Read the `CMAKE_BUILD_TYPE` entry from a CMake cache file.
///
/// Returns `Ok(None)` if the file has no such entry.
pub fn read_cached_build_type(cache_file: &Path) -> Result<Option<String>> {
    let contents = read_to_string(cache_file)?;
    Ok(parse_cached_build_type(&contents))
}

fn parse_cached_build_type(contents: &str) -> Option<String> {
    contents
        .lines()
        .filter(|line| line.starts_with(BUILD_TYPE_ENTRY))
        .find_map(|line| line.split_once('='))
        .map(|(_, value)| value.trim().to_string())
}

/// Classify a build directory's cache against the requested build type.
pub fn cache_state(build_dir: &Path, requested: BuildType) -> CacheState {
    let cache_file = build_dir.join(CACHE_FILE);
    if !cache_file.exists() {
        return CacheState::NoCache;
    }

    match read_cached_build_type(&cache_file) {
        Ok(Some(recorded)) if recorded == requested.as_str() => CacheState::Fresh,
        Ok(recorded) => CacheState::Stale { recorded },
        Err(e) => {
            tracing::warn!("Failed to read CMake cache: {:#}", e);
            CacheState::Stale { recorded: None }
        }
    }
}

/// Orchestration failures caused by an external tool.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("CMake configuration failed: `{command}` {}", exit_description(code))]
    ConfigureFailed { command: String, code: Option<i32> },

    #[error("build failed: `{command}` {}", exit_description(code))]
    BuildFailed { command: String, code: Option<i32> },

    #[error("install failed: `{command}` {}", exit_description(code))]
    InstallFailed { command: String, code: Option<i32> },

    #[error("install manifest not found: {}\n\nhelp: Run `keel install` first", .0.display())]
    MissingManifest(PathBuf),

    #[error("uninstall incomplete: {failed} of {total} file(s) could not be removed")]
    UninstallIncomplete { failed: usize, total: usize },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

/// Parameters for a configure step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureRequest {
    pub build_type: BuildType,
    pub install_prefix: String,
    /// Additional arguments passed verbatim to CMake
    pub extra_args: Vec<String>,
}

/// Result of [`BuildOrchestrator::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureOutcome {
    Configured,
    Skipped,
}

/// Aggregate result of an uninstall.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallReport {
    /// Manifest entries that were removed
    pub removed: Vec<String>,
    /// Manifest entries that could not be removed
    pub failed: Vec<String>,
}

impl UninstallReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.removed.len() + self.failed.len()
    }

    /// Turn a report with failures into an error.
    pub fn into_result(self) -> Result<Self> {
        if !self.is_success() {
            return Err(OrchestratorError::UninstallIncomplete {
                failed: self.failed.len(),
                total: self.total(),
            }
            .into());
        }
        Ok(self)
    }
}

/// Tools and knobs used by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub cmake: PathBuf,
    pub cc: PathBuf,
    pub cxx: PathBuf,
    pub generator: String,
    pub jobs: Option<usize>,
    /// Elevate installs on platforms that require it
    pub elevate: bool,
    pub sudo: PathBuf,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        OrchestratorSettings::from_config(&Config::default())
    }
}

impl OrchestratorSettings {
    /// Derive settings from merged configuration.
    pub fn from_config(config: &Config) -> Self {
        let (default_cc, default_cxx) = default_toolchain().default_compilers();
        let tc = &config.toolchain;

        let cc = tc.cc.clone().unwrap_or_else(|| PathBuf::from(default_cc));
        let cxx = match (&tc.cxx, &tc.cc) {
            (Some(cxx), _) => cxx.clone(),
            (None, Some(cc)) => GccToolchain::infer_cxx(cc),
            (None, None) => PathBuf::from(default_cxx),
        };

        OrchestratorSettings {
            cmake: tc.cmake.clone().unwrap_or_else(|| PathBuf::from("cmake")),
            cc,
            cxx,
            generator: config.generator().to_string(),
            jobs: config.build.jobs,
            elevate: config.install.elevate.unwrap_or(true),
            sudo: locate(Path::new("sudo")),
        }
    }

    /// Fail early with an actionable message if CMake is not installed.
    pub fn check_cmake(&self) -> Result<()> {
        if self.cmake.is_file() || find_executable(&self.cmake.to_string_lossy()).is_some() {
            return Ok(());
        }
        bail!(
            "CMake not found: `{}`\n\
             \n\
             Install CMake and ensure it's in your PATH,\n\
             or set `toolchain.cmake` in .keel/config.toml.",
            self.cmake.display()
        )
    }
}

/// Absolute path of a bare program name found on `PATH`.
///
/// Paths with a directory part, and names that cannot be found, are
/// returned unchanged.
fn locate(program: &Path) -> PathBuf {
    if program.components().count() > 1 {
        return program.to_path_buf();
    }
    find_executable(&program.to_string_lossy()).unwrap_or_else(|| program.to_path_buf())
}

/// Drives CMake for one project and build directory.
pub struct BuildOrchestrator<'a> {
    platform: &'a dyn PlatformStrategy,
    exec: &'a dyn Executor,
    settings: OrchestratorSettings,
    source_dir: PathBuf,
    build_dir: PathBuf,
}

impl<'a> BuildOrchestrator<'a> {
    /// Create an orchestrator for `source_dir`.
    ///
    /// A relative `build_dir` is taken relative to `source_dir`.
    pub fn new(
        platform: &'a dyn PlatformStrategy,
        exec: &'a dyn Executor,
        settings: OrchestratorSettings,
        source_dir: impl Into<PathBuf>,
        build_dir: impl AsRef<Path>,
    ) -> Self {
        let source_dir = source_dir.into();
        let build_dir = source_dir.join(build_dir.as_ref());
        BuildOrchestrator {
            platform,
            exec,
            settings,
            source_dir,
            build_dir,
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Current cache state for the requested build type.
    pub fn cache_state(&self, build_type: BuildType) -> CacheState {
        cache_state(&self.build_dir, build_type)
    }

    /// Configure the build directory unless its cache already matches.
    pub fn configure(&self, req: &ConfigureRequest) -> Result<ConfigureOutcome> {
        ensure_dir(&self.build_dir)?;

        match self.cache_state(req.build_type) {
            CacheState::Fresh => {
                tracing::info!(
                    "Existing CMake cache matches build type {}, skipping configure",
                    req.build_type
                );
                return Ok(ConfigureOutcome::Skipped);
            }
            CacheState::NoCache => {
                tracing::info!("No CMake cache found, configuring");
            }
            CacheState::Stale {
                recorded: Some(recorded),
            } => {
                tracing::info!(
                    "Build type changed from {} to {}, reconfiguring",
                    recorded,
                    req.build_type
                );
            }
            CacheState::Stale { recorded: None } => {
                tracing::info!("CMake cache has no usable build type, reconfiguring");
            }
        }

        self.run_configure(req)?;
        Ok(ConfigureOutcome::Configured)
    }

    /// The configure command for a request.
    pub fn configure_command(&self, req: &ConfigureRequest) -> ProcessBuilder {
        ProcessBuilder::new(&self.settings.cmake)
            .arg("-S")
            .arg(&self.source_dir)
            .arg("-B")
            .arg(&self.build_dir)
            .args(self.platform.generator_args(&self.settings.generator))
            .arg(format!("-DCMAKE_BUILD_TYPE={}", req.build_type))
            .arg(format!(
                "-DCMAKE_INSTALL_PREFIX={}",
                self.platform.escape_install_prefix(&req.install_prefix)
            ))
            .arg(format!("-DCMAKE_C_COMPILER={}", self.settings.cc.display()))
            .arg(format!("-DCMAKE_CXX_COMPILER={}", self.settings.cxx.display()))
            .args(&req.extra_args)
            .cwd(&self.build_dir)
    }

    fn run_configure(&self, req: &ConfigureRequest) -> Result<()> {
        let cmd = self.configure_command(req);
        tracing::info!("Configuring: {}", cmd.display_command());

        let status = self.exec.run(&cmd)?;
        check_status(status, &cmd, |command, code| OrchestratorError::ConfigureFailed {
            command,
            code,
        })
    }

    /// The build command, with a parallelism hint where the platform wants one.
    pub fn build_command(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.settings.cmake)
            .arg("--build")
            .arg(&self.build_dir);

        if let Some(jobs) = self.platform.parallel_jobs(self.settings.jobs) {
            cmd = cmd.arg("--parallel").arg(jobs.to_string());
        }

        cmd.cwd(&self.build_dir)
    }

    /// Run the build step unless `configure_only` is set.
    pub fn build(&self, configure_only: bool) -> Result<()> {
        if configure_only {
            tracing::info!("Configure only, skipping build");
            return Ok(());
        }

        let cmd = self.build_command();
        tracing::info!("Building: {}", cmd.display_command());

        let status = self.exec.run(&cmd)?;
        check_status(status, &cmd, |command, code| OrchestratorError::BuildFailed {
            command,
            code,
        })
    }

    /// Delete everything in the build directory and leave it empty.
    ///
    /// The directory exists afterwards even when deletion fails part-way.
    pub fn clean_cache(&self) -> Result<()> {
        let cleared = match fs::symlink_metadata(&self.build_dir) {
            Ok(meta) if meta.is_dir() => self
                .platform
                .clear_build_dir(&self.build_dir)
                .with_context(|| {
                    format!("failed to clean build directory: {}", self.build_dir.display())
                }),
            Ok(_) => {
                tracing::warn!(
                    "{} is not a directory, replacing it",
                    self.build_dir.display()
                );
                fs::remove_file(&self.build_dir).with_context(|| {
                    format!("failed to remove {}", self.build_dir.display())
                })
            }
            Err(_) => {
                tracing::info!(
                    "Build directory {} does not exist, nothing to clean",
                    self.build_dir.display()
                );
                Ok(())
            }
        };

        let recreated = ensure_dir(&self.build_dir);
        cleared?;
        recreated
    }

    /// Prefix the command with `sudo` when installs are elevated.
    fn maybe_elevate(&self, cmd: ProcessBuilder) -> ProcessBuilder {
        match self.sudo() {
            Some(sudo) => cmd.wrapped_by(sudo),
            None => cmd,
        }
    }

    fn sudo(&self) -> Option<&Path> {
        (self.settings.elevate && self.platform.elevates_installs())
            .then_some(self.settings.sudo.as_path())
    }

    /// The install command for an optional prefix override.
    pub fn install_command(&self, prefix: Option<&str>) -> ProcessBuilder {
        // sudo resets PATH, so an elevated cmake is named by absolute path
        let cmake = match self.sudo() {
            Some(_) => locate(&self.settings.cmake),
            None => self.settings.cmake.clone(),
        };
        let mut cmd = ProcessBuilder::new(cmake)
            .arg("--install")
            .arg(&self.build_dir);

        if let Some(prefix) = prefix {
            cmd = cmd.arg("--prefix").arg(prefix);
        }

        self.maybe_elevate(cmd.cwd(&self.build_dir))
    }

    /// Install the built project.
    pub fn install(&self, prefix: Option<&str>) -> Result<()> {
        if !self.build_dir.is_dir() {
            bail!(
                "build directory not found: {}\n\nhelp: Run `keel build` first",
                self.build_dir.display()
            );
        }

        let cmd = self.install_command(prefix);
        tracing::info!("Installing: {}", cmd.display_command());

        let status = self.exec.run(&cmd)?;
        check_status(status, &cmd, |command, code| OrchestratorError::InstallFailed {
            command,
            code,
        })
    }

    /// Remove every file listed in the install manifest.
    ///
    /// Each entry is attempted independently; the report says which ones
    /// failed.
    pub fn uninstall(&self) -> Result<UninstallReport> {
        let manifest = self.build_dir.join(INSTALL_MANIFEST);
        if !manifest.is_file() {
            return Err(OrchestratorError::MissingManifest(manifest).into());
        }

        let contents = read_to_string(&manifest)?;
        let sudo = self.sudo();
        let mut report = UninstallReport::default();

        for entry in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match self.platform.remove_installed_file(entry, sudo, self.exec) {
                Ok(()) => {
                    tracing::info!("Removed {}", entry);
                    report.removed.push(entry.to_string());
                }
                Err(e) => {
                    tracing::warn!("Failed to remove {}: {:#}", entry, e);
                    report.failed.push(entry.to_string());
                }
            }
        }

        Ok(report)
    }
}

fn check_status(
    status: ProcessStatus,
    cmd: &ProcessBuilder,
    error: impl FnOnce(String, Option<i32>) -> OrchestratorError,
) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(error(cmd.display_command(), status.code).into())
    }
}

/// Check if a directory contains a CMake project.
pub fn is_cmake_project(dir: &Path) -> bool {
    dir.join(crate::builder::cmakelists::CMAKELISTS_FILE).exists()
}
