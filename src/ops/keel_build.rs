//! Implementation of `keel build` and `keel clean`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::cmake::{
    is_cmake_project, BuildOrchestrator, BuildType, ConfigureOutcome, ConfigureRequest,
    OrchestratorSettings,
};
use crate::builder::platform::PlatformStrategy;
use crate::util::config::DEFAULT_BUILD_DIR;
use crate::util::process::Executor;

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// CMake build type
    pub build_type: BuildType,

    /// Install prefix recorded at configure time (None = platform default)
    pub install_prefix: Option<String>,

    /// Stop after configuring
    pub configure_only: bool,

    /// Build directory relative to the project (None = `build`)
    pub build_dir: Option<PathBuf>,

    /// Wipe the build directory before configuring
    pub clean_cache: bool,

    /// Extra arguments passed to the configure step
    pub extra_args: Vec<String>,
}

impl BuildOptions {
    pub fn build_dir(&self) -> PathBuf {
        self.build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR))
    }
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub configure: ConfigureOutcome,
    pub built: bool,
    pub build_dir: PathBuf,
}

/// Configure (if needed) and build the project in `project_dir`.
///
/// Steps run strictly in order, each only after the previous one succeeded:
/// clean, create the build directory, configure, build.
pub fn build(
    project_dir: &Path,
    opts: &BuildOptions,
    platform: &dyn PlatformStrategy,
    exec: &dyn Executor,
    settings: OrchestratorSettings,
) -> Result<BuildResult> {
    if !is_cmake_project(project_dir) {
        bail!(
            "could not find `CMakeLists.txt` in `{}`\n\
             \n\
             Run `keel init` to generate it from CMake.json.",
            project_dir.display()
        );
    }

    let orch = BuildOrchestrator::new(platform, exec, settings, project_dir, opts.build_dir());

    if opts.clean_cache {
        tracing::info!("Cleaning {}", orch.build_dir().display());
        orch.clean_cache()?;
    }

    let request = ConfigureRequest {
        build_type: opts.build_type,
        install_prefix: opts
            .install_prefix
            .clone()
            .unwrap_or_else(|| platform.default_install_prefix().to_string()),
        extra_args: opts.extra_args.clone(),
    };

    let configure = orch.configure(&request)?;
    orch.build(opts.configure_only)?;

    Ok(BuildResult {
        configure,
        built: !opts.configure_only,
        build_dir: orch.build_dir().to_path_buf(),
    })
}

/// Empty the build directory of `project_dir`, leaving it in place.
pub fn clean(
    project_dir: &Path,
    build_dir: &Path,
    platform: &dyn PlatformStrategy,
    exec: &dyn Executor,
    settings: OrchestratorSettings,
) -> Result<PathBuf> {
    let orch = BuildOrchestrator::new(platform, exec, settings, project_dir, build_dir);
    orch.clean_cache()?;
    Ok(orch.build_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::platform::strategy_for;
    use crate::core::platform::{PlatformFacts, PlatformFamily};
    use crate::test_support::{write_cache, MockExecutor};
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("CMakeLists.txt"), "project(app)\n").unwrap();
        tmp
    }

    fn settings() -> OrchestratorSettings {
        OrchestratorSettings {
            jobs: Some(2),
            ..OrchestratorSettings::default()
        }
    }

    fn linux() -> Box<dyn PlatformStrategy> {
        strategy_for(PlatformFacts::new(PlatformFamily::Linux))
    }

    #[test]
    fn test_build_configures_then_builds() {
        let tmp = project();
        let exec = MockExecutor::new().emulating_cmake();

        let result = build(tmp.path(), &BuildOptions::default(), linux().as_ref(), &exec, settings())
            .unwrap();

        assert_eq!(result.configure, ConfigureOutcome::Configured);
        assert!(result.built);

        let calls = exec.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0]
            .get_args()
            .contains(&"-DCMAKE_INSTALL_PREFIX=/usr/local".to_string()));
        assert!(calls[1].get_args().contains(&"--build".to_string()));
    }

    #[test]
    fn test_second_build_skips_configure() {
        let tmp = project();
        let exec = MockExecutor::new().emulating_cmake();
        let opts = BuildOptions::default();

        build(tmp.path(), &opts, linux().as_ref(), &exec, settings()).unwrap();
        let second = build(tmp.path(), &opts, linux().as_ref(), &exec, settings()).unwrap();

        assert_eq!(second.configure, ConfigureOutcome::Skipped);
        // configure, build, build
        assert_eq!(exec.calls().len(), 3);
    }

    #[test]
    fn test_configure_failure_stops_before_build() {
        let tmp = project();
        let exec = MockExecutor::new().failing_on("-DCMAKE_BUILD_TYPE", 1);

        assert!(build(tmp.path(), &BuildOptions::default(), linux().as_ref(), &exec, settings())
            .is_err());
        assert_eq!(exec.calls().len(), 1);
    }

    #[test]
    fn test_clean_cache_forces_configure() {
        let tmp = project();
        write_cache(&tmp.path().join("out"), "Release");
        let exec = MockExecutor::new().emulating_cmake();
        let opts = BuildOptions {
            build_type: BuildType::Release,
            build_dir: Some(PathBuf::from("out")),
            clean_cache: true,
            configure_only: true,
            ..BuildOptions::default()
        };

        let result = build(tmp.path(), &opts, linux().as_ref(), &exec, settings()).unwrap();

        assert_eq!(result.configure, ConfigureOutcome::Configured);
        assert!(!result.built);
        assert_eq!(result.build_dir, tmp.path().join("out"));
        assert_eq!(exec.calls().len(), 1);
    }

    #[test]
    fn test_build_requires_cmakelists() {
        let tmp = TempDir::new().unwrap();
        let exec = MockExecutor::new();

        let err = build(tmp.path(), &BuildOptions::default(), linux().as_ref(), &exec, settings())
            .unwrap_err();
        assert!(err.to_string().contains("keel init"));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_clean() {
        let tmp = project();
        write_cache(&tmp.path().join("build"), "Debug");
        let exec = MockExecutor::new();

        let dir = clean(tmp.path(), Path::new("build"), linux().as_ref(), &exec, settings()).unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }
}
