//! Implementation of `keel install` and `keel uninstall`.

use std::path::Path;

use anyhow::Result;

use crate::builder::cmake::{BuildOrchestrator, OrchestratorSettings, UninstallReport};
use crate::builder::platform::PlatformStrategy;
use crate::util::process::Executor;

/// Install the project built in `build_dir`, optionally under `prefix`.
pub fn install(
    project_dir: &Path,
    build_dir: &Path,
    prefix: Option<&str>,
    platform: &dyn PlatformStrategy,
    exec: &dyn Executor,
    settings: OrchestratorSettings,
) -> Result<()> {
    BuildOrchestrator::new(platform, exec, settings, project_dir, build_dir).install(prefix)
}

/// Remove every file recorded in the install manifest.
///
/// Fails if the manifest is missing or any entry could not be removed; the
/// remaining entries are still attempted.
pub fn uninstall(
    project_dir: &Path,
    build_dir: &Path,
    platform: &dyn PlatformStrategy,
    exec: &dyn Executor,
    settings: OrchestratorSettings,
) -> Result<UninstallReport> {
    let report =
        BuildOrchestrator::new(platform, exec, settings, project_dir, build_dir).uninstall()?;
    tracing::info!(
        "Uninstall finished: {} removed, {} failed",
        report.removed.len(),
        report.failed.len()
    );
    report.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::cmake::INSTALL_MANIFEST;
    use crate::builder::platform::strategy_for;
    use crate::core::platform::{PlatformFacts, PlatformFamily};
    use crate::test_support::MockExecutor;
    use std::fs;
    use tempfile::TempDir;

    fn settings() -> OrchestratorSettings {
        OrchestratorSettings {
            elevate: false,
            ..OrchestratorSettings::default()
        }
    }

    #[test]
    fn test_install_passes_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("build")).unwrap();
        let platform = strategy_for(PlatformFacts::new(PlatformFamily::Linux));
        let exec = MockExecutor::new();

        install(
            tmp.path(),
            Path::new("build"),
            Some("/opt/x"),
            platform.as_ref(),
            &exec,
            settings(),
        )
        .unwrap();

        let calls = exec.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].get_cwd(), Some(tmp.path().join("build").as_path()));
        assert!(calls[0].display_command().ends_with("--prefix /opt/x"));
    }

    #[test]
    fn test_install_failure() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("build")).unwrap();
        let platform = strategy_for(PlatformFacts::new(PlatformFamily::Linux));
        let exec = MockExecutor::new().failing_all(1);

        let err = install(tmp.path(), Path::new("build"), None, platform.as_ref(), &exec, settings())
            .unwrap_err();
        assert!(err.to_string().contains("install failed"));
    }

    #[test]
    fn test_uninstall_all_removed() {
        let tmp = TempDir::new().unwrap();
        let build = tmp.path().join("build");
        fs::create_dir_all(&build).unwrap();
        let installed = tmp.path().join("app");
        fs::write(&installed, "").unwrap();
        fs::write(build.join(INSTALL_MANIFEST), format!("{}\n", installed.display())).unwrap();

        let platform = strategy_for(PlatformFacts::new(PlatformFamily::Linux));
        let exec = MockExecutor::new();
        let report =
            uninstall(tmp.path(), Path::new("build"), platform.as_ref(), &exec, settings()).unwrap();

        assert_eq!(report.removed.len(), 1);
        assert!(!installed.exists());
    }

    #[test]
    fn test_uninstall_partial_failure_is_error() {
        let tmp = TempDir::new().unwrap();
        let build = tmp.path().join("build");
        fs::create_dir_all(&build).unwrap();
        fs::write(build.join(INSTALL_MANIFEST), "/nonexistent/keel/file\n").unwrap();

        let platform = strategy_for(PlatformFacts::new(PlatformFamily::Linux));
        let exec = MockExecutor::new();

        assert!(
            uninstall(tmp.path(), Path::new("build"), platform.as_ref(), &exec, settings()).is_err()
        );
    }
}
