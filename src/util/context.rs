//! Global context for Keel operations.
//!
//! Provides centralized access to the working directory, the platform
//! being targeted and the merged configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::cmake::OrchestratorSettings;
use crate::builder::platform::{strategy_for, PlatformStrategy};
use crate::core::descriptor::DESCRIPTOR_FILE;
use crate::core::platform::PlatformFacts;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Global context passed to operations.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Directory commands operate on
    cwd: PathBuf,

    /// Platform the generated files and commands target
    facts: PlatformFacts,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a context for the process working directory and host platform.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context for a specific directory on the host platform.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let global = global_config_path();
        let config = load_config(global.as_deref(), &project_config_path(&cwd));

        GlobalContext {
            cwd,
            facts: PlatformFacts::host(),
            config,
        }
    }

    /// Target a different platform.
    pub fn with_platform(mut self, facts: PlatformFacts) -> Self {
        self.facts = facts;
        self
    }

    /// Replace the loaded configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Get the working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn facts(&self) -> PlatformFacts {
        self.facts
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Strategy for the targeted platform.
    pub fn platform(&self) -> Box<dyn PlatformStrategy> {
        strategy_for(self.facts)
    }

    /// Path of the project descriptor in the working directory.
    pub fn descriptor_path(&self) -> PathBuf {
        self.cwd.join(DESCRIPTOR_FILE)
    }

    /// Configured build directory, relative to the working directory.
    pub fn build_dir(&self) -> PathBuf {
        self.config.build_dir()
    }

    /// Orchestrator settings derived from configuration.
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings::from_config(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::PlatformFamily;
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).with_config(Config::default());

        assert_eq!(ctx.descriptor_path(), tmp.path().join("CMake.json"));
        assert_eq!(ctx.build_dir(), PathBuf::from("build"));
    }

    #[test]
    fn test_project_config_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let config_path = project_config_path(tmp.path());
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::write(&config_path, "[build]\nbuild_dir = \"out\"\n").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        assert_eq!(ctx.build_dir(), PathBuf::from("out"));
    }

    #[test]
    fn test_with_platform() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .with_platform(PlatformFacts::new(PlatformFamily::Windows));

        assert_eq!(ctx.facts().family(), PlatformFamily::Windows);
        assert_eq!(ctx.platform().default_install_prefix(), ".\\install");
    }
}
