//! Configuration file support for Keel.
//!
//! Keel supports two configuration file locations:
//! - Global: `~/.keel/config.toml` - User-wide defaults
//! - Project: `.keel/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Generator pinned on Windows when none is configured.
pub const DEFAULT_WINDOWS_GENERATOR: &str = "MinGW Makefiles";

/// Build directory used when none is configured.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Keel configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Compiler and CMake overrides
    pub toolchain: ToolchainSettings,

    /// Install settings
    pub install: InstallConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default CMake build type (Debug, Release, ...)
    pub build_type: Option<String>,

    /// Build directory relative to the project root
    pub build_dir: Option<PathBuf>,

    /// Default install prefix passed at configure time
    pub install_prefix: Option<String>,

    /// Number of parallel jobs (None = probe available cores)
    pub jobs: Option<usize>,

    /// CMake generator pinned on platforms that pin one
    pub generator: Option<String>,
}

/// Toolchain settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// CMake executable (name or path)
    pub cmake: Option<PathBuf>,

    /// C compiler passed as CMAKE_C_COMPILER
    pub cc: Option<PathBuf>,

    /// C++ compiler passed as CMAKE_CXX_COMPILER
    pub cxx: Option<PathBuf>,
}

/// Install-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Run install/uninstall under `sudo` on platforms that elevate
    pub elevate: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Build settings
        if other.build.build_type.is_some() {
            self.build.build_type = other.build.build_type;
        }
        if other.build.build_dir.is_some() {
            self.build.build_dir = other.build.build_dir;
        }
        if other.build.install_prefix.is_some() {
            self.build.install_prefix = other.build.install_prefix;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }

        // Toolchain settings
        if other.toolchain.cmake.is_some() {
            self.toolchain.cmake = other.toolchain.cmake;
        }
        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if other.toolchain.cxx.is_some() {
            self.toolchain.cxx = other.toolchain.cxx;
        }

        // Install settings
        if other.install.elevate.is_some() {
            self.install.elevate = other.install.elevate;
        }
    }

    /// Build directory, defaulting to `build`.
    pub fn build_dir(&self) -> PathBuf {
        self.build
            .build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR))
    }

    /// Generator, defaulting to MinGW Makefiles.
    pub fn generator(&self) -> &str {
        self.build
            .generator
            .as_deref()
            .unwrap_or(DEFAULT_WINDOWS_GENERATOR)
    }
}

/// Get the global keel config directory (~/.keel).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".keel"))
}

/// Get the global config path (~/.keel/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.keel/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".keel").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.keel/config.toml)
/// 2. Global config (~/.keel/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}
