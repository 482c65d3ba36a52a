//! `CMake.json` project descriptor.
//!
//! The descriptor is the only persisted configuration of a project:
//!
//! ```json
//! {
//!   "project": { "name": "mylib", "type": "static", "version": "1.0.0", "precompile_headers": false },
//!   "dependencies": { "boost": "latest" },
//!   "include_dir": ["third_party"]
//! }
//! ```
//!
//! Parsing never yields a half-filled value: it either returns a complete
//! [`ProjectDescriptor`] (plus any non-fatal [`DescriptorWarning`]s) or a
//! [`DescriptorError`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// File name of the descriptor inside a project root.
pub const DESCRIPTOR_FILE: &str = "CMake.json";

/// Maximum number of dependencies a project may declare.
pub const MAX_DEPENDENCIES: usize = 20;

/// Name used when none is given or the descriptor carries an empty one.
pub const DEFAULT_PROJECT_NAME: &str = "my_project";

/// Version written into freshly created descriptors.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Version requirement recorded for every dependency.
pub const LATEST: &str = "latest";

/// What a project builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectKind {
    #[default]
    Executable,
    StaticLibrary,
    SharedLibrary,
}

impl ProjectKind {
    /// The descriptor spelling of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Executable => "executable",
            ProjectKind::StaticLibrary => "static",
            ProjectKind::SharedLibrary => "shared",
        }
    }

    pub fn is_library(&self) -> bool {
        !matches!(self, ProjectKind::Executable)
    }

    /// Human-readable description used in status output.
    pub fn describe(&self) -> &'static str {
        match self {
            ProjectKind::Executable => "executable",
            ProjectKind::StaticLibrary => "static library",
            ProjectKind::SharedLibrary => "shared library",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "executable" => Ok(ProjectKind::Executable),
            "static" => Ok(ProjectKind::StaticLibrary),
            "shared" => Ok(ProjectKind::SharedLibrary),
            _ => Err(format!(
                "unknown project type '{}'; expected 'executable', 'static', or 'shared'",
                s
            )),
        }
    }
}

/// Returned when a dependency does not fit in a [`DependencySet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("maximum number of dependencies ({}) reached, ignoring `{}`", MAX_DEPENDENCIES, .0)]
pub struct CapacityExceeded(pub String);

/// Ordered, duplicate-free dependency names, bounded at [`MAX_DEPENDENCIES`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    names: Vec<String>,
}

impl DependencySet {
    pub fn new() -> Self {
        DependencySet { names: Vec::new() }
    }

    /// Build a set from names in order, returning the entries that were
    /// dropped because the set was full.
    pub fn bounded<I, S>(names: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = DependencySet::new();
        let mut dropped = Vec::new();
        for name in names {
            if let Err(CapacityExceeded(name)) = set.insert(name) {
                dropped.push(name);
            }
        }
        (set, dropped)
    }

    /// Append a dependency.
    ///
    /// Returns `Ok(false)` for a name already present.
    pub fn insert(&mut self, name: impl Into<String>) -> Result<bool, CapacityExceeded> {
        let name = name.into();
        if self.contains(&name) {
            return Ok(false);
        }
        if self.names.len() >= MAX_DEPENDENCIES {
            return Err(CapacityExceeded(name));
        }
        self.names.push(name);
        Ok(true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

/// Non-fatal problems found while building a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorWarning {
    /// A dependency beyond [`MAX_DEPENDENCIES`] was ignored.
    DependencyDropped(String),
    /// The project type was not recognized and became `executable`.
    UnknownKind(String),
    /// The project name was empty and became [`DEFAULT_PROJECT_NAME`].
    EmptyName,
    /// The version is not semantic-version formatted.
    InvalidVersion(String),
}

impl fmt::Display for DescriptorWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorWarning::DependencyDropped(name) => write!(
                f,
                "maximum number of dependencies ({}) reached, ignoring `{}`",
                MAX_DEPENDENCIES, name
            ),
            DescriptorWarning::UnknownKind(kind) => write!(
                f,
                "unknown project type `{}`, defaulting to `executable`",
                kind
            ),
            DescriptorWarning::EmptyName => write!(
                f,
                "project name is empty, using `{}`",
                DEFAULT_PROJECT_NAME
            ),
            DescriptorWarning::InvalidVersion(version) => write!(
                f,
                "version `{}` is not a semantic version and will not be passed to CMake",
                version
            ),
        }
    }
}

impl DescriptorWarning {
    /// Report this warning through the log.
    pub fn emit(&self) {
        tracing::warn!("{}", self);
    }
}

/// Error reading or writing a descriptor file.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{}`", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize project descriptor")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A complete, validated project declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub name: String,
    pub kind: ProjectKind,
    pub version: String,
    pub precompile_headers: bool,
    pub dependencies: DependencySet,
    pub include_dirs: Vec<String>,
}

impl Default for ProjectDescriptor {
    fn default() -> Self {
        ProjectDescriptor {
            name: DEFAULT_PROJECT_NAME.to_string(),
            kind: ProjectKind::Executable,
            version: DEFAULT_VERSION.to_string(),
            precompile_headers: false,
            dependencies: DependencySet::new(),
            include_dirs: Vec::new(),
        }
    }
}

/// A descriptor together with the warnings raised while producing it.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub descriptor: ProjectDescriptor,
    pub warnings: Vec<DescriptorWarning>,
}

impl Parsed {
    /// Log every warning and keep the descriptor.
    pub fn emit_warnings(self) -> ProjectDescriptor {
        for warning in &self.warnings {
            warning.emit();
        }
        self.descriptor
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    project: RawProject,
    #[serde(default)]
    dependencies: Map<String, Value>,
    #[serde(default)]
    include_dir: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawProject {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    precompile_headers: bool,
}

impl ProjectDescriptor {
    /// Assemble a descriptor from loose inputs, normalizing as needed.
    pub fn build<I, S>(
        name: Option<String>,
        kind: Option<&str>,
        version: Option<String>,
        precompile_headers: bool,
        dependencies: I,
        include_dirs: Vec<String>,
    ) -> Parsed
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut warnings = Vec::new();

        let name = match name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                warnings.push(DescriptorWarning::EmptyName);
                DEFAULT_PROJECT_NAME.to_string()
            }
        };

        let kind = match kind {
            None => ProjectKind::Executable,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warnings.push(DescriptorWarning::UnknownKind(raw.to_string()));
                ProjectKind::Executable
            }),
        };

        let version = version.unwrap_or_else(|| DEFAULT_VERSION.to_string());
        if semver::Version::parse(&version).is_err() {
            warnings.push(DescriptorWarning::InvalidVersion(version.clone()));
        }

        let (dependencies, dropped) = DependencySet::bounded(dependencies);
        warnings.extend(dropped.into_iter().map(DescriptorWarning::DependencyDropped));

        Parsed {
            descriptor: ProjectDescriptor {
                name,
                kind,
                version,
                precompile_headers,
                dependencies,
                include_dirs,
            },
            warnings,
        }
    }

    /// Parse descriptor JSON text.
    pub fn from_json_str(text: &str) -> Result<Parsed, serde_json::Error> {
        let raw: RawDescriptor = serde_json::from_str(text)?;
        Ok(ProjectDescriptor::build(
            Some(raw.project.name),
            raw.project.kind.as_deref(),
            raw.project.version,
            raw.project.precompile_headers,
            raw.dependencies.into_iter().map(|(name, _)| name),
            raw.include_dir,
        ))
    }

    /// Render as pretty-printed descriptor JSON.
    pub fn to_json_string(&self) -> Result<String, DescriptorError> {
        let raw = RawDescriptor {
            project: RawProject {
                name: self.name.clone(),
                kind: Some(self.kind.as_str().to_string()),
                version: Some(self.version.clone()),
                precompile_headers: self.precompile_headers,
            },
            dependencies: self
                .dependencies
                .iter()
                .map(|name| (name.to_string(), Value::String(LATEST.to_string())))
                .collect(),
            include_dir: self.include_dirs.clone(),
        };

        let mut text = serde_json::to_string_pretty(&raw).map_err(DescriptorError::Serialize)?;
        text.push('\n');
        Ok(text)
    }

    /// Read and parse a descriptor file.
    pub fn load(path: &Path) -> Result<Parsed, DescriptorError> {
        let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ProjectDescriptor::from_json_str(&text).map_err(|source| DescriptorError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write this descriptor to a file, replacing any previous content.
    pub fn save(&self, path: &Path) -> Result<(), DescriptorError> {
        std::fs::write(path, self.to_json_string()?).map_err(|source| DescriptorError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Header guard macro for library headers, e.g. `MY_LIB_H`.
    pub fn header_guard(&self) -> String {
        let mut guard: String = self
            .name
            .to_uppercase()
            .chars()
            .map(|c| if c == '-' || c == '.' { '_' } else { c })
            .collect();
        guard.push_str("_H");
        guard
    }

    /// Project-relative path of the primary source file.
    pub fn source_path(&self) -> String {
        match self.kind {
            ProjectKind::Executable => "src/main.cpp".to_string(),
            ProjectKind::StaticLibrary | ProjectKind::SharedLibrary => {
                format!("src/{}.cpp", self.name)
            }
        }
    }

    /// Project-relative path of the public header (libraries only).
    pub fn header_path(&self) -> Option<String> {
        self.kind
            .is_library()
            .then(|| format!("include/{}.h", self.name))
    }

    /// The version as `major.minor.patch` if it is a valid semantic version.
    pub fn cmake_version(&self) -> Option<String> {
        semver::Version::parse(&self.version)
            .ok()
            .map(|v| format!("{}.{}.{}", v.major, v.minor, v.patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_descriptor() {
        let text = r#"{
            "project": { "name": "mylib", "type": "static", "version": "2.1.0", "precompile_headers": true },
            "dependencies": { "zlib": "latest", "boost": "latest", "fmt": "latest" },
            "include_dir": ["third_party", "gen/include"]
        }"#;

        let parsed = ProjectDescriptor::from_json_str(text).unwrap();
        assert!(parsed.warnings.is_empty());

        let desc = parsed.descriptor;
        assert_eq!(desc.name, "mylib");
        assert_eq!(desc.kind, ProjectKind::StaticLibrary);
        assert_eq!(desc.version, "2.1.0");
        assert!(desc.precompile_headers);
        // Declaration order is preserved
        assert_eq!(desc.dependencies.as_slice(), ["zlib", "boost", "fmt"]);
        assert_eq!(desc.include_dirs, ["third_party", "gen/include"]);
    }

    #[test]
    fn test_parse_minimal_descriptor_uses_defaults() {
        let parsed = ProjectDescriptor::from_json_str(r#"{ "project": { "name": "app" } }"#).unwrap();
        let desc = parsed.descriptor;

        assert_eq!(desc.kind, ProjectKind::Executable);
        assert_eq!(desc.version, DEFAULT_VERSION);
        assert!(!desc.precompile_headers);
        assert!(desc.dependencies.is_empty());
        assert!(desc.include_dirs.is_empty());
    }

    #[test]
    fn test_unknown_kind_normalized_with_warning() {
        let parsed =
            ProjectDescriptor::from_json_str(r#"{ "project": { "name": "x", "type": "library" } }"#)
                .unwrap();

        assert_eq!(parsed.descriptor.kind, ProjectKind::Executable);
        assert_eq!(
            parsed.warnings,
            vec![DescriptorWarning::UnknownKind("library".to_string())]
        );
    }

    #[test]
    fn test_empty_name_falls_back() {
        let parsed = ProjectDescriptor::from_json_str(r#"{ "project": { "name": "" } }"#).unwrap();
        assert_eq!(parsed.descriptor.name, DEFAULT_PROJECT_NAME);
        assert!(parsed.warnings.contains(&DescriptorWarning::EmptyName));

        let parsed = ProjectDescriptor::from_json_str("{}").unwrap();
        assert_eq!(parsed.descriptor.name, DEFAULT_PROJECT_NAME);
    }

    #[test]
    fn test_dependencies_bounded_at_max() {
        let deps: Vec<String> = (0..25).map(|i| format!("dep{}", i)).collect();
        let parsed = ProjectDescriptor::build(
            Some("big".to_string()),
            None,
            None,
            false,
            deps.clone(),
            Vec::new(),
        );

        assert_eq!(parsed.descriptor.dependencies.len(), MAX_DEPENDENCIES);
        assert_eq!(parsed.descriptor.dependencies.as_slice(), &deps[..MAX_DEPENDENCIES]);

        let dropped: Vec<_> = parsed
            .warnings
            .iter()
            .filter(|w| matches!(w, DescriptorWarning::DependencyDropped(_)))
            .collect();
        assert_eq!(dropped.len(), 5);
        assert_eq!(
            dropped[0],
            &DescriptorWarning::DependencyDropped("dep20".to_string())
        );
    }

    #[test]
    fn test_dependency_set_ignores_duplicates() {
        let mut set = DependencySet::new();
        assert_eq!(set.insert("fmt"), Ok(true));
        assert_eq!(set.insert("fmt"), Ok(false));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_dependency_set_full() {
        let (mut set, dropped) = DependencySet::bounded((0..MAX_DEPENDENCIES).map(|i| i.to_string()));
        assert!(dropped.is_empty());
        assert_eq!(
            set.insert("extra"),
            Err(CapacityExceeded("extra".to_string()))
        );
        // An existing name is still reported as a duplicate, not an overflow
        assert_eq!(set.insert("0"), Ok(false));
    }

    #[test]
    fn test_invalid_version_warns() {
        let parsed = ProjectDescriptor::from_json_str(
            r#"{ "project": { "name": "x", "version": "one" } }"#,
        )
        .unwrap();
        assert_eq!(parsed.descriptor.version, "one");
        assert_eq!(parsed.descriptor.cmake_version(), None);
        assert!(parsed
            .warnings
            .contains(&DescriptorWarning::InvalidVersion("one".to_string())));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(ProjectDescriptor::from_json_str("{ project: ").is_err());
        assert!(ProjectDescriptor::from_json_str(r#"{ "include_dir": "nope" }"#).is_err());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DESCRIPTOR_FILE);

        let original = ProjectDescriptor::build(
            Some("net-kit".to_string()),
            Some("shared"),
            None,
            true,
            ["openssl", "libcurl"],
            vec!["vendor".to_string()],
        )
        .descriptor;

        original.save(&path).unwrap();
        let loaded = ProjectDescriptor::load(&path).unwrap();

        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.descriptor, original);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"type\": \"shared\""));
        assert!(text.contains("\"openssl\": \"latest\""));
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = ProjectDescriptor::load(&tmp.path().join(DESCRIPTOR_FILE)).unwrap_err();
        assert!(matches!(err, DescriptorError::Read { .. }));
    }

    #[test]
    fn test_header_guard() {
        let mut desc = ProjectDescriptor::default();
        desc.name = "my-lib.core".to_string();
        assert_eq!(desc.header_guard(), "MY_LIB_CORE_H");
    }

    #[test]
    fn test_source_and_header_paths() {
        let mut desc = ProjectDescriptor::default();
        desc.name = "mylib".to_string();
        assert_eq!(desc.source_path(), "src/main.cpp");
        assert_eq!(desc.header_path(), None);

        desc.kind = ProjectKind::StaticLibrary;
        assert_eq!(desc.source_path(), "src/mylib.cpp");
        assert_eq!(desc.header_path().as_deref(), Some("include/mylib.h"));
    }

    #[test]
    fn test_cmake_version_strips_prerelease() {
        let mut desc = ProjectDescriptor::default();
        desc.version = "1.4.2-beta.1".to_string();
        assert_eq!(desc.cmake_version().as_deref(), Some("1.4.2"));
    }
}
