//! Host platform facts.
//!
//! A [`PlatformFacts`] value is built once at startup and passed explicitly
//! to everything that needs to know which operating system family it is
//! generating files or commands for.

use std::fmt;
use std::str::FromStr;

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    Windows,
    MacOs,
    Linux,
}

impl PlatformFamily {
    /// The family this binary was compiled for.
    ///
    /// Anything that is neither Windows nor macOS is treated as Linux, which
    /// covers the BSDs and other POSIX hosts well enough for CMake purposes.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            PlatformFamily::Windows
        } else if cfg!(target_os = "macos") {
            PlatformFamily::MacOs
        } else {
            PlatformFamily::Linux
        }
    }

    /// Whether this family uses POSIX conventions.
    pub fn is_posix(&self) -> bool {
        !matches!(self, PlatformFamily::Windows)
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformFamily::Windows => "Windows",
            PlatformFamily::MacOs => "macOS",
            PlatformFamily::Linux => "Linux",
        };
        f.write_str(name)
    }
}

impl FromStr for PlatformFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" => Ok(PlatformFamily::Windows),
            "macos" | "darwin" => Ok(PlatformFamily::MacOs),
            "linux" => Ok(PlatformFamily::Linux),
            _ => Err(format!(
                "unknown platform '{}'; expected 'windows', 'macos', or 'linux'",
                s
            )),
        }
    }
}

/// Immutable, process-wide platform conventions.
///
/// Every derived string is a pure function of [`PlatformFamily`], so two
/// values with the same family are always identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformFacts {
    family: PlatformFamily,
}

impl PlatformFacts {
    /// Facts for the given family.
    pub fn new(family: PlatformFamily) -> Self {
        PlatformFacts { family }
    }

    /// Facts for the host this binary runs on.
    pub fn host() -> Self {
        PlatformFacts::new(PlatformFamily::host())
    }

    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    pub fn path_separator(&self) -> &'static str {
        match self.family {
            PlatformFamily::Windows => "\\",
            PlatformFamily::MacOs | PlatformFamily::Linux => "/",
        }
    }

    pub fn executable_suffix(&self) -> &'static str {
        match self.family {
            PlatformFamily::Windows => ".exe",
            PlatformFamily::MacOs | PlatformFamily::Linux => "",
        }
    }

    pub fn static_lib_suffix(&self) -> &'static str {
        match self.family {
            PlatformFamily::Windows => ".lib",
            PlatformFamily::MacOs | PlatformFamily::Linux => ".a",
        }
    }

    pub fn shared_lib_suffix(&self) -> &'static str {
        match self.family {
            PlatformFamily::Windows => ".dll",
            PlatformFamily::MacOs => ".dylib",
            PlatformFamily::Linux => ".so",
        }
    }

    /// Join path components with this platform's separator.
    ///
    /// Used for user-facing text only; real filesystem paths go through
    /// [`std::path::Path`].
    pub fn join(&self, parts: &[&str]) -> String {
        parts.join(self.path_separator())
    }
}
