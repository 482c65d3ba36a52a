//! Implementation of `keel new` and `keel init`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::cmakelists::{write_cmakelists, CMAKELISTS_FILE};
use crate::builder::platform::PlatformStrategy;
use crate::builder::toolchain::PCH_HEADER;
use crate::core::descriptor::{ProjectDescriptor, ProjectKind, DESCRIPTOR_FILE};
use crate::core::platform::{PlatformFacts, PlatformFamily};
use crate::util::fs::{ensure_dir, write_if_missing, write_string};

/// Directories every project has.
pub const PROJECT_DIRS: [&str; 3] = ["src", "include", "build"];

/// Options for creating a new project.
#[derive(Debug, Clone, Default)]
pub struct NewOptions {
    /// Project name (None = default name)
    pub name: Option<String>,

    /// Kind of artifact to build
    pub kind: ProjectKind,

    /// Dependencies, in declaration order
    pub dependencies: Vec<String>,

    /// Generate and wire a precompiled header
    pub precompile_headers: bool,

    /// Extra include directories relative to the project root
    pub include_dirs: Vec<String>,
}

/// What a `new` or `init` run produced.
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    /// Project root directory
    pub root: PathBuf,

    /// Descriptor as re-read from disk
    pub descriptor: ProjectDescriptor,

    /// Files written, relative to the root
    pub written: Vec<String>,

    /// Files left untouched because they already existed
    pub kept: Vec<String>,
}

/// Create a new project directory under `parent`.
///
/// The descriptor is written first and then read back, so everything
/// generated afterwards derives from what is on disk.
pub fn new_project(
    parent: &Path,
    opts: &NewOptions,
    platform: &dyn PlatformStrategy,
) -> Result<ProjectSummary> {
    let requested = ProjectDescriptor::build(
        opts.name.clone(),
        Some(opts.kind.as_str()),
        None,
        opts.precompile_headers,
        opts.dependencies.iter().cloned(),
        opts.include_dirs.clone(),
    )
    .emit_warnings();

    let root = parent.join(&requested.name);
    let descriptor_path = root.join(DESCRIPTOR_FILE);
    if descriptor_path.exists() {
        bail!(
            "`{}` already exists in `{}`\n\
             \n\
             Use `keel init` inside that directory to regenerate it.",
            DESCRIPTOR_FILE,
            root.display()
        );
    }

    create_layout(&root)?;
    requested.save(&descriptor_path)?;
    let descriptor = ProjectDescriptor::load(&descriptor_path)?.emit_warnings();

    let mut summary = ProjectSummary {
        root,
        descriptor,
        written: vec![DESCRIPTOR_FILE.to_string()],
        kept: Vec::new(),
    };
    generate(&mut summary, platform, Overwrite::Always)?;

    Ok(summary)
}

/// Regenerate a project from the `CMake.json` in `root`.
///
/// `CMakeLists.txt` is always rewritten; sources and the precompiled header
/// are only created when missing.
pub fn init_project(root: &Path, platform: &dyn PlatformStrategy) -> Result<ProjectSummary> {
    let descriptor_path = root.join(DESCRIPTOR_FILE);
    if !descriptor_path.exists() {
        bail!(
            "could not find `{}` in `{}`\n\
             \n\
             Use `keel new` to create a project.",
            DESCRIPTOR_FILE,
            root.display()
        );
    }

    let descriptor = ProjectDescriptor::load(&descriptor_path)?.emit_warnings();
    create_layout(root)?;

    let mut summary = ProjectSummary {
        root: root.to_path_buf(),
        descriptor,
        written: Vec::new(),
        kept: Vec::new(),
    };
    generate(&mut summary, platform, Overwrite::IfMissing)?;

    Ok(summary)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overwrite {
    Always,
    IfMissing,
}

fn create_layout(root: &Path) -> Result<()> {
    for dir in PROJECT_DIRS {
        ensure_dir(&root.join(dir))?;
    }
    Ok(())
}

fn generate(
    summary: &mut ProjectSummary,
    platform: &dyn PlatformStrategy,
    overwrite: Overwrite,
) -> Result<()> {
    let descriptor = &summary.descriptor;

    write_cmakelists(&summary.root, descriptor, platform)?;
    let mut files = Vec::new();

    match descriptor.kind {
        ProjectKind::Executable => {
            files.push((descriptor.source_path(), main_source(descriptor.precompile_headers)));
        }
        ProjectKind::StaticLibrary | ProjectKind::SharedLibrary => {
            files.push((descriptor.source_path(), library_source(descriptor)));
            if let Some(header) = descriptor.header_path() {
                files.push((header, library_header(descriptor)));
            }
        }
    }

    if descriptor.precompile_headers {
        files.push((PCH_HEADER.to_string(), PCH_CONTENTS.to_string()));
    }

    summary.written.push(CMAKELISTS_FILE.to_string());
    for (relative, contents) in files {
        let path = summary.root.join(&relative);
        let written = match overwrite {
            Overwrite::Always => {
                write_string(&path, &contents)?;
                true
            }
            Overwrite::IfMissing => write_if_missing(&path, &contents)?,
        };

        if written {
            tracing::debug!("Wrote {}", path.display());
            summary.written.push(relative);
        } else {
            tracing::debug!("Keeping existing {}", path.display());
            summary.kept.push(relative);
        }
    }

    Ok(())
}

const PCH_CONTENTS: &str = "#ifndef PCH_H
#define PCH_H

#include <string>
#include <iostream>
#include <vector>
#include <map>
#include <array>
#include <algorithm>
#include <functional>
#include <future>
#include <mutex>
#include <thread>

#endif
";

fn pch_include(precompile_headers: bool) -> &'static str {
    if precompile_headers {
        "#include \"pch.h\"\n"
    } else {
        ""
    }
}

/// Source of the `main.cpp` generated for executables.
pub fn main_source(precompile_headers: bool) -> String {
    format!(
        r#"{pch}#include <iostream>

int main() {{
    std::cout << "Hello, World!" << std::endl;
    return 0;
}}
"#,
        pch = pch_include(precompile_headers)
    )
}

/// Source of the implementation file generated for libraries.
pub fn library_source(descriptor: &ProjectDescriptor) -> String {
    format!(
        r#"{pch}#include "{name}.h"

int {name}_function() {{
    return 0;
}}
"#,
        pch = pch_include(descriptor.precompile_headers),
        name = descriptor.name
    )
}

/// Public header generated for libraries.
pub fn library_header(descriptor: &ProjectDescriptor) -> String {
    format!(
        r#"#ifndef {guard}
#define {guard}

int {name}_function();

#endif // {guard}
"#,
        guard = descriptor.header_guard(),
        name = descriptor.name
    )
}

/// Directory tree of a freshly created project, one line per entry.
pub fn project_tree(descriptor: &ProjectDescriptor, facts: PlatformFacts) -> Vec<String> {
    let sep = facts.path_separator();
    let mut lines = vec![
        format!("{}{}", descriptor.name, sep),
        format!("├── {}", CMAKELISTS_FILE),
        format!("├── {}", DESCRIPTOR_FILE),
        format!("├── build{}", sep),
        format!("├── include{}", sep),
    ];

    let mut headers = Vec::new();
    if descriptor.precompile_headers {
        headers.push("pch.h".to_string());
    }
    if descriptor.kind.is_library() {
        headers.push(format!("{}.h", descriptor.name));
    }
    for (i, header) in headers.iter().enumerate() {
        let branch = if i + 1 == headers.len() { "└──" } else { "├──" };
        lines.push(format!("│   {} {}", branch, header));
    }

    lines.push(format!("└── src{}", sep));
    let source = match descriptor.kind {
        ProjectKind::Executable => "main.cpp".to_string(),
        _ => format!("{}.cpp", descriptor.name),
    };
    lines.push(format!("    └── {}", source));

    lines
}

/// Steps to build the project by hand, ending with where the artifact lands.
pub fn build_guide(descriptor: &ProjectDescriptor, facts: PlatformFacts) -> Vec<String> {
    let name = descriptor.name.as_str();
    let lib_prefix = if facts.family().is_posix() { "lib" } else { "" };

    let artifact = match descriptor.kind {
        ProjectKind::Executable => format!(
            "# Executable: {}",
            facts.join(&["bin", &format!("{}{}", name, facts.executable_suffix())])
        ),
        ProjectKind::StaticLibrary => format!(
            "# Static library: {}",
            facts.join(&[
                "lib",
                "static",
                &format!("{}{}{}", lib_prefix, name, facts.static_lib_suffix()),
            ])
        ),
        ProjectKind::SharedLibrary => {
            let file = format!("{}{}{}", lib_prefix, name, facts.shared_lib_suffix());
            let path = match facts.family() {
                PlatformFamily::Windows => facts.join(&["bin", &file]),
                PlatformFamily::MacOs | PlatformFamily::Linux => {
                    facts.join(&["lib", "shared", &file])
                }
            };
            format!("# Shared library: {}", path)
        }
    };

    vec![
        format!("cd {}", name),
        "keel build".to_string(),
        artifact,
        format!("# Platform: {}", facts.family()),
    ]
}

/// How dependencies are expected to be installed on this platform.
pub fn package_manager_hint(facts: PlatformFacts) -> &'static str {
    match facts.family() {
        PlatformFamily::Windows => "install them with vcpkg",
        PlatformFamily::MacOs => "install them with Homebrew",
        PlatformFamily::Linux => "install them with apt-get or yum",
    }
}
