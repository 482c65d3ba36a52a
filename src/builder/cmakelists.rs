//! `CMakeLists.txt` synthesis.
//!
//! [`synthesize`] is a pure function of the descriptor and the platform
//! strategy: the same inputs always produce byte-identical output, and the
//! file is regenerated from scratch rather than patched.

use std::path::Path;

use anyhow::Result;

use crate::builder::platform::PlatformStrategy;
use crate::builder::toolchain::{precompiled_header_toolchains, PCH_HEADER, PCH_VARIABLE};
use crate::core::descriptor::{ProjectDescriptor, ProjectKind};
use crate::util::fs::write_string;

/// File name of the generated build definition.
pub const CMAKELISTS_FILE: &str = "CMakeLists.txt";

/// Minimum CMake version declared by generated files.
pub const CMAKE_MINIMUM_VERSION: &str = "3.16";

/// C++ standard pinned by generated files.
pub const CXX_STANDARD: u32 = 11;

/// Line-oriented text buffer for CMake statements.
#[derive(Debug, Default)]
pub struct CMakeWriter {
    buf: String,
}

impl CMakeWriter {
    pub fn new() -> Self {
        CMakeWriter { buf: String::new() }
    }

    /// Append one line.
    pub fn line(&mut self, line: impl AsRef<str>) {
        self.buf.push_str(line.as_ref());
        self.buf.push('\n');
    }

    /// Append an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// Generate the build definition for a project.
pub fn synthesize(descriptor: &ProjectDescriptor, platform: &dyn PlatformStrategy) -> String {
    let name = descriptor.name.as_str();
    let mut out = CMakeWriter::new();

    write_preamble(&mut out, descriptor);

    if !descriptor.dependencies.is_empty() {
        platform.write_dependency_discovery(&mut out, &descriptor.dependencies);
    }

    write_output_layout(&mut out);
    write_target(&mut out, descriptor, platform);

    if descriptor.precompile_headers {
        write_precompiled_header(&mut out, name);
    }

    if !descriptor.include_dirs.is_empty() {
        out.line(format!("target_include_directories({} PUBLIC", name));
        for dir in &descriptor.include_dirs {
            out.line(format!("    \"${{CMAKE_SOURCE_DIR}}/{}\"", dir));
        }
        out.line(")");
    }

    if !descriptor.dependencies.is_empty() {
        platform.write_dependency_linking(&mut out, name, &descriptor.dependencies);
    }

    out.finish()
}

/// Generate and write `CMakeLists.txt` into `project_dir`.
pub fn write_cmakelists(
    project_dir: &Path,
    descriptor: &ProjectDescriptor,
    platform: &dyn PlatformStrategy,
) -> Result<()> {
    let text = synthesize(descriptor, platform);
    write_string(&project_dir.join(CMAKELISTS_FILE), &text)
}

fn write_preamble(out: &mut CMakeWriter, descriptor: &ProjectDescriptor) {
    out.line(format!("cmake_minimum_required(VERSION {})", CMAKE_MINIMUM_VERSION));
    match descriptor.cmake_version() {
        Some(version) => out.line(format!(
            "project({} VERSION {} LANGUAGES CXX)",
            descriptor.name, version
        )),
        None => out.line(format!("project({} LANGUAGES CXX)", descriptor.name)),
    }
    out.blank();
    out.line(format!("set(CMAKE_CXX_STANDARD {})", CXX_STANDARD));
    out.line("set(CMAKE_CXX_STANDARD_REQUIRED ON)");
    out.line("set(CMAKE_EXPORT_COMPILE_COMMANDS ON)");
    out.blank();
}

fn write_output_layout(out: &mut CMakeWriter) {
    out.line("set(CMAKE_RUNTIME_OUTPUT_DIRECTORY ${CMAKE_SOURCE_DIR}/bin)");
    out.line("set(CMAKE_ARCHIVE_OUTPUT_DIRECTORY ${CMAKE_SOURCE_DIR}/lib/static)");
    out.line("set(CMAKE_LIBRARY_OUTPUT_DIRECTORY ${CMAKE_SOURCE_DIR}/lib/shared)");
    out.blank();
}

fn write_target(out: &mut CMakeWriter, descriptor: &ProjectDescriptor, platform: &dyn PlatformStrategy) {
    let name = descriptor.name.as_str();

    const EXECUTABLE: &[(&str, &str)] = &[("RUNTIME", "bin")];
    const STATIC: &[(&str, &str)] = &[("ARCHIVE", "lib")];

    let (declaration, destinations) = match descriptor.kind {
        ProjectKind::Executable => (format!("add_executable({}", name), EXECUTABLE),
        ProjectKind::StaticLibrary => (format!("add_library({} STATIC", name), STATIC),
        ProjectKind::SharedLibrary => (
            format!("add_library({} SHARED", name),
            platform.shared_library_destinations(),
        ),
    };

    out.line(declaration);
    out.line(format!("    {}", descriptor.source_path()));
    out.line(")");
    out.line(format!(
        "target_include_directories({} PRIVATE ${{CMAKE_SOURCE_DIR}}/include)",
        name
    ));

    out.blank();
    out.line("# Install rules");
    out.line(format!("install(TARGETS {}", name));
    for (kind, destination) in destinations {
        out.line(format!("    {} DESTINATION {}", kind, destination));
    }
    out.line(")");
    if let Some(header) = descriptor.header_path() {
        out.line(format!("install(FILES {} DESTINATION include)", header));
    }
    out.blank();
}

fn write_precompiled_header(out: &mut CMakeWriter, target: &str) {
    out.line(format!(
        "set({} ${{CMAKE_SOURCE_DIR}}/{})",
        PCH_VARIABLE, PCH_HEADER
    ));
    for (i, toolchain) in precompiled_header_toolchains().iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "elseif" };
        out.line(format!("{}({})", keyword, toolchain.cmake_condition()));
        toolchain.write_precompiled_header(out, target);
    }
    out.line("endif()");
}
