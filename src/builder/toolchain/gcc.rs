//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use crate::builder::cmakelists::CMakeWriter;

use super::{CompilerFamily, CompilerToolchain, PCH_VARIABLE};

/// GCC/Clang toolchain.
///
/// These compilers have no flag that both produces and consumes a
/// precompiled header, so the `.gch` artifact is staged by an explicit
/// custom command and then force-included.
#[derive(Debug, Clone, Copy, Default)]
pub struct GccToolchain;

impl GccToolchain {
    /// The C++ driver that pairs with a C compiler driver.
    ///
    /// `gcc` maps to `g++`, `clang` to `clang++` and `cc` to `c++`. Target
    /// prefixes (`x86_64-w64-mingw32-gcc`), version suffixes (`gcc-13`) and
    /// the directory are kept. Any other driver gets `++` appended.
    pub fn infer_cxx(cc: &Path) -> PathBuf {
        let Some(file) = cc.file_name() else {
            return cc.to_path_buf();
        };
        let file = file.to_string_lossy();

        let (stem, version) = match file.rsplit_once('-') {
            Some((stem, v)) if is_version(v) => (stem, &file[stem.len()..]),
            _ => (&file[..], ""),
        };
        let (prefix, driver) = match stem.rsplit_once('-') {
            Some((target, driver)) => (&stem[..=target.len()], driver),
            None => ("", stem),
        };

        let cxx = match driver {
            "gcc" => "g++",
            "clang" => "clang++",
            "cc" => "c++",
            _ => return cc.with_file_name(format!("{}++", file)),
        };
        cc.with_file_name(format!("{}{}{}", prefix, cxx, version))
    }
}

fn is_version(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

impl CompilerToolchain for GccToolchain {
    fn family(&self) -> CompilerFamily {
        CompilerFamily::Gnu
    }

    fn cmake_condition(&self) -> &'static str {
        "CMAKE_CXX_COMPILER_ID MATCHES \"GNU|Clang\""
    }

    fn default_compilers(&self) -> (&'static str, &'static str) {
        ("gcc", "g++")
    }

    fn write_precompiled_header(&self, out: &mut CMakeWriter, target: &str) {
        let pch = format!("${{{}}}", PCH_VARIABLE);

        out.line("\tset(PCH_OUTPUT \"${CMAKE_BINARY_DIR}/pch.h.gch\")");
        out.line("\tadd_custom_command(");
        out.line("\t\tOUTPUT ${PCH_OUTPUT}");
        out.line("\t\tCOMMAND ${CMAKE_CXX_COMPILER}");
        out.line("\t\t\t\t${CMAKE_CXX_FLAGS}");
        out.line("\t\t\t\t-x c++-header");
        out.line("\t\t\t\t-o ${PCH_OUTPUT}");
        out.line("\t\t\t\t-I ${CMAKE_SOURCE_DIR}/include");
        out.line(format!("\t\t\t\t{}", pch));
        out.line(format!("\t\tDEPENDS {}", pch));
        out.line("\t)");
        out.line("\tadd_custom_target(pch_target DEPENDS ${PCH_OUTPUT})");
        out.line(format!("\tadd_dependencies({} pch_target)", target));
        out.line(format!("\ttarget_compile_options({} PRIVATE", target));
        out.line(format!("\t\t-include {}", pch));
        out.line("\t)");
    }
}
