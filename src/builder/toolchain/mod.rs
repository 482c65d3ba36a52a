//! Compiler-family strategies.
//!
//! The generated `CMakeLists.txt` does not know at generation time which
//! compiler CMake will pick, so every family contributes a guarded block and
//! CMake selects one at configure time. This axis is independent of the
//! operating system: Clang runs on Windows and MSVC-compatible drivers exist
//! elsewhere.

use crate::builder::cmakelists::CMakeWriter;

mod gcc;
mod msvc;

pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

/// CMake variable holding the precompiled header path.
pub const PCH_VARIABLE: &str = "PRECOMPILED_HEADER";

/// Project-relative location of the precompiled header.
pub const PCH_HEADER: &str = "include/pch.h";

/// The family of a C++ compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerFamily {
    /// GCC and Clang (including Apple Clang)
    Gnu,
    /// Microsoft Visual C++
    Msvc,
}

/// Trait for compiler-family specific generation.
pub trait CompilerToolchain {
    /// Get the compiler family.
    fn family(&self) -> CompilerFamily;

    /// CMake condition that is true when this family is in use.
    fn cmake_condition(&self) -> &'static str;

    /// Default C and C++ compiler driver names.
    fn default_compilers(&self) -> (&'static str, &'static str);

    /// Emit the statements that precompile [`PCH_HEADER`] for `target`.
    ///
    /// The caller has already set `${PRECOMPILED_HEADER}` and opened the
    /// `if`/`elseif` branch for [`Self::cmake_condition`].
    fn write_precompiled_header(&self, out: &mut CMakeWriter, target: &str);
}

/// Toolchains that get a precompiled-header branch, in emission order.
pub fn precompiled_header_toolchains() -> [&'static dyn CompilerToolchain; 2] {
    [&MsvcToolchain, &GccToolchain]
}

/// Toolchain used for the compiler pair pinned at configure time.
pub fn default_toolchain() -> &'static dyn CompilerToolchain {
    &GccToolchain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_order_and_conditions() {
        let toolchains = precompiled_header_toolchains();
        assert_eq!(toolchains[0].family(), CompilerFamily::Msvc);
        assert_eq!(toolchains[0].cmake_condition(), "MSVC");
        assert_eq!(toolchains[1].family(), CompilerFamily::Gnu);
        assert!(toolchains[1].cmake_condition().contains("GNU|Clang"));
    }

    #[test]
    fn test_default_toolchain_pins_gcc() {
        assert_eq!(default_toolchain().default_compilers(), ("gcc", "g++"));
    }
}
