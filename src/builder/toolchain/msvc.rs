//! MSVC toolchain implementation.

use crate::builder::cmakelists::CMakeWriter;

use super::{CompilerFamily, CompilerToolchain, PCH_VARIABLE};

/// MSVC toolchain.
///
/// `cl.exe` understands precompiled headers natively, so selecting the
/// header through compile flags is enough.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsvcToolchain;

impl CompilerToolchain for MsvcToolchain {
    fn family(&self) -> CompilerFamily {
        CompilerFamily::Msvc
    }

    fn cmake_condition(&self) -> &'static str {
        "MSVC"
    }

    fn default_compilers(&self) -> (&'static str, &'static str) {
        // MSVC uses the same cl.exe for both C and C++
        ("cl", "cl")
    }

    fn write_precompiled_header(&self, out: &mut CMakeWriter, target: &str) {
        let pch = format!("${{{}}}", PCH_VARIABLE);

        out.line(format!("\tset_target_properties({} PROPERTIES", target));
        out.line(format!("\t\tCOMPILE_FLAGS \"/Yu\\\"{}\\\"\"", pch));
        out.line("\t)");
        out.line(format!("\tset_source_files_properties({} PROPERTIES", pch));
        out.line(format!("\t\tCOMPILE_FLAGS \"/Yc\\\"{}\\\"\"", pch));
        out.line("\t)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pch_flags_are_well_formed() {
        let mut out = CMakeWriter::new();
        MsvcToolchain.write_precompiled_header(&mut out, "app");
        let text = out.finish();

        assert!(text.contains("set_target_properties(app PROPERTIES"));
        assert!(text.contains(r#"COMPILE_FLAGS "/Yu\"${PRECOMPILED_HEADER}\"""#));
        assert!(text.contains(r#"COMPILE_FLAGS "/Yc\"${PRECOMPILED_HEADER}\"""#));
        // Every quote opened inside a flag value is closed on the same line
        for line in text.lines().filter(|l| l.contains("COMPILE_FLAGS")) {
            assert_eq!(line.matches('"').count() % 2, 0, "unbalanced quotes: {}", line);
        }
    }
}
