//! Subprocess execution utilities.
//!
//! Every external program (CMake, `rm` under `sudo`, ...) is described by a
//! [`ProcessBuilder`] and launched through an [`Executor`], so tests can
//! observe exactly which commands would run.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the working directory, if one was set.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Prefix this command with another program, e.g. `sudo`.
    ///
    /// The original program becomes the first argument of the wrapper.
    pub fn wrapped_by(self, wrapper: impl AsRef<Path>) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program.to_string_lossy().into_owned());
        args.extend(self.args);
        ProcessBuilder {
            program: wrapper.as_ref().to_path_buf(),
            args,
            cwd: self.cwd,
        }
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|arg| {
            if arg.contains(' ') {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        }));
        parts.join(" ")
    }
}

/// Exit status of a finished subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessStatus {
    pub fn success() -> Self {
        ProcessStatus { code: Some(0) }
    }

    pub fn failure(code: i32) -> Self {
        ProcessStatus { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Something that can run a subprocess to completion.
pub trait Executor {
    /// Run the command, blocking until it exits.
    ///
    /// Errors are reserved for failing to launch or wait on the process;
    /// a non-zero exit is reported through [`ProcessStatus`].
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessStatus>;

    /// Run the command and require a zero exit code.
    fn run_checked(&self, cmd: &ProcessBuilder) -> Result<()> {
        let status = self.run(cmd)?;
        if !status.is_success() {
            match status.code {
                Some(code) => bail!("`{}` failed with exit code {}", cmd.display_command(), code),
                None => bail!("`{}` was terminated by a signal", cmd.display_command()),
            }
        }
        Ok(())
    }
}

/// Runs commands on the host, passing stdout/stderr through to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessStatus> {
        tracing::debug!("Running `{}`", cmd.display_command());

        let status = cmd
            .build_command()
            .status()
            .with_context(|| format!("failed to execute `{}`", cmd.get_program().display()))?;

        Ok(ProcessStatus {
            code: status.code(),
        })
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("cmake").args(["..", "-G", "MinGW Makefiles"]);

        assert_eq!(pb.display_command(), "cmake .. -G \"MinGW Makefiles\"");
    }

    #[test]
    fn test_wrapped_by_keeps_cwd_and_args() {
        let pb = ProcessBuilder::new("cmake")
            .args(["--install", "."])
            .cwd("build")
            .wrapped_by("sudo");

        assert_eq!(pb.get_program(), Path::new("sudo"));
        assert_eq!(pb.get_args(), ["cmake", "--install", "."]);
        assert_eq!(pb.get_cwd(), Some(Path::new("build")));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_reports_exit_code() {
        let exec = SystemExecutor;

        let ok = exec.run(&ProcessBuilder::new("true")).unwrap();
        assert!(ok.is_success());

        let failed = exec.run(&ProcessBuilder::new("false")).unwrap();
        assert_eq!(failed.code, Some(1));

        let err = exec.run_checked(&ProcessBuilder::new("false")).unwrap_err();
        assert!(err.to_string().contains("failed with exit code 1"));
    }

    #[test]
    fn test_missing_program_is_error() {
        let exec = SystemExecutor;
        let result = exec.run(&ProcessBuilder::new("keel-no-such-program-xyz"));
        assert!(result.is_err());
    }
}
