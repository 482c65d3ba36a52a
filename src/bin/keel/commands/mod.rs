//! Command implementations

pub mod build;
pub mod clean;
pub mod get;
pub mod init;
pub mod install;
pub mod new;
pub mod uninstall;

use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::cli::BuildTypeArgs;
use keel::builder::cmake::BuildType;
use keel::util::GlobalContext;

/// Print a right-aligned status line to stderr.
pub fn status(verb: &str, message: impl std::fmt::Display) {
    eprintln!("{:>12} {}", verb, message);
}

/// Pick the build type: flags first, then `--build-type`, then config.
pub fn resolve_build_type(args: &BuildTypeArgs, ctx: &GlobalContext) -> Result<BuildType> {
    if args.release {
        return Ok(BuildType::Release);
    }
    if args.debug {
        return Ok(BuildType::Debug);
    }
    if let Some(build_type) = args.build_type {
        return Ok(build_type);
    }

    match ctx.config().build.build_type.as_deref() {
        Some(configured) => configured
            .parse()
            .map_err(|e: String| anyhow!("invalid `build.build_type` in config: {}", e)),
        None => Ok(BuildType::default()),
    }
}

/// Build directory from the command line, falling back to config.
pub fn build_dir(arg: Option<PathBuf>, ctx: &GlobalContext) -> PathBuf {
    arg.unwrap_or_else(|| ctx.build_dir())
}
