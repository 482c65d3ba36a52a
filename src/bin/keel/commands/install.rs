//! `keel install` command

use anyhow::Result;

use super::{build_dir, status};
use crate::cli::InstallArgs;
use keel::ops::keel_install::install;
use keel::util::process::SystemExecutor;
use keel::util::GlobalContext;

pub fn execute(args: InstallArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let platform = ctx.platform();
    let settings = ctx.orchestrator_settings();
    settings.check_cmake()?;

    let build_dir = build_dir(args.build_dir, &ctx);
    install(
        ctx.cwd(),
        &build_dir,
        args.path.as_deref(),
        platform.as_ref(),
        &SystemExecutor,
        settings,
    )?;

    match args.path {
        Some(path) => status("Installed", format!("into {}", path)),
        None => status("Installed", "into the configured prefix"),
    }

    Ok(())
}
