//! `keel uninstall` command

use anyhow::Result;

use super::{build_dir, status};
use crate::cli::UninstallArgs;
use keel::ops::keel_install::uninstall;
use keel::util::process::SystemExecutor;
use keel::util::GlobalContext;

pub fn execute(args: UninstallArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let platform = ctx.platform();

    let build_dir = build_dir(args.build_dir, &ctx);
    let report = uninstall(
        ctx.cwd(),
        &build_dir,
        platform.as_ref(),
        &SystemExecutor,
        ctx.orchestrator_settings(),
    )?;

    status("Removed", format!("{} file(s)", report.removed.len()));

    Ok(())
}
