//! `keel clean` command

use anyhow::Result;

use super::{build_dir, status};
use crate::cli::CleanArgs;
use keel::ops::keel_build::clean;
use keel::util::process::SystemExecutor;
use keel::util::GlobalContext;

pub fn execute(args: CleanArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let platform = ctx.platform();

    let build_dir = build_dir(args.build_dir, &ctx);
    let cleaned = clean(
        ctx.cwd(),
        &build_dir,
        platform.as_ref(),
        &SystemExecutor,
        ctx.orchestrator_settings(),
    )?;

    status("Cleaned", cleaned.display());

    Ok(())
}
