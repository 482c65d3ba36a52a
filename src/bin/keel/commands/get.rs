//! `keel get` command

use anyhow::{bail, Result};

use super::{resolve_build_type, status};
use crate::cli::GetArgs;
use keel::ops::keel_get::{get, GetOptions, GitCloner};
use keel::util::process::SystemExecutor;
use keel::util::GlobalContext;

pub fn execute(args: GetArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let platform = ctx.platform();
    let settings = ctx.orchestrator_settings();
    settings.check_cmake()?;

    let opts = GetOptions {
        build_type: resolve_build_type(&args.build_type, &ctx)?,
        install_prefix: args.prefix,
    };

    let report = get(
        ctx.cwd(),
        &args.urls,
        &opts,
        &GitCloner,
        platform.as_ref(),
        &SystemExecutor,
        &settings,
    );

    if !report.succeeded.is_empty() {
        status("Fetched", report.succeeded.join(", "));
    }
    if !report.is_success() {
        bail!(
            "failed to get {} of {} libraries: {}",
            report.failed.len(),
            args.urls.len(),
            report.failed.join(", ")
        );
    }

    Ok(())
}
