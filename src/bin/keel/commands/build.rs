//! `keel build` command

use anyhow::Result;

use super::{build_dir, resolve_build_type, status};
use crate::cli::BuildArgs;
use keel::builder::cmake::ConfigureOutcome;
use keel::ops::keel_build::{build, BuildOptions};
use keel::util::process::SystemExecutor;
use keel::util::GlobalContext;

pub fn execute(args: BuildArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let platform = ctx.platform();
    let settings = ctx.orchestrator_settings();
    settings.check_cmake()?;

    let opts = BuildOptions {
        build_type: resolve_build_type(&args.build_type, &ctx)?,
        install_prefix: args
            .prefix
            .or_else(|| ctx.config().build.install_prefix.clone()),
        configure_only: args.configure_only,
        build_dir: Some(build_dir(args.build_dir, &ctx)),
        clean_cache: args.clean_cache,
        extra_args: args.cmake_args,
    };

    let result = build(ctx.cwd(), &opts, platform.as_ref(), &SystemExecutor, settings)?;

    if result.configure == ConfigureOutcome::Configured {
        status("Configured", format!("{} in {}", opts.build_type, result.build_dir.display()));
    }
    if result.built {
        status("Finished", format!("{} build", opts.build_type));
    }

    Ok(())
}
