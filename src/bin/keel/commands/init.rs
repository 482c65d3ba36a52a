//! `keel init` command

use anyhow::Result;

use super::new::print_dependency_hint;
use super::status;
use crate::cli::InitArgs;
use keel::ops::keel_new::init_project;
use keel::util::GlobalContext;

pub fn execute(args: InitArgs) -> Result<()> {
    let mut ctx = GlobalContext::new()?;
    if let Some(path) = args.path {
        ctx = GlobalContext::with_cwd(ctx.cwd().join(path));
    }
    let platform = ctx.platform();

    let summary = init_project(ctx.cwd(), platform.as_ref())?;
    let descriptor = &summary.descriptor;

    status(
        "Initialized",
        format!("{} `{}` project", descriptor.kind.describe(), descriptor.name),
    );
    for file in &summary.written {
        status("Wrote", file);
    }
    for file in &summary.kept {
        status("Kept", file);
    }

    print_dependency_hint(&summary, ctx.facts());

    Ok(())
}
