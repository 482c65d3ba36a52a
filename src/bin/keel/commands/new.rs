//! `keel new` command

use anyhow::Result;

use super::status;
use crate::cli::NewArgs;
use keel::core::platform::PlatformFacts;
use keel::ops::keel_new::{
    build_guide, new_project, package_manager_hint, project_tree, NewOptions, ProjectSummary,
};
use keel::util::GlobalContext;

pub fn options(args: &NewArgs) -> NewOptions {
    NewOptions {
        name: args.name.clone(),
        kind: args.kind(),
        dependencies: args.deps.clone(),
        precompile_headers: args.precompile_headers,
        include_dirs: args.include_dirs.clone(),
    }
}

pub fn execute(args: NewArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let platform = ctx.platform();

    let summary = new_project(ctx.cwd(), &options(&args), platform.as_ref())?;
    let descriptor = &summary.descriptor;

    status(
        "Created",
        format!("{} `{}` project", descriptor.kind.describe(), descriptor.name),
    );

    println!();
    for line in project_tree(descriptor, ctx.facts()) {
        println!("{}", line);
    }

    println!("\nBuild guide ({}):", ctx.facts().family());
    for line in build_guide(descriptor, ctx.facts()) {
        println!("  {}", line);
    }

    print_dependency_hint(&summary, ctx.facts());

    Ok(())
}

/// Remind the user that dependencies come from the system package manager.
pub fn print_dependency_hint(summary: &ProjectSummary, facts: PlatformFacts) {
    let deps = &summary.descriptor.dependencies;
    if deps.is_empty() {
        return;
    }

    let names: Vec<&str> = deps.iter().collect();
    println!(
        "\nnote: dependencies ({}) must be installed by the system package manager; {}",
        names.join(", "),
        package_manager_hint(facts)
    );
    println!("      or fetch and build them from a git repository with `keel get <url>`");
}
