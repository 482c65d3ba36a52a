//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

use keel::builder::cmake::BuildType;
use keel::core::descriptor::ProjectKind;

/// Keel - C++ project scaffolding and CMake build orchestration
#[derive(Parser)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project with CMake.json and CMakeLists.txt
    New(NewArgs),

    /// Regenerate a project from the CMake.json in the current directory
    Init(InitArgs),

    /// Configure (when needed) and build the project
    Build(BuildArgs),

    /// Install the built project
    Install(InstallArgs),

    /// Remove the files recorded by the last install
    Uninstall(UninstallArgs),

    /// Clone CMake projects with git and build them
    #[command(after_help = "Example:\n  keel get https://github.com/fmtlib/fmt.git -r")]
    Get(GetArgs),

    /// Empty the build directory
    Clean(CleanArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("kind").args(["executable", "static_lib", "shared"])))]
#[command(after_help = "Examples:\n  keel new myapp -e -D fmt -D sdl2\n  keel new mylib -s -D boost")]
pub struct NewArgs {
    /// Project name (defaults to my_project)
    pub name: Option<String>,

    /// Create an executable project (default)
    #[arg(short, long)]
    pub executable: bool,

    /// Create a static library project
    #[arg(short = 's', long = "static")]
    pub static_lib: bool,

    /// Create a shared library project
    #[arg(short = 'd', long)]
    pub shared: bool,

    /// Add a dependency (repeatable)
    #[arg(short = 'D', long = "dep", value_name = "DEPENDENCY")]
    pub deps: Vec<String>,

    /// Generate and wire a precompiled header
    #[arg(short, long)]
    pub precompile_headers: bool,

    /// Extra include directories
    #[arg(short, long = "include-dir", value_name = "DIR", num_args = 1..)]
    pub include_dirs: Vec<String>,
}

impl NewArgs {
    pub fn kind(&self) -> ProjectKind {
        if self.static_lib {
            ProjectKind::StaticLibrary
        } else if self.shared {
            ProjectKind::SharedLibrary
        } else {
            ProjectKind::Executable
        }
    }
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}

/// Build type selection shared by `build` and `get`.
#[derive(Args, Debug, Clone, Default)]
pub struct BuildTypeArgs {
    /// Build using Debug mode (default)
    #[arg(short, long, conflicts_with_all = ["release", "build_type"])]
    pub debug: bool,

    /// Build using Release mode
    #[arg(short, long, conflicts_with = "build_type")]
    pub release: bool,

    /// Build type (Debug, Release, RelWithDebInfo, MinSizeRel)
    #[arg(long, value_name = "TYPE")]
    pub build_type: Option<BuildType>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub build_type: BuildTypeArgs,

    /// Install prefix recorded at configure time
    #[arg(short, long, value_name = "DIR")]
    pub prefix: Option<String>,

    /// Configure without building
    #[arg(short, long)]
    pub configure_only: bool,

    /// Build directory
    #[arg(short, long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Clean the CMake cache before building
    #[arg(short = 'C', long)]
    pub clean_cache: bool,

    /// Extra arguments passed to CMake's configure step
    #[arg(last = true, value_name = "CMAKE_ARGS")]
    pub cmake_args: Vec<String>,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Install prefix (defaults to the prefix chosen at configure time)
    pub path: Option<String>,

    /// Build directory
    #[arg(short, long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct UninstallArgs {
    /// Build directory holding install_manifest.txt
    #[arg(short, long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct GetArgs {
    /// Repository URLs
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    #[command(flatten)]
    pub build_type: BuildTypeArgs,

    /// Install prefix for the fetched libraries
    #[arg(short, long, value_name = "DIR")]
    pub prefix: Option<String>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Build directory
    #[arg(short, long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_new_flags() {
        let Commands::New(args) = parse(&[
            "keel", "new", "myapp", "-s", "-D", "fmt", "-D", "sdl2", "-p", "-i", "third_party", "vendor",
        ]) else {
            panic!("expected new");
        };

        assert_eq!(args.name.as_deref(), Some("myapp"));
        assert_eq!(args.kind(), ProjectKind::StaticLibrary);
        assert_eq!(args.deps, ["fmt", "sdl2"]);
        assert!(args.precompile_headers);
        assert_eq!(args.include_dirs, ["third_party", "vendor"]);
    }

    #[test]
    fn test_new_defaults() {
        let Commands::New(args) = parse(&["keel", "new"]) else {
            panic!("expected new");
        };

        assert!(args.name.is_none());
        assert_eq!(args.kind(), ProjectKind::Executable);
        assert!(args.deps.is_empty());
    }

    #[test]
    fn test_new_kinds_conflict() {
        assert!(Cli::try_parse_from(["keel", "new", "x", "-s", "-d"]).is_err());
    }

    #[test]
    fn test_build_flags() {
        let Commands::Build(args) = parse(&[
            "keel", "build", "-r", "-p", "/opt/app", "-c", "-b", "out", "-C", "--", "-DFOO=ON",
        ]) else {
            panic!("expected build");
        };

        assert!(args.build_type.release);
        assert_eq!(args.prefix.as_deref(), Some("/opt/app"));
        assert!(args.configure_only);
        assert_eq!(args.build_dir, Some(PathBuf::from("out")));
        assert!(args.clean_cache);
        assert_eq!(args.cmake_args, ["-DFOO=ON"]);
    }

    #[test]
    fn test_build_type_option() {
        let Commands::Build(args) = parse(&["keel", "build", "--build-type", "minsizerel"]) else {
            panic!("expected build");
        };
        assert_eq!(args.build_type.build_type, Some(BuildType::MinSizeRel));

        assert!(Cli::try_parse_from(["keel", "build", "-d", "-r"]).is_err());
        assert!(Cli::try_parse_from(["keel", "build", "--build-type", "Fast"]).is_err());
    }

    #[test]
    fn test_get_requires_url() {
        assert!(Cli::try_parse_from(["keel", "get"]).is_err());

        let Commands::Get(args) = parse(&["keel", "get", "https://a/b.git", "https://c/d", "-r"])
        else {
            panic!("expected get");
        };
        assert_eq!(args.urls.len(), 2);
        assert!(args.build_type.release);
    }

    #[test]
    fn test_install_path() {
        let Commands::Install(args) = parse(&["keel", "install", "/tmp/prefix"]) else {
            panic!("expected install");
        };
        assert_eq!(args.path.as_deref(), Some("/tmp/prefix"));
    }
}
