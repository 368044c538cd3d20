use anyhow::Result;
use clap::Parser;
use nupin::commands::{UpdateArgs, update};
use nupin::source::{DEFAULT_ASSEMBLY_INFO, SourceKind};
use std::path::PathBuf;

/// nupin - pin intra-solution NuGet dependency ranges
///
/// Finds every .nuspec below the solution root and rewrites each dependency on
/// another package of the same solution to `[current, next major)`, where
/// `current` is that package's AssemblyVersion. Dependencies on packages from
/// outside the solution are left alone.
///
/// Examples:
///   nupin                  # Update manifests below the current directory
///   nupin -r src --dry-run # Show what would change under ./src
#[derive(Parser, Debug)]
#[command(author, version = env!("NUPIN_VERSION"), about)]
struct Cli {
    /// Solution root to scan (defaults to the current directory; also via NUPIN_ROOT)
    #[arg(long = "root", short = 'r', env = "NUPIN_ROOT", value_name = "PATH")]
    root: Option<PathBuf>,

    /// Print the planned changes without writing any manifest
    #[arg(long = "dry-run", short = 'n')]
    dry_run: bool,

    /// Directory name to skip while scanning; replaces the defaults (obj, bin, packages, .git)
    #[arg(
        long = "exclude",
        value_name = "NAME",
        env = "NUPIN_EXCLUDE",
        value_delimiter = ','
    )]
    exclude: Vec<String>,

    /// Manifest file extension
    #[arg(long = "manifest-ext", value_name = "EXT", default_value = "nuspec")]
    manifest_ext: String,

    /// Where each package's current version is read from
    #[arg(long = "version-source", value_enum, default_value_t = SourceKind::AssemblyInfo)]
    version_source: SourceKind,

    /// AssemblyInfo file, relative to the manifest's directory
    #[arg(long = "assembly-info", value_name = "RELPATH", default_value = DEFAULT_ASSEMBLY_INFO)]
    assembly_info: PathBuf,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl From<Cli> for UpdateArgs {
    fn from(cli: Cli) -> Self {
        UpdateArgs {
            root: cli.root,
            dry_run: cli.dry_run,
            exclude: cli.exclude,
            manifest_ext: Some(cli.manifest_ext),
            version_source: cli.version_source,
            assembly_info: cli.assembly_info,
            json: cli.json,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = nupin::runtime::RealRuntime;

    update(runtime, cli.into())
}
