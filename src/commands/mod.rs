use anyhow::Result;
use log::debug;
use std::io::Write;
use std::path::PathBuf;

use crate::application::UpdateUseCase;
use crate::runtime::Runtime;
use crate::source::SourceKind;

pub mod config;
mod report;

use config::Config;
use report::{print_json, print_report};

/// Command line settings for an update run.
#[derive(Debug, Clone)]
pub struct UpdateArgs {
    pub root: Option<PathBuf>,
    pub dry_run: bool,
    pub exclude: Vec<String>,
    pub manifest_ext: Option<String>,
    pub version_source: SourceKind,
    pub assembly_info: PathBuf,
    pub json: bool,
}

/// Pin intra-solution dependency ranges and print the report to stdout.
#[tracing::instrument(skip(runtime, args))]
pub fn update<R: Runtime>(runtime: R, args: UpdateArgs) -> Result<()> {
    let stdout = std::io::stdout();
    run(&runtime, &args, &mut stdout.lock())
}

#[tracing::instrument(skip(runtime, args, out))]
pub fn run<R: Runtime, W: Write>(runtime: &R, args: &UpdateArgs, out: &mut W) -> Result<()> {
    let config = Config::new(runtime, args)?;
    let source = config.version_source();

    let summary = UpdateUseCase::new(config.runtime, source.as_ref()).execute(&config.options)?;
    debug!(
        "{} package(s), {} change(s), {} manifest(s) written",
        summary.packages.len(),
        summary.changes.len(),
        summary.manifests_written
    );

    if args.json {
        print_json(out, &summary)?;
    } else {
        print_report(out, &summary)?;
    }
    Ok(())
}
