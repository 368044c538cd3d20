use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::application::UpdateOptions;
use crate::package::ScanOptions;
use crate::runtime::Runtime;
use crate::source::{AssemblyInfoSource, ProjectFileSource, SourceKind, VersionSource};

use super::UpdateArgs;

/// Settings resolved from the command line and the process environment.
pub struct Config<'a, R: Runtime> {
    pub runtime: &'a R,
    pub options: UpdateOptions,
    pub source_kind: SourceKind,
    pub assembly_info: PathBuf,
}

impl<'a, R: Runtime> Config<'a, R> {
    pub fn new(runtime: &'a R, args: &UpdateArgs) -> Result<Self> {
        let root = match &args.root {
            Some(path) => path.clone(),
            None => runtime
                .current_dir()
                .context("Could not determine the current directory")?,
        };
        debug!("Using solution root: {:?}", root);

        let mut scan = ScanOptions::default();
        if let Some(ext) = &args.manifest_ext {
            scan.extension = ext.trim_start_matches('.').to_string();
        }
        let excluded: Vec<String> = args
            .exclude
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if !excluded.is_empty() {
            scan.excluded = excluded;
        }
        debug!("Scanning *.{} excluding {:?}", scan.extension, scan.excluded);

        Ok(Self {
            runtime,
            options: UpdateOptions {
                root,
                scan,
                dry_run: args.dry_run,
            },
            source_kind: args.version_source,
            assembly_info: args.assembly_info.clone(),
        })
    }

    pub fn version_source(&self) -> Box<dyn VersionSource + 'a> {
        match self.source_kind {
            SourceKind::AssemblyInfo => {
                Box::new(AssemblyInfoSource::new(self.runtime, self.assembly_info.clone()))
            }
            SourceKind::ProjectFile => Box::new(ProjectFileSource::new(self.runtime)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::source::DEFAULT_ASSEMBLY_INFO;

    fn args() -> UpdateArgs {
        UpdateArgs {
            root: None,
            dry_run: false,
            exclude: vec![],
            manifest_ext: None,
            version_source: SourceKind::AssemblyInfo,
            assembly_info: PathBuf::from(DEFAULT_ASSEMBLY_INFO),
            json: false,
        }
    }

    #[test]
    fn test_config_defaults_to_current_dir() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Ok(PathBuf::from("/work/solution")));

        let config = Config::new(&runtime, &args()).unwrap();
        assert_eq!(config.options.root, PathBuf::from("/work/solution"));
        assert_eq!(config.options.scan, ScanOptions::default());
        assert!(!config.options.dry_run);
    }

    #[test]
    fn test_config_explicit_root_skips_current_dir() {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().never();

        let args = UpdateArgs {
            root: Some(PathBuf::from("/repo")),
            dry_run: true,
            ..args()
        };
        let config = Config::new(&runtime, &args).unwrap();
        assert_eq!(config.options.root, PathBuf::from("/repo"));
        assert!(config.options.dry_run);
    }

    #[test]
    fn test_config_scan_overrides() {
        let runtime = MockRuntime::new();
        let args = UpdateArgs {
            root: Some(PathBuf::from("/repo")),
            exclude: vec!["node_modules".into(), " ".into(), "out".into()],
            manifest_ext: Some(".xml".into()),
            ..args()
        };

        let config = Config::new(&runtime, &args).unwrap();
        assert_eq!(config.options.scan.extension, "xml");
        assert_eq!(config.options.scan.excluded, ["node_modules", "out"]);
    }

    #[test]
    fn test_config_current_dir_failure() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Err(anyhow::anyhow!("removed")));

        let err = Config::new(&runtime, &args()).err().unwrap();
        assert!(err.to_string().contains("current directory"));
    }
}
