use std::io::{self, Write};

use crate::application::{DependencyStatus, RunSummary};

/// Print the human readable report: one line per package and dependency,
/// then a totals line.
pub(crate) fn print_report<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    if summary.packages.is_empty() {
        return writeln!(out, "No package manifests found in {}", summary.root.display());
    }

    for package in &summary.packages {
        writeln!(
            out,
            "Found package {} @ {} (version {})",
            package.id,
            package.manifest.display(),
            package.version
        )?;

        for dependency in &package.dependencies {
            match &dependency.status {
                DependencyStatus::External { .. } => {
                    writeln!(out, "  {} is not an intra-solution dependency", dependency.id)?
                }
                DependencyStatus::Updated { to, .. } if summary.dry_run => {
                    writeln!(out, "  {} would be updated to {}", dependency.id, to)?
                }
                DependencyStatus::Updated { to, .. } => {
                    writeln!(out, "  {} updated to {}", dependency.id, to)?
                }
                DependencyStatus::Unchanged { range } => {
                    writeln!(out, "  {} already {}", dependency.id, range)?
                }
            }
        }
    }

    let changes = summary.changes.len();
    if changes == 0 {
        writeln!(
            out,
            "{} package(s), all {} intra-solution dependency range(s) up to date",
            summary.packages.len(),
            summary.internal_dependencies
        )
    } else if summary.dry_run {
        writeln!(
            out,
            "Dry run: {} dependency range(s) in {} manifest(s) would be updated",
            changes,
            summary.manifests_changed()
        )
    } else {
        writeln!(
            out,
            "Updated {} dependency range(s) in {} manifest(s)",
            summary.edits_applied, summary.manifests_written
        )
    }
}

pub(crate) fn print_json<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{DependencyReport, PackageReport};
    use crate::version::SemanticVersion;
    use std::path::PathBuf;

    fn summary(status: DependencyStatus) -> RunSummary {
        RunSummary {
            root: PathBuf::from("/repo"),
            packages: vec![PackageReport {
                id: "Acme.App".into(),
                manifest: PathBuf::from("App.nuspec"),
                version: SemanticVersion::new(1, 0, 0),
                dependencies: vec![DependencyReport {
                    id: "Acme.Core".into(),
                    status,
                }],
            }],
            internal_dependencies: 1,
            external_dependencies: 0,
            edits_applied: 0,
            manifests_written: 0,
            dry_run: false,
            changes: vec![],
        }
    }

    fn render(summary: &RunSummary) -> String {
        let mut out = Vec::new();
        print_report(&mut out, summary).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_unapplied_dependency_reads_already() {
        let text = render(&summary(DependencyStatus::Unchanged {
            range: "[2.3.1,3.0.0)".parse().unwrap(),
        }));
        assert_eq!(
            text,
            "Found package Acme.App @ App.nuspec (version 1.0.0)\n\
             \x20 Acme.Core already [2.3.1,3.0.0)\n\
             1 package(s), all 1 intra-solution dependency range(s) up to date\n"
        );
    }

    #[test]
    fn test_prerelease_versions_are_printed_with_label() {
        let mut summary = summary(DependencyStatus::External {
            range: "[1.0.0-rc.1,2.0.0)".parse().unwrap(),
        });
        summary.packages[0].version = SemanticVersion::parse("1.0.0-beta").unwrap();
        summary.internal_dependencies = 0;

        let text = render(&summary);
        assert!(text.starts_with("Found package Acme.App @ App.nuspec (version 1.0.0-beta)\n"));
        assert!(text.contains("  Acme.Core is not an intra-solution dependency\n"));
    }
}
