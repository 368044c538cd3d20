use log::debug;
use std::path::{Path, PathBuf};

use crate::error::{UpdateError, UpdateResult};
use crate::runtime::Runtime;
use crate::version::SemanticVersion;

use super::VersionSource;

/// Location of the AssemblyInfo file relative to the manifest's directory.
pub const DEFAULT_ASSEMBLY_INFO: &str = "Properties/AssemblyInfo.cs";

/// Reads the `AssemblyVersion` attribute from an AssemblyInfo source file.
pub struct AssemblyInfoSource<'a, R: Runtime> {
    runtime: &'a R,
    relative_path: PathBuf,
}

impl<'a, R: Runtime> AssemblyInfoSource<'a, R> {
    pub fn new(runtime: &'a R, relative_path: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            relative_path: relative_path.into(),
        }
    }
}

impl<R: Runtime> VersionSource for AssemblyInfoSource<'_, R> {
    #[tracing::instrument(skip(self))]
    fn current_version(&self, source_dir: &Path) -> UpdateResult<SemanticVersion> {
        let path = source_dir.join(&self.relative_path);
        let unavailable = |reason: String| UpdateError::VersionUnavailable {
            dir: source_dir.to_path_buf(),
            reason,
        };

        if !self.runtime.exists(&path) {
            return Err(unavailable(format!("{} not found", path.display())));
        }

        let contents = self
            .runtime
            .read_to_string(&path)
            .map_err(|e| UpdateError::io(&path, e))?;

        let value = find_assembly_version(&contents).ok_or_else(|| unavailable(format!("no AssemblyVersion attribute in {}", path.display())))?;

        debug!("{:?}: AssemblyVersion(\"{}\")", path, value);

        SemanticVersion::parse_release(&value).map_err(|source| UpdateError::Parse {
            path,
            context: "AssemblyVersion attribute".into(),
            source,
        })
    }
}

/// The value of the first `AssemblyVersion` attribute outside comments.
fn find_assembly_version(contents: &str) -> Option<String> {
    let mut in_block = false;
    contents
        .lines()
        .find_map(|line| assembly_version(&strip_comments(line, &mut in_block)))
}

/// `line` without `//` and `/* */` comments. `in_block` carries an open block
/// comment over to the next line. Comment markers inside string literals are
/// kept.
fn strip_comments(line: &str, in_block: &mut bool) -> String {
    let mut code = String::with_capacity(line.len());
    let mut in_string = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if *in_block {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                *in_block = false;
            }
            continue;
        }
        if in_string {
            code.push(c);
            match c {
                '\\' => code.extend(chars.next()),
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match (c, chars.peek()) {
            ('/', Some('/')) => break,
            ('/', Some('*')) => {
                chars.next();
                *in_block = true;
                code.push(' ');
            }
            ('"', _) => {
                in_string = true;
                code.push(c);
            }
            _ => code.push(c),
        }
    }
    code
}

/// The quoted value of an `AssemblyVersion` attribute line.
///
/// Whitespace is insignificant; C# (`[assembly: ...]`), F# (`[<assembly: ...>]`)
/// and VB (`<Assembly: ...>`) forms are recognised, with or without the
/// `System.Reflection.` qualifier and the `Attribute` suffix.
fn assembly_version(line: &str) -> Option<String> {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();

    // ASCII lowercasing keeps byte offsets aligned with `compact`
    let lower = compact.to_ascii_lowercase();
    let start = ["[assembly:", "[<assembly:", "<assembly:"]
        .iter()
        .find_map(|prefix| lower.starts_with(prefix).then_some(prefix.len()))?;

    let rest = &compact[start..];
    let rest = rest.strip_prefix("System.Reflection.").unwrap_or(rest);
    let rest = rest
        .strip_prefix("AssemblyVersionAttribute(")
        .or_else(|| rest.strip_prefix("AssemblyVersion("))?;
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}
