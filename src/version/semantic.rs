//! Semantic versions with numeric ordering and optional prerelease labels.

use semver::{BuildMetadata, Prerelease};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::VersionError;

/// A `major.minor.patch[-prerelease]` version.
///
/// Ordering is numeric on each component in turn, so `1.9.0 < 1.10.0`, and a
/// prerelease sorts before its release: `1.0.0-rc.1 < 1.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    major: u64,
    minor: u64,
    patch: u64,
    // An empty label compares greater than any other, so the derived order holds
    pre: Prerelease,
}

impl SemanticVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Prerelease::EMPTY,
        }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// The prerelease label without its leading `-`, if any.
    pub fn prerelease(&self) -> Option<&str> {
        (!self.pre.is_empty()).then(|| self.pre.as_str())
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// The same version with `label` as its prerelease.
    pub fn with_prerelease(&self, label: &str) -> Result<Self, VersionError> {
        Ok(Self {
            pre: parse_prerelease(label)?,
            ..self.clone()
        })
    }

    /// Parse a NuGet version string.
    ///
    /// Accepts one to four numeric parts (`2` is `2.0.0`, the revision of
    /// `major.minor.build.revision` is dropped), an optional `-prerelease`
    /// label and optional `+metadata`, which is validated and dropped.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let input = text.trim();
        let (rest, metadata) = match input.split_once('+') {
            Some((rest, metadata)) => (rest, Some(metadata)),
            None => (input, None),
        };
        if let Some(metadata) = metadata {
            if metadata.is_empty() || BuildMetadata::new(metadata).is_err() {
                return Err(VersionError::InvalidFormat {
                    input: input.to_string(),
                });
            }
        }

        let (core, label) = match rest.split_once('-') {
            Some((core, label)) => (core, Some(label)),
            None => (rest, None),
        };
        let mut version = Self::parse_numeric(core, input)?;
        if let Some(label) = label {
            version.pre = parse_prerelease(label)?;
        }
        Ok(version)
    }

    /// Parse a purely numeric version, as found in `AssemblyVersion`.
    ///
    /// Same part counts as [`parse`](Self::parse), but prerelease labels and
    /// metadata are errors.
    pub fn parse_release(text: &str) -> Result<Self, VersionError> {
        let input = text.trim();
        Self::parse_numeric(input, input)
    }

    fn parse_numeric(core: &str, input: &str) -> Result<Self, VersionError> {
        if core.is_empty() {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 4 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = parse_component(part)?;
        }
        // Validated but otherwise ignored
        if let Some(revision) = parts.get(3) {
            parse_component(revision)?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }

    /// The first release of the next major line: `{major + 1}.0.0`.
    pub fn next_major(&self) -> Result<Self, VersionError> {
        let major = self
            .major
            .checked_add(1)
            .ok_or_else(|| VersionError::Overflow {
                version: self.clone(),
            })?;
        Ok(Self::new(major, 0, 0))
    }
}

fn parse_component(part: &str) -> Result<u64, VersionError> {
    // u64::from_str accepts a leading '+', which is not a version digit
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionError::InvalidNumber {
            component: part.to_string(),
        });
    }
    part.parse().map_err(|_| VersionError::InvalidNumber {
        component: part.to_string(),
    })
}

fn parse_prerelease(label: &str) -> Result<Prerelease, VersionError> {
    let invalid = || VersionError::InvalidPrerelease {
        prerelease: label.to_string(),
    };
    if label.is_empty() {
        return Err(invalid());
    }
    Prerelease::new(label).map_err(|_| invalid())
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        Ok(())
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> SemanticVersion {
        SemanticVersion::parse(text).unwrap()
    }

    #[test]
    fn test_parse_three_parts() {
        let v = v("1.2.3");
        assert_eq!(v.major(), 1);
        assert_eq!(v.minor(), 2);
        assert_eq!(v.patch(), 3);
        assert_eq!(v.prerelease(), None);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(v("  4.5.6 \n"), SemanticVersion::new(4, 5, 6));
    }

    #[test]
    fn test_parse_short_forms_fill_zeros() {
        assert_eq!(v("1.2"), SemanticVersion::new(1, 2, 0));
        assert_eq!(v("2"), SemanticVersion::new(2, 0, 0));
        assert_eq!(v("2").to_string(), "2.0.0");
    }

    #[test]
    fn test_parse_assembly_version_drops_revision() {
        assert_eq!(v("1.2.3.4"), SemanticVersion::new(1, 2, 3));
    }

    #[test]
    fn test_parse_prerelease() {
        let beta = v("1.0.0-beta");
        assert_eq!(beta.prerelease(), Some("beta"));
        assert!(beta.is_prerelease());
        assert_eq!(beta.to_string(), "1.0.0-beta");

        let preview = v("9.0.0-preview.1.24080.9");
        assert_eq!(preview.major(), 9);
        assert_eq!(preview.prerelease(), Some("preview.1.24080.9"));
        assert_eq!(preview.to_string(), "9.0.0-preview.1.24080.9");
    }

    #[test]
    fn test_parse_drops_build_metadata() {
        assert_eq!(v("1.2.3+sha.5114f85"), SemanticVersion::new(1, 2, 3));
        assert_eq!(v("1.0.0-rc.1+build.7").to_string(), "1.0.0-rc.1");
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        assert!(v("1.0.0-rc.1") < v("1.0.0"));
        assert!(v("1.0.0-alpha") < v("1.0.0-beta"));
        assert!(v("1.0.0-rc.2") < v("1.0.0-rc.10"));
        assert!(v("1.0.0-rc.1") > v("0.9.9"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "", "1.2.3.4.5", "1..3", "a.b.c", "1.2.x", "1.0.*", "+1.2.3", "-1.2.3",
            "1.2.3.", " . . ", "1.2.3-", "1.2.3-beta..1", "1.2.3-beta_1", "1.2.3+",
            "1.2.3+a+b",
        ] {
            assert!(
                SemanticVersion::parse(input).is_err(),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_release_is_numeric_only() {
        assert_eq!(
            SemanticVersion::parse_release("2.3.1.0").unwrap(),
            SemanticVersion::new(2, 3, 1)
        );
        assert_eq!(
            SemanticVersion::parse_release("2").unwrap(),
            SemanticVersion::new(2, 0, 0)
        );
        for input in ["1.0.0-beta", "1.0.0+meta", "1.0.*", ""] {
            assert!(
                SemanticVersion::parse_release(input).is_err(),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn test_invalid_prerelease_error() {
        let err = SemanticVersion::parse("1.0.0-beta..1").unwrap_err();
        assert!(matches!(err, VersionError::InvalidPrerelease { .. }));
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let err = SemanticVersion::parse("18446744073709551616.0.0").unwrap_err();
        assert!(matches!(err, VersionError::InvalidNumber { .. }));
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(SemanticVersion::new(1, 10, 0).to_string(), "1.10.0");
        assert_eq!(v("01.002.3").to_string(), "1.2.3");
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(SemanticVersion::new(1, 9, 0) < SemanticVersion::new(1, 10, 0));
        assert!(SemanticVersion::new(1, 2, 10) > SemanticVersion::new(1, 2, 9));
        assert!(SemanticVersion::new(2, 0, 0) > SemanticVersion::new(1, 99, 99));
    }

    #[test]
    fn test_next_major() {
        assert_eq!(
            SemanticVersion::new(2, 3, 1).next_major().unwrap(),
            SemanticVersion::new(3, 0, 0)
        );
        assert_eq!(v("2.0.0-rc.1").next_major().unwrap(), SemanticVersion::new(3, 0, 0));
        assert!(SemanticVersion::new(u64::MAX, 0, 0).next_major().is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&SemanticVersion::new(1, 2, 3)).unwrap();
        assert_eq!(json, "\"1.2.3\"");
        let json = serde_json::to_string(&v("1.2.3-beta")).unwrap();
        assert_eq!(json, "\"1.2.3-beta\"");
    }
}
