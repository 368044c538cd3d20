//! NuGet-style version ranges.
//!
//! | Text            | Meaning                 |
//! |-----------------|-------------------------|
//! | `1.0.0`         | `1.0.0 <= x`            |
//! | `[1.0.0]`       | `x == 1.0.0`            |
//! | `(1.0.0,)`      | `1.0.0 < x`             |
//! | `(,1.0.0]`      | `x <= 1.0.0`            |
//! | `[1.0.0,2.0.0)` | `1.0.0 <= x < 2.0.0`    |
//!
//! Bounds may carry prerelease labels: `[1.0.0-rc.1,2.0.0)`.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::{SemanticVersion, VersionError};

/// One side of a range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bound {
    pub version: SemanticVersion,
    pub inclusive: bool,
}

/// An interval of allowed versions. Either side may be unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    min: Option<Bound>,
    max: Option<Bound>,
}

impl VersionRange {
    /// Build a range, checking that it is not empty.
    pub fn new(min: Option<Bound>, max: Option<Bound>) -> Result<Self, VersionError> {
        if min.is_none() && max.is_none() {
            return Err(VersionError::Unbounded);
        }
        if let (Some(lo), Some(hi)) = (&min, &max) {
            let empty = lo.version > hi.version
                || (lo.version == hi.version && !(lo.inclusive && hi.inclusive));
            if empty {
                return Err(VersionError::EmptyRange {
                    min: lo.version.clone(),
                    max: hi.version.clone(),
                });
            }
        }
        Ok(Self { min, max })
    }

    /// `version <= x`
    pub fn at_least(version: SemanticVersion) -> Self {
        Self {
            min: Some(Bound {
                version,
                inclusive: true,
            }),
            max: None,
        }
    }

    /// `x == version`
    pub fn exact(version: SemanticVersion) -> Self {
        let bound = Bound {
            version,
            inclusive: true,
        };
        Self {
            min: Some(bound.clone()),
            max: Some(bound),
        }
    }

    /// `[version, next major)`: the floor tracks the current build and the
    /// ceiling blocks the next major line.
    pub fn pinned_to_major(version: SemanticVersion) -> Result<Self, VersionError> {
        let next = version.next_major()?;
        Self::at_least(version).with_upper_bound(next, false)
    }

    pub fn min(&self) -> Option<&Bound> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&Bound> {
        self.max.as_ref()
    }

    pub fn is_exact(&self) -> bool {
        matches!((&self.min, &self.max), (Some(lo), Some(hi)) if lo == hi && lo.inclusive)
    }

    pub fn with_lower_bound(
        &self,
        version: SemanticVersion,
        inclusive: bool,
    ) -> Result<Self, VersionError> {
        Self::new(Some(Bound { version, inclusive }), self.max.clone())
    }

    pub fn with_upper_bound(
        &self,
        version: SemanticVersion,
        inclusive: bool,
    ) -> Result<Self, VersionError> {
        Self::new(self.min.clone(), Some(Bound { version, inclusive }))
    }

    pub fn contains(&self, version: &SemanticVersion) -> bool {
        let above_min = self.min.as_ref().is_none_or(|b| {
            if b.inclusive {
                *version >= b.version
            } else {
                *version > b.version
            }
        });
        let below_max = self.max.as_ref().is_none_or(|b| {
            if b.inclusive {
                *version <= b.version
            } else {
                *version < b.version
            }
        });
        above_min && below_max
    }

    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let input = text.trim();
        let invalid = || VersionError::InvalidRange {
            input: input.to_string(),
        };

        if input.is_empty() {
            return Err(invalid());
        }

        let min_inclusive = match input.as_bytes()[0] {
            b'[' => true,
            b'(' => false,
            _ => return Ok(Self::at_least(SemanticVersion::parse(input)?)),
        };

        let max_inclusive = match input.as_bytes()[input.len() - 1] {
            b']' if input.len() > 1 => true,
            b')' if input.len() > 1 => false,
            _ => return Err(invalid()),
        };

        let inner = input[1..input.len() - 1].trim();

        let Some((lo, hi)) = inner.split_once(',') else {
            // Only `[1.0.0]` has a single version
            if !(min_inclusive && max_inclusive) || inner.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::exact(SemanticVersion::parse(inner)?));
        };

        if hi.contains(',') {
            return Err(invalid());
        }

        let min = parse_bound(lo, min_inclusive, &invalid)?;
        let max = parse_bound(hi, max_inclusive, &invalid)?;
        Self::new(min, max)
    }
}

fn parse_bound(
    text: &str,
    inclusive: bool,
    invalid: &dyn Fn() -> VersionError,
) -> Result<Option<Bound>, VersionError> {
    let text = text.trim();
    if text.is_empty() {
        // An open side cannot include anything
        if inclusive {
            return Err(invalid());
        }
        return Ok(None);
    }
    Ok(Some(Bound {
        version: SemanticVersion::parse(text)?,
        inclusive,
    }))
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact() {
            if let Some(b) = &self.min {
                return write!(f, "[{}]", b.version);
            }
        }

        if let (Some(lo), None) = (&self.min, &self.max) {
            if lo.inclusive {
                return write!(f, "{}", lo.version);
            }
        }

        f.write_str(match &self.min {
            Some(b) if b.inclusive => "[",
            _ => "(",
        })?;
        if let Some(b) = &self.min {
            write!(f, "{}", b.version)?;
        }
        f.write_str(",")?;
        if let Some(b) = &self.max {
            write!(f, "{}", b.version)?;
        }
        f.write_str(match &self.max {
            Some(b) if b.inclusive => "]",
            _ => ")",
        })
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
