//! Four-component package versions.

use crate::error::ProtocolError;
use std::fmt;
use std::str::FromStr;

/// A numeric `major.minor.build.revision` package version.
///
/// Ordering is strictly component-wise: `2.0.0.0 > 1.9.9.9999`. Missing
/// trailing components parse as zero, so `"1.2"` equals `"1.2.0.0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PackageVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl PackageVersion {
    /// Create a version from its four components.
    pub fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl FromStr for PackageVersion {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = [0u32; 4];
        let mut count = 0;

        for part in s.split('.') {
            if count == 4 {
                return Err(ProtocolError::Malformed(format!(
                    "version has more than four components: {s}"
                )));
            }
            components[count] = part.parse().map_err(|_| {
                ProtocolError::Malformed(format!("non-numeric version component in {s:?}"))
            })?;
            count += 1;
        }

        Ok(Self {
            major: components[0],
            minor: components[1],
            build: components[2],
            revision: components[3],
        })
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}
