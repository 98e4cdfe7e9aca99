//! Version markers attached to documents, databases, and migration steps.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error parsing a version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    /// The input was empty.
    #[error("empty version string")]
    Empty,

    /// The input did not have exactly three dot-separated components.
    #[error("expected three dot-separated components, got {0}")]
    WrongArity(usize),

    /// A component was not an unsigned integer.
    #[error("invalid version component '{0}'")]
    InvalidComponent(String),
}

/// A major.minor.patch version marker.
///
/// Totally ordered, component-wise equality, no pre-release or build-metadata
/// components. Serializes as the string form (`"1.2.3"`), which is also how it
/// is stored inside documents and database markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component.
    pub patch: u32,
}

impl Version {
    /// Version `0.0.0`, the implied version of a document with no version field.
    pub const ZERO: Version = Version::new(0, 0, 0);

    /// Create a version from its components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionParseError::WrongArity(parts.len()));
        }

        let component = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| VersionParseError::InvalidComponent(part.to_string()))
        };

        Ok(Version::new(
            component(parts[0])?,
            component(parts[1])?,
            component(parts[2])?,
        ))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(0, 0, 1) < Version::new(0, 1, 0));
        assert!(Version::new(0, 1, 0) < Version::new(1, 0, 0));
        assert!(Version::new(1, 9, 9) < Version::new(2, 0, 0));
        assert_eq!(Version::new(1, 2, 3), Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_zero_is_default() {
        assert_eq!(Version::default(), Version::ZERO);
        assert_eq!(Version::ZERO.to_string(), "0.0.0");
    }

    #[test]
    fn test_parse_roundtrip() {
        let version: Version = "1.2.3".parse().unwrap();
        assert_eq!(version, Version::new(1, 2, 3));
        assert_eq!(version.to_string(), "1.2.3");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!("".parse::<Version>(), Err(VersionParseError::Empty));
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        assert_eq!(
            "1.2".parse::<Version>(),
            Err(VersionParseError::WrongArity(2))
        );
        assert_eq!(
            "1.2.3.4".parse::<Version>(),
            Err(VersionParseError::WrongArity(4))
        );
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(
            "1.x.3".parse::<Version>(),
            Err(VersionParseError::InvalidComponent("x".to_string()))
        );
        assert_eq!(
            "-1.0.0".parse::<Version>(),
            Err(VersionParseError::InvalidComponent("-1".to_string()))
        );
    }

    #[test]
    fn test_serde_string_form() {
        let json = serde_json::to_string(&Version::new(2, 0, 1)).unwrap();
        assert_eq!(json, "\"2.0.1\"");

        let version: Version = serde_json::from_str("\"2.0.1\"").unwrap();
        assert_eq!(version, Version::new(2, 0, 1));

        assert!(serde_json::from_str::<Version>("\"2.0\"").is_err());
    }

    #[test]
    fn test_usable_as_map_key() {
        let mut map = BTreeMap::new();
        map.insert(Version::new(2, 0, 0), "b");
        map.insert(Version::new(1, 0, 0), "a");
        map.insert(Version::new(10, 0, 0), "c");

        let ordered: Vec<&str> = map.values().copied().collect();
        assert_eq!(ordered, vec!["a", "b", "c"]);
    }
}
