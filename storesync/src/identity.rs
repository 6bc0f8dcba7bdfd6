//! Package identity strings.
//!
//! The catalog identifies an installer with an underscore-delimited
//! five-field record:
//!
//! `name_version_architectureToken_<opaque>_familySuffix`
//!
//! The stable package family name used to query installed state is
//! `name_familySuffix`, distinct from the full versioned identity.

use crate::error::ProtocolError;
use crate::version::PackageVersion;

/// A parsed `InstallerSpecificIdentifier` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerIdentifier {
    pub name: String,
    pub version: PackageVersion,
    pub architecture_token: String,
    pub family_suffix: String,
}

impl InstallerIdentifier {
    /// Parse the five-field identifier record.
    ///
    /// The fourth (opaque) field may be empty, which still yields five
    /// tokens. Anything with fewer than five fields is malformed.
    pub fn parse(identifier: &str) -> Result<Self, ProtocolError> {
        let fields: Vec<&str> = identifier.split('_').collect();
        if fields.len() < 5 {
            return Err(ProtocolError::Malformed(format!(
                "installer identifier has {} fields, expected 5: {identifier:?}",
                fields.len()
            )));
        }

        Ok(Self {
            name: fields[0].to_string(),
            version: fields[1].parse()?,
            architecture_token: fields[2].to_string(),
            family_suffix: fields[fields.len() - 1].to_string(),
        })
    }

    /// The stable `name_familySuffix` identifier.
    pub fn package_family_name(&self) -> String {
        format!("{}_{}", self.name, self.family_suffix)
    }
}

/// An update the caller should download, in apply order.
///
/// Produced by the identity builder; dependencies always precede the
/// main package in the returned sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateIdentity {
    /// Opaque update id used by the secured info call.
    pub update_id: String,
    /// Revision number paired with the update id.
    pub revision_number: String,
    /// Whether this is the product's primary installable unit.
    pub main_package: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier() {
        let id =
            InstallerIdentifier::parse("Contoso.Notes_2.1.0.0_x64__8wekyb3d8bbwe").unwrap();
        assert_eq!(id.name, "Contoso.Notes");
        assert_eq!(id.version, PackageVersion::new(2, 1, 0, 0));
        assert_eq!(id.architecture_token, "x64");
        assert_eq!(id.family_suffix, "8wekyb3d8bbwe");
    }

    #[test]
    fn test_parse_identifier_with_opaque_field() {
        let id = InstallerIdentifier::parse(
            "Contoso.Notes_2.1.0.0_neutral_split.scale-100_8wekyb3d8bbwe",
        )
        .unwrap();
        assert_eq!(id.architecture_token, "neutral");
        assert_eq!(id.family_suffix, "8wekyb3d8bbwe");
    }

    #[test]
    fn test_package_family_name() {
        let id =
            InstallerIdentifier::parse("Contoso.Notes_2.1.0.0_x64__8wekyb3d8bbwe").unwrap();
        assert_eq!(id.package_family_name(), "Contoso.Notes_8wekyb3d8bbwe");
    }

    #[test]
    fn test_parse_rejects_short_identifier() {
        assert!(InstallerIdentifier::parse("Contoso.Notes_2.1.0.0_x64").is_err());
        assert!(InstallerIdentifier::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_version() {
        assert!(InstallerIdentifier::parse("Contoso.Notes_abc_x64__8wekyb3d8bbwe").is_err());
    }
}
