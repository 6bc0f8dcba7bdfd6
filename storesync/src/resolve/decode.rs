//! Decoding of the catalog-sync response.
//!
//! The raw response is walked exactly once and turned into flat install
//! records and secured fragments. Each record element sits under a wrapper
//! carrying an `ID` child; that id is the correlation key linking install
//! data to the secured fragment of the same update.

use crate::error::ProtocolError;
use chrono::{DateTime, NaiveDateTime, Utc};

/// One install-record element from the sync response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRecord {
    /// Correlation id of the owning wrapper element.
    pub correlation_id: String,
    /// Raw underscore-delimited installer identifier.
    pub identifier: String,
    /// Last-modified timestamp of the package file.
    pub modified: DateTime<Utc>,
    /// Whether this record describes the product's main package.
    pub main_package: bool,
}

/// One secured-fragment element from the sync response.
///
/// Resolving a fragment further (download URL) requires the secured call
/// mode with the update id and revision number carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecuredFragment {
    /// Correlation id of the owning wrapper element.
    pub correlation_id: String,
    /// Opaque update id.
    pub update_id: String,
    /// Revision number paired with the update id.
    pub revision_number: String,
}

/// The decoded catalog-sync response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncCatalog {
    pub records: Vec<InstallRecord>,
    pub fragments: Vec<SecuredFragment>,
}

/// Decode the `SyncUpdatesResult` subtree of a sync response.
///
/// A result with no install records at all is valid (no update data
/// published) and decodes to an empty catalog. A missing result subtree or
/// a wrapper with incomplete required fields is a [`ProtocolError`].
pub fn decode_sync_catalog(xml: &str) -> Result<SyncCatalog, ProtocolError> {
    let document = roxmltree::Document::parse(xml)
        .map_err(|e| ProtocolError::Malformed(format!("invalid sync response: {e}")))?;

    let result = document
        .descendants()
        .find(|node| node.tag_name().name() == "SyncUpdatesResult")
        .ok_or(ProtocolError::MissingElement("SyncUpdatesResult"))?;

    let mut catalog = SyncCatalog::default();

    for wrapper in result.descendants().filter(|node| node.is_element()) {
        let Some(correlation_id) = wrapper
            .children()
            .find(|child| child.tag_name().name() == "ID")
            .and_then(|id| id.text())
        else {
            continue;
        };

        let install_data = wrapper
            .descendants()
            .find(|node| node.tag_name().name() == "AppxPackageInstallData");
        if let Some(install_data) = install_data {
            let file = wrapper
                .descendants()
                .find(|node| node.tag_name().name() == "File")
                .ok_or(ProtocolError::MissingElement("File"))?;
            let identifier = file
                .attribute("InstallerSpecificIdentifier")
                .ok_or(ProtocolError::MissingElement("InstallerSpecificIdentifier"))?;
            let modified = file
                .attribute("Modified")
                .ok_or(ProtocolError::MissingElement("Modified"))?;

            catalog.records.push(InstallRecord {
                correlation_id: correlation_id.to_string(),
                identifier: identifier.to_string(),
                modified: parse_modified(modified)?,
                main_package: install_data.attribute("MainPackage") == Some("true"),
            });
        }

        let has_fragment = wrapper
            .descendants()
            .any(|node| node.tag_name().name() == "SecuredFragment");
        if has_fragment {
            let identity = wrapper
                .descendants()
                .find(|node| node.tag_name().name() == "UpdateIdentity")
                .ok_or(ProtocolError::MissingElement("UpdateIdentity"))?;
            let update_id = identity
                .attribute("UpdateID")
                .ok_or(ProtocolError::MissingElement("UpdateID"))?;
            let revision_number = identity
                .attribute("RevisionNumber")
                .ok_or(ProtocolError::MissingElement("RevisionNumber"))?;

            catalog.fragments.push(SecuredFragment {
                correlation_id: correlation_id.to_string(),
                update_id: update_id.to_string(),
                revision_number: revision_number.to_string(),
            });
        }
    }

    Ok(catalog)
}

/// Parse a `Modified` timestamp.
///
/// The service emits RFC 3339 timestamps, sometimes without an offset;
/// offset-less values are taken as UTC.
fn parse_modified(value: &str) -> Result<DateTime<Utc>, ProtocolError> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| ProtocolError::Malformed(format!("timestamp {value:?}: {e}")))
}
