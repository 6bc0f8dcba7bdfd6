//! Candidate grouping and architecture filtering.

use crate::architecture::Architecture;
use crate::error::ProtocolError;
use crate::identity::InstallerIdentifier;
use crate::resolve::decode::InstallRecord;
use crate::version::PackageVersion;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A deduplicated, architecture-tagged package candidate.
///
/// Ephemeral: candidates never outlive one resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Correlation id of the most recently modified record in the group.
    pub correlation_id: String,
    /// Timestamp of that record.
    pub last_modified: DateTime<Utc>,
    /// Concrete architecture; neutral records adopt the product's
    /// selected architecture.
    pub architecture: Architecture,
    /// Package name (first identifier field).
    pub name: String,
    /// Stable `name_familySuffix` identifier for installed-state lookups.
    pub package_family_name: String,
    /// Candidate version.
    pub version: PackageVersion,
    /// Whether this is the product's main package.
    pub main_package: bool,
}

/// Group install records into candidates and narrow them to one working
/// architecture.
///
/// `selected` is the product's selected architecture; `native` is the
/// host's. Records are kept only when their architecture token is the
/// native token, the host-compatible token, or `neutral`. Groups are keyed
/// by `(name, architectureToken)`: the latest-modified record in a group
/// supplies the correlation id, every other field is fixed by the group's
/// first record. The working architecture is taken from the main-package
/// candidates, preferring native over the compatible fallback; without a
/// compatible main package the resolution is empty.
pub fn resolve_candidates(
    selected: Architecture,
    native: Architecture,
    records: &[InstallRecord],
) -> Result<Vec<Candidate>, ProtocolError> {
    let compatible = native.compatible();

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut groups: HashMap<(String, String), usize> = HashMap::new();

    for record in records {
        let identifier = InstallerIdentifier::parse(&record.identifier)?;
        let token = identifier.architecture_token.to_ascii_lowercase();

        let applies = token == "neutral"
            || token.eq_ignore_ascii_case(native.token())
            || compatible.is_some_and(|arch| token.eq_ignore_ascii_case(arch.token()));
        if !applies {
            continue;
        }

        let architecture = if token == "neutral" {
            selected
        } else {
            match Architecture::from_token(&token) {
                Some(architecture) => architecture,
                None => {
                    // An applicable token we cannot resolve means the whole
                    // catalog targets something this host cannot run.
                    warn!(
                        token = %token,
                        "unresolvable architecture token, treating product as unsupported"
                    );
                    return Ok(Vec::new());
                }
            }
        };

        let key = (identifier.name.clone(), token);
        match groups.get(&key) {
            Some(&index) => {
                // Supersession by recency: only the correlation id follows
                // the newest record; ties keep the first-seen record.
                let candidate = &mut candidates[index];
                if record.modified > candidate.last_modified {
                    candidate.correlation_id = record.correlation_id.clone();
                    candidate.last_modified = record.modified;
                }
            }
            None => {
                groups.insert(key, candidates.len());
                candidates.push(Candidate {
                    correlation_id: record.correlation_id.clone(),
                    last_modified: record.modified,
                    architecture,
                    package_family_name: identifier.package_family_name(),
                    name: identifier.name,
                    version: identifier.version,
                    main_package: record.main_package,
                });
            }
        }
    }

    let main_with = |arch: Architecture| {
        candidates
            .iter()
            .any(|candidate| candidate.main_package && candidate.architecture == arch)
    };
    let working = if main_with(native) {
        native
    } else if let Some(fallback) = compatible.filter(|&arch| main_with(arch)) {
        fallback
    } else {
        debug!("no main package compatible with host architecture");
        return Ok(Vec::new());
    };

    candidates.retain(|candidate| candidate.architecture == working);
    debug!(
        working = %working,
        count = candidates.len(),
        "candidates narrowed to working architecture"
    );
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, identifier: &str, hour: u32, main: bool) -> InstallRecord {
        InstallRecord {
            correlation_id: id.to_string(),
            identifier: identifier.to_string(),
            modified: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            main_package: main,
        }
    }

    #[test]
    fn test_skips_foreign_architectures() {
        let records = vec![
            record("1", "App_1.0.0.0_x64__suffix", 1, true),
            record("2", "App.Arm_1.0.0.0_arm64__suffix", 1, false),
        ];
        let candidates =
            resolve_candidates(Architecture::X64, Architecture::X64, &records).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "App");
    }

    #[test]
    fn test_neutral_adopts_selected_architecture() {
        let records = vec![
            record("1", "App_1.0.0.0_x64__suffix", 1, true),
            record("2", "App.Assets_1.0.0.0_neutral__suffix", 1, false),
        ];
        let candidates =
            resolve_candidates(Architecture::X64, Architecture::X64, &records).unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates
            .iter()
            .all(|c| c.architecture == Architecture::X64));
    }

    #[test]
    fn test_grouping_keeps_latest_correlation_id() {
        let records = vec![
            record("old", "App_1.0.0.0_x64__suffix", 1, true),
            record("new", "App_2.0.0.0_x64__suffix", 5, true),
            record("mid", "App_1.5.0.0_x64__suffix", 3, true),
        ];
        let candidates =
            resolve_candidates(Architecture::X64, Architecture::X64, &records).unwrap();

        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.correlation_id, "new");
        // All other fields are fixed by the first-seen record.
        assert_eq!(candidate.version, PackageVersion::new(1, 0, 0, 0));
    }

    #[test]
    fn test_grouping_tie_keeps_first_seen() {
        let records = vec![
            record("first", "App_1.0.0.0_x64__suffix", 2, true),
            record("second", "App_1.0.0.0_x64__suffix", 2, true),
        ];
        let candidates =
            resolve_candidates(Architecture::X64, Architecture::X64, &records).unwrap();
        assert_eq!(candidates[0].correlation_id, "first");
    }

    #[test]
    fn test_same_name_different_token_are_distinct_groups() {
        let records = vec![
            record("1", "App_1.0.0.0_x64__suffix", 1, true),
            record("2", "App_1.0.0.0_x86__suffix", 1, true),
        ];
        let candidates =
            resolve_candidates(Architecture::X64, Architecture::X64, &records).unwrap();
        // Working architecture prefers native x64, so only that group remains.
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].architecture, Architecture::X64);
    }

    #[test]
    fn test_working_architecture_falls_back_to_compatible() {
        let records = vec![
            record("1", "App_1.0.0.0_x86__suffix", 1, true),
            record("2", "App.Runtime_1.0.0.0_x86__suffix", 1, false),
        ];
        let candidates =
            resolve_candidates(Architecture::X86, Architecture::X64, &records).unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates
            .iter()
            .all(|c| c.architecture == Architecture::X86));
    }

    #[test]
    fn test_no_main_package_yields_empty() {
        let records = vec![record("1", "App.Runtime_1.0.0.0_x64__suffix", 1, false)];
        let candidates =
            resolve_candidates(Architecture::X64, Architecture::X64, &records).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_dependencies_on_other_architecture_are_dropped() {
        let records = vec![
            record("1", "App_1.0.0.0_x64__suffix", 1, true),
            record("2", "App.Runtime_1.0.0.0_x86__suffix", 1, false),
        ];
        let candidates =
            resolve_candidates(Architecture::X64, Architecture::X64, &records).unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].main_package);
    }

    #[test]
    fn test_empty_records_yield_empty() {
        let candidates = resolve_candidates(Architecture::X64, Architecture::X64, &[]).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_malformed_identifier_is_error() {
        let records = vec![record("1", "App_x64", 1, true)];
        assert!(resolve_candidates(Architecture::X64, Architecture::X64, &records).is_err());
    }

    #[test]
    fn test_family_name_derivation() {
        let records = vec![record("1", "App_1.0.0.0_x64_res_suffix", 1, true)];
        let candidates =
            resolve_candidates(Architecture::X64, Architecture::X64, &records).unwrap();
        assert_eq!(candidates[0].package_family_name, "App_suffix");
    }
}
