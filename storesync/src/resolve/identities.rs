//! Update-identity building.
//!
//! Walks the secured fragments of the sync response, matches them to
//! resolved candidates by correlation id and decides, against the installed
//! inventory, which packages actually need an update.

use crate::identity::UpdateIdentity;
use crate::inventory::InstalledPackages;
use crate::resolve::candidates::Candidate;
use crate::resolve::decode::SecuredFragment;
use tracing::{debug, trace};

/// Build the ordered update identities for a resolution.
///
/// Fragments that reference no retained candidate belong to filtered-out
/// records and are skipped. For each match the inventory is consulted: an
/// update is needed when the family is not installed at all, or when the
/// installed deployment is not a development one and the candidate version
/// is strictly newer. A main package that needs no update terminates the
/// whole resolution with an empty list — the product is current, so no
/// dependency updates are surfaced either. Dependencies keep their
/// discovery order; the main package is ordered last.
pub fn build_update_identities<I: InstalledPackages>(
    fragments: &[SecuredFragment],
    candidates: &[Candidate],
    inventory: &I,
) -> Vec<UpdateIdentity> {
    let mut identities = Vec::new();

    for fragment in fragments {
        let Some(candidate) = candidates
            .iter()
            .find(|candidate| candidate.correlation_id == fragment.correlation_id)
        else {
            trace!(
                correlation_id = %fragment.correlation_id,
                "fragment has no retained candidate, skipping"
            );
            continue;
        };

        // Only one main package can be installed, so its lookup is not
        // constrained to an architecture.
        let constraint = (!candidate.main_package).then_some(candidate.architecture);
        let installed = inventory.find_installed(&candidate.package_family_name, constraint);

        let update_needed = match installed {
            None => true,
            Some(package) => !package.is_development && candidate.version > package.version,
        };

        if update_needed {
            debug!(
                family = %candidate.package_family_name,
                version = %candidate.version,
                main_package = candidate.main_package,
                "update needed"
            );
            identities.push(UpdateIdentity {
                update_id: fragment.update_id.clone(),
                revision_number: fragment.revision_number.clone(),
                main_package: candidate.main_package,
            });
        } else if candidate.main_package {
            // The product as a whole is current; dependency updates must
            // not be surfaced on their own.
            debug!(
                family = %candidate.package_family_name,
                "main package is current, resolution is empty"
            );
            return Vec::new();
        }
    }

    // Dependencies first, main package last, discovery order otherwise.
    identities.sort_by_key(|identity| identity.main_package);
    identities
}
