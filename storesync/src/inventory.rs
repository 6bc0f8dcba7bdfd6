//! Installed-package inventory.
//!
//! The engine never inspects the machine directly; it asks an
//! [`InstalledPackages`] implementation what is already deployed. On the
//! target platform this is backed by the system package manager, in tests
//! and on other platforms by [`StaticInventory`].

use crate::architecture::Architecture;
use crate::version::PackageVersion;

/// State of one installed package family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstalledPackage {
    /// The deployed version.
    pub version: PackageVersion,
    /// Loose/developer deployment: a sideloaded build that must never be
    /// overwritten, so it is treated as up to date regardless of version.
    pub is_development: bool,
}

/// Oracle for already-installed package versions.
pub trait InstalledPackages: Send + Sync {
    /// Look up an installed package by family name.
    ///
    /// When `architecture` is given, only a deployment of that architecture
    /// matches; `None` matches any architecture (used for the main package,
    /// of which only one can be installed).
    fn find_installed(
        &self,
        family_name: &str,
        architecture: Option<Architecture>,
    ) -> Option<InstalledPackage>;
}

/// In-memory inventory.
///
/// Empty by default, meaning every candidate is reported as not installed.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    entries: Vec<InventoryEntry>,
}

#[derive(Debug, Clone)]
struct InventoryEntry {
    family_name: String,
    architecture: Architecture,
    package: InstalledPackage,
}

impl StaticInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an installed package.
    pub fn insert(
        &mut self,
        family_name: impl Into<String>,
        architecture: Architecture,
        version: PackageVersion,
        is_development: bool,
    ) {
        self.entries.push(InventoryEntry {
            family_name: family_name.into(),
            architecture,
            package: InstalledPackage {
                version,
                is_development,
            },
        });
    }
}

impl InstalledPackages for StaticInventory {
    fn find_installed(
        &self,
        family_name: &str,
        architecture: Option<Architecture>,
    ) -> Option<InstalledPackage> {
        self.entries
            .iter()
            .find(|entry| {
                entry.family_name == family_name
                    && architecture.is_none_or(|arch| arch == entry.architecture)
            })
            .map(|entry| entry.package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inventory_finds_nothing() {
        let inventory = StaticInventory::new();
        assert_eq!(inventory.find_installed("Contoso.Notes_8wekyb3d8bbwe", None), None);
    }

    #[test]
    fn test_find_by_family_name() {
        let mut inventory = StaticInventory::new();
        inventory.insert(
            "Contoso.Notes_8wekyb3d8bbwe",
            Architecture::X64,
            PackageVersion::new(1, 0, 0, 0),
            false,
        );

        let found = inventory
            .find_installed("Contoso.Notes_8wekyb3d8bbwe", None)
            .unwrap();
        assert_eq!(found.version, PackageVersion::new(1, 0, 0, 0));
        assert!(!found.is_development);
    }

    #[test]
    fn test_architecture_constraint() {
        let mut inventory = StaticInventory::new();
        inventory.insert(
            "Contoso.Runtime_8wekyb3d8bbwe",
            Architecture::X86,
            PackageVersion::new(3, 0, 0, 0),
            false,
        );

        assert!(inventory
            .find_installed("Contoso.Runtime_8wekyb3d8bbwe", Some(Architecture::X86))
            .is_some());
        assert!(inventory
            .find_installed("Contoso.Runtime_8wekyb3d8bbwe", Some(Architecture::X64))
            .is_none());
        // Unconstrained lookup matches any architecture.
        assert!(inventory
            .find_installed("Contoso.Runtime_8wekyb3d8bbwe", None)
            .is_some());
    }

    #[test]
    fn test_development_flag_preserved() {
        let mut inventory = StaticInventory::new();
        inventory.insert(
            "Contoso.Notes_8wekyb3d8bbwe",
            Architecture::X64,
            PackageVersion::new(0, 9, 0, 0),
            true,
        );

        let found = inventory
            .find_installed("Contoso.Notes_8wekyb3d8bbwe", None)
            .unwrap();
        assert!(found.is_development);
    }
}
