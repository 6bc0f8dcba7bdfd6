//! Processor architectures and platform selection.
//!
//! Packages in the catalog are tagged with an architecture token
//! (`x86`, `x64`, `arm`, `arm64`, or `neutral`). A host can run its native
//! architecture and, for 64-bit hosts, a 32-bit compatible fallback through
//! emulation. The selector picks the single platform a product should be
//! treated as running on, or nothing when the product supports neither.

use std::fmt;

/// A concrete processor architecture a package can target.
///
/// `neutral` is intentionally not a variant: a neutral package adopts the
/// product's selected architecture during resolution, so by the time a
/// [`Architecture`] value exists the affinity is always concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86,
    X64,
    Arm,
    Arm64,
}

impl Architecture {
    /// The lowercase token used on the wire for this architecture.
    pub fn token(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Parse a wire token, case-insensitively.
    ///
    /// Returns `None` for anything that is not a concrete architecture,
    /// including `"neutral"` — callers handle neutral explicitly.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "x86" => Some(Architecture::X86),
            "x64" | "amd64" => Some(Architecture::X64),
            "arm" => Some(Architecture::Arm),
            "arm64" => Some(Architecture::Arm64),
            _ => None,
        }
    }

    /// The emulation fallback this architecture can also run, if any.
    ///
    /// x64 hosts run x86 packages and arm64 hosts run arm packages;
    /// x86 and arm have no fallback.
    pub fn compatible(&self) -> Option<Self> {
        match self {
            Architecture::X64 => Some(Architecture::X86),
            Architecture::Arm64 => Some(Architecture::Arm),
            Architecture::X86 | Architecture::Arm => None,
        }
    }

    /// The architecture of the build target, when it is one we model.
    pub fn host() -> Option<Self> {
        Self::from_token(std::env::consts::ARCH)
            .or(match std::env::consts::ARCH {
                "x86_64" => Some(Architecture::X64),
                "aarch64" => Some(Architecture::Arm64),
                _ => None,
            })
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Pick the platform a product should be treated as running on.
///
/// Matches the host's native architecture against the product's supported
/// platform list case-insensitively; if absent, tries the host's compatible
/// fallback. Returns `None` when neither matches, which short-circuits the
/// whole resolution for that product.
pub fn select_architecture(native: Architecture, supported: &[String]) -> Option<Architecture> {
    let matches = |arch: Architecture| {
        supported
            .iter()
            .any(|platform| platform.eq_ignore_ascii_case(arch.token()))
    };

    if matches(native) {
        return Some(native);
    }
    native.compatible().filter(|&fallback| matches(fallback))
}
