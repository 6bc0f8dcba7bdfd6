//! Command line arguments.

use clap::Parser;
use storesync::architecture::Architecture;

/// Check the store delivery service for application updates.
///
/// Resolves each product's update packages and prints the identities that
/// would need to be downloaded, optionally with their download URLs.
#[derive(Debug, Parser)]
#[command(name = "storesync", version = storesync::VERSION)]
pub struct Args {
    /// Storefront product ids (e.g. 9WZDNCRFJBMP)
    #[arg(required = true)]
    pub product_ids: Vec<String>,

    /// Treat the positional arguments as package family names and resolve
    /// them to product ids first
    #[arg(long)]
    pub family_names: bool,

    /// Storefront market code
    #[arg(long, default_value = "US")]
    pub market: String,

    /// Override the host architecture (x86, x64, arm, arm64)
    #[arg(long, value_parser = parse_architecture)]
    pub arch: Option<Architecture>,

    /// Also resolve the download URL for each update
    #[arg(long)]
    pub urls: bool,

    /// Narrow candidates to the main package's framework dependencies
    #[arg(long)]
    pub narrow_dependencies: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

fn parse_architecture(value: &str) -> Result<Architecture, String> {
    Architecture::from_token(value)
        .ok_or_else(|| format!("unknown architecture {value:?}, expected x86, x64, arm or arm64"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let args = Args::parse_from(["storesync", "9WZDNCRFJBMP"]);
        assert_eq!(args.product_ids, vec!["9WZDNCRFJBMP".to_string()]);
        assert_eq!(args.market, "US");
        assert!(!args.urls);
        assert_eq!(args.timeout, 30);
    }

    #[test]
    fn test_parse_architecture_override() {
        let args = Args::parse_from(["storesync", "--arch", "arm64", "9WZDNCRFJBMP"]);
        assert_eq!(args.arch, Some(Architecture::Arm64));
    }

    #[test]
    fn test_rejects_unknown_architecture() {
        assert!(Args::try_parse_from(["storesync", "--arch", "ia64", "9WZDNCRFJBMP"]).is_err());
    }

    #[test]
    fn test_requires_a_product_id() {
        assert!(Args::try_parse_from(["storesync"]).is_err());
    }
}
