//! Client configuration.

use crate::architecture::Architecture;

/// Default delivery service endpoint (session, catalog sync, secured info).
pub const DEFAULT_DELIVERY_URL: &str =
    "https://fe3.delivery.mp.microsoft.com/ClientWebService/client.asmx/";

/// Default storefront endpoint (product metadata).
pub const DEFAULT_STOREFRONT_URL: &str = "https://storeedgefd.dsx.mp.microsoft.com/v9.0";

/// Only download URLs on this host are accepted; alternate CDNs are ignored.
pub const DEFAULT_DOWNLOAD_HOST: &str = "http://tlu.dl.delivery.mp.microsoft.com";

/// Default market passed to the storefront.
pub const DEFAULT_MARKET: &str = "US";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the update-resolution client.
///
/// # Example
///
/// ```
/// use storesync::config::ClientConfig;
/// use storesync::architecture::Architecture;
///
/// let config = ClientConfig::new()
///     .with_market("GB")
///     .with_host_architecture(Architecture::Arm64)
///     .with_timeout_secs(60);
/// assert_eq!(config.market(), "GB");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    delivery_url: String,
    storefront_url: String,
    download_host: String,
    market: String,
    timeout_secs: u64,
    host_architecture: Architecture,
    dependency_narrowing: bool,
}

impl ClientConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delivery service base URL.
    pub fn with_delivery_url(mut self, url: impl Into<String>) -> Self {
        self.delivery_url = url.into();
        self
    }

    /// Set the storefront base URL.
    pub fn with_storefront_url(mut self, url: impl Into<String>) -> Self {
        self.storefront_url = url.into();
        self
    }

    /// Set the accepted download host prefix.
    pub fn with_download_host(mut self, host: impl Into<String>) -> Self {
        self.download_host = host.into();
        self
    }

    /// Set the storefront market code.
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    /// Set the HTTP timeout in seconds. Default: 30 seconds.
    pub fn with_timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = timeout;
        self
    }

    /// Override the host architecture. Defaults to the build target's.
    pub fn with_host_architecture(mut self, architecture: Architecture) -> Self {
        self.host_architecture = architecture;
        self
    }

    /// Enable narrowing the candidate set to the main package's declared
    /// framework dependencies. Off by default.
    pub fn with_dependency_narrowing(mut self, enabled: bool) -> Self {
        self.dependency_narrowing = enabled;
        self
    }

    /// Delivery service base URL.
    pub fn delivery_url(&self) -> &str {
        &self.delivery_url
    }

    /// Storefront base URL.
    pub fn storefront_url(&self) -> &str {
        &self.storefront_url
    }

    /// Accepted download host prefix.
    pub fn download_host(&self) -> &str {
        &self.download_host
    }

    /// Storefront market code.
    pub fn market(&self) -> &str {
        &self.market
    }

    /// HTTP timeout in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Host architecture used for platform selection and token filtering.
    pub fn host_architecture(&self) -> Architecture {
        self.host_architecture
    }

    /// Whether dependency-closure narrowing is enabled.
    pub fn dependency_narrowing(&self) -> bool {
        self.dependency_narrowing
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            delivery_url: DEFAULT_DELIVERY_URL.to_string(),
            storefront_url: DEFAULT_STOREFRONT_URL.to_string(),
            download_host: DEFAULT_DOWNLOAD_HOST.to_string(),
            market: DEFAULT_MARKET.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            host_architecture: Architecture::host().unwrap_or(Architecture::X64),
            dependency_narrowing: false,
        }
    }
}
