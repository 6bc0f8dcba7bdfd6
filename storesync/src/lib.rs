//! storesync - update resolution against the store delivery service
//!
//! This library resolves, for an application product, the set of update
//! packages that must be downloaded from the delivery service, accounting
//! for processor-architecture compatibility, package dependency closure,
//! and already-installed package versions.
//!
//! # High-Level API
//!
//! The [`store`] module provides the facade driving the whole pipeline:
//!
//! ```ignore
//! use storesync::config::ClientConfig;
//! use storesync::http::ReqwestClient;
//! use storesync::inventory::StaticInventory;
//! use storesync::store::Store;
//!
//! let config = ClientConfig::new();
//! let http = ReqwestClient::with_timeout(config.timeout_secs())?;
//! let store = Store::new(config, http, StaticInventory::new());
//!
//! let products = store.get_products(&product_ids).await?;
//! for product in &products {
//!     for identity in store.sync_updates(product).await? {
//!         println!("{}", store.get_url(&identity).await?);
//!     }
//! }
//! ```

pub mod architecture;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod inventory;
pub mod logging;
pub mod protocol;
pub mod resolve;
pub mod session;
pub mod store;
pub mod version;

/// Version of the storesync library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
