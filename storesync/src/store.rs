//! Store facade driving the whole resolution.
//!
//! One [`Store`] owns the delivery and storefront clients, the session
//! manager and the installed-package inventory, and walks each product
//! through the resolution state machine:
//!
//! `Start → SessionReady → SyncedCatalog → ArchitectureSelected →
//! CandidatesFiltered → IdentitiesBuilt → [UrlResolved]*`
//!
//! Failure of any step aborts the resolution for that product; nothing is
//! retried. An empty identity list means "up to date" or "unsupported on
//! this host" — the two are deliberately indistinguishable.

use crate::catalog::{Product, StorefrontClient};
use crate::config::ClientConfig;
use crate::error::ProtocolError;
use crate::http::HttpClient;
use crate::identity::UpdateIdentity;
use crate::inventory::InstalledPackages;
use crate::protocol::{extract_download_url, DeliveryClient};
use crate::resolve::{build_update_identities, decode_sync_catalog, resolve_candidates};
use crate::session::SessionManager;
use tracing::{debug, info};

/// Update-resolution client for one process.
pub struct Store<C, I> {
    config: ClientConfig,
    delivery: DeliveryClient<C>,
    storefront: StorefrontClient<C>,
    session: SessionManager,
    inventory: I,
}

impl<C, I> Store<C, I>
where
    C: HttpClient + Clone,
    I: InstalledPackages,
{
    /// Create a store client.
    ///
    /// The HTTP client is shared between the delivery and storefront
    /// endpoints; its connection pool is the only shared transport state.
    pub fn new(config: ClientConfig, http: C, inventory: I) -> Self {
        let delivery = DeliveryClient::new(http.clone(), config.delivery_url());
        let storefront = StorefrontClient::new(http, &config);
        Self {
            config,
            delivery,
            storefront,
            session: SessionManager::new(),
            inventory,
        }
    }

    /// Resolve product metadata for a batch of product ids, sequentially.
    pub async fn get_products(&self, product_ids: &[String]) -> Result<Vec<Product>, ProtocolError> {
        let mut products = Vec::with_capacity(product_ids.len());
        for product_id in product_ids {
            products.push(self.storefront.get_product(product_id).await?);
        }
        Ok(products)
    }

    /// Resolve package family names to product ids.
    pub async fn resolve_family_names(
        &self,
        family_names: &[String],
    ) -> Result<Vec<String>, ProtocolError> {
        self.storefront.resolve_family_names(family_names).await
    }

    /// Resolve the updates a product needs, in apply order.
    ///
    /// Returns an empty list when the product is current, has no published
    /// update data, or has no architecture compatible with this host.
    pub async fn sync_updates(
        &self,
        product: &Product,
    ) -> Result<Vec<UpdateIdentity>, ProtocolError> {
        let Some(selected) = product.selected_architecture else {
            debug!(
                product_id = %product.product_id,
                "product has no platform compatible with this host"
            );
            return Ok(Vec::new());
        };

        let token = self.session.ensure(&self.delivery).await?;
        let response = self
            .delivery
            .sync_updates(token, &product.category_id)
            .await?;
        let catalog = decode_sync_catalog(&response)?;
        debug!(
            records = catalog.records.len(),
            fragments = catalog.fragments.len(),
            "sync catalog decoded"
        );

        let mut candidates = resolve_candidates(
            selected,
            self.config.host_architecture(),
            &catalog.records,
        )?;

        if self.config.dependency_narrowing() && !candidates.is_empty() {
            let closure = self
                .storefront
                .framework_dependencies(&product.product_id)
                .await?;
            candidates.retain(|candidate| {
                candidate.main_package
                    || closure
                        .iter()
                        .any(|family| family.eq_ignore_ascii_case(&candidate.package_family_name))
            });
            debug!(count = candidates.len(), "candidates narrowed to dependency closure");
        }

        let identities = build_update_identities(&catalog.fragments, &candidates, &self.inventory);
        info!(
            product_id = %product.product_id,
            title = %product.title,
            updates = identities.len(),
            "update resolution finished"
        );
        Ok(identities)
    }

    /// Resolve the download URL for one update identity.
    pub async fn get_url(&self, identity: &UpdateIdentity) -> Result<String, ProtocolError> {
        let response = self
            .delivery
            .extended_update_info(&identity.update_id, &identity.revision_number)
            .await?;
        extract_download_url(&response, self.config.download_host())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::Architecture;
    use crate::http::tests::RoutedHttpClient;
    use crate::inventory::StaticInventory;
    use crate::version::PackageVersion;

    const DOWNLOAD_HOST: &str = "http://tlu.dl.delivery.mp.microsoft.com";

    fn config() -> ClientConfig {
        ClientConfig::new().with_host_architecture(Architecture::X64)
    }

    fn product(selected: Option<Architecture>) -> Product {
        Product {
            product_id: "9ABCDEF".to_string(),
            title: "Contoso Notes".to_string(),
            category_id: "cat-123".to_string(),
            selected_architecture: selected,
        }
    }

    fn cookie_response() -> &'static str {
        "<Envelope><Body><EncryptedData>token==</EncryptedData></Body></Envelope>"
    }

    fn sync_response() -> String {
        let main_record = "<UpdateInfo><ID>1</ID><Xml><Files>\
            <File InstallerSpecificIdentifier=\"Contoso.Notes_2.0.0.0_x64__8wekyb3d8bbwe\" \
            Modified=\"2024-03-01T10:00:00Z\"/></Files>\
            <AppxPackageInstallData MainPackage=\"true\"/></Xml></UpdateInfo>";
        let dep_record = "<UpdateInfo><ID>2</ID><Xml><Files>\
            <File InstallerSpecificIdentifier=\"Contoso.Runtime_1.1.0.0_x64__8wekyb3d8bbwe\" \
            Modified=\"2024-03-01T10:00:00Z\"/></Files>\
            <AppxPackageInstallData MainPackage=\"false\"/></Xml></UpdateInfo>";
        let main_fragment = "<UpdateInfo><ID>1</ID><Xml>\
            <UpdateIdentity UpdateID=\"u-main\" RevisionNumber=\"1\"/>\
            <SecuredFragment/></Xml></UpdateInfo>";
        let dep_fragment = "<UpdateInfo><ID>2</ID><Xml>\
            <UpdateIdentity UpdateID=\"u-dep\" RevisionNumber=\"1\"/>\
            <SecuredFragment/></Xml></UpdateInfo>";
        format!(
            "<Envelope><Body><SyncUpdatesResult>\
             {main_record}{dep_record}{main_fragment}{dep_fragment}\
             </SyncUpdatesResult></Body></Envelope>"
        )
    }

    fn routed() -> RoutedHttpClient {
        RoutedHttpClient::new()
            .route("GetCookie", cookie_response())
            .route("SyncUpdates", sync_response())
    }

    #[tokio::test]
    async fn test_sync_updates_emits_dependencies_before_main() {
        let store = Store::new(config(), routed(), StaticInventory::new());

        let identities = store.sync_updates(&product(Some(Architecture::X64))).await.unwrap();
        let order: Vec<&str> = identities.iter().map(|i| i.update_id.as_str()).collect();
        assert_eq!(order, vec!["u-dep", "u-main"]);
        assert!(identities[1].main_package);
    }

    #[tokio::test]
    async fn test_sync_updates_unsupported_product_is_empty_without_network() {
        // No routes at all: any HTTP call would fail the test.
        let store = Store::new(config(), RoutedHttpClient::new(), StaticInventory::new());

        let identities = store.sync_updates(&product(None)).await.unwrap();
        assert!(identities.is_empty());
    }

    #[tokio::test]
    async fn test_sync_updates_current_main_suppresses_dependency() {
        let mut inventory = StaticInventory::new();
        inventory.insert(
            "Contoso.Notes_8wekyb3d8bbwe",
            Architecture::X64,
            PackageVersion::new(2, 0, 0, 0),
            false,
        );
        inventory.insert(
            "Contoso.Runtime_8wekyb3d8bbwe",
            Architecture::X64,
            PackageVersion::new(1, 0, 0, 0),
            false,
        );
        let store = Store::new(config(), routed(), inventory);

        let identities = store.sync_updates(&product(Some(Architecture::X64))).await.unwrap();
        assert!(identities.is_empty());
    }

    #[tokio::test]
    async fn test_sync_updates_session_is_reused_across_products() {
        let store = Store::new(config(), routed(), StaticInventory::new());
        let product = product(Some(Architecture::X64));

        store.sync_updates(&product).await.unwrap();
        store.sync_updates(&product).await.unwrap();
        // The routed mock cannot count calls, but a second resolution
        // succeeding proves the memoized token path works end to end.
    }

    #[tokio::test]
    async fn test_sync_updates_dependency_narrowing_drops_unrelated_families() {
        let product_payload = "{\"Payload\":{\"Title\":\"Contoso Notes\",\
            \"Platforms\":[\"x64\"],\
            \"Skus\":[{\"FulfillmentData\":\"{\\\"WuCategoryId\\\":\\\"cat-123\\\",\
            \\\"FrameworkDependencies\\\":[]}\"}]}}";
        let http = routed().route("/products/9ABCDEF", product_payload);
        let store = Store::new(
            config().with_dependency_narrowing(true),
            http,
            StaticInventory::new(),
        );

        // Empty closure: only the main package survives narrowing.
        let identities = store.sync_updates(&product(Some(Architecture::X64))).await.unwrap();
        let order: Vec<&str> = identities.iter().map(|i| i.update_id.as_str()).collect();
        assert_eq!(order, vec!["u-main"]);
    }

    #[tokio::test]
    async fn test_get_url_selects_delivery_host() {
        let info_response = format!(
            "<Envelope><Body><GetExtendedUpdateInfo2Result><FileLocations>\
             <FileLocation><Url>http://alt.cdn.example.com/f</Url></FileLocation>\
             <FileLocation><Url>{DOWNLOAD_HOST}/files/pkg.msix</Url></FileLocation>\
             </FileLocations></GetExtendedUpdateInfo2Result></Body></Envelope>"
        );
        let http = RoutedHttpClient::new().route("GetExtendedUpdateInfo2", info_response);
        let store = Store::new(config(), http, StaticInventory::new());

        let identity = UpdateIdentity {
            update_id: "u-main".to_string(),
            revision_number: "1".to_string(),
            main_package: true,
        };
        let url = store.get_url(&identity).await.unwrap();
        assert_eq!(url, format!("{DOWNLOAD_HOST}/files/pkg.msix"));
    }

    #[tokio::test]
    async fn test_get_products_builds_product() {
        let payload = "{\"Payload\":{\"ShortTitle\":\"Notes\",\"Title\":\"Contoso Notes\",\
            \"Platforms\":[\"x64\"],\
            \"Skus\":[{\"FulfillmentData\":\"{\\\"WuCategoryId\\\":\\\"cat-123\\\"}\"}]}}";
        let http = RoutedHttpClient::new().route("/products/9ABCDEF", payload);
        let store = Store::new(config(), http, StaticInventory::new());

        let products = store.get_products(&["9ABCDEF".to_string()]).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Notes");
        assert_eq!(products[0].category_id, "cat-123");
        assert_eq!(products[0].selected_architecture, Some(Architecture::X64));
    }

    #[tokio::test]
    async fn test_sync_updates_propagates_protocol_errors() {
        // Session acquisition succeeds, catalog sync route is missing.
        let http = RoutedHttpClient::new().route("GetCookie", cookie_response());
        let store = Store::new(config(), http, StaticInventory::new());

        let result = store.sync_updates(&product(Some(Architecture::X64))).await;
        assert!(result.is_err());
    }
}
