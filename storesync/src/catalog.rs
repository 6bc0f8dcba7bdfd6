//! Storefront catalog client.
//!
//! Resolves product ids to the metadata the engine needs (title, update
//! category id, supported platforms) and package family names back to
//! product ids. All payloads are decoded into typed records; a missing
//! field is an explicit `Option`, never a runtime lookup failure.

use crate::architecture::{select_architecture, Architecture};
use crate::config::ClientConfig;
use crate::error::ProtocolError;
use crate::http::HttpClient;
use serde::Deserialize;
use tracing::debug;

/// An application product, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Storefront product id.
    pub product_id: String,
    /// Display title.
    pub title: String,
    /// Update category id used by the catalog-sync call.
    pub category_id: String,
    /// Platform the product is treated as running on, or `None` when no
    /// supported platform is compatible with the host. `None`
    /// short-circuits resolution to an empty result.
    pub selected_architecture: Option<Architecture>,
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    #[serde(rename = "Payload")]
    payload: ProductPayload,
}

#[derive(Debug, Deserialize)]
struct ProductPayload {
    #[serde(rename = "ShortTitle", default)]
    short_title: Option<String>,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Platforms", default)]
    platforms: Vec<String>,
    #[serde(rename = "Skus", default)]
    skus: Vec<Sku>,
}

#[derive(Debug, Deserialize)]
struct Sku {
    /// JSON document carried as a string inside the SKU.
    #[serde(rename = "FulfillmentData")]
    fulfillment_data: String,
}

#[derive(Debug, Deserialize)]
struct FulfillmentData {
    #[serde(rename = "WuCategoryId")]
    wu_category_id: String,
    #[serde(rename = "FrameworkDependencies", default)]
    framework_dependencies: Vec<FrameworkDependency>,
}

#[derive(Debug, Deserialize)]
struct FrameworkDependency {
    #[serde(rename = "PackageFamilyName")]
    package_family_name: String,
}

#[derive(Debug, Deserialize)]
struct FamilyLookupEnvelope {
    #[serde(rename = "Payload")]
    payload: FamilyLookupPayload,
}

#[derive(Debug, Deserialize)]
struct FamilyLookupPayload {
    #[serde(rename = "Products", default)]
    products: Vec<ProductRef>,
}

#[derive(Debug, Deserialize)]
struct ProductRef {
    #[serde(rename = "ProductId")]
    product_id: String,
}

/// Client for the storefront product-metadata endpoints.
pub struct StorefrontClient<C> {
    http: C,
    base_url: String,
    market: String,
    host_architecture: Architecture,
}

impl<C: HttpClient> StorefrontClient<C> {
    /// Create a client from the shared configuration.
    pub fn new(http: C, config: &ClientConfig) -> Self {
        Self {
            http,
            base_url: config.storefront_url().to_string(),
            market: config.market().to_string(),
            host_architecture: config.host_architecture(),
        }
    }

    fn products_url(&self, path: &str) -> String {
        format!(
            "{}/products{}?market={}&locale=iv&deviceFamily=Windows.Desktop",
            self.base_url, path, self.market
        )
    }

    async fn fetch_payload(&self, product_id: &str) -> Result<ProductPayload, ProtocolError> {
        let url = self.products_url(&format!("/{product_id}"));
        let bytes = self.http.get(&url).await?;
        let envelope: ProductEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| ProtocolError::Malformed(format!("product payload: {e}")))?;
        Ok(envelope.payload)
    }

    fn fulfillment(payload: &ProductPayload) -> Result<FulfillmentData, ProtocolError> {
        let sku = payload
            .skus
            .first()
            .ok_or(ProtocolError::MissingElement("Skus"))?;
        serde_json::from_str(&sku.fulfillment_data)
            .map_err(|e| ProtocolError::Malformed(format!("fulfillment data: {e}")))
    }

    /// Resolve a product id to a [`Product`].
    ///
    /// The title prefers the short form when present; the selected
    /// architecture is chosen from the product's supported platform list
    /// against the host architecture and its compatible fallback.
    pub async fn get_product(&self, product_id: &str) -> Result<Product, ProtocolError> {
        let payload = self.fetch_payload(product_id).await?;
        let fulfillment = Self::fulfillment(&payload)?;

        let title = payload
            .short_title
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&payload.title)
            .to_string();
        let selected_architecture =
            select_architecture(self.host_architecture, &payload.platforms);

        debug!(
            product_id,
            title = %title,
            ?selected_architecture,
            "resolved product metadata"
        );

        Ok(Product {
            product_id: product_id.to_string(),
            title,
            category_id: fulfillment.wu_category_id,
            selected_architecture,
        })
    }

    /// Resolve package family names to product ids (batch lookup).
    pub async fn resolve_family_names(
        &self,
        family_names: &[String],
    ) -> Result<Vec<String>, ProtocolError> {
        let body = serde_json::json!({
            "IdType": "PackageFamilyName",
            "ProductIds": family_names,
        })
        .to_string();

        let url = self.products_url("");
        let bytes = self.http.post_json(&url, &body).await?;
        let envelope: FamilyLookupEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| ProtocolError::Malformed(format!("family lookup payload: {e}")))?;

        Ok(envelope
            .payload
            .products
            .into_iter()
            .map(|product| product.product_id)
            .collect())
    }

    /// Package family names of the product's declared framework dependencies.
    ///
    /// Used only when dependency-closure narrowing is enabled.
    pub async fn framework_dependencies(
        &self,
        product_id: &str,
    ) -> Result<Vec<String>, ProtocolError> {
        let payload = self.fetch_payload(product_id).await?;
        let fulfillment = Self::fulfillment(&payload)?;

        Ok(fulfillment
            .framework_dependencies
            .into_iter()
            .map(|dependency| dependency.package_family_name)
            .collect())
    }
}
