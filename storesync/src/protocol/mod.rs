//! Wire-level client for the delivery service.
//!
//! The service exposes two call modes against one base endpoint: unsecured
//! (session acquisition, catalog sync) and secured (extended update info).
//! Both post a SOAP envelope built by substituting values into a fixed
//! embedded template. Response bodies embed inner documents with
//! entity-escaped markup, which is unescaped before any decoding.

use crate::error::ProtocolError;
use crate::http::HttpClient;
use tracing::debug;

const GET_COOKIE_TEMPLATE: &str = include_str!("templates/get_cookie.xml");
const SYNC_UPDATES_TEMPLATE: &str = include_str!("templates/sync_updates.xml");
const EXTENDED_UPDATE_INFO_TEMPLATE: &str = include_str!("templates/get_extended_update_info.xml");

/// Client for the delivery service's SOAP endpoints.
pub struct DeliveryClient<C> {
    http: C,
    base_url: String,
}

impl<C: HttpClient> DeliveryClient<C> {
    /// Create a client against the given base endpoint.
    ///
    /// The base URL is expected to end with `/`; the secured call mode
    /// appends `secured` to it.
    pub fn new(http: C, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, secured: bool) -> String {
        if secured {
            format!("{}secured", self.base_url)
        } else {
            self.base_url.clone()
        }
    }

    /// Post a SOAP envelope and return the unescaped response document.
    async fn post_envelope(&self, body: String, secured: bool) -> Result<String, ProtocolError> {
        let url = self.endpoint(secured);
        let bytes = self.http.post_soap(&url, &body).await?;
        let text = String::from_utf8(bytes)
            .map_err(|e| ProtocolError::Malformed(format!("response is not UTF-8: {e}")))?;

        Ok(text.replace("&lt;", "<").replace("&gt;", ">"))
    }

    /// Acquire a session token.
    ///
    /// Posts the fixed session-acquisition envelope and extracts the
    /// `EncryptedData` field. Callers memoize the result; see
    /// [`crate::session::SessionManager`].
    pub async fn acquire_session(&self) -> Result<String, ProtocolError> {
        debug!("acquiring delivery session token");
        let document = self.post_envelope(GET_COOKIE_TEMPLATE.to_string(), false).await?;
        element_text(&document, "EncryptedData")
    }

    /// Perform the catalog-sync exchange for a product category.
    ///
    /// Returns the raw (unescaped) response document; the resolver decodes
    /// the `SyncUpdatesResult` subtree out of it.
    pub async fn sync_updates(
        &self,
        token: &str,
        category_id: &str,
    ) -> Result<String, ProtocolError> {
        debug!(category_id, "syncing update catalog");
        let body = SYNC_UPDATES_TEMPLATE
            .replace("{token}", token)
            .replace("{category}", category_id);
        self.post_envelope(body, false).await
    }

    /// Fetch extended update info for one update identity (secured mode).
    pub async fn extended_update_info(
        &self,
        update_id: &str,
        revision_number: &str,
    ) -> Result<String, ProtocolError> {
        debug!(update_id, revision_number, "fetching extended update info");
        let body = EXTENDED_UPDATE_INFO_TEMPLATE
            .replace("{update_id}", update_id)
            .replace("{revision}", revision_number);
        self.post_envelope(body, true).await
    }
}

/// Extract the text of the first element with the given local name.
fn element_text(xml: &str, name: &'static str) -> Result<String, ProtocolError> {
    let document = roxmltree::Document::parse(xml)
        .map_err(|e| ProtocolError::Malformed(format!("invalid XML: {e}")))?;

    document
        .descendants()
        .find(|node| node.tag_name().name() == name)
        .and_then(|node| node.text())
        .map(str::to_string)
        .ok_or(ProtocolError::MissingElement(name))
}

/// Select the download URL from an extended-update-info response.
///
/// The response may carry several URL candidates (alternate CDNs); only the
/// first one on the configured delivery host is accepted.
pub fn extract_download_url(xml: &str, host_prefix: &str) -> Result<String, ProtocolError> {
    let document = roxmltree::Document::parse(xml)
        .map_err(|e| ProtocolError::Malformed(format!("invalid XML: {e}")))?;

    document
        .descendants()
        .filter(|node| node.tag_name().name() == "Url")
        .filter_map(|node| node.text())
        .find(|url| url.starts_with(host_prefix))
        .map(str::to_string)
        .ok_or(ProtocolError::MissingElement("Url"))
}
