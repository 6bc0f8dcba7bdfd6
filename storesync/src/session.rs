//! Process-wide session token management.
//!
//! The delivery service authenticates catalog calls with an opaque encrypted
//! token obtained from a one-time acquisition call. The token has no modeled
//! expiry: if the service invalidates it, subsequent calls fail and the
//! error propagates — there is no automatic refresh.

use crate::error::ProtocolError;
use crate::http::HttpClient;
use crate::protocol::DeliveryClient;
use tokio::sync::OnceCell;
use tracing::debug;

/// Memoizes the session token with single-flight acquisition.
///
/// Concurrent first callers all await the same acquisition call; exactly
/// one request is sent. A failed acquisition is not cached, so the next
/// caller retries from scratch.
#[derive(Debug, Default)]
pub struct SessionManager {
    token: OnceCell<String>,
}

impl SessionManager {
    /// Create a manager with no token acquired yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session token, acquiring it on first use.
    pub async fn ensure<C: HttpClient>(
        &self,
        delivery: &DeliveryClient<C>,
    ) -> Result<&str, ProtocolError> {
        let token = self
            .token
            .get_or_try_init(|| async {
                let token = delivery.acquire_session().await?;
                debug!("session token acquired");
                Ok::<_, ProtocolError>(token)
            })
            .await?;

        Ok(token.as_str())
    }

    /// Drop any acquired token so the next call re-acquires.
    ///
    /// Intended for tests that exercise acquisition repeatedly.
    pub fn reset(&mut self) {
        self.token.take();
    }
}
