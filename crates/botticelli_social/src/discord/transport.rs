//! Serenity-backed response transport.

use super::conversions::discord_ids;
use super::error::is_not_found;
use async_trait::async_trait;
use botticelli_cache::{ResponseId, ResponseTransport};
use botticelli_error::{CacheError, CacheErrorKind, CacheResult};
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Fetches and deletes bot responses through Discord's HTTP API.
///
/// Share the HTTP client of a running bot so rate limits are coordinated.
#[derive(Clone)]
pub struct SerenityTransport {
    http: Arc<Http>,
}

impl SerenityTransport {
    /// Create a transport over an existing HTTP client.
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ResponseTransport for SerenityTransport {
    type Handle = (ChannelId, MessageId);

    #[instrument(skip(self, response_id), fields(response_id = %response_id))]
    async fn fetch(
        &self,
        channel_id: u64,
        response_id: ResponseId,
    ) -> CacheResult<Option<Self::Handle>> {
        let Some((channel, message)) = discord_ids(channel_id, response_id) else {
            return Ok(None);
        };

        match self.http.get_message(channel, message).await {
            Ok(found) => {
                debug!(author = %found.author.id, "Fetched cached response");
                Ok(Some((channel, message)))
            }
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(CacheError::new(CacheErrorKind::Transport(e.to_string()))),
        }
    }

    async fn delete(&self, response: Self::Handle) -> CacheResult<()> {
        let (channel, message) = response;
        self.http
            .delete_message(channel, message, None)
            .await
            .map_err(|e| CacheError::new(CacheErrorKind::Transport(e.to_string())))
    }
}
