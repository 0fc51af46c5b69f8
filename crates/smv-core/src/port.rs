use async_trait::async_trait;

use crate::{
    domain::{ChannelEntry, ChannelId, Message, Visibility},
    Result,
};

/// Hexagonal port over the chat platform.
///
/// The Slack adapter is the production implementation; workflow tests
/// drive the same seam with in-memory fakes.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// First page of the channel listing for the given visibility.
    async fn list_channels(&self, visibility: Visibility) -> Result<Vec<ChannelEntry>>;

    /// Up to `limit` messages of a channel's history, in a single call.
    async fn history(
        &self,
        channel: &ChannelId,
        visibility: Visibility,
        limit: u32,
    ) -> Result<Vec<Message>>;

    /// Post a message as the authenticated user.
    ///
    /// Returns the platform's `ok` acknowledgement; a transport failure is
    /// an `Err`, a rejected post is `Ok(false)`.
    async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
        attachments: Option<&serde_json::Value>,
    ) -> Result<bool>;
}
