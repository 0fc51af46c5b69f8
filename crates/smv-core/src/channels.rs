use tracing::debug;

use crate::{
    domain::{Message, ResolvedChannel, Visibility},
    port::ChatApi,
    Result,
};

/// Resolve a channel name to its id and visibility.
///
/// Public channels are consulted first, then private ones. Returns
/// `Ok(None)` when the name is in neither listing; absence alone is never
/// an error here, callers decide what a missing channel means.
///
/// Only the first page of each listing is scanned; names beyond that page
/// do not resolve.
pub async fn resolve(api: &dyn ChatApi, name: &str) -> Result<Option<ResolvedChannel>> {
    for visibility in [Visibility::Public, Visibility::Private] {
        let entries = api.list_channels(visibility).await?;
        if let Some(entry) = entries.into_iter().find(|e| e.name == name) {
            debug!(
                name,
                id = %entry.id.0,
                visibility = visibility.as_str(),
                "channel resolved"
            );
            return Ok(Some(ResolvedChannel {
                id: entry.id,
                name: entry.name,
                visibility,
            }));
        }
    }

    debug!(name, "channel not found in either listing");
    Ok(None)
}

/// Fetch a channel's history, up to `limit` messages in one call.
///
/// No pagination: longer histories are truncated to the first response.
pub async fn fetch_history(
    api: &dyn ChatApi,
    channel: &ResolvedChannel,
    limit: u32,
) -> Result<Vec<Message>> {
    let messages = api.history(&channel.id, channel.visibility, limit).await?;
    debug!(channel = %channel.name, count = messages.len(), "history fetched");
    Ok(messages)
}
