//! Replaying a single message: timestamp marker first, then the content.

use chrono::{Local, TimeZone};

use crate::{
    domain::{ChannelId, Message},
    errors::Error,
    port::ChatApi,
    Result,
};

/// Local-timezone ISO-8601 rendering of a message `ts`.
///
/// The fractional part is printed only when nonzero.
pub fn marker_timestamp(ts: &str) -> Result<String> {
    let seconds = ts
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidArgument(format!("unparsable message timestamp: {ts:?}")))?;

    let secs = seconds.floor() as i64;
    let nanos = (((seconds - seconds.floor()) * 1_000_000_000.0).round() as u32).min(999_999_999);

    let dt = Local
        .timestamp_opt(secs, nanos)
        .single()
        .ok_or_else(|| Error::InvalidArgument(format!("timestamp out of range: {ts:?}")))?;

    Ok(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
}

/// Replay one message into `to`: a `:timer_clock:` marker carrying the
/// original timestamp, then the message body (text + attachments).
///
/// Returns the platform acknowledgement of the content post; the marker's
/// response payload is discarded. Two outbound messages per call, and the
/// marker is not undoable.
pub async fn post_with_marker(
    api: &dyn ChatApi,
    message: &Message,
    to: &ChannelId,
) -> Result<bool> {
    if to.0.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "destination channel id is empty".to_string(),
        ));
    }

    let marker = format!(":timer_clock: {}", marker_timestamp(&message.ts)?);
    api.post_message(to, &marker, None).await?;

    let text = message.text.as_deref().unwrap_or("");
    api.post_message(to, text, message.attachments.as_ref()).await
}
