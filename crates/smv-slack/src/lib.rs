//! Slack Web API adapter.
//!
//! Implements the `smv-core` `ChatApi` port over the classic Web API
//! method families (`channels.*` for public channels, `groups.*` for
//! private ones, `chat.postMessage` for replay).

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use smv_core::{
    domain::{ChannelEntry, ChannelId, Message, Visibility},
    errors::Error,
    port::ChatApi,
    Result,
};

const DEFAULT_BASE_URL: &str = "https://slack.com/api";

#[derive(Clone, Debug)]
pub struct SlackClient {
    token: String,
    base_url: String,
    http: reqwest::Client,
}

impl SlackClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Base-url override for tests and self-hosted proxies.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client build");
        Self {
            token: token.into(),
            base_url: base_url.into(),
            http,
        }
    }

    /// One outbound RPC call: POST the form params to
    /// `<base>/<method>`, decode the body to text, then JSON-parse it.
    pub async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/{method}", self.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .form(params)
            .send()
            .await
            .map_err(|e| Error::Remote(format!("{method} request error: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Remote(format!("{method} body read error: {e}")))?;

        if !status.is_success() {
            return Err(Error::Remote(format!(
                "{method} failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Remote(format!("{method} returned malformed JSON: {e}")))
    }

    /// Connectivity self-test (`api.test`).
    ///
    /// Construction never performs I/O; the caller decides whether a
    /// failed self-test is fatal.
    pub async fn self_test(&self) -> Result<Value> {
        let payload = self.call("api.test", &[]).await?;
        debug!(%payload, "api.test");
        Ok(payload)
    }
}

fn listing_method(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "channels.list",
        Visibility::Private => "groups.list",
    }
}

fn history_method(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "channels.history",
        Visibility::Private => "groups.history",
    }
}

/// Pull the entries out of a listing payload.
///
/// Public listings carry them under `channels`, private ones under
/// `groups`; both field names are accepted from either method. A payload
/// with neither surfaces the API's `error` string.
fn parse_listing(payload: &Value) -> Result<Vec<ChannelEntry>> {
    let entries = payload
        .get("channels")
        .or_else(|| payload.get("groups"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            let api_error = payload
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("missing 'channels'/'groups' field");
            Error::Remote(format!("channel listing: {api_error}"))
        })?;

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id")?.as_str()?;
            let name = entry.get("name")?.as_str()?;
            Some(ChannelEntry {
                id: ChannelId(id.to_string()),
                name: name.to_string(),
            })
        })
        .collect())
}

/// The `messages` field of a history payload, or empty when absent.
fn parse_history(payload: &Value) -> Result<Vec<Message>> {
    match payload.get("messages") {
        Some(messages) => Ok(serde_json::from_value(messages.clone())?),
        None => Ok(Vec::new()),
    }
}

#[async_trait]
impl ChatApi for SlackClient {
    async fn list_channels(&self, visibility: Visibility) -> Result<Vec<ChannelEntry>> {
        let payload = self.call(listing_method(visibility), &[]).await?;
        parse_listing(&payload)
    }

    async fn history(
        &self,
        channel: &ChannelId,
        visibility: Visibility,
        limit: u32,
    ) -> Result<Vec<Message>> {
        let payload = self
            .call(
                history_method(visibility),
                &[
                    ("channel", channel.0.clone()),
                    ("count", limit.to_string()),
                ],
            )
            .await?;
        parse_history(&payload)
    }

    async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
        attachments: Option<&Value>,
    ) -> Result<bool> {
        let mut params = vec![
            ("channel", channel.0.clone()),
            ("text", text.to_string()),
            ("as_user", "true".to_string()),
        ];
        if let Some(attachments) = attachments {
            params.push(("attachments", serde_json::to_string(attachments)?));
        }

        let payload = self.call("chat.postMessage", &params).await?;
        Ok(payload.get("ok").and_then(Value::as_bool).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn listing_and_history_methods_follow_visibility() {
        assert_eq!(listing_method(Visibility::Public), "channels.list");
        assert_eq!(listing_method(Visibility::Private), "groups.list");
        assert_eq!(history_method(Visibility::Public), "channels.history");
        assert_eq!(history_method(Visibility::Private), "groups.history");
    }

    #[test]
    fn parse_listing_reads_channels_field() {
        let payload = json!({
            "ok": true,
            "channels": [
                {"id": "C024BE91L", "name": "general"},
                {"id": "C024BE92M", "name": "random"}
            ]
        });
        let entries = parse_listing(&payload).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, ChannelId("C024BE91L".to_string()));
        assert_eq!(entries[0].name, "general");
    }

    #[test]
    fn parse_listing_falls_back_to_groups_field() {
        let payload = json!({
            "ok": true,
            "groups": [{"id": "G024BE91L", "name": "priv-team"}]
        });
        let entries = parse_listing(&payload).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "priv-team");
    }

    #[test]
    fn parse_listing_surfaces_the_api_error() {
        let payload = json!({"ok": false, "error": "invalid_auth"});
        let err = parse_listing(&payload).unwrap_err();
        assert!(matches!(err, Error::Remote(msg) if msg.contains("invalid_auth")));
    }

    #[test]
    fn parse_history_defaults_to_empty() {
        assert!(parse_history(&json!({"ok": true})).unwrap().is_empty());
    }

    #[test]
    fn parse_history_keeps_unknown_message_fields() {
        let payload = json!({
            "ok": true,
            "messages": [
                {"ts": "1.0", "text": "hi", "user": "U1", "type": "message"}
            ]
        });
        let messages = parse_history(&payload).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].extra.get("user"), Some(&json!("U1")));
    }
}
