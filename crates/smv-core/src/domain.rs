use serde::{Deserialize, Serialize};

/// Slack channel id (e.g. "C024BE91L").
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub String);

/// Which listing/history API family a channel belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

/// One entry of a channel listing response.
#[derive(Clone, Debug)]
pub struct ChannelEntry {
    pub id: ChannelId,
    pub name: String,
}

/// A channel name resolved to its id + visibility.
///
/// Resolved once per operation; never cached across runs.
#[derive(Clone, Debug)]
pub struct ResolvedChannel {
    pub id: ChannelId,
    pub name: String,
    pub visibility: Visibility,
}

/// A single message from channel history.
///
/// Anything beyond `ts`/`text`/`attachments` is kept verbatim in `extra`
/// so archives hold exactly what the API returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// String-encoded Unix timestamp with fractional seconds
    /// ("1503435956.000247").
    pub ts: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Opaque structured payload, replayed unmodified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<serde_json::Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    /// Numeric value of `ts`, or `None` if it does not parse.
    pub fn ts_seconds(&self) -> Option<f64> {
        self.ts.trim().parse::<f64>().ok()
    }
}

/// Stable ascending sort by numeric `ts`.
///
/// Numeric comparison, not lexicographic ("9.5" sorts before "10.2").
/// Unparsable timestamps sort first; equal timestamps keep fetch order.
pub fn sort_by_ts(messages: &mut [Message]) {
    messages.sort_by(|a, b| {
        let a = a.ts_seconds().unwrap_or(f64::NEG_INFINITY);
        let b = b.ts_seconds().unwrap_or(f64::NEG_INFINITY);
        a.total_cmp(&b)
    });
}
