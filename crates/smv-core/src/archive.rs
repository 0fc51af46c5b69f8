//! Local channel archives: one JSON file per archived channel.

use std::{fs, path::Path};

use tracing::info;

use crate::{domain::Message, Result};

/// Archive file name for a channel.
pub fn file_name(channel_name: &str) -> String {
    format!("archive_channel={channel_name}.json")
}

/// Write the message list as a JSON array.
///
/// Overwrites any existing file of the same name; never appends. I/O
/// failures propagate unrecovered.
pub fn save(messages: &[Message], path: &Path) -> Result<()> {
    let body = serde_json::to_string(messages)?;
    fs::write(path, body)?;
    info!(path = %path.display(), count = messages.len(), "archive written");
    Ok(())
}

/// Read an archive back into messages.
pub fn load(path: &Path) -> Result<Vec<Message>> {
    let body = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&body)?)
}
