/// Core error type for the archive/mirror tool.
///
/// The Slack adapter maps transport and API failures into `Remote` so the
/// workflows can treat the platform as a single fallible collaborator.
/// Everything propagates up to the CLI and terminates the run; the only
/// failure handled in place is a post whose response carries `ok: false`
/// (counted into the mirror report instead).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("slack api error: {0}")]
    Remote(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
