//! The two user-facing flows: archive a channel, mirror one into another.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    archive,
    channels::{fetch_history, resolve},
    domain::{sort_by_ts, ResolvedChannel},
    errors::Error,
    port::ChatApi,
    replay::post_with_marker,
    Result,
};

/// Tunables shared by the archive and mirror workflows.
#[derive(Clone, Debug)]
pub struct WorkflowOptions {
    /// Pause between successive replayed messages (crude rate limiting,
    /// not a correctness mechanism).
    pub post_delay: Duration,
    /// Single-call history cap; older messages are truncated silently.
    pub history_limit: u32,
    /// Directory archive files are written into.
    pub archive_dir: PathBuf,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            post_delay: Duration::from_millis(500),
            history_limit: 1000,
            archive_dir: PathBuf::from("."),
        }
    }
}

/// Outcome of a mirror run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MirrorReport {
    /// Messages acknowledged by the destination (`ok: true`).
    pub replayed: usize,
    /// Messages the destination rejected (`ok: false`); the loop goes on.
    pub failed: usize,
    /// True when cancellation stopped the run before the full replay.
    pub cancelled: bool,
}

async fn resolve_or_fail(api: &dyn ChatApi, name: &str) -> Result<ResolvedChannel> {
    resolve(api, name)
        .await?
        .ok_or_else(|| Error::ChannelNotFound(name.to_string()))
}

fn archive_path(dir: &Path, channel_name: &str) -> PathBuf {
    dir.join(archive::file_name(channel_name))
}

/// Fetch a channel's history and write it to a local archive file.
///
/// Returns the path of the written archive.
pub async fn archive_channel(
    api: &dyn ChatApi,
    name: &str,
    opts: &WorkflowOptions,
) -> Result<PathBuf> {
    let channel = resolve_or_fail(api, name).await?;
    let messages = fetch_history(api, &channel, opts.history_limit).await?;

    let path = archive_path(&opts.archive_dir, name);
    archive::save(&messages, &path)?;
    Ok(path)
}

/// Replay one channel's history into another.
///
/// The source history is archived first, always, in fetch order — mirror
/// runs double as backups. Replay then goes in ascending `ts` order with
/// `post_delay` between messages. A rejected post (`ok: false`) is
/// counted and the loop continues; a transport failure aborts the run.
/// `cancel` is observed between iterations and during the pause.
pub async fn mirror(
    api: &dyn ChatApi,
    from: &str,
    to: &str,
    opts: &WorkflowOptions,
    cancel: &CancellationToken,
) -> Result<MirrorReport> {
    let source = resolve_or_fail(api, from).await?;
    let destination = resolve_or_fail(api, to).await?;

    let mut messages = fetch_history(api, &source, opts.history_limit).await?;
    archive::save(&messages, &archive_path(&opts.archive_dir, from))?;

    sort_by_ts(&mut messages);

    let mut report = MirrorReport::default();
    for message in &messages {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        if post_with_marker(api, message, &destination.id).await? {
            report.replayed += 1;
        } else {
            report.failed += 1;
            warn!(ts = %message.ts, "destination rejected message");
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                report.cancelled = true;
                break;
            }
            _ = sleep(opts.post_delay) => {}
        }
    }

    info!(
        replayed = report.replayed,
        failed = report.failed,
        cancelled = report.cancelled,
        "mirror finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::Mutex,
        time::Instant,
    };

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::domain::{ChannelEntry, ChannelId, Message, Visibility};

    /// In-memory chat platform: fixed listings, fixed source history,
    /// a log of everything posted.
    #[derive(Default)]
    struct FakeChat {
        public: Vec<(&'static str, &'static str)>,
        private: Vec<(&'static str, &'static str)>,
        history: Vec<Message>,
        reject_texts: HashSet<String>,
        posts: Mutex<Vec<(String, String)>>,
    }

    impl FakeChat {
        fn posted(&self) -> Vec<(String, String)> {
            self.posts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatApi for FakeChat {
        async fn list_channels(&self, visibility: Visibility) -> crate::Result<Vec<ChannelEntry>> {
            let entries = match visibility {
                Visibility::Public => &self.public,
                Visibility::Private => &self.private,
            };
            Ok(entries
                .iter()
                .map(|(id, name)| ChannelEntry {
                    id: ChannelId(id.to_string()),
                    name: name.to_string(),
                })
                .collect())
        }

        async fn history(
            &self,
            _channel: &ChannelId,
            _visibility: Visibility,
            _limit: u32,
        ) -> crate::Result<Vec<Message>> {
            Ok(self.history.clone())
        }

        async fn post_message(
            &self,
            channel: &ChannelId,
            text: &str,
            _attachments: Option<&serde_json::Value>,
        ) -> crate::Result<bool> {
            self.posts
                .lock()
                .unwrap()
                .push((channel.0.clone(), text.to_string()));
            // Markers never collide with content texts in these fixtures.
            Ok(!self.reject_texts.contains(text))
        }
    }

    fn msg(ts: &str, text: &str) -> Message {
        serde_json::from_value(json!({"ts": ts, "text": text})).unwrap()
    }

    fn tmp_dir(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let pid = std::process::id();
        let dir = PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn opts_in(dir: &Path, delay_ms: u64) -> WorkflowOptions {
        WorkflowOptions {
            post_delay: Duration::from_millis(delay_ms),
            history_limit: 1000,
            archive_dir: dir.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn archive_fails_with_channel_not_found() {
        let chat = FakeChat {
            public: vec![("C1", "general")],
            ..FakeChat::default()
        };
        let dir = tmp_dir("smv-wf-notfound");

        let err = archive_channel(&chat, "missing", &opts_in(&dir, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ChannelNotFound(name) if name == "missing"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn archive_resolves_private_only_channels() {
        let chat = FakeChat {
            public: vec![("C1", "general")],
            private: vec![("G7", "priv-team")],
            history: vec![msg("1.0", "secret")],
            ..FakeChat::default()
        };
        let dir = tmp_dir("smv-wf-private");

        let path = archive_channel(&chat, "priv-team", &opts_in(&dir, 0))
            .await
            .unwrap();
        assert!(path.ends_with("archive_channel=priv-team.json"));

        let saved = archive::load(&path).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].text.as_deref(), Some("secret"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn mirror_replays_sorted_with_marker_pairs_and_archives_fetch_order() {
        let chat = FakeChat {
            public: vec![("C1", "general"), ("C2", "random")],
            history: vec![msg("3.0", "three"), msg("1.0", "one"), msg("2.0", "two")],
            ..FakeChat::default()
        };
        let dir = tmp_dir("smv-wf-mirror");

        let delay = Duration::from_millis(20);
        let started = Instant::now();
        let report = mirror(
            &chat,
            "general",
            "random",
            &opts_in(&dir, 20),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            report,
            MirrorReport {
                replayed: 3,
                failed: 0,
                cancelled: false
            }
        );
        // One pause per replayed message.
        assert!(started.elapsed() >= delay * 3);

        // 6 posts: marker + content per message, ascending by ts.
        let posts = chat.posted();
        assert_eq!(posts.len(), 6);
        assert!(posts.iter().all(|(channel, _)| channel == "C2"));
        let texts: Vec<_> = posts.iter().map(|(_, text)| text.as_str()).collect();
        assert!(texts[0].starts_with(":timer_clock: "));
        assert_eq!(texts[1], "one");
        assert!(texts[2].starts_with(":timer_clock: "));
        assert_eq!(texts[3], "two");
        assert!(texts[4].starts_with(":timer_clock: "));
        assert_eq!(texts[5], "three");

        // The archive keeps the unsorted fetch order.
        let saved = archive::load(&dir.join(archive::file_name("general"))).unwrap();
        let order: Vec<_> = saved.iter().map(|m| m.ts.as_str()).collect();
        assert_eq!(order, vec!["3.0", "1.0", "2.0"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn mirror_counts_rejected_posts_and_continues() {
        let chat = FakeChat {
            public: vec![("C1", "general"), ("C2", "random")],
            history: vec![msg("1.0", "one"), msg("2.0", "two"), msg("3.0", "three")],
            reject_texts: HashSet::from(["two".to_string()]),
            ..FakeChat::default()
        };
        let dir = tmp_dir("smv-wf-reject");

        let report = mirror(
            &chat,
            "general",
            "random",
            &opts_in(&dir, 0),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.replayed, 2);
        assert_eq!(report.failed, 1);
        // The rejected message did not stop the loop.
        assert_eq!(chat.posted().len(), 6);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn mirror_with_unknown_destination_posts_nothing() {
        let chat = FakeChat {
            public: vec![("C1", "general")],
            history: vec![msg("1.0", "one")],
            ..FakeChat::default()
        };
        let dir = tmp_dir("smv-wf-nodest");

        let err = mirror(
            &chat,
            "general",
            "missing",
            &opts_in(&dir, 0),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::ChannelNotFound(_)));
        assert!(chat.posted().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn cancelled_mirror_stops_before_replaying() {
        let chat = FakeChat {
            public: vec![("C1", "general"), ("C2", "random")],
            history: vec![msg("1.0", "one"), msg("2.0", "two")],
            ..FakeChat::default()
        };
        let dir = tmp_dir("smv-wf-cancel");

        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = mirror(&chat, "general", "random", &opts_in(&dir, 0), &cancel)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.replayed, 0);
        assert!(chat.posted().is_empty());
        // The archive was still written before the replay loop.
        assert!(dir.join(archive::file_name("general")).exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
