//! Poll, deduplicate, order and publish.
//!
//! One run obtains a single token, walks the configured broadcasters in
//! order, merges every clip not seen before into one list sorted by creation
//! time and announces them one at a time. Each announced id is persisted
//! before the next publish starts, so a failed run can simply be repeated.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clip::{AccessToken, Clip};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::publish::Publisher;
use crate::store::DedupStore;
use crate::twitch::{BroadcasterResolver, ClipFetcher, TokenProvider};

/// Outcome of a successful run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// New clips found across all broadcasters
    pub discovered: usize,
    /// Published clip ids, in publish order
    pub published: Vec<String>,
    /// Logins that could not be resolved
    pub unresolved: Vec<String>,
    /// Logins whose clip listing failed
    pub failed_fetches: Vec<String>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.discovered == 0
    }
}

pub struct ClipPipeline {
    config: PipelineConfig,
    tokens: Arc<dyn TokenProvider>,
    resolver: Arc<dyn BroadcasterResolver>,
    fetcher: Arc<dyn ClipFetcher>,
    publisher: Arc<dyn Publisher>,
}

impl ClipPipeline {
    pub fn new(
        config: PipelineConfig,
        tokens: Arc<dyn TokenProvider>,
        resolver: Arc<dyn BroadcasterResolver>,
        fetcher: Arc<dyn ClipFetcher>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            config,
            tokens,
            resolver,
            fetcher,
            publisher,
        }
    }

    /// Run the pipeline once against `store`.
    ///
    /// Broadcaster lookup and clip listing failures are logged and skipped.
    /// Authentication, publish and store failures end the run; ids published
    /// before a failure stay recorded.
    pub async fn run(&self, store: &mut dyn DedupStore) -> Result<RunReport, PipelineError> {
        info!(
            channels = %self.config.broadcasters.join(", "),
            "Starting Twitch clip checker"
        );

        let token = self.tokens.acquire_token().await?;

        let mut report = RunReport::default();
        let mut pending = self.collect_new_clips(&token, &*store, &mut report).await;

        if pending.is_empty() {
            info!("No new clips found from any broadcaster");
            return Ok(report);
        }

        report.discovered = pending.len();
        info!(count = pending.len(), "Total new clips to post");

        // stable, so equal timestamps keep discovery order
        pending.sort_by_key(|clip| clip.created_at);

        self.publish_all(&pending, store, &mut report).await?;

        info!(count = report.published.len(), "Done, all new clips posted");
        Ok(report)
    }

    async fn collect_new_clips(
        &self,
        token: &AccessToken,
        store: &dyn DedupStore,
        report: &mut RunReport,
    ) -> Vec<Clip> {
        let mut pending = Vec::new();
        let mut queued = HashSet::new();

        for login in &self.config.broadcasters {
            info!(broadcaster = %login, "Checking broadcaster");

            let broadcaster = match self.resolver.resolve(token, login).await {
                Ok(broadcaster) => broadcaster,
                Err(e) => {
                    error!(broadcaster = %login, error = %e, "Could not find broadcaster");
                    report.unresolved.push(login.clone());
                    continue;
                }
            };

            let clips = match self.fetcher.fetch_recent(token, &broadcaster).await {
                Ok(clips) => clips,
                Err(e) => {
                    warn!(
                        broadcaster = %broadcaster.display_name,
                        error = %e,
                        "Error fetching clips"
                    );
                    report.failed_fetches.push(login.clone());
                    Vec::new()
                }
            };

            let before = pending.len();
            for clip in clips {
                if store.contains(&clip.id) || !queued.insert(clip.id.clone()) {
                    continue;
                }
                pending.push(clip);
            }

            let found = pending.len() - before;
            if found > 0 {
                info!(broadcaster = %broadcaster.display_name, count = found, "Found new clips");
            }
        }

        pending
    }

    async fn publish_all(
        &self,
        clips: &[Clip],
        store: &mut dyn DedupStore,
        report: &mut RunReport,
    ) -> Result<(), PipelineError> {
        let delay = self.config.publish_delay;

        for (index, clip) in clips.iter().enumerate() {
            if let Err(source) = self.publisher.publish(clip).await {
                error!(
                    publisher = self.publisher.name(),
                    clip_id = %clip.id,
                    broadcaster = %clip.broadcaster_display_name,
                    remaining = clips.len() - index,
                    error = %source,
                    "Error posting clip, stopping"
                );
                return Err(PipelineError::Publish {
                    clip_id: clip.id.clone(),
                    broadcaster: clip.broadcaster_display_name.clone(),
                    source,
                });
            }

            store.add(&clip.id).map_err(|source| PipelineError::Store {
                clip_id: clip.id.clone(),
                source,
            })?;
            report.published.push(clip.id.clone());

            info!(
                broadcaster = %clip.broadcaster_display_name,
                clip_id = %clip.id,
                title = %clip.title,
                "Posted clip"
            );

            if !delay.is_zero() && index + 1 < clips.len() {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use parking_lot::Mutex;
    use reqwest::StatusCode;

    use super::*;
    use crate::clip::Broadcaster;
    use crate::error::{ApiError, AuthError, FetchError, PublishError, ResolutionError};
    use crate::store::MemoryStore;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    fn clip(id: &str, broadcaster: &str, created_at: DateTime<Utc>) -> Clip {
        Clip {
            id: id.to_string(),
            title: format!("title of {id}"),
            url: format!("https://clips.twitch.tv/{id}"),
            creator_name: "viewer".to_string(),
            view_count: 1,
            thumbnail_url: format!("https://clips-media-assets.twitch.tv/{id}.jpg"),
            created_at,
            broadcaster_display_name: broadcaster.to_string(),
        }
    }

    /// Fake Twitch keyed by login. Logins without an entry do not resolve.
    #[derive(Default)]
    struct FakeTwitch {
        auth_fails: bool,
        clips: HashMap<String, Vec<Clip>>,
        failing_fetches: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTwitch {
        fn with(mut self, login: &str, clips: Vec<Clip>) -> Self {
            self.clips.insert(login.to_string(), clips);
            self
        }

        fn failing_fetch(mut self, login: &str) -> Self {
            self.failing_fetches.insert(login.to_string());
            self.clips.entry(login.to_string()).or_default();
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl TokenProvider for FakeTwitch {
        async fn acquire_token(&self) -> Result<AccessToken, AuthError> {
            self.calls.lock().push("token".to_string());
            if self.auth_fails {
                return Err(AuthError(ApiError::InvalidResponse("no token".to_string())));
            }
            Ok(AccessToken::new("token"))
        }
    }

    #[async_trait]
    impl BroadcasterResolver for FakeTwitch {
        async fn resolve(
            &self,
            _token: &AccessToken,
            login: &str,
        ) -> Result<Broadcaster, ResolutionError> {
            self.calls.lock().push(format!("resolve:{login}"));
            if !self.clips.contains_key(login) {
                return Err(ResolutionError::NotFound(login.to_string()));
            }
            Ok(Broadcaster {
                login: login.to_string(),
                id: format!("id-{login}"),
                display_name: login.to_uppercase(),
            })
        }
    }

    #[async_trait]
    impl ClipFetcher for FakeTwitch {
        async fn fetch_recent(
            &self,
            _token: &AccessToken,
            broadcaster: &Broadcaster,
        ) -> Result<Vec<Clip>, FetchError> {
            self.calls.lock().push(format!("fetch:{}", broadcaster.login));
            if self.failing_fetches.contains(&broadcaster.login) {
                return Err(FetchError {
                    broadcaster: broadcaster.display_name.clone(),
                    source: ApiError::InvalidResponse("boom".to_string()),
                });
            }
            Ok(self.clips.get(&broadcaster.login).cloned().unwrap_or_default())
        }
    }

    /// Records published ids, failing on the listed ones.
    #[derive(Default)]
    struct FakePublisher {
        fail_on: HashSet<String>,
        published: Mutex<Vec<String>>,
    }

    impl FakePublisher {
        fn failing_on(id: &str) -> Self {
            Self {
                fail_on: HashSet::from([id.to_string()]),
                ..Default::default()
            }
        }

        fn published(&self) -> Vec<String> {
            self.published.lock().clone()
        }
    }

    #[async_trait]
    impl Publisher for FakePublisher {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn publish(&self, clip: &Clip) -> Result<(), PublishError> {
            if self.fail_on.contains(&clip.id) {
                return Err(PublishError::Rejected {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: String::new(),
                });
            }
            self.published.lock().push(clip.id.clone());
            Ok(())
        }
    }

    fn pipeline(
        broadcasters: &[&str],
        twitch: &Arc<FakeTwitch>,
        publisher: &Arc<FakePublisher>,
    ) -> ClipPipeline {
        let config = PipelineConfig::new(broadcasters.iter().map(|s| s.to_string()).collect())
            .with_publish_delay(Duration::ZERO);
        ClipPipeline::new(
            config,
            twitch.clone(),
            twitch.clone(),
            twitch.clone(),
            publisher.clone(),
        )
    }

    #[tokio::test]
    async fn test_publishes_in_global_chronological_order() {
        let twitch = Arc::new(
            FakeTwitch::default()
                .with("a", vec![clip("c3", "A", at(30)), clip("c1", "A", at(10))])
                .with("b", vec![clip("c2", "B", at(20))]),
        );
        let publisher = Arc::new(FakePublisher::default());
        let mut store = MemoryStore::new();

        let report = pipeline(&["a", "b"], &twitch, &publisher)
            .run(&mut store)
            .await
            .unwrap();

        assert_eq!(publisher.published(), vec!["c1", "c2", "c3"]);
        assert_eq!(report.published, vec!["c1", "c2", "c3"]);
        assert_eq!(report.discovered, 3);
        assert_eq!(store.ids(), ["c1".to_string(), "c2".to_string(), "c3".to_string()]);
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_discovery_order() {
        let twitch = Arc::new(
            FakeTwitch::default()
                .with("a", vec![clip("a2", "A", at(5)), clip("a1", "A", at(5))])
                .with("b", vec![clip("b1", "B", at(5))]),
        );
        let publisher = Arc::new(FakePublisher::default());
        let mut store = MemoryStore::new();

        pipeline(&["b", "a"], &twitch, &publisher)
            .run(&mut store)
            .await
            .unwrap();

        assert_eq!(publisher.published(), vec!["b1", "a2", "a1"]);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let twitch = Arc::new(
            FakeTwitch::default().with("a", vec![clip("c1", "A", at(1)), clip("c2", "A", at(2))]),
        );
        let mut store = MemoryStore::new();

        let first = Arc::new(FakePublisher::default());
        pipeline(&["a"], &twitch, &first).run(&mut store).await.unwrap();
        assert_eq!(first.published().len(), 2);

        let second = Arc::new(FakePublisher::default());
        let report = pipeline(&["a"], &twitch, &second)
            .run(&mut store)
            .await
            .unwrap();
        assert!(second.published().is_empty());
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_known_ids_are_filtered() {
        let twitch = Arc::new(
            FakeTwitch::default().with("a", vec![clip("old", "A", at(1)), clip("new", "A", at(2))]),
        );
        let publisher = Arc::new(FakePublisher::default());
        let mut store: MemoryStore = ["old"].into_iter().collect();

        pipeline(&["a"], &twitch, &publisher)
            .run(&mut store)
            .await
            .unwrap();

        assert_eq!(publisher.published(), vec!["new"]);
    }

    #[tokio::test]
    async fn test_no_new_clips_skips_publisher() {
        let twitch = Arc::new(
            FakeTwitch::default()
                .with("a", vec![clip("c1", "A", at(1))])
                .with("b", vec![clip("c2", "B", at(2))]),
        );
        let publisher = Arc::new(FakePublisher::failing_on("c1"));
        let mut store: MemoryStore = ["c1", "c2"].into_iter().collect();

        let report = pipeline(&["a", "b"], &twitch, &publisher)
            .run(&mut store)
            .await
            .unwrap();

        assert!(report.is_empty());
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_progress_and_retries_rest() {
        let clips = vec![
            clip("c1", "A", at(1)),
            clip("c2", "A", at(2)),
            clip("c3", "A", at(3)),
            clip("c4", "A", at(4)),
        ];
        let twitch = Arc::new(FakeTwitch::default().with("a", clips));
        let mut store = MemoryStore::new();

        let failing = Arc::new(FakePublisher::failing_on("c3"));
        let err = pipeline(&["a"], &twitch, &failing)
            .run(&mut store)
            .await
            .unwrap_err();

        match err {
            PipelineError::Publish { clip_id, broadcaster, .. } => {
                assert_eq!(clip_id, "c3");
                assert_eq!(broadcaster, "A");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.ids(), ["c1".to_string(), "c2".to_string()]);
        assert!(!store.contains("c3"));
        assert!(!store.contains("c4"));

        let retry = Arc::new(FakePublisher::default());
        pipeline(&["a"], &twitch, &retry).run(&mut store).await.unwrap();
        assert_eq!(retry.published(), vec!["c3", "c4"]);
    }

    #[tokio::test]
    async fn test_unresolved_broadcaster_is_skipped() {
        let twitch = Arc::new(FakeTwitch::default().with("b", vec![clip("c1", "B", at(1))]));
        let publisher = Arc::new(FakePublisher::default());
        let mut store = MemoryStore::new();

        let report = pipeline(&["missing", "b"], &twitch, &publisher)
            .run(&mut store)
            .await
            .unwrap();

        assert_eq!(report.unresolved, vec!["missing"]);
        assert_eq!(publisher.published(), vec!["c1"]);
        assert_eq!(
            twitch.calls(),
            vec!["token", "resolve:missing", "resolve:b", "fetch:b"]
        );
    }

    #[tokio::test]
    async fn test_single_unresolved_broadcaster_succeeds_empty() {
        let twitch = Arc::new(FakeTwitch::default());
        let publisher = Arc::new(FakePublisher::default());
        let mut store = MemoryStore::new();

        let report = pipeline(&["ghost"], &twitch, &publisher)
            .run(&mut store)
            .await
            .unwrap();

        assert!(report.is_empty());
        assert_eq!(report.unresolved, vec!["ghost"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_contributes_nothing() {
        let twitch = Arc::new(
            FakeTwitch::default()
                .failing_fetch("a")
                .with("b", vec![clip("c1", "B", at(1))]),
        );
        let publisher = Arc::new(FakePublisher::default());
        let mut store = MemoryStore::new();

        let report = pipeline(&["a", "b"], &twitch, &publisher)
            .run(&mut store)
            .await
            .unwrap();

        assert_eq!(report.failed_fetches, vec!["a"]);
        assert_eq!(publisher.published(), vec!["c1"]);
    }

    #[tokio::test]
    async fn test_auth_failure_stops_before_any_lookup() {
        let twitch = Arc::new(FakeTwitch {
            auth_fails: true,
            ..FakeTwitch::default().with("a", vec![clip("c1", "A", at(1))])
        });
        let publisher = Arc::new(FakePublisher::default());
        let mut store = MemoryStore::new();

        let err = pipeline(&["a"], &twitch, &publisher)
            .run(&mut store)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Auth(_)));
        assert_eq!(twitch.calls(), vec!["token"]);
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_broadcaster_publishes_once() {
        let twitch = Arc::new(FakeTwitch::default().with("a", vec![clip("c1", "A", at(1))]));
        let publisher = Arc::new(FakePublisher::default());
        let mut store = MemoryStore::new();

        pipeline(&["a", "a"], &twitch, &publisher)
            .run(&mut store)
            .await
            .unwrap();

        assert_eq!(publisher.published(), vec!["c1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_delay_between_clips_only() {
        let twitch = Arc::new(
            FakeTwitch::default().with("a", vec![clip("c1", "A", at(1)), clip("c2", "A", at(2))]),
        );
        let publisher = Arc::new(FakePublisher::default());
        let mut store = MemoryStore::new();
        let config = PipelineConfig::new(vec!["a".to_string()]);
        let pipeline = ClipPipeline::new(
            config,
            twitch.clone(),
            twitch.clone(),
            twitch.clone(),
            publisher.clone(),
        );

        let started = tokio::time::Instant::now();
        pipeline.run(&mut store).await.unwrap();

        // one pause between two clips, none after the last
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(4));
        assert_eq!(publisher.published(), vec!["c1", "c2"]);
    }
}
