//! The service root: address in, embed document out.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info_span, warn, Instrument};

use motd_embed_adapters::{OriginError, StatusFetcher};
use motd_embed_types::{MotdInput, ServerAddress, ServerStatus};

use crate::cache::{CacheStore, FetchCoordinator, ResolveError};
use crate::error::ServiceError;
use crate::format::TextRun;
use crate::motd::{classify, normalize};
use crate::render::{render_runs, EmbedPage};

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);
pub const DEFAULT_ORIGIN_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_STATIC_BASE_URL: &str = "/static";

type StatusCoordinator = FetchCoordinator<ServerAddress, ServerStatus, OriginError>;

/// Renders embeds for Minecraft servers, caching their status.
///
/// Each service owns its own cache; build one per process (or per test).
///
/// ```no_run
/// # #[cfg(feature = "java")]
/// # async fn run() -> Result<(), motd_embed::ServiceError> {
/// use std::sync::Arc;
/// use motd_embed::adapters::java::JavaStatusClient;
/// use motd_embed::MotdService;
///
/// let service = MotdService::builder(Arc::new(JavaStatusClient::new())).build();
/// let html = service.render("play.example.com").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MotdService {
    fetcher: Arc<dyn StatusFetcher>,
    coordinator: StatusCoordinator,
    ttl: Duration,
    origin_timeout: Duration,
    static_base_url: String,
}

impl MotdService {
    pub fn builder(fetcher: Arc<dyn StatusFetcher>) -> MotdServiceBuilder {
        MotdServiceBuilder {
            fetcher,
            ttl: DEFAULT_TTL,
            origin_timeout: DEFAULT_ORIGIN_TIMEOUT,
            max_entries: None,
            static_base_url: DEFAULT_STATIC_BASE_URL.to_string(),
        }
    }

    /// Render the embed document for `address` (`host[:port]`).
    ///
    /// An unreachable server still yields a document, rendered from an
    /// offline status.
    pub async fn render(&self, address: &str) -> Result<String, ServiceError> {
        let address: ServerAddress = address.parse()?;
        let span = info_span!("render", %address);

        async {
            let status = self.status(&address).await?;
            let motd_html = render_motd(&status.motd);
            let server_name = address.to_string();

            Ok(EmbedPage {
                server_name: &server_name,
                motd_html: &motd_html,
                favicon: status.favicon.as_deref(),
                static_base_url: &self.static_base_url,
            }
            .render())
        }
        .instrument(span)
        .await
    }

    /// The status of `address`, from the cache or a fresh query.
    ///
    /// Origin failures produce [`ServerStatus::offline`] and are not cached.
    pub async fn status(&self, address: &ServerAddress) -> Result<ServerStatus, ServiceError> {
        let fetcher = self.fetcher.clone();
        let timeout = self.origin_timeout;
        let fetch = move |key: ServerAddress| async move {
            match tokio::time::timeout(timeout, fetcher.fetch(&key)).await {
                Ok(result) => result,
                Err(_) => Err(OriginError::Timeout),
            }
        };

        match self.coordinator.resolve(address.clone(), self.ttl, fetch).await {
            Ok(status) => Ok(status),
            Err(ResolveError::Fetch(err)) => {
                warn!(%address, error = %err, "server unreachable, rendering offline status");
                Ok(ServerStatus::offline())
            }
            Err(err @ ResolveError::Abandoned) => {
                error!(%address, error = %err, "status lookup failed");
                Err(ServiceError::Internal(err.to_string()))
            }
        }
    }

    pub fn cache(&self) -> &CacheStore<ServerAddress, ServerStatus> {
        self.coordinator.store()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Builder for [`MotdService`].
#[derive(Debug)]
pub struct MotdServiceBuilder {
    fetcher: Arc<dyn StatusFetcher>,
    ttl: Duration,
    origin_timeout: Duration,
    max_entries: Option<usize>,
    static_base_url: String,
}

impl MotdServiceBuilder {
    /// How long a fetched status is served from the cache.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Budget for a single origin query.
    pub fn origin_timeout(mut self, timeout: Duration) -> Self {
        self.origin_timeout = timeout;
        self
    }

    /// Bound the number of cached servers; `None` leaves it unbounded.
    pub fn max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn static_base_url(mut self, url: impl Into<String>) -> Self {
        self.static_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn build(self) -> MotdService {
        let store = match self.max_entries {
            Some(max) => CacheStore::with_max_entries(max),
            None => CacheStore::new(),
        };
        MotdService {
            fetcher: self.fetcher,
            coordinator: FetchCoordinator::new(Arc::new(store)),
            ttl: self.ttl,
            origin_timeout: self.origin_timeout,
            static_base_url: self.static_base_url,
        }
    }
}

/// Render a MOTD of any shape to span markup.
///
/// A MOTD that matches no known shape is shown as its raw text, unstyled.
pub fn render_motd(motd: &MotdInput) -> String {
    match classify(motd) {
        Ok(component) => render_runs(&normalize(&component)),
        Err(err) => {
            debug!(error = %err, "unrecognized MOTD shape, rendering raw text");
            render_runs(&[TextRun::plain(motd.to_string())])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use motd_embed_types::Players;
    use serde_json::json;

    #[derive(Debug, Clone)]
    enum Reply {
        Online(ServerStatus),
        Fail(OriginError),
        Hang,
    }

    #[derive(Debug)]
    struct FakeFetcher {
        reply: Reply,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(reply: Reply) -> Arc<Self> {
            Self::delayed(reply, Duration::ZERO)
        }

        fn delayed(reply: Reply, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply,
                delay,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusFetcher for FakeFetcher {
        async fn fetch(&self, _address: &ServerAddress) -> Result<ServerStatus, OriginError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Reply::Online(status) => Ok(status.clone()),
                Reply::Fail(err) => Err(err.clone()),
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    fn online(motd: impl Into<MotdInput>) -> Reply {
        let mut status = ServerStatus::online(motd);
        status.players = Players { online: 3, max: 20 };
        Reply::Online(status)
    }

    fn service(fetcher: Arc<FakeFetcher>) -> MotdService {
        MotdService::builder(fetcher).build()
    }

    #[tokio::test]
    async fn renders_styled_motd_into_document() {
        let fetcher = FakeFetcher::new(online("§a§lHello§r World"));
        let html = service(fetcher).render("Play.Example.com").await.unwrap();

        assert!(html.contains("<title>play.example.com - MOTD</title>"));
        assert!(html.contains(concat!(
            r#"<span class="mcformat mcformat-green mcformat-bold">Hello</span>"#,
            r#"<span class="mcformat"> World</span>"#
        )));
    }

    #[tokio::test]
    async fn non_default_port_is_part_of_the_name() {
        let fetcher = FakeFetcher::new(online("hi"));
        let html = service(fetcher).render("mc.example.com:25570").await.unwrap();
        assert!(html.contains(r#"<div class="name">mc.example.com:25570</div>"#));
    }

    #[tokio::test]
    async fn invalid_address_is_rejected_without_fetching() {
        let fetcher = FakeFetcher::new(online("hi"));
        let service = service(fetcher.clone());

        for address in ["", "host:0", "host:70000", "host:abc", "a b"] {
            let err = service.render(address).await.unwrap_err();
            assert!(err.is_client_error(), "{address:?} should be rejected");
        }
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn unreachable_server_renders_offline() {
        let fetcher = FakeFetcher::new(Reply::Fail(OriginError::Unavailable("refused".into())));
        let service = service(fetcher);

        let status = service.status(&"down.example".parse().unwrap()).await.unwrap();
        assert_eq!(status, ServerStatus::offline());

        let html = service.render("down.example").await.unwrap();
        assert!(html.contains(r#"<span class="mcformat">Server Offline</span>"#));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_origin_times_out_to_offline() {
        let fetcher = FakeFetcher::new(Reply::Hang);
        let service = MotdService::builder(fetcher.clone())
            .origin_timeout(Duration::from_secs(5))
            .build();

        let status = service.status(&"slow.example".parse().unwrap()).await.unwrap();
        assert!(!status.online);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let fetcher = FakeFetcher::new(Reply::Fail(OriginError::Timeout));
        let service = service(fetcher.clone());

        service.render("down.example").await.unwrap();
        service.render("down.example").await.unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn repeated_renders_hit_the_cache() {
        let fetcher = FakeFetcher::new(online("cached"));
        let service = service(fetcher.clone());

        let first = service.render("play.example.com").await.unwrap();
        let second = service.render("PLAY.example.com:25565").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_renders_share_one_fetch() {
        let fetcher = FakeFetcher::delayed(online("busy"), Duration::from_millis(100));
        let service = service(fetcher.clone());

        let (a, b) = tokio::join!(
            service.render("play.example.com"),
            service.render("play.example.com")
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_status_is_fetched_again() {
        let fetcher = FakeFetcher::new(online("hi"));
        let service = MotdService::builder(fetcher.clone())
            .ttl(Duration::from_secs(30))
            .build();

        service.render("play.example.com").await.unwrap();
        tokio::time::advance(Duration::from_secs(31)).await;
        service.render("play.example.com").await.unwrap();
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn static_base_url_is_used_for_assets() {
        let fetcher = FakeFetcher::new(online("hi"));
        let html = MotdService::builder(fetcher)
            .static_base_url("https://cdn.example/assets/")
            .build()
            .render("play.example.com")
            .await
            .unwrap();
        assert!(html.contains(r#"src="https://cdn.example/assets/unknown_server.jpg""#));
    }

    #[test]
    fn json_motd_is_rendered() {
        let motd = MotdInput::from_json(json!({
            "text": "§6Gold ",
            "extra": ["§lbold", {"text": "plain"}]
        }));
        assert_eq!(
            render_motd(&motd),
            concat!(
                r#"<span class="mcformat mcformat-gold">Gold </span>"#,
                r#"<span class="mcformat mcformat-gold mcformat-bold">bold</span>"#,
                r#"<span class="mcformat mcformat-gold">plain</span>"#
            )
        );
    }

    #[test]
    fn unknown_child_component_keeps_the_rest_styled() {
        let motd = MotdInput::from_json(json!({
            "text": "§aWelcome",
            "extra": [{"text": " to"}, {"translate": "x"}]
        }));
        assert_eq!(
            render_motd(&motd),
            concat!(
                r#"<span class="mcformat mcformat-green">Welcome</span>"#,
                r#"<span class="mcformat mcformat-green"> to</span>"#
            )
        );
    }

    #[test]
    fn malformed_motd_falls_back_to_raw_text() {
        let motd = MotdInput::Attributes(json!({"color": "red"}));
        assert_eq!(
            render_motd(&motd),
            r#"<span class="mcformat">{&quot;color&quot;:&quot;red&quot;}</span>"#
        );
    }
}
