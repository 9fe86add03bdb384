//! Connection lifecycle and cached report fetching.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use secrecy::SecretString;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use adxview_api::models::{ContentHealth, DashboardSummary, PlatformStats, User, VideoHealth};
use adxview_api::transport::{TlsMode, TransportConfig};
use adxview_api::ReportsClient;

use crate::cache::{self, Begin, FetchState, QueryCache};
use crate::config::{AuthCredentials, BackendConfig, TlsVerification};
use crate::error::CoreError;
use crate::query::{ReportKind, ReportQuery};

const DASHBOARD_KEY: &str = "dashboard";

/// Connection lifecycle, observable through [`ReportService::watch_state`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed(String),
}

/// An authenticated session with the backend.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    /// Bearer token in use, so callers can persist it for later sessions.
    pub token: SecretString,
    pub started_at: DateTime<Utc>,
}

/// A fetched report: ordered rows plus the query that produced them.
#[derive(Debug, Clone)]
pub struct ReportCollection<T> {
    pub rows: Vec<T>,
    pub count: usize,
    pub query: ReportQuery,
}

struct ServiceInner {
    config: BackendConfig,
    client: ReportsClient,
    session: RwLock<Option<Session>>,
    state_tx: watch::Sender<ConnectionState>,
    platform_cache: QueryCache<ReportCollection<PlatformStats>>,
    content_cache: QueryCache<ReportCollection<ContentHealth>>,
    video_cache: QueryCache<ReportCollection<VideoHealth>>,
    dashboard_cache: QueryCache<DashboardSummary>,
    /// Queries to re-fetch on each background refresh tick.
    watched: DashMap<String, ReportQuery>,
    refresh_task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

/// Client-side data service for one reporting backend.
///
/// Fetches are deduplicated per query key and results are cached until a
/// refresh supersedes them. While connected, a background task re-fetches
/// every previously requested query on a fixed interval. Cloning is cheap
/// and clones share all state.
#[derive(Clone)]
pub struct ReportService {
    inner: Arc<ServiceInner>,
}

impl ReportService {
    /// Build a service from configuration. Does not touch the network.
    pub fn new(config: BackendConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: match &config.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: config.timeout,
        };
        let client = ReportsClient::new(config.url.clone(), &transport)?;
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Ok(Self {
            inner: Arc::new(ServiceInner {
                config,
                client,
                session: RwLock::new(None),
                state_tx,
                platform_cache: QueryCache::new(),
                content_cache: QueryCache::new(),
                video_cache: QueryCache::new(),
                dashboard_cache: QueryCache::new(),
                watched: DashMap::new(),
                refresh_task: Mutex::new(None),
            }),
        })
    }

    // ── lifecycle ──────────────────────────────────────────────────────

    /// Authenticate against the backend and start the refresh task.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner.state_tx.send_replace(ConnectionState::Connecting);
        let (user, token) = match self.authenticate().await {
            Ok(session) => session,
            Err(e) => {
                self.inner
                    .state_tx
                    .send_replace(ConnectionState::Failed(e.to_string()));
                return Err(e);
            }
        };
        info!(username = %user.username, url = %self.inner.config.url, "connected");
        *write_lock(&self.inner.session) = Some(Session {
            user,
            token,
            started_at: Utc::now(),
        });
        self.inner.state_tx.send_replace(ConnectionState::Connected);
        self.start_refresh_task().await;
        Ok(())
    }

    /// Stop the refresh task, revoke the token and drop all cached data.
    pub async fn disconnect(&self) {
        if let Some((cancel, handle)) = self.inner.refresh_task.lock().await.take() {
            cancel.cancel();
            if let Err(e) = handle.await {
                debug!(error = %e, "refresh task did not shut down cleanly");
            }
        }
        // Only revoke tokens this service obtained itself. A token handed
        // in through configuration stays valid for later sessions.
        let owns_token = matches!(self.inner.config.auth, AuthCredentials::Credentials { .. });
        if owns_token && self.inner.client.has_token() {
            if let Err(e) = self.inner.client.logout().await {
                debug!(error = %e, "logout request failed, discarding token anyway");
            }
        } else {
            self.inner.client.clear_token();
        }
        *write_lock(&self.inner.session) = None;
        self.inner.platform_cache.clear();
        self.inner.content_cache.clear();
        self.inner.video_cache.clear();
        self.inner.dashboard_cache.clear();
        self.inner.watched.clear();
        self.inner
            .state_tx
            .send_replace(ConnectionState::Disconnected);
    }

    async fn authenticate(&self) -> Result<(User, SecretString), CoreError> {
        match &self.inner.config.auth {
            AuthCredentials::Credentials { username, password } => {
                let resp = self.inner.client.login(username, password).await?;
                Ok((resp.user, SecretString::from(resp.access_token)))
            }
            AuthCredentials::Token(token) => {
                self.inner.client.set_token(token.clone());
                let user = self.inner.client.me().await?;
                Ok((user, token.clone()))
            }
        }
    }

    /// The authenticated session, if connected.
    pub fn session(&self) -> Option<Session> {
        read_lock(&self.inner.session).clone()
    }

    /// Subscribe to connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state_tx.borrow().clone()
    }

    fn ensure_connected(&self) -> Result<(), CoreError> {
        if read_lock(&self.inner.session).is_some() {
            Ok(())
        } else {
            Err(CoreError::NotConnected)
        }
    }

    // ── report fetching ────────────────────────────────────────────────

    /// Platform request statistics, served from cache when fresh.
    pub async fn platform_stats(
        &self,
        query: &ReportQuery,
    ) -> Result<Arc<ReportCollection<PlatformStats>>, CoreError> {
        self.fetch_platform(query, false).await
    }

    /// Re-fetch platform statistics, superseding any cached result.
    pub async fn refresh_platform_stats(
        &self,
        query: &ReportQuery,
    ) -> Result<Arc<ReportCollection<PlatformStats>>, CoreError> {
        self.fetch_platform(query, true).await
    }

    /// Content object health, served from cache when fresh.
    pub async fn content_health(
        &self,
        query: &ReportQuery,
    ) -> Result<Arc<ReportCollection<ContentHealth>>, CoreError> {
        self.fetch_content(query, false).await
    }

    pub async fn refresh_content_health(
        &self,
        query: &ReportQuery,
    ) -> Result<Arc<ReportCollection<ContentHealth>>, CoreError> {
        self.fetch_content(query, true).await
    }

    /// Video object health, served from cache when fresh.
    pub async fn video_health(
        &self,
        query: &ReportQuery,
    ) -> Result<Arc<ReportCollection<VideoHealth>>, CoreError> {
        self.fetch_video(query, false).await
    }

    pub async fn refresh_video_health(
        &self,
        query: &ReportQuery,
    ) -> Result<Arc<ReportCollection<VideoHealth>>, CoreError> {
        self.fetch_video(query, true).await
    }

    /// Cross-report dashboard summary.
    pub async fn dashboard(&self, force: bool) -> Result<Arc<DashboardSummary>, CoreError> {
        let client = &self.inner.client;
        self.fetch_with_cache(&self.inner.dashboard_cache, DASHBOARD_KEY, force, || {
            async move { client.get_dashboard().await }
        })
        .await
    }

    async fn fetch_platform(
        &self,
        query: &ReportQuery,
        force: bool,
    ) -> Result<Arc<ReportCollection<PlatformStats>>, CoreError> {
        ensure_kind(query, ReportKind::Platform)?;
        let key = self.watch_query(query);
        let client = &self.inner.client;
        let (start, end) = (query.start, query.end);
        let q = query.clone();
        self.fetch_with_cache(&self.inner.platform_cache, &key, force, move || {
            let q = q.clone();
            async move {
                let resp = client.get_platform_stats(start, end).await?;
                Ok(ReportCollection {
                    rows: resp.data,
                    count: resp.count,
                    query: q,
                })
            }
        })
        .await
    }

    async fn fetch_content(
        &self,
        query: &ReportQuery,
        force: bool,
    ) -> Result<Arc<ReportCollection<ContentHealth>>, CoreError> {
        ensure_kind(query, ReportKind::Content)?;
        let key = self.watch_query(query);
        let client = &self.inner.client;
        let platform = query
            .platform
            .map(|p| p.to_string())
            .unwrap_or_default();
        let (start, end) = (query.start, query.end);
        let q = query.clone();
        self.fetch_with_cache(&self.inner.content_cache, &key, force, move || {
            let (q, platform) = (q.clone(), platform.clone());
            async move {
                let resp = client.get_content_health(&platform, start, end).await?;
                Ok(ReportCollection {
                    rows: resp.data,
                    count: resp.count,
                    query: q,
                })
            }
        })
        .await
    }

    async fn fetch_video(
        &self,
        query: &ReportQuery,
        force: bool,
    ) -> Result<Arc<ReportCollection<VideoHealth>>, CoreError> {
        ensure_kind(query, ReportKind::Video)?;
        let key = self.watch_query(query);
        let client = &self.inner.client;
        let platform = query
            .platform
            .map(|p| p.to_string())
            .unwrap_or_default();
        let (start, end) = (query.start, query.end);
        let q = query.clone();
        self.fetch_with_cache(&self.inner.video_cache, &key, force, move || {
            let (q, platform) = (q.clone(), platform.clone());
            async move {
                let resp = client.get_video_health(&platform, start, end).await?;
                Ok(ReportCollection {
                    rows: resp.data,
                    count: resp.count,
                    query: q,
                })
            }
        })
        .await
    }

    /// Watch a platform-stats cache slot as the background refresh updates
    /// it. Returns `None` until the query has been fetched once.
    pub fn subscribe_platform(
        &self,
        query: &ReportQuery,
    ) -> Option<watch::Receiver<FetchState<ReportCollection<PlatformStats>>>> {
        self.inner.platform_cache.subscribe(&query.cache_key())
    }

    pub fn subscribe_content(
        &self,
        query: &ReportQuery,
    ) -> Option<watch::Receiver<FetchState<ReportCollection<ContentHealth>>>> {
        self.inner.content_cache.subscribe(&query.cache_key())
    }

    pub fn subscribe_video(
        &self,
        query: &ReportQuery,
    ) -> Option<watch::Receiver<FetchState<ReportCollection<VideoHealth>>>> {
        self.inner.video_cache.subscribe(&query.cache_key())
    }

    pub fn subscribe_dashboard(&self) -> Option<watch::Receiver<FetchState<DashboardSummary>>> {
        self.inner.dashboard_cache.subscribe(DASHBOARD_KEY)
    }

    /// Record a query for background refresh and return its cache key.
    fn watch_query(&self, query: &ReportQuery) -> String {
        let key = query.cache_key();
        self.inner.watched.insert(key.clone(), query.clone());
        key
    }

    /// Run one fetch through a cache slot: serve cached data, join an
    /// in-flight fetch, or own the request with one automatic retry on
    /// transient failure.
    async fn fetch_with_cache<T, F, Fut>(
        &self,
        cache: &QueryCache<T>,
        key: &str,
        force: bool,
        op: F,
    ) -> Result<Arc<T>, CoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, adxview_api::Error>>,
    {
        self.ensure_connected()?;
        match cache.begin(key, force) {
            Begin::Cached(value) => Ok(value),
            Begin::Join(rx) => cache::wait(rx).await,
            Begin::Owner(generation) => {
                let result = with_retry(&op).await.map_err(CoreError::from);
                match cache.complete(key, generation, result) {
                    Some(FetchState::Ready { value, .. }) => Ok(value),
                    Some(FetchState::Failed(e)) => Err(e),
                    Some(FetchState::Pending) => Err(CoreError::Internal(
                        "fetch completed into pending state".to_owned(),
                    )),
                    // Superseded by a newer fetch; hand back whatever that
                    // fetch produces instead.
                    None => match cache.subscribe(key) {
                        Some(rx) => cache::wait(rx).await,
                        None => Err(CoreError::Internal("query was invalidated".to_owned())),
                    },
                }
            }
        }
    }

    // ── background refresh ─────────────────────────────────────────────

    async fn start_refresh_task(&self) {
        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs == 0 {
            debug!("background refresh disabled");
            return;
        }
        let cancel = CancellationToken::new();
        let service = self.clone();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            service.run_refresh_loop(interval_secs, task_cancel).await;
        });
        *self.inner.refresh_task.lock().await = Some((cancel, handle));
    }

    async fn run_refresh_loop(self, interval_secs: u64, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; data was just fetched.
        ticker.tick().await;
        debug!(interval_secs, "refresh task started");
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("refresh task stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.refresh_all().await;
                }
            }
        }
    }

    /// Force-refresh every watched query. Individual failures are logged
    /// and leave the previous data in place for waiters that come later.
    async fn refresh_all(&self) {
        let queries: Vec<ReportQuery> =
            self.inner.watched.iter().map(|e| e.value().clone()).collect();
        debug!(count = queries.len(), "refreshing watched queries");
        for query in queries {
            let result = match query.kind {
                ReportKind::Platform => self.fetch_platform(&query, true).await.map(|_| ()),
                ReportKind::Content => self.fetch_content(&query, true).await.map(|_| ()),
                ReportKind::Video => self.fetch_video(&query, true).await.map(|_| ()),
            };
            if let Err(e) = result {
                warn!(key = %query.cache_key(), error = %e, "background refresh failed");
            }
        }
        if !self.inner.dashboard_cache.is_empty() {
            if let Err(e) = self.dashboard(true).await {
                warn!(error = %e, "dashboard refresh failed");
            }
        }
    }
}

fn ensure_kind(query: &ReportQuery, expected: ReportKind) -> Result<(), CoreError> {
    if query.kind == expected {
        Ok(())
    } else {
        Err(CoreError::InvalidQuery {
            reason: format!("expected a {expected} query, got {}", query.kind),
        })
    }
}

/// Retry a request exactly once if the first attempt fails transiently.
async fn with_retry<T, F, Fut>(op: &F) -> Result<T, adxview_api::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, adxview_api::Error>>,
{
    match op().await {
        Err(e) if e.is_transient() => {
            warn!(error = %e, "transient fetch failure, retrying once");
            op().await
        }
        other => other,
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
