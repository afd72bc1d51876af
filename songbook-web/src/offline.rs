//! Offline shell cache manager
//!
//! The PWA shell's caching lifecycle expressed as a message-handling
//! component: three message types (install, fetch, activate) over named
//! response caches and an abstract fetch backend. The served `/sw.js` asset
//! runs the same recipe inside real browsers; this module is the tested form
//! of that behavior.
//!
//! Policy: network-first for GET, fall back to the named cache, then to the
//! cached offline page for HTML requests, then to a synthetic 503. Only the
//! fixed install-time resource list is ever cached; successful network
//! responses are not written back. Stale cache versions are dropped wholesale
//! at activation by cache name.

use axum::http::Method;
use std::collections::HashMap;

/// Current shell cache version. Bump the suffix on deployments that change
/// any precached resource; activation then drops the previous cache.
pub const SHELL_CACHE_NAME: &str = "songbook-shell-v1";

/// Resources fetched into the cache at install time
pub const PRECACHE_URLS: &[&str] = &["/", "/logo.svg", "/manifest.json", "/offline.html"];

/// Served for failed HTML navigations with no cached match
pub const OFFLINE_FALLBACK_URL: &str = "/offline.html";

/// A request as seen by the cache manager: method, URL path, and the
/// `Accept` header (the only header the fallback policy consults)
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub accept: Option<String>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            accept: None,
        }
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    fn accepts_html(&self) -> bool {
        self.accept
            .as_deref()
            .is_some_and(|a| a.contains("text/html"))
    }
}

/// A response in storable form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl StoredResponse {
    pub fn ok(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// Synthetic response for a failed fetch with no cache or fallback match
    pub fn service_unavailable() -> Self {
        Self {
            status: 503,
            content_type: "text/plain".to_string(),
            body: b"Network error occurred".to_vec(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract network access. `Err` means the request never produced a
/// response (network failure); HTTP error statuses come back as `Ok`.
pub trait FetchBackend {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl std::future::Future<Output = anyhow::Result<StoredResponse>> + Send;
}

/// One named cache: URL -> stored response
#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: HashMap<String, StoredResponse>,
}

impl Cache {
    pub fn put(&mut self, url: impl Into<String>, response: StoredResponse) {
        self.entries.insert(url.into(), response);
    }

    pub fn lookup(&self, url: &str) -> Option<&StoredResponse> {
        self.entries.get(url)
    }

    pub fn urls(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

/// All named caches. Callers own an instance; there is no global state.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    caches: HashMap<String, Cache>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a named cache, creating it if missing
    pub fn open(&mut self, name: &str) -> &mut Cache {
        self.caches.entry(name.to_string()).or_default()
    }

    pub fn get(&self, name: &str) -> Option<&Cache> {
        self.caches.get(name)
    }

    /// Names of all existing caches
    pub fn keys(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    pub fn delete(&mut self, name: &str) -> bool {
        self.caches.remove(name).is_some()
    }

    /// Look up a URL in a named cache
    pub fn lookup(&self, cache_name: &str, url: &str) -> Option<&StoredResponse> {
        self.caches.get(cache_name)?.lookup(url)
    }
}

/// The three lifecycle messages driven by the hosting environment
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Install,
    Fetch(FetchRequest),
    Activate,
}

/// Shell cache lifecycle handler
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_name: String,
    precache_urls: Vec<String>,
    offline_fallback_url: String,
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(
            SHELL_CACHE_NAME,
            PRECACHE_URLS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl CacheManager {
    pub fn new(cache_name: impl Into<String>, precache_urls: Vec<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            precache_urls,
            offline_fallback_url: OFFLINE_FALLBACK_URL.to_string(),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Dispatch one lifecycle message. Only fetch produces a response.
    pub async fn handle_event<B: FetchBackend>(
        &self,
        storage: &mut CacheStorage,
        backend: &B,
        event: LifecycleEvent,
    ) -> anyhow::Result<Option<StoredResponse>> {
        match event {
            LifecycleEvent::Install => {
                self.install(storage, backend).await?;
                Ok(None)
            }
            LifecycleEvent::Fetch(request) => {
                Ok(Some(self.handle_fetch(storage, backend, &request).await?))
            }
            LifecycleEvent::Activate => {
                self.activate(storage);
                Ok(None)
            }
        }
    }

    /// Install: fetch every listed resource into the named cache. Any
    /// failure propagates and aborts the install for this version.
    pub async fn install<B: FetchBackend>(
        &self,
        storage: &mut CacheStorage,
        backend: &B,
    ) -> anyhow::Result<()> {
        for url in &self.precache_urls {
            let response = backend.fetch(&FetchRequest::get(url)).await?;
            anyhow::ensure!(
                response.is_success(),
                "precache fetch for {} returned status {}",
                url,
                response.status
            );
            storage.open(&self.cache_name).put(url, response);
        }
        Ok(())
    }

    /// Fetch interception. Non-GET requests pass through untouched; GET is
    /// network-first with cache / offline-page / 503 fallbacks.
    pub async fn handle_fetch<B: FetchBackend>(
        &self,
        storage: &CacheStorage,
        backend: &B,
        request: &FetchRequest,
    ) -> anyhow::Result<StoredResponse> {
        if request.method != Method::GET {
            return backend.fetch(request).await;
        }

        match backend.fetch(request).await {
            // Successful network responses are used as-is, never cached
            Ok(response) => Ok(response),
            Err(_) => {
                if let Some(cached) = storage.lookup(&self.cache_name, &request.url) {
                    return Ok(cached.clone());
                }
                if request.accepts_html() {
                    if let Some(page) =
                        storage.lookup(&self.cache_name, &self.offline_fallback_url)
                    {
                        return Ok(page.clone());
                    }
                }
                Ok(StoredResponse::service_unavailable())
            }
        }
    }

    /// Activate: drop every cache whose name is not the current version
    pub fn activate(&self, storage: &mut CacheStorage) {
        let stale: Vec<String> = storage
            .keys()
            .into_iter()
            .filter(|name| *name != self.cache_name)
            .collect();
        for name in stale {
            storage.delete(&name);
        }
    }
}

/// Production backend: fetches over HTTP relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpFetchBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetchBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl FetchBackend for HttpFetchBackend {
    async fn fetch(&self, request: &FetchRequest) -> anyhow::Result<StoredResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())?;
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), request.url);

        let mut builder = self.client.request(method, &url);
        if let Some(accept) = &request.accept {
            builder = builder.header(reqwest::header::ACCEPT, accept);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = response.bytes().await?.to_vec();

        Ok(StoredResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scriptable backend: per-URL responses, an offline switch, and a log
    /// of every request that reached the network
    struct MockBackend {
        responses: HashMap<String, StoredResponse>,
        online: bool,
        log: Mutex<Vec<(Method, String)>>,
    }

    impl MockBackend {
        fn online() -> Self {
            let mut responses = HashMap::new();
            for url in PRECACHE_URLS {
                responses.insert(
                    url.to_string(),
                    StoredResponse::ok("text/html", format!("body of {}", url).into_bytes()),
                );
            }
            Self {
                responses,
                online: true,
                log: Mutex::new(Vec::new()),
            }
        }

        fn offline() -> Self {
            Self {
                responses: HashMap::new(),
                online: false,
                log: Mutex::new(Vec::new()),
            }
        }

        fn without(mut self, url: &str) -> Self {
            self.responses.remove(url);
            self
        }

        fn requests(&self) -> Vec<(Method, String)> {
            self.log.lock().unwrap().clone()
        }
    }

    impl FetchBackend for MockBackend {
        async fn fetch(&self, request: &FetchRequest) -> anyhow::Result<StoredResponse> {
            self.log
                .lock()
                .unwrap()
                .push((request.method.clone(), request.url.clone()));
            if !self.online {
                anyhow::bail!("network unavailable");
            }
            self.responses
                .get(&request.url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("connection refused for {}", request.url))
        }
    }

    async fn installed() -> (CacheManager, CacheStorage) {
        let manager = CacheManager::default();
        let mut storage = CacheStorage::new();
        manager
            .install(&mut storage, &MockBackend::online())
            .await
            .expect("install should succeed");
        (manager, storage)
    }

    #[tokio::test]
    async fn test_install_populates_every_listed_url() {
        let (manager, storage) = installed().await;

        for url in PRECACHE_URLS {
            let cached = storage.lookup(manager.cache_name(), url);
            assert!(cached.is_some(), "{} should be cached after install", url);
        }
    }

    #[tokio::test]
    async fn test_install_fails_when_any_resource_is_unreachable() {
        let manager = CacheManager::default();
        let mut storage = CacheStorage::new();
        let backend = MockBackend::online().without("/logo.svg");

        let result = manager.install(&mut storage, &backend).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_install_fails_on_http_error_status() {
        let manager = CacheManager::default();
        let mut storage = CacheStorage::new();
        let mut backend = MockBackend::online();
        backend.responses.insert(
            "/logo.svg".to_string(),
            StoredResponse {
                status: 404,
                content_type: "text/plain".to_string(),
                body: b"missing".to_vec(),
            },
        );

        let result = manager.install(&mut storage, &backend).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_online_uses_network_and_does_not_cache() {
        let (manager, storage) = installed().await;
        let mut backend = MockBackend::online();
        backend.responses.insert(
            "/api/songs".to_string(),
            StoredResponse::ok("application/json", b"[]".to_vec()),
        );

        let response = manager
            .handle_fetch(&storage, &backend, &FetchRequest::get("/api/songs"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"[]");

        // Only the install-time list lives in the cache
        assert!(storage.lookup(manager.cache_name(), "/api/songs").is_none());
    }

    #[tokio::test]
    async fn test_fetch_offline_serves_cached_response() {
        let (manager, storage) = installed().await;
        let backend = MockBackend::offline();

        let response = manager
            .handle_fetch(&storage, &backend, &FetchRequest::get("/logo.svg"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"body of /logo.svg");
    }

    #[tokio::test]
    async fn test_fetch_offline_uncached_html_gets_offline_page() {
        let (manager, storage) = installed().await;
        let backend = MockBackend::offline();

        let request = FetchRequest::get("/songs/some-page")
            .with_accept("text/html,application/xhtml+xml");
        let response = manager
            .handle_fetch(&storage, &backend, &request)
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"body of /offline.html");
    }

    #[tokio::test]
    async fn test_fetch_offline_uncached_non_html_gets_503() {
        let (manager, storage) = installed().await;
        let backend = MockBackend::offline();

        let request = FetchRequest::get("/api/songs").with_accept("application/json");
        let response = manager
            .handle_fetch(&storage, &backend, &request)
            .await
            .unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(response.body, b"Network error occurred");
    }

    #[tokio::test]
    async fn test_non_get_passes_through_untouched() {
        let (manager, storage) = installed().await;
        let backend = MockBackend::offline();

        let request = FetchRequest {
            method: Method::POST,
            url: "/offline.html".to_string(),
            accept: Some("text/html".to_string()),
        };
        // Cached under that URL, but POST must never be substituted
        let result = manager.handle_fetch(&storage, &backend, &request).await;
        assert!(result.is_err());
        assert_eq!(
            backend.requests(),
            vec![(Method::POST, "/offline.html".to_string())]
        );
    }

    #[tokio::test]
    async fn test_activate_drops_stale_caches_keeps_current() {
        let (_, mut storage) = installed().await;
        storage
            .open("songbook-shell-v0")
            .put("/", StoredResponse::ok("text/html", b"old".to_vec()));

        let next = CacheManager::new(
            "songbook-shell-v2",
            PRECACHE_URLS.iter().map(|s| s.to_string()).collect(),
        );
        next.install(&mut storage, &MockBackend::online())
            .await
            .unwrap();
        next.activate(&mut storage);

        let mut names = storage.keys();
        names.sort();
        assert_eq!(names, vec!["songbook-shell-v2"]);
        assert!(storage.lookup("songbook-shell-v2", "/").is_some());
    }

    #[tokio::test]
    async fn test_lifecycle_event_dispatch() {
        let manager = CacheManager::default();
        let mut storage = CacheStorage::new();
        let backend = MockBackend::online();

        let installed = manager
            .handle_event(&mut storage, &backend, LifecycleEvent::Install)
            .await
            .unwrap();
        assert!(installed.is_none());

        let fetched = manager
            .handle_event(
                &mut storage,
                &backend,
                LifecycleEvent::Fetch(FetchRequest::get("/")),
            )
            .await
            .unwrap();
        assert_eq!(fetched.map(|r| r.status), Some(200));

        let activated = manager
            .handle_event(&mut storage, &backend, LifecycleEvent::Activate)
            .await
            .unwrap();
        assert!(activated.is_none());
        assert_eq!(storage.keys(), vec![SHELL_CACHE_NAME.to_string()]);
    }
}
