//! Character avatars: fetched once per URL and decoded off the UI thread.
//!
//! Decoded pixels live in an [`AvatarCache`] shared with the window. Each
//! avatar that lands bumps the state's avatar revision, so the subscription
//! thread re-renders and picks it up.

use crate::metrics::QueryMetrics;
use crate::models::QueryError;
use crate::state::StateManager;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

/// Avatars larger than this (in either dimension) are scaled down on decode.
pub const AVATAR_SIZE: u32 = 128;

/// Fetches the raw bytes behind an avatar URL.
pub trait AvatarSource: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, QueryError>> + Send;
}

/// Decoded RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarPixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<[u8]>,
}

/// Decode a JPEG or PNG avatar into RGBA8, downscaled to fit [`AVATAR_SIZE`].
pub fn decode_avatar(bytes: &[u8]) -> Result<AvatarPixels, QueryError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| QueryError::Decode(format!("avatar image: {e}")))?;

    let decoded = if decoded.width() > AVATAR_SIZE || decoded.height() > AVATAR_SIZE {
        decoded.thumbnail(AVATAR_SIZE, AVATAR_SIZE)
    } else {
        decoded
    };

    let rgba = decoded.to_rgba8();
    Ok(AvatarPixels {
        width: rgba.width(),
        height: rgba.height(),
        rgba: Arc::from(rgba.into_raw()),
    })
}

#[derive(Debug, Clone)]
enum AvatarSlot {
    Loading,
    Ready(AvatarPixels),
    Failed,
}

/// Avatar pixels by URL. A URL is fetched at most once per process; failures
/// are remembered and keep showing the placeholder.
#[derive(Debug, Default)]
pub struct AvatarCache {
    slots: Mutex<HashMap<String, AvatarSlot>>,
}

impl AvatarCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, AvatarSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `url` as loading; `false` if it was already seen
    fn claim(&self, url: &str) -> bool {
        let mut slots = self.lock();
        if slots.contains_key(url) {
            return false;
        }
        slots.insert(url.to_string(), AvatarSlot::Loading);
        true
    }

    pub(crate) fn store(&self, url: &str, pixels: AvatarPixels) {
        self.lock().insert(url.to_string(), AvatarSlot::Ready(pixels));
    }

    fn mark_failed(&self, url: &str) {
        self.lock().insert(url.to_string(), AvatarSlot::Failed);
    }

    /// Pixels for `url` once decoded
    pub fn get(&self, url: &str) -> Option<AvatarPixels> {
        match self.lock().get(url) {
            Some(AvatarSlot::Ready(pixels)) => Some(pixels.clone()),
            Some(AvatarSlot::Loading | AvatarSlot::Failed) | None => None,
        }
    }

    pub fn is_loading(&self, url: &str) -> bool {
        matches!(self.lock().get(url), Some(AvatarSlot::Loading))
    }

    pub fn has_failed(&self, url: &str) -> bool {
        matches!(self.lock().get(url), Some(AvatarSlot::Failed))
    }
}

/// Starts avatar fetches on the runtime and fills the [`AvatarCache`].
pub struct AvatarLoader<S: AvatarSource> {
    source: Arc<S>,
    cache: Arc<AvatarCache>,
    state: Arc<StateManager>,
    runtime: tokio::runtime::Handle,
    metrics: Arc<QueryMetrics>,
}

impl<S: AvatarSource> AvatarLoader<S> {
    pub fn new(
        source: Arc<S>,
        state: Arc<StateManager>,
        runtime: tokio::runtime::Handle,
        metrics: Arc<QueryMetrics>,
    ) -> Self {
        Self {
            source,
            cache: Arc::new(AvatarCache::new()),
            state,
            runtime,
            metrics,
        }
    }

    pub fn cache(&self) -> &Arc<AvatarCache> {
        &self.cache
    }

    /// Fetch every URL not seen before. Empty URLs are skipped.
    pub fn request<'a, I>(&self, urls: I) -> Vec<JoinHandle<()>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        urls.into_iter()
            .filter(|url| !url.is_empty() && self.cache.claim(url))
            .map(|url| self.spawn_fetch(url.to_string()))
            .collect()
    }

    fn spawn_fetch(&self, url: String) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let cache = Arc::clone(&self.cache);
        let state = Arc::clone(&self.state);
        let metrics = Arc::clone(&self.metrics);

        self.runtime.spawn(async move {
            let result = match source.fetch(&url).await {
                Ok(bytes) => tokio::task::spawn_blocking(move || decode_avatar(&bytes))
                    .await
                    .unwrap_or_else(|e| Err(QueryError::Decode(e.to_string()))),
                Err(e) => Err(e),
            };

            match result {
                Ok(pixels) => {
                    tracing::debug!("Avatar {} ready ({}x{})", url, pixels.width, pixels.height);
                    cache.store(&url, pixels);
                    metrics.record_avatar_loaded();
                    state.avatar_ready();
                }
                Err(e) => {
                    tracing::warn!("Avatar {} unavailable: {}", url, e);
                    cache.mark_failed(&url);
                    metrics.record_avatar_failed();
                }
            }
        })
    }
}
