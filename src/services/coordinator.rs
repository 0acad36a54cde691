use super::cache::ResponseCache;
use super::graphql::{GraphQlClient, GraphQlTransport};
use super::screens::{CharacterRefetch, Navigator};
use crate::metrics::QueryMetrics;
use crate::models::{
    CharacterLookup, CharacterPage, EpisodePage, FetchPolicy, NavigationError, NavigationParam,
    RouteRequest, Tab,
};
use crate::state::StateManager;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::task::{AbortHandle, JoinHandle};

/// Screens that own a query slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Screen {
    CharacterList,
    CharacterDetail,
    EpisodeList,
}

/// Runs the screens' queries and applies their results to the [`StateManager`].
///
/// Every fetch follows the same shape:
/// 1. `begin_*` on the state manager hands out a [`QueryTicket`](crate::state::QueryTicket)
///    and moves the slot into `Loading` (with a cached payload under cache-and-network)
/// 2. the query runs on the tokio runtime
/// 3. `complete_*` applies the result only if the ticket is still current
///
/// Starting a new attempt for a screen also aborts that screen's previous
/// in-flight task, so superseded requests stop early. The ticket check stays
/// authoritative for completions that race the abort.
///
/// The coordinator also acts as the navigation shell ([`Navigator`]).
pub struct QueryCoordinator<T: GraphQlTransport> {
    state: Arc<StateManager>,
    client: Arc<GraphQlClient<T>>,
    policy: FetchPolicy,
    runtime: tokio::runtime::Handle,
    metrics: Arc<QueryMetrics>,

    character_pages: Arc<ResponseCache<Option<String>, CharacterPage>>,
    character_lookups: Arc<ResponseCache<NavigationParam, CharacterLookup>>,
    episode_pages: Arc<ResponseCache<(), EpisodePage>>,

    in_flight: Mutex<HashMap<Screen, AbortHandle>>,
}

impl<T: GraphQlTransport> QueryCoordinator<T> {
    pub fn new(
        state: Arc<StateManager>,
        client: Arc<GraphQlClient<T>>,
        policy: FetchPolicy,
        runtime: tokio::runtime::Handle,
        metrics: Arc<QueryMetrics>,
    ) -> Self {
        Self {
            state,
            client,
            policy,
            runtime,
            metrics,
            character_pages: Arc::new(ResponseCache::new()),
            character_lookups: Arc::new(ResponseCache::new()),
            episode_pages: Arc::new(ResponseCache::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn state(&self) -> &Arc<StateManager> {
        &self.state
    }

    pub fn metrics(&self) -> &Arc<QueryMetrics> {
        &self.metrics
    }

    /// Initial fetch of the character list (no filter)
    pub fn mount(&self) -> JoinHandle<()> {
        tracing::info!("Mounting character list");
        self.spawn_character_search()
    }

    /// Look up a cached payload when the policy allows it
    fn cached<K, V>(&self, cache: &ResponseCache<K, V>, key: &K) -> Option<V>
    where
        K: Eq + std::hash::Hash,
        V: Clone,
    {
        if self.policy != FetchPolicy::CacheAndNetwork {
            return None;
        }
        let hit = cache.get(key);
        if hit.is_some() {
            self.metrics.record_cache_hit();
        }
        hit
    }

    /// Spawn `fut` for `screen`, aborting whatever that screen had in flight
    fn spawn_tracked<F>(&self, screen: Screen, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.metrics.record_query_started();
        let handle = self.runtime.spawn(fut);

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = in_flight.insert(screen, handle.abort_handle()) {
            if !previous.is_finished() {
                tracing::debug!("Aborting superseded {:?} query", screen);
                previous.abort();
                self.metrics.record_superseded_aborted();
            }
        }

        handle
    }

    /// Fetch the character list for the current confirmed term
    pub fn spawn_character_search(&self) -> JoinHandle<()> {
        let ticket = self
            .state
            .begin_character_search(|term| self.cached(&self.character_pages, &term.map(str::to_owned)));

        tracing::info!(
            "Fetching characters (generation {}, name {:?})",
            ticket.generation,
            ticket.variables
        );

        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let metrics = Arc::clone(&self.metrics);
        let cache = Arc::clone(&self.character_pages);

        self.spawn_tracked(Screen::CharacterList, async move {
            let started = Instant::now();
            let result = client.characters(ticket.variables.as_deref()).await;
            metrics.record_outcome(&result, started.elapsed());

            match &result {
                Ok(page) => {
                    tracing::debug!("Received {} characters", page.results.len());
                    cache.insert(ticket.variables.clone(), page.clone());
                }
                Err(e) => tracing::warn!("Character list query failed: {}", e),
            }

            if !state.complete_character_search(&ticket, result) {
                metrics.record_stale_discarded();
            }
        })
    }

    /// Fetch the mounted detail screen's character, if a detail screen is mounted
    pub fn spawn_character_detail(&self) -> Option<JoinHandle<()>> {
        let ticket = self
            .state
            .begin_character_detail(|param| self.cached(&self.character_lookups, param))?;

        tracing::info!(
            "Fetching character {} (generation {})",
            ticket.variables,
            ticket.generation
        );

        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let metrics = Arc::clone(&self.metrics);
        let cache = Arc::clone(&self.character_lookups);

        Some(self.spawn_tracked(Screen::CharacterDetail, async move {
            let started = Instant::now();
            let result = client.character(&ticket.variables).await;
            metrics.record_outcome(&result, started.elapsed());

            match &result {
                Ok(lookup) if lookup.character.is_none() => {
                    tracing::info!("Character {} not found", ticket.variables);
                }
                Ok(lookup) => {
                    cache.insert(ticket.variables.clone(), lookup.clone());
                }
                Err(e) => tracing::warn!("Character {} query failed: {}", ticket.variables, e),
            }

            if !state.complete_character_detail(&ticket, result) {
                metrics.record_stale_discarded();
            }
        }))
    }

    /// Fetch the (unfiltered) episode list
    pub fn spawn_episode_list(&self) -> JoinHandle<()> {
        let ticket = self
            .state
            .begin_episode_list(self.cached(&self.episode_pages, &()));

        tracing::info!("Fetching episodes (generation {})", ticket.generation);

        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let metrics = Arc::clone(&self.metrics);
        let cache = Arc::clone(&self.episode_pages);

        self.spawn_tracked(Screen::EpisodeList, async move {
            let started = Instant::now();
            let result = client.episodes().await;
            metrics.record_outcome(&result, started.elapsed());

            match &result {
                Ok(page) => cache.insert((), page.clone()),
                Err(e) => tracing::warn!("Episode list query failed: {}", e),
            }

            if !state.complete_episode_list(&ticket, result) {
                metrics.record_stale_discarded();
            }
        })
    }

    /// Abort every in-flight query
    pub fn shutdown(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        for (screen, handle) in in_flight.drain() {
            if !handle.is_finished() {
                tracing::debug!("Aborting {:?} query on shutdown", screen);
                handle.abort();
            }
        }
    }
}

impl<T: GraphQlTransport> CharacterRefetch for QueryCoordinator<T> {
    fn refetch_characters(&self) {
        self.spawn_character_search();
    }
}

impl<T: GraphQlTransport> Navigator for QueryCoordinator<T> {
    fn navigate(&self, route: RouteRequest) -> Result<(), NavigationError> {
        match route {
            RouteRequest::CharacterDetail { id } => {
                let param = NavigationParam::parse(&id).inspect_err(|e| {
                    tracing::error!("Rejected navigation to character detail: {}", e);
                    self.state.report_navigation_error(e);
                })?;
                tracing::info!("Navigating to character {}", param);
                self.state.open_character(param);
                self.spawn_character_detail();
            }
            RouteRequest::Back => {
                tracing::debug!("Navigating back to character list");
                self.state.close_character();
            }
            RouteRequest::Tab(tab) => {
                tracing::debug!("Selecting tab {:?}", tab);
                self.state.select_tab(tab);
                if tab == Tab::Episodes && !self.state.episodes_mounted() {
                    self.spawn_episode_list();
                }
            }
        }
        Ok(())
    }
}
