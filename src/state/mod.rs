// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events so the UI can re-derive its view models.

use crate::models::{
    AppState, CharacterDetailScreen, CharacterLookup, CharacterPage, CharacterRoute, EpisodePage,
    NavigationError, NavigationParam, QueryError, Tab,
};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// Events say *which* part of the state changed; subscribers read the
/// current snapshot to render it.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The search box text changed (no query is issued)
    SearchInputChanged { text: String },

    /// A search was confirmed; `term` is the filter that will be sent
    SearchConfirmed { term: Option<String> },

    /// The character list query state changed
    CharacterListChanged,

    /// The character detail screen was mounted, unmounted, or its query changed
    CharacterDetailChanged,

    /// The episode list query state changed
    EpisodeListChanged,

    /// Tab or route changed
    NavigationChanged { tab: Tab, title: &'static str },

    /// The character list notice was set or cleared
    NoticeChanged { notice: Option<String> },

    /// Another avatar is ready to draw
    AvatarsChanged,
}

/// Handle for one query attempt.
///
/// Carries the variables the attempt was started with and the generation used
/// to decide whether its completion is still wanted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryTicket<V> {
    pub generation: u64,
    pub variables: V,
}

/// Thread-safe state manager with event emission
///
/// - [`read()`](Self::read) for reading state through a closure
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// The `begin_*` / `complete_*` pairs implement last-confirmed-wins: a
/// completion is applied only if its ticket still matches the screen's
/// current generation.
pub struct StateManager {
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state and a 100 event buffer
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone the entire state
    pub fn snapshot(&self) -> AppState {
        self.read_guard().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let term = state_manager.read(|state| state.confirmed_term().map(str::to_owned));
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.read_guard();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// Captures the old state, applies `update_fn`, diffs, and broadcasts one
    /// event per changed area. Returns the emitted events.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.write_guard();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);
        drop(state);

        for change in &changes {
            self.emit(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn emit(&self, change: StateChange) {
        // No subscribers is fine
        let _ = self.state_tx.send(change);
    }

    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.character_list.search.raw_input != new.character_list.search.raw_input {
            changes.push(StateChange::SearchInputChanged {
                text: new.character_list.search.raw_input.clone(),
            });
        }

        if old.character_list.query != new.character_list.query {
            changes.push(StateChange::CharacterListChanged);
        }

        if old.character_detail != new.character_detail {
            changes.push(StateChange::CharacterDetailChanged);
        }

        if old.episode_list != new.episode_list {
            changes.push(StateChange::EpisodeListChanged);
        }

        if old.navigation != new.navigation {
            changes.push(StateChange::NavigationChanged {
                tab: new.navigation.tab,
                title: new.navigation.title(),
            });
        }

        if old.character_list.notice != new.character_list.notice {
            changes.push(StateChange::NoticeChanged {
                notice: new.character_list.notice.clone(),
            });
        }

        if old.avatar_revision != new.avatar_revision {
            changes.push(StateChange::AvatarsChanged);
        }

        changes
    }

    // ===== Character list =====

    /// Record a keystroke; never starts a query
    pub fn set_search_input(&self, text: impl Into<String>) -> Vec<StateChange> {
        let text = text.into();
        self.update(|state| state.character_list.search.set_input(text))
    }

    /// Commit the current input as the search filter
    ///
    /// Always emits [`StateChange::SearchConfirmed`], even when the term did not
    /// change, since a confirmation always refetches.
    pub fn confirm_search(&self) -> Option<String> {
        let term = self.write_guard().character_list.search.confirm();
        tracing::debug!("Search confirmed: {:?}", term);
        self.emit(StateChange::SearchConfirmed { term: term.clone() });
        term
    }

    /// Start a character list attempt for the current confirmed term
    ///
    /// `cached` is asked for a payload matching the term; when it has one the
    /// list shows it while loading.
    pub fn begin_character_search<C>(&self, cached: C) -> QueryTicket<Option<String>>
    where
        C: FnOnce(Option<&str>) -> Option<CharacterPage>,
    {
        let mut ticket = QueryTicket {
            generation: 0,
            variables: None,
        };
        self.update(|state| {
            state.character_list.notice = None;
            let term = state.character_list.search.confirmed_term.clone();
            let generation = state.next_generation();
            let hit = cached(term.as_deref());
            state.character_list.query.begin(generation, hit);
            ticket = QueryTicket {
                generation,
                variables: term,
            };
        });
        ticket
    }

    /// Apply a character list completion; returns `false` if it was superseded
    pub fn complete_character_search(
        &self,
        ticket: &QueryTicket<Option<String>>,
        result: Result<CharacterPage, QueryError>,
    ) -> bool {
        let mut applied = false;
        self.update(|state| {
            applied = state.character_list.query.complete(ticket.generation, result);
        });
        if !applied {
            tracing::debug!(
                "Discarding superseded character list response (generation {}, term {:?})",
                ticket.generation,
                ticket.variables
            );
        }
        applied
    }

    // ===== Navigation =====

    /// Push the detail route and mount a fresh detail screen
    pub fn open_character(&self, param: NavigationParam) -> Vec<StateChange> {
        self.update(|state| {
            state.character_list.notice = None;
            state.navigation.tab = Tab::Characters;
            state.navigation.character_route = CharacterRoute::Detail(param.clone());
            state.character_detail = Some(CharacterDetailScreen::new(param));
        })
    }

    /// Pop back to the list, unmounting the detail screen
    pub fn close_character(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.navigation.character_route = CharacterRoute::List;
            state.character_detail = None;
        })
    }

    pub fn select_tab(&self, tab: Tab) -> Vec<StateChange> {
        self.update(|state| state.navigation.tab = tab)
    }

    /// Show why a row selection was refused; cleared by the next search or navigation
    pub fn report_navigation_error(&self, err: &NavigationError) -> Vec<StateChange> {
        let notice = format!("Cannot open character: {}", err);
        self.update(|state| state.character_list.notice = Some(notice))
    }

    // ===== Avatars =====

    pub fn avatar_ready(&self) -> Vec<StateChange> {
        self.update(|state| state.avatar_revision += 1)
    }

    // ===== Character detail =====

    /// Start a detail attempt for the mounted detail screen, if any
    pub fn begin_character_detail<C>(&self, cached: C) -> Option<QueryTicket<NavigationParam>>
    where
        C: FnOnce(&NavigationParam) -> Option<CharacterLookup>,
    {
        let mut ticket = None;
        self.update(|state| {
            let Some(param) = state.character_detail.as_ref().map(|s| s.param.clone()) else {
                return;
            };
            let generation = state.next_generation();
            let hit = cached(&param);
            if let Some(screen) = state.character_detail.as_mut() {
                screen.query.begin(generation, hit);
            }
            ticket = Some(QueryTicket {
                generation,
                variables: param,
            });
        });
        ticket
    }

    /// Apply a detail completion; returns `false` if the screen was left or
    /// the attempt was superseded
    pub fn complete_character_detail(
        &self,
        ticket: &QueryTicket<NavigationParam>,
        result: Result<CharacterLookup, QueryError>,
    ) -> bool {
        let mut applied = false;
        self.update(|state| {
            if let Some(screen) = state.character_detail.as_mut() {
                if screen.param == ticket.variables {
                    applied = screen.query.complete(ticket.generation, result);
                }
            }
        });
        if !applied {
            tracing::debug!(
                "Discarding detail response for id {} (generation {})",
                ticket.variables,
                ticket.generation
            );
        }
        applied
    }

    // ===== Episode list =====

    /// Whether the episode list has ever started a query
    pub fn episodes_mounted(&self) -> bool {
        self.read(|state| state.episode_list.generation != 0)
    }

    pub fn begin_episode_list(&self, cached: Option<EpisodePage>) -> QueryTicket<()> {
        let mut generation = 0;
        self.update(|state| {
            generation = state.next_generation();
            state.episode_list.begin(generation, cached);
        });
        QueryTicket {
            generation,
            variables: (),
        }
    }

    pub fn complete_episode_list(
        &self,
        ticket: &QueryTicket<()>,
        result: Result<EpisodePage, QueryError>,
    ) -> bool {
        let mut applied = false;
        self.update(|state| {
            applied = state.episode_list.complete(ticket.generation, result);
        });
        applied
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
