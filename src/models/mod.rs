//! Data models for the Rickdex application.
//!
//! - [`AppState`]: per-screen state (search box, query slots, navigation)
//! - [`QueryState`] / [`QuerySlot`]: the loading/error/data state of one query attempt
//! - [`SearchState`]: keystroke buffer vs. confirmed search term
//! - [`NavigationParam`]: validated id passed from the list to the detail screen
//! - Records returned by the API: [`Character`], [`CharacterDetail`], [`Episode`]
//! - [`AppConfig`]: settings loaded from `Rickdex.yaml`
//!
//! State updates go through [`StateManager`](crate::state::StateManager), which
//! holds `AppState` behind `Arc<RwLock<>>` and emits change events.

pub mod app_state;
pub mod config;
pub mod navigation;
pub mod query_state;
pub mod records;
pub mod search;

pub use app_state::{AppState, CharacterDetailScreen, CharacterListScreen};
pub use config::{AppConfig, ConfigError, DEFAULT_ENDPOINT, FetchPolicy};
pub use navigation::{
    CharacterRoute, NavigationError, NavigationParam, NavigationState, RouteRequest, Tab,
};
pub use query_state::{QueryError, QuerySlot, QueryState};
pub use records::{
    Character, CharacterDetail, CharacterLookup, CharacterPage, Episode, EpisodePage, EpisodeRef,
    PlaceRef,
};
pub use search::{SearchState, normalize_term};
