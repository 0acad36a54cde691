use super::navigation::{NavigationParam, NavigationState};
use super::query_state::QuerySlot;
use super::records::{CharacterLookup, CharacterPage, EpisodePage};
use super::search::SearchState;

/// Character list screen: the search box plus its filtered query.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CharacterListScreen {
    pub search: SearchState,
    pub query: QuerySlot<CharacterPage>,

    /// Why the last row selection did not open a detail screen
    pub notice: Option<String>,
}

/// A mounted character detail screen.
///
/// Created when the detail route is pushed and dropped when it is popped,
/// so every visit starts from a fresh query state.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterDetailScreen {
    pub param: NavigationParam,
    pub query: QuerySlot<CharacterLookup>,
}

impl CharacterDetailScreen {
    pub fn new(param: NavigationParam) -> Self {
        Self {
            param,
            query: QuerySlot::default(),
        }
    }
}

/// Single source of truth for everything the screens render.
///
/// # Thread Safety
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by [`crate::state::StateManager`].
/// Never mutate it directly; go through the manager so that
/// [`StateChange`](crate::state::StateChange) events are emitted.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct AppState {
    pub navigation: NavigationState,
    pub character_list: CharacterListScreen,
    pub character_detail: Option<CharacterDetailScreen>,
    pub episode_list: QuerySlot<EpisodePage>,

    /// Last generation handed out to any query attempt.
    ///
    /// Shared across screens so a completion from an unmounted detail screen
    /// can never match the generation of a later mount.
    pub last_generation: u64,

    /// Bumped whenever a character avatar finishes decoding.
    pub avatar_revision: u64,
}

impl AppState {
    pub fn next_generation(&mut self) -> u64 {
        self.last_generation += 1;
        self.last_generation
    }

    pub fn confirmed_term(&self) -> Option<&str> {
        self.character_list.search.confirmed_term.as_deref()
    }
}
