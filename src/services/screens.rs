//! Input handling for the character list screen and the seams it talks through.

use crate::models::{NavigationError, RouteRequest};
use crate::state::StateManager;
use std::sync::Arc;

/// Navigation shell as seen by the screens.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: RouteRequest) -> Result<(), NavigationError>;
}

/// Refetch entry point of the character list query.
#[cfg_attr(test, mockall::automock)]
pub trait CharacterRefetch: Send + Sync {
    /// Refetch with the current confirmed term
    fn refetch_characters(&self);
}

/// Handlers bound to the character list's search box, Search button and rows.
///
/// Keystrokes only touch the input buffer. The submit key and the button both
/// land in [`on_confirm_search`](Self::on_confirm_search), which commits the
/// term and refetches. Row selection is forwarded to the navigator untouched.
#[derive(Clone)]
pub struct CharacterListActions {
    state: Arc<StateManager>,
    queries: Arc<dyn CharacterRefetch>,
    navigator: Arc<dyn Navigator>,
}

impl CharacterListActions {
    pub fn new(
        state: Arc<StateManager>,
        queries: Arc<dyn CharacterRefetch>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            state,
            queries,
            navigator,
        }
    }

    pub fn on_input_change(&self, text: &str) {
        self.state.set_search_input(text);
    }

    /// Commit the input and refetch; returns the term that will be sent
    pub fn on_confirm_search(&self) -> Option<String> {
        let term = self.state.confirm_search();
        tracing::info!("Search confirmed with name filter {:?}", term);
        self.queries.refetch_characters();
        term
    }

    pub fn on_item_selected(&self, id: &str) -> Result<(), NavigationError> {
        self.navigator.navigate(RouteRequest::CharacterDetail { id: id.to_string() })
    }
}
