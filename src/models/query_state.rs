use std::time::Duration;
use thiserror::Error;

/// Failure of a single query attempt.
///
/// Every variant is a network or server error from the point of view of the
/// screens; a lookup that succeeds with a null entity is not represented here.
/// The type is `Clone + PartialEq` so it can sit inside [`QueryState`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Network request failed: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Server responded with HTTP {status}")]
    Http { status: u16 },

    #[error("{}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("Unexpected response payload: {0}")]
    Decode(String),
}

impl QueryError {
    /// Message shown in place of content, e.g. `Error: Network request failed: ...`.
    pub fn display_message(&self) -> String {
        format!("Error: {}", self)
    }
}

/// State of one query attempt for one screen.
///
/// `Loading` may hold the payload of an earlier attempt (or a cached one) so a
/// screen can keep showing it while the fresh request is in flight.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryState<T> {
    #[default]
    Idle,
    Loading {
        stale: Option<T>,
    },
    Loaded(T),
    Failed(QueryError),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading { .. })
    }

    /// The freshest payload available: loaded data, or stale data while loading.
    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Loaded(data) => Some(data),
            QueryState::Loading { stale } => stale.as_ref(),
            QueryState::Idle | QueryState::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            QueryState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl<T: Clone> QueryState<T> {
    /// Move into `Loading`, preferring `cached` and falling back to whatever
    /// payload is currently shown.
    pub fn begin_loading(&mut self, cached: Option<T>) {
        let stale = cached.or_else(|| self.data().cloned());
        *self = QueryState::Loading { stale };
    }

    pub fn settle(&mut self, result: Result<T, QueryError>) {
        *self = match result {
            Ok(data) => QueryState::Loaded(data),
            Err(err) => QueryState::Failed(err),
        };
    }
}

/// A screen's query state plus the generation of its outstanding attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySlot<T> {
    pub state: QueryState<T>,
    /// Generation of the most recently started attempt; `0` means none yet.
    pub generation: u64,
}

impl<T> Default for QuerySlot<T> {
    fn default() -> Self {
        Self {
            state: QueryState::Idle,
            generation: 0,
        }
    }
}

impl<T: Clone> QuerySlot<T> {
    pub fn begin(&mut self, generation: u64, cached: Option<T>) {
        self.generation = generation;
        self.state.begin_loading(cached);
    }

    /// Apply a completion if it belongs to the current attempt.
    ///
    /// Returns `false` when the completion was superseded and dropped.
    pub fn complete(&mut self, generation: u64, result: Result<T, QueryError>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.state.settle(result);
        true
    }
}
