// View models - what each screen shows, derived from a state snapshot
//
// Nothing here touches Slint, so the render rules are unit-testable. The
// controller converts these into Slint models on the event loop thread.

use crate::models::{
    AppState, Character, CharacterDetail, CharacterDetailScreen, CharacterLookup, Episode,
    QueryState, Tab,
};

/// Message shown when a lookup succeeds without a matching character.
pub const NOT_FOUND_MESSAGE: &str = "Character not found.";

/// Body of a list screen. Exactly one of these renders.
#[derive(Debug, Clone, PartialEq)]
pub enum ListBody<R> {
    /// Spinner only; there is nothing to show yet
    Loading,
    /// `Error: <message>` in place of the list
    Error(String),
    /// The rows of the latest payload; `refreshing` while a newer one is loading
    Rows { rows: Vec<R>, refreshing: bool },
}

impl<R> ListBody<R> {
    fn from_state<T>(state: &QueryState<T>, to_rows: impl Fn(&T) -> Vec<R>) -> Self {
        match state {
            QueryState::Idle | QueryState::Loading { stale: None } => ListBody::Loading,
            QueryState::Loading { stale: Some(data) } => ListBody::Rows {
                rows: to_rows(data),
                refreshing: true,
            },
            QueryState::Failed(err) => ListBody::Error(err.display_message()),
            QueryState::Loaded(data) => ListBody::Rows {
                rows: to_rows(data),
                refreshing: false,
            },
        }
    }

    pub fn rows(&self) -> &[R] {
        match self {
            ListBody::Rows { rows, .. } => rows,
            ListBody::Loading | ListBody::Error(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRow {
    pub id: String,
    pub name: String,
    /// `<status> - <species>`
    pub subtitle: String,
    pub image: String,
}

impl From<&Character> for CharacterRow {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id.clone(),
            name: character.name.clone(),
            subtitle: format!("{} - {}", character.status, character.species),
            image: character.image.clone(),
        }
    }
}

/// The character list screen. The search row is always present, whatever the body shows.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterListView {
    /// Raw input; the window seeds its search box from this once at startup
    pub search_text: String,
    /// Shown above the body when a row could not be opened
    pub notice: Option<String>,
    pub body: ListBody<CharacterRow>,
}

impl CharacterListView {
    pub fn derive(state: &AppState) -> Self {
        let screen = &state.character_list;
        Self {
            search_text: screen.search.raw_input.clone(),
            notice: screen.notice.clone(),
            body: ListBody::from_state(&screen.query.state, |page| {
                page.results.iter().map(CharacterRow::from).collect()
            }),
        }
    }

    pub fn summary(&self) -> String {
        count_label(self.body.rows().len(), "character", "characters")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRow {
    pub id: String,
    pub title: String,
    /// `<episode code> - <air date>`
    pub subtitle: String,
}

impl From<&Episode> for EpisodeRow {
    fn from(episode: &Episode) -> Self {
        Self {
            id: episode.id.clone(),
            title: episode.name.clone(),
            subtitle: format!("{} - {}", episode.episode, episode.air_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeListView {
    pub body: ListBody<EpisodeRow>,
}

impl EpisodeListView {
    pub fn derive(state: &AppState) -> Self {
        Self {
            body: ListBody::from_state(&state.episode_list.state, |page| {
                page.results.iter().map(EpisodeRow::from).collect()
            }),
        }
    }

    pub fn summary(&self) -> String {
        count_label(self.body.rows().len(), "episode", "episodes")
    }
}

/// One `label: value` line of the detail sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSheet {
    pub name: String,
    pub image: String,
    pub fields: Vec<DetailField>,
    /// `S01E01 - Pilot`, in the order the API returned them
    pub episodes: Vec<String>,
}

impl From<&CharacterDetail> for CharacterSheet {
    fn from(character: &CharacterDetail) -> Self {
        let field = |label, value: &str| DetailField {
            label,
            value: value.to_string(),
        };

        let mut fields = vec![
            field("Status:", &character.status),
            field("Species:", &character.species),
        ];
        if !character.kind.is_empty() {
            fields.push(field("Type:", &character.kind));
        }
        fields.push(field("Gender:", &character.gender));
        fields.push(field(
            "Origin:",
            character.origin.as_ref().map_or("", |p| p.name.as_str()),
        ));
        fields.push(field(
            "Last Location:",
            character.location.as_ref().map_or("", |p| p.name.as_str()),
        ));

        Self {
            name: character.name.clone(),
            image: character.image.clone(),
            fields,
            episodes: character.episode.iter().map(|ep| ep.display_line()).collect(),
        }
    }
}

/// The character detail screen, in render priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    Loading,
    Error(String),
    NotFound,
    Character {
        sheet: CharacterSheet,
        refreshing: bool,
    },
}

impl DetailView {
    pub fn derive(screen: &CharacterDetailScreen) -> Self {
        let lookup_view = |lookup: &CharacterLookup, refreshing| match &lookup.character {
            Some(character) => DetailView::Character {
                sheet: CharacterSheet::from(character),
                refreshing,
            },
            None => DetailView::NotFound,
        };

        match &screen.query.state {
            QueryState::Idle | QueryState::Loading { stale: None } => DetailView::Loading,
            QueryState::Loading { stale: Some(lookup) } => lookup_view(lookup, true),
            QueryState::Failed(err) => DetailView::Error(err.display_message()),
            QueryState::Loaded(lookup) => lookup_view(lookup, false),
        }
    }
}

/// Everything the window shows at once.
#[derive(Debug, Clone, PartialEq)]
pub struct AppView {
    pub title: &'static str,
    pub tab: Tab,
    pub characters: CharacterListView,
    /// `Some` while the detail route is on top of the characters stack
    pub detail: Option<DetailView>,
    pub episodes: EpisodeListView,
}

impl AppView {
    pub fn derive(state: &AppState) -> Self {
        Self {
            title: state.navigation.title(),
            tab: state.navigation.tab,
            characters: CharacterListView::derive(state),
            detail: state.character_detail.as_ref().map(DetailView::derive),
            episodes: EpisodeListView::derive(state),
        }
    }

    /// Avatar URLs the window can currently show
    pub fn avatar_urls(&self) -> Vec<&str> {
        let rows = self.characters.body.rows().iter().map(|row| row.image.as_str());
        let detail = match &self.detail {
            Some(DetailView::Character { sheet, .. }) => Some(sheet.image.as_str()),
            _ => None,
        };
        rows.chain(detail).filter(|url| !url.is_empty()).collect()
    }
}

fn count_label(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {}", singular)
    } else {
        format!("{} {}", count, plural)
    }
}
