use serde::{Deserialize, Serialize};

/// A character as it appears in the searchable list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub status: String,
    pub species: String,
    pub image: String,
}

/// First page of `characters(filter: { name })`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterPage {
    #[serde(default)]
    pub results: Vec<Character>,
}

/// Named relation such as `origin` or `location`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaceRef {
    #[serde(default)]
    pub name: String,
}

/// Episode reference nested under a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub id: String,
    pub name: String,
    /// Season/episode code, e.g. `S01E01`.
    pub episode: String,
}

impl EpisodeRef {
    /// Line shown in the detail view: `S01E01 - Pilot`.
    pub fn display_line(&self) -> String {
        format!("{} - {}", self.episode, self.name)
    }
}

/// Full character record returned by `character(id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub species: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub origin: Option<PlaceRef>,
    #[serde(default)]
    pub location: Option<PlaceRef>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub episode: Vec<EpisodeRef>,
}

/// Outcome of a character lookup.
///
/// A structurally successful response may still carry `character: null`;
/// that is a lookup miss, not a transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterLookup {
    #[serde(default)]
    pub character: Option<CharacterDetail>,
}

/// An episode in the static episode list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    pub episode: String,
    #[serde(default)]
    pub air_date: String,
}

/// First page of `episodes`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodePage {
    #[serde(default)]
    pub results: Vec<Episode>,
}
