//! Query documents and request builders for the three operations the screens use.

use crate::models::{CharacterLookup, CharacterPage, EpisodePage, NavigationParam};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GET_CHARACTERS: &str = r#"query GetCharacters($name: String) {
  characters(filter: { name: $name }) {
    results {
      id
      name
      status
      species
      image
    }
  }
}"#;

pub const GET_CHARACTER: &str = r#"query GetCharacter($id: ID!) {
  character(id: $id) {
    id
    name
    status
    species
    type
    gender
    origin {
      name
    }
    location {
      name
    }
    image
    episode {
      id
      name
      episode
    }
  }
}"#;

pub const GET_EPISODES: &str = r#"query GetEpisodes {
  episodes {
    results {
      id
      name
      episode
      air_date
    }
  }
}"#;

/// Body of a GraphQL POST request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub operation_name: &'static str,
    pub query: &'static str,
    pub variables: IndexMap<String, Value>,
}

impl GraphQlRequest {
    fn new(operation_name: &'static str, query: &'static str) -> Self {
        Self {
            operation_name,
            query,
            variables: IndexMap::new(),
        }
    }

    fn variable(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }
}

/// `GetCharacters`; the `name` variable is left out entirely when there is no filter.
pub fn characters_request(name: Option<&str>) -> GraphQlRequest {
    let request = GraphQlRequest::new("GetCharacters", GET_CHARACTERS);
    match name {
        Some(name) => request.variable("name", name),
        None => request,
    }
}

pub fn character_request(param: &NavigationParam) -> GraphQlRequest {
    GraphQlRequest::new("GetCharacter", GET_CHARACTER).variable("id", param.id())
}

pub fn episodes_request() -> GraphQlRequest {
    GraphQlRequest::new("GetEpisodes", GET_EPISODES)
}

/// `data` of a `GetCharacters` response. A null `characters` reads as no results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharactersData {
    #[serde(default)]
    pub characters: Option<CharacterPage>,
}

/// `data` of a `GetCharacter` response.
pub type CharacterData = CharacterLookup;

/// `data` of a `GetEpisodes` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpisodesData {
    #[serde(default)]
    pub episodes: Option<EpisodePage>,
}
