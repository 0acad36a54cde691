use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Character ids issued by the API are positive decimal integers.
static CHARACTER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]*$").expect("Invalid character id regex"));

/// Rejections at the navigation boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Character detail requires an id, but none was provided")]
    MissingId,

    #[error("Invalid character id {0:?}: expected a positive integer")]
    InvalidId(String),
}

/// Route parameter for the character detail screen.
///
/// Only constructible through [`NavigationParam::parse`], so a detail screen
/// never mounts with an absent or malformed id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigationParam {
    id: String,
}

impl NavigationParam {
    pub fn parse(raw: &str) -> Result<Self, NavigationError> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(NavigationError::MissingId);
        }
        if !CHARACTER_ID_PATTERN.is_match(id) {
            return Err(NavigationError::InvalidId(id.to_string()));
        }
        Ok(Self { id: id.to_string() })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for NavigationParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Bottom-level tab choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Characters,
    Episodes,
}

impl Tab {
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Tab::Characters),
            1 => Some(Tab::Episodes),
            _ => None,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Tab::Characters => 0,
            Tab::Episodes => 1,
        }
    }
}

/// Routes of the characters stack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CharacterRoute {
    #[default]
    List,
    Detail(NavigationParam),
}

/// Request issued by a screen to the navigation shell.
///
/// Detail requests carry the raw id as the screen saw it; the shell
/// validates it before mounting anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRequest {
    CharacterDetail { id: String },
    Back,
    Tab(Tab),
}

/// Where the user currently is.
///
/// The characters stack is at most two deep: the list, optionally with one
/// detail screen pushed on top.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationState {
    pub tab: Tab,
    pub character_route: CharacterRoute,
}

impl NavigationState {
    pub fn title(&self) -> &'static str {
        match (self.tab, &self.character_route) {
            (Tab::Characters, CharacterRoute::List) => "Characters",
            (Tab::Characters, CharacterRoute::Detail(_)) => "Character Detail",
            (Tab::Episodes, _) => "Episodes",
        }
    }

    pub fn detail_param(&self) -> Option<&NavigationParam> {
        match &self.character_route {
            CharacterRoute::Detail(param) => Some(param),
            CharacterRoute::List => None,
        }
    }
}
