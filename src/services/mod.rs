//! Services module - query execution and screen orchestration.
//!
//! Everything here is framework-agnostic: no Slint types, so the whole query
//! flow is testable without a display.
//!
//! # Components
//!
//! - [`GraphQlClient`]: typed access to the three operations over a [`GraphQlTransport`]
//!   - [`HttpTransport`]: GraphQL over HTTP POST via reqwest
//! - [`queries`]: query documents and request builders
//! - [`ResponseCache`]: last payload per variables, backing cache-and-network
//! - [`QueryCoordinator`]: starts queries, applies results through the
//!   [`StateManager`](crate::state::StateManager), and acts as the [`Navigator`]
//! - [`CharacterListActions`]: search box, Search button and row handlers
//! - [`AvatarLoader`]: fetches and decodes character avatars into an [`AvatarCache`]
//!
//! # Usage Example
//!
//! ```ignore
//! use rickdex::services::{GraphQlClient, HttpTransport, QueryCoordinator};
//!
//! let client = Arc::new(GraphQlClient::new(HttpTransport::new(&config)?));
//! let coordinator = Arc::new(QueryCoordinator::new(
//!     state.clone(),
//!     client,
//!     config.fetch_policy,
//!     runtime.handle().clone(),
//!     metrics,
//! ));
//! coordinator.mount();
//! ```

pub mod avatars;
pub mod cache;
pub mod coordinator;
pub mod graphql;
pub mod queries;
pub mod screens;

pub use avatars::{AvatarCache, AvatarLoader, AvatarPixels, AvatarSource};
pub use cache::ResponseCache;
pub use coordinator::QueryCoordinator;
pub use graphql::{GraphQlClient, GraphQlErrorEntry, GraphQlResponse, GraphQlTransport, HttpTransport};
pub use queries::GraphQlRequest;
pub use screens::{CharacterListActions, CharacterRefetch, Navigator};
