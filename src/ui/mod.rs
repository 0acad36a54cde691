// UI module - Slint window, view models and the event loop bridge
//
// - view_model: what each screen renders, derived from an AppState snapshot
// - EventLoopBridge: queues updates from worker threads onto the Slint event loop
// - AppController: owns the window and wires its callbacks

pub mod bridge;
pub mod controller;
pub mod view_model;

pub use bridge::{EventLoopBridge, EventLoopBridgeHandle, LatestSlot};
pub use controller::AppController;
pub use view_model::{AppView, CharacterListView, DetailView, EpisodeListView, ListBody};
