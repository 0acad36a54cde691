// App Controller - wires the Slint window to the screens and the state manager
//
// Slint callbacks go to CharacterListActions and the coordinator's Navigator.
// A subscription thread re-derives the AppView on every StateChange, asks for
// any avatars it shows, and hands the newest view to the event loop through
// the EventLoopBridge.
//
// The search box owns its text once the window is up; renders never write it.

use crate::metrics::QueryMetrics;
use crate::models::{RouteRequest, Tab};
use crate::services::{
    AvatarCache, AvatarLoader, AvatarSource, CharacterListActions, CharacterRefetch,
    GraphQlTransport, Navigator, QueryCoordinator,
};
use crate::state::{StateChange, StateManager};
use crate::ui::bridge::{EventLoopBridge, EventLoopBridgeHandle, LatestSlot};
use crate::ui::view_model::{
    AppView, CharacterRow, DetailField, DetailView, EpisodeRow, ListBody, NOT_FOUND_MESSAGE,
};
use anyhow::{Context, Result};
use slint::{Image, ModelRc, Rgba8Pixel, SharedPixelBuffer, SharedString, VecModel};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

// Include the generated Slint code
slint::include_modules!();

/// Owns the main window and keeps it in sync with the [`StateManager`].
///
/// # Example
/// ```ignore
/// let coordinator = Arc::new(QueryCoordinator::new(state.clone(), client, policy, handle, metrics.clone()));
/// let avatars = Arc::new(AvatarLoader::new(transport, state.clone(), handle, metrics.clone()));
/// let controller = AppController::new(state, coordinator.clone(), avatars, metrics)?;
/// coordinator.mount();
/// controller.run()?; // blocks until the window is closed
/// ```
pub struct AppController {
    ui: MainWindow,
    _bridge: EventLoopBridge<MainWindow>,
}

impl AppController {
    pub fn new<T: GraphQlTransport, S: AvatarSource>(
        state_manager: Arc<StateManager>,
        coordinator: Arc<QueryCoordinator<T>>,
        avatars: Arc<AvatarLoader<S>>,
        metrics: Arc<QueryMetrics>,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;
        let bridge = EventLoopBridge::new(&ui, metrics);

        let initial = AppView::derive(&state_manager.snapshot());
        ui.set_search_text(initial.characters.search_text.as_str().into());
        apply_view(&ui, &initial, avatars.cache());

        let navigator: Arc<dyn Navigator> = coordinator.clone();
        let refetch: Arc<dyn CharacterRefetch> = coordinator;
        let actions = CharacterListActions::new(Arc::clone(&state_manager), refetch, Arc::clone(&navigator));
        Self::setup_callbacks(&ui, actions, navigator);

        Self::setup_state_subscription(bridge.clone_handle(), state_manager, avatars);

        tracing::info!("App controller initialized");

        Ok(Self {
            ui,
            _bridge: bridge,
        })
    }

    /// Run the event loop; blocks until the window is closed
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        self.ui.run()
    }

    fn setup_callbacks(ui: &MainWindow, actions: CharacterListActions, navigator: Arc<dyn Navigator>) {
        let on_edit = actions.clone();
        ui.on_search_edited(move |text| {
            on_edit.on_input_change(text.as_str());
        });

        let on_confirm = actions.clone();
        ui.on_search_confirmed(move || {
            on_confirm.on_confirm_search();
        });

        ui.on_character_selected(move |id| {
            if let Err(e) = actions.on_item_selected(id.as_str()) {
                tracing::error!("Cannot open character {:?}: {}", id.as_str(), e);
            }
        });

        let back = Arc::clone(&navigator);
        ui.on_back_requested(move || {
            if let Err(e) = back.navigate(RouteRequest::Back) {
                tracing::error!("Back navigation failed: {}", e);
            }
        });

        ui.on_tab_selected(move |index| {
            let Some(tab) = Tab::from_index(index) else {
                tracing::warn!("Ignoring unknown tab index {}", index);
                return;
            };
            if let Err(e) = navigator.navigate(RouteRequest::Tab(tab)) {
                tracing::error!("Tab navigation failed: {}", e);
            }
        });
    }

    /// Re-render on every state change.
    ///
    /// Events only say what changed, so each one (and every lag) re-derives the
    /// whole view from a fresh snapshot. Views queued faster than the event
    /// loop drains them collapse into the newest one.
    fn setup_state_subscription<S: AvatarSource>(
        bridge: EventLoopBridgeHandle<MainWindow>,
        state_manager: Arc<StateManager>,
        avatars: Arc<AvatarLoader<S>>,
    ) {
        let mut rx = state_manager.subscribe();
        let latest = Arc::new(LatestSlot::new());

        let spawned = std::thread::Builder::new()
            .name("rickdex-state-sub".into())
            .spawn(move || {
                tracing::debug!("State subscription thread started");

                loop {
                    match rx.blocking_recv() {
                        Ok(change) => {
                            tracing::trace!("State change received: {:?}", change);
                            if let StateChange::NavigationChanged { title, .. } = &change {
                                tracing::debug!("Now showing {}", title);
                            }
                        }
                        Err(RecvError::Closed) => {
                            tracing::info!(
                                "State broadcast channel closed - shutting down subscription thread"
                            );
                            break;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(
                                "State subscription lagged - {} events were skipped, re-rendering",
                                skipped
                            );
                        }
                    }

                    let view = AppView::derive(&state_manager.snapshot());
                    avatars.request(view.avatar_urls());

                    let cache = Arc::clone(avatars.cache());
                    bridge.update_latest(&latest, view, move |ui, view| {
                        apply_view(ui, &view, &cache)
                    });
                }

                tracing::debug!("State subscription thread terminated gracefully");
            });
        if let Err(e) = spawned {
            tracing::error!("Failed to start state subscription thread: {}", e);
        }
    }
}

/// Push a derived view into the window. Event loop thread only.
///
/// Leaves the search box alone: a view derived a few keystrokes ago would
/// otherwise overwrite what the user has typed since.
fn apply_view(ui: &MainWindow, view: &AppView, avatars: &AvatarCache) {
    ui.set_screen_title(view.title.into());
    ui.set_active_tab(view.tab.index());

    let list = &view.characters.body;
    let (status, message, refreshing) = list_status(list);
    ui.set_list_status(status);
    ui.set_list_message(message);
    ui.set_list_refreshing(refreshing);
    ui.set_list_summary(view.characters.summary().into());
    ui.set_list_notice(view.characters.notice.as_deref().unwrap_or_default().into());
    ui.set_characters(to_model(list.rows(), |row| character_item(row, avatars)));

    ui.set_show_detail(view.detail.is_some());
    if let Some(detail) = &view.detail {
        apply_detail(ui, detail, avatars);
    }

    let episodes = &view.episodes.body;
    let (status, message, _) = list_status(episodes);
    ui.set_episodes_status(status);
    ui.set_episodes_message(message);
    ui.set_episodes_summary(view.episodes.summary().into());
    ui.set_episodes(to_model(episodes.rows(), episode_item));
}

fn apply_detail(ui: &MainWindow, detail: &DetailView, avatars: &AvatarCache) {
    let (status, message) = detail_status(detail);
    ui.set_detail_status(status);
    ui.set_detail_message(message);

    match detail {
        DetailView::Character { sheet, refreshing } => {
            ui.set_detail_refreshing(*refreshing);
            ui.set_detail_name(sheet.name.as_str().into());
            let avatar = avatar_image(avatars, &sheet.image);
            ui.set_detail_has_avatar(avatar.is_some());
            ui.set_detail_avatar(avatar.unwrap_or_default());
            ui.set_detail_fields(to_model(&sheet.fields, field_item));
            ui.set_detail_episodes(to_model(&sheet.episodes, |line| SharedString::from(line.as_str())));
        }
        DetailView::Loading | DetailView::Error(_) | DetailView::NotFound => {
            ui.set_detail_refreshing(false);
            ui.set_detail_name(SharedString::new());
            ui.set_detail_has_avatar(false);
            ui.set_detail_avatar(Image::default());
            ui.set_detail_fields(ModelRc::default());
            ui.set_detail_episodes(ModelRc::default());
        }
    }
}

fn list_status<R>(body: &ListBody<R>) -> (BodyStatus, SharedString, bool) {
    match body {
        ListBody::Loading => (BodyStatus::Loading, SharedString::new(), false),
        ListBody::Error(message) => (BodyStatus::Failed, message.as_str().into(), false),
        ListBody::Rows { refreshing, .. } => (BodyStatus::Ready, SharedString::new(), *refreshing),
    }
}

fn detail_status(detail: &DetailView) -> (BodyStatus, SharedString) {
    match detail {
        DetailView::Loading => (BodyStatus::Loading, SharedString::new()),
        DetailView::Error(message) => (BodyStatus::Failed, message.as_str().into()),
        DetailView::NotFound => (BodyStatus::NotFound, NOT_FOUND_MESSAGE.into()),
        DetailView::Character { .. } => (BodyStatus::Ready, SharedString::new()),
    }
}

fn to_model<R, I: Clone + 'static>(rows: &[R], convert: impl Fn(&R) -> I) -> ModelRc<I> {
    ModelRc::new(VecModel::from(rows.iter().map(convert).collect::<Vec<_>>()))
}

thread_local! {
    // Avatars already converted for Slint, by URL. Event loop thread only.
    static AVATAR_IMAGES: RefCell<HashMap<String, Image>> = RefCell::new(HashMap::new());
}

/// The decoded avatar for `url` as a Slint image, or `None` until it has loaded
fn avatar_image(avatars: &AvatarCache, url: &str) -> Option<Image> {
    if url.is_empty() {
        return None;
    }
    AVATAR_IMAGES.with(|images| {
        if let Some(image) = images.borrow().get(url) {
            return Some(image.clone());
        }
        let pixels = avatars.get(url)?;
        let buffer = SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(
            &pixels.rgba[..],
            pixels.width,
            pixels.height,
        );
        let image = Image::from_rgba8(buffer);
        images.borrow_mut().insert(url.to_string(), image.clone());
        Some(image)
    })
}

fn character_item(row: &CharacterRow, avatars: &AvatarCache) -> CharacterItem {
    let avatar = avatar_image(avatars, &row.image);
    CharacterItem {
        id: row.id.as_str().into(),
        name: row.name.as_str().into(),
        subtitle: row.subtitle.as_str().into(),
        has_avatar: avatar.is_some(),
        avatar: avatar.unwrap_or_default(),
    }
}

fn episode_item(row: &EpisodeRow) -> EpisodeItem {
    EpisodeItem {
        id: row.id.as_str().into(),
        title: row.title.as_str().into(),
        subtitle: row.subtitle.as_str().into(),
    }
}

fn field_item(field: &DetailField) -> FieldItem {
    FieldItem {
        label: field.label.into(),
        value: field.value.as_str().into(),
    }
}
