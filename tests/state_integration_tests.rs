//! Integration tests for StateManager with state change events
//!
//! These tests verify that the StateManager correctly:
//! - Emits state change events on mutations
//! - Supports multiple subscribers
//! - Handles concurrent access from multiple threads
//! - Drops superseded query completions without emitting anything

use rickdex::models::{
    CharacterLookup, CharacterPage, EpisodePage, NavigationParam, QueryError, QueryState, Tab,
};
use rickdex::{StateChange, StateManager};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

async fn next_event(rx: &mut broadcast::Receiver<StateChange>) -> StateChange {
    timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed")
}

fn drain(rx: &mut broadcast::Receiver<StateChange>) -> Vec<StateChange> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_keystroke_emits_input_change_only() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    state.set_search_input("ric");

    assert_eq!(
        next_event(&mut rx).await,
        StateChange::SearchInputChanged { text: "ric".into() }
    );
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let state = Arc::new(StateManager::new());
    let mut rx1 = state.subscribe();
    let mut rx2 = state.subscribe();
    let mut rx3 = state.subscribe();

    state.select_tab(Tab::Episodes);

    let expected = StateChange::NavigationChanged {
        tab: Tab::Episodes,
        title: "Episodes",
    };
    assert_eq!(next_event(&mut rx1).await, expected);
    assert_eq!(next_event(&mut rx2).await, expected);
    assert_eq!(next_event(&mut rx3).await, expected);
}

#[tokio::test]
async fn test_search_flow_events() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    state.set_search_input("  rick ");
    state.confirm_search();
    let ticket = state.begin_character_search(|_| None);
    state.complete_character_search(&ticket, Ok(CharacterPage::default()));

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![
            StateChange::SearchInputChanged {
                text: "  rick ".into()
            },
            StateChange::SearchConfirmed {
                term: Some("rick".into())
            },
            StateChange::CharacterListChanged,
            StateChange::CharacterListChanged,
        ]
    );
    assert_eq!(ticket.variables.as_deref(), Some("rick"));
}

#[tokio::test]
async fn test_superseded_completion_is_silent() {
    let state = Arc::new(StateManager::new());

    let older = state.begin_character_search(|_| None);
    let newer = state.begin_character_search(|_| None);
    assert!(newer.generation > older.generation);

    let mut rx = state.subscribe();
    assert!(state.complete_character_search(&newer, Ok(CharacterPage::default())));
    assert!(!state.complete_character_search(
        &older,
        Err(QueryError::Transport("late".into()))
    ));

    assert_eq!(drain(&mut rx), vec![StateChange::CharacterListChanged]);
    assert_eq!(
        state.snapshot().character_list.query.state,
        QueryState::Loaded(CharacterPage::default())
    );
}

#[tokio::test]
async fn test_detail_mount_and_unmount_events() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    state.open_character(NavigationParam::parse("1").unwrap());
    let events = drain(&mut rx);
    assert!(events.contains(&StateChange::CharacterDetailChanged));
    assert!(events.contains(&StateChange::NavigationChanged {
        tab: Tab::Characters,
        title: "Character Detail",
    }));

    let ticket = state.begin_character_detail(|_| None).unwrap();
    state.close_character();
    drain(&mut rx);

    // The screen is gone, so the completion has nowhere to land
    assert!(!state.complete_character_detail(&ticket, Ok(CharacterLookup::default())));
    assert!(drain(&mut rx).is_empty());
    assert!(state.begin_character_detail(|_| None).is_none());
}

#[tokio::test]
async fn test_generations_are_shared_across_screens() {
    let state = Arc::new(StateManager::new());

    let list = state.begin_character_search(|_| None);
    let episodes = state.begin_episode_list(None);
    state.open_character(NavigationParam::parse("2").unwrap());
    let detail = state.begin_character_detail(|_| None).unwrap();

    assert!(list.generation < episodes.generation);
    assert!(episodes.generation < detail.generation);
    assert!(state.episodes_mounted());
}

#[tokio::test]
async fn test_cached_payload_is_shown_while_loading() {
    let state = Arc::new(StateManager::new());
    let cached = EpisodePage::default();

    state.begin_episode_list(Some(cached.clone()));

    assert_eq!(
        state.snapshot().episode_list.state,
        QueryState::Loading {
            stale: Some(cached)
        }
    );
}

#[test]
fn test_concurrent_keystrokes_and_confirms() {
    let state = Arc::new(StateManager::new());
    let mut handles = vec![];

    for i in 0..10 {
        let state_clone = Arc::clone(&state);
        let handle = std::thread::spawn(move || {
            for j in 0..20 {
                state_clone.set_search_input(format!("term-{}-{}", i, j));
                state_clone.confirm_search();
                let ticket = state_clone.begin_character_search(|_| None);
                state_clone.complete_character_search(&ticket, Ok(CharacterPage::default()));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let snapshot = state.snapshot();
    assert_eq!(snapshot.last_generation, 200);
    assert!(snapshot.character_list.search.raw_input.starts_with("term-"));
}
