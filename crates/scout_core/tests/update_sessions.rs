use std::sync::Once;

use scout_core::{
    update, AppState, DownloadOutcome, DownloadStatus, Effect, Inbound, Msg, Notice, PageMessage,
    PageTarget, Phase, Script, SearchResult, SessionId, SurfaceSlot,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scout_logging::initialize_for_tests);
}

fn page(session: SessionId, message: PageMessage) -> Msg {
    Msg::Page {
        session,
        message: Inbound::Message(message),
    }
}

fn result(i: usize) -> SearchResult {
    SearchResult {
        title: format!("Book {i}"),
        url: format!("https://x.test/md5/{i}"),
        image: Some(format!("https://x.test/cover/{i}.jpg")),
        slow_link: None,
    }
}

/// Runs a full search whose first result resolves to a slow link and the second to nothing.
fn resolved_state() -> AppState {
    let (state, _) = update(AppState::new(), Msg::SearchSubmitted("foo".to_string()));
    let session = state.session().id();
    let (state, _) = update(
        state,
        page(
            session,
            PageMessage::InitialResults {
                payload: vec![result(0), result(1)],
            },
        ),
    );
    let (state, _) = update(
        state,
        page(
            session,
            PageMessage::SlowLink {
                index: 0,
                payload: "https://x.test/slow_download/abc/0/2".to_string(),
            },
        ),
    );
    let (state, _) = update(
        state,
        page(
            session,
            PageMessage::SlowLink {
                index: 1,
                payload: "Not found".to_string(),
            },
        ),
    );
    state
}

fn select_first(state: AppState) -> (AppState, SessionId) {
    let (state, effects) = update(state, Msg::DownloadSelected { index: 0 });
    let session = state.candidate().expect("candidate").id();
    assert_eq!(
        effects,
        vec![Effect::LoadPage(PageTarget {
            session,
            slot: SurfaceSlot::Download,
            url: "https://x.test/slow_download/abc/0/2".to_string(),
            script: Script::DownloadDiscovery,
        })]
    );
    (state, session)
}

#[test]
fn new_search_supersedes_in_flight_resolution() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::SearchSubmitted("first".to_string()));
    let old = state.session().id();
    let (state, _) = update(
        state,
        page(
            old,
            PageMessage::InitialResults {
                payload: vec![result(0), result(1)],
            },
        ),
    );

    let (state, _) = update(state, Msg::SearchSubmitted("second".to_string()));
    let current = state.session().id();
    assert!(current > old);
    assert_eq!(state.session().phase(), Phase::SearchLoading);
    assert!(state.session().results().is_empty());
    let (state, _) = update(
        state,
        page(
            current,
            PageMessage::InitialResults {
                payload: vec![result(5)],
            },
        ),
    );
    let before = state.clone();

    // Late message from the discarded session, index in range for the new one.
    let (state, effects) = update(
        state,
        page(
            old,
            PageMessage::SlowLink {
                index: 0,
                payload: "https://x.test/slow_download/stale".to_string(),
            },
        ),
    );
    assert_eq!(state, before);
    assert!(effects.is_empty());

    // Late load failure from the discarded session is ignored too.
    let (state, effects) = update(
        state,
        Msg::LoadFailed {
            session: old,
            reason: "gone".to_string(),
        },
    );
    assert_eq!(state, before);
    assert!(effects.is_empty());
}

#[test]
fn download_requires_a_resolved_slow_link() {
    init_logging();
    let state = resolved_state();
    let before = state.clone();

    let (state, effects) = update(state, Msg::DownloadSelected { index: 1 });
    assert_eq!(state, before);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::DownloadSelected { index: 9 });
    assert_eq!(state, before);
    assert!(effects.is_empty());
}

#[test]
fn opened_results_stay_marked_until_next_search() {
    init_logging();
    let state = resolved_state();
    assert!(state.view().rows.iter().all(|row| !row.visited));

    let (state, _) = select_first(state);
    let (state, _) = update(state, Msg::DownloadSurfaceClosed);
    let visited: Vec<bool> = state.view().rows.iter().map(|row| row.visited).collect();
    assert_eq!(visited, vec![true, false]);

    let (state, _) = update(state, Msg::SearchSubmitted("bar".to_string()));
    assert!(!state.session().is_visited(0));
}

#[test]
fn timer_then_download_link_hands_off() {
    init_logging();
    let (state, session) = select_first(resolved_state());

    let (state, effects) = update(
        state,
        page(
            session,
            PageMessage::Timer {
                payload: "45".to_string(),
            },
        ),
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(Notice::ReadyIn {
            seconds: "45".to_string()
        })]
    );
    assert_eq!(state.candidate().unwrap().countdown(), Some("45"));

    let (state, effects) = update(
        state,
        page(
            session,
            PageMessage::DownloadLink {
                payload: "https://cdn.test/d/abc/Some%20Book.epub?sig=1".to_string(),
            },
        ),
    );
    assert_eq!(
        effects,
        vec![
            Effect::StartDownload {
                session,
                url: "https://cdn.test/d/abc/Some%20Book.epub?sig=1".to_string(),
                file_name: "Some%20Book.epub".to_string(),
            },
            Effect::Notify(Notice::DownloadStarted {
                file_name: "Some%20Book.epub".to_string()
            }),
        ]
    );

    // A second link from the same page is ignored.
    let before = state.clone();
    let (state, effects) = update(
        state,
        page(
            session,
            PageMessage::DownloadLink {
                payload: "https://cdn.test/other.pdf".to_string(),
            },
        ),
    );
    assert_eq!(state, before);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::DownloadFinished {
            session,
            file_name: "Some%20Book.epub".to_string(),
            outcome: DownloadOutcome::Saved {
                path: "/tmp/Some%20Book.epub".to_string(),
            },
        },
    );
    assert_eq!(effects.len(), 1);
    assert!(matches!(
        state.candidate().unwrap().status(),
        DownloadStatus::Saved { .. }
    ));
}

#[test]
fn timer_after_link_is_not_surfaced() {
    init_logging();
    let (state, session) = select_first(resolved_state());
    let (state, _) = update(
        state,
        page(
            session,
            PageMessage::DownloadLink {
                payload: "https://cdn.test/a.pdf".to_string(),
            },
        ),
    );
    let (_state, effects) = update(
        state,
        page(
            session,
            PageMessage::Timer {
                payload: "10".to_string(),
            },
        ),
    );
    assert!(effects.is_empty());
}

#[test]
fn download_messages_from_replaced_candidate_are_stale() {
    init_logging();
    let (state, first) = select_first(resolved_state());
    let (state, second) = select_first(state);
    assert_ne!(first, second);

    let before = state.clone();
    let (state, effects) = update(
        state,
        page(
            first,
            PageMessage::DownloadLink {
                payload: "https://cdn.test/a.pdf".to_string(),
            },
        ),
    );
    assert_eq!(state, before);
    assert!(effects.is_empty());
}

#[test]
fn download_messages_on_scrape_session_are_ignored() {
    init_logging();
    let state = resolved_state();
    let scrape = state.session().id();
    let before = state.clone();
    let (state, effects) = update(
        state,
        page(
            scrape,
            PageMessage::DownloadLink {
                payload: "https://cdn.test/a.pdf".to_string(),
            },
        ),
    );
    assert_eq!(state, before);
    assert!(effects.is_empty());
}

#[test]
fn discovery_timeout_reports_not_found() {
    init_logging();
    let (state, session) = select_first(resolved_state());
    let (state, effects) = update(
        state,
        page(session, PageMessage::DiscoveryTimeout { attempts: 120 }),
    );
    assert_eq!(effects, vec![Effect::Notify(Notice::DownloadLinkNotFound)]);
    assert_eq!(
        state.candidate().unwrap().status(),
        &DownloadStatus::LinkNotFound
    );
    assert_eq!(state.candidate().unwrap().resolved_download_url(), None);
}

#[test]
fn closing_surface_drops_candidate() {
    init_logging();
    let (state, session) = select_first(resolved_state());
    let (state, effects) = update(state, Msg::DownloadSurfaceClosed);
    assert!(state.candidate().is_none());
    assert_eq!(
        effects,
        vec![Effect::CloseSurface {
            slot: SurfaceSlot::Download
        }]
    );

    let (state, effects) = update(
        state,
        page(
            session,
            PageMessage::DownloadLink {
                payload: "https://cdn.test/a.pdf".to_string(),
            },
        ),
    );
    assert!(state.candidate().is_none());
    assert!(effects.is_empty());

    let (_state, effects) = update(state, Msg::DownloadSurfaceClosed);
    assert!(effects.is_empty());
}

#[test]
fn failed_transfer_notifies_once_even_without_candidate() {
    init_logging();
    let (state, session) = select_first(resolved_state());
    let (state, _) = update(state, Msg::DownloadSurfaceClosed);
    let (_state, effects) = update(
        state,
        Msg::DownloadFinished {
            session,
            file_name: "a.pdf".to_string(),
            outcome: DownloadOutcome::Failed {
                reason: "http status 500".to_string(),
            },
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(Notice::DownloadFailed {
            file_name: "a.pdf".to_string(),
            reason: "http status 500".to_string(),
        })]
    );
}
