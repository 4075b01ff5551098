use scout_logging::{scout_debug, scout_info, scout_warn};

use crate::effect::{PageTarget, Script, SurfaceSlot};
use crate::site::{MAX_RESULTS, NOT_FOUND};
use crate::{
    download_file_name, AppState, DownloadOutcome, DownloadStatus, Effect, Inbound, Msg, Notice,
    PageMessage, Phase, SearchResult, SessionId,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SearchSubmitted(raw) => {
            let query = raw.trim();
            if query.is_empty() {
                return (state, Vec::new());
            }
            let session = state.begin_search(query);
            scout_info!("Search {} started for {:?}", session, query);
            state
                .current_target()
                .map(Effect::LoadPage)
                .into_iter()
                .collect()
        }
        Msg::Page { session, message } => match message {
            Inbound::Malformed { raw, reason } => {
                scout_warn!(
                    "Dropping malformed page message from {}: {} (raw_len={})",
                    session,
                    reason,
                    raw.len()
                );
                Vec::new()
            }
            Inbound::Message(message) => route_page_message(&mut state, session, message),
        },
        Msg::LoadFailed { session, reason } => apply_load_failure(&mut state, session, reason),
        Msg::DownloadSelected { index } => select_download(&mut state, index),
        Msg::DownloadSurfaceClosed => match state.drop_candidate() {
            Some(candidate) => {
                scout_debug!("Download surface {} closed", candidate.id());
                vec![Effect::CloseSurface {
                    slot: SurfaceSlot::Download,
                }]
            }
            None => Vec::new(),
        },
        Msg::DownloadFinished {
            session,
            file_name,
            outcome,
        } => {
            // The transfer outlives its surface; report even if the candidate is gone.
            let (status, notice) = match outcome {
                DownloadOutcome::Saved { path } => (
                    DownloadStatus::Saved {
                        file_name: file_name.clone(),
                        path: path.clone(),
                    },
                    Notice::DownloadSucceeded { file_name, path },
                ),
                DownloadOutcome::Failed { reason } => (
                    DownloadStatus::Failed {
                        file_name: file_name.clone(),
                        reason: reason.clone(),
                    },
                    Notice::DownloadFailed { file_name, reason },
                ),
            };
            if let Some(candidate) = state.candidate_mut(session) {
                candidate.status = status;
                state.mark_dirty();
            }
            vec![Effect::Notify(notice)]
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn route_page_message(state: &mut AppState, session: SessionId, message: PageMessage) -> Vec<Effect> {
    if session == state.session().id() {
        return match message {
            PageMessage::InitialResults { payload } => apply_initial_results(state, payload),
            PageMessage::SlowLink { index, payload } => apply_slow_link(state, index, payload),
            other => {
                scout_debug!("Ignoring {} on scrape surface {}", other.kind(), session);
                Vec::new()
            }
        };
    }

    if state.candidate().is_some_and(|candidate| candidate.id() == session) {
        return match message {
            PageMessage::DownloadLink { payload } => apply_download_link(state, session, payload),
            PageMessage::Timer { payload } => apply_timer(state, session, payload),
            PageMessage::DiscoveryTimeout { attempts } => {
                apply_discovery_timeout(state, session, attempts)
            }
            other => {
                scout_debug!("Ignoring {} on download surface {}", other.kind(), session);
                Vec::new()
            }
        };
    }

    scout_debug!("Dropping stale {} from {}", message.kind(), session);
    Vec::new()
}

fn apply_initial_results(state: &mut AppState, mut results: Vec<SearchResult>) -> Vec<Effect> {
    if state.session().phase() != Phase::SearchLoading {
        scout_debug!("Ignoring initial results outside of SearchLoading");
        return Vec::new();
    }

    results.truncate(MAX_RESULTS);
    for result in &mut results {
        result.slow_link = None;
    }
    let count = results.len();

    let session = state.session_mut();
    session.results = results;
    session.current_index = 0;
    session.phase = if count == 0 {
        Phase::Done
    } else {
        Phase::ResolvingSlowLinks
    };
    scout_info!("Search {} returned {} results", session.id, count);
    state.mark_dirty();

    state
        .current_target()
        .map(Effect::LoadPage)
        .into_iter()
        .collect()
}

fn apply_slow_link(state: &mut AppState, index: usize, link: String) -> Vec<Effect> {
    let session = state.session();
    if session.current_index() != Some(index) {
        scout_debug!(
            "Dropping slow link for index {} (current {:?})",
            index,
            session.current_index()
        );
        return Vec::new();
    }
    advance_resolution(state, index, link)
}

fn advance_resolution(state: &mut AppState, index: usize, link: String) -> Vec<Effect> {
    let session = state.session_mut();
    if let Some(result) = session.results.get_mut(index) {
        result.slow_link = Some(link);
    }
    if index + 1 >= session.results.len() {
        session.phase = Phase::Done;
        scout_info!("Search {} resolved all slow links", session.id);
    } else {
        session.current_index = index + 1;
    }
    state.mark_dirty();

    state
        .current_target()
        .map(Effect::LoadPage)
        .into_iter()
        .collect()
}

fn apply_load_failure(state: &mut AppState, session: SessionId, reason: String) -> Vec<Effect> {
    if session == state.session().id() {
        return match state.session().phase() {
            Phase::SearchLoading => {
                scout_warn!("Search {} failed: {}", session, reason);
                state.session_mut().phase = Phase::Done;
                state.mark_dirty();
                vec![Effect::Notify(Notice::SearchFailed { reason })]
            }
            Phase::ResolvingSlowLinks => {
                let index = state.session().current_index;
                scout_warn!("Detail page {} of {} failed: {}", index, session, reason);
                advance_resolution(state, index, NOT_FOUND.to_string())
            }
            Phase::Idle | Phase::Done => Vec::new(),
        };
    }

    if let Some(candidate) = state.candidate_mut(session) {
        if candidate.resolved_download_url.is_none() {
            scout_warn!("Download page {} failed: {}", session, reason);
            candidate.status = DownloadStatus::LinkNotFound;
            state.mark_dirty();
            return vec![Effect::Notify(Notice::DownloadLinkNotFound)];
        }
        return Vec::new();
    }

    scout_debug!("Dropping stale load failure from {}", session);
    Vec::new()
}

fn select_download(state: &mut AppState, index: usize) -> Vec<Effect> {
    let Some(source_url) = state
        .session()
        .results()
        .get(index)
        .filter(|result| result.has_slow_link())
        .and_then(|result| result.slow_link.clone())
    else {
        scout_debug!("Result {} has no slow link to download", index);
        return Vec::new();
    };

    state.session_mut().visited.insert(index);
    let session = state.begin_candidate(&source_url);
    scout_info!("Download discovery {} started for result {}", session, index);
    vec![Effect::LoadPage(PageTarget {
        session,
        slot: SurfaceSlot::Download,
        url: source_url,
        script: Script::DownloadDiscovery,
    })]
}

fn apply_download_link(state: &mut AppState, session: SessionId, url: String) -> Vec<Effect> {
    let Some(candidate) = state.candidate_mut(session) else {
        return Vec::new();
    };
    if candidate.resolved_download_url.is_some() {
        scout_debug!("Download link for {} already resolved", session);
        return Vec::new();
    }

    let file_name = download_file_name(&url);
    candidate.resolved_download_url = Some(url.clone());
    candidate.status = DownloadStatus::Downloading {
        file_name: file_name.clone(),
    };
    state.mark_dirty();
    scout_info!("Download link resolved for {}: {}", session, url);

    vec![
        Effect::StartDownload {
            session,
            url,
            file_name: file_name.clone(),
        },
        Effect::Notify(Notice::DownloadStarted { file_name }),
    ]
}

fn apply_timer(state: &mut AppState, session: SessionId, text: String) -> Vec<Effect> {
    let Some(candidate) = state.candidate_mut(session) else {
        return Vec::new();
    };
    if candidate.resolved_download_url.is_some() || candidate.countdown.is_some() {
        return Vec::new();
    }
    candidate.countdown = Some(text.clone());
    state.mark_dirty();
    vec![Effect::Notify(Notice::ReadyIn { seconds: text })]
}

fn apply_discovery_timeout(state: &mut AppState, session: SessionId, attempts: u32) -> Vec<Effect> {
    let Some(candidate) = state.candidate_mut(session) else {
        return Vec::new();
    };
    if candidate.resolved_download_url.is_some() {
        return Vec::new();
    }
    scout_warn!(
        "Download discovery {} gave up after {} attempts",
        session,
        attempts
    );
    candidate.status = DownloadStatus::LinkNotFound;
    state.mark_dirty();
    vec![Effect::Notify(Notice::DownloadLinkNotFound)]
}
