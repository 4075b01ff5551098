use std::time::Duration;

use anyhow::{bail, Result};
use scout_core::{update, AppState, DownloadStatus, Msg, Phase};
use scout_logging::scout_info;

use crate::effects::EffectRunner;
use crate::render::TerminalRenderer;

const EVENT_WAIT: Duration = Duration::from_millis(75);

pub struct App {
    state: AppState,
    effects: EffectRunner,
    renderer: TerminalRenderer,
}

impl App {
    pub fn new(state: AppState, effects: EffectRunner) -> Self {
        Self {
            state,
            effects,
            renderer: TerminalRenderer::default(),
        }
    }

    /// Runs the search for `query` until every row is settled.
    pub fn search(&mut self, query: &str) -> Result<()> {
        if query.trim().is_empty() {
            bail!("search query is empty");
        }
        self.dispatch(Msg::SearchSubmitted(query.to_string()));
        while self.state.session().phase() != Phase::Done {
            self.pump()?;
        }
        scout_info!(
            "Search {} finished with {} results",
            self.state.session().id(),
            self.state.session().results().len()
        );
        Ok(())
    }

    /// Downloads the slow link of the 1-based result `number`.
    pub fn download(&mut self, number: usize) -> Result<()> {
        let Some(index) = number.checked_sub(1) else {
            bail!("result numbers start at 1");
        };
        self.dispatch(Msg::DownloadSelected { index });
        if self.state.candidate().is_none() {
            bail!("result {number} has no slow download link");
        }

        loop {
            match self.state.candidate().map(|candidate| candidate.status()) {
                Some(DownloadStatus::Saved { .. }) => return Ok(()),
                Some(DownloadStatus::Failed { file_name, reason }) => {
                    bail!("download of {file_name} failed: {reason}")
                }
                Some(DownloadStatus::LinkNotFound) => bail!("download link not found"),
                Some(DownloadStatus::Discovering | DownloadStatus::Downloading { .. }) => {
                    self.pump()?
                }
                None => bail!("download was abandoned"),
            }
        }
    }

    pub fn close_download(&mut self) {
        if self.state.candidate().is_some() {
            self.dispatch(Msg::DownloadSurfaceClosed);
        }
    }

    fn pump(&mut self) -> Result<()> {
        let msg = self.effects.next_msg(EVENT_WAIT)?.unwrap_or(Msg::Tick);
        self.dispatch(msg);
        Ok(())
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.effects.enqueue(effects);
        if was_dirty {
            self.renderer.render(&self.state.view());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use scout_core::AppState;
    use scout_engine::{
        BrowserSurface, DownloadError, Downloader, EngineHandle, EngineStopped, LoadError,
        PageSnapshot, PollSettings,
    };

    use super::App;
    use crate::effects::EffectRunner;

    struct BlankSurface;

    #[async_trait::async_trait]
    impl BrowserSurface for BlankSurface {
        async fn load(&self, url: &str) -> Result<PageSnapshot, LoadError> {
            Ok(PageSnapshot {
                url: url.to_string(),
                html: String::new(),
            })
        }
    }

    struct NoDownloads;

    #[async_trait::async_trait]
    impl Downloader for NoDownloads {
        async fn download(&self, _url: &str, _file_name: &str) -> Result<PathBuf, DownloadError> {
            Err(DownloadError::HttpStatus(404))
        }
    }

    #[test]
    fn search_fails_once_the_engine_is_gone() {
        let engine = EngineHandle::with_parts(
            Arc::new(BlankSurface),
            Arc::new(NoDownloads),
            PollSettings::default(),
        );
        engine.shutdown();
        let mut app = App::new(
            AppState::with_base_url("https://x.test"),
            EffectRunner::new(engine),
        );

        let err = app.search("rust").unwrap_err();

        assert_eq!(err.downcast_ref::<EngineStopped>(), Some(&EngineStopped));
    }
}
