use chrono::{DateTime, Local};
use scout_core::{AppViewModel, DownloadStatus, LinkStatus, Notice, Phase};

/// Prints only the lines that changed since the previous frame.
#[derive(Default)]
pub struct TerminalRenderer {
    previous: Vec<String>,
}

impl TerminalRenderer {
    pub fn render(&mut self, view: &AppViewModel) {
        let lines = render_lines(view);
        for (i, line) in lines.iter().enumerate() {
            if self.previous.get(i) != Some(line) {
                println!("{line}");
            }
        }
        self.previous = lines;
    }
}

pub fn render_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    if view.phase == Phase::Idle {
        return lines;
    }

    let phase = match view.phase {
        Phase::Idle => "idle",
        Phase::SearchLoading => "searching",
        Phase::ResolvingSlowLinks => "resolving slow links",
        Phase::Done => "done",
    };
    lines.push(format!("Search \"{}\" {}: {}", view.query, view.session, phase));

    for row in &view.rows {
        let status = match &row.status {
            LinkStatus::Pending => "pending".to_string(),
            LinkStatus::Resolving => "resolving...".to_string(),
            LinkStatus::Resolved(link) => link.clone(),
            LinkStatus::NotFound => "no slow link".to_string(),
        };
        let opened = if row.visited { " (opened)" } else { "" };
        lines.push(format!(
            "{:>3}. {} | {}{}",
            row.index + 1,
            row.title,
            status,
            opened
        ));
    }
    if view.phase == Phase::Done && view.rows.is_empty() {
        lines.push("No results.".to_string());
    }

    if let Some(download) = &view.download {
        let status = match &download.status {
            DownloadStatus::Discovering => match &download.countdown {
                Some(countdown) => format!("waiting for link, ready in {countdown} seconds"),
                None => "waiting for link".to_string(),
            },
            DownloadStatus::Downloading { file_name } => format!("downloading {file_name}"),
            DownloadStatus::Saved { path, .. } => format!("saved to {path}"),
            DownloadStatus::Failed { reason, .. } => format!("failed: {reason}"),
            DownloadStatus::LinkNotFound => "download link not found".to_string(),
        };
        lines.push(format!("Download {}: {}", download.source_url, status));
    }
    lines
}

pub fn notice_line(notice: &Notice, at: DateTime<Local>) -> String {
    format!("[{}] {}", at.format("%H:%M:%S"), notice)
}
