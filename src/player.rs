//! Audio backend that hands each verse to an external player process.

use crate::error::ConfigError;
use crate::playback::{AudioBackend, AudioHandle, Cue, PlaybackEvent};
use std::process::Stdio;
use std::str::FromStr;
use std::time::Instant;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

pub const DEFAULT_PLAYER: &str = "mpv --no-video --really-quiet --start={start} {url}";

/// A player invocation with `{url}` and `{start}` placeholders.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerCommand {
    program: String,
    args: Vec<String>,
}

impl FromStr for PlayerCommand {
    type Err = ConfigError;

    fn from_str(template: &str) -> Result<Self, Self::Err> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(ConfigError::EmptyPlayer)?;
        let args: Vec<String> = parts.collect();
        if !args.iter().any(|a| a.contains("{url}")) {
            return Err(ConfigError::MissingUrlPlaceholder(template.to_string()));
        }
        Ok(Self { program, args })
    }
}

impl PlayerCommand {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self, url: &str, start_secs: f64) -> Vec<String> {
        let start = format!("{start_secs:.3}");
        self.args
            .iter()
            .map(|a| a.replace("{url}", url).replace("{start}", &start))
            .collect()
    }
}

pub struct ProcessBackend {
    command: PlayerCommand,
    events: mpsc::UnboundedSender<PlaybackEvent>,
}

impl ProcessBackend {
    pub fn new(command: PlayerCommand, events: mpsc::UnboundedSender<PlaybackEvent>) -> Self {
        Self { command, events }
    }
}

pub struct ProcessHandle {
    kill: Option<oneshot::Sender<()>>,
    started: Instant,
    start_secs: f64,
}

impl AudioHandle for ProcessHandle {
    fn position_secs(&self) -> f64 {
        self.start_secs + self.started.elapsed().as_secs_f64()
    }

    fn halt(&mut self) {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        self.halt();
    }
}

impl AudioBackend for ProcessBackend {
    type Handle = ProcessHandle;

    fn start(&mut self, cue: Cue) -> ProcessHandle {
        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let Cue { token, url, start_secs } = cue;
        let events = self.events.clone();

        let spawned = Command::new(self.command.program())
            .args(self.command.argv(&url, start_secs))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(mut child) => {
                tokio::spawn(async move {
                    // a dropped sender counts as a halt too
                    let status = tokio::select! {
                        status = child.wait() => Some(status),
                        _ = kill_rx => None,
                    };
                    let event = match status {
                        None => {
                            let _ = child.kill().await;
                            return;
                        }
                        Some(Ok(s)) if s.success() => PlaybackEvent::VerseFinished(token),
                        Some(Ok(s)) => {
                            tracing::warn!(url = %url, status = %s, "player exited with failure");
                            PlaybackEvent::VerseFailed(token)
                        }
                        Some(Err(e)) => {
                            tracing::warn!(url = %url, error = %e, "waiting on player failed");
                            PlaybackEvent::VerseFailed(token)
                        }
                    };
                    let _ = events.send(event);
                });
            }
            Err(e) => {
                tracing::warn!(program = self.command.program(), error = %e, "could not start player");
                let _ = events.send(PlaybackEvent::VerseFailed(token));
            }
        }

        ProcessHandle { kill: Some(kill_tx), started: Instant::now(), start_secs }
    }
}
