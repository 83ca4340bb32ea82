//! Sequential playback of a chapter's verses.
//!
//! The controller never waits on audio itself. It starts one verse through
//! an [`AudioBackend`] and then reacts to [`PlaybackEvent`]s reported for
//! that verse. Every started verse carries a fresh [`CueToken`]; events for
//! any other token belong to audio that was already halted and are dropped.

use crate::models::Chapter;
use crate::notify::{Notifier, msg};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CueToken(pub u64);

/// What the backend is asked to play.
#[derive(Clone, Debug, PartialEq)]
pub struct Cue {
    pub token: CueToken,
    pub url: String,
    pub start_secs: f64,
}

/// A live audio resource.
pub trait AudioHandle {
    /// Playback position in seconds from the start of the file.
    fn position_secs(&self) -> f64;
    /// Stop immediately. Must not report an event afterwards.
    fn halt(&mut self);
}

pub trait AudioBackend {
    type Handle: AudioHandle;

    /// Begin playing `cue`. Completion or failure is reported later as a
    /// [`PlaybackEvent`] tagged with `cue.token`.
    fn start(&mut self, cue: Cue) -> Self::Handle;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    VerseFinished(CueToken),
    VerseFailed(CueToken),
    StopRequested,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackState {
    Idle,
    Playing { chapter: Chapter, verse: usize },
}

struct Active<H> {
    token: CueToken,
    handle: H,
}

/// The one piece of audio state the program has.
pub struct PlaybackSession<H> {
    active: Option<Active<H>>,
    resume_offset_secs: f64,
}

impl<H: AudioHandle> PlaybackSession<H> {
    pub fn new() -> Self {
        Self { active: None, resume_offset_secs: 0.0 }
    }

    /// A session whose first play starts `secs` into the first verse.
    pub fn resuming_at(secs: f64) -> Self {
        Self { active: None, resume_offset_secs: secs.max(0.0) }
    }

    pub fn resume_offset_secs(&self) -> f64 {
        self.resume_offset_secs
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn current_token(&self) -> Option<CueToken> {
        self.active.as_ref().map(|a| a.token)
    }

    /// Halt whatever is playing without remembering where it was.
    fn interrupt(&mut self) {
        if let Some(mut a) = self.active.take() {
            a.handle.halt();
        }
    }

    /// Halt and remember the position for the next play.
    fn halt_and_remember(&mut self) {
        if let Some(mut a) = self.active.take() {
            self.resume_offset_secs = a.handle.position_secs();
            a.handle.halt();
        }
    }
}

impl<H: AudioHandle> Default for PlaybackSession<H> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PlaybackController<B: AudioBackend, N> {
    session: PlaybackSession<B::Handle>,
    backend: B,
    notifier: N,
    state: PlaybackState,
    next_token: u64,
}

impl<B: AudioBackend, N: Notifier> PlaybackController<B, N> {
    pub fn new(session: PlaybackSession<B::Handle>, backend: B, notifier: N) -> Self {
        Self { session, backend, notifier, state: PlaybackState::Idle, next_token: 0 }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn session(&self) -> &PlaybackSession<B::Handle> {
        &self.session
    }

    pub fn play(&mut self, chapter: &Chapter) {
        if matches!(self.state, PlaybackState::Playing { .. }) {
            tracing::debug!("interrupting current chapter");
            self.session.interrupt();
        }
        self.notifier.show_banner(&msg::now_playing(&chapter.name));
        self.state = PlaybackState::Playing { chapter: chapter.clone(), verse: 0 };
        // the offset is carried over from the last stop, whichever chapter that was
        let offset = self.session.resume_offset_secs;
        self.start_verse(0, offset);
    }

    pub fn stop(&mut self) {
        if !matches!(self.state, PlaybackState::Playing { .. }) {
            return;
        }
        self.session.halt_and_remember();
        tracing::debug!(offset = self.session.resume_offset_secs, "stopped");
        self.state = PlaybackState::Idle;
        self.notifier.hide_banner();
        self.notifier.alert(msg::STOPPED);
    }

    pub fn handle(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::StopRequested => self.stop(),
            PlaybackEvent::VerseFinished(token) => {
                if self.is_current(token) {
                    self.advance();
                }
            }
            PlaybackEvent::VerseFailed(token) => {
                if self.is_current(token) {
                    if let PlaybackState::Playing { verse, .. } = self.state {
                        tracing::warn!(verse = verse + 1, "verse audio failed to load");
                        self.notifier.toast(&msg::verse_failed(verse + 1));
                    }
                    self.advance();
                }
            }
        }
    }

    fn is_current(&self, token: CueToken) -> bool {
        let current = self.session.current_token() == Some(token);
        if !current {
            tracing::debug!(?token, "ignoring event for halted verse");
        }
        current
    }

    fn advance(&mut self) {
        self.session.active = None;
        let next = match &self.state {
            PlaybackState::Playing { verse, .. } => verse + 1,
            PlaybackState::Idle => return,
        };
        self.start_verse(next, 0.0);
    }

    fn start_verse(&mut self, index: usize, start_secs: f64) {
        let PlaybackState::Playing { chapter, verse } = &mut self.state else {
            return;
        };
        let Some(v) = chapter.verses.get(index) else {
            tracing::debug!(chapter = %chapter.name, "chapter finished");
            self.state = PlaybackState::Idle;
            self.notifier.hide_banner();
            return;
        };
        *verse = index;
        let url = v.audio_url.clone();

        self.next_token += 1;
        let token = CueToken(self.next_token);
        tracing::debug!(verse = index + 1, %url, start_secs, "starting verse");
        let handle = self.backend.start(Cue { token, url, start_secs });
        self.session.active = Some(Active { token, handle });
    }
}
