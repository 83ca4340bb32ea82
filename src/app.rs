//! Interactive session: the reader picker, the chapter list and its
//! buttons, driven by typed commands.

use crate::api::{ChapterSource, load_chapters};
use crate::download::{Downloader, download_chapter};
use crate::lookup;
use crate::models::Chapter;
use crate::notify::{Notifier, msg};
use crate::playback::{AudioBackend, PlaybackController, PlaybackEvent};
use crate::render::{ListView, render};
use crate::search::search;
use owo_colors::OwoColorize;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Reader(String),
    Search(String),
    List,
    Play(usize),
    Stop,
    Download(usize),
    Prayer(bool),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let ordinal = |what: &str| -> Result<usize, String> {
            match rest.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(format!("usage: {what} <number>")),
            }
        };
        match head {
            "reader" | "r" if !rest.is_empty() => Ok(Command::Reader(rest.to_string())),
            "reader" | "r" => Err("usage: reader <id|name>".into()),
            "search" | "s" | "/" => Ok(Command::Search(rest.to_string())),
            "list" | "ls" => Ok(Command::List),
            "play" | "p" => ordinal("play").map(Command::Play),
            "stop" => Ok(Command::Stop),
            "download" | "dl" => ordinal("download").map(Command::Download),
            "prayer" => match rest {
                "" | "open" => Ok(Command::Prayer(true)),
                "close" => Ok(Command::Prayer(false)),
                _ => Err("usage: prayer open|close".into()),
            },
            "help" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command `{other}`, try `help`")),
        }
    }
}

pub const HELP: &str = "\
reader <id|name>   switch reciter and reload the list
search [text]      show chapters whose name contains text
list               show the current list again
play <n>           play chapter n of the list
stop               stop playback (next play resumes from here)
download <n>       save every verse of chapter n
prayer open|close  prayer times panel
quit";

/// Everything the page held: current reader, displayed list and the parts
/// that act on it.
pub struct Session<S, B: AudioBackend, N, V, D> {
    source: S,
    reader: String,
    shown: Vec<Chapter>,
    player: PlaybackController<B, N>,
    notifier: N,
    view: V,
    downloader: D,
    prayer_open: bool,
}

impl<S, B, N, V, D> Session<S, B, N, V, D>
where
    S: ChapterSource,
    B: AudioBackend,
    N: Notifier + Clone,
    V: ListView,
    D: Downloader,
{
    pub fn new(source: S, reader: String, backend: B, notifier: N, view: V, downloader: D) -> Self {
        let player = PlaybackController::new(Default::default(), backend, notifier.clone());
        Self { source, reader, shown: Vec::new(), player, notifier, view, downloader, prayer_open: false }
    }

    pub fn reader(&self) -> &str {
        &self.reader
    }

    pub fn shown(&self) -> &[Chapter] {
        &self.shown
    }

    pub fn player(&self) -> &PlaybackController<B, N> {
        &self.player
    }

    pub fn downloader_mut(&mut self) -> &mut D {
        &mut self.downloader
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub async fn select_reader(&mut self, reader: String) {
        tracing::info!(%reader, "reader selected");
        self.reader = reader;
        self.shown = load_chapters(&self.source, &self.reader, &mut self.notifier).await;
        render(&mut self.view, &self.shown);
    }

    /// The `reader` command: ids are taken as-is, names are looked up first.
    /// An unknown name leaves the current reader and list alone.
    pub async fn switch_reader(&mut self, spec: &str) {
        match lookup::reader_id(&self.source, spec).await {
            Ok(id) => self.select_reader(id).await,
            Err(e) => {
                tracing::warn!(spec, error = ?e, "reader lookup failed");
                eprintln!("{}", format!("{e:#}").yellow());
            }
        }
    }

    pub fn on_playback(&mut self, event: PlaybackEvent) {
        self.player.handle(event);
    }

    /// Returns false once the user asked to leave.
    pub async fn apply(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Reader(r) => self.switch_reader(&r).await,
            Command::Search(q) => {
                self.shown =
                    search(&self.source, &self.reader, &q, &mut self.notifier, &mut self.view).await;
            }
            Command::List => render(&mut self.view, &self.shown),
            Command::Play(n) => match n.checked_sub(1).and_then(|i| self.shown.get(i)) {
                Some(c) => self.player.play(c),
                None => self.no_such_chapter(n),
            },
            Command::Stop => self.player.stop(),
            Command::Download(n) => match n.checked_sub(1).and_then(|i| self.shown.get(i)) {
                Some(c) => download_chapter(&mut self.downloader, c, &mut self.notifier),
                None => self.no_such_chapter(n),
            },
            Command::Prayer(open) => {
                if open != self.prayer_open {
                    self.prayer_open = open;
                    show_prayer_panel(open);
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => {
                self.player.stop();
                return false;
            }
        }
        true
    }

    fn no_such_chapter(&self, n: usize) {
        eprintln!("{} {}", "no chapter".red(), n.to_string().bold());
    }
}

fn show_prayer_panel(open: bool) {
    if open {
        println!("{}", msg::PRAYER_TIMES.bold().cyan());
        println!("{}", "prayer close".dimmed());
    } else {
        println!("{}", "—".dimmed());
    }
}

/// Read commands from stdin and playback events until the user quits or
/// stdin closes.
pub async fn run<S, B, N, V, D>(
    mut session: Session<S, B, N, V, D>,
    mut events: mpsc::UnboundedReceiver<PlaybackEvent>,
) -> anyhow::Result<Session<S, B, N, V, D>>
where
    S: ChapterSource,
    B: AudioBackend,
    N: Notifier + Clone,
    V: ListView,
    D: Downloader,
{
    let reader = session.reader().to_string();
    session.select_reader(reader).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(cmd) => {
                        if !session.apply(cmd).await {
                            break;
                        }
                    }
                    Err(e) => eprintln!("{}", e.yellow()),
                }
            }
            Some(event) = events.recv() => session.on_playback(event),
        }
    }
    session.player.stop();
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeSource;
    use crate::download::fake::Calls;
    use crate::models::{Reader, chapter};
    use crate::notify::recorder::Recorder;
    use crate::playback::PlaybackState;
    use crate::playback::fake::FakeBackend;
    use crate::render::fake::Screen;

    type TestSession = Session<FakeSource, FakeBackend, Recorder, Screen, Calls>;

    fn session(source: FakeSource) -> (TestSession, FakeBackend, Recorder) {
        let backend = FakeBackend::default();
        let rec = Recorder::default();
        let s = Session::new(
            source,
            "ar.abdulbasitmurattal".into(),
            backend.clone(),
            rec.clone(),
            Screen::default(),
            Calls::default(),
        );
        (s, backend, rec)
    }

    fn sample() -> Vec<Chapter> {
        vec![chapter("al-fatiha", 7), chapter("al-baqara", 3), chapter("an-nas", 6)]
    }

    fn cmd(line: &str) -> Result<Command, String> {
        line.parse()
    }

    #[test]
    fn commands_parse() {
        assert_eq!(cmd("play 3"), Ok(Command::Play(3)));
        assert_eq!(cmd("  dl 1 "), Ok(Command::Download(1)));
        assert_eq!(cmd("search"), Ok(Command::Search(String::new())));
        assert_eq!(cmd("s al fat"), Ok(Command::Search("al fat".into())));
        assert_eq!(cmd("reader ar.alafasy"), Ok(Command::Reader("ar.alafasy".into())));
        assert_eq!(cmd("prayer close"), Ok(Command::Prayer(false)));
        assert_eq!(cmd("stop"), Ok(Command::Stop));
        assert!(cmd("play 0").is_err());
        assert!(cmd("play x").is_err());
        assert!(cmd("reader").is_err());
        assert!(cmd("dance").is_err());
    }

    #[tokio::test]
    async fn ordinals_follow_the_displayed_list() {
        let (mut s, backend, _rec) = session(FakeSource::ok(sample()));
        s.select_reader("ar.alafasy".into()).await;
        assert_eq!(s.view_mut().shown.len(), 3);

        s.apply(Command::Search("nas".into())).await;
        assert_eq!(s.shown().len(), 1);
        s.apply(Command::Play(1)).await;

        let started = backend.0.borrow().started[0].url.clone();
        assert_eq!(started, chapter("an-nas", 6).verses[0].audio_url);
        assert!(matches!(s.player().state(), PlaybackState::Playing { .. }));
    }

    #[tokio::test]
    async fn download_and_stop_go_through_their_components() {
        let (mut s, _backend, rec) = session(FakeSource::ok(sample()));
        s.select_reader("ar.alafasy".into()).await;
        s.apply(Command::Download(2)).await;
        assert_eq!(s.downloader_mut().0.len(), 3);
        assert_eq!(s.downloader_mut().0[2].1, "al-baqara_verse_3.mp3");

        s.apply(Command::Play(1)).await;
        s.apply(Command::Stop).await;
        assert_eq!(s.player().state(), &PlaybackState::Idle);
        assert!(rec.alerts().contains(&msg::STOPPED.to_string()));
    }

    #[tokio::test]
    async fn out_of_range_ordinal_does_nothing() {
        let (mut s, backend, rec) = session(FakeSource::ok(sample()));
        s.select_reader("ar.alafasy".into()).await;
        assert!(s.apply(Command::Play(9)).await);
        assert!(s.apply(Command::Download(9)).await);
        assert!(backend.0.borrow().started.is_empty());
        assert!(rec.notes().is_empty());
    }

    #[tokio::test]
    async fn failed_reader_load_clears_the_list() {
        let (mut s, _backend, rec) = session(FakeSource::failing());
        s.select_reader("ar.nobody".into()).await;
        assert!(s.shown().is_empty());
        assert_eq!(s.view_mut().draws, 1);
        assert_eq!(rec.alerts(), vec![msg::LOAD_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn quit_stops_playback() {
        let (mut s, backend, _rec) = session(FakeSource::ok(sample()));
        s.select_reader("ar.alafasy".into()).await;
        s.apply(Command::Play(1)).await;
        assert!(!s.apply(Command::Quit).await);
        assert_eq!(backend.0.borrow().live, 0);
    }

    fn alafasy() -> Reader {
        Reader {
            identifier: "ar.alafasy".into(),
            name: "مشاري العفاسي".into(),
            english_name: "Alafasy".into(),
            language: "ar".into(),
        }
    }

    #[tokio::test]
    async fn reader_command_accepts_a_name() {
        let source = FakeSource::ok(sample()).with_readers(vec![alafasy()]);
        let (mut s, _backend, rec) = session(source);
        assert!(s.apply(cmd("reader Alafasy").unwrap()).await);

        assert_eq!(s.reader(), "ar.alafasy");
        assert_eq!(s.shown().len(), 3);
        assert!(rec.alerts().is_empty());

        s.apply(cmd("reader مشاري العفاسي").unwrap()).await;
        assert_eq!(s.reader(), "ar.alafasy");
    }

    #[tokio::test]
    async fn reader_command_passes_ids_through() {
        let (mut s, _backend, _rec) = session(FakeSource::ok(sample()));
        s.apply(cmd("reader ar.minshawi").unwrap()).await;
        assert_eq!(s.reader(), "ar.minshawi");
    }

    #[tokio::test]
    async fn unknown_reader_name_keeps_the_current_list() {
        let source = FakeSource::ok(sample()).with_readers(vec![alafasy()]);
        let (mut s, _backend, rec) = session(source);
        s.select_reader("ar.abdulbasitmurattal".into()).await;
        s.apply(cmd("reader Sudais").unwrap()).await;

        assert_eq!(s.reader(), "ar.abdulbasitmurattal");
        assert_eq!(s.shown().len(), 3);
        assert!(rec.alerts().is_empty());
    }
}
