use crate::models::Chapter;
use crate::notify::msg;
use owo_colors::OwoColorize;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Play,
    Stop,
    Download,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Play, Action::Stop, Action::Download];

    pub fn label(self) -> &'static str {
        match self {
            Action::Play => msg::PLAY,
            Action::Stop => msg::STOP,
            Action::Download => msg::DOWNLOAD,
        }
    }

    /// The session command that triggers this action.
    pub fn command(self) -> &'static str {
        match self {
            Action::Play => "play",
            Action::Stop => "stop",
            Action::Download => "download",
        }
    }
}

/// One displayed line of the chapter list.
#[derive(Clone, Debug, PartialEq)]
pub struct ChapterRow {
    pub ordinal: usize,
    pub name: String,
    pub english_name: String,
    pub verse_count: usize,
    pub actions: [Action; 3],
}

pub fn rows(chapters: &[Chapter]) -> Vec<ChapterRow> {
    chapters
        .iter()
        .enumerate()
        .map(|(i, c)| ChapterRow {
            ordinal: i + 1,
            name: c.name.clone(),
            english_name: c.english_name.clone(),
            verse_count: c.verse_count(),
            actions: Action::ALL,
        })
        .collect()
}

/// A display that shows exactly the last list it was given.
pub trait ListView {
    fn replace(&mut self, rows: Vec<ChapterRow>);
}

pub fn render<V: ListView>(view: &mut V, chapters: &[Chapter]) {
    view.replace(rows(chapters));
}

#[derive(Debug, Default)]
pub struct TerminalList;

impl ListView for TerminalList {
    fn replace(&mut self, rows: Vec<ChapterRow>) {
        for r in rows {
            let id_text = format!("{:>3}.", r.ordinal);
            let count_text = msg::verse_count(r.verse_count);
            let actions = r
                .actions
                .iter()
                .map(|a| format!("[{} {}]", a.label(), a.command()))
                .collect::<Vec<_>>()
                .join(" ");
            if r.english_name.is_empty() {
                println!(
                    "{}  {} {}  {}",
                    id_text.magenta().bold(),
                    r.name.bold(),
                    count_text.dimmed(),
                    actions.bright_black(),
                );
            } else {
                let english_text = format!("[{}]", r.english_name);
                println!(
                    "{}  {} {} {}  {}",
                    id_text.magenta().bold(),
                    r.name.bold(),
                    english_text.dimmed(),
                    count_text.dimmed(),
                    actions.bright_black(),
                );
            }
        }
    }
}
