use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

// ✨ colors
use owo_colors::OwoColorize;

mod api;
mod app;
mod config;
mod download;
mod error;
mod lookup;
mod models;
mod notify;
mod playback;
mod player;
mod render;
mod search;
#[cfg(test)]
mod testutil;

use api::{ChapterSource, QuranApi};
use config::Config;
use download::FileDownloader;
use models::Chapter;
use notify::TerminalNotifier;
use playback::{PlaybackController, PlaybackEvent, PlaybackSession, PlaybackState};
use player::ProcessBackend;
use render::TerminalList;

#[derive(Parser)]
#[command(
    name = "tilawa",
    version,
    about = "Pick a reciter, play surahs ayah by ayah, search and download",
    // clap colors are for help/usage; our runtime colors handled by owo-colors
    color = clap::ColorChoice::Auto
)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Without a subcommand an interactive session starts
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Interactive session (the default)
    Session,
    /// List reciters with verse-by-verse audio
    Readers,
    /// List the chapters of the reader
    Ls,
    /// List chapters whose name contains QUERY
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// Play one chapter; Ctrl-C stops
    Play {
        /// Ordinal in the list, part of the name, or the english name
        chapter: String,
        /// Start the first verse this many seconds in
        #[arg(long, default_value_t = 0.0)]
        start: f64,
    },
    /// Save every verse of a chapter as {name}_verse_{n}.mp3
    Download {
        /// Ordinal in the list, part of the name, or the english name
        chapter: String,
    },
}

// ---------- small helpers ----------
fn label(s: &str) -> String {
    s.dimmed().to_string()
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tilawa=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::env::var_os("NO_COLOR").is_none())
        .with_target(false)
        .init();
}

async fn resolve_reader(api: &QuranApi, spec: &str) -> Result<String> {
    lookup::reader_id(api, spec)
        .await
        .with_context(|| format!("{} {}", "Unknown reader:".red().bold(), spec.bold()))
}

async fn pick_chapter(api: &QuranApi, reader: &str, spec: &str) -> Result<Chapter> {
    let chapters = api
        .fetch_chapters(reader)
        .await
        .with_context(|| format!("loading chapters for {reader} failed"))?;
    lookup::resolve_chapter(&chapters, spec)
        .cloned()
        .with_context(|| format!("{} {}", "Unknown chapter:".red().bold(), spec.bold()))
}

// ---------- main ----------
#[tokio::main]
async fn main() -> Result<()> {
    // Respect NO_COLOR if the user wants plain output (owo-colors honors OWO_COLORS=0)
    if std::env::var_os("NO_COLOR").is_some() {
        unsafe {
            std::env::set_var("OWO_COLORS", "0");
        }
    }
    init_logging();

    let cli = Cli::parse();
    let cfg = cli.config;
    let api = QuranApi::new(Client::new(), cfg.api_base.clone());

    match cli.cmd.unwrap_or(Cmd::Session) {
        Cmd::Session => {
            let reader = resolve_reader(&api, &cfg.reader).await?;
            let (tx, rx) = mpsc::unbounded_channel();
            let backend = ProcessBackend::new(cfg.player.clone(), tx);
            let downloader = FileDownloader::new(api.client().clone(), cfg.out_dir());

            println!("{} {}", label("Reader:"), reader.bold().magenta());
            println!("{}", label("type `help` for commands"));

            let session = app::Session::new(
                api.clone(),
                reader,
                backend,
                TerminalNotifier,
                TerminalList,
                downloader,
            );
            let mut session = app::run(session, rx).await?;

            let downloads = session.downloader_mut();
            if downloads.pending() > 0 {
                println!("{} {}", label("Finishing downloads into"), downloads.dir().display().bold().blue());
                downloads.finish().await;
            }
        }

        Cmd::Readers => {
            let rs = api.fetch_readers().await.context("listing readers failed")?;
            println!("{}", "Readers".bold().magenta());
            for r in rs {
                let id_text = format!("{:<28}", r.identifier);
                let english_text = format!("({})", r.english_name);
                println!(
                    "{}  {}  {}",
                    id_text.magenta().bold(),
                    r.name.bold(),
                    english_text.dimmed(),
                );
            }
        }

        Cmd::Ls => {
            let reader = resolve_reader(&api, &cfg.reader).await?;
            let mut notifier = TerminalNotifier;
            let chapters = api::load_chapters(&api, &reader, &mut notifier).await;
            println!("{} {}", "Chapters".bold().cyan(), reader.dimmed());
            render::render(&mut TerminalList, &chapters);
        }

        Cmd::Search { query } => {
            let reader = resolve_reader(&api, &cfg.reader).await?;
            let mut notifier = TerminalNotifier;
            let found = search::search(&api, &reader, &query, &mut notifier, &mut TerminalList).await;
            if found.is_empty() {
                println!("{}", label("no chapters match"));
            }
        }

        Cmd::Play { chapter, start } => {
            let reader = resolve_reader(&api, &cfg.reader).await?;
            let c = pick_chapter(&api, &reader, &chapter).await?;
            println!(
                "   {} {}  {} {}",
                label("Reader:"),
                reader.bold().magenta(),
                label("Verses:"),
                c.verse_count().to_string().bold()
            );

            let (tx, mut rx) = mpsc::unbounded_channel();
            let backend = ProcessBackend::new(cfg.player.clone(), tx);
            let mut player =
                PlaybackController::new(PlaybackSession::resuming_at(start), backend, TerminalNotifier);
            player.play(&c);

            while !matches!(player.state(), PlaybackState::Idle) {
                tokio::select! {
                    Some(event) = rx.recv() => player.handle(event),
                    _ = tokio::signal::ctrl_c() => player.handle(PlaybackEvent::StopRequested),
                }
            }
            let offset = player.session().resume_offset_secs();
            if offset > 0.0 {
                println!("{} {}", label("Resume with --start"), format!("{offset:.1}").bold());
            }
        }

        Cmd::Download { chapter } => {
            let reader = resolve_reader(&api, &cfg.reader).await?;
            let c = pick_chapter(&api, &reader, &chapter).await?;
            let out = cfg.out_dir();
            println!(
                "{} {} {}",
                label("Downloading →"),
                c.name.bold().cyan(),
                format!("({})", c.english_name).dimmed()
            );
            println!("   {} {}", label("Folder:"), out.display().bold().blue());

            let mut downloader = FileDownloader::new(api.client().clone(), &out);
            download::download_chapter(&mut downloader, &c, &mut TerminalNotifier);
            downloader.finish().await;

            println!("{} {} {}", "✔".green().bold(), "Saved under".bold(), out.display().bold().blue());
        }
    }

    Ok(())
}
