use crate::models::Chapter;
use crate::notify::{Notifier, msg};
use anyhow::Context;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tokio::{fs, io::AsyncWriteExt};

/// Starts saving one file. Nothing comes back to the caller.
pub trait Downloader {
    fn download_one(&mut self, url: &str, filename: &str);
}

pub fn verse_filename(chapter: &str, ordinal: usize) -> String {
    format!("{chapter}_verse_{ordinal}.mp3")
}

/// Queue every verse of `chapter`, then confirm once.
pub fn download_chapter<D, N>(downloader: &mut D, chapter: &Chapter, notifier: &mut N)
where
    D: Downloader,
    N: Notifier,
{
    for (i, verse) in chapter.verses.iter().enumerate() {
        downloader.download_one(&verse.audio_url, &verse_filename(&chapter.name, i + 1));
    }
    notifier.alert(&msg::download_started(&chapter.name));
}

/// Saves into a directory, one background task per file.
pub struct FileDownloader {
    client: reqwest::Client,
    dir: PathBuf,
    tasks: JoinSet<()>,
}

impl FileDownloader {
    pub fn new(client: reqwest::Client, dir: impl Into<PathBuf>) -> Self {
        Self { client, dir: dir.into(), tasks: JoinSet::new() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every queued file, with a progress bar.
    pub async fn finish(&mut self) {
        let total = self.tasks.len() as u64;
        if total == 0 {
            return;
        }
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template("{spinner} {pos}/{len} {wide_bar} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(self.dir.display().to_string());
        while let Some(res) = self.tasks.join_next().await {
            if let Err(e) = res {
                tracing::warn!(error = %e, "download task panicked");
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
    }
}

// chapter names come from the api; keep them inside the output dir
fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect()
}

async fn save(client: &reqwest::Client, url: &str, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let resp = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .with_context(|| format!("GET {url}"))?;
    let mut f = fs::File::create(path)
        .await
        .with_context(|| format!("create {}", path.display()))?;
    let mut s = resp.bytes_stream();
    while let Some(chunk) = s.next().await {
        f.write_all(&chunk?).await?;
    }
    f.flush().await?;
    Ok(())
}

impl Downloader for FileDownloader {
    fn download_one(&mut self, url: &str, filename: &str) {
        let client = self.client.clone();
        let url = url.to_string();
        let path = self.dir.join(safe_filename(filename));
        self.tasks.spawn(async move {
            match save(&client, &url, &path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "saved"),
                Err(e) => tracing::warn!(%url, error = ?e, "download failed"),
            }
        });
    }
}


#[cfg(test)]
mod tests {
    use super::fake::Calls;
    use super::*;
    use crate::models::chapter;
    use crate::notify::recorder::Recorder;
    use crate::testutil::serve;

    #[test]
    fn one_call_per_verse_with_numbered_names() {
        let ch = chapter("الفاتحة", 7);
        let mut calls = Calls::default();
        let mut rec = Recorder::default();
        download_chapter(&mut calls, &ch, &mut rec);

        assert_eq!(calls.0.len(), 7);
        for (i, (url, name)) in calls.0.iter().enumerate() {
            assert_eq!(url, &ch.verses[i].audio_url);
            assert_eq!(name, &format!("الفاتحة_verse_{}.mp3", i + 1));
        }
        assert_eq!(rec.alerts(), vec![msg::download_started("الفاتحة")]);
    }

    #[test]
    fn empty_chapter_still_confirms() {
        let mut calls = Calls::default();
        let mut rec = Recorder::default();
        download_chapter(&mut calls, &chapter("x", 0), &mut rec);
        assert!(calls.0.is_empty());
        assert_eq!(rec.alerts().len(), 1);
    }

    #[test]
    fn separators_are_replaced() {
        assert_eq!(safe_filename("../a/b_verse_1.mp3"), ".._a_b_verse_1.mp3");
    }

    #[tokio::test]
    async fn files_land_in_the_output_dir() {
        let base = serve(vec![b"ID3audio".to_vec()]).await;
        let dir = tempfile::tempdir().unwrap();
        let mut d = FileDownloader::new(reqwest::Client::new(), dir.path());
        d.download_one(&format!("{base}/1.mp3"), "الناس_verse_1.mp3");
        assert_eq!(d.pending(), 1);
        d.finish().await;

        let got = std::fs::read(dir.path().join("الناس_verse_1.mp3")).unwrap();
        assert_eq!(got, b"ID3audio");
    }

    #[tokio::test]
    async fn failed_download_is_silent() {
        // no bodies queued: the stub answers 404
        let base = serve(Vec::new()).await;
        let dir = tempfile::tempdir().unwrap();
        let mut d = FileDownloader::new(reqwest::Client::new(), dir.path());
        d.download_one(&format!("{base}/1.mp3"), "x_verse_1.mp3");
        d.finish().await;
        assert!(!dir.path().join("x_verse_1.mp3").exists());
    }
}
