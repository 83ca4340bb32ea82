use crate::error::FetchError;
use crate::models::{Chapter, Envelope, QuranData, Reader};
use crate::notify::{Notifier, msg};
use reqwest::Client;

pub const DEFAULT_BASE: &str = "https://api.alquran.cloud";

/// Anything that can hand out readers and the chapter list of a reader.
pub trait ChapterSource {
    async fn fetch_chapters(&self, reader: &str) -> Result<Vec<Chapter>, FetchError>;

    async fn fetch_readers(&self) -> Result<Vec<Reader>, FetchError>;
}

#[derive(Clone, Debug)]
pub struct QuranApi {
    client: Client,
    base: String,
}

impl QuranApi {
    pub fn new(client: Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { client, base }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn get(&self, url: &str) -> Result<Envelope, FetchError> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http { url: url.to_string(), source })?
            .bytes()
            .await
            .map_err(|source| FetchError::Http { url: url.to_string(), source })?;

        // the api reports failures in the body, so the http status is not consulted
        let env: Envelope = serde_json::from_slice(&body)
            .map_err(|source| FetchError::Decode { url: url.to_string(), source })?;
        if env.code != 200 {
            return Err(FetchError::Status {
                url: url.to_string(),
                code: env.code,
                status: env.status.unwrap_or_default(),
            });
        }
        Ok(env)
    }
}

impl ChapterSource for QuranApi {
    async fn fetch_chapters(&self, reader: &str) -> Result<Vec<Chapter>, FetchError> {
        let url = self.url(&format!("/v1/quran/{reader}"));
        tracing::debug!(%url, "fetching chapters");
        let env = self.get(&url).await?;
        let data: QuranData = serde_json::from_value(env.data)
            .map_err(|source| FetchError::Decode { url: url.clone(), source })?;
        let surahs = data.surahs.ok_or(FetchError::MissingSurahs { url })?;
        Ok(surahs.into_iter().map(Chapter::from).collect())
    }

    /// Audio editions that have one file per ayah.
    async fn fetch_readers(&self) -> Result<Vec<Reader>, FetchError> {
        let url = self.url("/v1/edition?format=audio&type=versebyverse");
        let env = self.get(&url).await?;
        serde_json::from_value(env.data).map_err(|source| FetchError::Decode { url, source })
    }
}

/// Fetch, and on any failure tell the user and carry on with nothing.
pub async fn load_chapters<S, N>(source: &S, reader: &str, notifier: &mut N) -> Vec<Chapter>
where
    S: ChapterSource,
    N: Notifier,
{
    match source.fetch_chapters(reader).await {
        Ok(chapters) => {
            tracing::debug!(reader, count = chapters.len(), "chapters loaded");
            chapters
        }
        Err(e) => {
            tracing::error!(reader, error = ?anyhow::Error::from(e), "loading chapters failed");
            notifier.alert(msg::LOAD_FAILED);
            Vec::new()
        }
    }
}
