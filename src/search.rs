use crate::api::{ChapterSource, load_chapters};
use crate::models::Chapter;
use crate::notify::Notifier;
use crate::render::{ListView, render};

/// Chapters whose name contains `query`, ignoring case. Verse content is
/// not searched.
pub fn filter(chapters: &[Chapter], query: &str) -> Vec<Chapter> {
    let needle = query.to_lowercase();
    chapters
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Fetch the reader's full list again, filter it, show the result.
pub async fn search<S, N, V>(
    source: &S,
    reader: &str,
    query: &str,
    notifier: &mut N,
    view: &mut V,
) -> Vec<Chapter>
where
    S: ChapterSource,
    N: Notifier,
    V: ListView,
{
    let all = load_chapters(source, reader, notifier).await;
    let found = filter(&all, query);
    tracing::debug!(query, total = all.len(), found = found.len(), "search");
    render(view, &found);
    found
}
