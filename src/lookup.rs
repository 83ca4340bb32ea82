use crate::api::ChapterSource;
use crate::models::{Chapter, Reader};
use anyhow::{Context, Result};
use unicode_normalization::UnicodeNormalization;

/// Fold a name down to lowercase ascii letters and digits, so
/// "Mishary Alafasy" and "mishary-alafasy" compare equal.
pub fn norm_key(s: &str) -> String {
    s.nfkd()
        .filter(|c| c.is_ascii())
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Edition identifiers look like `ar.alafasy`.
pub fn is_identifier(spec: &str) -> bool {
    let Some((lang, name)) = spec.split_once('.') else { return false };
    !lang.is_empty() && !name.is_empty() && !spec.contains(char::is_whitespace)
}

// resolve using SERVER names, identifier first
pub fn resolve_reader<'a>(readers: &'a [Reader], spec: &str) -> Option<&'a Reader> {
    if let Some(r) = readers.iter().find(|r| r.identifier == spec) {
        return Some(r);
    }
    // arabic names survive only as an exact match; norm_key drops them
    if let Some(r) = readers.iter().find(|r| r.name == spec.trim()) {
        return Some(r);
    }
    let key = norm_key(spec);
    if key.is_empty() {
        return None;
    }
    readers.iter().find(|r| {
        let n = norm_key(&r.english_name);
        let id = norm_key(&r.identifier);
        (!n.is_empty() && (n.contains(&key) || key.contains(&n))) || id == key
    })
}

/// Turn what the user typed into an edition id. Ids pass through
/// untouched; names are looked up in the reader list.
pub async fn reader_id<S: ChapterSource>(source: &S, spec: &str) -> Result<String> {
    let spec = spec.trim();
    if is_identifier(spec) {
        return Ok(spec.to_string());
    }
    let readers = source.fetch_readers().await.context("listing readers failed")?;
    let r = resolve_reader(&readers, spec).with_context(|| format!("unknown reader: {spec}"))?;
    Ok(r.identifier.clone())
}

/// 1-based ordinal, else a name match: the chapter name as typed, then the
/// english name normalized.
pub fn resolve_chapter<'a>(chapters: &'a [Chapter], spec: &str) -> Option<&'a Chapter> {
    if let Ok(n) = spec.trim().parse::<usize>() {
        return n.checked_sub(1).and_then(|i| chapters.get(i));
    }
    let needle = spec.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    if let Some(c) = chapters.iter().find(|c| c.name.to_lowercase().contains(&needle)) {
        return Some(c);
    }
    let key = norm_key(spec);
    if key.is_empty() {
        return None;
    }
    chapters
        .iter()
        .find(|c| norm_key(&c.english_name) == key)
        .or_else(|| chapters.iter().find(|c| norm_key(&c.english_name).contains(&key)))
}
