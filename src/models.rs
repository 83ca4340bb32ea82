use serde::Deserialize;

/// Every alquran.cloud response is wrapped like this. `data` is an object
/// on success but a plain string on errors, so it stays untyped until
/// `code` has been checked.
#[derive(Clone, Deserialize, Debug)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Clone, Deserialize, Debug)]
pub struct QuranData {
    // absent on some editions; treated as a malformed payload
    #[serde(default)]
    pub surahs: Option<Vec<Surah>>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Surah {
    pub name: String,
    #[serde(default, rename = "englishName")]
    pub english_name: String,
    pub ayahs: Vec<Ayah>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Ayah {
    pub audio: String,
}

/// One audio edition from `/v1/edition?format=audio`.
#[derive(Clone, Deserialize, Debug)]
pub struct Reader {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "englishName")]
    pub english_name: String,
    #[serde(default)]
    pub language: String,
}

/// A chapter as the rest of the program sees it. Its identity is its
/// position in whatever list is on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Chapter {
    pub name: String,
    pub english_name: String,
    pub verses: Vec<Verse>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Verse {
    pub audio_url: String,
}

impl From<Surah> for Chapter {
    fn from(s: Surah) -> Self {
        Chapter {
            name: s.name,
            english_name: s.english_name,
            verses: s
                .ayahs
                .into_iter()
                .map(|a| Verse { audio_url: a.audio })
                .collect(),
        }
    }
}

impl Chapter {
    pub fn verse_count(&self) -> usize {
        self.verses.len()
    }
}

#[cfg(test)]
pub(crate) fn chapter(name: &str, verses: usize) -> Chapter {
    Chapter {
        name: name.to_string(),
        english_name: String::new(),
        verses: (1..=verses)
            .map(|n| Verse { audio_url: format!("https://cdn.test/{name}/{n}.mp3") })
            .collect(),
    }
}
