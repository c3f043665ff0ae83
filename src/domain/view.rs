//! Transient view state: filter text, sort key and genre predicate.

use serde::{Deserialize, Serialize};

use super::genre::GenreFilter;

/// Sort order for shows and favorites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Keep source order
    #[default]
    None,
    TitleAsc,
    TitleDesc,
    DateAsc,
    DateDesc,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::None => write!(f, "none"),
            SortKey::TitleAsc => write!(f, "titleAsc"),
            SortKey::TitleDesc => write!(f, "titleDesc"),
            SortKey::DateAsc => write!(f, "dateAsc"),
            SortKey::DateDesc => write!(f, "dateDesc"),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "" | "none" | "default" => Ok(SortKey::None),
            "titleasc" | "titleaz" => Ok(SortKey::TitleAsc),
            "titledesc" | "titleza" => Ok(SortKey::TitleDesc),
            "dateasc" => Ok(SortKey::DateAsc),
            "datedesc" => Ok(SortKey::DateDesc),
            _ => anyhow::bail!("Unknown sort key: {}", s),
        }
    }
}

/// Filter and sort selection driving the derived show list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub filter_text: String,
    pub sort_key: SortKey,
    pub genre_filter: GenreFilter,
}

impl ViewState {
    /// Default view: no filter, catalog order, all genres
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter_text(mut self, text: impl Into<String>) -> Self {
        self.filter_text = text.into();
        self
    }

    pub fn with_sort(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    pub fn with_genre(mut self, genre_filter: GenreFilter) -> Self {
        self.genre_filter = genre_filter;
        self
    }
}
