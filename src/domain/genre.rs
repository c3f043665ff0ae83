//! Genre identifiers and the fixed genre table of the catalog API.

use serde::{Deserialize, Serialize};

/// Known genres as (id, title)
pub const GENRES: [(u32, &str); 9] = [
    (1, "Personal Growth"),
    (2, "True Crime and Investigative Journalism"),
    (3, "History"),
    (4, "Comedy"),
    (5, "Entertainment"),
    (6, "Business"),
    (7, "Fiction"),
    (8, "News"),
    (9, "Kids and Family"),
];

/// Numeric genre identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenreId(pub u32);

impl GenreId {
    /// Human-readable title, if the genre is known
    pub fn title(&self) -> Option<&'static str> {
        GENRES
            .iter()
            .find(|(id, _)| *id == self.0)
            .map(|(_, title)| *title)
    }

    /// Resolve a genre title (case-insensitive)
    pub fn from_title(title: &str) -> Option<Self> {
        let title = title.trim();
        GENRES
            .iter()
            .find(|(_, t)| t.eq_ignore_ascii_case(title))
            .map(|(id, _)| GenreId(*id))
    }
}

impl From<u32> for GenreId {
    fn from(id: u32) -> Self {
        GenreId(id)
    }
}

impl std::fmt::Display for GenreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.title() {
            Some(title) => write!(f, "{}", title),
            None => write!(f, "Genre {}", self.0),
        }
    }
}

/// Genre predicate of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Only(GenreId),
}

impl GenreFilter {
    /// Whether a show with these genres passes the filter
    pub fn matches<'a>(&self, mut genres: impl Iterator<Item = &'a GenreId>) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Only(wanted) => genres.any(|g| g == wanted),
        }
    }
}

impl From<Option<GenreId>> for GenreFilter {
    fn from(genre: Option<GenreId>) -> Self {
        genre.map(GenreFilter::Only).unwrap_or_default()
    }
}

impl std::str::FromStr for GenreFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(GenreFilter::All);
        }
        if let Ok(id) = s.parse::<u32>() {
            return Ok(GenreFilter::Only(GenreId(id)));
        }
        GenreId::from_title(s)
            .map(GenreFilter::Only)
            .ok_or_else(|| anyhow::anyhow!("Unknown genre: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_titles() {
        assert_eq!(GenreId(3).title(), Some("History"));
        assert_eq!(GenreId(42).title(), None);
        assert_eq!(GenreId::from_title("kids and family"), Some(GenreId(9)));
        assert_eq!(GenreId(42).to_string(), "Genre 42");
    }

    #[test]
    fn test_genre_filter_from_str() {
        assert_eq!("all".parse::<GenreFilter>().unwrap(), GenreFilter::All);
        assert_eq!("".parse::<GenreFilter>().unwrap(), GenreFilter::All);
        assert_eq!(
            "4".parse::<GenreFilter>().unwrap(),
            GenreFilter::Only(GenreId(4))
        );
        assert_eq!(
            "Comedy".parse::<GenreFilter>().unwrap(),
            GenreFilter::Only(GenreId(4))
        );
        assert!("polka".parse::<GenreFilter>().is_err());
    }

    #[test]
    fn test_genre_filter_matches() {
        let genres = [GenreId(1), GenreId(4)];
        assert!(GenreFilter::All.matches(genres.iter()));
        assert!(GenreFilter::Only(GenreId(4)).matches(genres.iter()));
        assert!(!GenreFilter::Only(GenreId(2)).matches(genres.iter()));
    }
}
