//! Pure projection of a catalog snapshot through a view state.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::domain::{GenreId, Show, SortKey, ViewState};

/// Filter and sort the shows of `catalog` according to `view`.
///
/// Retains shows whose title contains the filter text (case-insensitive)
/// and that carry the selected genre, then sorts stably by the view's key.
/// Never fails and never adds shows.
pub fn project<'a>(catalog: &'a Catalog, view: &ViewState) -> Vec<&'a Show> {
    let needle = view.filter_text.to_lowercase();

    let mut shows: Vec<&Show> = catalog
        .shows
        .iter()
        .filter(|show| needle.is_empty() || show.title.to_lowercase().contains(&needle))
        .filter(|show| view.genre_filter.matches(show.genre_ids.iter()))
        .collect();

    sort_stable(
        &mut shows,
        view.sort_key,
        |show| show.title.as_str(),
        |show| show.updated_at,
    );

    shows
}

/// Distinct genre ids present in the catalog
pub fn list_genres(catalog: &Catalog) -> BTreeSet<GenreId> {
    catalog
        .shows
        .iter()
        .flat_map(|show| show.genre_ids.iter().copied())
        .collect()
}

/// Stable sort of `items` by `key`.
///
/// Titles compare lexicographically after lowercasing; dates compare with
/// unknown dates first. Equal keys keep their input order in both
/// directions. `SortKey::None` leaves the slice untouched.
pub fn sort_stable<T, FT, FD>(items: &mut [T], key: SortKey, title: FT, date: FD)
where
    FT: Fn(&T) -> &str,
    FD: Fn(&T) -> Option<DateTime<Utc>>,
{
    match key {
        SortKey::None => {}
        SortKey::TitleAsc => items.sort_by(|a, b| compare_titles(title(a), title(b))),
        SortKey::TitleDesc => items.sort_by(|a, b| compare_titles(title(b), title(a))),
        SortKey::DateAsc => items.sort_by(|a, b| date(a).cmp(&date(b))),
        SortKey::DateDesc => items.sort_by(|a, b| date(b).cmp(&date(a))),
    }
}

/// Case-insensitive lexicographic title order
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GenreFilter;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn titles(shows: &[&Show]) -> Vec<String> {
        shows.iter().map(|s| s.title.clone()).collect()
    }

    #[test]
    fn test_compare_titles_ignores_case() {
        assert_eq!(compare_titles("alpha", "Beta"), Ordering::Less);
        assert_eq!(compare_titles("ALPHA", "alpha"), Ordering::Equal);
        assert_eq!(compare_titles("Zebra", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_unknown_dates_sort_first_ascending() {
        let catalog = Catalog::new(vec![
            Show::new("1", "Dated").with_updated_at(day(2023, 5, 1)),
            Show::new("2", "Undated"),
        ]);

        let view = ViewState::new().with_sort(SortKey::DateAsc);
        assert_eq!(titles(&project(&catalog, &view)), vec!["Undated", "Dated"]);

        let view = ViewState::new().with_sort(SortKey::DateDesc);
        assert_eq!(titles(&project(&catalog, &view)), vec!["Dated", "Undated"]);
    }

    #[test]
    fn test_genre_and_text_filters_combine() {
        let catalog = Catalog::new(vec![
            Show::new("1", "History of Rome").with_genre(GenreId(3)),
            Show::new("2", "History Jokes").with_genre(GenreId(4)),
            Show::new("3", "Comedy Hour").with_genre(GenreId(4)),
        ]);

        let view = ViewState::new()
            .with_filter_text("history")
            .with_genre(GenreFilter::Only(GenreId(4)));
        assert_eq!(titles(&project(&catalog, &view)), vec!["History Jokes"]);

        let genres = list_genres(&catalog);
        assert_eq!(genres.into_iter().collect::<Vec<_>>(), vec![GenreId(3), GenreId(4)]);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::default();
        let view = ViewState::new().with_filter_text("x").with_sort(SortKey::TitleDesc);
        assert!(project(&catalog, &view).is_empty());
        assert!(list_genres(&catalog).is_empty());
    }
}
