use std::cmp::Ordering;
use std::collections::BTreeMap;
use crate::core::types::Comic;
use crate::keys::codec::{sanitize, underscore_encode};

/// Series level sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesOrder {
    /// Release date of the first issue (year, then month).
    #[default]
    Release,
    /// In-universe chronology offset of the first issue.
    Chronology,
}

impl std::str::FromStr for SeriesOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "release" => Ok(SeriesOrder::Release),
            "chron" | "chronology" => Ok(SeriesOrder::Chronology),
            other => Err(format!("unknown series order '{}'", other)),
        }
    }
}

/// One numbering continuity with its comics in issue order.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub series_id: String,
    pub series_key: String,
    pub comics: Vec<Comic>,
}

/// A run of consecutive comics in a series that share a printed title.
/// `path` is the underscore-escaped series key used in links.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleBundle {
    pub publisher: String,
    pub display_name: String,
    pub path: String,
    pub comics: Vec<Comic>,
}

/// Issue value, then cover id.
pub fn compare_comics(a: &Comic, b: &Comic) -> Ordering {
    a.issue_value()
        .total_cmp(&b.issue_value())
        .then_with(|| a.cover_id.cmp(&b.cover_id))
}

impl Series {
    fn first(&self) -> &Comic {
        &self.comics[0]
    }

    /// Splits the series where the printed title changes. The first bundle
    /// is named after the series, later ones after their title.
    pub fn title_bundles(&self) -> Vec<TitleBundle> {
        let mut bundles: Vec<TitleBundle> = Vec::new();
        for comic in &self.comics {
            if let Some(current) = bundles.last_mut() {
                if current.comics[0].title == comic.title {
                    current.comics.push(comic.clone());
                    continue;
                }
            }
            let display_name = if bundles.is_empty() {
                self.series_id.clone()
            } else {
                comic.title.clone()
            };
            bundles.push(TitleBundle {
                publisher: comic.publisher.clone(),
                display_name,
                path: underscore_encode(&self.series_key),
                comics: vec![comic.clone()],
            });
        }
        bundles
    }

    fn compare(&self, other: &Series, order: SeriesOrder) -> Ordering {
        let (a, b) = (self.first(), other.first());
        let primary = match order {
            SeriesOrder::Release => (a.year, a.month).cmp(&(b.year, b.month)),
            SeriesOrder::Chronology => a.chron_offset.cmp(&b.chron_offset),
        };
        primary
            .then_with(|| self.series_id.cmp(&other.series_id))
            .then_with(|| self.series_key.cmp(&other.series_key))
    }
}

/// Flat query results grouped by SeriesId.
#[derive(Debug, Clone, Default)]
pub struct SeriesList {
    groups: BTreeMap<String, Vec<Comic>>,
}

impl SeriesList {
    pub fn new() -> Self {
        SeriesList::default()
    }

    pub fn add(&mut self, comic: Comic) {
        self.groups.entry(comic.series_id.clone()).or_default().push(comic);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Series in `order`, each with its comics sorted by [`compare_comics`].
    /// Ties are broken by SeriesId, then series key.
    pub fn sorted(self, order: SeriesOrder) -> Vec<Series> {
        let mut series: Vec<Series> = self
            .groups
            .into_iter()
            .map(|(series_id, mut comics)| {
                comics.sort_by(compare_comics);
                Series {
                    series_key: sanitize(&series_id),
                    series_id,
                    comics,
                }
            })
            .collect();
        series.sort_by(|a, b| a.compare(b, order));
        series
    }

    /// Title bundles of every series, series in `order`.
    pub fn bundles(self, order: SeriesOrder) -> Vec<TitleBundle> {
        self.sorted(order)
            .iter()
            .flat_map(Series::title_bundles)
            .collect()
    }
}

impl FromIterator<Comic> for SeriesList {
    fn from_iter<I: IntoIterator<Item = Comic>>(iter: I) -> Self {
        let mut list = SeriesList::new();
        for comic in iter {
            list.add(comic);
        }
        list
    }
}
