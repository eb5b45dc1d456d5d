use std::collections::HashMap;
use std::io::Read;
use tracing::{info, warn};
use crate::analysis::analyzer::Analyzer;
use crate::analysis::filters::stopword::StopWords;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::stats::CatalogStats;
use crate::core::submission::{BookSubmission, Submission};
use crate::core::types::{Comic, Grade, SeriesTotal};
use crate::index::inverted::{InvertedIndex, SearchMode};
use crate::index::reindex::{self, RepairReport};
use crate::index::{missing, totals};
use crate::keys::codec::underscore_decode;
use crate::keys::composite::CompositeKey;
use crate::ordering::series::SeriesList;
use crate::record::comic_store;
use crate::storage::store::Store;
use crate::storage::transaction::{Tx, WriteTx};

/// The comic catalog: primary records plus the derived search, missing and
/// totals indexes, all kept in one store.
///
/// Every mutation runs in a single write transaction. Derived index upkeep
/// after a successful record write is best effort; failures are logged and
/// can be fixed with [`Catalog::repair`].
pub struct Catalog {
    store: Store,
    index: InvertedIndex,
    stop_words: StopWords,
}

impl Catalog {
    pub fn open(config: &Config) -> Result<Self> {
        let store = Store::open(config)?;

        let stop_words = match store.view(|tx| StopWords::load(tx))? {
            Some(words) => words,
            None => {
                let seeded = StopWords::new(&config.default_stop_words);
                store.update(|tx| seeded.store(tx))?;
                seeded
            }
        };
        info!(stop_words = stop_words.len(), path = %config.storage_path.display(), "Opened catalog");

        let catalog = Catalog {
            index: InvertedIndex::new(Analyzer::catalog(stop_words.clone())),
            store,
            stop_words,
        };
        if config.repair_on_open {
            catalog.repair()?;
        }
        Ok(catalog)
    }

    pub fn in_memory() -> Result<Self> {
        Catalog::open(&Config::in_memory())
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Adds a comic or updates the descriptive fields of an existing one,
    /// appending the submitted copy if a grade was given.
    ///
    /// The stored record is read, merged and written back in one transaction.
    /// A new comic needs a cover path.
    pub fn upload(&self, submission: &Submission) -> Result<Comic> {
        let (submitted, book) = submission.validate()?;
        let key = submitted.key();

        let comic = self.store.update(|tx| {
            let mut comic = match comic_store::get(&*tx, &key)? {
                Some(mut stored) if stored.same_identity(&submitted) => {
                    stored.merge_from(submitted);
                    stored
                }
                _ => submitted,
            };
            if comic.cover_path.is_empty() {
                return Err(Error::invalid_input("Missing cover file"));
            }
            if let Some(book) = book {
                comic.books.push(book);
            }

            comic_store::put(tx, &key, &comic)?;
            self.maintain(tx, &key, &comic);
            Ok(comic)
        })?;

        info!(key = %key, books = comic.books.len(), "Comic uploaded");
        Ok(comic)
    }

    /// Appends a copy to a comic already in the catalog.
    pub fn add_book(&self, submission: &BookSubmission) -> Result<Comic> {
        let (wanted, book) = submission.validate()?;
        self.modify(&wanted, |comic| comic.books.push(book))
    }

    /// Deaccessions every copy; the comic becomes missing again.
    pub fn clear_books(&self, series_id: &str, issue: &str, cover_id: &str) -> Result<Comic> {
        self.modify(&Comic::new(series_id, issue, cover_id), |comic| comic.books.clear())
    }

    fn modify(&self, wanted: &Comic, change: impl FnOnce(&mut Comic)) -> Result<Comic> {
        let key = wanted.key();
        let comic = self.store.update(|tx| {
            let mut comic = comic_store::get(&*tx, &key)?
                .filter(|stored| stored.same_identity(wanted))
                .ok_or_else(|| not_found(wanted))?;
            change(&mut comic);
            comic_store::put(tx, &key, &comic)?;
            self.maintain(tx, &key, &comic);
            Ok(comic)
        })?;
        info!(key = %key, books = comic.books.len(), "Comic books changed");
        Ok(comic)
    }

    /// Removes a comic and everything derived from it. `false` when there
    /// was nothing to delete.
    pub fn delete(&self, series_id: &str, issue: &str, cover_id: &str) -> Result<bool> {
        let wanted = Comic::new(series_id, issue, cover_id);
        let key = wanted.key();
        let deleted = self.store.update(|tx| {
            match comic_store::get(&*tx, &key)? {
                Some(stored) if stored.same_identity(&wanted) => {}
                _ => return Ok(false),
            }
            comic_store::delete(tx, &key)?;

            if let Err(e) = self.index.remove(tx, &key) {
                warn!(key = %key, error = %e, "Problem removing comic from search index");
            }
            if let Err(e) = missing::remove(tx, &key) {
                warn!(key = %key, error = %e, "Problem updating missing index");
            }
            if let Err(e) = totals::mark_stale(tx, series_id) {
                warn!(key = %key, error = %e, "Problem updating comic totals");
            }
            Ok(true)
        })?;
        if deleted {
            info!(key = %key, "Comic deleted");
        }
        Ok(deleted)
    }

    /// Keeps the derived indexes in step with a written record. Failures are
    /// logged, never returned.
    fn maintain(&self, tx: &mut WriteTx, key: &CompositeKey, comic: &Comic) {
        if let Err(e) = self.index.index_comic(tx, key, comic) {
            warn!(key = %key, error = %e, "Problem updating search index");
        }
        if let Err(e) = missing::sync(tx, key, comic) {
            warn!(key = %key, error = %e, "Problem updating missing index");
        }
        if let Err(e) = totals::mark_stale(tx, &comic.series_id) {
            warn!(key = %key, error = %e, "Problem updating comic totals");
        }
    }

    pub fn get(&self, key: &CompositeKey) -> Result<Option<Comic>> {
        self.store.view(|tx| comic_store::get(tx, key))
    }

    /// Looks a comic up by its raw identity.
    pub fn lookup(&self, series_id: &str, issue: &str, cover_id: &str) -> Result<Option<Comic>> {
        let wanted = Comic::new(series_id, issue, cover_id);
        Ok(self.get(&wanted.key())?.filter(|c| c.same_identity(&wanted)))
    }

    /// Comics matching every term of `query`.
    pub fn search(&self, query: &str) -> Result<SeriesList> {
        self.search_with(query, SearchMode::All)
    }

    pub fn search_with(&self, query: &str, mode: SearchMode) -> Result<SeriesList> {
        self.store.view(|tx| {
            let keys = self.index.search(tx, query, mode)?;
            load_all(tx, &keys)
        })
    }

    /// The whole catalog.
    pub fn browse(&self) -> Result<SeriesList> {
        self.store.view(|tx| {
            Ok(comic_store::scan_all(tx)?
                .into_iter()
                .map(|(_, comic)| comic)
                .collect())
        })
    }

    /// One series, by its underscore-escaped key as it appears in paths
    /// (see [`TitleBundle::path`](crate::ordering::series::TitleBundle)).
    pub fn series(&self, path: &str) -> Result<SeriesList> {
        let series_key = underscore_decode(path);
        self.store.view(|tx| {
            Ok(comic_store::scan_series(tx, &series_key)?
                .into_iter()
                .map(|(_, comic)| comic)
                .collect())
        })
    }

    /// Comics known to exist but not owned.
    pub fn missing(&self) -> Result<SeriesList> {
        self.store.view(|tx| {
            let keys = missing::list(tx)?;
            load_all(tx, &keys)
        })
    }

    pub fn is_missing(&self, key: &CompositeKey) -> Result<bool> {
        self.store.view(|tx| missing::contains(tx, key))
    }

    /// Owned count and value per series, recomputing stale entries.
    pub fn totals(&self) -> Result<Vec<SeriesTotal>> {
        self.store.update(totals::get_all)
    }

    /// Stores a batch of complete records in one transaction. Any failure,
    /// a collision included, leaves the catalog untouched.
    pub fn import(&self, comics: Vec<Comic>) -> Result<usize> {
        let count = comics.len();
        self.store.update(|tx| {
            for comic in &comics {
                let key = comic.key();
                comic_store::put(tx, &key, comic)?;
                self.maintain(tx, &key, comic);
            }
            Ok(())
        })?;
        info!(comics = count, "Imported comics");
        Ok(count)
    }

    /// Imports a JSON array of comics.
    pub fn import_json(&self, reader: impl Read) -> Result<usize> {
        let comics: Vec<Comic> = serde_json::from_reader(reader)?;
        self.import(comics)
    }

    /// Rewrites book grades through `mapping`. Returns how many books changed.
    pub fn remap_grades(&self, mapping: &HashMap<Grade, Grade>) -> Result<usize> {
        let changed = self.store.update(|tx| {
            let mut changed = 0;
            for (key, mut comic) in comic_store::scan_all(&*tx)? {
                let mut touched = false;
                for book in &mut comic.books {
                    if let Some(&replacement) = mapping.get(&book.grade) {
                        if replacement != book.grade {
                            book.grade = replacement;
                            touched = true;
                            changed += 1;
                        }
                    }
                }
                if touched {
                    comic_store::put(tx, &key, &comic)?;
                }
            }
            Ok(changed)
        })?;
        info!(books = changed, "Remapped grades");
        Ok(changed)
    }

    /// Rebuilds every derived index from the primary records.
    pub fn repair(&self) -> Result<RepairReport> {
        self.store.update(|tx| reindex::rebuild(tx, &self.index))
    }

    /// Persists a new stop word list. It applies from the next open; run
    /// [`Catalog::repair`] then to drop postings for the new stop words.
    pub fn store_stop_words<I, S>(&self, words: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = StopWords::new(words);
        self.store.update(|tx| words.store(tx))?;
        info!(stop_words = words.len(), "Stored stop words; reopen to apply");
        Ok(())
    }

    pub fn stats(&self) -> Result<CatalogStats> {
        self.store.view(|tx| {
            let comics = comic_store::scan_all(tx)?;
            Ok(CatalogStats {
                books: comics.iter().map(|(_, c)| c.books.len()).sum(),
                comics: comics.len(),
                missing: missing::count(tx)? as usize,
                series: comic_store::series_keys(tx)?.len(),
                tokens: self.index.token_count(tx)?,
                stop_words: self.stop_words.len(),
                version: self.store.version(),
            })
        })
    }

    /// Compacts the underlying database file.
    pub fn compact(&mut self) -> Result<bool> {
        self.store.compact()
    }
}

fn not_found(wanted: &Comic) -> Error {
    Error::not_found(format!(
        "Unable to find comic: {}, {}, {}",
        wanted.series_id, wanted.issue, wanted.cover_id
    ))
}

/// Loads the records behind `keys`. Keys without a record (index drift) are
/// skipped with a warning.
fn load_all(tx: &impl Tx, keys: &[CompositeKey]) -> Result<SeriesList> {
    let mut list = SeriesList::new();
    for key in keys {
        match comic_store::get(tx, key)? {
            Some(comic) => list.add(comic),
            None => warn!(key = %key, "Index entry without a comic record"),
        }
    }
    Ok(list)
}

/// Parses `"GD:FN,VG:VF"` into a grade mapping.
pub fn parse_grade_mapping(mapping: &str) -> Result<HashMap<Grade, Grade>> {
    mapping
        .split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            let (from, to) = pair
                .split_once(':')
                .ok_or_else(|| Error::invalid_input(format!("Invalid mapping {} at {}", mapping, pair)))?;
            Ok((from.parse()?, to.parse()?))
        })
        .collect()
}
