//! End-to-end catalog scenarios: uploads, copies, missing tracking, totals and search.

use longbox::core::submission::{BookSubmission, Submission};
use longbox::index::inverted::{SearchMode, WORD_KEYS_TABLE};
use longbox::keys::composite::CompositeKey;
use longbox::ordering::series::SeriesOrder;
use longbox::storage::transaction::Tx;
use longbox::{Catalog, Comic, Config, ErrorKind, Result};

fn submission(series: &str, issue: &str, cover: &str) -> Submission {
    Submission {
        series_id: series.to_string(),
        issue: issue.to_string(),
        cover_id: cover.to_string(),
        title: series.to_string(),
        publisher: "Marvel".to_string(),
        date: "1963-09".to_string(),
        chron_offset: "0".to_string(),
        cover_price: "$0.12".to_string(),
        cover_path: "cover.jpg".to_string(),
        ..Submission::default()
    }
}

fn copy(series: &str, issue: &str, cover: &str, grade: &str, value: &str) -> BookSubmission {
    BookSubmission {
        series_id: series.to_string(),
        issue: issue.to_string(),
        cover_id: cover.to_string(),
        grade: grade.to_string(),
        value: value.to_string(),
        signed: false,
    }
}

fn xmen_total(catalog: &Catalog) -> Result<(u64, i64)> {
    let totals = catalog.totals()?;
    let total = totals
        .iter()
        .find(|t| t.series_id == "X-Men")
        .expect("X-Men has a total");
    assert!(total.up_to_date);
    Ok((total.count, total.value))
}

#[test]
fn test_owning_lifecycle() -> Result<()> {
    let catalog = Catalog::in_memory()?;
    let key = CompositeKey::new("X-Men", "1", "A");

    // Upload without a copy: missing, nothing owned
    catalog.upload(&submission("X-Men", "1", "A"))?;
    assert!(catalog.is_missing(&key)?);
    assert_eq!(xmen_total(&catalog)?, (0, 0));

    // A VF copy worth $5.00
    catalog.add_book(&copy("X-Men", "1", "A", "VF", "5.00"))?;
    assert!(!catalog.is_missing(&key)?);
    assert_eq!(xmen_total(&catalog)?, (1, 500));

    // Deaccession it
    catalog.clear_books("X-Men", "1", "A")?;
    assert!(catalog.is_missing(&key)?);
    assert_eq!(xmen_total(&catalog)?, (0, 0));

    Ok(())
}

#[test]
fn test_stop_words_are_not_searchable() -> Result<()> {
    let config = Config {
        default_stop_words: vec!["the".to_string()],
        ..Config::in_memory()
    };
    let catalog = Catalog::open(&config)?;

    let mut upload = submission("ASM", "1", "A");
    upload.title = "The Amazing Spider-Man's Return".to_string();
    let comic = catalog.upload(&upload)?;

    let keys = catalog
        .store()
        .view(|tx| catalog.index().search(tx, "amazing", SearchMode::All))?;
    assert_eq!(keys, vec![comic.key()]);
    assert!(catalog.search("the")?.is_empty());
    assert!(catalog.search("s")?.is_empty());
    assert_eq!(catalog.search("SPIDER-MAN")?.len(), 1);

    Ok(())
}

#[test]
fn test_missing_index_matches_books_for_every_comic() -> Result<()> {
    let catalog = Catalog::in_memory()?;
    for issue in 1..=6 {
        catalog.upload(&submission("Hulk", &issue.to_string(), "A"))?;
    }
    for issue in [2, 4, 6] {
        catalog.add_book(&copy("Hulk", &issue.to_string(), "A", "FN", "3"))?;
    }
    catalog.clear_books("Hulk", "4", "A")?;

    let all: Vec<Comic> = catalog
        .browse()?
        .sorted(SeriesOrder::Release)
        .into_iter()
        .flat_map(|s| s.comics)
        .collect();
    assert_eq!(all.len(), 6);
    for comic in &all {
        assert_eq!(catalog.is_missing(&comic.key())?, comic.books.is_empty());
    }

    let missing: Vec<String> = catalog
        .missing()?
        .sorted(SeriesOrder::Release)
        .into_iter()
        .flat_map(|s| s.comics)
        .map(|c| c.issue)
        .collect();
    assert_eq!(missing, vec!["1", "3", "4", "5"]);

    Ok(())
}

#[test]
fn test_totals_equal_true_sums() -> Result<()> {
    let catalog = Catalog::in_memory()?;
    catalog.upload(&submission("X-Men", "1", "A"))?;
    catalog.upload(&submission("X-Men", "2", "A"))?;
    catalog.upload(&submission("Thor", "1", "A"))?;
    catalog.add_book(&copy("X-Men", "1", "A", "VF", "5.00"))?;
    catalog.add_book(&copy("X-Men", "1", "A", "GD", "1.25"))?;
    catalog.add_book(&copy("X-Men", "2", "A", "NM", "20"))?;
    catalog.add_book(&copy("Thor", "1", "A", "PR", "0.50"))?;

    assert_eq!(xmen_total(&catalog)?, (3, 2625));
    let thor = catalog.totals()?.into_iter().find(|t| t.series_id == "Thor").unwrap();
    assert_eq!((thor.count, thor.value), (1, 50));

    Ok(())
}

#[test]
fn test_retitled_comic_leaves_no_stale_postings() -> Result<()> {
    let catalog = Catalog::in_memory()?;
    let mut upload = submission("X-Men", "1", "A");
    upload.title = "Uncanny".to_string();
    catalog.upload(&upload)?;

    upload.title = "Astonishing".to_string();
    catalog.upload(&upload)?;

    assert!(catalog.search("uncanny")?.is_empty());
    assert_eq!(catalog.search("astonishing")?.len(), 1);
    Ok(())
}

#[test]
fn test_colliding_series_is_rejected() -> Result<()> {
    let catalog = Catalog::in_memory()?;
    catalog.upload(&submission("X Men", "1", "A"))?;

    let err = catalog.upload(&submission("X_Men", "1", "A")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Collision);
    let err = catalog.upload(&submission("X_Men", "2", "A")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Collision);

    let stored = catalog.lookup("X Men", "1", "A")?.unwrap();
    assert_eq!(stored.series_id, "X Men");
    assert!(catalog.lookup("X_Men", "1", "A")?.is_none());
    Ok(())
}

#[test]
fn test_import_is_all_or_nothing() -> Result<()> {
    let catalog = Catalog::in_memory()?;
    let json = r#"[
        {"SeriesId": "Thor", "Issue": "1", "CoverId": "A", "Title": "Mighty Thor"},
        {"SeriesId": "Thor", "Issue": "2", "CoverId": "A", "Title": "Mighty Thor",
         "Books": [{"Grade": "VF", "Value": 700, "Signed": false}]},
        {"SeriesId": "THOR", "Issue": "1", "CoverId": "A", "Title": "Imposter"}
    ]"#;
    let err = catalog.import_json(json.as_bytes()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Collision);
    assert!(catalog.browse()?.is_empty());

    let valid = r#"[
        {"SeriesId": "Thor", "Issue": "1", "CoverId": "A", "Title": "Mighty Thor"},
        {"SeriesId": "Thor", "Issue": "2", "CoverId": "A", "Title": "Mighty Thor",
         "Books": [{"Grade": "VF", "Value": 700, "Signed": false}]}
    ]"#;
    assert_eq!(catalog.import_json(valid.as_bytes())?, 2);
    assert_eq!(catalog.missing()?.sorted(SeriesOrder::Release)[0].comics.len(), 1);
    assert_eq!(catalog.search_with("mighty imposter", SearchMode::Any)?.len(), 1);

    let stats = catalog.stats()?;
    assert_eq!((stats.comics, stats.books, stats.missing, stats.series), (2, 1, 1, 1));
    Ok(())
}

#[test]
fn test_validation_errors_write_nothing() -> Result<()> {
    let catalog = Catalog::in_memory()?;
    let mut upload = submission("X-Men", "1", "A");
    upload.cover_price = "twelve cents".to_string();

    let err = catalog.upload(&upload).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.status(),
        "Invalid value twelve cents for field coverPrice, expected dollars and cents"
    );
    assert!(catalog.browse()?.is_empty());
    assert_eq!(catalog.store().version(), 1);
    Ok(())
}

#[test]
fn test_concurrent_copies_of_one_comic_are_all_kept() -> Result<()> {
    let catalog = Catalog::in_memory()?;
    catalog.upload(&submission("X-Men", "1", "A"))?;

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..25 {
                    catalog.add_book(&copy("X-Men", "1", "A", "FN", "1.00")).unwrap();
                }
            });
        }
    });

    let comic = catalog.lookup("X-Men", "1", "A")?.unwrap();
    assert_eq!(comic.books.len(), 200);
    assert!(!catalog.is_missing(&comic.key())?);
    assert_eq!(xmen_total(&catalog)?, (200, 20000));
    Ok(())
}

#[test]
fn test_search_index_failure_still_commits_the_comic() -> Result<()> {
    let catalog = Catalog::in_memory()?;
    let key = CompositeKey::new("X-Men", "1", "A");
    catalog.upload(&submission("X-Men", "1", "A"))?;

    // An unreadable token set makes every re-index of this comic fail
    catalog
        .store()
        .update(|tx| tx.put(WORD_KEYS_TABLE, &key.serialize(), b"not json"))?;

    let comic = catalog.add_book(&copy("X-Men", "1", "A", "NM", "$20.00"))?;
    assert_eq!(comic.books.len(), 1);
    assert_eq!(catalog.get(&key)?.unwrap().books.len(), 1);
    assert!(!catalog.is_missing(&key)?);
    assert_eq!(xmen_total(&catalog)?, (1, 2000));
    assert_eq!(
        catalog.store().view(|tx| tx.get(WORD_KEYS_TABLE, &key.serialize()))?,
        Some(b"not json".to_vec())
    );

    // Rebuilding drops the bad entry and search works again
    catalog.repair()?;
    assert_eq!(catalog.search("x-men")?.len(), 1);
    Ok(())
}
