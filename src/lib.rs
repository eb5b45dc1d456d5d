pub mod core;
pub mod keys;
pub mod ordering;
pub mod analysis;
pub mod storage;
pub mod record;
pub mod index;

pub use crate::core::catalog::Catalog;
pub use crate::core::config::Config;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::{Book, Comic, Grade, SeriesTotal};

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                          LONGBOX STRUCT ARCHITECTURE                          │
└──────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── CORE LAYER ──────────────────────────────────┐
│  struct Catalog                                                              │
│  │ store: Store                      // redb tables, transactions            │
│  │ index: InvertedIndex              // Analyzer + token postings            │
│  │ stop_words: StopWords             // Loaded once at open                  │
│                                                                              │
│  struct Comic { SeriesId, Issue, CoverId, ..., Books: Vec<Book> }            │
│  struct Book { Grade, Value, Signed }    enum Grade { PR < FR < ... < NM }   │
│  struct SeriesTotal { SeriesId, Count, Value, UpToDate }                     │
│  struct Submission / BookSubmission     // Raw form fields, validated        │
└──────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────── KEYS & ORDERING ─────────────────────────────────┐
│  sanitize / underscore_encode / underscore_decode                            │
│  struct CompositeKey { series, issue, cover }  // NUL-joined when serialized │
│  issue_value: integer → decimal → fraction → FNV-1a                          │
│  SeriesList → Vec<Series> → Vec<TitleBundle>  (Release | Chronology)         │
└──────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────── INDEX LAYER ───────────────────────────────────┐
│  comics/<series>/<issue>      <cover>          → Comic JSON                  │
│  comics_word_idx/<token>      <composite key>  → ()                          │
│  comics_word_keys             <composite key>  → [token, ...]                │
│  comics_missing               <composite key>  → ()                          │
│  comics_totals                <series key>     → SeriesTotal JSON            │
│  text-index                   stop-words       → [word, ...]                 │
└──────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────── STORAGE LAYER ──────────────────────────────────┐
│  struct Store                                                                │
│  │ db: redb::Database                 // Tables of &[u8] → &[u8]             │
│  │ version: AtomicU64                 // Commits since open                  │
│  │                                                                           │
│  ReadTx ──► begin_read()            // Committed snapshot, missing = empty   │
│  WriteTx ─► begin_write() ──Ok──► commit   ──Err──► abort                    │
│  Nested paths: NUL-joined key prefixes, scanned with range(prefix..)         │
│                                                                              │
│  data/                                                                       │
│  └── catalog.redb               // Single file, one process at a time        │
└──────────────────────────────────────────────────────────────────────────────┘
*/
