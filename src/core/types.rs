use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, Result};
use crate::keys::composite::CompositeKey;
use crate::ordering::issue::issue_value;

/// Condition of a physical copy, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grade {
    Poor,
    Fair,
    Good,
    VeryGood,
    Fine,
    VeryFine,
    NearMint,
}

impl Grade {
    pub const ALL: [Grade; 7] = [
        Grade::Poor,
        Grade::Fair,
        Grade::Good,
        Grade::VeryGood,
        Grade::Fine,
        Grade::VeryFine,
        Grade::NearMint,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Grade::Poor => "PR",
            Grade::Fair => "FR",
            Grade::Good => "GD",
            Grade::VeryGood => "VG",
            Grade::Fine => "FN",
            Grade::VeryFine => "VF",
            Grade::NearMint => "NM",
        }
    }
}

impl FromStr for Grade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim();
        Grade::ALL
            .into_iter()
            .find(|g| g.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| Error::invalid_input(format!("Unknown grade {}", s)))
    }
}

impl TryFrom<String> for Grade {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.code().to_string()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One physical owned copy of a comic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Book {
    pub grade: Grade,
    pub value: i64,                 // cents
    #[serde(default)]
    pub signed: bool,
}

impl Book {
    pub fn new(grade: Grade, value: i64) -> Self {
        Book { grade, value, signed: false }
    }

    pub fn format_value(&self) -> String {
        format_currency(self.value)
    }
}

/// One distinct cover of one issue. Field names are the persisted JSON names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Comic {
    pub series_id: String,
    pub issue: String,
    pub cover_id: String,

    pub title: String,
    pub subtitle: String,
    pub publisher: String,
    pub year: i32,
    pub month: i32,
    pub cover_price: i64,           // cents
    pub chron_offset: i64,

    pub author: String,
    pub cover_artist: String,
    pub pencils: String,
    pub inks: String,
    pub colors: String,
    pub letters: String,
    pub notes: String,

    pub cover_path: String,
    pub books: Vec<Book>,
}

impl Comic {
    pub fn new(series_id: &str, issue: &str, cover_id: &str) -> Self {
        Comic {
            series_id: series_id.to_string(),
            issue: issue.to_string(),
            cover_id: cover_id.to_string(),
            ..Comic::default()
        }
    }

    pub fn key(&self) -> CompositeKey {
        CompositeKey::new(&self.series_id, &self.issue, &self.cover_id)
    }

    /// Whether `other` names the same raw (SeriesId, Issue, CoverId).
    pub fn same_identity(&self, other: &Comic) -> bool {
        self.series_id == other.series_id
            && self.issue == other.issue
            && self.cover_id == other.cover_id
    }

    pub fn is_missing(&self) -> bool {
        self.books.is_empty()
    }

    /// The owned copy in the best condition; the first one on ties.
    pub fn best(&self) -> Option<&Book> {
        self.books
            .iter()
            .rev()
            .max_by_key(|b| b.grade)
    }

    pub fn issue_value(&self) -> f64 {
        issue_value(&self.issue)
    }

    /// Fields that feed the search index.
    pub fn indexed_fields(&self) -> [&str; 9] {
        [
            &self.title,
            &self.subtitle,
            &self.author,
            &self.cover_artist,
            &self.pencils,
            &self.inks,
            &self.colors,
            &self.letters,
            &self.notes,
        ]
    }

    /// Relative cover image path for an upload with extension `ext` (".jpg").
    pub fn cover_path_for(&self, ext: &str) -> String {
        let key = self.key();
        format!("{}/{}_{}{}", key.series, key.issue, key.cover, ext)
    }

    /// Issue without the zero padding used to make it sort as text.
    pub fn format_issue(&self) -> &str {
        let trimmed = self.issue.trim_start_matches('0');
        if trimmed.is_empty() && !self.issue.is_empty() {
            "0"
        } else {
            trimmed
        }
    }

    pub fn format_date(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }

    pub fn format_cover_price(&self) -> String {
        format_currency(self.cover_price)
    }

    /// Copies the descriptive fields of `submitted`. Identity and books stay;
    /// the cover path only changes when one was submitted.
    pub fn merge_from(&mut self, submitted: Comic) {
        self.title = submitted.title;
        self.subtitle = submitted.subtitle;
        self.publisher = submitted.publisher;
        self.year = submitted.year;
        self.month = submitted.month;
        self.cover_price = submitted.cover_price;
        self.chron_offset = submitted.chron_offset;
        self.author = submitted.author;
        self.cover_artist = submitted.cover_artist;
        self.pencils = submitted.pencils;
        self.inks = submitted.inks;
        self.colors = submitted.colors;
        self.letters = submitted.letters;
        self.notes = submitted.notes;
        if !submitted.cover_path.is_empty() {
            self.cover_path = submitted.cover_path;
        }
    }
}

/// Cached owned-book count and value of one series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SeriesTotal {
    pub series_id: String,
    pub count: u64,
    pub value: i64,
    pub up_to_date: bool,
}

impl SeriesTotal {
    pub fn format_value(&self) -> String {
        format_currency(self.value)
    }
}

/// `1234` -> `"$12.34"`.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, cents / 100, cents % 100)
}
