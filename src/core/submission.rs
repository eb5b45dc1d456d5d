use std::sync::LazyLock;
use regex::Regex;
use serde::Deserialize;
use crate::core::error::{Error, Result};
use crate::core::types::{Book, Comic, Grade};

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]{4})-([0-9]{2})\s*$").expect("date pattern is valid"));
static MONEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\$?\s*([0-9]+)(\.([0-9]{2}))?\s*$").expect("money pattern is valid")
});

/// Raw text fields of an upload, as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    pub series_id: String,
    pub issue: String,
    pub cover_id: String,
    pub title: String,
    pub subtitle: String,
    pub publisher: String,
    pub date: String,
    pub chron_offset: String,
    pub cover_price: String,
    pub author: String,
    pub cover_artist: String,
    pub pencils: String,
    pub inks: String,
    pub colors: String,
    pub letters: String,
    pub notes: String,
    pub cover_path: String,
    pub grade: String,
    pub value: String,
    pub signed: bool,
}

/// A copy being added to a comic already in the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookSubmission {
    pub series_id: String,
    pub issue: String,
    pub cover_id: String,
    pub grade: String,
    pub value: String,
    pub signed: bool,
}

fn required<'a>(field: &str, text: &'a str) -> Result<&'a str> {
    if text.is_empty() {
        Err(Error::invalid_input(format!("Missing required field {}", field)))
    } else {
        Ok(text)
    }
}

/// `"$12.50"`, `"12"` or `" 3.05 "` to cents.
pub fn parse_money(field: &str, text: &str) -> Result<i64> {
    let invalid = || {
        Error::invalid_input(format!(
            "Invalid value {} for field {}, expected dollars and cents",
            text, field
        ))
    };
    let caps = MONEY.captures(required(field, text)?).ok_or_else(invalid)?;
    let dollars: i64 = caps[1].parse().map_err(|_| invalid())?;
    let cents: i64 = match caps.get(3) {
        Some(c) => c.as_str().parse().map_err(|_| invalid())?,
        None => 0,
    };
    dollars
        .checked_mul(100)
        .and_then(|d| d.checked_add(cents))
        .ok_or_else(invalid)
}

/// `"YYYY-MM"` to (year, month).
pub fn parse_date(field: &str, text: &str) -> Result<(i32, i32)> {
    let invalid = || Error::invalid_input(format!("Invalid date {}, expected YYYY-MM", text));
    let caps = DATE.captures(required(field, text)?).ok_or_else(invalid)?;
    let year = caps[1].parse().map_err(|_| invalid())?;
    let month = caps[2].parse().map_err(|_| invalid())?;
    Ok((year, month))
}

pub fn parse_int(field: &str, text: &str) -> Result<i64> {
    required(field, text)?
        .parse()
        .map_err(|_| Error::invalid_input(format!("Field {} must be an integer", field)))
}

/// Grade plus value, or `None` when no grade was submitted.
fn parse_book(grade: &str, value: &str, signed: bool) -> Result<Option<Book>> {
    if grade.is_empty() {
        return Ok(None);
    }
    let grade: Grade = grade.parse()?;
    let value = parse_money("value", value)?;
    Ok(Some(Book { grade, value, signed }))
}

impl Submission {
    /// Validates every field; the first failure is returned. Produces the
    /// submitted comic (no books) and the copy to append, if any.
    pub fn validate(&self) -> Result<(Comic, Option<Book>)> {
        let series_id = required("seriesId", &self.series_id)?;
        let issue = required("issue", &self.issue)?;
        let cover_id = required("coverId", &self.cover_id)?;
        let publisher = required("publisher", &self.publisher)?;
        let title = required("title", &self.title)?;
        let chron_offset = parse_int("chronOffset", &self.chron_offset)?;
        let (year, month) = parse_date("date", &self.date)?;
        let cover_price = parse_money("coverPrice", &self.cover_price)?;
        let book = parse_book(&self.grade, &self.value, self.signed)?;

        let comic = Comic {
            series_id: series_id.to_string(),
            issue: issue.to_string(),
            cover_id: cover_id.to_string(),
            title: title.to_string(),
            subtitle: self.subtitle.clone(),
            publisher: publisher.to_string(),
            year,
            month,
            cover_price,
            chron_offset,
            author: self.author.clone(),
            cover_artist: self.cover_artist.clone(),
            pencils: self.pencils.clone(),
            inks: self.inks.clone(),
            colors: self.colors.clone(),
            letters: self.letters.clone(),
            notes: self.notes.clone(),
            cover_path: self.cover_path.clone(),
            books: Vec::new(),
        };
        Ok((comic, book))
    }
}

impl BookSubmission {
    pub fn validate(&self) -> Result<(Comic, Book)> {
        let series_id = required("seriesId", &self.series_id)?;
        let issue = required("issue", &self.issue)?;
        let cover_id = required("coverId", &self.cover_id)?;
        let grade = required("grade", &self.grade)?;
        let book = parse_book(grade, &self.value, self.signed)?
            .ok_or_else(|| Error::invalid_input("Missing required field grade"))?;
        Ok((Comic::new(series_id, issue, cover_id), book))
    }
}
