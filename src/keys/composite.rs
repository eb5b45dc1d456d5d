use std::fmt;
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, Result};
use crate::keys::codec::sanitize;

const SEPARATOR: u8 = 0;

/// Storage identity of a comic: the sanitized (series, issue, cover) triple.
///
/// Ordering follows the segments in order. The serialized form joins them
/// with a NUL byte, which sorts below every sanitized character, so byte order
/// and key order agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompositeKey {
    pub series: String,
    pub issue: String,
    pub cover: String,
}

impl CompositeKey {
    pub fn new(series_id: &str, issue: &str, cover_id: &str) -> Self {
        CompositeKey {
            series: sanitize(series_id),
            issue: sanitize(issue),
            cover: sanitize(cover_id),
        }
    }

    /// Builds a key from segments that are already sanitized (path variables).
    pub fn from_segments(series: &str, issue: &str, cover: &str) -> Self {
        CompositeKey {
            series: series.to_string(),
            issue: issue.to_string(),
            cover: cover.to_string(),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.series.len() + self.issue.len() + self.cover.len() + 2);
        out.extend_from_slice(self.series.as_bytes());
        out.push(SEPARATOR);
        out.extend_from_slice(self.issue.as_bytes());
        out.push(SEPARATOR);
        out.extend_from_slice(self.cover.as_bytes());
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| Error::corrupted("Invalid UTF-8 in composite key"))?;
        let parts: Vec<&str> = text.split(SEPARATOR as char).collect();
        match parts.as_slice() {
            [series, issue, cover] => Ok(CompositeKey::from_segments(series, issue, cover)),
            _ => Err(Error::corrupted(format!("Malformed composite key '{}'", text))),
        }
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}/{}", self.series, self.issue, self.cover)
    }
}
