//! Book models and catalog wire payloads

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Sentinel used when a work payload carries no title.
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Sentinel used when a work payload carries no description.
pub const NO_DESCRIPTION: &str = "No description available";
/// Sentinel used when the creation timestamp is missing or unparseable.
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// Opaque catalog work key, e.g. `/works/OL45883W`.
///
/// Keys are caller-supplied path segments; the aggregator never deduplicates
/// them, so passing the same key twice yields two records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkKey(String);

impl WorkKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WorkKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for WorkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cover image sizes served by the covers endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Small,
    Medium,
    Large,
}

impl CoverSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverSize::Small => "S",
            CoverSize::Medium => "M",
            CoverSize::Large => "L",
        }
    }
}

/// List-friendly work summary from a subject listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub title: String,
    pub key: WorkKey,
    pub cover_edition_key: String,
}

/// A work resolved by the detail aggregator.
///
/// Constructed once the primary fetch decodes; `author_name` and `cover`
/// stay empty until the matching [`RecordPatch`] arrives (if ever).
#[derive(Debug, Clone, PartialEq)]
pub struct BookDetailRecord {
    /// Echoes the input key.
    pub key: WorkKey,
    /// Dispatch index, captured before the fetch was issued. Results arrive
    /// in completion order; sort by this for input order.
    pub ordinal: usize,
    pub title: String,
    pub description: String,
    pub published: String,
    pub author_key: Option<String>,
    pub author_name: Option<String>,
    pub cover: Option<Vec<u8>>,
}

/// Late-arriving secondary data for an already delivered record.
#[derive(Debug, Clone)]
pub struct RecordPatch {
    pub ordinal: usize,
    pub key: WorkKey,
    pub change: PatchChange,
}

#[derive(Debug, Clone)]
pub enum PatchChange {
    AuthorName(String),
    CoverImage(Vec<u8>),
}

impl RecordPatch {
    /// Apply this patch to the record it targets, matched by ordinal and key.
    /// Returns false when no record matches (e.g. the primary fetch failed).
    pub fn apply_to(&self, records: &mut [BookDetailRecord]) -> bool {
        let target = records
            .iter_mut()
            .find(|r| r.ordinal == self.ordinal && r.key == self.key);
        match target {
            Some(record) => {
                match &self.change {
                    PatchChange::AuthorName(name) => record.author_name = Some(name.clone()),
                    PatchChange::CoverImage(bytes) => record.cover = Some(bytes.clone()),
                }
                true
            }
            None => false,
        }
    }
}

// --- Wire payloads -----------------------------------------------------------

/// Raw work payload from the catalog detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkPayload {
    pub title: Option<String>,
    pub description: Option<DescriptionField>,
    pub created: Option<TimestampField>,
    #[serde(default)]
    pub authors: Vec<AuthorEntry>,
    #[serde(default)]
    pub covers: Vec<i64>,
}

/// The catalog serves descriptions either as a bare string or a typed value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DescriptionField {
    Text(String),
    Typed { value: String },
}

impl DescriptionField {
    pub fn into_text(self) -> String {
        match self {
            DescriptionField::Text(s) => s,
            DescriptionField::Typed { value } => value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimestampField {
    pub value: String,
}

/// Author linkage on a work. Listings nest the reference under `author`,
/// some records carry the key directly.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorEntry {
    pub author: Option<KeyRef>,
    pub key: Option<String>,
}

impl AuthorEntry {
    pub fn key(&self) -> Option<&str> {
        self.author
            .as_ref()
            .map(|a| a.key.as_str())
            .or(self.key.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyRef {
    pub key: String,
}

impl WorkPayload {
    /// First cover identifier, used for the secondary cover fetch.
    pub fn first_cover_id(&self) -> Option<i64> {
        self.covers.first().copied()
    }

    /// First author identifier with the `/authors/` path prefix stripped.
    pub fn first_author_id(&self) -> Option<String> {
        self.authors
            .iter()
            .find_map(|entry| entry.key())
            .map(|key| key.trim_start_matches("/authors/").to_string())
    }

    /// Shape the payload into a record, filling sentinels for absent fields.
    pub fn into_record(self, ordinal: usize, key: WorkKey) -> BookDetailRecord {
        let author_key = self.first_author_id();
        let published = self
            .created
            .as_ref()
            .and_then(|c| format_created_date(&c.value))
            .unwrap_or_else(|| UNKNOWN_DATE.to_string());
        BookDetailRecord {
            key,
            ordinal,
            title: self.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            description: self
                .description
                .map(DescriptionField::into_text)
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            published,
            author_key,
            author_name: None,
            cover: None,
        }
    }
}

/// Subject listing payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectPayload {
    #[serde(default)]
    pub works: Vec<SubjectWork>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectWork {
    pub title: Option<String>,
    pub key: Option<String>,
    pub cover_edition_key: Option<String>,
}

impl SubjectWork {
    /// Entries missing a title, key or cover edition are skipped entirely.
    pub fn into_summary(self) -> Option<BookSummary> {
        Some(BookSummary {
            title: self.title?,
            key: WorkKey::new(self.key?),
            cover_edition_key: self.cover_edition_key?,
        })
    }
}

/// Format a catalog creation timestamp (ISO-8601 with fractional seconds)
/// as `dd Month, yyyy`. Returns None when the value does not parse.
pub fn format_created_date(raw: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.format("%d %B, %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_created_date() {
        assert_eq!(
            format_created_date("2009-12-11T01:57:19.964652"),
            Some("11 December, 2009".to_string())
        );
        assert_eq!(
            format_created_date("2021-01-05T10:00:00"),
            Some("05 January, 2021".to_string())
        );
        assert_eq!(format_created_date("not-a-date"), None);
    }

    #[test]
    fn test_description_shapes() {
        let typed: WorkPayload =
            serde_json::from_str(r#"{"title":"T","description":{"value":"long text"}}"#).unwrap();
        assert_eq!(
            typed.description.unwrap().into_text(),
            "long text".to_string()
        );

        let bare: WorkPayload =
            serde_json::from_str(r#"{"title":"T","description":"short text"}"#).unwrap();
        assert_eq!(
            bare.description.unwrap().into_text(),
            "short text".to_string()
        );
    }

    #[test]
    fn test_into_record_sentinels() {
        let payload: WorkPayload = serde_json::from_str("{}").unwrap();
        let record = payload.into_record(3, WorkKey::from("/works/OL1W"));
        assert_eq!(record.title, UNKNOWN_TITLE);
        assert_eq!(record.description, NO_DESCRIPTION);
        assert_eq!(record.published, UNKNOWN_DATE);
        assert_eq!(record.author_key, None);
        assert_eq!(record.ordinal, 3);
    }

    #[test]
    fn test_author_key_shapes() {
        let nested: WorkPayload = serde_json::from_str(
            r#"{"authors":[{"author":{"key":"/authors/OL23919A"}}]}"#,
        )
        .unwrap();
        assert_eq!(nested.first_author_id(), Some("OL23919A".to_string()));

        let flat: WorkPayload =
            serde_json::from_str(r#"{"authors":[{"key":"/authors/OL99A"}]}"#).unwrap();
        assert_eq!(flat.first_author_id(), Some("OL99A".to_string()));
    }

    #[test]
    fn test_subject_work_requires_all_fields() {
        let entry = SubjectWork {
            title: Some("T".into()),
            key: Some("/works/OL1W".into()),
            cover_edition_key: None,
        };
        assert!(entry.into_summary().is_none());
    }

    #[test]
    fn test_patch_targets_matching_record() {
        let mut records = vec![BookDetailRecord {
            key: WorkKey::from("/works/OL1W"),
            ordinal: 0,
            title: "T".into(),
            description: "D".into(),
            published: UNKNOWN_DATE.into(),
            author_key: None,
            author_name: None,
            cover: None,
        }];
        let patch = RecordPatch {
            ordinal: 0,
            key: WorkKey::from("/works/OL1W"),
            change: PatchChange::AuthorName("A. Author".into()),
        };
        assert!(patch.apply_to(&mut records));
        assert_eq!(records[0].author_name.as_deref(), Some("A. Author"));

        let miss = RecordPatch {
            ordinal: 7,
            key: WorkKey::from("/works/OL7W"),
            change: PatchChange::CoverImage(vec![1, 2, 3]),
        };
        assert!(!miss.apply_to(&mut records));
    }
}
