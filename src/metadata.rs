// src/metadata.rs

use crate::error::AppError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions accepted for managed images, compared case-insensitively.
pub const RECOGNIZED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

pub fn is_valid_image(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    RECOGNIZED_EXTENSIONS
        .iter()
        .any(|known| lower.ends_with(&format!(".{}", known)))
}

/// True when `filename` names an entry directly inside a directory: no
/// separators, no `..`, not absolute.
pub fn is_base_name(filename: &str) -> bool {
    Path::new(filename)
        .file_name()
        .map(|name| name == filename)
        .unwrap_or(false)
}

/// Structured form of a record, as written to the index file and handed
/// out by listings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub filename: String,
    pub title: String,
    pub description: String,
    #[serde(
        rename = "createdAt",
        alias = "created_at",
        deserialize_with = "deserialize_timestamp"
    )]
    pub created_at: DateTime<Utc>,
}

/// Accepts RFC 3339 timestamps and, for older indexes, offset-less ISO-8601
/// ones which are read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// One managed image. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    filename: String,
    title: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl AssetRecord {
    pub fn new(
        filename: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, AppError> {
        Self::with_timestamp(filename.into(), title.into(), description.into(), Utc::now())
    }

    /// Rebuilds a record from the index, keeping its original timestamp.
    pub fn from_entry(entry: IndexEntry) -> Result<Self, AppError> {
        Self::with_timestamp(entry.filename, entry.title, entry.description, entry.created_at)
    }

    fn with_timestamp(
        filename: String,
        title: String,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        if !is_base_name(&filename) || !is_valid_image(&filename) {
            return Err(AppError::InvalidFormat(filename));
        }
        Ok(Self {
            filename,
            title,
            description,
            created_at,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn to_entry(&self) -> IndexEntry {
        IndexEntry {
            filename: self.filename.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_recognized_extensions_in_any_case() {
        for name in [
            "a.png", "a.PNG", "a.jpg", "a.JpG", "a.jpeg", "a.JPEG", "a.gif", "a.Gif", ".png",
        ] {
            assert!(AssetRecord::new(name, "t", "d").is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["notes.txt", "photo.png.bak", "png", "photo.", "", "archive.tiff"] {
            let err = AssetRecord::new(name, "t", "d").unwrap_err();
            assert!(matches!(err, AppError::InvalidFormat(ref f) if f == name));
        }
    }

    #[test]
    fn rejects_names_that_are_not_base_names() {
        for name in ["/tmp/outside.png", "../outside.png", "nested/inner.jpg", "./here.gif", ".."] {
            let err = AssetRecord::new(name, "t", "d").unwrap_err();
            assert!(matches!(err, AppError::InvalidFormat(ref f) if f == name), "{name} should be rejected");
        }
    }

    #[test]
    fn entry_uses_camel_case_timestamp_key() {
        let record = AssetRecord::new("photo1.png", "Sunset", "Evening sky").unwrap();
        let value = serde_json::to_value(record.to_entry()).unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert_eq!(object["filename"], "photo1.png");
        assert_eq!(object["title"], "Sunset");
        assert_eq!(object["description"], "Evening sky");
        assert!(object["createdAt"].is_string());
    }

    #[test]
    fn reads_legacy_snake_case_timestamp() {
        let json = r#"{
            "filename": "cat.jpg",
            "title": "Cat",
            "description": "",
            "created_at": "2024-05-01T10:20:30.123456"
        }"#;
        let entry: IndexEntry = serde_json::from_str(json).unwrap();
        let record = AssetRecord::from_entry(entry).unwrap();

        assert_eq!(record.created_at().to_rfc3339(), "2024-05-01T10:20:30.123456+00:00");
    }

    #[test]
    fn rejects_unparseable_timestamp() {
        let json = r#"{"filename": "cat.jpg", "title": "Cat", "description": "", "createdAt": "yesterday"}"#;
        assert!(serde_json::from_str::<IndexEntry>(json).is_err());
    }

    #[test]
    fn from_entry_revalidates_extension() {
        let entry = IndexEntry {
            filename: "readme.md".to_string(),
            title: "Readme".to_string(),
            description: String::new(),
            created_at: Utc::now(),
        };
        assert!(matches!(AssetRecord::from_entry(entry), Err(AppError::InvalidFormat(_))));
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let json = r#"{"filename": "cat.jpg", "title": "Cat"}"#;
        assert!(serde_json::from_str::<IndexEntry>(json).is_err());
    }
}
