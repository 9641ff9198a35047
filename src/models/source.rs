//! Gallery data loading.
//!
//! The gallery is described by a static list of records kept next to the
//! media folders, either as plain JSON (`gallery.json`) or as a script that
//! assigns the list to a constant (`gallery.js`):
//!
//! ```text
//! const GALLERY_DATA = [
//!   { "fileName": "IMG_0001.jpg", "message": "First day", "date": "2023-05-01" }
//! ];
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::MediaItem;

/// Data files probed in the gallery root, in order.
pub const SOURCE_FILES: [&str; 2] = ["gallery.json", "gallery.js"];

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no gallery data was provided")]
    Absent,

    #[error("gallery data not found in {0}")]
    NotFound(PathBuf),

    #[error("failed to read gallery data {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("gallery data is not a list")]
    NotAnArray,

    #[error("gallery script could not be parsed: {reason}")]
    InvalidScript { reason: String },

    #[error("gallery record {index} is malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("gallery record {index} has an unreadable date: {date}")]
    BadDate { index: usize, date: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Millis(i64),
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "fileName")]
    file_name: String,
    #[serde(default)]
    message: Option<String>,
    date: RawDate,
}

/// Parse a calendar date as written in gallery records.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Decode the record list. `None` stands for a source that was never supplied.
pub fn decode(source: Option<&Value>) -> Result<Vec<MediaItem>, SourceError> {
    let records = source
        .ok_or(SourceError::Absent)?
        .as_array()
        .ok_or(SourceError::NotAnArray)?;

    records
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let raw = RawRecord::deserialize(value)
                .map_err(|source| SourceError::Malformed { index, source })?;
            let date = match raw.date {
                RawDate::Text(text) => {
                    parse_date(&text).ok_or(SourceError::BadDate { index, date: text })?
                }
                RawDate::Millis(ms) => DateTime::from_timestamp_millis(ms)
                    .map(|dt| dt.naive_utc())
                    .ok_or(SourceError::BadDate {
                        index,
                        date: ms.to_string(),
                    })?,
            };
            Ok(MediaItem::new(raw.file_name, raw.message, date))
        })
        .collect()
}

/// Parse either plain JSON or a `gallery.js` script.
///
/// In a script, the value is the expression following the first `=`. Only
/// that one JSON value is read, so a trailing `;`, comments or later
/// statements are left alone.
fn parse_text(text: &str) -> Result<Value, SourceError> {
    let json_error = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let Some((_, expression)) = text.split_once('=') else {
        return Err(SourceError::InvalidScript {
            reason: json_error.to_string(),
        });
    };
    let expression = expression.trim_start();
    if !expression.starts_with('[') {
        return Err(SourceError::NotAnArray);
    }

    match serde_json::Deserializer::from_str(expression)
        .into_iter::<Value>()
        .next()
    {
        Some(Ok(value)) => Ok(value),
        Some(Err(err)) => Err(SourceError::InvalidScript {
            reason: err.to_string(),
        }),
        None => Err(SourceError::NotAnArray),
    }
}

/// Locate the data file in a gallery root.
pub fn find_source(root: &Path) -> Option<PathBuf> {
    SOURCE_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Read and decode the gallery data found in `root`.
pub fn read_source(root: &Path) -> Result<Vec<MediaItem>, SourceError> {
    let path = find_source(root).ok_or_else(|| SourceError::NotFound(root.to_path_buf()))?;
    debug!(?path, "Reading gallery data");

    let text = std::fs::read_to_string(&path).map_err(|source| SourceError::Unreadable {
        path: path.clone(),
        source,
    })?;
    let value = parse_text(&text)?;
    let items = decode(Some(&value))?;

    info!(count = items.len(), ?path, "Loaded gallery data");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_absent_source() {
        assert!(matches!(decode(None), Err(SourceError::Absent)));
    }

    #[test]
    fn test_decode_rejects_non_list() {
        let value = json!({ "fileName": "a.jpg" });
        assert!(matches!(decode(Some(&value)), Err(SourceError::NotAnArray)));
    }

    #[test]
    fn test_decode_records() {
        let value = json!([
            { "fileName": "a.jpg", "message": "hello", "date": "2023-05-01" },
            { "fileName": "b.mp4", "date": "2023-05-02T10:30:00" },
        ]);
        let items = decode(Some(&value)).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].filename, "a.jpg");
        assert_eq!(items[0].description.as_deref(), Some("hello"));
        assert_eq!(items[1].description, None);
        assert_eq!(items[1].kind(), crate::models::MediaKind::Video);
    }

    #[test]
    fn test_decode_reports_bad_date() {
        let value = json!([{ "fileName": "a.jpg", "date": "yesterday" }]);
        assert!(matches!(
            decode(Some(&value)),
            Err(SourceError::BadDate { index: 0, .. })
        ));
    }

    #[test]
    fn test_decode_reports_missing_filename() {
        let value = json!([
            { "fileName": "a.jpg", "date": "2023-05-01" },
            { "date": "2023-05-01" },
        ]);
        assert!(matches!(
            decode(Some(&value)),
            Err(SourceError::Malformed { index: 1, .. })
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        let midnight = parse_date("2023-05-01").unwrap();
        assert_eq!(midnight.to_string(), "2023-05-01 00:00:00");
        assert!(parse_date("2023-05-01 08:15").is_some());
        assert!(parse_date("2023-05-01T08:15:30.250").is_some());

        let zoned = parse_date("2023-05-01T10:00:00+02:00").unwrap();
        assert_eq!(zoned.to_string(), "2023-05-01 08:00:00");
        assert!(parse_date("05/01/2023").is_none());
    }

    #[test]
    fn test_millisecond_dates() {
        let value = json!([{ "fileName": "a.jpg", "date": 0 }]);
        let items = decode(Some(&value)).unwrap();
        assert_eq!(items[0].date.to_string(), "1970-01-01 00:00:00");
    }

    #[test]
    fn test_read_source_from_script() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("gallery.js"),
            "const GALLERY_DATA = [\n  {\"fileName\": \"a.jpg\", \"message\": \"x\", \"date\": \"2022-01-01\"}\n];\n",
        )
        .unwrap();

        let items = read_source(dir.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].filename, "a.jpg");
    }

    #[test]
    fn test_read_source_prefers_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("gallery.json"),
            r#"[{"fileName": "from-json.jpg", "date": "2022-01-01"}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("gallery.js"), "const GALLERY_DATA = [];").unwrap();

        let items = read_source(dir.path()).unwrap();
        assert_eq!(items[0].filename, "from-json.jpg");
    }

    #[test]
    fn test_read_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_source(dir.path()),
            Err(SourceError::NotFound(_))
        ));
    }

    #[test]
    fn test_read_source_object_script() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gallery.js"), "const GALLERY_DATA = {};").unwrap();
        assert!(matches!(
            read_source(dir.path()),
            Err(SourceError::NotAnArray)
        ));
    }

    #[test]
    fn test_read_source_object_wrapping_a_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("gallery.js"),
            r#"const GALLERY_DATA = { "items": [ {"fileName": "a.jpg", "date": "2022-01-01"} ] };"#,
        )
        .unwrap();
        assert!(matches!(
            read_source(dir.path()),
            Err(SourceError::NotAnArray)
        ));
    }

    #[test]
    fn test_read_source_ignores_trailing_script() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("gallery.js"),
            "const GALLERY_DATA = [{\"fileName\": \"a.jpg\", \"date\": \"2022-01-01\"}];\n// see [notes]\nconsole.log(GALLERY_DATA[0]);\n",
        )
        .unwrap();

        let items = read_source(dir.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].filename, "a.jpg");
    }

    #[test]
    fn test_broken_script_is_not_a_record_error() {
        assert!(matches!(
            parse_text("const GALLERY_DATA = [{\"fileName\": };"),
            Err(SourceError::InvalidScript { .. })
        ));
        assert!(matches!(
            parse_text("GALLERY_DATA;"),
            Err(SourceError::InvalidScript { .. })
        ));
    }
}
