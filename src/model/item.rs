use crate::error::{MirrorError, Result};
use serde::{Deserialize, Serialize};

/// Prefix of the canonical URL of a single playlist item
const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// One playlist item as enumerated by the downloader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// Display title, fully decoded (astral characters included)
    pub title: String,

    /// Opaque remote identifier
    pub id: String,

    /// The original serialized line, without its terminator
    pub raw: String,
}

/// Fields we require from a record; everything else stays in `raw`
#[derive(Debug, Serialize, Deserialize)]
struct RecordFields {
    title: String,
    id: String,
}

impl ItemRecord {
    /// Parse one line of newline-delimited JSON into an item record
    ///
    /// JSON escapes are decoded into Unicode scalar values, so an emoji
    /// written either literally or as an escaped surrogate pair ends up as
    /// the same single `char`. An unpaired surrogate cannot be represented
    /// in a `String` and is rejected rather than replaced.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.strip_suffix('\n').unwrap_or(raw);
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        let fields: RecordFields =
            serde_json::from_str(raw).map_err(|e| MirrorError::MalformedRecord {
                reason: e.to_string(),
            })?;

        Ok(Self {
            title: fields.title,
            id: fields.id,
            raw: raw.to_string(),
        })
    }

    /// Canonical URL of this item
    pub fn url(&self) -> String {
        format!("{}{}", WATCH_URL_BASE, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_playlist_entry() {
        let raw = r#"{"_type": "url", "ie_key": "Youtube", "id": "dQw4w9WgXcQ", "url": "dQw4w9WgXcQ", "title": "Never Gonna Give You Up", "duration": 212.0}"#;
        let record = ItemRecord::parse(raw).unwrap();

        assert_eq!(record.title, "Never Gonna Give You Up");
        assert_eq!(record.id, "dQw4w9WgXcQ");
        assert_eq!(record.raw, raw);
        assert_eq!(record.url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_line_terminator_is_not_part_of_raw() {
        let record = ItemRecord::parse("{\"title\": \"A\", \"id\": \"a1\"}\r\n").unwrap();
        assert_eq!(record.raw, "{\"title\": \"A\", \"id\": \"a1\"}");
    }

    #[test]
    fn test_escaped_surrogate_pair_decodes_to_one_char() {
        let record = ItemRecord::parse(r#"{"title": "party \ud83c\udf89 time", "id": "x"}"#).unwrap();

        assert_eq!(record.title, "party \u{1F389} time");
        assert_eq!(record.title.chars().filter(|c| *c == '\u{1F389}').count(), 1);
        // The raw line keeps the escaped form untouched
        assert!(record.raw.contains(r"\ud83c\udf89"));
    }

    #[test]
    fn test_literal_astral_title_round_trips() {
        let title = "\u{1F600} grinning \u{1D11E} clef";
        let raw = serde_json::to_string(&RecordFields {
            title: title.to_string(),
            id: "e1".to_string(),
        })
        .unwrap();

        let record = ItemRecord::parse(&raw).unwrap();
        assert_eq!(record.title, title);

        let reserialized = serde_json::to_string(&RecordFields {
            title: record.title.clone(),
            id: record.id.clone(),
        })
        .unwrap();
        assert_eq!(ItemRecord::parse(&reserialized).unwrap().title, title);
    }

    #[test]
    fn test_lone_surrogate_is_rejected() {
        let result = ItemRecord::parse(r#"{"title": "broken \ud83d here", "id": "x"}"#);
        assert!(matches!(result, Err(MirrorError::MalformedRecord { .. })));
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        assert!(matches!(
            ItemRecord::parse(r#"{"id": "only-id"}"#),
            Err(MirrorError::MalformedRecord { .. })
        ));
        assert!(matches!(
            ItemRecord::parse(r#"{"title": "only title"}"#),
            Err(MirrorError::MalformedRecord { .. })
        ));
        assert!(matches!(
            ItemRecord::parse(r#"{"title": null, "id": "x"}"#),
            Err(MirrorError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(ItemRecord::parse("not json").is_err());
        assert!(ItemRecord::parse("").is_err());
        assert!(ItemRecord::parse("42").is_err());
        assert!(ItemRecord::parse(r#"{"title": "truncated", "id": "#).is_err());
    }
}
