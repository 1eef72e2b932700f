// ABOUTME: Persists the collected record list and reads it back for deletion
// ABOUTME: Writes are atomic; malformed files are rejected before any network call

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::error::DeleterError;
use crate::remote::Record;

/// Writes `records` as pretty-printed JSON, replacing `path` atomically.
pub fn save_records(path: &Path, records: &[Record]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut file, records).context("Failed to serialize records")?;
    file.write_all(b"\n")?;
    file.flush()?;
    file.persist(path)
        .map_err(|e| DeleterError::Storage(format!("{}: {}", path.display(), e.error)))?;

    tracing::info!(count = records.len(), path = %path.display(), "Saved records");
    Ok(())
}

/// Saves a finished collection. An empty collection leaves `path` untouched;
/// returns whether the file was written.
pub fn save_collection(path: &Path, records: &[Record]) -> Result<bool> {
    if records.is_empty() {
        tracing::info!(path = %path.display(), "Nothing collected, not writing records");
        return Ok(false);
    }
    save_records(path, records)?;
    Ok(true)
}

/// Reads a record list. The file must hold a JSON array whose first entry
/// carries both `id` and `channel_id`; later entries are checked per record
/// at deletion time.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    parse_records(&contents)
}

pub fn parse_records(contents: &str) -> Result<Vec<Record>> {
    let value: serde_json::Value = serde_json::from_str(contents)
        .map_err(|e| DeleterError::MalformedInput(format!("invalid JSON: {}", e)))?;

    if !value.is_array() {
        return Err(
            DeleterError::MalformedInput("file does not contain a JSON array".to_string()).into(),
        );
    }

    let records: Vec<Record> = serde_json::from_value(value)
        .map_err(|e| DeleterError::MalformedInput(format!("unexpected record shape: {}", e)))?;

    if let Some(first) = records.first() {
        if first.key().is_none() {
            return Err(DeleterError::MalformedInput(
                "records do not seem to have 'id' and 'channel_id' properties".to_string(),
            )
            .into());
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed(result: Result<Vec<Record>>) -> bool {
        matches!(
            result.unwrap_err().downcast_ref::<DeleterError>(),
            Some(DeleterError::MalformedInput(_))
        )
    }

    #[test]
    fn test_round_trip_preserves_order_and_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("found_messages.json");

        let mut records: Vec<Record> = (0..5)
            .map(|i| Record::new(format!("m{}", i), format!("c{}", i % 2)))
            .collect();
        records[2]
            .payload
            .insert("content".to_string(), serde_json::json!("hello"));

        save_records(&path, &records).unwrap();
        let loaded = load_records(&path).unwrap();

        assert_eq!(loaded, records);
        let pairs: Vec<_> = loaded.iter().filter_map(Record::key).collect();
        assert_eq!(
            pairs,
            vec![("c0", "m0"), ("c1", "m1"), ("c0", "m2"), ("c1", "m3"), ("c0", "m4")]
        );
    }

    #[test]
    fn test_empty_collection_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("found_messages.json");

        assert!(!save_collection(&path, &[]).unwrap());
        assert!(!path.exists());

        assert!(save_collection(&path, &[Record::new("1", "2")]).unwrap());
        assert_eq!(load_records(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_collection_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("found_messages.json");
        save_records(&path, &[Record::new("1", "2")]).unwrap();

        assert!(!save_collection(&path, &[]).unwrap());
        assert_eq!(load_records(&path).unwrap(), vec![Record::new("1", "2")]);
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(malformed(parse_records(r#"{"id": "1", "channel_id": "2"}"#)));
        assert!(malformed(parse_records("not json")));
    }

    #[test]
    fn test_rejects_first_record_without_ids() {
        assert!(malformed(parse_records(r#"[{"id": "1"}, {"id": "2", "channel_id": "3"}]"#)));
    }

    #[test]
    fn test_tolerates_later_incomplete_records() {
        let records = parse_records(r#"[{"id": "1", "channel_id": "2"}, {"content": "x"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].key(), None);
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_not_malformed() {
        let err = load_records(Path::new("/nonexistent/found_messages.json")).unwrap_err();
        assert!(err.downcast_ref::<DeleterError>().is_none());
    }
}
