//! JSON and text side files

use std::fs;
use std::path::Path;

use serde::Serialize;

use super::ExportError;

/// Write `value` as indented JSON
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> Result<(), ExportError> {
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRecord;

    #[test]
    fn test_json_keeps_record_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models.json");

        let mut record = EntityRecord::new();
        record.insert("Name", "crate");
        record.insert("PosX", "1.0000");
        record.insert("Scale", "1.0000");
        write_json(&path, &[record]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let name = text.find("\"Name\"").unwrap();
        let pos = text.find("\"PosX\"").unwrap();
        let scale = text.find("\"Scale\"").unwrap();
        assert!(name < pos && pos < scale);

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["Name"], "crate");
    }

    #[test]
    fn test_write_text_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ents.txt");
        write_text(&path, "{\n\"a\" \"b\"\n}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n\"a\" \"b\"\n}");
    }
}
