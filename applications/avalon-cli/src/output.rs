/// CSV and JSON writers for command output
use crate::error::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Write rows under a fixed header line. The header is written even when
/// there are no rows.
pub fn write_csv<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write JSON with four-space indentation.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = io::BufWriter::new(file);
    write_indented(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Pretty-print JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_indented(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

fn write_indented<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use avalon_client::FileIdRow;

    #[test]
    fn test_csv_header_without_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_csv::<FileIdRow>(&path, &["id", "label"], &[]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,label\n");
    }

    #[test]
    fn test_csv_rows_quote_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let rows = vec![FileIdRow {
            id: "mf1".into(),
            label: "Part 1, side A".into(),
            parent_label: "Oral history".into(),
            derivative: "file:///d/low.mp4".into(),
        }];

        write_csv(&path, &["id", "label", "parent label", "derivative"], &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "id,label,parent label,derivative\nmf1,\"Part 1, side A\",Oral history,file:///d/low.mp4\n"
        );
    }

    #[test]
    fn test_json_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_json(&path, &serde_json::json!({ "a": [1] })).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\n    \"a\": [\n        1\n    ]\n}"
        );
    }
}
