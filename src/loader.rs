//! Loading format tables and dictionaries from disk.

use crate::decoder::FormatTable;
use crate::error::{Result, ResultExt, StylometryError};
use crate::opcodes::OpcodeTable;
use crate::patterns::Dictionary;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a format table file: one template per line, blank lines ignored.
pub fn load_formats<P: AsRef<Path>>(path: P) -> Result<FormatTable> {
    let path = path.as_ref();
    let text = read_text(path)?;
    let table = FormatTable::parse(&text)
        .context(format!("format table {}", path.display()))?;
    debug!(path = %path.display(), formats = table.len(), "loaded format table");
    Ok(table)
}

/// Read a dictionary file, interning its opcodes in `opcodes`.
pub fn load_dictionary<P: AsRef<Path>>(
    path: P,
    formats: &FormatTable,
    opcodes: &OpcodeTable,
) -> Result<Dictionary> {
    let path = path.as_ref();
    let text = read_text(path)?;
    let dictionary = Dictionary::parse(&text, formats, opcodes)
        .context(format!("dictionary {}", path.display()))?;
    debug!(path = %path.display(), patterns = dictionary.len(), "loaded dictionary");
    Ok(dictionary)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(StylometryError::from)
        .context(format!("cannot read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_formats_skips_blank_lines() {
        let file = write_temp("000aa\r\n\n01bbbb\n");
        let table = load_formats(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.max_len(), 6);
    }

    #[test]
    fn test_load_empty_formats_fails() {
        let file = write_temp("\n\n");
        let err = load_formats(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_load_dictionary() {
        let formats = FormatTable::parse("000aa\n1bbbb").unwrap();
        let opcodes = OpcodeTable::new();
        let file = write_temp("000xx\n1yyyy\n\n000zz\n");
        let dict = load_dictionary(file.path(), &formats, &opcodes).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(opcodes.len(), 2);
    }

    #[test]
    fn test_bad_dictionary_names_the_file() {
        let formats = FormatTable::parse("000aa").unwrap();
        let opcodes = OpcodeTable::new();
        let file = write_temp("111xx\n");
        let err = load_dictionary(file.path(), &formats, &opcodes).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("111xx"));
        assert!(msg.contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = load_formats(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }
}
