// src/changelog/mod.rs
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use crate::extractors::section::{ExtractedSection, SectionExtractor};
use crate::utils::error::AppError;

/// Read from the current working directory.
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

pub struct ChangelogReader {
    path: PathBuf,
    reader: BufReader<File>,
}

impl ChangelogReader {
    /// Opens the changelog for a single buffered pass.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        tracing::debug!("Opened changelog {}", path.display());
        Ok(Self { path, reader: BufReader::new(file) })
    }

    /// Consumes the reader; the file handle is released on return, whatever the outcome.
    pub fn extract(self, version: &str) -> Result<ExtractedSection, AppError> {
        tracing::info!("Searching {} for version '{}'", self.path.display(), version);
        extract_from_reader(self.reader, version)
    }
}

/// Streams lines from `reader` through a [`SectionExtractor`], which stops
/// pulling lines once the target section is closed.
pub fn extract_from_reader<R: BufRead>(reader: R, version: &str) -> Result<ExtractedSection, AppError> {
    SectionExtractor::new().try_extract(ChangelogLines::new(reader), version)
}

/// Lines of a text source with terminators kept, like a text-mode file.
///
/// `\n`, `\r\n` and a lone `\r` all end a line and are delivered as `\n`.
pub struct ChangelogLines<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> ChangelogLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, pending: VecDeque::new() }
    }
}

impl<R: BufRead> Iterator for ChangelogLines<R> {
    type Item = Result<String, AppError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(line) = self.pending.pop_front() {
            return Some(Ok(line));
        }

        // read_line stops at '\n', so a '\r\n' pair never straddles two chunks.
        let mut chunk = String::new();
        match self.reader.read_line(&mut chunk) {
            Ok(0) => None,
            Ok(_) => {
                split_universal(&chunk, &mut self.pending);
                self.pending.pop_front().map(Ok)
            }
            Err(e) => {
                tracing::error!("Failed reading changelog: {}", e);
                Some(Err(e.into()))
            }
        }
    }
}

fn split_universal(chunk: &str, out: &mut VecDeque<String>) {
    let mut rest = chunk;
    while let Some(i) = rest.find(|c: char| c == '\r' || c == '\n') {
        let terminator = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
        out.push_back(format!("{}\n", &rest[..i]));
        rest = &rest[i + terminator..];
    }
    if !rest.is_empty() {
        out.push_back(rest.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ExtractError;
    use std::io::{self, Cursor, Read};

    /// Fails every read; chained after real data to prove the scan never gets there.
    struct Poisoned;

    impl Read for Poisoned {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "read past end of section"))
        }
    }

    #[test]
    fn test_reader_preserves_terminators() {
        let text = "## 1.1.0\n- a\n\n- b\n## 1.0.0\n";
        let section = extract_from_reader(Cursor::new(text), "1.1.0").unwrap();
        assert_eq!(section.content, "- a\n\n- b\n");
    }

    #[test]
    fn test_reader_translates_crlf() {
        let text = "## 1.1.0\r\n- a\r\n##Note\r\n## 1.0.0\r\n";
        let section = extract_from_reader(Cursor::new(text), "1.1.0").unwrap();
        assert_eq!(section.content, "- a\n#Note\n");
        assert_eq!(section.header, "## 1.1.0");
    }

    #[test]
    fn test_reader_stops_consuming_after_section() {
        let data = Cursor::new("## 1.1.0\n- a\n## 1.0.0\n".as_bytes()).chain(Poisoned);
        let section = extract_from_reader(BufReader::new(data), "1.1.0").unwrap();
        assert_eq!(section.content, "- a\n");
    }

    #[test]
    fn test_reader_propagates_read_errors() {
        let data = Cursor::new("## 1.1.0\n- a\n".as_bytes()).chain(Poisoned);
        let result = extract_from_reader(BufReader::new(data), "1.1.0");
        assert!(matches!(result, Err(AppError::Io(_))), "got {:?}", result);
    }

    #[test]
    fn test_reader_rejects_invalid_utf8() {
        let data: &[u8] = b"## 1.1.0\n\xff\xfe\n";
        let result = extract_from_reader(Cursor::new(data), "1.1.0");
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_lines_keep_terminators() {
        let lines: Vec<String> = ChangelogLines::new(Cursor::new("a\r\nb\n\nc"))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, vec!["a\n", "b\n", "\n", "c"]);
    }

    #[test]
    fn test_lines_split_on_lone_carriage_return() {
        let lines: Vec<String> = ChangelogLines::new(Cursor::new("a\rb\r\rc\r\nd"))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, vec!["a\n", "b\n", "\n", "c\n", "d"]);
    }

    #[test]
    fn test_reader_handles_cr_only_changelog() {
        let text = "# Changelog\r## 1.1.0\r- a\r##Note\r## 1.0.0\r- old\r";
        let section = extract_from_reader(Cursor::new(text), "1.1.0").unwrap();
        assert_eq!(section.content, "- a\n#Note\n");
        assert_eq!(section.header, "## 1.1.0");
    }

    #[test]
    fn test_reader_not_found() {
        let result = extract_from_reader(Cursor::new("## 1.0.0\n- a\n"), "2.0.0");
        assert!(matches!(
            result,
            Err(AppError::Extraction(ExtractError::SectionNotFound(ref v))) if v == "2.0.0"
        ));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ChangelogReader::open(dir.path().join(CHANGELOG_FILE));
        assert!(matches!(result, Err(AppError::Io(ref e)) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn test_open_and_extract_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CHANGELOG_FILE);
        std::fs::write(&path, "# Changelog\n## 0.2.0\n- new\n## 0.1.0\n- old\n").unwrap();
        let section = ChangelogReader::open(&path).unwrap().extract("0.1.0").unwrap();
        assert_eq!(section.content, "- old\n");
    }
}
