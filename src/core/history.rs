use super::models::HistoryRecord;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;

/*
 * The append-only operation history. Every completed commit appends one
 * UTF-8 line to `history.txt` in the scratch root; the file is never
 * rewritten or truncated. Reading is tolerant: two line formats are
 * accepted for backward compatibility and anything else degrades to a
 * raw record instead of an error, so one bad line never hides the rest
 * of the log.
 */

pub const HISTORY_FILE_NAME: &str = "history.txt";

/// How many entries the history view exposes, counted from the end.
pub const RECENT_LIMIT: usize = 50;

const STRUCTURED_PATTERN: &str = r"^(.*?)\s*\|\s*src=(.*?)\s*\|\s*files=(.*?)\s*\|\s*dest=(.*)$";
const LEGACY_PATTERN: &str = r"^(.*?):\s*(.*?)\s*->\s*(.*)$";

#[derive(Debug)]
pub enum HistoryError {
    Io(io::Error),
    TimestampFormat(time::error::Format),
}

impl From<io::Error> for HistoryError {
    fn from(err: io::Error) -> Self {
        HistoryError::Io(err)
    }
}

impl From<time::error::Format> for HistoryError {
    fn from(err: time::error::Format) -> Self {
        HistoryError::TimestampFormat(err)
    }
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::Io(e) => write!(f, "History I/O error: {e}"),
            HistoryError::TimestampFormat(e) => write!(f, "Timestamp formatting error: {e}"),
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HistoryError::Io(e) => Some(e),
            HistoryError::TimestampFormat(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, HistoryError>;

pub trait HistoryLogOperations: Send + Sync {
    /// Formats and appends one record line; the log directory is created
    /// first, idempotently.
    fn append(&self, files: &[PathBuf], source_folder: &Path, destination: &Path) -> Result<()>;

    /// Parses the whole backing file and returns the last `limit` records
    /// in original (chronological) order. A missing file is an empty log.
    fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>>;
}

pub struct CoreHistoryLog {
    log_dir: PathBuf,
}

impl CoreHistoryLog {
    pub fn new(log_dir: PathBuf) -> Self {
        CoreHistoryLog { log_dir }
    }

    pub fn file_path(&self) -> PathBuf {
        self.log_dir.join(HISTORY_FILE_NAME)
    }
}

impl HistoryLogOperations for CoreHistoryLog {
    fn append(&self, files: &[PathBuf], source_folder: &Path, destination: &Path) -> Result<()> {
        fs::create_dir_all(&self.log_dir)?;

        let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let timestamp = now.format(&format)?;

        let joined = files
            .iter()
            .map(|p| p.to_string_lossy())
            .collect::<Vec<_>>()
            .join(";");
        let record = format!(
            "{timestamp} | src={} | files={joined} | dest={}\n",
            source_folder.display(),
            destination.display()
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_path())?;
        file.write_all(record.as_bytes())?;
        log::debug!(
            "HistoryLog: Appended record with {} file(s) for destination {destination:?}.",
            files.len()
        );
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let path = self.file_path();
        if !path.exists() {
            log::trace!("HistoryLog: No backing file at {path:?} yet.");
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&path)?;
        let lines: Vec<&str> = contents.lines().collect();
        let skip = lines.len().saturating_sub(limit);

        let patterns = grammar_patterns();
        let records = lines[skip..]
            .iter()
            .map(|line| match &patterns {
                Some((structured, legacy)) => parse_record_with(line, structured, legacy),
                None => HistoryRecord::Raw(line.trim().to_string()),
            })
            .collect();
        Ok(records)
    }
}

/*
 * Parses one history line into a record. Tries the canonical grammar
 * first, then the legacy one; a line matching neither is returned as
 * `Raw` with its original text. Never fails.
 */
pub fn parse_record(line: &str) -> HistoryRecord {
    match grammar_patterns() {
        Some((structured, legacy)) => parse_record_with(line, &structured, &legacy),
        None => HistoryRecord::Raw(line.trim().to_string()),
    }
}

// The patterns are fixed literals; if compilation ever fails every line
// degrades to Raw rather than surfacing an error.
fn grammar_patterns() -> Option<(Regex, Regex)> {
    let structured = Regex::new(STRUCTURED_PATTERN).ok()?;
    let legacy = Regex::new(LEGACY_PATTERN).ok()?;
    Some((structured, legacy))
}

fn parse_record_with(line: &str, structured: &Regex, legacy: &Regex) -> HistoryRecord {
    let line = line.trim();

    if let Some(caps) = structured.captures(line) {
        let files = caps[3]
            .trim()
            .split(';')
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect();
        return HistoryRecord::Structured {
            timestamp: caps[1].trim().to_string(),
            source_folder: PathBuf::from(caps[2].trim()),
            files,
            destination: PathBuf::from(caps[4].trim()),
        };
    }

    if let Some(caps) = legacy.captures(line) {
        let file_names = caps[2]
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .collect();
        return HistoryRecord::Legacy {
            timestamp: caps[1].trim().to_string(),
            file_names,
            destination: PathBuf::from(caps[3].trim()),
        };
    }

    HistoryRecord::Raw(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_record_canonical_grammar() {
        let line = "2026-08-01 10:20:30 | src=/home/user/in | files=/home/user/in/a.txt;/home/user/in/b.txt | dest=/home/user/out";

        let record = parse_record(line);

        assert_eq!(
            record,
            HistoryRecord::Structured {
                timestamp: "2026-08-01 10:20:30".to_string(),
                source_folder: PathBuf::from("/home/user/in"),
                files: vec![
                    PathBuf::from("/home/user/in/a.txt"),
                    PathBuf::from("/home/user/in/b.txt"),
                ],
                destination: PathBuf::from("/home/user/out"),
            }
        );
    }

    #[test]
    fn test_parse_record_legacy_grammar() {
        let line = "2021-03-04: a.txt, b.txt -> /home/user/out";

        let record = parse_record(line);

        assert_eq!(
            record,
            HistoryRecord::Legacy {
                timestamp: "2021-03-04".to_string(),
                file_names: vec!["a.txt".to_string(), "b.txt".to_string()],
                destination: PathBuf::from("/home/user/out"),
            }
        );
    }

    // The legacy timestamp group is non-greedy, so it ends at the first
    // colon; a colon-bearing timestamp bleeds into the name list rather
    // than failing the parse.
    #[test]
    fn test_parse_record_legacy_grammar_timestamp_stops_at_first_colon() {
        let record = parse_record("2021-03-04 09:10: a.txt -> /out");

        match record {
            HistoryRecord::Legacy { timestamp, .. } => {
                assert_eq!(timestamp, "2021-03-04 09");
            }
            other => panic!("Expected a legacy record, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_record_unrecognized_line_is_raw() {
        let line = "something completely different";
        assert_eq!(parse_record(line), HistoryRecord::Raw(line.to_string()));
    }

    #[test]
    fn test_parse_record_empty_file_list_stays_structured() {
        let record = parse_record("ts | src=/in | files= | dest=/out");
        match record {
            HistoryRecord::Structured { files, .. } => assert!(files.is_empty()),
            other => panic!("Expected a structured record, got {other:?}"),
        }
    }

    #[test]
    fn test_append_then_recent_round_trips_in_order() -> Result<()> {
        let dir = tempdir()?;
        let history = CoreHistoryLog::new(dir.path().to_path_buf());

        let batches = [
            vec![PathBuf::from("/in/a.txt")],
            vec![PathBuf::from("/in/b.txt"), PathBuf::from("/in/c.txt")],
            vec![PathBuf::from("/other/d.txt")],
        ];
        for files in &batches {
            history.append(files, Path::new("/in"), Path::new("/out"))?;
        }

        let records = history.recent(RECENT_LIMIT)?;

        assert_eq!(records.len(), batches.len());
        for (record, expected_files) in records.iter().zip(batches.iter()) {
            match record {
                HistoryRecord::Structured {
                    timestamp,
                    source_folder,
                    files,
                    destination,
                } => {
                    assert!(!timestamp.is_empty());
                    assert_eq!(source_folder, &PathBuf::from("/in"));
                    assert_eq!(files, expected_files);
                    assert_eq!(destination, &PathBuf::from("/out"));
                }
                other => panic!("Expected a structured record, got {other:?}"),
            }
        }
        Ok(())
    }

    #[test]
    fn test_recent_returns_last_entries_only() -> Result<()> {
        let dir = tempdir()?;
        let history = CoreHistoryLog::new(dir.path().to_path_buf());

        let mut contents = String::new();
        for i in 0..60 {
            contents.push_str(&format!(
                "2026-01-01 00:00:{i:02} | src=/in | files=/in/f{i}.txt | dest=/out\n"
            ));
        }
        fs::write(history.file_path(), contents)?;

        let records = history.recent(RECENT_LIMIT)?;

        assert_eq!(records.len(), RECENT_LIMIT);
        match &records[0] {
            HistoryRecord::Structured { files, .. } => {
                assert_eq!(files, &vec![PathBuf::from("/in/f10.txt")]);
            }
            other => panic!("Expected a structured record, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_recent_with_missing_file_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let history = CoreHistoryLog::new(dir.path().join("not_created_yet"));

        let records = history.recent(RECENT_LIMIT)?;
        assert!(records.is_empty());
        Ok(())
    }

    #[test]
    fn test_recent_keeps_malformed_lines_as_raw() -> Result<()> {
        let dir = tempdir()?;
        let history = CoreHistoryLog::new(dir.path().to_path_buf());
        fs::write(
            history.file_path(),
            "garbage line\n2026-01-01 00:00:00 | src=/in | files=/in/a.txt | dest=/out\n",
        )?;

        let records = history.recent(RECENT_LIMIT)?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], HistoryRecord::Raw("garbage line".to_string()));
        assert!(matches!(records[1], HistoryRecord::Structured { .. }));
        Ok(())
    }

    #[test]
    fn test_append_creates_missing_log_directory() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("deeper").join("still");
        let history = CoreHistoryLog::new(nested.clone());

        history.append(
            &[PathBuf::from("/in/a.txt")],
            Path::new("/in"),
            Path::new("/out"),
        )?;

        assert!(nested.join(HISTORY_FILE_NAME).exists());
        Ok(())
    }
}
