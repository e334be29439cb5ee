use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;

use crate::marks::repo_types::{MarkRow, MarkSheet, Subject, MAX_MARKS};
use crate::storage::StorageClient;

pub const MARKS_FILE: &str = "marks.csv";
const HEADER: [&str; 2] = ["Subject", "Marks"];

pub fn marks_key(email: &str) -> String {
    format!("{}/{}", email, MARKS_FILE)
}

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn parse_csv_record(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                buf.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => out.push(std::mem::take(&mut buf)),
            _ => buf.push(ch),
        }
    }
    out.push(buf);
    out
}

pub fn encode_csv(rows: &[MarkRow]) -> String {
    let mut csv = format!("{}\n", HEADER.join(","));
    for row in rows {
        csv.push_str(&format!("{},{}\n", csv_quote(row.subject.as_str()), row.marks));
    }
    csv
}

pub fn decode_csv(text: &str) -> anyhow::Result<MarkSheet> {
    let mut lines = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next().context("marks file is empty")?;
    let header = parse_csv_record(header.trim_start_matches('\u{feff}'));
    if header.len() != HEADER.len() || header.iter().zip(HEADER).any(|(h, want)| h.trim() != want) {
        anyhow::bail!("unexpected marks header {:?}", header);
    }

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        let fields = parse_csv_record(line);
        let [subject, marks] = fields.as_slice() else {
            anyhow::bail!("line {}: expected 2 fields, got {}", line_no, fields.len());
        };
        let subject: Subject = subject
            .trim()
            .parse()
            .map_err(|e: String| anyhow::anyhow!("line {}: {}", line_no, e))?;
        let marks: u8 = marks
            .trim()
            .parse()
            .with_context(|| format!("line {}: marks {:?} not an integer", line_no, marks))?;
        if marks > MAX_MARKS {
            anyhow::bail!("line {}: marks {} out of range", line_no, marks);
        }
        rows.push(MarkRow { subject, marks });
    }
    Ok(MarkSheet::new(rows))
}

/// Per-user marks file, `<email>/marks.csv`.
#[derive(Clone)]
pub struct MarksStore {
    storage: Arc<dyn StorageClient>,
}

impl MarksStore {
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self { storage }
    }

    /// Replace the user's file with one row per entry, in the order given.
    pub async fn save(&self, email: &str, rows: &[MarkRow]) -> anyhow::Result<()> {
        let key = marks_key(email);
        self.storage
            .put_object(&key, Bytes::from(encode_csv(rows)), "text/csv")
            .await
            .with_context(|| format!("write {}", key))
    }

    /// `None` until the user has submitted marks once.
    pub async fn load(&self, email: &str) -> anyhow::Result<Option<MarkSheet>> {
        let Some(raw) = self.raw_csv(email).await? else {
            return Ok(None);
        };
        let text = std::str::from_utf8(&raw).context("marks file is not utf-8")?;
        let sheet = decode_csv(text).with_context(|| format!("parse {}", marks_key(email)))?;
        Ok(Some(sheet))
    }

    pub async fn raw_csv(&self, email: &str) -> anyhow::Result<Option<Bytes>> {
        self.storage.get_object(&marks_key(email)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FsStorage, MemoryStorage};

    fn rows(pairs: &[(Subject, u8)]) -> Vec<MarkRow> {
        pairs
            .iter()
            .map(|&(subject, marks)| MarkRow { subject, marks })
            .collect()
    }

    #[test]
    fn test_encode_layout() {
        let csv = encode_csv(&rows(&[(Subject::Maths, 88), (Subject::Hindi, 7)]));
        assert_eq!(csv, "Subject,Marks\nMaths,88\nHindi,7\n");
    }

    #[test]
    fn test_parse_csv_record_quotes() {
        assert_eq!(parse_csv_record("a,b"), vec!["a", "b"]);
        assert_eq!(parse_csv_record("\"a,b\",c"), vec!["a,b", "c"]);
        assert_eq!(parse_csv_record("\"say \"\"hi\"\"\",1"), vec!["say \"hi\"", "1"]);
    }

    #[test]
    fn test_decode_accepts_crlf_and_quotes() {
        let sheet = decode_csv("Subject,Marks\r\n\"Maths\",12\r\nCivics,100\r\n").unwrap();
        assert_eq!(sheet.rows(), rows(&[(Subject::Maths, 12), (Subject::Civics, 100)]).as_slice());
    }

    #[test]
    fn test_decode_rejects_bad_files() {
        assert!(decode_csv("").is_err());
        assert!(decode_csv("Name,Score\nMaths,1\n").is_err());
        assert!(decode_csv("Subject,Marks\nPhysics,1\n").is_err());
        assert!(decode_csv("Subject,Marks\nMaths,101\n").is_err());
        assert!(decode_csv("Subject,Marks\nMaths,-3\n").is_err());
        assert!(decode_csv("Subject,Marks\nMaths\n").is_err());
    }

    #[tokio::test]
    async fn load_without_file_is_none() {
        let store = MarksStore::new(Arc::new(MemoryStorage::new()));
        assert!(store.load("a@b.co").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_keeps_pairs_in_any_order() {
        let store = MarksStore::new(Arc::new(MemoryStorage::new()));
        let given = rows(&[
            (Subject::Geography, 61),
            (Subject::Maths, 99),
            (Subject::Civics, 0),
            (Subject::English, 75),
            (Subject::Hindi, 42),
            (Subject::Science, 100),
            (Subject::History, 13),
        ]);
        store.save("a@b.co", &given).await.unwrap();

        let loaded = store.load("a@b.co").await.unwrap().unwrap();
        assert_eq!(loaded.rows(), given.as_slice());
        assert_eq!(loaded.to_map(), MarkSheet::new(given).to_map());
    }

    #[tokio::test]
    async fn save_replaces_previous_submission() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Arc::new(FsStorage::new(dir.path()).await.unwrap());
        let store = MarksStore::new(storage);

        store
            .save("a@b.co", &rows(&[(Subject::Maths, 10), (Subject::Science, 20)]))
            .await
            .unwrap();
        store
            .save("a@b.co", &rows(&[(Subject::Maths, 30)]))
            .await
            .unwrap();

        let on_disk = std::fs::read_to_string(dir.path().join("a@b.co").join(MARKS_FILE)).unwrap();
        assert_eq!(on_disk, "Subject,Marks\nMaths,30\n");
        let loaded = store.load("a@b.co").await.unwrap().unwrap();
        assert_eq!(loaded.rows().len(), 1);
    }
}
