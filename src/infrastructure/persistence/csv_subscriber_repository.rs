//! Flat CSV file implementation of the subscriber repository.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::io::{Read, Write};
use tokio::fs;
use tokio::sync::{mpsc, oneshot};

use crate::domain::entities::SubscriberRecord;
use crate::domain::errors::StoreError;
use crate::domain::repositories::{PutOutcome, SubscriberRepository};
use crate::utils::sanitize::sanitize_csv_field;

/// First line of every record file.
pub const CSV_HEADER: &str = "email,subscribed_at\n";

/// Pending requests buffered in front of the writer task.
const QUEUE_CAPACITY: usize = 256;

type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

enum Command {
    Put {
        record: SubscriberRecord,
        reply: Reply<PutOutcome>,
    },
    Exists {
        email: String,
        reply: Reply<bool>,
    },
    Export {
        reply: Reply<Vec<u8>>,
    },
    List {
        reply: Reply<Vec<SubscriberRecord>>,
    },
}

/// Subscriber store backed by a single CSV file.
///
/// All file access goes through one background task, so the duplicate check
/// and the append of a `put` can never interleave with another request in the
/// same process. Each `put` also holds an exclusive advisory lock on the file,
/// which keeps writers in other processes from interleaving with it. The file
/// has a header row `email,subscribed_at`; each data row holds the
/// CSV-sanitized email and an RFC 3339 timestamp with milliseconds.
pub struct CsvSubscriberRepository {
    tx: mpsc::Sender<Command>,
    path: PathBuf,
}

impl CsvSubscriberRepository {
    /// Starts the writer task for the file at `path`.
    ///
    /// The file is created lazily on the first successful `put`.
    /// Must be called inside a Tokio runtime.
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);

        tokio::spawn(run_writer(path.clone(), rx));
        tracing::debug!(path = %path.display(), "Subscriber writer started");

        Self { tx, path }
    }

    /// Location of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, StoreError> {
        let (reply, response) = oneshot::channel();

        self.tx
            .send(make(reply))
            .await
            .map_err(|_| StoreError::Unavailable)?;

        response.await.map_err(|_| StoreError::Unavailable)?
    }
}

#[async_trait]
impl SubscriberRepository for CsvSubscriberRepository {
    async fn put(&self, record: SubscriberRecord) -> Result<PutOutcome, StoreError> {
        self.request(|reply| Command::Put { record, reply }).await
    }

    async fn exists_normalized(&self, email: &str) -> Result<bool, StoreError> {
        let email = email.to_string();
        self.request(|reply| Command::Exists { email, reply }).await
    }

    async fn export_all(&self) -> Result<Vec<u8>, StoreError> {
        self.request(|reply| Command::Export { reply }).await
    }

    async fn list(&self) -> Result<Vec<SubscriberRecord>, StoreError> {
        self.request(|reply| Command::List { reply }).await
    }

    fn is_healthy(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Owns the record file and serves commands one at a time.
async fn run_writer(path: PathBuf, mut rx: mpsc::Receiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Put { record, reply } => {
                let result = put_record(&path, &record).await;
                if let Err(e) = &result {
                    tracing::error!(error = %e, "Failed to store subscriber");
                }
                let _ = reply.send(result);
            }
            Command::Exists { email, reply } => {
                let result = read_existing(&path)
                    .await
                    .map(|content| content.is_some_and(|c| contains_email(&c, &email)));
                let _ = reply.send(result);
            }
            Command::Export { reply } => {
                let result = match fs::read(&path).await {
                    Ok(bytes) => Ok(bytes),
                    Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NoRecords),
                    Err(e) => Err(e.into()),
                };
                let _ = reply.send(result);
            }
            Command::List { reply } => {
                let result = read_existing(&path)
                    .await
                    .map(|content| content.map(|c| parse_records(&c)).unwrap_or_default());
                let _ = reply.send(result);
            }
        }
    }

    tracing::debug!(path = %path.display(), "Subscriber writer stopped");
}

async fn read_existing(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn put_record(path: &Path, record: &SubscriberRecord) -> Result<PutOutcome, StoreError> {
    let path = path.to_path_buf();
    let record = record.clone();

    tokio::task::spawn_blocking(move || put_record_locked(&path, &record))
        .await
        .map_err(|_| StoreError::Unavailable)?
}

/// Check-and-append under an exclusive advisory lock on the record file.
///
/// The lock makes the duplicate check and the append atomic with respect to
/// other processes writing the same file (the `admin` binary, a second
/// server). It is released when the handle is dropped.
fn put_record_locked(path: &Path, record: &SubscriberRecord) -> Result<PutOutcome, StoreError> {
    let mut file = std::fs::OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;
    file.lock()?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;

    if contains_email(&content, &record.email) {
        return Ok(PutOutcome::AlreadyPresent);
    }

    let mut row = String::new();
    if content.is_empty() {
        row.push_str(CSV_HEADER);
    } else if !content.ends_with('\n') {
        row.push('\n');
    }
    row.push_str(&format_row(record));

    file.write_all(row.as_bytes())?;
    file.sync_data()?;

    Ok(PutOutcome::Inserted)
}

/// Renders one data row, newline included.
pub fn format_row(record: &SubscriberRecord) -> String {
    format!(
        "{},{}\n",
        sanitize_csv_field(&record.email),
        record
            .subscribed_at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Returns true if any data row's email matches `normalized`.
fn contains_email(content: &str, normalized: &str) -> bool {
    data_rows(content)
        .filter_map(|fields| fields.into_iter().next())
        .any(|field| stored_key(&field) == normalized)
}

fn parse_records(content: &str) -> Vec<SubscriberRecord> {
    data_rows(content)
        .filter_map(|fields| {
            let email = stored_key(fields.first()?);
            let subscribed_at = DateTime::parse_from_rfc3339(fields.get(1)?.trim())
                .ok()?
                .with_timezone(&Utc);
            Some(SubscriberRecord {
                email,
                subscribed_at,
            })
        })
        .collect()
}

/// Iterates the parsed fields of every non-blank line after the header.
fn data_rows(content: &str) -> impl Iterator<Item = Vec<String>> + '_ {
    content
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(split_row)
}

/// Splits one CSV line, honouring double-quoted fields with `""` escapes.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if current.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

/// Comparison key for a stored email field: stray quote characters left over
/// from CSV escaping are dropped, then the value is normalized.
fn stored_key(field: &str) -> String {
    field
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            let dir = std::env::temp_dir().join(format!(
                "podcast-site-csv-{}-{}",
                std::process::id(),
                NEXT_DIR.fetch_add(1, Ordering::SeqCst)
            ));
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn file(&self) -> PathBuf {
            self.0.join("emails.csv")
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_format_row() {
        let record = SubscriberRecord::new("a@b.com", at(0));
        assert_eq!(format_row(&record), "a@b.com,2023-11-14T22:13:20.000Z\n");
    }

    #[test]
    fn test_split_row_quoted() {
        assert_eq!(split_row("a@b.com,2024"), vec!["a@b.com", "2024"]);
        assert_eq!(
            split_row("\"x@y,z.com\",2024"),
            vec!["x@y,z.com", "2024"]
        );
        assert_eq!(split_row("\"say \"\"hi\"\"\",1"), vec!["say \"hi\"", "1"]);
        assert_eq!(split_row("a@b.com,2024\r"), vec!["a@b.com", "2024"]);
    }

    #[test]
    fn test_contains_email_ignores_quotes_and_case() {
        let content = "email,subscribed_at\n'User@Example.com,2024\n\"q@x.com\",2024\n";

        assert!(contains_email(content, "user@example.com"));
        assert!(contains_email(content, "q@x.com"));
        assert!(!contains_email(content, "email"));
        assert!(!contains_email(content, "other@x.com"));
    }

    #[test]
    fn test_parse_records_skips_malformed() {
        let content = "email,subscribed_at\na@b.com,2024-01-01T00:00:00.000Z\n\nbroken-row\nc@d.com,not-a-date\n";

        let records = parse_records(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "a@b.com");
    }

    #[tokio::test]
    async fn test_put_creates_file_with_header() {
        let dir = TempDir::new();
        let repo = CsvSubscriberRepository::spawn(dir.file());

        let outcome = repo.put(SubscriberRecord::new("a@b.com", at(0))).await.unwrap();

        assert_eq!(outcome, PutOutcome::Inserted);
        let content = std::fs::read_to_string(dir.file()).unwrap();
        assert_eq!(content, "email,subscribed_at\na@b.com,2023-11-14T22:13:20.000Z\n");
    }

    #[tokio::test]
    async fn test_put_duplicate_writes_nothing() {
        let dir = TempDir::new();
        let repo = CsvSubscriberRepository::spawn(dir.file());

        repo.put(SubscriberRecord::new("a@b.com", at(0))).await.unwrap();
        let outcome = repo
            .put(SubscriberRecord::new(" A@B.com ", at(60)))
            .await
            .unwrap();

        assert_eq!(outcome, PutOutcome::AlreadyPresent);
        let content = std::fs::read_to_string(dir.file()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_puts_store_one_row_per_email() {
        let dir = TempDir::new();
        let repo = Arc::new(CsvSubscriberRepository::spawn(dir.file()));

        let mut handles = Vec::new();
        for i in 0..20 {
            let same = repo.clone();
            handles.push(tokio::spawn(async move {
                same.put(SubscriberRecord::new("same@x.com", at(i))).await
            }));
            let unique = repo.clone();
            handles.push(tokio::spawn(async move {
                unique
                    .put(SubscriberRecord::new(&format!("user{i}@x.com"), at(i)))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = repo.list().await.unwrap();
        assert_eq!(records.len(), 21);
        assert_eq!(
            records.iter().filter(|r| r.email == "same@x.com").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_separate_stores_on_one_file_store_one_row() {
        let dir = TempDir::new();
        let server = Arc::new(CsvSubscriberRepository::spawn(dir.file()));
        let cli = Arc::new(CsvSubscriberRepository::spawn(dir.file()));

        let mut handles = Vec::new();
        for i in 0..10 {
            for repo in [server.clone(), cli.clone()] {
                handles.push(tokio::spawn(async move {
                    repo.put(SubscriberRecord::new("x@y.com", at(i))).await
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let content = std::fs::read_to_string(dir.file()).unwrap();
        assert_eq!(content.matches(CSV_HEADER).count(), 1);
        assert_eq!(server.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_exists_normalized() {
        let dir = TempDir::new();
        let repo = CsvSubscriberRepository::spawn(dir.file());

        assert!(!repo.exists_normalized("a@b.com").await.unwrap());
        repo.put(SubscriberRecord::new("a@b.com", at(0))).await.unwrap();
        assert!(repo.exists_normalized("a@b.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_export_without_file() {
        let dir = TempDir::new();
        let repo = CsvSubscriberRepository::spawn(dir.file());

        assert!(matches!(repo.export_all().await, Err(StoreError::NoRecords)));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_returns_file_content() {
        let dir = TempDir::new();
        let repo = CsvSubscriberRepository::spawn(dir.file());

        repo.put(SubscriberRecord::new("a@b.com", at(0))).await.unwrap();
        let exported = repo.export_all().await.unwrap();

        assert_eq!(exported, std::fs::read(dir.file()).unwrap());
    }

    #[tokio::test]
    async fn test_put_repairs_missing_trailing_newline() {
        let dir = TempDir::new();
        std::fs::write(dir.file(), "email,subscribed_at\nold@x.com,2024-01-01T00:00:00.000Z").unwrap();
        let repo = CsvSubscriberRepository::spawn(dir.file());

        repo.put(SubscriberRecord::new("new@x.com", at(0))).await.unwrap();

        let records = repo.list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].email, "new@x.com");
    }

    #[tokio::test]
    async fn test_put_into_empty_file_writes_header() {
        let dir = TempDir::new();
        std::fs::write(dir.file(), "").unwrap();
        let repo = CsvSubscriberRepository::spawn(dir.file());

        repo.put(SubscriberRecord::new("a@b.com", at(0))).await.unwrap();

        let content = std::fs::read_to_string(dir.file()).unwrap();
        assert!(content.starts_with(CSV_HEADER));
    }

    #[tokio::test]
    async fn test_is_healthy_while_running() {
        let dir = TempDir::new();
        let repo = CsvSubscriberRepository::spawn(dir.file());

        assert!(repo.is_healthy());
    }
}
