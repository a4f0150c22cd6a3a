pub mod collection;

use std::path::PathBuf;

use collection::Collection;
use model::{client::NewClientRecord, payroll::PayrollRecord, session::SessionRecord};
use thiserror::Error;

pub use collection::read_json;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub struct Storage {
    pub sessions: Collection<SessionRecord>,
    pub payroll: Collection<PayrollRecord>,
    pub clients: Collection<NewClientRecord>,
}

impl Storage {
    pub fn new(
        sessions: impl Into<PathBuf>,
        payroll: impl Into<PathBuf>,
        clients: impl Into<PathBuf>,
    ) -> Self {
        Storage {
            sessions: Collection::new(sessions),
            payroll: Collection::new(payroll),
            clients: Collection::new(clients),
        }
    }

    pub fn load(&self) -> Result<Records, StorageError> {
        Ok(Records {
            sessions: self.sessions.get_all()?,
            payroll: self.payroll.get_all()?,
            clients: self.clients.get_all()?,
        })
    }
}

#[derive(Debug, Default)]
pub struct Records {
    pub sessions: Vec<SessionRecord>,
    pub payroll: Vec<PayrollRecord>,
    pub clients: Vec<NewClientRecord>,
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path, process};

    use super::*;

    fn fixture(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("studio-storage-{}", process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_records() {
        let sessions = fixture(
            "sessions.json",
            r#"[{"sessionId": "s1", "cleanedClass": "Cycle", "capacity": "20", "checkedInCount": 12}]"#,
        );
        let payroll = fixture("payroll.json", r#"[{"teacherName": "Anisha", "totalSessions": 8}]"#);
        let storage = Storage::new(&sessions, &payroll, Path::new("/nonexistent/clients.json"));

        let records = storage.load().unwrap();
        assert_eq!(records.sessions.len(), 1);
        assert_eq!(records.sessions[0].capacity, 20);
        assert_eq!(records.sessions[0].class_format(), "Cycle");
        assert_eq!(records.payroll[0].total_sessions, 8);
        assert!(records.clients.is_empty());
    }

    #[test]
    fn test_malformed_json() {
        let broken = fixture("broken.json", "[{\"sessionId\": ");
        let storage = Storage::new(&broken, "/nonexistent/a.json", "/nonexistent/b.json");
        let err = storage.load().unwrap_err();
        assert!(matches!(err, StorageError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
