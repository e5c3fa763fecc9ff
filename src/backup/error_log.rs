//! Error log module.
//!
//! This module contains the sink collecting the errors that do not
//! stop a backup, so they can be reported once it ends.

use log::warn;
use std::{any, error, fmt};

/// Represents one recorded error, with the context it occurred in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEntry {
    /// The type and variant of the error, for example
    /// `mailbox_backup::domain::email::email::Error::ParseRawEmailError`.
    pub kind: String,
    pub message: String,
    /// The messages of the error sources, from the closest to the
    /// deepest one.
    pub trace: Vec<String>,
    pub folder: Option<String>,
    pub id: Option<String>,
}

impl ErrorEntry {
    pub fn new<E: error::Error + 'static>(err: &E) -> Self {
        let debug = format!("{:?}", err);
        let variant = debug
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .next()
            .unwrap_or_default();
        let kind = match variant {
            "" => any::type_name::<E>().to_owned(),
            variant => format!("{}::{}", any::type_name::<E>(), variant),
        };

        let mut trace = Vec::new();
        let mut source = err.source();
        while let Some(err) = source {
            trace.push(err.to_string());
            source = err.source();
        }

        Self {
            kind,
            message: err.to_string(),
            trace,
            ..Self::default()
        }
    }

    pub fn folder<F: ToString>(mut self, folder: F) -> Self {
        self.folder = Some(folder.to_string());
        self
    }

    pub fn id<I: ToString>(mut self, id: I) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.folder, &self.id) {
            (Some(folder), Some(id)) => write!(f, "[folder {:?}, email {}] ", folder, id)?,
            (Some(folder), None) => write!(f, "[folder {:?}] ", folder)?,
            (None, Some(id)) => write!(f, "[email {}] ", id)?,
            (None, None) => (),
        }

        write!(f, "{}: {}", self.kind, self.message)?;

        for cause in &self.trace {
            write!(f, "\n    caused by: {}", cause)?;
        }

        Ok(())
    }
}

/// Collects the errors of a backup in the order they occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLog(Vec<ErrorEntry>);

impl ErrorLog {
    pub fn push(&mut self, entry: ErrorEntry) {
        warn!("{}", entry);
        self.0.push(entry);
    }

    /// Records an error that occurred while backing up the given
    /// folder, optionally for one of its emails.
    pub fn record<E: error::Error + 'static>(&mut self, err: &E, folder: &str, id: Option<&str>) {
        let entry = ErrorEntry::new(err).folder(folder);
        self.push(match id {
            Some(id) => entry.id(id),
            None => entry,
        });
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.0.iter()
    }
}

impl fmt::Display for ErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for entry in &self.0 {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_error_log {
    use std::{fmt, io};
    use thiserror::Error;

    use super::{ErrorEntry, ErrorLog};

    #[derive(Debug, Error)]
    enum TestError {
        #[error("cannot write file {1}")]
        WriteFileError(#[source] io::Error, String),
        #[error("cannot find thing")]
        FindThingError,
    }

    struct Unit;

    impl fmt::Debug for Unit {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "(unit)")
        }
    }

    impl fmt::Display for Unit {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "unit error")
        }
    }

    impl std::error::Error for Unit {}

    #[test]
    fn test_entry_kind_and_trace() {
        let err = TestError::WriteFileError(
            io::Error::new(io::ErrorKind::Other, "disk full"),
            "a.pdf".into(),
        );
        let entry = ErrorEntry::new(&err);

        assert!(entry.kind.ends_with("TestError::WriteFileError"));
        assert_eq!("cannot write file a.pdf", entry.message);
        assert_eq!(vec!["disk full"], entry.trace);

        let entry = ErrorEntry::new(&TestError::FindThingError);
        assert!(entry.kind.ends_with("TestError::FindThingError"));
        assert!(entry.trace.is_empty());

        let entry = ErrorEntry::new(&Unit);
        assert!(entry.kind.ends_with("Unit"));
    }

    #[test]
    fn test_record() {
        let mut log = ErrorLog::default();
        assert!(log.is_empty());

        log.record(&TestError::FindThingError, "INBOX", Some("3"));
        log.record(&TestError::FindThingError, "INBOX", None);

        assert_eq!(2, log.len());
        assert_eq!(Some("INBOX".into()), log.entries()[0].folder);
        assert_eq!(Some("3".into()), log.entries()[0].id);
        assert_eq!(None, log.entries()[1].id);

        let display = log.to_string();
        assert!(display.starts_with("[folder \"INBOX\", email 3] "));
        assert!(display.contains("cannot find thing"));
    }
}
