//! Library backing up the folders of a mailbox to local files.
//!
//! Folders are found by role (inbox, sent, drafts…) in the folder
//! listing of a [`MailSession`], then every email they contain is
//! decoded into its addresses, body and attachments, and written by
//! a [`FolderWriter`].

pub mod backend;
pub use backend::MailSession;
#[cfg(feature = "imap-backend")]
pub use backend::{ImapConfig, ImapSession};

pub mod backup;
pub use backup::{
    Backup, BackupReport, ErrorEntry, ErrorLog, FolderWriter, RoleOutcome, SkipReason,
};

pub mod config;
pub use config::BackupConfig;

pub mod domain;
pub use domain::*;
