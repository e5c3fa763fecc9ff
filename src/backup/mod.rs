//! Backup module.
//!
//! This module contains everything related to the backup of a mail
//! session to the filesystem.

pub mod error_log;
pub use error_log::{ErrorEntry, ErrorLog};

pub mod writer;
pub use writer::FolderWriter;

mod backup;
pub use backup::*;
