//! Mail session module.
//!
//! This module exposes the mail session trait, which is the only
//! capability the backup needs from a mail server.

use std::result;
use thiserror::Error;

#[cfg(feature = "imap-backend")]
use crate::backend;
use crate::FolderDescriptor;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot list folders: the server returned none")]
    ListFoldersEmptyError,
    #[error("cannot select folder {0}: it is not selectable")]
    FolderNotSelectableError(String),
    #[error("cannot get selected folder: no folder selected yet")]
    GetSelectedFolderError,
    #[error("cannot find email {0}")]
    FindEmailError(String),
    #[error("cannot find body of email {0}")]
    GetEmailBodyError(String),

    #[cfg(feature = "imap-backend")]
    #[error(transparent)]
    ImapError(#[from] backend::imap::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents an authenticated session with a mail server.
///
/// Email ids are opaque strings, only valid within the folder
/// selected last.
pub trait MailSession {
    /// Lists all the folders of the account, as raw listing lines.
    fn list_folders(&mut self) -> Result<Vec<FolderDescriptor>>;
    /// Selects the folder used by the next searches and fetches.
    fn select_folder(&mut self, folder: &str) -> Result<()>;
    /// Returns the ids of all the emails of the selected folder.
    fn search_all(&mut self) -> Result<Vec<String>>;
    /// Fetches the full raw MIME content of one email.
    fn fetch_raw(&mut self, id: &str) -> Result<Vec<u8>>;
}

impl<S: MailSession + ?Sized> MailSession for &mut S {
    fn list_folders(&mut self) -> Result<Vec<FolderDescriptor>> {
        (**self).list_folders()
    }

    fn select_folder(&mut self, folder: &str) -> Result<()> {
        (**self).select_folder(folder)
    }

    fn search_all(&mut self) -> Result<Vec<String>> {
        (**self).search_all()
    }

    fn fetch_raw(&mut self, id: &str) -> Result<Vec<u8>> {
        (**self).fetch_raw(id)
    }
}
