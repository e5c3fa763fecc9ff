//! Folder writer module.
//!
//! This module writes the backup of a folder to the filesystem:
//!
//! ```text
//! <output-dir>/<folder>/addresses.txt
//! <output-dir>/<folder>/contents.txt
//! <output-dir>/<folder>/attachments/<filename>
//! ```

use log::{debug, trace};
use std::{
    collections::BTreeSet,
    fs, io,
    path::{Path, PathBuf},
    result,
};
use thiserror::Error;

use crate::{sanitize_filename, Attachment};

pub const ADDRESSES_FILE: &str = "addresses.txt";
pub const CONTENTS_FILE: &str = "contents.txt";
pub const ATTACHMENTS_DIR: &str = "attachments";

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot create directory {}", .1.display())]
    CreateDirError(#[source] io::Error, PathBuf),
    #[error("cannot write file {}", .1.display())]
    WriteFileError(#[source] io::Error, PathBuf),
}

pub type Result<T> = result::Result<T, Error>;

/// Writes folder backups under one output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderWriter {
    output_dir: PathBuf,
}

impl FolderWriter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the backup directory of the folder. The folder name is
    /// sanitized, so hierarchical names like `[Gmail]/Drafts` give a
    /// single directory.
    pub fn folder_dir(&self, folder: &str) -> PathBuf {
        self.output_dir.join(sanitize_filename(folder))
    }

    pub fn attachments_dir(&self, folder: &str) -> PathBuf {
        self.folder_dir(folder).join(ATTACHMENTS_DIR)
    }

    /// Creates the backup directories of the folder.
    pub fn prepare(&self, folder: &str) -> Result<PathBuf> {
        let dir = self.attachments_dir(folder);
        debug!("creating directory {:?}", dir);
        fs::create_dir_all(&dir).map_err(|err| Error::CreateDirError(err, dir.clone()))?;
        Ok(self.folder_dir(folder))
    }

    /// Writes the attachment payload as is. An attachment with the same
    /// sanitized filename is overwritten.
    pub fn write_attachment(&self, folder: &str, attachment: &Attachment) -> Result<PathBuf> {
        let path = self
            .attachments_dir(folder)
            .join(attachment.sanitized_filename());
        trace!("writing attachment {:?}", path);
        write(&path, &attachment.data)?;
        Ok(path)
    }

    /// Writes the addresses, sorted, one per line.
    pub fn write_addresses(&self, folder: &str, addresses: &BTreeSet<String>) -> Result<PathBuf> {
        let path = self.folder_dir(folder).join(ADDRESSES_FILE);
        let contents = addresses
            .iter()
            .map(|addr| format!("{}\n", addr))
            .collect::<String>();
        debug!("writing {} address(es) to {:?}", addresses.len(), path);
        write(&path, contents.as_bytes())?;
        Ok(path)
    }

    /// Writes the email records, already concatenated.
    pub fn write_contents(&self, folder: &str, records: &str) -> Result<PathBuf> {
        let path = self.folder_dir(folder).join(CONTENTS_FILE);
        debug!("writing contents to {:?}", path);
        write(&path, records.as_bytes())?;
        Ok(path)
    }
}

fn write(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(|err| Error::WriteFileError(err, path.to_owned()))
}
