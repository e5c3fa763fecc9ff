//! Config module.
//!
//! This module contains the representation of the backup
//! configuration, read from a TOML file then completed by the
//! environment.

use log::{debug, trace};
use serde::Deserialize;
use std::{collections::HashMap, env, fs, path::PathBuf, result};
use thiserror::Error;

#[cfg(feature = "imap-backend")]
use crate::{backend::imap::config as imap_config, ImapConfig};
use crate::{FolderKeywords, FolderRole};

pub const DEFAULT_OUTPUT_DIR: &str = ".";

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read config file {}", .1.display())]
    ReadConfigFileError(#[source] std::io::Error, PathBuf),
    #[error("cannot parse config file {}", .1.display())]
    ParseConfigFileError(#[source] toml::de::Error, PathBuf),
    #[error("cannot parse config")]
    ParseConfigError(#[source] toml::de::Error),
    #[error("cannot expand output directory {1}")]
    ExpandOutputDirError(#[source] shellexpand::LookupError<env::VarError>, String),

    #[cfg(feature = "imap-backend")]
    #[error(transparent)]
    ImapConfigError(#[from] imap_config::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the backup configuration.
///
/// ```toml
/// output-dir = "~/mail-backup"
/// roles = ["inbox", "sent", "label:Work"]
///
/// [imap]
/// host = "imap.example.com"
/// login = "me@example.com"
///
/// [keywords]
/// trash = ["papierkorb"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackupConfig {
    /// Represents the directory the folder backups are written to.
    pub output_dir: Option<String>,
    /// Represents the roles to back up, in order.
    #[serde(default)]
    pub roles: Vec<FolderRole>,
    /// Represents the extra keywords of the predefined roles.
    #[serde(default)]
    pub keywords: HashMap<FolderRole, Vec<String>>,

    #[cfg(feature = "imap-backend")]
    #[serde(default)]
    pub imap: ImapConfig,
}

impl BackupConfig {
    /// Parses the configuration from a TOML string.
    pub fn from_toml(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(Error::ParseConfigError)
    }

    /// Reads the configuration from the given TOML file, or uses the
    /// default one. Missing IMAP values are then taken from the
    /// environment.
    pub fn from_opt_path(path: Option<PathBuf>) -> Result<Self> {
        trace!(">> build config from path {:?}", path);

        #[allow(unused_mut)]
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(&path)
                    .map_err(|err| Error::ReadConfigFileError(err, path.clone()))?;
                toml::from_str(&content).map_err(|err| Error::ParseConfigFileError(err, path))?
            }
            None => Self::default(),
        };

        #[cfg(feature = "imap-backend")]
        config.imap.merge_env()?;

        debug!("config: {:?}", config);
        trace!("<< build config from path");
        Ok(config)
    }

    /// Gets the output directory, with the home directory and the
    /// environment variables expanded.
    pub fn output_dir(&self) -> Result<PathBuf> {
        let dir = self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR);
        let expanded = shellexpand::full(dir)
            .map_err(|err| Error::ExpandOutputDirError(err, dir.to_owned()))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    /// Builds the keyword table: the default keywords followed by the
    /// configured ones.
    pub fn keywords(&self) -> FolderKeywords {
        let mut keywords = FolderKeywords::default();
        for (role, extra) in &self.keywords {
            keywords.extend(role.clone(), extra);
        }
        keywords
    }

    /// Gets the roles to back up. Only drafts are backed up when none
    /// is configured.
    pub fn roles(&self) -> Vec<FolderRole> {
        if self.roles.is_empty() {
            vec![FolderRole::Drafts]
        } else {
            self.roles.clone()
        }
    }
}

#[cfg(test)]
mod test_backup_config {
    use std::{io::Write, path::PathBuf};

    use super::{BackupConfig, Error};
    use crate::{FolderDescriptor, FolderRole};

    #[test]
    fn test_empty_config() {
        let config = BackupConfig::from_toml("").unwrap();

        assert_eq!(PathBuf::from("."), config.output_dir().unwrap());
        assert_eq!(vec![FolderRole::Drafts], config.roles());
        assert_eq!(crate::FolderKeywords::default(), config.keywords());
    }

    #[test]
    fn test_full_config() {
        let config = BackupConfig::from_toml(
            r#"
            output-dir = "/tmp/backup"
            roles = ["inbox", "all-mail", "label:Work"]

            [imap]
            host = "localhost"
            port = 3993
            login = "me@localhost"

            [keywords]
            trash = ["papierkorb"]
            "#,
        )
        .unwrap();

        assert_eq!(PathBuf::from("/tmp/backup"), config.output_dir().unwrap());
        assert_eq!(
            vec![
                FolderRole::Inbox,
                FolderRole::AllMail,
                FolderRole::CustomLabel("Work".into())
            ],
            config.roles()
        );
        assert_eq!("localhost", config.imap.host());
        assert_eq!(3993, config.imap.port());

        let listing = [FolderDescriptor::from(r#"(\HasNoChildren) "." "Papierkorb""#)];
        assert_eq!(
            Some("Papierkorb".into()),
            crate::resolve(&listing, &FolderRole::Trash, &config.keywords())
        );
    }

    #[test]
    fn test_invalid_role() {
        assert!(matches!(
            BackupConfig::from_toml(r#"roles = ["outbox"]"#),
            Err(Error::ParseConfigError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"roles = ["sent"]"#).unwrap();

        let config = BackupConfig::from_opt_path(Some(file.path().to_owned())).unwrap();
        assert_eq!(vec![FolderRole::Sent], config.roles());

        assert!(matches!(
            BackupConfig::from_opt_path(Some(PathBuf::from("/does/not/exist.toml"))),
            Err(Error::ReadConfigFileError(_, _))
        ));
    }
}
