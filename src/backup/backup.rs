//! Backup module.
//!
//! This module contains the orchestrator backing up folders, one role
//! after the other, and the report it produces.

use log::{debug, info, trace, warn};
use std::{collections::BTreeSet, fmt, mem};

use crate::{
    backup::{ErrorLog, FolderWriter},
    email, resolve_in_session, FolderKeywords, FolderRole, MailSession,
};

/// Represents the reason why a role was not backed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    SelectFailed,
    SearchFailed,
    OutputFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "folder not found"),
            Self::SelectFailed => write!(f, "cannot select folder"),
            Self::SearchFailed => write!(f, "cannot search emails"),
            Self::OutputFailed => write!(f, "cannot write backup files"),
        }
    }
}

/// Represents the outcome of the backup of one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleOutcome {
    Done {
        role: FolderRole,
        folder: String,
        /// Number of emails decoded.
        emails: usize,
        /// Number of unique addresses found.
        addresses: usize,
        /// Number of attachment files written.
        attachments: usize,
    },
    Skipped {
        role: FolderRole,
        reason: SkipReason,
    },
}

impl RoleOutcome {
    pub fn role(&self) -> &FolderRole {
        match self {
            Self::Done { role, .. } | Self::Skipped { role, .. } => role,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

impl fmt::Display for RoleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Done {
                role,
                folder,
                emails,
                addresses,
                attachments,
            } => write!(
                f,
                "{}: {} email(s), {} address(es), {} attachment(s) from folder {:?}",
                role, emails, addresses, attachments, folder
            ),
            Self::Skipped { role, reason } => write!(f, "{}: skipped ({})", role, reason),
        }
    }
}

/// Represents the result of a whole backup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupReport {
    pub outcomes: Vec<RoleOutcome>,
    pub errors: ErrorLog,
}

impl BackupReport {
    pub fn skipped(&self) -> impl Iterator<Item = (&FolderRole, &SkipReason)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            RoleOutcome::Skipped { role, reason } => Some((role, reason)),
            RoleOutcome::Done { .. } => None,
        })
    }

    /// Renders the outcome of every role, then the skipped roles, then
    /// the error log.
    pub fn summary(&self) -> String {
        let mut summary = String::from("Backup summary:\n");

        for outcome in &self.outcomes {
            summary.push_str(&format!("  {}\n", outcome));
        }

        let skipped = self
            .skipped()
            .map(|(role, _)| role.to_string())
            .collect::<Vec<_>>();
        if !skipped.is_empty() {
            summary.push_str(&format!("Skipped roles: {}\n", skipped.join(", ")));
        }

        if !self.errors.is_empty() {
            summary.push_str(&format!("Errors ({}):\n", self.errors.len()));
            for entry in self.errors.iter() {
                summary.push_str(&format!("  {}\n", entry));
            }
        }

        summary
    }
}

impl fmt::Display for BackupReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Backs up the folders of a mail session, resolved from their role.
pub struct Backup<S: MailSession> {
    session: S,
    writer: FolderWriter,
    keywords: FolderKeywords,
    errors: ErrorLog,
}

impl<S: MailSession> Backup<S> {
    pub fn new(session: S, writer: FolderWriter, keywords: FolderKeywords) -> Self {
        Self {
            session,
            writer,
            keywords,
            errors: ErrorLog::default(),
        }
    }

    /// Backs up the given roles in order. A role that fails is
    /// skipped, the next ones are still backed up.
    pub fn run(&mut self, roles: &[FolderRole]) -> BackupReport {
        trace!(">> run backup");

        let outcomes = roles
            .iter()
            .map(|role| self.backup_role(role))
            .collect::<Vec<_>>();

        trace!("<< run backup");
        BackupReport {
            outcomes,
            errors: mem::take(&mut self.errors),
        }
    }

    pub fn backup_role(&mut self, role: &FolderRole) -> RoleOutcome {
        info!("backing up role {}", role);

        match resolve_in_session(&mut self.session, role, &self.keywords) {
            Some(folder) => self.backup_folder(role, &folder),
            None => {
                warn!("cannot find folder for role {}, skipping it", role);
                RoleOutcome::Skipped {
                    role: role.clone(),
                    reason: SkipReason::NotFound,
                }
            }
        }
    }

    fn backup_folder(&mut self, role: &FolderRole, folder: &str) -> RoleOutcome {
        trace!(">> backup folder {:?}", folder);

        let skipped = |reason| RoleOutcome::Skipped {
            role: role.clone(),
            reason,
        };

        if let Err(err) = self.session.select_folder(folder) {
            self.errors.record(&err, folder, None);
            return skipped(SkipReason::SelectFailed);
        }

        let ids = match self.session.search_all() {
            Ok(ids) => ids,
            Err(err) => {
                self.errors.record(&err, folder, None);
                return skipped(SkipReason::SearchFailed);
            }
        };
        info!("found {} email(s) in folder {:?}", ids.len(), folder);

        if let Err(err) = self.writer.prepare(folder) {
            self.errors.record(&err, folder, None);
            return skipped(SkipReason::OutputFailed);
        }

        let mut emails = 0;
        let mut attachments = 0;
        let mut addresses = BTreeSet::new();
        let mut records = String::new();

        for id in &ids {
            debug!("backing up email {} of folder {:?}", id, folder);

            let raw = match self.session.fetch_raw(id) {
                Ok(raw) => raw,
                Err(err) => {
                    self.errors.record(&err, folder, Some(id.as_str()));
                    continue;
                }
            };

            let email = match email::decode(&raw) {
                Ok(email) => email,
                Err(err) => {
                    self.errors.record(&err, folder, Some(id.as_str()));
                    continue;
                }
            };

            for attachment in &email.attachments {
                match self.writer.write_attachment(folder, attachment) {
                    Ok(_) => attachments += 1,
                    Err(err) => self.errors.record(&err, folder, Some(id.as_str())),
                }
            }

            addresses.extend(email.addresses.iter().cloned());
            records.push_str(&email.to_record());
            emails += 1;
        }

        let written = self
            .writer
            .write_addresses(folder, &addresses)
            .and_then(|_| self.writer.write_contents(folder, &records));
        if let Err(err) = written {
            self.errors.record(&err, folder, None);
            return skipped(SkipReason::OutputFailed);
        }

        info!(
            "backed up {} email(s) of folder {:?} to {:?}",
            emails,
            folder,
            self.writer.folder_dir(folder)
        );
        trace!("<< backup folder {:?}", folder);

        RoleOutcome::Done {
            role: role.clone(),
            folder: folder.to_owned(),
            emails,
            addresses: addresses.len(),
            attachments,
        }
    }

    pub fn session(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }
}
