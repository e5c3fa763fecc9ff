//! Folder role module.
//!
//! This module contains the semantic folder roles and the keyword
//! tables used to recognize them in a folder listing.

use serde::Deserialize;
use std::{collections::HashMap, fmt, result, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("cannot parse folder role {0}")]
    ParseFolderRoleError(String),
    #[error("cannot parse folder role: custom label is empty")]
    ParseEmptyLabelError,
}

pub type Result<T> = result::Result<T, Error>;

/// Default keywords, matched case-insensitively as substrings of the
/// listing line. Mail providers localize folder names, hence the
/// Italian rows next to the English ones.
pub const INBOX_KEYWORDS: &[&str] = &["inbox", "posta in arrivo"];
pub const SENT_KEYWORDS: &[&str] = &["sent", "posta inviata", "inviati"];
pub const DRAFTS_KEYWORDS: &[&str] = &["drafts", "bozze"];
pub const TRASH_KEYWORDS: &[&str] = &["trash", "cestino", "deleted"];
pub const ALL_MAIL_KEYWORDS: &[&str] = &["all mail", "[gmail]/all mail", "tutti"];
pub const SPAM_KEYWORDS: &[&str] = &["spam", "posta indesiderata", "junk"];

/// Represents the semantic role of a folder, independent of the
/// literal name the provider gives it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FolderRole {
    Inbox,
    Sent,
    Drafts,
    Trash,
    AllMail,
    Spam,
    CustomLabel(String),
}

impl FolderRole {
    /// Lists the predefined roles, in the order they are usually
    /// backed up.
    pub fn predefined() -> [FolderRole; 6] {
        [
            FolderRole::Inbox,
            FolderRole::Sent,
            FolderRole::Drafts,
            FolderRole::Trash,
            FolderRole::AllMail,
            FolderRole::Spam,
        ]
    }
}

impl fmt::Display for FolderRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Inbox => write!(f, "inbox"),
            Self::Sent => write!(f, "sent"),
            Self::Drafts => write!(f, "drafts"),
            Self::Trash => write!(f, "trash"),
            Self::AllMail => write!(f, "all-mail"),
            Self::Spam => write!(f, "spam"),
            Self::CustomLabel(label) => write!(f, "label:{}", label),
        }
    }
}

impl FromStr for FolderRole {
    type Err = Error;

    fn from_str(role: &str) -> Result<Self> {
        if let Some(label) = role.strip_prefix("label:") {
            return if label.is_empty() {
                Err(Error::ParseEmptyLabelError)
            } else {
                Ok(Self::CustomLabel(label.to_owned()))
            };
        }

        match role.trim().to_lowercase().as_str() {
            "inbox" => Ok(Self::Inbox),
            "sent" => Ok(Self::Sent),
            "drafts" => Ok(Self::Drafts),
            "trash" => Ok(Self::Trash),
            "all-mail" | "all" => Ok(Self::AllMail),
            "spam" | "junk" => Ok(Self::Spam),
            _ => Err(Error::ParseFolderRoleError(role.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for FolderRole {
    fn deserialize<D>(deserializer: D) -> result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let role = String::deserialize(deserializer)?;
        role.parse().map_err(serde::de::Error::custom)
    }
}

/// Represents the ordered keyword table of the predefined roles.
///
/// New locales or providers are supported by appending rows with
/// [`FolderKeywords::extend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderKeywords(HashMap<FolderRole, Vec<String>>);

impl Default for FolderKeywords {
    fn default() -> Self {
        let table = [
            (FolderRole::Inbox, INBOX_KEYWORDS),
            (FolderRole::Sent, SENT_KEYWORDS),
            (FolderRole::Drafts, DRAFTS_KEYWORDS),
            (FolderRole::Trash, TRASH_KEYWORDS),
            (FolderRole::AllMail, ALL_MAIL_KEYWORDS),
            (FolderRole::Spam, SPAM_KEYWORDS),
        ];

        Self(
            table
                .into_iter()
                .map(|(role, keywords)| {
                    let keywords = keywords.iter().map(|kw| kw.to_string()).collect();
                    (role, keywords)
                })
                .collect(),
        )
    }
}

impl FolderKeywords {
    /// Appends keywords to the given role. Keywords are stored
    /// lower-cased. Custom labels carry their own keyword and are
    /// left untouched.
    pub fn extend<I, S>(&mut self, role: FolderRole, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let FolderRole::CustomLabel(_) = role {
            return;
        }

        let row = self.0.entry(role).or_default();
        for kw in keywords {
            let kw = kw.as_ref().to_lowercase();
            if !kw.is_empty() && !row.contains(&kw) {
                row.push(kw);
            }
        }
    }

    /// Returns the keywords to look for when resolving the given
    /// role. A custom label matches its own lower-cased text.
    pub fn keywords(&self, role: &FolderRole) -> Vec<String> {
        match role {
            FolderRole::CustomLabel(label) => vec![label.to_lowercase()],
            role => self.0.get(role).cloned().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod test_folder_role {
    use super::{Error, FolderKeywords, FolderRole};

    #[test]
    fn test_parse_and_display() {
        for role in FolderRole::predefined() {
            assert_eq!(role, role.to_string().parse().unwrap());
        }

        let role: FolderRole = "label:Work/Clients".parse().unwrap();
        assert_eq!(FolderRole::CustomLabel("Work/Clients".into()), role);
        assert_eq!("label:Work/Clients", role.to_string());

        assert_eq!(Ok(FolderRole::AllMail), "ALL-MAIL".parse());
        assert_eq!(Err(Error::ParseEmptyLabelError), "label:".parse::<FolderRole>());
        assert_eq!(
            Err(Error::ParseFolderRoleError("archive".into())),
            "archive".parse::<FolderRole>()
        );
    }

    #[test]
    fn test_default_keywords() {
        let keywords = FolderKeywords::default();
        assert_eq!(
            vec!["sent", "posta inviata", "inviati"],
            keywords.keywords(&FolderRole::Sent)
        );
        assert_eq!(
            vec!["my label"],
            keywords.keywords(&FolderRole::CustomLabel("My Label".into()))
        );
    }

    #[test]
    fn test_extend_keywords() {
        let mut keywords = FolderKeywords::default();
        keywords.extend(FolderRole::Trash, ["Papierkorb", "trash", ""]);
        assert_eq!(
            vec!["trash", "cestino", "deleted", "papierkorb"],
            keywords.keywords(&FolderRole::Trash)
        );
    }
}
