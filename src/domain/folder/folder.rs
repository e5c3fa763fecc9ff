//! Folder module.
//!
//! This module contains the representation of one entry of a folder
//! listing, as returned by the mail session.

use once_cell::sync::Lazy;
use regex::Regex;
use std::{borrow::Cow, fmt};

/// Matches the final double-quoted token of a listing line, which may
/// contain backslash escapes.
static QUOTED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)+)"$"#).unwrap());

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn unquote(text: &str) -> Cow<str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    let mut unquoted = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unquoted.extend(chars.next()),
            c => unquoted.push(c),
        }
    }
    Cow::Owned(unquoted)
}

/// Represents one raw folder listing line, made of flags, a
/// hierarchy delimiter and a quoted folder name, for example
/// `(\HasNoChildren) "/" "INBOX"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderDescriptor(String);

impl FolderDescriptor {
    pub fn new<L: ToString>(line: L) -> Self {
        Self(line.to_string())
    }

    /// Renders a listing line from its parsed components.
    pub fn from_parts<A, S>(attributes: A, delim: Option<&str>, name: &str) -> Self
    where
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let attributes = attributes
            .into_iter()
            .map(|attr| attr.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(" ");
        let delim = delim.map(quote).unwrap_or_else(|| String::from("NIL"));

        Self(format!("({}) {} {}", attributes, delim, quote(name)))
    }

    /// Returns the full listing line.
    pub fn line(&self) -> &str {
        &self.0
    }

    /// Extracts the folder name, which is the final quoted token of
    /// the line, with its escapes removed. Lines ending with an
    /// unquoted name have none.
    pub fn name(&self) -> Option<Cow<str>> {
        QUOTED_NAME
            .captures(self.0.trim_end())
            .and_then(|caps| caps.get(1))
            .map(|name| unquote(name.as_str()))
    }
}

impl fmt::Display for FolderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FolderDescriptor {
    fn from(line: &str) -> Self {
        Self::new(line)
    }
}

impl From<String> for FolderDescriptor {
    fn from(line: String) -> Self {
        Self(line)
    }
}
