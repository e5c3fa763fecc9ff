//! IMAP backend config module.
//!
//! This module contains the representation of the IMAP backend
//! configuration, read from the config file and completed by the
//! environment.

use serde::Deserialize;
use std::{env, fmt, num::ParseIntError, result};
use thiserror::Error;

pub const DEFAULT_HOST: &str = "imap.gmail.com";
pub const DEFAULT_PORT: u16 = 993;

pub const LOGIN_VAR: &str = "MAIL";
pub const PASSWD_VAR: &str = "PASSWORD";
pub const HOST_VAR: &str = "IMAP_HOST";
pub const PORT_VAR: &str = "IMAP_PORT";

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot get imap login: set it in the config or using ${}", LOGIN_VAR)]
    GetLoginMissingError,
    #[error("cannot get imap password: set it in the config or using ${}", PASSWD_VAR)]
    GetPasswdMissingError,
    #[error("cannot parse imap port {1}")]
    ParsePortError(#[source] ParseIntError, String),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the IMAP backend configuration.
#[derive(Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImapConfig {
    /// Represents the IMAP server host.
    pub host: Option<String>,
    /// Represents the IMAP server port.
    pub port: Option<u16>,
    /// Enables SSL.
    pub ssl: Option<bool>,
    /// Enables StartTLS.
    pub starttls: Option<bool>,
    /// Trusts any certificate.
    pub insecure: Option<bool>,
    /// Represents the IMAP server login.
    pub login: Option<String>,
    /// Represents the IMAP server password.
    pub passwd: Option<String>,
}

impl fmt::Debug for ImapConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ImapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("ssl", &self.ssl)
            .field("starttls", &self.starttls)
            .field("insecure", &self.insecure)
            .field("login", &self.login)
            .field("passwd", &self.passwd.as_ref().map(|_| "********"))
            .finish()
    }
}

impl ImapConfig {
    /// Builds a configuration from the environment only.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.merge_env()?;
        Ok(config)
    }

    /// Fills the missing values from the environment.
    pub fn merge_env(&mut self) -> Result<()> {
        self.merge_vars(|key| env::var(key).ok())
    }

    /// Fills the missing values using the given variable lookup.
    /// Values already set are kept.
    pub fn merge_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());

        if self.host.is_none() {
            self.host = lookup(HOST_VAR);
        }

        if self.port.is_none() {
            self.port = lookup(PORT_VAR)
                .map(|port| {
                    port.trim()
                        .parse()
                        .map_err(|err| Error::ParsePortError(err, port.clone()))
                })
                .transpose()?;
        }

        if self.login.is_none() {
            self.login = lookup(LOGIN_VAR);
        }

        if self.passwd.is_none() {
            self.passwd = lookup(PASSWD_VAR);
        }

        Ok(())
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Gets the SSL IMAP option, enabled unless StartTLS is.
    pub fn ssl(&self) -> bool {
        self.ssl.unwrap_or(!self.starttls())
    }

    /// Gets the StartTLS IMAP option.
    pub fn starttls(&self) -> bool {
        self.starttls.unwrap_or_default()
    }

    /// Gets the insecure IMAP option.
    pub fn insecure(&self) -> bool {
        self.insecure.unwrap_or_default()
    }

    pub fn login(&self) -> Result<&str> {
        self.login.as_deref().ok_or(Error::GetLoginMissingError)
    }

    pub fn passwd(&self) -> Result<&str> {
        self.passwd.as_deref().ok_or(Error::GetPasswdMissingError)
    }
}
