//! IMAP backend module.
//!
//! This module contains the IMAP implementation of the mail session
//! and its configuration.

pub mod config;
pub use config::ImapConfig;

mod session;
pub use session::*;
