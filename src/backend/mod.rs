mod session;

#[cfg(feature = "imap-backend")]
pub mod imap;

pub use self::session::{Error, MailSession, Result};
#[cfg(feature = "imap-backend")]
pub use self::imap::{ImapConfig, ImapSession};
