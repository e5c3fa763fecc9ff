//! Email module.
//!
//! This module contains everything needed to decode a raw email into
//! the fields worth backing up: headers, addresses, body and
//! attachments.

pub mod header;
pub use header::*;

mod addr;
pub use addr::*;

pub mod attachment;
pub use attachment::{decode_filename, sanitize_filename, Attachment};

mod parts;
pub use parts::*;

mod email;
pub use email::*;
