use log::{debug, trace};
use mailparse::{MailParseError, ParsedMail};
use std::{collections::BTreeSet, result};
use thiserror::Error;

use super::{
    addr::extract_addrs,
    attachment::{attachment_filename, Attachment},
    header::{decode_first_word, first_raw_header},
    parts::{extract_body, is_attachment, PartsIterator},
};

/// Rule line delimiting two records of the textual summary.
pub const RECORD_DELIM: &str =
    "================================================================================";

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot parse email from raw data")]
    ParseRawEmailError(#[source] MailParseError),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents an email decoded into the fields worth backing up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedEmail {
    /// The raw From header.
    pub from: String,
    /// The raw To header.
    pub to: String,
    /// The raw Cc header.
    pub cc: String,
    pub subject: String,
    /// The addresses found in the From, To and Cc headers.
    pub addresses: BTreeSet<String>,
    pub body: String,
    /// The attachments having a non-empty payload.
    pub attachments: Vec<Attachment>,
    /// The decoded names of every attachment part, including the ones
    /// with an empty payload.
    pub attachment_names: Vec<String>,
}

impl DecodedEmail {
    pub fn from_parsed_mail(parsed: &ParsedMail) -> Self {
        trace!(">> decode parsed mail");

        let headers = parsed.get_headers();
        let from = first_raw_header(&headers, "From");
        let to = first_raw_header(&headers, "To");
        let cc = first_raw_header(&headers, "Cc");

        let addresses = [&from, &to, &cc]
            .into_iter()
            .flat_map(|header| extract_addrs(header))
            .map(ToOwned::to_owned)
            .collect::<BTreeSet<_>>();
        debug!("addresses: {:?}", addresses);

        let subject = decode_first_word(&first_raw_header(&headers, "Subject"));
        debug!("subject: {:?}", subject);

        let body = extract_body(parsed);
        trace!("body: {:?}", body);

        let mut attachments = Vec::new();
        let mut attachment_names = Vec::new();

        for part in PartsIterator::new(parsed).filter(|part| is_attachment(part)) {
            let filename = match attachment_filename(part) {
                Some(filename) => filename,
                None => {
                    debug!("skipping attachment without filename");
                    continue;
                }
            };

            let data = part.get_body_raw().unwrap_or_else(|err| {
                debug!("cannot decode payload of attachment {:?}: {}", filename, err);
                Vec::new()
            });

            attachment_names.push(filename.clone());
            if data.is_empty() {
                debug!("attachment {:?} has an empty payload", filename);
            } else {
                attachments.push(Attachment { filename, data });
            }
        }

        trace!("<< decode parsed mail");
        Self {
            from,
            to,
            cc,
            subject,
            addresses,
            body,
            attachments,
            attachment_names,
        }
    }

    /// Builds the human-readable record of the email, as written in
    /// the folder contents file.
    pub fn to_record(&self) -> String {
        format!(
            "From: {}\nTo: {}\nCc: {}\nSubject: {}\n\nBody:\n{}\n\nAttachments: {}\n{}\n",
            self.from,
            self.to,
            self.cc,
            self.subject,
            self.body.trim(),
            self.attachment_names.join(", "),
            RECORD_DELIM,
        )
    }
}

impl TryFrom<&[u8]> for DecodedEmail {
    type Error = Error;

    fn try_from(raw: &[u8]) -> Result<Self> {
        decode(raw)
    }
}

/// Decodes a raw MIME email. Only an email that cannot be parsed at
/// all is an error: every other step degrades on its own.
pub fn decode(raw: &[u8]) -> Result<DecodedEmail> {
    let parsed = mailparse::parse_mail(raw).map_err(Error::ParseRawEmailError)?;
    Ok(DecodedEmail::from_parsed_mail(&parsed))
}
