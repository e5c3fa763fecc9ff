//! IMAP session module.
//!
//! This module contains the IMAP implementation of the mail session.

use imap_proto::NameAttribute;
use log::{debug, log_enabled, trace, Level};
use native_tls::{TlsConnector, TlsStream};
use std::{
    collections::HashSet,
    io::{self, Read, Write},
    net::TcpStream,
    result,
};
use thiserror::Error;
use utf7_imap::{decode_utf7_imap as decode_utf7, encode_utf7_imap as encode_utf7};

use crate::{backend, backend::imap::config, FolderDescriptor, ImapConfig, MailSession};

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot create tls connector")]
    CreateTlsConnectorError(#[source] native_tls::Error),
    #[error("cannot connect to imap server {1}:{2}")]
    ConnectImapServerError(#[source] imap::Error, String, u16),
    #[error("cannot login to imap server")]
    LoginImapServerError(#[source] imap::Error),
    #[error("cannot list folders")]
    ListFoldersError(#[source] imap::Error),
    #[error("cannot select folder {1}")]
    SelectFolderError(#[source] imap::Error, String),
    #[error("cannot search emails in folder {1}")]
    SearchEmailsError(#[source] imap::Error, String),
    #[error("cannot fetch email {1}")]
    FetchEmailError(#[source] imap::Error, String),
    #[error("cannot logout from imap server")]
    LogoutImapServerError(#[source] imap::Error),

    #[error(transparent)]
    ImapConfigError(#[from] config::Error),
}

pub type Result<T> = result::Result<T, Error>;

pub enum ImapSessionStream {
    Tls(TlsStream<TcpStream>),
    Tcp(TcpStream),
}

impl Read for ImapSessionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tls(stream) => stream.read(buf),
            Self::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for ImapSessionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tls(stream) => stream.write(buf),
            Self::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tls(stream) => stream.flush(),
            Self::Tcp(stream) => stream.flush(),
        }
    }
}

/// Renders an IMAP name attribute the way it appears on the wire.
fn attribute_to_string(attr: &NameAttribute) -> String {
    match attr {
        NameAttribute::NoInferiors => String::from("\\Noinferiors"),
        NameAttribute::NoSelect => String::from("\\Noselect"),
        NameAttribute::Marked => String::from("\\Marked"),
        NameAttribute::Unmarked => String::from("\\Unmarked"),
        NameAttribute::All => String::from("\\All"),
        NameAttribute::Archive => String::from("\\Archive"),
        NameAttribute::Drafts => String::from("\\Drafts"),
        NameAttribute::Flagged => String::from("\\Flagged"),
        NameAttribute::Junk => String::from("\\Junk"),
        NameAttribute::Sent => String::from("\\Sent"),
        NameAttribute::Trash => String::from("\\Trash"),
        NameAttribute::Extension(attr) => attr.to_string(),
        attr => format!("{:?}", attr),
    }
}

/// Represents an authenticated IMAP session.
pub struct ImapSession {
    session: imap::Session<ImapSessionStream>,
    selected: Option<String>,
    /// Folders flagged `\Noselect` by the last listing.
    noselect: HashSet<String>,
}

impl ImapSession {
    /// Connects to the IMAP server then logs in.
    pub fn connect(config: &ImapConfig) -> Result<Self> {
        trace!(">> connect to imap server");

        let host = config.host();
        let port = config.port();
        debug!("imap server: {}:{}", host, port);

        let builder = TlsConnector::builder()
            .danger_accept_invalid_certs(config.insecure())
            .danger_accept_invalid_hostnames(config.insecure())
            .build()
            .map_err(Error::CreateTlsConnectorError)?;

        let mut client_builder = imap::ClientBuilder::new(host, port);
        if config.starttls() {
            client_builder.starttls();
        }

        let client = if config.ssl() || config.starttls() {
            client_builder.connect(|domain, tcp| {
                let connector = TlsConnector::connect(&builder, domain, tcp)?;
                Ok(ImapSessionStream::Tls(connector))
            })
        } else {
            client_builder.connect(|_, tcp| Ok(ImapSessionStream::Tcp(tcp)))
        }
        .map_err(|err| Error::ConnectImapServerError(err, host.to_owned(), port))?;

        let mut session = client
            .login(config.login()?, config.passwd()?)
            .map_err(|res| Error::LoginImapServerError(res.0))?;
        session.debug = log_enabled!(Level::Trace);

        trace!("<< connect to imap server");
        Ok(Self {
            session,
            selected: None,
            noselect: HashSet::new(),
        })
    }

    pub fn logout(&mut self) -> Result<()> {
        self.session
            .logout()
            .map_err(Error::LogoutImapServerError)
    }

    fn selected(&self) -> backend::Result<String> {
        self.selected
            .clone()
            .ok_or(backend::Error::GetSelectedFolderError)
    }
}

impl MailSession for ImapSession {
    fn list_folders(&mut self) -> backend::Result<Vec<FolderDescriptor>> {
        let names = self
            .session
            .list(Some(""), Some("*"))
            .map_err(Error::ListFoldersError)?;

        if names.is_empty() {
            return Err(backend::Error::ListFoldersEmptyError);
        }

        self.noselect.clear();
        let mut folders = Vec::with_capacity(names.len());
        for name in names.iter() {
            let decoded = decode_utf7(name.name().to_owned());
            if name.attributes().contains(&NameAttribute::NoSelect) {
                self.noselect.insert(decoded.clone());
            }
            folders.push(FolderDescriptor::from_parts(
                name.attributes().iter().map(attribute_to_string),
                name.delimiter(),
                &decoded,
            ));
        }

        trace!("imap folders: {:?}", folders);
        Ok(folders)
    }

    fn select_folder(&mut self, folder: &str) -> backend::Result<()> {
        if self.noselect.contains(folder) {
            return Err(backend::Error::FolderNotSelectableError(folder.to_owned()));
        }

        let encoded = encode_utf7(folder.to_owned());
        debug!("utf7 encoded folder: {:?}", encoded);

        let mbox = self
            .session
            .select(&encoded)
            .map_err(|err| Error::SelectFolderError(err, folder.to_owned()))?;
        debug!("folder {:?} has {} email(s)", folder, mbox.exists);

        self.selected = Some(folder.to_owned());
        Ok(())
    }

    fn search_all(&mut self) -> backend::Result<Vec<String>> {
        let folder = self.selected()?;
        let mut seqs = self
            .session
            .search("ALL")
            .map_err(|err| Error::SearchEmailsError(err, folder))?
            .into_iter()
            .collect::<Vec<_>>();
        seqs.sort_unstable();
        trace!("sequence numbers: {:?}", seqs);

        Ok(seqs.into_iter().map(|seq| seq.to_string()).collect())
    }

    fn fetch_raw(&mut self, id: &str) -> backend::Result<Vec<u8>> {
        self.selected()?;

        // PEEK keeps the \Seen flag untouched
        let fetches = self
            .session
            .fetch(id, "BODY.PEEK[]")
            .map_err(|err| Error::FetchEmailError(err, id.to_owned()))?;

        if fetches.is_empty() {
            return Err(backend::Error::FindEmailError(id.to_owned()));
        }

        let body = fetches
            .iter()
            .find_map(|fetch| fetch.body())
            .ok_or_else(|| backend::Error::GetEmailBodyError(id.to_owned()))?;

        Ok(body.to_vec())
    }
}
