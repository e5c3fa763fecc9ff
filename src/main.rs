use clap::Parser;
use env_logger::Env;
use log::{debug, error, warn};
use std::{error::Error as StdError, path::PathBuf, process::ExitCode};
use thiserror::Error;

use mailbox_backup::{backend, config, Backup, BackupConfig, FolderRole, FolderWriter, ImapSession};

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    ConfigError(#[from] config::Error),
    #[error(transparent)]
    ImapError(#[from] backend::imap::Error),
}

/// Backs up the folders of an IMAP mailbox to local files.
///
/// The IMAP login and password are read from the config file, or from
/// the MAIL and PASSWORD environment variables. A .env file in the
/// current directory is loaded first.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Reads the configuration from this TOML file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Writes the backup to this directory instead of the configured
    /// one.
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Roles of the folders to back up: inbox, sent, drafts, trash,
    /// all-mail, spam or label:<name>.
    #[arg(value_name = "ROLE")]
    roles: Vec<FolderRole>,
}

fn run(args: Args) -> Result<String, Error> {
    let mut config = BackupConfig::from_opt_path(args.config)?;
    if let Some(output) = args.output {
        config.output_dir = Some(output);
    }

    let roles = if args.roles.is_empty() {
        config.roles()
    } else {
        args.roles
    };
    debug!("roles: {:?}", roles);

    let writer = FolderWriter::new(config.output_dir()?);
    let session = ImapSession::connect(&config.imap)?;

    let mut backup = Backup::new(session, writer, config.keywords());
    let report = backup.run(&roles);

    if let Err(err) = backup.session().logout() {
        warn!("cannot logout from imap server, ignoring it");
        warn!("{}", err);
    }

    Ok(report.summary())
}

fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    if let Err(err) = dotenv {
        debug!("cannot load .env file: {}", err);
    }

    match run(Args::parse()) {
        Ok(summary) => {
            print!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            let mut source = err.source();
            while let Some(err) = source {
                error!("caused by: {}", err);
                source = err.source();
            }
            ExitCode::FAILURE
        }
    }
}
