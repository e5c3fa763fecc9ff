//! Folder resolver module.
//!
//! This module resolves a [`FolderRole`] to the real name of a folder
//! found in an unstructured folder listing.

use log::{debug, trace, warn};

use crate::{backend::MailSession, FolderDescriptor, FolderKeywords, FolderRole};

/// Resolves the given role against the listing.
///
/// The listing is scanned in the order the session returned it and
/// the first line containing one of the role keywords wins. A line
/// matching a keyword but lacking a quoted folder name is skipped and
/// the scan goes on with the next one.
pub fn resolve(
    listing: &[FolderDescriptor],
    role: &FolderRole,
    keywords: &FolderKeywords,
) -> Option<String> {
    trace!(">> resolve folder for role {}", role);

    let keywords = keywords.keywords(role);
    debug!("keywords: {:?}", keywords);

    for folder in listing {
        let line = folder.line().to_lowercase();
        if !keywords.iter().any(|kw| line.contains(kw.as_str())) {
            continue;
        }

        match folder.name() {
            Some(name) => {
                debug!("role {} resolved to folder {:?}", role, name);
                trace!("<< resolve folder for role {}", role);
                return Some(name.into_owned());
            }
            None => {
                warn!("folder {:?} matches role {} but has no quoted name, skipping it", folder.line(), role);
            }
        }
    }

    debug!("no folder found for role {}", role);
    trace!("<< resolve folder for role {}", role);
    None
}

/// Lists the folders of the session, then resolves the given role.
/// A failing listing request counts as "not found".
pub fn resolve_in_session<S: MailSession + ?Sized>(
    session: &mut S,
    role: &FolderRole,
    keywords: &FolderKeywords,
) -> Option<String> {
    match session.list_folders() {
        Ok(listing) => resolve(&listing, role, keywords),
        Err(err) => {
            warn!("cannot list folders, skipping role {}", role);
            warn!("{}", err);
            None
        }
    }
}
