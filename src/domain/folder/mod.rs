//! Folder module.
//!
//! This module contains everything related to email folders: the
//! listing entries, the semantic roles and the role resolver.

pub mod folder;
pub use folder::*;

pub mod role;
pub use role::{FolderKeywords, FolderRole};

pub mod resolver;
pub use resolver::*;
