pub mod folder;
pub use folder::*;

pub mod email;
pub use email::*;
