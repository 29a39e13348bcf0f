//! Looking Glass: overlays a hierarchical ID scheme (area / category /
//! subfolder / project / child-project) onto a folder tree and keeps a
//! rebuildable JSON index mapping every ID to its folder.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod state;
