// src/core/mod.rs

pub mod background;
pub mod backup;
pub mod cache_store;
pub mod clock;
pub mod config_loader;
pub mod drive_manager;
pub mod graph_display;
pub mod identifier;
pub mod paths;
pub mod revisions;
pub mod scanner;
pub mod standin;
pub mod storage_router;
