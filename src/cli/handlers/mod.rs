// src/cli/handlers/mod.rs

pub mod backup;
pub mod bg;
pub mod commons;
pub mod config;
pub mod diagram;
pub mod drive;
pub mod info;
pub mod list;
pub mod path;
pub mod standin;
