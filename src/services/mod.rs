pub mod backend;
pub mod catalog;
pub mod config;
pub mod import;
pub mod preview;
