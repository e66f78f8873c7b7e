//! Autoconsent command line support
//!
//! Configuration, the snapshot dry run and the CLI front end.

pub mod check;
pub mod cli;
pub mod config;

pub use check::{run_check, CheckReport, ClickRecord};
pub use config::Config;
