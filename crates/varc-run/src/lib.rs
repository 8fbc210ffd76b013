//! Command-line host for `varc-lang`.
//!
//! It plays the part of a request-processing server: a fixed set of
//! request variables is registered once, named templates are loaded from a
//! TOML file and compiled into one field table, and every request read as
//! JSON is rendered with its own cache.
mod cli;
pub mod config;
pub mod host;

pub use cli::Cli;
pub use config::Config;
pub use host::Request;
