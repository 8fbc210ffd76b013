//! TOML configuration of named templates.
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use miette::{IntoDiagnostic, WrapErr};
use serde::Deserialize;

/// ```toml
/// [options]
/// logging = false
///
/// [templates]
/// access_log = "$remote_addr \"$request_line\" ${header.User-Agent}"
/// upstream = "http://backend$uri"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub options: ConfigOptions,
    /// Template name to template, rendered in name order.
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ConfigOptions {
    /// Log variable handler failures.
    #[serde(default = "default_true")]
    pub logging: bool,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self { logging: true }
    }
}

fn default_true() -> bool {
    true
}

impl From<&ConfigOptions> for varc_lang::Options {
    fn from(options: &ConfigOptions) -> Self {
        varc_lang::Options {
            logging: options.logging,
        }
    }
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> miette::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

        content
            .parse()
            .into_diagnostic()
            .wrap_err_with(|| format!("Invalid configuration in {}", path.display()))
    }
}
