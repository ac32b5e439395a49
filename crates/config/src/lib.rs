//! # Config - binpkg run configuration
//!
//! Resolved settings for one invocation of the `binpkg` tool. Defaults come
//! from environment variables; the CLI overlays its parsed arguments on top
//! and calls [`PackConfig::validate`] before doing any work.
//!
//! ```text
//! BINPKG_OUTPUT           Package file to write         (default: unset)
//! BINPKG_FORMAT_VERSION   Version stamp for new packages (default: 0)
//! ```
//!
//! Verbosity is an explicit field rather than process-wide state; the CLI
//! turns it into a log filter with [`PackConfig::log_level`].

use anyhow::{bail, Result};
use log::LevelFilter;
use std::path::PathBuf;

/// Environment variable naming the output package.
pub const ENV_OUTPUT: &str = "BINPKG_OUTPUT";

/// Environment variable carrying the format version stamp.
pub const ENV_FORMAT_VERSION: &str = "BINPKG_FORMAT_VERSION";

/// What a run should do, derived from a validated [`PackConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Write `inputs` into a new package at `output`.
    Pack { output: PathBuf, inputs: Vec<PathBuf> },
    /// Print the directory of an existing package.
    List { package: PathBuf },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackConfig {
    /// Package file to create.
    pub output: Option<PathBuf>,
    /// Files to bundle, in package order.
    pub inputs: Vec<PathBuf>,
    /// Number of `-V` flags given.
    pub verbosity: u8,
    /// Version stamp written into new packages.
    pub format_version: i32,
    /// Existing package to list instead of packing.
    pub list: Option<PathBuf>,
}

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl PackConfig {
    /// Builds a configuration from the `BINPKG_*` environment variables.
    ///
    /// Values that fail to parse fall back to their defaults.
    pub fn from_env() -> Self {
        let output = std::env::var(ENV_OUTPUT)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let format_version: i32 = env_or(ENV_FORMAT_VERSION, "0").parse().unwrap_or(0);

        Self {
            output,
            format_version,
            ..Self::default()
        }
    }

    /// Checks that exactly one mode was requested and that it has what it
    /// needs, returning that mode.
    ///
    /// # Errors
    ///
    /// - neither an output nor a package to list was given
    /// - both were given
    /// - an output was given without any input files
    pub fn validate(&self) -> Result<Mode> {
        match (&self.output, &self.list) {
            (Some(_), Some(_)) => bail!("--output and --list cannot be used together"),
            (None, None) => bail!("nothing to do: pass -o OUTFILE FILES... or -l PACKAGE"),
            (None, Some(package)) => Ok(Mode::List {
                package: package.clone(),
            }),
            (Some(output), None) => {
                if self.inputs.is_empty() {
                    bail!("no input files given for {}", output.display());
                }
                Ok(Mode::Pack {
                    output: output.clone(),
                    inputs: self.inputs.clone(),
                })
            }
        }
    }

    /// Log filter for the configured verbosity: warnings by default, one
    /// level chattier per `-V`.
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests;
