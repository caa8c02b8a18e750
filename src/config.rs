//! Runtime configuration for starting the foreign engine.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::errors::PssfssError;

/// Environment variable naming the julia executable.
pub const ENV_JULIA: &str = "PSSFSS_JULIA";
/// Environment variable holding the engine thread count (`auto` or a positive integer).
pub const ENV_THREADS: &str = "PSSFSS_JULIA_THREADS";
/// Environment variable naming the Julia project directory.
pub const ENV_PROJECT: &str = "PSSFSS_JULIA_PROJECT";
/// Environment variable toggling package resolution before start-up.
pub const ENV_AUTO_INSTALL: &str = "PSSFSS_AUTO_INSTALL";

/// Number of threads the engine may use internally. Fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadCount {
    /// One thread per available core.
    #[default]
    Auto,
    /// Exactly this many threads.
    Fixed(NonZeroUsize),
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(n) => write!(f, "{n}"),
        }
    }
}

/// How to locate and start the foreign runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Julia executable; looked up on `PATH` when relative.
    pub julia: PathBuf,
    /// Engine thread count.
    pub threads: ThreadCount,
    /// Julia project holding the PSSFSS installation. `None` uses the default environment.
    pub project: Option<PathBuf>,
    /// Add missing packages to the project before starting the driver.
    pub auto_install: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            julia: PathBuf::from("julia"),
            threads: ThreadCount::Auto,
            project: None,
            auto_install: true,
        }
    }
}

impl SessionConfig {
    /// Sets the julia executable.
    #[must_use]
    pub fn with_julia(mut self, julia: impl Into<PathBuf>) -> Self {
        self.julia = julia.into();
        self
    }

    /// Sets the engine thread count.
    #[must_use]
    pub const fn with_threads(mut self, threads: ThreadCount) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the Julia project directory.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<PathBuf>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Enables or disables package resolution at start-up.
    #[must_use]
    pub const fn with_auto_install(mut self, auto_install: bool) -> Self {
        self.auto_install = auto_install;
        self
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, PssfssError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PssfssError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let value = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());

        if let Some(julia) = value(ENV_JULIA) {
            config.julia = PathBuf::from(julia.trim());
        }
        if let Some(raw) = value(ENV_THREADS) {
            config.threads = parse_threads(&raw)?;
        }
        if let Some(project) = value(ENV_PROJECT) {
            config.project = Some(PathBuf::from(project.trim()));
        }
        if let Some(raw) = value(ENV_AUTO_INSTALL) {
            config.auto_install = parse_flag(ENV_AUTO_INSTALL, &raw)?;
        }
        Ok(config)
    }
}

fn parse_threads(raw: &str) -> Result<ThreadCount, PssfssError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("auto") {
        return Ok(ThreadCount::Auto);
    }
    raw.parse::<NonZeroUsize>()
        .map(ThreadCount::Fixed)
        .map_err(|_| PssfssError::Config(format!("{ENV_THREADS} must be `auto` or a positive integer, got `{raw}`")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, PssfssError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(PssfssError::Config(format!("{key} must be a boolean, got `{other}`"))),
    }
}
