use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::level::TracingLevel;
use super::runtime::TraceConfig;
use crate::error::{Error, Result};

/// Environment variable that overrides every file-based setting.
pub const LEVEL_ENV_VAR: &str = "NARRATIVETRACE_LEVEL";

/// Configuration file names searched for in each directory.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["narrativetrace.toml", ".narrativetrace.toml"];

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// On-disk shape of `narrativetrace.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub level: Option<TracingLevel>,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves the initial tracing level from the environment and
/// configuration files.
///
/// Precedence: `NARRATIVETRACE_LEVEL`, then the nearest
/// `narrativetrace.toml` found walking up from the start directory, then
/// [`TracingLevel::Detail`].
pub struct ConfigResolver {
    start_dir: Option<PathBuf>,
    env_lookup: EnvLookup,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigResolver {
    /// Resolver rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            start_dir: None,
            env_lookup: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Search for configuration files starting at `dir` instead of the
    /// current directory.
    pub fn with_start_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start_dir = Some(dir.into());
        self
    }

    /// Replace the process environment, mostly for tests.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env_lookup = Box::new(lookup);
        self
    }

    /// Resolve a ready-to-share [`TraceConfig`].
    pub fn resolve(&self) -> Result<TraceConfig> {
        self.resolve_level().map(TraceConfig::new)
    }

    pub fn resolve_level(&self) -> Result<TracingLevel> {
        if let Some(raw) = (self.env_lookup)(LEVEL_ENV_VAR) {
            let level = raw.parse::<TracingLevel>()?;
            tracing::debug!(%level, "tracing level taken from {}", LEVEL_ENV_VAR);
            return Ok(level);
        }

        let start = match &self.start_dir {
            Some(dir) => dir.clone(),
            None => match std::env::current_dir() {
                Ok(dir) => dir,
                Err(e) => {
                    tracing::warn!("Failed to get current directory: {}. Using default level.", e);
                    return Ok(TracingLevel::default());
                }
            },
        };

        for dir in directory_ancestors(start, MAX_TRAVERSAL_DEPTH) {
            if let Some(config) = try_load_config_in_dir(&dir)? {
                if let Some(level) = config.level {
                    return Ok(level);
                }
            }
        }

        tracing::debug!(
            "No config found after checking {} directories. Using default level.",
            MAX_TRAVERSAL_DEPTH
        );
        Ok(TracingLevel::default())
    }
}

/// Read a whole config file into a string
pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Pure function to parse config from a TOML string
pub fn parse_config(contents: &str, path: &Path) -> Result<FileConfig> {
    toml::from_str::<FileConfig>(contents).map_err(|e| Error::invalid_config(path, e.to_string()))
}

/// Look for a config file in exactly one directory.
///
/// Two competing files in the same directory are an error; an unreadable
/// file is skipped.
pub(crate) fn try_load_config_in_dir(dir: &Path) -> Result<Option<FileConfig>> {
    let present: Vec<PathBuf> = CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| path.is_file())
        .collect();

    match present.as_slice() {
        [] => Ok(None),
        [path] => {
            let contents = match read_config_file(path) {
                Ok(contents) => contents,
                Err(e) => {
                    handle_read_error(path, &e);
                    return Ok(None);
                }
            };
            let config = parse_config(&contents, path)?;
            tracing::debug!("Loaded config from {}", path.display());
            Ok(Some(config))
        }
        _ => Err(Error::DuplicateConfiguration(present)),
    }
}

/// Handle file read errors with appropriate logging
pub(crate) fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        tracing::debug!(
            "Failed to read config file {}: {}. Using defaults.",
            config_path.display(),
            error
        );
    }
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}
