//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use board_core::{datetime_to_millis, BoardConfig, Clock, ManualClock, SystemClock};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["board.toml", ".board.toml", "board.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Board configuration.
    pub config: BoardConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from an explicit config file or the nearest one found.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = match config_path {
            Some(path) => BoardConfig::load(path)
                .with_context(|| format!("Failed to load config file: {}", path))?,
            None => match find_config(&cwd) {
                Some(path) => {
                    output.debug(&format!("Using config {}", path.display()));
                    BoardConfig::load(&path)
                        .with_context(|| format!("Failed to load config file: {}", path.display()))?
                }
                None => BoardConfig::default(),
            },
        };

        Ok(Self { config, output, cwd })
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Read and parse a JSON input file.
    pub fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let path = self.resolve_path(path);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Read a file as raw bytes.
    pub fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let path = self.resolve_path(path);
        std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Clock frozen at `at`, or at the current time.
pub fn clock_at(at: Option<DateTime<Utc>>) -> ManualClock {
    ManualClock::new(at.map_or_else(|| SystemClock.now_ms(), datetime_to_millis))
}

/// Find the nearest config file walking up from `start`.
fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(".board.toml"), "[rotation]\nwindow_minutes = 5\n").unwrap();

        let found = find_config(&nested).unwrap();
        assert_eq!(found, root.path().join(".board.toml"));
        assert_eq!(BoardConfig::load(&found).unwrap().rotation.window_minutes, 5);
    }

    #[test]
    fn test_clock_at_fixed_instant() {
        let at: DateTime<Utc> = "2024-06-15T12:00:00Z".parse().unwrap();
        assert_eq!(clock_at(Some(at)).now_ms(), 1_718_452_800_000);
    }
}
