//! Files under the tracker's data directory (`~/.jig-tracker` by default)

use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use jig_core::{JigSummary, SearchHistory};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Overrides the data directory location
pub const HOME_ENV: &str = "JIG_TRACKER_HOME";

const CONFIG_FILE: &str = "config.toml";
const HISTORY_FILE: &str = "history.toml";
const SESSION_FILE: &str = "session.toml";

/// Last successful search, kept so the next run can resume it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub jig_number: String,
    #[serde(default)]
    pub sale_orders: Vec<String>,
    pub saved_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn from_summary(summary: &JigSummary) -> Self {
        Self {
            jig_number: summary.tester_jig_number.clone(),
            sale_orders: summary.sale_orders.clone(),
            saved_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// `$JIG_TRACKER_HOME`, or `~/.jig-tracker`
    pub fn open_default() -> Result<Self> {
        if let Ok(dir) = std::env::var(HOME_ENV) {
            if !dir.trim().is_empty() {
                return Ok(Self::at(dir));
            }
        }
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Ok(Self::at(home_dir.join(".jig-tracker")))
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn load_history(&self) -> Result<SearchHistory> {
        Ok(read_toml(&self.root.join(HISTORY_FILE))?.unwrap_or_default())
    }

    /// Add `jig_number` to the front of the history and persist it
    pub fn record_search(&self, jig_number: &str) -> Result<SearchHistory> {
        let mut history = self.load_history()?;
        history.record(jig_number);
        write_toml(&self.root.join(HISTORY_FILE), &history)?;
        Ok(history)
    }

    pub fn clear_history(&self) -> Result<bool> {
        remove_if_exists(&self.root.join(HISTORY_FILE))
    }

    pub fn save_session(&self, snapshot: &SessionSnapshot) -> Result<()> {
        write_toml(&self.root.join(SESSION_FILE), snapshot)
    }

    /// The saved session, if any. An unreadable snapshot counts as none.
    pub fn load_session(&self) -> Option<SessionSnapshot> {
        match read_toml(&self.root.join(SESSION_FILE)) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Ignoring saved session: {e:#}");
                None
            }
        }
    }

    pub fn clear_session(&self) -> Result<bool> {
        remove_if_exists(&self.root.join(SESSION_FILE))
    }
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value =
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let contents = toml::to_string(value).context("Failed to serialize")?;
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(contents.as_bytes())?;
            f.flush()
        })
        .map_err(|err| anyhow::anyhow!("Failed to write {}: {err}", path.display()))?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    Ok(true)
}
