use anyhow::{Context, Result};
use indicatif::ProgressBar;
use jig_api::{ApiClient, ApiError};
use jig_core::normalize_jig_number;
use std::time::Duration;

use crate::config::{Overrides, Settings};
use crate::store::Store;

/// State shared by every subcommand
pub struct App {
    pub store: Store,
    pub settings: Settings,
}

impl App {
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let store = Store::open_default()?;
        let settings = Settings::load(&store.config_path(), overrides)
            .context("Failed to load configuration")?;
        Ok(Self { store, settings })
    }

    pub fn client(&self) -> Result<ApiClient> {
        Ok(self.settings.client()?)
    }

    /// Upper bound for a command that makes `requests` sequential calls
    pub fn wait_budget(&self, requests: u32) -> Duration {
        self.settings.timeout * requests + Duration::from_secs(5)
    }

    /// Remember a jig number; failures only cost the history entry
    pub fn remember(&self, jig_number: &str) {
        if let Err(e) = self.store.record_search(jig_number) {
            log::warn!("Failed to update search history: {e:#}");
        }
    }
}

/// Normalized jig number, or the input error the backend client would raise
pub fn require_jig(input: &str) -> Result<String> {
    normalize_jig_number(input).ok_or_else(|| {
        ApiError::invalid_input("Please enter a Tester Jig Number to search.").into()
    })
}

pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.into());
    spinner
}
