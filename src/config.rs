//! Application settings read from the environment

use std::env;

/// Environment key for the display title
pub const APP_TITLE_KEY: &str = "APP_TITLE";

pub const DEFAULT_APP_TITLE: &str = "Financial Simulator";

/// Settings for the presentation layer; the engine never reads these
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub title: String,
}

impl AppConfig {
    /// Read settings from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let title = lookup(APP_TITLE_KEY)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_TITLE.to_string());
        Self { title }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_APP_TITLE.to_string(),
        }
    }
}
