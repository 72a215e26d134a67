use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::proxy::notion::NotionConfig;

const SETTINGS_DIR: &str = ".notion-tasks";
const SETTINGS_FILE: &str = "setting.json";

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

pub const TOKEN_ENV: &str = "NOTION_API_KEY";
pub const DATABASE_ENV: &str = "NOTION_DATABASE_ID";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub notion_token: Option<String>,
    #[serde(default)]
    pub database_id: Option<String>,
    /// Listen address of the proxy.
    #[serde(default)]
    pub bind: Option<String>,
    /// Origin of the proxy as seen by the UI.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Notion API origin; only set when pointing the proxy at a stand-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notion_base_url: Option<String>,
}

impl Settings {
    /// Reads `.notion-tasks/setting.json` from `std::env::current_dir()` and
    /// overlays `NOTION_API_KEY` / `NOTION_DATABASE_ID`.
    /// Missing or malformed files yield defaults.
    pub fn load() -> Self {
        Self::load_from(std::env::current_dir().ok()).with_env(|key| std::env::var(key).ok())
    }

    /// The file in `dir` alone, without environment overrides.
    pub fn load_in(dir: &Path) -> Self {
        Self::load_from(Some(dir.to_path_buf()))
    }

    fn load_from(cwd: Option<PathBuf>) -> Self {
        let Some(cwd) = cwd else {
            return Self::default();
        };
        Self::read_file(&Self::path_in(&cwd)).unwrap_or_default()
    }

    fn read_file(path: &Path) -> Option<Self> {
        let data = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
                None
            }
        }
    }

    fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.notion_token = Some(token);
        }
        if let Some(db) = lookup(DATABASE_ENV).filter(|v| !v.is_empty()) {
            self.database_id = Some(db);
        }
        self
    }

    /// Directory holding the settings file (and the TUI log).
    pub fn dir_in(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_DIR)
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        Self::dir_in(dir).join(SETTINGS_FILE)
    }

    pub fn save_to(&self, dir: &Path) -> std::io::Result<()> {
        let settings_dir = Self::dir_in(dir);
        fs::create_dir_all(&settings_dir)?;

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(settings_dir.join(SETTINGS_FILE), json.as_bytes())
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Credentials for the proxy. Both the token and the database ID are required.
    pub fn notion_config(&self) -> anyhow::Result<NotionConfig> {
        let token = self
            .notion_token
            .clone()
            .with_context(|| format!("Notion token not configured (set {TOKEN_ENV} or run `init`)"))?;
        let database_id = self
            .database_id
            .clone()
            .with_context(|| format!("Notion database not configured (set {DATABASE_ENV} or run `init`)"))?;
        let config = NotionConfig::new(token, database_id);
        Ok(match &self.notion_base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        })
    }
}
