use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub downloads: DownloadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    pub default_endpoint: String,
    pub animation_asset: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://127.0.0.1:80".to_string(),
            },
            ui: UiConfig {
                default_endpoint: "/generate_cost_report_main_pipeline".to_string(),
                animation_asset: PathBuf::from(BUNDLED_ANIMATION_NAME),
            },
            downloads: DownloadConfig::default(),
        }
    }
}

const APP_DIR: &str = "report-forms";
const BUNDLED_ANIMATION_NAME: &str = "loading.json";
const BUNDLED_ANIMATION: &str = include_str!("../assets/loading.json");

impl Config {
    fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Failed to get config directory"))?
            .join(APP_DIR);

        fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn load_or_default() -> Result<Self> {
        let dir = Self::config_dir()?;
        install_bundled_animation(&dir);
        Self::load_or_default_from(&dir.join("config.toml"))
    }

    /// Defaults are written only when no config file exists. A file that
    /// exists but does not parse is reported and left untouched.
    pub fn load_or_default_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config at {}, writing defaults", path.display());
                let config = Self::default();
                config.save_to(path)?;
                Ok(config)
            }
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read config: {}", path.display()))
            }
        }
    }

    /// Configured download directory, else the platform one.
    pub fn download_dir(&self) -> Option<PathBuf> {
        self.downloads
            .directory
            .clone()
            .or_else(crate::download::default_download_dir)
    }

    /// Animation asset path. Relative paths are looked up in the config
    /// directory, then next to the executable.
    pub fn animation_asset_path(&self) -> PathBuf {
        let search = dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .into_iter()
            .chain(
                std::env::current_exe()
                    .ok()
                    .and_then(|exe| exe.parent().map(Path::to_path_buf)),
            );
        resolve_asset(&self.ui.animation_asset, search)
    }
}

/// First existing `dir/asset`, else the first candidate.
fn resolve_asset(asset: &Path, search: impl IntoIterator<Item = PathBuf>) -> PathBuf {
    if asset.is_absolute() {
        return asset.to_path_buf();
    }
    let candidates: Vec<PathBuf> = search.into_iter().map(|dir| dir.join(asset)).collect();
    candidates
        .iter()
        .find(|path| path.is_file())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| asset.to_path_buf())
}

fn install_bundled_animation(dir: &Path) {
    let path = dir.join(BUNDLED_ANIMATION_NAME);
    if path.exists() {
        return;
    }
    if let Err(e) = fs::write(&path, BUNDLED_ANIMATION) {
        log::warn!("Failed to install animation asset at {}: {}", path.display(), e);
    }
}
